use std::path::PathBuf;

use crate::store::DuplicateFile;

pub type Result<T> = std::result::Result<T, PsarcError>;

/// Coarse classification of [`PsarcError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The byte stream is not a well-formed archive.
    Format,
    /// The filesystem refused an operation.
    Io,
    /// A record with the same name already exists.
    Conflict,
    /// No record with the requested name exists.
    NotFound,
    /// The operation cannot run in the current state.
    Precondition,
}

#[derive(Debug, thiserror::Error)]
pub enum PsarcError {
    #[error("Upstream IO Error: {0}")]
    IO(#[from] std::io::Error),
    #[error("File name is not valid UTF-8: {}", .0.display())]
    InvalidFileName(PathBuf),

    #[error("Invalid archive magic: expected 0x{expected:08X}, found 0x{found:08X}")]
    InvalidMagic { expected: u32, found: u32 },
    #[error("Unsupported archive variant: reserved field is 0x{0:08X}")]
    UnsupportedReserved(u32),
    #[error("Archive is truncated while reading {0}")]
    Truncated(&'static str),
    #[error("Entry {index} has a name that is not valid UTF-8")]
    InvalidName { index: usize },
    #[error("Archive contains the name `{0}` more than once")]
    DuplicateEntry(String),

    #[error("File `{0}` already exists in the archive")]
    Duplicate(String),
    #[error("File `{0}` not found in the archive")]
    NotFound(String),

    #[error("Archive contains no files")]
    EmptyArchive,
    #[error("No target directory given and the archive has no source path")]
    NoDumpTarget,
    #[error("File name `{0}` contains a carriage return and cannot be encoded")]
    UnencodableName(String),
    #[error("Archive exceeds the 4 GiB offset range")]
    ArchiveTooLarge,
    #[error("File name `{0}` is not a plain file name")]
    UnsafeName(String),
}

impl PsarcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PsarcError::IO(_) | PsarcError::InvalidFileName(_) => ErrorKind::Io,
            PsarcError::InvalidMagic { .. }
            | PsarcError::UnsupportedReserved(_)
            | PsarcError::Truncated(_)
            | PsarcError::InvalidName { .. }
            | PsarcError::DuplicateEntry(_) => ErrorKind::Format,
            PsarcError::Duplicate(_) => ErrorKind::Conflict,
            PsarcError::NotFound(_) => ErrorKind::NotFound,
            PsarcError::EmptyArchive
            | PsarcError::NoDumpTarget
            | PsarcError::UnencodableName(_)
            | PsarcError::ArchiveTooLarge
            | PsarcError::UnsafeName(_) => ErrorKind::Precondition,
        }
    }

    /// Turn an unexpected EOF into [`PsarcError::Truncated`], keep every other IO error.
    pub(crate) fn eof_as_truncated(err: std::io::Error, what: &'static str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            PsarcError::Truncated(what)
        } else {
            PsarcError::IO(err)
        }
    }
}

impl From<DuplicateFile> for PsarcError {
    fn from(value: DuplicateFile) -> Self {
        PsarcError::Duplicate(value.name)
    }
}
