//! Reading and writing the `.psarc` resource archives found in GUST's Nintendo Switch titles.
//!
//! These are not Sony PSARC files: an archive is a fixed header, a table of
//! `(offset, size)` entries, a CR/LF separated name table and the raw file data.

pub mod archive;
pub mod error;
pub mod fs;
pub mod read;
pub mod spec;
pub mod store;
pub mod write;

pub use archive::Archive;
pub use error::{ErrorKind, PsarcError, Result};
pub use store::{DuplicateFile, FileRecord, FileStore};
