use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{PsarcError, Result};
use crate::fs::{self, DumpOptions};
use crate::read;
use crate::spec;
use crate::store::{DuplicateFile, FileRecord, FileStore};
use crate::write::{self, ArchiveLayout};

/// An archive held in memory, plus where it came from.
///
/// The source path is the archive file it was opened from, or the directory it was filled from.
/// It only serves as the default target of [`Archive::dump`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    source_path: Option<PathBuf>,
    files: FileStore,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_store(files: FileStore) -> Self {
        Self {
            source_path: None,
            files,
        }
    }

    /// Open and decode the archive file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut archive = Self::new();
        archive.load(path)?;
        Ok(archive)
    }

    /// Replace the contents with the archive file at `path`.
    ///
    /// On failure the archive is left as it was.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| PsarcError::IO(std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e))))?;
        self.read_from(&mut BufReader::new(file))?;
        self.source_path = Some(path.to_path_buf());
        debug!("Loaded {} files from {}", self.files.len(), path.display());

        Ok(())
    }

    /// Replace the contents with the archive read from `reader`.
    ///
    /// On failure the archive is left as it was.
    pub fn read_from<R>(&mut self, reader: &mut R) -> Result<()>
    where
        R: Read + Seek,
    {
        self.files = read::read_archive(reader)?;
        Ok(())
    }

    /// Encode the archive to `writer`, returning the number of bytes written.
    pub fn write_to<W>(&self, writer: &mut W) -> Result<u64>
    where
        W: Write,
    {
        write::write_archive(writer, &self.files)
    }

    /// Save to `path`, forcing the `.psarc` extension. Returns the path actually written.
    ///
    /// The archive is written to a temporary file next to `path` and renamed into place, so a
    /// failed save never leaves a partial archive behind. Nothing is created when the archive
    /// cannot be encoded.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = archive_path(path.as_ref());
        let layout = ArchiveLayout::new(&self.files)?;

        let annotate = |e: std::io::Error| PsarcError::IO(std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e)));
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(annotate)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))
                .map_err(annotate)?;
        }

        let size = layout
            .write_to(&mut BufWriter::new(temp.as_file_mut()), &self.files)
            .map_err(|e| match e {
                PsarcError::IO(e) => annotate(e),
                other => other,
            })?;
        temp.persist(&path).map_err(|e| annotate(e.error))?;
        debug!("Saved {} files ({} bytes) to {}", self.files.len(), size, path.display());

        Ok(path)
    }

    /// Replace the contents with the regular files directly inside `dir`.
    ///
    /// On failure the archive is left as it was.
    pub fn fill(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        self.files = fs::fill_dir(dir)?;
        self.source_path = Some(dir.to_path_buf());
        Ok(())
    }

    /// Write every file into `target`, or into [`Archive::default_dump_dir`] when `None`.
    ///
    /// Returns the directory written to.
    pub fn dump(&self, target: Option<&Path>) -> Result<PathBuf> {
        self.dump_with(target, &DumpOptions::default())
    }

    pub fn dump_with(&self, target: Option<&Path>, options: &DumpOptions) -> Result<PathBuf> {
        let target = match target {
            Some(target) => target.to_path_buf(),
            None => self.default_dump_dir().ok_or(PsarcError::NoDumpTarget)?,
        };
        fs::dump_dir(&self.files, &target, options)?;

        Ok(target)
    }

    /// Sibling directory of the source named after its stem: `X/archive.psarc` gives `X/archive`.
    pub fn default_dump_dir(&self) -> Option<PathBuf> {
        let source = self.source_path.as_ref()?;
        let stem = source.file_stem()?;
        let parent = source.parent().unwrap_or(Path::new(""));
        Some(parent.join(stem))
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn set_source_path(&mut self, path: impl Into<PathBuf>) {
        self.source_path = Some(path.into());
    }

    pub fn add_file(&mut self, name: impl Into<String>, data: Vec<u8>) -> std::result::Result<(), DuplicateFile> {
        self.files.add_file(name, data)
    }

    pub fn remove_file(&mut self, name: &str) -> Result<FileRecord> {
        self.files.remove_file(name)
    }

    pub fn get_file(&self, name: &str) -> Option<&[u8]> {
        self.files.get_file(name)
    }

    /// Drop every file.
    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &FileStore {
        &self.files
    }

    pub fn into_store(self) -> FileStore {
        self.files
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// `path` with its extension forced to `.psarc`.
pub fn archive_path(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == spec::EXTENSION) {
        path.to_path_buf()
    } else {
        path.with_extension(spec::EXTENSION)
    }
}
