//! Moving files between a [`FileStore`] and a directory.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{PsarcError, Result};
use crate::store::FileStore;

#[derive(Debug, Clone)]
pub enum DumpEvent {
    Start { total: usize },
    FileDone { name: String, path: PathBuf },
    Finish { written: usize },
}

/// Options for [`dump_dir`].
#[derive(Clone)]
pub struct DumpOptions {
    overwrite: bool,
    legacy_names: bool,
    on_event: Option<Arc<dyn Fn(DumpEvent) + Send + Sync>>,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            legacy_names: false,
            on_event: None,
        }
    }
}

impl std::fmt::Debug for DumpOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpOptions")
            .field("overwrite", &self.overwrite)
            .field("legacy_names", &self.legacy_names)
            .field("on_event", &self.on_event.is_some())
            .finish()
    }
}

impl DumpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace files that already exist in the target directory. On by default.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Name output files with [`legacy_split_name`] instead of the stored name.
    pub fn legacy_names(mut self, enabled: bool) -> Self {
        self.legacy_names = enabled;
        self
    }

    pub fn on_event<F>(mut self, on_event: F) -> Self
    where
        F: Fn(DumpEvent) + Send + Sync + 'static,
    {
        self.on_event = Some(Arc::new(on_event));
        self
    }

    fn emit(&self, event: DumpEvent) {
        if let Some(on_event) = &self.on_event {
            on_event(event);
        }
    }
}

/// Read every regular file directly inside `dir`, keyed by file name.
///
/// Subdirectories are not descended into.
pub fn fill_dir(dir: impl AsRef<Path>) -> Result<FileStore> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Err(PsarcError::IO(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory does not exist: {}", dir.display()),
        )));
    }
    if !dir.is_dir() {
        return Err(PsarcError::IO(std::io::Error::new(
            std::io::ErrorKind::NotADirectory,
            format!("Not a directory: {}", dir.display()),
        )));
    }

    let mut store = FileStore::new();
    let walker = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => {
                warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
            Err(e) => return Err(PsarcError::IO(e.into())),
        };
        if !entry.file_type().is_file() {
            debug!("Skipping non-regular entry {}", entry.path().display());
            continue;
        }

        let name = entry
            .file_name()
            .to_str()
            .ok_or_else(|| PsarcError::InvalidFileName(entry.path().to_path_buf()))?
            .to_string();
        let data = std::fs::read(entry.path())?;
        store.add_file(name, data)?;
    }
    debug!("Collected {} files from {}", store.len(), dir.display());

    Ok(store)
}

/// Write every file of `store` into `target`, creating the directory if needed.
///
/// All names are checked before anything is written. Returns the number of files written.
pub fn dump_dir(store: &FileStore, target: impl AsRef<Path>, options: &DumpOptions) -> Result<usize> {
    let target = target.as_ref();
    if store.is_empty() {
        return Err(PsarcError::EmptyArchive);
    }

    let mut tasks = Vec::with_capacity(store.len());
    for (name, data) in store.iter() {
        let file_name = output_file_name(name, options.legacy_names)?;
        tasks.push((name, file_name, data));
    }

    if !target.exists() {
        std::fs::create_dir_all(target)?;
    }
    options.emit(DumpEvent::Start { total: tasks.len() });

    let mut open_options = OpenOptions::new();
    if options.overwrite {
        open_options.create(true).write(true).truncate(true);
    } else {
        open_options.create_new(true).write(true);
    }

    for (name, file_name, data) in &tasks {
        let path = target.join(file_name);
        let mut file = open_options.open(&path)?;
        file.write_all(data)?;
        file.flush()?;

        options.emit(DumpEvent::FileDone {
            name: name.to_string(),
            path,
        });
    }
    options.emit(DumpEvent::Finish { written: tasks.len() });

    Ok(tasks.len())
}

/// Legacy on-disk naming, kept for output that older tooling expects.
///
/// Splits at the first `.` and keeps at most four characters from it as the extension, so
/// `model.mesh` becomes `("model", ".mes")` and `a.b.c` becomes `("a", ".b.c")`. A name
/// without a `.` has no extension.
pub fn legacy_split_name(name: &str) -> (&str, &str) {
    match name.find('.') {
        Some(dot) => {
            let rest = &name[dot..];
            let end = rest.char_indices().nth(4).map(|(i, _)| i).unwrap_or(rest.len());
            (&name[..dot], &rest[..end])
        }
        None => (name, ""),
    }
}

fn output_file_name(name: &str, legacy: bool) -> Result<String> {
    let file_name = if legacy {
        let (stem, ext) = legacy_split_name(name);
        format!("{stem}{ext}")
    } else {
        name.to_string()
    };

    if file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains(['/', '\\', '\0'])
    {
        return Err(PsarcError::UnsafeName(name.to_string()));
    }

    Ok(file_name)
}
