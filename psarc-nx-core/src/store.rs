use std::collections::BTreeMap;

use crate::error::{PsarcError, Result};

/// A file taken out of a [`FileStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    pub data: Vec<u8>,
}

impl FileRecord {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Returned by [`FileStore::add_file`] when the name is taken.
///
/// The store did not take ownership, so the rejected buffer travels back to the caller.
#[derive(Debug, thiserror::Error)]
#[error("File `{name}` already exists in the archive")]
pub struct DuplicateFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl DuplicateFile {
    pub fn into_inner(self) -> (String, Vec<u8>) {
        (self.name, self.data)
    }
}

/// Name-ordered set of owned files.
///
/// Iteration is ascending byte-wise name order, which is also the order files are encoded in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStore {
    files: BTreeMap<String, Vec<u8>>,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, name: impl Into<String>, data: Vec<u8>) -> std::result::Result<(), DuplicateFile> {
        use std::collections::btree_map::Entry;

        match self.files.entry(name.into()) {
            Entry::Vacant(slot) => {
                slot.insert(data);
                Ok(())
            }
            Entry::Occupied(slot) => Err(DuplicateFile {
                name: slot.key().clone(),
                data,
            }),
        }
    }

    pub fn remove_file(&mut self, name: &str) -> Result<FileRecord> {
        self.files
            .remove_entry(name)
            .map(|(name, data)| FileRecord { name, data })
            .ok_or_else(|| PsarcError::NotFound(name.to_string()))
    }

    pub fn get_file(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of all file sizes.
    pub fn total_size(&self) -> u64 {
        self.files.values().map(|data| data.len() as u64).sum()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(name, data)| (name.as_str(), data.as_slice()))
    }

    pub fn into_records(self) -> impl Iterator<Item = FileRecord> {
        self.files.into_iter().map(|(name, data)| FileRecord { name, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileStore {
        let mut store = FileStore::new();
        store.add_file("b.bin", vec![4, 5]).unwrap();
        store.add_file("a.bin", vec![1, 2, 3]).unwrap();
        store
    }

    #[test]
    fn test_duplicate_add_hands_buffer_back() {
        let mut store = sample();
        let err = store.add_file("a.bin", vec![9, 9, 9, 9]).unwrap_err();
        let (name, data) = err.into_inner();
        assert_eq!(name, "a.bin");
        assert_eq!(data, vec![9, 9, 9, 9]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get_file("a.bin"), Some(&[1u8, 2, 3][..]));
        assert_eq!(store.get_file("b.bin"), Some(&[4u8, 5][..]));
    }

    #[test]
    fn test_remove_absent_is_not_found() {
        let mut store = sample();
        let err = store.remove_file("c.bin").unwrap_err();
        assert!(matches!(err, PsarcError::NotFound(ref name) if name == "c.bin"));
        assert_eq!(store.len(), 2);

        let record = store.remove_file("a.bin").unwrap();
        assert_eq!(record.size(), 3);
        assert_eq!(store.len(), 1);
        assert!(!store.contains("a.bin"));
    }

    // The tool this format comes from returned nothing from its lookup even on a hit.
    // A hit must return the stored bytes.
    #[test]
    fn test_get_file_returns_data_on_hit() {
        let store = sample();
        assert_eq!(store.get_file("b.bin"), Some(&[4u8, 5][..]));
        assert_eq!(store.get_file("missing"), None);
    }

    #[test]
    fn test_iteration_is_name_sorted() {
        let mut store = sample();
        store.add_file("A.bin", vec![]).unwrap();
        store.add_file("_.bin", vec![]).unwrap();
        let names: Vec<_> = store.names().collect();
        assert_eq!(names, ["A.bin", "_.bin", "a.bin", "b.bin"]);
    }

    #[test]
    fn test_clear() {
        let mut store = sample();
        assert_eq!(store.total_size(), 5);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.total_size(), 0);
        assert_eq!(store.iter().len(), 0);
    }

    #[test]
    fn test_replace_is_remove_then_add() {
        let mut store = sample();
        store.remove_file("a.bin").unwrap();
        store.add_file("a.bin", vec![7]).unwrap();
        assert_eq!(store.get_file("a.bin"), Some(&[7u8][..]));
    }
}
