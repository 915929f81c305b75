use std::io::Write;

use tracing::{debug, trace};

use crate::error::{PsarcError, Result};
use crate::spec::{self, Entry, Header};
use crate::store::FileStore;

/// Header, entry table and string table of an archive, with every offset resolved.
///
/// Entries and names are produced in one pass over the store, so index `i` of the entry table
/// always describes the `i`-th name of the string table.
#[derive(Debug, Clone)]
pub struct ArchiveLayout {
    pub header: Header,
    pub entries: Vec<Entry>,
    pub string_table: Vec<u8>,
}

impl ArchiveLayout {
    pub fn new(store: &FileStore) -> Result<Self> {
        if store.is_empty() {
            return Err(PsarcError::EmptyArchive);
        }

        let file_count = u32::try_from(store.len()).map_err(|_| PsarcError::ArchiveTooLarge)?;
        let header_size = spec::full_header_size(file_count).ok_or(PsarcError::ArchiveTooLarge)?;

        let mut string_table = Vec::new();
        let mut sizes = Vec::with_capacity(store.len());
        for (name, data) in store.iter() {
            if name.as_bytes().contains(&spec::NAME_DELIMITER[0]) {
                return Err(PsarcError::UnencodableName(name.to_string()));
            }
            string_table.extend_from_slice(name.as_bytes());
            string_table.extend_from_slice(&spec::NAME_DELIMITER);
            sizes.push(u32::try_from(data.len()).map_err(|_| PsarcError::ArchiveTooLarge)?);
        }
        let string_table_size = u32::try_from(string_table.len()).map_err(|_| PsarcError::ArchiveTooLarge)?;

        let mut offset = header_size as u64 + string_table_size as u64;
        let mut entries = Vec::with_capacity(sizes.len());
        for data_size in sizes {
            let data_offset = u32::try_from(offset).map_err(|_| PsarcError::ArchiveTooLarge)?;
            entries.push(Entry { data_offset, data_size });
            offset += data_size as u64;
        }

        let header = Header {
            magic: spec::MAGIC,
            reserved: 0,
            header_size,
            file_count,
            string_table_offset: header_size,
            string_table_size,
        };

        Ok(Self {
            header,
            entries,
            string_table,
        })
    }

    /// Total encoded size in bytes.
    pub fn archive_size(&self) -> u64 {
        self.entries
            .last()
            .map(|entry| entry.data_offset as u64 + entry.data_size as u64)
            .unwrap_or(self.header.header_size as u64 + self.string_table.len() as u64)
    }

    /// Write the archive described by this layout. `store` must be the store it was built from.
    pub(crate) fn write_to<W>(&self, writer: &mut W, store: &FileStore) -> Result<u64>
    where
        W: Write,
    {
        debug!(
            file_count = self.header.file_count,
            string_table_size = self.header.string_table_size,
            archive_size = self.archive_size(),
            "writing archive"
        );

        self.header.write_to(writer)?;
        for entry in &self.entries {
            entry.write_to(writer)?;
        }
        writer.write_all(&self.string_table)?;
        for ((name, data), entry) in store.iter().zip(&self.entries) {
            trace!(name, offset = entry.data_offset, size = entry.data_size, "writing file");
            writer.write_all(data)?;
        }
        writer.flush()?;

        Ok(self.archive_size())
    }
}

/// Encode `store` to `writer`, returning the number of bytes written.
///
/// Nothing is written when the store cannot be encoded.
pub fn write_archive<W>(writer: &mut W, store: &FileStore) -> Result<u64>
where
    W: Write,
{
    ArchiveLayout::new(store)?.write_to(writer, store)
}
