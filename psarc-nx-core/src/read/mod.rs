use std::io::{Read, Seek, SeekFrom};

use byteorder::ReadBytesExt;
use tracing::{debug, trace};

use crate::error::{PsarcError, Result};
use crate::spec::{self, Entry, Header};
use crate::store::FileStore;

/// Upper bound for preallocation driven by an untrusted `file_count`.
const MAX_PREALLOC_ENTRIES: usize = 4096;

/// Decode an archive into a fresh [`FileStore`].
///
/// The reader must be positioned at the start of the archive.
pub fn read_archive<R>(reader: &mut R) -> Result<FileStore>
where
    R: Read + Seek,
{
    let header = read_header(reader)?;
    let entries = read_entries(reader, header.file_count)?;

    reader.seek(SeekFrom::Start(header.string_table_offset as u64))?;

    let mut store = FileStore::new();
    for (index, entry) in entries.iter().enumerate() {
        let name = read_name(reader, index)?;
        let next_name_pos = reader.stream_position()?;

        reader.seek(SeekFrom::Start(entry.data_offset as u64))?;
        let data = read_data(reader, entry.data_size)?;
        reader.seek(SeekFrom::Start(next_name_pos))?;

        trace!(index, name = %name, offset = entry.data_offset, size = entry.data_size, "decoded file");
        store.add_file(name, data).map_err(|e| PsarcError::DuplicateEntry(e.name))?;
    }

    Ok(store)
}

pub fn read_header<R>(reader: &mut R) -> Result<Header>
where
    R: Read,
{
    let header = Header::from_reader(reader).map_err(|e| PsarcError::eof_as_truncated(e, "header"))?;
    if header.magic != spec::MAGIC {
        return Err(PsarcError::InvalidMagic {
            expected: spec::MAGIC,
            found: header.magic,
        });
    }
    if header.reserved != 0 {
        return Err(PsarcError::UnsupportedReserved(header.reserved));
    }
    debug!(
        header_size = header.header_size,
        file_count = header.file_count,
        string_table_offset = header.string_table_offset,
        string_table_size = header.string_table_size,
        "read archive header"
    );

    Ok(header)
}

fn read_entries<R>(reader: &mut R, file_count: u32) -> Result<Vec<Entry>>
where
    R: Read,
{
    let mut entries = Vec::with_capacity((file_count as usize).min(MAX_PREALLOC_ENTRIES));
    for _ in 0..file_count {
        let entry = Entry::from_reader(reader).map_err(|e| PsarcError::eof_as_truncated(e, "entry table"))?;
        entries.push(entry);
    }

    Ok(entries)
}

/// Read one name up to its CR terminator, then skip the byte after it.
///
/// The skipped byte is LF in every archive written by this crate, but it is not checked.
fn read_name<R>(reader: &mut R, index: usize) -> Result<String>
where
    R: Read,
{
    let mut name = Vec::new();
    loop {
        let byte = reader
            .read_u8()
            .map_err(|e| PsarcError::eof_as_truncated(e, "string table"))?;
        if byte == spec::NAME_DELIMITER[0] {
            break;
        }
        name.push(byte);
    }
    reader
        .read_u8()
        .map_err(|e| PsarcError::eof_as_truncated(e, "string table"))?;

    String::from_utf8(name).map_err(|_| PsarcError::InvalidName { index })
}

fn read_data<R>(reader: &mut R, size: u32) -> Result<Vec<u8>>
where
    R: Read,
{
    // grow with the stream instead of trusting `size` for the allocation
    let mut data = Vec::new();
    reader.by_ref().take(size as u64).read_to_end(&mut data)?;
    if data.len() != size as usize {
        return Err(PsarcError::Truncated("file data"));
    }

    Ok(data)
}
