//! Raw on-disk structures.

mod entry;
mod header;

pub use entry::*;
pub use header::*;

/// `MRLK` read as a little-endian `u32`.
pub const MAGIC: u32 = 0x4B4C524D;
/// Size of the fixed part of the header.
pub const HEADER_SIZE: u32 = 0x18;
/// Size of one entry in the entry table.
pub const ENTRY_SIZE: u32 = 0x08;
/// Offset of the `string_table_size` field inside the header.
pub const STRING_TABLE_SIZE_OFFSET: u64 = 0x14;
/// Terminator appended to every name in the string table.
pub const NAME_DELIMITER: [u8; 2] = [b'\r', b'\n'];
/// File extension of archives, without the dot.
pub const EXTENSION: &str = "psarc";

/// Full header size, entry table included, for `file_count` entries.
pub fn full_header_size(file_count: u32) -> Option<u32> {
    ENTRY_SIZE.checked_mul(file_count)?.checked_add(HEADER_SIZE)
}
