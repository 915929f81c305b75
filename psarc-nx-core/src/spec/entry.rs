use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// Location of one file's bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Entry {
    pub data_offset: u32,
    pub data_size: u32,
}

impl Entry {
    pub const SIZE: usize = super::ENTRY_SIZE as usize;

    pub fn from_reader<R>(reader: &mut R) -> std::io::Result<Self>
    where
        R: Read,
    {
        Ok(Self {
            data_offset: reader.read_u32::<LittleEndian>()?,
            data_size: reader.read_u32::<LittleEndian>()?,
        })
    }

    pub fn write_to<W>(&self, writer: &mut W) -> std::io::Result<()>
    where
        W: Write,
    {
        writer.write_u32::<LittleEndian>(self.data_offset)?;
        writer.write_u32::<LittleEndian>(self.data_size)
    }
}
