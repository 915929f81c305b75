use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub magic: u32,
    pub reserved: u32,
    pub header_size: u32,
    pub file_count: u32,
    pub string_table_offset: u32,
    pub string_table_size: u32,
}

impl Header {
    pub const SIZE: usize = super::HEADER_SIZE as usize;

    pub fn from_reader<R>(reader: &mut R) -> std::io::Result<Self>
    where
        R: Read,
    {
        Ok(Self {
            magic: reader.read_u32::<LittleEndian>()?,
            reserved: reader.read_u32::<LittleEndian>()?,
            header_size: reader.read_u32::<LittleEndian>()?,
            file_count: reader.read_u32::<LittleEndian>()?,
            string_table_offset: reader.read_u32::<LittleEndian>()?,
            string_table_size: reader.read_u32::<LittleEndian>()?,
        })
    }

    pub fn write_to<W>(&self, writer: &mut W) -> std::io::Result<()>
    where
        W: Write,
    {
        writer.write_u32::<LittleEndian>(self.magic)?;
        writer.write_u32::<LittleEndian>(self.reserved)?;
        writer.write_u32::<LittleEndian>(self.header_size)?;
        writer.write_u32::<LittleEndian>(self.file_count)?;
        writer.write_u32::<LittleEndian>(self.string_table_offset)?;
        writer.write_u32::<LittleEndian>(self.string_table_size)
    }
}
