//! Length-prefixed binary encoding used for typed identities and multisig bundles.
//!
//! Every variable-length field is written as a little-endian `u32` length followed by the raw bytes. Lists are a
//! `u32` item count followed by each item as a length-prefixed field. Writers refuse anything the readers would
//! reject, so every encoding this module produces can be decoded again.

use crate::error::{ReadError, WriteError};
use std::io::{Read, Write};

/// Upper bound on a single length-prefixed field. Anything larger is treated as corrupt input.
pub const MAX_FIELD_LEN: usize = 1 << 24;
/// Upper bound on the number of items in an encoded list.
pub const MAX_LIST_LEN: usize = 1 << 16;

pub trait Writable {
    fn write<W: Write>(&self, writer: &mut W) -> Result<(), WriteError>;

    fn serialize(&self) -> Result<Vec<u8>, WriteError> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(buf)
    }
}

pub trait Readable: Sized {
    fn read<R: Read>(reader: &mut R) -> Result<Self, ReadError>;

    /// Decodes a value that must occupy the whole of `bytes`.
    fn from_bytes(bytes: &[u8]) -> Result<Self, ReadError> {
        let mut reader = bytes;
        let value = Self::read(&mut reader)?;
        if !reader.is_empty() {
            return Err(ReadError::new("trailer", format!("{} unexpected trailing bytes", reader.len())));
        }
        Ok(value)
    }
}

pub fn write_raw<W: Write>(writer: &mut W, bytes: &[u8], field: &str) -> Result<(), WriteError> {
    writer.write_all(bytes).map_err(|e| WriteError::new(field, e.to_string()))
}

fn write_u32<W: Write>(writer: &mut W, value: usize, max: usize, field: &str) -> Result<(), WriteError> {
    if value > max {
        return Err(WriteError::new(field, format!("length {value} exceeds maximum of {max}")));
    }
    // max is below u32::MAX, so the cast is lossless
    write_raw(writer, &(value as u32).to_le_bytes(), field)
}

pub fn write_bytes<W: Write>(writer: &mut W, bytes: &[u8], field: &str) -> Result<(), WriteError> {
    write_u32(writer, bytes.len(), MAX_FIELD_LEN, field)?;
    write_raw(writer, bytes, field)
}

pub fn write_byte_list<W: Write, B: AsRef<[u8]>>(writer: &mut W, items: &[B], field: &str) -> Result<(), WriteError> {
    write_u32(writer, items.len(), MAX_LIST_LEN, field)?;
    for item in items {
        write_bytes(writer, item.as_ref(), field)?;
    }
    Ok(())
}

fn read_u32<R: Read>(reader: &mut R, field: &str) -> Result<usize, ReadError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(|e| ReadError::new(field, e.to_string()))?;
    Ok(u32::from_le_bytes(buf) as usize)
}

pub fn read_bytes<R: Read>(reader: &mut R, field: &str) -> Result<Vec<u8>, ReadError> {
    let len = read_u32(reader, field)?;
    if len > MAX_FIELD_LEN {
        return Err(ReadError::new(field, format!("length {len} exceeds maximum of {MAX_FIELD_LEN}")));
    }
    // Only allocate what the reader actually holds
    let mut buf = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut buf).map_err(|e| ReadError::new(field, e.to_string()))?;
    if buf.len() != len {
        return Err(ReadError::new(field, format!("expected {len} bytes, found {}", buf.len())));
    }
    Ok(buf)
}

pub fn read_byte_list<R: Read>(reader: &mut R, field: &str) -> Result<Vec<Vec<u8>>, ReadError> {
    let count = read_u32(reader, field)?;
    if count > MAX_LIST_LEN {
        return Err(ReadError::new(field, format!("item count {count} exceeds maximum of {MAX_LIST_LEN}")));
    }
    (0..count).map(|_| read_bytes(reader, field)).collect()
}
