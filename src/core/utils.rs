use std::io::Write;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::{CodecError, Result};

/// Bounds-checked little-endian reader over a stored value
pub(crate) struct ValueCursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}
impl<'a> ValueCursor<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub(crate) fn slice_and_increment(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.bytes.len() - self.offset;
        if len > remaining {
            return Err(CodecError::Truncated(self.offset, len - remaining).into());
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.slice_and_increment(1)?[0])
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.slice_and_increment(4)?))
    }

    pub(crate) fn read_i64(&mut self) -> Result<i64> {
        Ok(LittleEndian::read_i64(self.slice_and_increment(8)?))
    }

    pub(crate) fn read_bool(&mut self) -> Result<bool> {
        let offset = self.offset;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            flag => Err(CodecError::InvalidFlag(flag, offset).into()),
        }
    }

    pub(crate) fn read_str(&mut self) -> Result<&'a str> {
        let len = self.read_u32()? as usize;
        let offset = self.offset;
        let bytes = self.slice_and_increment(len)?;
        std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8(offset).into())
    }

    /// Fails unless every byte was consumed
    pub(crate) fn finish(&self) -> Result<()> {
        let remaining = self.bytes.len() - self.offset;
        if remaining == 0 {
            Ok(())
        } else {
            Err(CodecError::TrailingBytes(remaining).into())
        }
    }
}

// Writes into a `Vec<u8>` cannot fail, so the io results are discarded.

pub(crate) fn write_u32(dst: &mut Vec<u8>, value: u32) {
    let _ = dst.write_u32::<LittleEndian>(value);
}

pub(crate) fn write_i64(dst: &mut Vec<u8>, value: i64) {
    let _ = dst.write_i64::<LittleEndian>(value);
}

pub(crate) fn write_str(dst: &mut Vec<u8>, value: &str) {
    write_u32(dst, value.len() as u32);
    let _ = dst.write_all(value.as_bytes());
}
