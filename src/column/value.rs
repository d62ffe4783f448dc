//! Byte encodings of sample column values
//!
//! Main data is a length-prefixed string array:
//!
//! ```text
//! [count: u32][len: u32][utf8 bytes]...[len: u32][utf8 bytes]
//! ```
//!
//! Extra data is a length-prefixed key/value list followed by an optional file entry:
//!
//! ```text
//! [n: u32]([key][value])*n [has_file: u8]([file_id][call][n: u32]([key][value])*n)?
//! ```
//!
//! All integers are little-endian.

use std::collections::BTreeMap;

use crate::{
    core::{
        utils::{write_str, write_u32, ValueCursor},
        FileEntry,
    },
    error::Result,
};

/// Decodes a main data array
pub fn decode_main_data(bytes: &[u8]) -> Result<Vec<String>> {
    let mut cursor = ValueCursor::new(bytes);
    let count = cursor.read_u32()? as usize;
    // each entry needs at least its length prefix
    let mut values = Vec::with_capacity(count.min(bytes.len() / 4));
    for _ in 0..count {
        values.push(cursor.read_str()?.to_string());
    }
    cursor.finish()?;
    Ok(values)
}

/// Encodes a main data array
#[must_use]
pub fn encode_main_data<S: AsRef<str>>(values: &[S]) -> Vec<u8> {
    let mut buf = Vec::new();
    write_u32(&mut buf, values.len() as u32);
    for value in values {
        write_str(&mut buf, value.as_ref());
    }
    buf
}

/// The decoded side channel of one sample
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraSampleData {
    /// Field name to value, in stored order
    pub sample_data: Vec<(String, String)>,
    /// The source file the values come from, if any
    pub file: Option<FileEntry>,
}
impl ExtraSampleData {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = ValueCursor::new(bytes);
        let sample_data = read_pairs(&mut cursor)?;
        let file = if cursor.read_bool()? {
            let file_id = cursor.read_str()?;
            let call = cursor.read_str()?;
            let attributes = read_pairs(&mut cursor)?.into_iter().collect();
            Some(FileEntry::new(file_id, call, attributes))
        } else {
            None
        };
        cursor.finish()?;
        Ok(Self { sample_data, file })
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        write_pairs(
            &mut buf,
            self.sample_data.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            self.sample_data.len(),
        );
        match &self.file {
            Some(file) => {
                buf.push(1);
                write_str(&mut buf, &file.file_id);
                write_str(&mut buf, &file.call);
                write_pairs(
                    &mut buf,
                    file.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                    file.attributes.len(),
                );
            }
            None => buf.push(0),
        }
        buf
    }

    /// Adds a field value
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.sample_data.push((key.to_string(), value.to_string()));
        self
    }

    /// Sets the source file
    #[must_use]
    pub fn with_file(
        mut self,
        file_id: &str,
        call: &str,
        attributes: BTreeMap<String, String>,
    ) -> Self {
        self.file = Some(FileEntry::new(file_id, call, attributes));
        self
    }
}

fn read_pairs(cursor: &mut ValueCursor<'_>) -> Result<Vec<(String, String)>> {
    let count = cursor.read_u32()? as usize;
    let mut pairs = Vec::with_capacity(count.min(64));
    for _ in 0..count {
        let key = cursor.read_str()?.to_string();
        let value = cursor.read_str()?.to_string();
        pairs.push((key, value));
    }
    Ok(pairs)
}

fn write_pairs<'a, I>(buf: &mut Vec<u8>, pairs: I, len: usize)
where
    I: Iterator<Item = (&'a str, &'a str)>,
{
    write_u32(buf, len as u32);
    for (key, value) in pairs {
        write_str(buf, key);
        write_str(buf, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CodecError, Error};

    #[test]
    fn test_main_data_keeps_empty_values() {
        let bytes = encode_main_data(&["0/1", "", "PASS"]);
        assert_eq!(decode_main_data(&bytes).unwrap(), vec!["0/1", "", "PASS"]);
    }

    #[test]
    fn test_main_data_empty_array() {
        let bytes = encode_main_data::<&str>(&[]);
        assert!(decode_main_data(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_main_data_truncated() {
        let mut bytes = encode_main_data(&["0/1", "PASS"]);
        bytes.truncate(bytes.len() - 2);
        assert!(matches!(
            decode_main_data(&bytes),
            Err(Error::CodecError(CodecError::Truncated(_, 2)))
        ));
    }

    #[test]
    fn test_main_data_huge_count_fails_cleanly() {
        let bytes = [0xff, 0xff, 0xff, 0xff];
        assert!(decode_main_data(&bytes).is_err());
    }

    #[test]
    fn test_extra_data_with_file() {
        let mut attributes = BTreeMap::new();
        attributes.insert("QUAL".to_string(), "50".to_string());
        let extra = ExtraSampleData::default()
            .with("KEY_1", "VALUE_1")
            .with("KEY_2", "VALUE_2")
            .with_file("file1", "1:100:A:C:0", attributes);

        let decoded = ExtraSampleData::from_bytes(&extra.to_bytes()).unwrap();
        assert_eq!(decoded, extra);
        assert_eq!(decoded.sample_data[1].0, "KEY_2");
        assert_eq!(decoded.file.unwrap().attributes["QUAL"], "50");
    }

    #[test]
    fn test_extra_data_without_file() {
        let extra = ExtraSampleData::default().with("DP", "10");
        let decoded = ExtraSampleData::from_bytes(&extra.to_bytes()).unwrap();
        assert!(decoded.file.is_none());
    }

    #[test]
    fn test_extra_data_bad_flag() {
        let mut bytes = ExtraSampleData::default().to_bytes();
        *bytes.last_mut().unwrap() = 7;
        assert!(matches!(
            ExtraSampleData::from_bytes(&bytes),
            Err(Error::CodecError(CodecError::InvalidFlag(7, 4)))
        ));
    }
}
