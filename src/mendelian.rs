//! Mendelian-error sample index values
//!
//! A value is a list of records separated by `,`. Each record is
//! `<variant>_<genotype>_<genotype index>[:<error code>]`. Variants may contain
//! `_` themselves, so records are split at their last two field separators.

use memchr::{memchr, memrchr};

use crate::{
    core::VariantCoordinate,
    error::{MendelianError, Result},
};

pub const RECORD_SEPARATOR: u8 = b',';
pub const FIELD_SEPARATOR: u8 = b'_';
pub const CODE_SEPARATOR: u8 = b':';

/// One decoded Mendelian-error record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MendelianErrorRecord {
    pub variant: VariantCoordinate,
    pub genotype: String,
    /// Position of the child genotype in the sample index
    pub genotype_index: u32,
    /// Absent in values written before codes were stored
    pub error_code: Option<u32>,
}

/// Appends one record to a value
pub fn write_mendelian_error(
    buf: &mut Vec<u8>,
    variant: &VariantCoordinate,
    genotype: &str,
    genotype_index: u32,
    error_code: u32,
) {
    if !buf.is_empty() {
        buf.push(RECORD_SEPARATOR);
    }
    let mut ibuf = itoa::Buffer::new();
    buf.extend_from_slice(variant.to_string().as_bytes());
    buf.push(FIELD_SEPARATOR);
    buf.extend_from_slice(genotype.as_bytes());
    buf.push(FIELD_SEPARATOR);
    buf.extend_from_slice(ibuf.format(genotype_index).as_bytes());
    buf.push(CODE_SEPARATOR);
    buf.extend_from_slice(ibuf.format(error_code).as_bytes());
}

/// Forward-only iterator over the records of a value
///
/// The `next_*` accessors look at the upcoming record without consuming it.
#[derive(Debug, Clone)]
pub struct MendelianErrorIter<'a> {
    remaining: Option<&'a [u8]>,
    peeked: Option<MendelianErrorRecord>,
}
impl<'a> MendelianErrorIter<'a> {
    #[must_use]
    pub fn new(value: &'a [u8]) -> Self {
        Self {
            remaining: (!value.is_empty()).then_some(value),
            peeked: None,
        }
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.peeked.is_some() || self.remaining.is_some()
    }

    fn next_raw(&mut self) -> Option<&'a [u8]> {
        let remaining = self.remaining?;
        match memchr(RECORD_SEPARATOR, remaining) {
            Some(idx) => {
                self.remaining = Some(&remaining[idx + 1..]);
                Some(&remaining[..idx])
            }
            None => {
                self.remaining = None;
                Some(remaining)
            }
        }
    }

    fn peek(&mut self) -> Result<Option<&MendelianErrorRecord>> {
        if self.peeked.is_none() {
            if let Some(raw) = self.next_raw() {
                self.peeked = Some(parse_record(raw)?);
            }
        }
        Ok(self.peeked.as_ref())
    }

    pub fn next_index(&mut self) -> Result<Option<u32>> {
        Ok(self.peek()?.map(|record| record.genotype_index))
    }

    pub fn next_genotype(&mut self) -> Result<Option<&str>> {
        Ok(self.peek()?.map(|record| record.genotype.as_str()))
    }

    pub fn next_error_code(&mut self) -> Result<Option<u32>> {
        Ok(self.peek()?.and_then(|record| record.error_code))
    }

    /// Moves past the upcoming record
    pub fn skip_record(&mut self) -> Result<()> {
        self.next().transpose().map(|_| ())
    }
}
impl Iterator for MendelianErrorIter<'_> {
    type Item = Result<MendelianErrorRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(record) = self.peeked.take() {
            return Some(Ok(record));
        }
        self.next_raw().map(parse_record)
    }
}

fn parse_record(raw: &[u8]) -> Result<MendelianErrorRecord> {
    let text = std::str::from_utf8(raw)?;
    let malformed = || MendelianError::MalformedRecord(text.to_string());
    let idx2 = memrchr(FIELD_SEPARATOR, raw).ok_or_else(malformed)?;
    let idx1 = memrchr(FIELD_SEPARATOR, &raw[..idx2]).ok_or_else(malformed)?;

    let variant: VariantCoordinate = text[..idx1].parse()?;
    let genotype = text[idx1 + 1..idx2].to_string();
    let index_code = &text[idx2 + 1..];
    let (index, code) = match index_code.rsplit_once(char::from(CODE_SEPARATOR)) {
        Some((index, code)) => (index, Some(code)),
        None => (index_code, None),
    };
    let genotype_index: u32 = index
        .parse()
        .map_err(|_| MendelianError::InvalidIndex(index.to_string()))?;
    let error_code: Option<u32> = code
        .map(|code| code.parse().map_err(|_| malformed()))
        .transpose()?;

    Ok(MendelianErrorRecord {
        variant,
        genotype,
        genotype_index,
        error_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn value() -> Vec<u8> {
        let mut buf = Vec::new();
        write_mendelian_error(&mut buf, &VariantCoordinate::new("1", 100, "A", "C"), "0/1", 3, 2);
        write_mendelian_error(
            &mut buf,
            &VariantCoordinate::new("chrUn_gl000220", 7, "-", "T"),
            "1/1",
            0,
            5,
        );
        buf
    }

    #[test]
    fn test_encoded_layout() {
        assert_eq!(value(), b"1:100:A:C_0/1_3:2,chrUn_gl000220:7:-:T_1/1_0:5".to_vec());
    }

    #[test]
    fn test_iterate_records() {
        let value = value();
        let records: Vec<_> = MendelianErrorIter::new(&value)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].variant.to_string(), "1:100:A:C");
        assert_eq!(records[0].genotype, "0/1");
        assert_eq!(records[0].genotype_index, 3);
        assert_eq!(records[0].error_code, Some(2));
        assert_eq!(records[1].variant.chromosome(), "chrUn_gl000220");
        assert_eq!(records[1].variant.reference(), "");
    }

    #[test]
    fn test_peek_then_skip() {
        let value = value();
        let mut iter = MendelianErrorIter::new(&value);
        assert_eq!(iter.next_index().unwrap(), Some(3));
        assert_eq!(iter.next_genotype().unwrap(), Some("0/1"));
        assert_eq!(iter.next_error_code().unwrap(), Some(2));
        iter.skip_record().unwrap();

        assert!(iter.has_next());
        assert_eq!(iter.next_genotype().unwrap(), Some("1/1"));
        assert_eq!(iter.next().unwrap().unwrap().genotype_index, 0);
        assert!(!iter.has_next());
        assert_eq!(iter.next_index().unwrap(), None);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_record_without_code() {
        let mut iter = MendelianErrorIter::new(b"2:5:G:A_0/1_4");
        let record = iter.next().unwrap().unwrap();
        assert_eq!(record.genotype_index, 4);
        assert_eq!(record.error_code, None);
    }

    #[test]
    fn test_empty_value() {
        let mut iter = MendelianErrorIter::new(b"");
        assert!(!iter.has_next());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_malformed_records() {
        let mut iter = MendelianErrorIter::new(b"1:100:A:C");
        assert!(matches!(
            iter.next(),
            Some(Err(Error::MendelianError(MendelianError::MalformedRecord(_))))
        ));

        let mut iter = MendelianErrorIter::new(b"1:100:A:C_0/1_x:2");
        assert!(matches!(
            iter.next_index(),
            Err(Error::MendelianError(MendelianError::InvalidIndex(_)))
        ));
    }
}
