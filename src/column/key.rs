//! Column identifier grammar
//!
//! Sample-scoped columns are named `<studyId>_<sampleId>_<suffix>`; the legacy
//! genotype-group marker is study scoped and named `<studyId>_HR`. Any other
//! suffix is not ours and is skipped so that newer writers can add columns.

use memchr::{memchr_iter, memrchr};

use crate::error::{ColumnError, Result};

/// Separator between the components of a column identifier
pub const COLUMN_KEY_SEPARATOR: u8 = b'_';

/// Suffix of the dense per-sample format array
pub const MAIN_DATA_SUFFIX: &[u8] = b"S";

/// Suffix of the per-sample key/value side channel
pub const EXTRA_DATA_SUFFIX: &[u8] = b"X";

/// Suffix of the study-scoped legacy genotype-group column
pub const LEGACY_MARKER_SUFFIX: &[u8] = b"HR";

/// A classified column identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    MainData { study_id: u32, sample_id: u32 },
    ExtraData { study_id: u32, sample_id: u32 },
    LegacyMarker { study_id: u32 },
}
impl ColumnKey {
    /// Classifies a raw column identifier
    ///
    /// # Returns
    ///
    /// * `Ok(Some(key))` - The column belongs to the decoder
    /// * `Ok(None)` - The suffix is not recognized and the column should be ignored
    /// * `Err(Error)` - The suffix is recognized but the ids do not parse
    pub fn parse(column: &[u8]) -> Result<Option<Self>> {
        let Some(split) = memrchr(COLUMN_KEY_SEPARATOR, column) else {
            return Ok(None);
        };
        let (prefix, suffix) = (&column[..split], &column[split + 1..]);
        let key = match suffix {
            MAIN_DATA_SUFFIX => {
                let (study_id, sample_id) = parse_sample_prefix(column, prefix)?;
                Self::MainData {
                    study_id,
                    sample_id,
                }
            }
            EXTRA_DATA_SUFFIX => {
                let (study_id, sample_id) = parse_sample_prefix(column, prefix)?;
                Self::ExtraData {
                    study_id,
                    sample_id,
                }
            }
            LEGACY_MARKER_SUFFIX => Self::LegacyMarker {
                study_id: parse_id(column, prefix)?,
            },
            _ => return Ok(None),
        };
        Ok(Some(key))
    }

    #[must_use]
    pub fn study_id(&self) -> u32 {
        match self {
            Self::MainData { study_id, .. }
            | Self::ExtraData { study_id, .. }
            | Self::LegacyMarker { study_id } => *study_id,
        }
    }

    #[must_use]
    pub fn sample_id(&self) -> Option<u32> {
        match self {
            Self::MainData { sample_id, .. } | Self::ExtraData { sample_id, .. } => {
                Some(*sample_id)
            }
            Self::LegacyMarker { .. } => None,
        }
    }

    /// Renders the column identifier
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(16);
        let mut ibuf = itoa::Buffer::new();
        buf.extend_from_slice(ibuf.format(self.study_id()).as_bytes());
        buf.push(COLUMN_KEY_SEPARATOR);
        let suffix = match self {
            Self::MainData { sample_id, .. } | Self::ExtraData { sample_id, .. } => {
                buf.extend_from_slice(ibuf.format(*sample_id).as_bytes());
                buf.push(COLUMN_KEY_SEPARATOR);
                if matches!(self, Self::MainData { .. }) {
                    MAIN_DATA_SUFFIX
                } else {
                    EXTRA_DATA_SUFFIX
                }
            }
            Self::LegacyMarker { .. } => LEGACY_MARKER_SUFFIX,
        };
        buf.extend_from_slice(suffix);
        buf
    }
}

/// Identifier of a sample's main data column
#[must_use]
pub fn main_data_key(study_id: u32, sample_id: u32) -> Vec<u8> {
    ColumnKey::MainData {
        study_id,
        sample_id,
    }
    .to_bytes()
}

/// Identifier of a sample's extra data column
#[must_use]
pub fn extra_data_key(study_id: u32, sample_id: u32) -> Vec<u8> {
    ColumnKey::ExtraData {
        study_id,
        sample_id,
    }
    .to_bytes()
}

/// Identifier of a study's legacy genotype-group column
#[must_use]
pub fn legacy_marker_key(study_id: u32) -> Vec<u8> {
    ColumnKey::LegacyMarker { study_id }.to_bytes()
}

fn malformed(column: &[u8]) -> ColumnError {
    ColumnError::MalformedColumn(String::from_utf8_lossy(column).into_owned())
}

fn parse_id(column: &[u8], token: &[u8]) -> Result<u32> {
    // reject signs and whitespace that `str::parse` would otherwise tolerate
    if token.is_empty() || !token.iter().all(u8::is_ascii_digit) {
        return Err(malformed(column).into());
    }
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| malformed(column).into())
}

/// Splits `<studyId>_<sampleId>[_...]`, ignoring any middle components
fn parse_sample_prefix(column: &[u8], prefix: &[u8]) -> Result<(u32, u32)> {
    let mut seps = memchr_iter(COLUMN_KEY_SEPARATOR, prefix);
    let Some(first) = seps.next() else {
        return Err(malformed(column).into());
    };
    let second = seps.next().unwrap_or(prefix.len());
    let study_id = parse_id(column, &prefix[..first])?;
    let sample_id = parse_id(column, &prefix[first + 1..second])?;
    Ok((study_id, sample_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_main_data() {
        let key = ColumnKey::parse(b"1_23_S").unwrap();
        assert_eq!(
            key,
            Some(ColumnKey::MainData {
                study_id: 1,
                sample_id: 23
            })
        );
    }

    #[test]
    fn test_parse_extra_data() {
        let key = ColumnKey::parse(b"4_5_X").unwrap().unwrap();
        assert_eq!(key.study_id(), 4);
        assert_eq!(key.sample_id(), Some(5));
        assert!(matches!(key, ColumnKey::ExtraData { .. }));
    }

    #[test]
    fn test_parse_legacy_marker() {
        let key = ColumnKey::parse(b"7_HR").unwrap().unwrap();
        assert_eq!(key, ColumnKey::LegacyMarker { study_id: 7 });
        assert_eq!(key.sample_id(), None);
    }

    #[test]
    fn test_unknown_suffix_ignored() {
        assert_eq!(ColumnKey::parse(b"1_2_STATS").unwrap(), None);
        assert_eq!(ColumnKey::parse(b"ANNOTATION").unwrap(), None);
        assert_eq!(ColumnKey::parse(b"").unwrap(), None);
    }

    #[test]
    fn test_middle_components_ignored() {
        let key = ColumnKey::parse(b"1_2_extra_S").unwrap();
        assert_eq!(
            key,
            Some(ColumnKey::MainData {
                study_id: 1,
                sample_id: 2
            })
        );
    }

    #[test]
    fn test_malformed_known_suffix() {
        let columns: [&[u8]; 7] = [
            b"a_2_S", b"1_b_X", b"_S", b"1__S", b"x_HR", b"1_2_HR", b"-1_2_S",
        ];
        for column in columns {
            let result = ColumnKey::parse(column);
            assert!(
                matches!(result, Err(Error::ColumnError(ColumnError::MalformedColumn(_)))),
                "{}",
                String::from_utf8_lossy(column)
            );
        }
    }

    #[test]
    fn test_malformed_error_names_column() {
        let error = ColumnKey::parse(b"abc_1_S").unwrap_err();
        assert!(format!("{}", error).contains("abc_1_S"));
    }

    #[test]
    fn test_key_builders() {
        assert_eq!(main_data_key(1, 3), b"1_3_S");
        assert_eq!(extra_data_key(12, 0), b"12_0_X");
        assert_eq!(legacy_marker_key(5), b"5_HR");
        for key in [main_data_key(9, 10), extra_data_key(9, 10), legacy_marker_key(9)] {
            let parsed = ColumnKey::parse(&key).unwrap().unwrap();
            assert_eq!(parsed.to_bytes(), key);
        }
    }

    #[test]
    fn test_id_overflow_is_malformed() {
        assert!(ColumnKey::parse(b"99999999999_1_S").is_err());
    }
}
