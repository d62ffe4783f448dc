//! Wide-column naming and value encodings

mod key;
mod value;

pub use key::{
    extra_data_key, legacy_marker_key, main_data_key, ColumnKey, COLUMN_KEY_SEPARATOR,
    EXTRA_DATA_SUFFIX, LEGACY_MARKER_SUFFIX, MAIN_DATA_SUFFIX,
};
pub use value::{decode_main_data, encode_main_data, ExtraSampleData};

/// A classified column with its raw value
///
/// Produced once per column by the key parser and dispatched by `match`.
#[derive(Debug, Clone, Copy)]
pub enum ColumnValue<'a> {
    MainData { sample_id: u32, value: &'a [u8] },
    ExtraData { sample_id: u32, value: &'a [u8] },
    LegacyMarker { value: &'a [u8] },
}
impl<'a> ColumnValue<'a> {
    #[must_use]
    pub fn new(key: ColumnKey, value: &'a [u8]) -> Self {
        match key {
            ColumnKey::MainData { sample_id, .. } => Self::MainData { sample_id, value },
            ColumnKey::ExtraData { sample_id, .. } => Self::ExtraData { sample_id, value },
            ColumnKey::LegacyMarker { .. } => Self::LegacyMarker { value },
        }
    }
}
