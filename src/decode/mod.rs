//! Row decoding
//!
//! A [`Decoder`] turns one wide-column row into a [`StudyRecord`] per study. The
//! row's columns are classified by their keys and grouped by study, then each
//! study is decoded in four steps:
//!
//! 1. main and extra data columns fill the per-sample field lists
//! 2. secondary alternate references carried by main data are reconciled
//! 3. a legacy genotype-group payload, if present, is overlaid
//! 4. samples still without data get default values
//!
//! ```rust
//! use widevar::{
//!     DecoderOptions, Decoder, InMemoryMetadata, MemoryRow, StudyMetadata, VariantCoordinate,
//! };
//!
//! let mut study = StudyMetadata::new(1, "1kg");
//! study.index_sample(10, "NA001");
//! study.index_sample(11, "NA002");
//! let metadata = InMemoryMetadata::new();
//! metadata.insert(study);
//!
//! let mut row = MemoryRow::new(VariantCoordinate::new("1", 1000, "A", "C"));
//! row.add_main_data(1, 10, &["0/1", "PASS"]);
//!
//! let decoder = Decoder::new(metadata, DecoderOptions::default());
//! let decoded = decoder.decode(&row).unwrap();
//! let record = decoded.study(1).unwrap();
//! assert_eq!(record.sample_field("NA001", "GT"), Some("0/1"));
//! assert_eq!(record.sample_field("NA002", "GT"), Some("?/?"));
//! ```

mod alternates;
mod fill;
mod legacy;
mod samples;

use std::{collections::BTreeMap, sync::Arc};

use auto_impl::auto_impl;
use log::trace;

use crate::{
    column::{
        encode_main_data, extra_data_key, legacy_marker_key, main_data_key, ColumnKey, ColumnValue,
        ExtraSampleData,
    },
    core::{StudyRecord, VariantCoordinate},
    error::{Component, Error, IntegrityError, Result, StudyRef},
    legacy::GenotypeGroupRow,
    metadata::{StudyMetadata, StudyMetadataSource},
    options::DecoderOptions,
    resolver::StudyResolver,
};

/// A stored row: one variant with its columns
#[auto_impl(&, Box, Arc)]
pub trait VariantRow {
    fn variant(&self) -> &VariantCoordinate;

    /// Calls `f` with the key and value of every column
    fn for_each_column<'a>(&'a self, f: &mut dyn FnMut(&'a [u8], &'a [u8]));
}

/// An in-memory row with ordered columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRow {
    variant: VariantCoordinate,
    columns: BTreeMap<Vec<u8>, Vec<u8>>,
}
impl MemoryRow {
    #[must_use]
    pub fn new(variant: VariantCoordinate) -> Self {
        Self {
            variant,
            columns: BTreeMap::new(),
        }
    }

    /// Sets a raw column, replacing any previous value
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.columns.insert(key.into(), value.into());
    }

    pub fn add_main_data<S: AsRef<str>>(&mut self, study_id: u32, sample_id: u32, values: &[S]) {
        self.insert(main_data_key(study_id, sample_id), encode_main_data(values));
    }

    pub fn add_extra_data(&mut self, study_id: u32, sample_id: u32, data: &ExtraSampleData) {
        self.insert(extra_data_key(study_id, sample_id), data.to_bytes());
    }

    pub fn add_legacy_row(&mut self, row: &GenotypeGroupRow) {
        self.insert(legacy_marker_key(row.study_id), row.to_bytes());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
impl VariantRow for MemoryRow {
    fn variant(&self) -> &VariantCoordinate {
        &self.variant
    }

    fn for_each_column<'a>(&'a self, f: &mut dyn FnMut(&'a [u8], &'a [u8])) {
        for (key, value) in &self.columns {
            f(key, value);
        }
    }
}

/// The result of decoding one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedVariant {
    pub variant: VariantCoordinate,
    /// One record per study id present in the row
    pub studies: BTreeMap<u32, StudyRecord>,
    /// Counting mismatches tolerated by a lenient policy
    pub warnings: Vec<IntegrityError>,
}
impl DecodedVariant {
    #[must_use]
    pub fn study(&self, study_id: u32) -> Option<&StudyRecord> {
        self.studies.get(&study_id)
    }
}

/// Decodes rows against a metadata source
#[derive(Debug)]
pub struct Decoder<M> {
    resolver: StudyResolver<M>,
    options: DecoderOptions,
}
impl<M: StudyMetadataSource> Decoder<M> {
    pub fn new(metadata: M, options: DecoderOptions) -> Self {
        let returned = options.returned_samples().map(<[String]>::to_vec);
        Self {
            resolver: StudyResolver::new(metadata, returned),
            options,
        }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    pub fn resolver(&self) -> &StudyResolver<M> {
        &self.resolver
    }

    /// Decodes every study of a row
    ///
    /// # Errors
    ///
    /// Fatal errors are returned as [`Error::Row`], naming the variant, the study
    /// and the component that failed.
    pub fn decode<R: VariantRow + ?Sized>(&self, row: &R) -> Result<DecodedVariant> {
        let variant = row.variant();
        let mut columns: BTreeMap<u32, Vec<ColumnValue<'_>>> = BTreeMap::new();
        let mut error = None;
        row.for_each_column(&mut |key, value| {
            if error.is_some() {
                return;
            }
            match ColumnKey::parse(key) {
                Ok(Some(key)) => columns
                    .entry(key.study_id())
                    .or_default()
                    .push(ColumnValue::new(key, value)),
                Ok(None) => {}
                Err(e) => error = Some(e),
            }
        });
        if let Some(e) = error {
            return Err(e.in_row(variant, StudyRef::Unattributed, Component::ColumnKeyParser));
        }

        let mut studies = BTreeMap::new();
        let mut warnings = Vec::new();
        for (study_id, study_columns) in columns {
            let record = self.decode_study(variant, study_id, &study_columns, &mut warnings)?;
            studies.insert(study_id, record);
        }
        Ok(DecodedVariant {
            variant: variant.clone(),
            studies,
            warnings,
        })
    }

    /// Decodes a legacy genotype-group row on its own
    pub fn decode_legacy_row(&self, row: &GenotypeGroupRow) -> Result<DecodedVariant> {
        let variant = row.variant();
        let study_ref = StudyRef::Known(row.study_id);
        let at = |component: Component| {
            let variant = &variant;
            move |e: Error| e.in_row(variant, study_ref, component)
        };

        let study = self.resolver.study(row.study_id).map_err(at(Component::SampleResolver))?;
        let mut record = self.new_record(&study);
        let mut warnings = Vec::new();
        legacy::overlay(&mut record, &study, row, &variant, &self.options, &mut warnings)
            .map_err(at(Component::LegacyRowDecoder))?;
        fill::fill_empty_samples(&mut record, &study, &self.options);

        Ok(DecodedVariant {
            studies: BTreeMap::from([(row.study_id, record)]),
            variant,
            warnings,
        })
    }

    fn new_record(&self, study: &StudyMetadata) -> StudyRecord {
        let mut positions = self.resolver.samples_position(study);
        if self.options.mutable_samples_position() {
            positions = Arc::new(positions.as_ref().clone());
        }
        let label = if self.options.study_name_as_id() {
            study.name.clone()
        } else {
            study.id.to_string()
        };
        StudyRecord::new(label, self.resolver.format(study).to_vec(), positions)
    }

    fn decode_study(
        &self,
        variant: &VariantCoordinate,
        study_id: u32,
        columns: &[ColumnValue<'_>],
        warnings: &mut Vec<IntegrityError>,
    ) -> Result<StudyRecord> {
        let at = |component: Component| {
            move |e: Error| e.in_row(variant, StudyRef::Known(study_id), component)
        };
        trace!("Decoding {} columns of study {study_id} at {variant}", columns.len());

        let study = self.resolver.study(study_id).map_err(at(Component::SampleResolver))?;
        let mut record = self.new_record(&study);
        let base_len = record.format().len();

        let mut alternates = samples::AlternateSamples::default();
        let mut legacy_payload = None;
        for column in columns {
            let decoded = match *column {
                ColumnValue::MainData { sample_id, value } => samples::decode_main_column(
                    &mut record,
                    &study,
                    sample_id,
                    value,
                    base_len,
                    &mut alternates,
                ),
                ColumnValue::ExtraData { sample_id, value } => {
                    samples::decode_extra_column(&mut record, &study, sample_id, value)
                }
                ColumnValue::LegacyMarker { value } => {
                    legacy_payload = Some(value);
                    Ok(())
                }
            };
            decoded.map_err(at(Component::SampleFieldDecoder))?;
        }

        alternates::reconcile(&mut record, &study, alternates)
            .map_err(at(Component::AlternateReconciler))?;

        if let Some(payload) = legacy_payload {
            GenotypeGroupRow::from_bytes(study_id, payload)
                .and_then(|row| {
                    legacy::overlay(&mut record, &study, &row, variant, &self.options, warnings)
                })
                .map_err(at(Component::LegacyRowDecoder))?;
        }

        fill::fill_empty_samples(&mut record, &study, &self.options);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{ColumnError, MetadataError},
        metadata::{InMemoryMetadata, MergeMode},
        options::DecoderOptionsBuilder,
        policy::IntegrityPolicy,
    };

    fn variant() -> VariantCoordinate {
        VariantCoordinate::new("1", 100, "A", "C")
    }

    fn metadata() -> InMemoryMetadata {
        let mut study = StudyMetadata::new(1, "cohort");
        for (id, name) in [(1, "A"), (2, "B"), (3, "C")] {
            study.index_sample(id, name);
        }
        let source = InMemoryMetadata::new();
        source.insert(study);
        source
    }

    #[test]
    fn test_decode_main_data_and_fill() {
        let decoder = Decoder::new(metadata(), DecoderOptions::default());
        let mut row = MemoryRow::new(variant());
        row.add_main_data(1, 2, &["0/1", "PASS"]);
        let decoded = decoder.decode(&row).unwrap();

        let record = decoded.study(1).unwrap();
        assert_eq!(record.study_id(), "1");
        assert_eq!(record.sample_data("A").unwrap(), &["?/?", "."]);
        assert_eq!(record.sample_data("B").unwrap(), &["0/1", "PASS"]);
        assert!(record.is_complete());
        assert!(decoded.warnings.is_empty());
    }

    #[test]
    fn test_unknown_suffix_ignored() {
        let decoder = Decoder::new(metadata(), DecoderOptions::default());
        let mut row = MemoryRow::new(variant());
        row.insert(b"1_2_Q".to_vec(), b"anything".to_vec());
        row.insert(b"annotation".to_vec(), Vec::new());
        let decoded = decoder.decode(&row).unwrap();
        assert!(decoded.studies.is_empty());
    }

    #[test]
    fn test_malformed_column() {
        let decoder = Decoder::new(metadata(), DecoderOptions::default());
        let mut row = MemoryRow::new(variant());
        row.insert(b"1_x_S".to_vec(), encode_main_data(&["0/1"]));
        let error = decoder.decode(&row).unwrap_err();

        assert_eq!(error.component(), Some(Component::ColumnKeyParser));
        match error {
            Error::Row { study, source, .. } => {
                assert_eq!(study, StudyRef::Unattributed);
                assert!(matches!(*source, Error::ColumnError(ColumnError::MalformedColumn(_))));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_study() {
        let decoder = Decoder::new(metadata(), DecoderOptions::default());
        let mut row = MemoryRow::new(variant());
        row.add_main_data(9, 1, &["0/1", "PASS"]);
        let error = decoder.decode(&row).unwrap_err();
        match error {
            Error::Row {
                study,
                component,
                source,
                ..
            } => {
                assert_eq!(study, StudyRef::Known(9));
                assert_eq!(component, Component::SampleResolver);
                assert!(matches!(*source, Error::MetadataError(MetadataError::UnknownStudy(9))));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_study_name_as_id() {
        let options = DecoderOptionsBuilder::default()
            .study_name_as_id(true)
            .build();
        let decoder = Decoder::new(metadata(), options);
        let mut row = MemoryRow::new(variant());
        row.add_main_data(1, 1, &["0/1", "PASS"]);
        let decoded = decoder.decode(&row).unwrap();
        assert_eq!(decoded.study(1).unwrap().study_id(), "cohort");
    }

    #[test]
    fn test_shared_and_mutable_positions() {
        let mut row = MemoryRow::new(variant());
        row.add_main_data(1, 1, &["0/1", "PASS"]);

        let decoder = Decoder::new(metadata(), DecoderOptions::default());
        let first = decoder.decode(&row).unwrap();
        let second = decoder.decode(&row).unwrap();
        assert!(Arc::ptr_eq(
            first.study(1).unwrap().samples_position_arc(),
            second.study(1).unwrap().samples_position_arc()
        ));

        let options = DecoderOptionsBuilder::default()

            .mutable_samples_position(true)

            .build();
        let decoder = Decoder::new(metadata(), options);
        let first = decoder.decode(&row).unwrap();
        let mut second = decoder.decode(&row).unwrap();
        assert!(!Arc::ptr_eq(
            first.study(1).unwrap().samples_position_arc(),
            second.study(1).unwrap().samples_position_arc()
        ));
        let record = second.studies.get_mut(&1).unwrap();
        let pos = record.add_sample("Z");
        assert_eq!(pos, 3);
        assert_eq!(first.study(1).unwrap().samples_position().len(), 3);
    }

    #[test]
    fn test_advanced_merge_mode_defaults_hom_ref() {
        let source = metadata();
        let mut study = source.study(1).unwrap().as_ref().clone();
        study.merge_mode = MergeMode::Advanced;
        source.insert(study);

        let decoder = Decoder::new(source, DecoderOptions::default());
        let mut row = MemoryRow::new(variant());
        row.add_main_data(1, 1, &["0/1", "PASS"]);
        let decoded = decoder.decode(&row).unwrap();
        assert_eq!(decoded.study(1).unwrap().sample_field("C", "GT"), Some("0/0"));
    }

    #[test]
    fn test_decode_legacy_row() {
        let decoder = Decoder::new(metadata(), DecoderOptions::default());
        let mut legacy = GenotypeGroupRow::new(1, &variant());
        legacy.add_genotype("1/1", 3);
        legacy.hom_ref_count = 2;
        legacy.pass_count = 3;
        let decoded = decoder.decode_legacy_row(&legacy).unwrap();

        let record = decoded.study(1).unwrap();
        assert_eq!(record.sample_data("C").unwrap(), &["1/1", "PASS"]);
        assert_eq!(record.sample_data("A").unwrap(), &["?/?", "."]);
        assert!(decoded.warnings.is_empty());
    }

    #[test]
    fn test_legacy_payload_error_attributed() {
        let options = DecoderOptionsBuilder::default()
            .policy(IntegrityPolicy::Strict)
            .build();
        let decoder = Decoder::new(metadata(), options);
        let mut row = MemoryRow::new(variant());
        row.insert(legacy_marker_key(1), vec![1, 2, 3]);
        let error = decoder.decode(&row).unwrap_err();
        assert_eq!(error.component(), Some(Component::LegacyRowDecoder));
    }

    #[test]
    fn test_row_trait_through_reference() {
        let decoder = Decoder::new(metadata(), DecoderOptions::default());
        let mut row = MemoryRow::new(variant());
        row.add_main_data(1, 1, &["0/1", "PASS"]);
        let boxed: Box<dyn VariantRow> = Box::new(row.clone());
        assert_eq!(
            decoder.decode(boxed.as_ref()).unwrap(),
            decoder.decode(&row).unwrap()
        );
    }
}
