//! Overlay of legacy genotype-group rows
//!
//! Samples absent from every bucket are homozygous reference and samples absent
//! from every filter bucket pass, so the stored counters can be checked against
//! the number of loaded samples.

use std::collections::HashSet;

use log::debug;

use super::fill::default_sample_data;
use crate::{
    core::{StudyRecord, VariantCoordinate, FILTER_KEY, GT_KEY, PASS_VALUE, UNKNOWN_SAMPLE_DATA},
    error::{IntegrityError, MetadataError, Result},
    legacy::{GenotypeGroupRow, OTHER_GENOTYPE},
    metadata::StudyMetadata,
    options::DecoderOptions,
};

/// Writes legacy values into a record without overriding new-format data
struct LegacyWriter<'a> {
    study: &'a StudyMetadata,
    /// Positions decoded from main or extra data before the overlay
    protected: Vec<bool>,
    /// Initial list of samples first seen in the legacy row
    base: Vec<String>,
}
impl<'a> LegacyWriter<'a> {
    fn new(record: &StudyRecord, study: &'a StudyMetadata, options: &DecoderOptions) -> Self {
        let protected = (0..record.samples_position().len())
            .map(|pos| record.has_sample_data(pos))
            .collect();
        let mut base = default_sample_data(record.format(), study, options);
        if let Some(idx) = record.format_position(FILTER_KEY) {
            base[idx] = PASS_VALUE.to_string();
        }
        Self {
            study,
            protected,
            base,
        }
    }

    /// Position of a sample id, or `None` if the sample is not returned
    fn position(&self, record: &StudyRecord, sample_id: u32) -> Result<Option<usize>> {
        let name = self
            .study
            .sample_name(sample_id)
            .ok_or(MetadataError::UnknownSample {
                study_id: self.study.id,
                sample_id,
            })?;
        Ok(record.samples_position().get(name))
    }

    fn write(
        &self,
        record: &mut StudyRecord,
        sample_id: u32,
        field_idx: usize,
        value: &str,
    ) -> Result<()> {
        let Some(pos) = self.position(record, sample_id)? else {
            return Ok(());
        };
        if self.protected.get(pos).copied().unwrap_or(false) {
            return Ok(());
        }
        if !record.has_sample_data(pos) {
            record.set_sample_data(pos, self.base.clone());
        }
        record.set_sample_field(pos, field_idx, value, UNKNOWN_SAMPLE_DATA);
        Ok(())
    }
}

/// Overlays a legacy row onto a record and checks its counters
///
/// Lenient mismatches are appended to `warnings`.
pub(crate) fn overlay(
    record: &mut StudyRecord,
    study: &StudyMetadata,
    row: &GenotypeGroupRow,
    variant: &VariantCoordinate,
    options: &DecoderOptions,
    warnings: &mut Vec<IntegrityError>,
) -> Result<()> {
    let writer = LegacyWriter::new(record, study, options);
    let loaded = study.indexed_samples.len();

    if let Some(gt_idx) = record.format_position(GT_KEY) {
        let mut touched = HashSet::new();
        for (genotype, ids) in &row.genotypes {
            touched.extend(ids.iter().copied());
            // written from the complex map below
            if genotype == OTHER_GENOTYPE {
                continue;
            }
            for &sample_id in ids {
                writer.write(record, sample_id, gt_idx, genotype)?;
            }
        }
        for (&sample_id, genotype) in &row.complex_genotypes {
            touched.insert(sample_id);
            let genotype = match genotype.split_once(',') {
                Some((first, _)) if options.simple_genotypes() => {
                    debug!("Simplified genotype {genotype} of sample {sample_id} to {first}");
                    first
                }
                _ => genotype.as_str(),
            };
            writer.write(record, sample_id, gt_idx, genotype)?;
        }

        let derived = loaded as i64 - touched.len() as i64;
        if derived != row.hom_ref_count {
            let mismatch = IntegrityError::HomRefCount {
                variant: variant.to_string(),
                derived,
                stored: row.hom_ref_count,
                loaded,
            };
            warnings.extend(options.policy().handle(mismatch)?);
        }
    }

    if let Some(ft_idx) = record.format_position(FILTER_KEY) {
        let mut filtered = 0;
        for (filter, ids) in &row.complex_filters {
            filtered += ids.len();
            for &sample_id in ids {
                writer.write(record, sample_id, ft_idx, filter)?;
            }
        }

        let derived = loaded as i64 - filtered as i64;
        if derived != row.pass_count {
            let mismatch = IntegrityError::PassCount {
                variant: variant.to_string(),
                derived,
                stored: row.pass_count,
                loaded,
            };
            warnings.extend(options.policy().handle(mismatch)?);
        }
    }

    if record.secondary_alternates().is_empty() && !row.secondary_alternates.is_empty() {
        record.set_secondary_alternates(row.secondary_alternates.clone());
    }
    Ok(())
}
