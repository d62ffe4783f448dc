//! Main and extra sample data columns

use crate::{
    column::{decode_main_data, ExtraSampleData},
    core::{StudyRecord, UNKNOWN_SAMPLE_DATA},
    error::{MetadataError, Result},
    metadata::StudyMetadata,
};

/// Secondary alternate reference strings with the samples carrying them
///
/// Kept in first-appearance order so that reconciliation is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AlternateSamples {
    groups: Vec<(String, Vec<String>)>,
}
impl AlternateSamples {
    pub(crate) fn add(&mut self, reference: String, sample: &str) {
        match self.groups.iter_mut().find(|(r, _)| *r == reference) {
            Some((_, samples)) => samples.push(sample.to_string()),
            None => self.groups.push((reference, vec![sample.to_string()])),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.groups.len()
    }

    pub(crate) fn into_groups(self) -> Vec<(String, Vec<String>)> {
        self.groups
    }
}

fn sample_name(study: &StudyMetadata, sample_id: u32) -> Result<&str> {
    study.sample_name(sample_id).ok_or_else(|| {
        MetadataError::UnknownSample {
            study_id: study.id,
            sample_id,
        }
        .into()
    })
}

/// Decodes one main data column into the record
///
/// The first `base_len` values are field values; every value after them is a
/// secondary alternate reference of the sample. Several references are joined in
/// order, so index `2 + i` of the sample's genotype names the `i`-th of them.
/// Values already set by extra data beyond `base_len` are kept.
pub(crate) fn decode_main_column(
    record: &mut StudyRecord,
    study: &StudyMetadata,
    sample_id: u32,
    value: &[u8],
    base_len: usize,
    alternates: &mut AlternateSamples,
) -> Result<()> {
    let name = sample_name(study, sample_id)?;
    let Some(pos) = record.samples_position().get(name) else {
        return Ok(());
    };
    let mut values = decode_main_data(value)?;
    if values.len() > base_len {
        // all references of a sample form one allele ordering
        let references: Vec<String> = values
            .drain(base_len..)
            .filter(|r| !r.is_empty())
            .collect();
        if !references.is_empty() {
            alternates.add(references.join(","), name);
        }
    }

    match record.sample_data_mut(pos) {
        Some(existing) => {
            for (idx, value) in values.into_iter().enumerate() {
                match existing.get_mut(idx) {
                    Some(slot) => *slot = value,
                    None => existing.push(value),
                }
            }
        }
        None => record.set_sample_data(pos, values),
    }
    Ok(())
}

/// Decodes one extra data column into the record
///
/// Unknown field names extend the record's format. Skipped fields of the sample
/// read as `.`.
pub(crate) fn decode_extra_column(
    record: &mut StudyRecord,
    study: &StudyMetadata,
    sample_id: u32,
    value: &[u8],
) -> Result<()> {
    let name = sample_name(study, sample_id)?;
    let Some(pos) = record.samples_position().get(name) else {
        return Ok(());
    };
    let extra = ExtraSampleData::from_bytes(value)?;
    for (key, value) in &extra.sample_data {
        let idx = record.add_format(key);
        record.set_sample_field(pos, idx, value, UNKNOWN_SAMPLE_DATA);
    }
    if let Some(file) = extra.file {
        record.add_file(file);
    }
    Ok(())
}
