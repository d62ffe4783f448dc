//! Default values for samples without stored data

use std::sync::Arc;

use crate::{
    core::{StudyRecord, GT_KEY, HOM_REF_GENOTYPE, UNKNOWN_SAMPLE_DATA},
    metadata::{MergeMode, StudyMetadata},
    options::DecoderOptions,
};

/// Genotype of a sample the study has no data for
pub(crate) fn default_genotype<'a>(study: &StudyMetadata, options: &'a DecoderOptions) -> &'a str {
    match study.merge_mode {
        MergeMode::Advanced => HOM_REF_GENOTYPE,
        MergeMode::Basic => options.unknown_genotype(),
    }
}

/// The list given to samples without data, parallel to `format`
pub(crate) fn default_sample_data(
    format: &[String],
    study: &StudyMetadata,
    options: &DecoderOptions,
) -> Vec<String> {
    format
        .iter()
        .map(|key| {
            if key == GT_KEY {
                default_genotype(study, options).to_string()
            } else {
                UNKNOWN_SAMPLE_DATA.to_string()
            }
        })
        .collect()
}

/// Gives every sample a list at least as long as the record's format
///
/// Samples without data share one default list. Shorter lists are padded with
/// the default values of their missing fields.
pub(crate) fn fill_empty_samples(
    record: &mut StudyRecord,
    study: &StudyMetadata,
    options: &DecoderOptions,
) {
    let defaults = Arc::new(default_sample_data(record.format(), study, options));
    for slot in record.samples_data_mut() {
        match slot {
            None => *slot = Some(Arc::clone(&defaults)),
            Some(data) if data.len() < defaults.len() => {
                let len = data.len();
                Arc::make_mut(data).extend_from_slice(&defaults[len..]);
            }
            Some(_) => {}
        }
    }
}
