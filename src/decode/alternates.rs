//! Secondary alternate reconciliation

use super::samples::AlternateSamples;
use crate::{
    core::{AlternateCoordinate, StudyRecord},
    error::Result,
    merge::{AlleleGroup, AlleleMerger},
    metadata::StudyMetadata,
};

/// Sets the record's secondary alternates from the references found in main data
///
/// A single reference is used verbatim. Several references are merged onto one
/// canonical list and the fields of every contributing sample are rewritten.
pub(crate) fn reconcile(
    record: &mut StudyRecord,
    study: &StudyMetadata,
    alternates: AlternateSamples,
) -> Result<()> {
    let mut groups = alternates.into_groups();
    match groups.len() {
        0 => Ok(()),
        1 => {
            let (reference, _) = groups.remove(0);
            record.set_secondary_alternates(AlternateCoordinate::parse_list(&reference)?);
            Ok(())
        }
        _ => merge_groups(record, study, groups),
    }
}

fn merge_groups(
    record: &mut StudyRecord,
    study: &StudyMetadata,
    groups: Vec<(String, Vec<String>)>,
) -> Result<()> {
    let mut allele_groups = Vec::with_capacity(groups.len());
    for (reference, names) in groups {
        let alternates = AlternateCoordinate::parse_list(&reference)?;
        let samples = names
            .into_iter()
            .filter_map(|name| {
                let data = record.sample_data(&name)?.to_vec();
                Some((name, data))
            })
            .collect();
        allele_groups.push(AlleleGroup { alternates, samples });
    }

    let merged = AlleleMerger::from_definitions(&study.field_definitions)
        .merge(record.format(), allele_groups)?;
    for (name, data) in merged.samples {
        if let Some(pos) = record.samples_position().get(&name) {
            record.set_sample_data(pos, data);
        }
    }
    record.set_secondary_alternates(merged.alternates);
    Ok(())
}
