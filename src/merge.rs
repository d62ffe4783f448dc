//! Multi-allelic merge of sample fields
//!
//! Allele indices in sample fields are only meaningful against one ordering of
//! the alternates: `0` is the reference, `1` the primary alternate and `2 + i`
//! the `i`-th secondary alternate. When groups of samples were stored against
//! different secondary alternate lists, [`AlleleMerger`] builds one canonical
//! list and rewrites every allele-dependent field onto it.

use std::collections::HashMap;

use crate::{
    core::{AlternateCoordinate, GT_KEY, UNKNOWN_SAMPLE_DATA},
    error::{AlternateError, Result},
    metadata::{FieldDefinition, FieldNumber, FieldType},
};

/// Samples that share one secondary alternate list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlleleGroup {
    pub alternates: Vec<AlternateCoordinate>,
    /// Sample name with its field values, parallel to the merge format
    pub samples: Vec<(String, Vec<String>)>,
}

/// Merges allele groups onto a canonical alternate list
#[derive(Debug, Clone, Default)]
pub struct AlleleMerger {
    fields: HashMap<String, (FieldNumber, FieldType)>,
}
impl AlleleMerger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_definitions(definitions: &[FieldDefinition]) -> Self {
        let mut merger = Self::new();
        for def in definitions {
            merger.configure(&def.id, def.number, def.field_type);
        }
        merger
    }

    /// Declares the semantics of a field
    pub fn configure(&mut self, id: &str, number: FieldNumber, field_type: FieldType) {
        self.fields.insert(id.to_string(), (number, field_type));
    }

    /// Merges all groups into the first one
    ///
    /// The canonical list starts with the first group's alternates; each later
    /// group appends the alternates not seen so far, in its own order. Per-allele
    /// lists of every sample are resized to the final allele count.
    pub fn merge(&self, format: &[String], groups: Vec<AlleleGroup>) -> Result<AlleleGroup> {
        let mut groups = groups.into_iter();
        let Some(mut merged) = groups.next() else {
            return Ok(AlleleGroup::default());
        };
        for group in groups {
            self.merge_pair(format, &mut merged, group)?;
        }
        Ok(merged)
    }

    fn merge_pair(
        &self,
        format: &[String],
        target: &mut AlleleGroup,
        other: AlleleGroup,
    ) -> Result<()> {
        let previous_alleles = 2 + target.alternates.len();

        // local allele index -> canonical allele index
        let mut allele_map = Vec::with_capacity(2 + other.alternates.len());
        allele_map.extend([0, 1]);
        for alt in other.alternates {
            let pos = match target.alternates.iter().position(|a| *a == alt) {
                Some(pos) => pos,
                None => {
                    target.alternates.push(alt);
                    target.alternates.len() - 1
                }
            };
            allele_map.push(pos + 2);
        }
        let num_alleles = 2 + target.alternates.len();

        // samples merged so far keep their indices but need slots for new alleles
        if num_alleles > previous_alleles {
            let identity: Vec<usize> = (0..previous_alleles).collect();
            for (_, data) in &mut target.samples {
                self.remap_sample(format, data, &identity, num_alleles)?;
            }
        }

        for (name, mut data) in other.samples {
            self.remap_sample(format, &mut data, &allele_map, num_alleles)?;
            target.samples.push((name, data));
        }
        Ok(())
    }

    fn remap_sample(
        &self,
        format: &[String],
        data: &mut [String],
        allele_map: &[usize],
        num_alleles: usize,
    ) -> Result<()> {
        for (key, value) in format.iter().zip(data.iter_mut()) {
            if let Some(remapped) = self.remap_field(key, value, allele_map, num_alleles)? {
                *value = remapped;
            }
        }
        Ok(())
    }

    fn remap_field(
        &self,
        key: &str,
        value: &str,
        allele_map: &[usize],
        num_alleles: usize,
    ) -> Result<Option<String>> {
        if key == GT_KEY {
            return remap_genotype(value, allele_map).map(Some);
        }
        if value == UNKNOWN_SAMPLE_DATA {
            return Ok(None);
        }
        let remapped = match self.fields.get(key) {
            Some((_, FieldType::Flag)) | None => None,
            Some((FieldNumber::PerAlternate, _)) => {
                // alternates are alleles shifted by one
                let alt_map: Vec<usize> =
                    allele_map[1..].iter().map(|a| a - 1).collect();
                remap_list(value, &alt_map, num_alleles - 1)
            }
            Some((FieldNumber::PerAllele, _)) => remap_list(value, allele_map, num_alleles),
            Some((FieldNumber::PerGenotype, _)) => {
                remap_genotype_list(value, allele_map, num_alleles)
            }
            Some((FieldNumber::Fixed(_) | FieldNumber::Unbounded, _)) => None,
        };
        Ok(remapped)
    }
}

/// Rewrites the numeric alleles of a genotype, keeping separators and missing alleles
fn remap_genotype(genotype: &str, allele_map: &[usize]) -> Result<String> {
    let mut buf = String::with_capacity(genotype.len());
    let mut start = 0;
    for (idx, c) in genotype.char_indices() {
        if c == '/' || c == '|' {
            push_allele(&mut buf, &genotype[start..idx], allele_map)?;
            buf.push(c);
            start = idx + 1;
        }
    }
    push_allele(&mut buf, &genotype[start..], allele_map)?;
    Ok(buf)
}

fn push_allele(buf: &mut String, allele: &str, allele_map: &[usize]) -> Result<()> {
    match allele.parse::<usize>() {
        Ok(index) => {
            let Some(&mapped) = allele_map.get(index) else {
                return Err(AlternateError::AlleleOutOfRange {
                    index,
                    alleles: allele_map.len(),
                }
                .into());
            };
            buf.push_str(itoa::Buffer::new().format(mapped));
        }
        // missing ('.') or non-numeric alleles pass through
        Err(_) => buf.push_str(allele),
    }
    Ok(())
}

/// Re-indexes a comma-separated list; lists of unexpected length are left alone
fn remap_list(value: &str, index_map: &[usize], new_len: usize) -> Option<String> {
    let values: Vec<&str> = value.split(',').collect();
    if values.len() != index_map.len() {
        return None;
    }
    let mut remapped = vec![UNKNOWN_SAMPLE_DATA; new_len];
    for (local, v) in values.into_iter().enumerate() {
        remapped[index_map[local]] = v;
    }
    Some(remapped.join(","))
}

/// Position of the diploid genotype `j/k` (`j <= k`) in VCF genotype order
fn genotype_index(j: usize, k: usize) -> usize {
    let (j, k) = if j <= k { (j, k) } else { (k, j) };
    k * (k + 1) / 2 + j
}

fn remap_genotype_list(value: &str, allele_map: &[usize], num_alleles: usize) -> Option<String> {
    let values: Vec<&str> = value.split(',').collect();
    let local_alleles = allele_map.len();
    if values.len() != local_alleles * (local_alleles + 1) / 2 {
        return None;
    }
    let mut remapped = vec![UNKNOWN_SAMPLE_DATA; num_alleles * (num_alleles + 1) / 2];
    for k in 0..local_alleles {
        for j in 0..=k {
            remapped[genotype_index(allele_map[j], allele_map[k])] = values[genotype_index(j, k)];
        }
    }
    Some(remapped.join(","))
}
