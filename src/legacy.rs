//! Legacy genotype-group rows
//!
//! Before per-sample columns, a study's samples at one variant were stored as
//! buckets keyed by literal genotype string, plus a side channel for genotypes
//! that are not one of the bucket keys and for non-passing filters. Aggregate
//! counters are stored next to the buckets as a redundancy check.
//!
//! ## Payload layout
//!
//! The payload is the value of the study's legacy marker column:
//!
//! ```text
//! [chromosome][position: u32][reference][alternate]
//! [n: u32]([genotype][sample ids])*n
//! [n: u32]([sample id: u32][genotype])*n
//! [n: u32]([filter][sample ids])*n
//! [n: u32]([chromosome][start delta: i64][end delta: i64][reference][alternate][type: u8])*n
//! [hom ref count: i64][pass count: i64][call count: i64]
//! ```
//!
//! Strings are `[len: u32][utf8]`. Sample id lists are sorted and delta encoded
//! (`[n: u32][first: u32][delta: u32]...`). Secondary alternates inherit the
//! variant's chromosome when theirs is empty, and store start/end as deltas from
//! the variant's start/end.

use std::collections::BTreeMap;

use crate::{
    core::{
        utils::{write_i64, write_str, write_u32, ValueCursor},
        AlternateCoordinate, VariantCoordinate, VariantType,
    },
    error::Result,
};

/// Bucket of samples whose genotype lives in the complex side channel
pub const OTHER_GENOTYPE: &str = "?";

/// A decoded legacy genotype-group row for one study
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenotypeGroupRow {
    pub study_id: u32,
    pub chromosome: String,
    pub position: u32,
    pub reference: String,
    pub alternate: String,
    /// Literal genotype to the samples holding it
    pub genotypes: BTreeMap<String, Vec<u32>>,
    /// Sample to its non-literal genotype
    pub complex_genotypes: BTreeMap<u32, String>,
    /// Non-passing filter to the samples carrying it
    pub complex_filters: BTreeMap<String, Vec<u32>>,
    pub secondary_alternates: Vec<AlternateCoordinate>,
    pub hom_ref_count: i64,
    pub pass_count: i64,
    pub call_count: i64,
}
impl GenotypeGroupRow {
    #[must_use]
    pub fn new(study_id: u32, variant: &VariantCoordinate) -> Self {
        Self {
            study_id,
            chromosome: variant.chromosome().to_string(),
            position: variant.start(),
            reference: variant.reference().to_string(),
            alternate: variant.alternate().to_string(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn variant(&self) -> VariantCoordinate {
        VariantCoordinate::new(&self.chromosome, self.position, &self.reference, &self.alternate)
    }

    pub fn add_genotype(&mut self, genotype: &str, sample_id: u32) {
        self.genotypes
            .entry(genotype.to_string())
            .or_default()
            .push(sample_id);
    }

    /// Stores a non-literal genotype; the sample is also listed in the other bucket
    pub fn add_complex_genotype(&mut self, sample_id: u32, genotype: &str) {
        self.complex_genotypes.insert(sample_id, genotype.to_string());
        self.add_genotype(OTHER_GENOTYPE, sample_id);
    }

    pub fn add_filter(&mut self, filter: &str, sample_id: u32) {
        self.complex_filters
            .entry(filter.to_string())
            .or_default()
            .push(sample_id);
    }

    /// Sample ids of a genotype bucket
    #[must_use]
    pub fn sample_ids(&self, genotype: &str) -> &[u32] {
        self.genotypes.get(genotype).map_or(&[], Vec::as_slice)
    }

    pub fn from_bytes(study_id: u32, bytes: &[u8]) -> Result<Self> {
        let mut cursor = ValueCursor::new(bytes);
        let chromosome = cursor.read_str()?.to_string();
        let position = cursor.read_u32()?;
        let reference = cursor.read_str()?.to_string();
        let alternate = cursor.read_str()?.to_string();
        let variant = VariantCoordinate::new(&chromosome, position, &reference, &alternate);

        let mut genotypes = BTreeMap::new();
        for _ in 0..cursor.read_u32()? {
            let genotype = cursor.read_str()?.to_string();
            genotypes.insert(genotype, read_sample_ids(&mut cursor)?);
        }

        let mut complex_genotypes = BTreeMap::new();
        for _ in 0..cursor.read_u32()? {
            let sample_id = cursor.read_u32()?;
            complex_genotypes.insert(sample_id, cursor.read_str()?.to_string());
        }

        let mut complex_filters = BTreeMap::new();
        for _ in 0..cursor.read_u32()? {
            let filter = cursor.read_str()?.to_string();
            complex_filters.insert(filter, read_sample_ids(&mut cursor)?);
        }

        let mut secondary_alternates = Vec::new();
        for _ in 0..cursor.read_u32()? {
            secondary_alternates.push(read_alternate(&mut cursor, &variant)?);
        }

        let hom_ref_count = cursor.read_i64()?;
        let pass_count = cursor.read_i64()?;
        let call_count = cursor.read_i64()?;
        cursor.finish()?;

        Ok(Self {
            study_id,
            chromosome,
            position,
            reference,
            alternate,
            genotypes,
            complex_genotypes,
            complex_filters,
            secondary_alternates,
            hom_ref_count,
            pass_count,
            call_count,
        })
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let variant = self.variant();
        let mut buf = Vec::new();
        write_str(&mut buf, &self.chromosome);
        write_u32(&mut buf, self.position);
        write_str(&mut buf, &self.reference);
        write_str(&mut buf, &self.alternate);

        write_u32(&mut buf, self.genotypes.len() as u32);
        for (genotype, ids) in &self.genotypes {
            write_str(&mut buf, genotype);
            write_sample_ids(&mut buf, ids);
        }

        write_u32(&mut buf, self.complex_genotypes.len() as u32);
        for (sample_id, genotype) in &self.complex_genotypes {
            write_u32(&mut buf, *sample_id);
            write_str(&mut buf, genotype);
        }

        write_u32(&mut buf, self.complex_filters.len() as u32);
        for (filter, ids) in &self.complex_filters {
            write_str(&mut buf, filter);
            write_sample_ids(&mut buf, ids);
        }

        write_u32(&mut buf, self.secondary_alternates.len() as u32);
        for alt in &self.secondary_alternates {
            write_alternate(&mut buf, alt, &variant);
        }

        write_i64(&mut buf, self.hom_ref_count);
        write_i64(&mut buf, self.pass_count);
        write_i64(&mut buf, self.call_count);
        buf
    }
}

fn read_sample_ids(cursor: &mut ValueCursor<'_>) -> Result<Vec<u32>> {
    let count = cursor.read_u32()? as usize;
    let mut ids = Vec::with_capacity(count.min(1024));
    let mut last = 0u32;
    for idx in 0..count {
        let value = cursor.read_u32()?;
        last = if idx == 0 { value } else { last.wrapping_add(value) };
        ids.push(last);
    }
    Ok(ids)
}

fn write_sample_ids(buf: &mut Vec<u8>, ids: &[u32]) {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    write_u32(buf, sorted.len() as u32);
    let mut last = 0u32;
    for (idx, id) in sorted.into_iter().enumerate() {
        write_u32(buf, if idx == 0 { id } else { id - last });
        last = id;
    }
}

fn read_alternate(
    cursor: &mut ValueCursor<'_>,
    variant: &VariantCoordinate,
) -> Result<AlternateCoordinate> {
    let chromosome = match cursor.read_str()? {
        "" => variant.chromosome(),
        chromosome => chromosome,
    };
    let start = apply_delta(variant.start(), cursor.read_i64()?);
    let end = apply_delta(variant.end(), cursor.read_i64()?);
    let reference = cursor.read_str()?;
    let alternate = cursor.read_str()?;
    let variant_type = VariantType::from_code(cursor.read_u8()?)?;
    Ok(AlternateCoordinate::new(
        chromosome,
        start,
        end,
        reference,
        alternate,
        variant_type,
    ))
}

fn write_alternate(buf: &mut Vec<u8>, alt: &AlternateCoordinate, variant: &VariantCoordinate) {
    if alt.chromosome == variant.chromosome() {
        write_str(buf, "");
    } else {
        write_str(buf, &alt.chromosome);
    }
    write_i64(buf, i64::from(alt.start) - i64::from(variant.start()));
    write_i64(buf, i64::from(alt.end) - i64::from(variant.end()));
    write_str(buf, &alt.reference);
    write_str(buf, &alt.alternate);
    buf.push(alt.variant_type.code());
}

fn apply_delta(base: u32, delta: i64) -> u32 {
    (i64::from(base) + delta).clamp(0, i64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CodecError, Error};

    fn variant() -> VariantCoordinate {
        VariantCoordinate::new("1", 100, "A", "C")
    }

    fn row() -> GenotypeGroupRow {
        let mut row = GenotypeGroupRow::new(3, &variant());
        row.add_genotype("0/1", 12);
        row.add_genotype("0/1", 4);
        row.add_genotype("1/1", 7);
        row.add_complex_genotype(9, "0/1,0/2");
        row.add_filter("LowQual", 4);
        row.secondary_alternates
            .push(AlternateCoordinate::new("1", 100, 100, "A", "G", VariantType::Snv));
        row.secondary_alternates
            .push(AlternateCoordinate::new("2", 90, 95, "AT", "-", VariantType::Deletion));
        row.hom_ref_count = 5;
        row.pass_count = 8;
        row.call_count = 4;
        row
    }

    #[test]
    fn test_payload_round_trip() {
        let mut row = row();
        let decoded = GenotypeGroupRow::from_bytes(3, &row.to_bytes()).unwrap();
        // sample lists come back sorted
        row.genotypes.get_mut("0/1").unwrap().sort_unstable();
        assert_eq!(decoded, row);
        assert_eq!(decoded.sample_ids("0/1"), &[4, 12]);
        assert_eq!(decoded.sample_ids(OTHER_GENOTYPE), &[9]);
        assert!(decoded.sample_ids("2/2").is_empty());
    }

    #[test]
    fn test_payload_at_max_position() {
        let variant = VariantCoordinate::new("1", u32::MAX, "AC", "A");
        let mut row = GenotypeGroupRow::new(3, &variant);
        row.add_genotype("0/1", 1);
        row.secondary_alternates.push(AlternateCoordinate::new(
            "1",
            u32::MAX,
            u32::MAX,
            "AC",
            "-",
            VariantType::Deletion,
        ));
        let decoded = GenotypeGroupRow::from_bytes(3, &row.to_bytes()).unwrap();
        assert_eq!(decoded, row);
        assert_eq!(decoded.secondary_alternates[0].end, u32::MAX);
    }

    #[test]
    fn test_alternates_inherit_variant_coordinates() {
        let row = row();
        let bytes = row.to_bytes();
        let decoded = GenotypeGroupRow::from_bytes(3, &bytes).unwrap();
        let inherited = &decoded.secondary_alternates[0];
        assert_eq!(inherited.chromosome, "1");
        assert_eq!((inherited.start, inherited.end), (100, 100));

        let shifted = &decoded.secondary_alternates[1];
        assert_eq!(shifted.chromosome, "2");
        assert_eq!((shifted.start, shifted.end), (90, 95));
        assert_eq!(shifted.alternate, "");
    }

    #[test]
    fn test_duplicate_sample_ids_collapse() {
        let mut row = GenotypeGroupRow::new(1, &variant());
        row.add_genotype("0/1", 2);
        row.add_genotype("0/1", 2);
        let decoded = GenotypeGroupRow::from_bytes(1, &row.to_bytes()).unwrap();
        assert_eq!(decoded.sample_ids("0/1"), &[2]);
    }

    #[test]
    fn test_truncated_payload() {
        let bytes = row().to_bytes();
        let result = GenotypeGroupRow::from_bytes(3, &bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(Error::CodecError(CodecError::Truncated(_, _)))));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = row().to_bytes();
        bytes.push(0);
        let result = GenotypeGroupRow::from_bytes(3, &bytes);
        assert!(matches!(result, Err(Error::CodecError(CodecError::TrailingBytes(1)))));
    }

    #[test]
    fn test_variant_helper() {
        assert_eq!(row().variant(), variant());
        assert_eq!(row().study_id, 3);
    }
}
