use std::{fmt, str::FromStr};

use crate::error::{AlternateError, Error, Result};

/// Placeholder written for an empty allele in string forms
pub const EMPTY_ALLELE: &str = "-";

/// Separator between the sub-fields of a coordinate string
pub const COORDINATE_SEPARATOR: char = ':';

/// Separator between secondary alternates in a reference string
pub const ALTERNATES_SEPARATOR: char = ',';

fn allele_from_str(s: &str) -> String {
    if s == EMPTY_ALLELE {
        String::new()
    } else {
        s.to_string()
    }
}

fn allele_display(s: &str) -> &str {
    if s.is_empty() {
        EMPTY_ALLELE
    } else {
        s
    }
}

/// The coordinate identifying a row: one primary alternate at a position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantCoordinate {
    chromosome: String,
    start: u32,
    reference: String,
    alternate: String,
}
impl VariantCoordinate {
    #[must_use]
    pub fn new(chromosome: &str, start: u32, reference: &str, alternate: &str) -> Self {
        Self {
            chromosome: chromosome.to_string(),
            start,
            reference: allele_from_str(reference),
            alternate: allele_from_str(alternate),
        }
    }

    #[must_use]
    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    #[must_use]
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Last reference base covered by the variant
    ///
    /// Insertions (empty reference) end one base before their start.
    #[must_use]
    pub fn end(&self) -> u32 {
        let last = (u64::from(self.start) + self.reference.len() as u64).saturating_sub(1);
        u32::try_from(last).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    #[must_use]
    pub fn alternate(&self) -> &str {
        &self.alternate
    }
}
impl fmt::Display for VariantCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.chromosome,
            self.start,
            allele_display(&self.reference),
            allele_display(&self.alternate)
        )
    }
}
impl FromStr for VariantCoordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // none of the four fields may contain ':'
        let fields: Vec<&str> = s.split(COORDINATE_SEPARATOR).collect();
        let [chromosome, start, reference, alternate] = fields.as_slice() else {
            return Err(AlternateError::InvalidVariant(s.to_string()).into());
        };
        let start = start
            .parse()
            .map_err(|_| AlternateError::InvalidVariant(s.to_string()))?;
        Ok(Self::new(chromosome, start, reference, alternate))
    }
}

/// Structural class of an alternate allele
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariantType {
    Snv,
    Snp,
    Mnv,
    Mnp,
    Indel,
    Sv,
    Insertion,
    Deletion,
    Translocation,
    Inversion,
    Cnv,
    Duplication,
    Breakend,
    NoVariation,
    Symbolic,
    Mixed,
}
impl VariantType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snv => "SNV",
            Self::Snp => "SNP",
            Self::Mnv => "MNV",
            Self::Mnp => "MNP",
            Self::Indel => "INDEL",
            Self::Sv => "SV",
            Self::Insertion => "INSERTION",
            Self::Deletion => "DELETION",
            Self::Translocation => "TRANSLOCATION",
            Self::Inversion => "INVERSION",
            Self::Cnv => "CNV",
            Self::Duplication => "DUPLICATION",
            Self::Breakend => "BREAKEND",
            Self::NoVariation => "NO_VARIATION",
            Self::Symbolic => "SYMBOLIC",
            Self::Mixed => "MIXED",
        }
    }

    /// Stable numeric code used by the legacy payload
    #[must_use]
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Result<Self> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| AlternateError::UnknownVariantType(code.to_string()).into())
    }

    const ALL: [Self; 16] = [
        Self::Snv,
        Self::Snp,
        Self::Mnv,
        Self::Mnp,
        Self::Indel,
        Self::Sv,
        Self::Insertion,
        Self::Deletion,
        Self::Translocation,
        Self::Inversion,
        Self::Cnv,
        Self::Duplication,
        Self::Breakend,
        Self::NoVariation,
        Self::Symbolic,
        Self::Mixed,
    ];
}
impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
impl FromStr for VariantType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let vtype = match s {
            "SNV" => Self::Snv,
            "SNP" => Self::Snp,
            "MNV" => Self::Mnv,
            "MNP" => Self::Mnp,
            "INDEL" => Self::Indel,
            "SV" => Self::Sv,
            "INSERTION" | "INS" => Self::Insertion,
            "DELETION" | "DEL" => Self::Deletion,
            "TRANSLOCATION" | "TRA" => Self::Translocation,
            "INVERSION" | "INV" => Self::Inversion,
            "CNV" => Self::Cnv,
            "DUPLICATION" | "DUP" => Self::Duplication,
            "BREAKEND" | "BND" => Self::Breakend,
            "NO_VARIATION" => Self::NoVariation,
            "SYMBOLIC" => Self::Symbolic,
            "MIXED" => Self::Mixed,
            _ => return Err(AlternateError::UnknownVariantType(s.to_string()).into()),
        };
        Ok(vtype)
    }
}

/// A secondary alternate allele at a multi-allelic position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlternateCoordinate {
    pub chromosome: String,
    pub start: u32,
    pub end: u32,
    pub reference: String,
    pub alternate: String,
    pub variant_type: VariantType,
}
impl AlternateCoordinate {
    #[must_use]
    pub fn new(
        chromosome: &str,
        start: u32,
        end: u32,
        reference: &str,
        alternate: &str,
        variant_type: VariantType,
    ) -> Self {
        Self {
            chromosome: chromosome.to_string(),
            start,
            end,
            reference: allele_from_str(reference),
            alternate: allele_from_str(alternate),
            variant_type,
        }
    }

    /// Parses a comma-separated list of `chr:start:end:ref:alt:type` coordinates
    pub fn parse_list(s: &str) -> Result<Vec<Self>> {
        s.split(ALTERNATES_SEPARATOR).map(str::parse).collect()
    }

    /// Renders a list back into its comma-separated reference string
    #[must_use]
    pub fn join_list(alternates: &[Self]) -> String {
        let mut buf = String::new();
        for (idx, alt) in alternates.iter().enumerate() {
            if idx > 0 {
                buf.push(ALTERNATES_SEPARATOR);
            }
            buf.push_str(&alt.to_string());
        }
        buf
    }
}
impl fmt::Display for AlternateCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}",
            self.chromosome,
            self.start,
            self.end,
            allele_display(&self.reference),
            allele_display(&self.alternate),
            self.variant_type
        )
    }
}
impl FromStr for AlternateCoordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(COORDINATE_SEPARATOR).collect();
        let [chromosome, start, end, reference, alternate, vtype] = fields.as_slice() else {
            return Err(AlternateError::InvalidFieldCount(s.to_string()).into());
        };
        let parse_pos = |pos: &str| -> Result<u32> {
            pos.parse().map_err(|_| {
                AlternateError::InvalidPosition {
                    alternate: s.to_string(),
                    position: pos.to_string(),
                }
                .into()
            })
        };
        Ok(Self::new(
            chromosome,
            parse_pos(start)?,
            parse_pos(end)?,
            reference,
            alternate,
            vtype.parse()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_display_and_parse() {
        let variant = VariantCoordinate::new("1", 1000, "A", "C");
        assert_eq!(variant.to_string(), "1:1000:A:C");
        assert_eq!("1:1000:A:C".parse::<VariantCoordinate>().unwrap(), variant);
    }

    #[test]
    fn test_variant_empty_alleles() {
        let insertion = VariantCoordinate::new("2", 50, "-", "TT");
        assert_eq!(insertion.reference(), "");
        assert_eq!(insertion.to_string(), "2:50:-:TT");
        assert_eq!(insertion.end(), 49);
    }

    #[test]
    fn test_variant_end() {
        assert_eq!(VariantCoordinate::new("1", 100, "ACG", "A").end(), 102);
        assert_eq!(VariantCoordinate::new("1", 100, "A", "G").end(), 100);
        assert_eq!(VariantCoordinate::new("1", 0, "-", "G").end(), 0);
    }

    #[test]
    fn test_variant_end_at_max_position() {
        assert_eq!(VariantCoordinate::new("1", u32::MAX, "AC", "A").end(), u32::MAX);
        assert_eq!(VariantCoordinate::new("1", u32::MAX, "A", "G").end(), u32::MAX);
    }

    #[test]
    fn test_invalid_variant() {
        assert!("1:abc:A:C".parse::<VariantCoordinate>().is_err());
        assert!("1:100:A".parse::<VariantCoordinate>().is_err());
    }

    #[test]
    fn test_alternate_parse() {
        let alt: AlternateCoordinate = "1:100:101:A:-:DEL".parse().unwrap();
        assert_eq!(alt.chromosome, "1");
        assert_eq!(alt.start, 100);
        assert_eq!(alt.end, 101);
        assert_eq!(alt.reference, "A");
        assert_eq!(alt.alternate, "");
        assert_eq!(alt.variant_type, VariantType::Deletion);
        assert_eq!(alt.to_string(), "1:100:101:A:-:DELETION");
    }

    #[test]
    fn test_alternate_list() {
        let alts = AlternateCoordinate::parse_list("1:100:100:A:G:SNV,1:100:101:A:-:DEL").unwrap();
        assert_eq!(alts.len(), 2);
        assert_eq!(alts[0].variant_type, VariantType::Snv);
        let joined = AlternateCoordinate::join_list(&alts);
        assert_eq!(AlternateCoordinate::parse_list(&joined).unwrap(), alts);
    }

    #[test]
    fn test_alternate_errors() {
        assert!(matches!(
            "1:100:A:G:SNV".parse::<AlternateCoordinate>(),
            Err(Error::AlternateError(AlternateError::InvalidFieldCount(_)))
        ));
        assert!(matches!(
            "1:x:100:A:G:SNV".parse::<AlternateCoordinate>(),
            Err(Error::AlternateError(AlternateError::InvalidPosition { .. }))
        ));
        assert!(matches!(
            "1:100:100:A:G:WHAT".parse::<AlternateCoordinate>(),
            Err(Error::AlternateError(AlternateError::UnknownVariantType(_)))
        ));
    }

    #[test]
    fn test_variant_type_codes() {
        for vtype in VariantType::ALL {
            assert_eq!(VariantType::from_code(vtype.code()).unwrap(), vtype);
            assert_eq!(vtype.as_str().parse::<VariantType>().unwrap(), vtype);
        }
        assert!(VariantType::from_code(200).is_err());
    }
}
