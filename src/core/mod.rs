mod study;
pub(crate) mod utils;
mod variant;

pub use study::{FileEntry, SampleData, SamplePositions, StudyRecord};
pub use variant::{AlternateCoordinate, VariantCoordinate, VariantType, EMPTY_ALLELE};

/// Genotype field key
pub const GT_KEY: &str = "GT";

/// Filter field key
pub const FILTER_KEY: &str = "FT";

/// Filter value of samples passing all filters
pub const PASS_VALUE: &str = "PASS";

/// Value of any field not given for a sample
///
/// Distinct from the empty string, which is a legitimate field value.
pub const UNKNOWN_SAMPLE_DATA: &str = ".";

/// Default marker for genotypes that cannot be inferred
pub const UNKNOWN_GENOTYPE: &str = "?/?";

/// Genotype of homozygous-reference samples
pub const HOM_REF_GENOTYPE: &str = "0/0";
