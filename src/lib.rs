//! # widevar
//!
//! Decoding of variant rows stored in a wide-column layout.
//!
//! Each row holds one genomic variant. Its columns carry, per study, one main
//! data column and one extra data column per sample and optionally a legacy
//! genotype-group payload. Decoding reconstructs a complete per-study record:
//! every returned sample gets a field list parallel to the study's format,
//! samples stored against different secondary alternates are reconciled onto one
//! allele ordering, and samples without stored data are filled with defaults.
//!
//! ## Crate layout
//!
//! - [`column`]: column identifiers and value encodings
//! - [`Decoder`]: turns a stored row into one [`StudyRecord`] per study
//! - [`merge`]: multi-allelic merge of sample fields
//! - [`legacy`]: legacy genotype-group rows and their payload codec
//! - [`mendelian`]: Mendelian-error sample index values
//! - [`resolver`]: per-study sample positions and base formats

pub mod column;
mod core;
mod decode;
pub mod error;
pub mod legacy;
pub mod mendelian;
pub mod merge;
mod metadata;
mod options;
mod parallel;
mod policy;
pub mod resolver;

pub use core::{
    AlternateCoordinate, FileEntry, SampleData, SamplePositions, StudyRecord, VariantCoordinate,
    VariantType, EMPTY_ALLELE, FILTER_KEY, GT_KEY, HOM_REF_GENOTYPE, PASS_VALUE, UNKNOWN_GENOTYPE,
    UNKNOWN_SAMPLE_DATA,
};
pub use decode::{DecodedVariant, Decoder, MemoryRow, VariantRow};
pub use error::{Error, IntegrityError, Result};
pub use legacy::GenotypeGroupRow;
pub use metadata::{
    FieldDefinition, FieldNumber, FieldType, InMemoryMetadata, MergeMode, StudyMetadata,
    StudyMetadataSource,
};
pub use options::{DecoderOptions, DecoderOptionsBuilder};
pub use parallel::RowProcessor;
pub use policy::IntegrityPolicy;
