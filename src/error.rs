use std::fmt;

/// Custom Result type for widevar operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the widevar library, encompassing all possible error cases
/// that can occur while decoding wide-column variant rows.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Errors related to column identifiers
    #[error("Error processing column: {0}")]
    ColumnError(#[from] ColumnError),

    /// Errors related to study metadata lookups
    #[error("Error resolving study metadata: {0}")]
    MetadataError(#[from] MetadataError),

    /// Counting invariants of a legacy row did not hold
    #[error("Data integrity error: {0}")]
    IntegrityError(#[from] IntegrityError),

    /// Errors parsing or merging secondary alternates
    #[error("Error processing secondary alternates: {0}")]
    AlternateError(#[from] AlternateError),

    /// Errors decoding raw column values
    #[error("Error decoding value: {0}")]
    CodecError(#[from] CodecError),

    /// Errors decoding mendelian error records
    #[error("Error processing mendelian errors: {0}")]
    MendelianError(#[from] MendelianError),

    /// UTF-8 conversion errors
    #[error("Error with UTF8: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),

    /// A worker thread of a parallel decode panicked
    #[error("A worker thread panicked")]
    ThreadPanic,

    /// A fatal error raised while decoding a single row
    #[error("Failed to decode variant {variant} (study {study}) in {component}: {source}")]
    Row {
        variant: String,
        study: StudyRef,
        component: Component,
        #[source]
        source: Box<Error>,
    },
}
impl Error {
    /// Checks if the error is a counting-invariant mismatch
    ///
    /// Row-wrapped errors are inspected through their source.
    #[must_use]
    pub fn is_integrity_mismatch(&self) -> bool {
        match self {
            Self::IntegrityError(_) => true,
            Self::Row { source, .. } => source.is_integrity_mismatch(),
            _ => false,
        }
    }

    /// The component that failed, if this error was raised while decoding a row
    #[must_use]
    pub fn component(&self) -> Option<Component> {
        match self {
            Self::Row { component, .. } => Some(*component),
            _ => None,
        }
    }

    pub(crate) fn in_row(
        self,
        variant: &impl fmt::Display,
        study: StudyRef,
        component: Component,
    ) -> Self {
        // already attributed to a row
        if matches!(self, Self::Row { .. }) {
            return self;
        }
        Self::Row {
            variant: variant.to_string(),
            study,
            component,
            source: Box::new(self),
        }
    }
}

/// The study a row error is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyRef {
    Known(u32),
    Unattributed,
}
impl fmt::Display for StudyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(id) => write!(f, "{id}"),
            Self::Unattributed => write!(f, "?"),
        }
    }
}

/// The decode stage that raised a row error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    ColumnKeyParser,
    SampleFieldDecoder,
    AlternateReconciler,
    LegacyRowDecoder,
    SampleResolver,
}
impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ColumnKeyParser => "column key parser",
            Self::SampleFieldDecoder => "sample field decoder",
            Self::AlternateReconciler => "secondary alternate reconciler",
            Self::LegacyRowDecoder => "legacy row decoder",
            Self::SampleResolver => "sample resolver",
        };
        f.write_str(name)
    }
}

/// Errors specific to parsing column identifiers
#[derive(thiserror::Error, Debug)]
pub enum ColumnError {
    /// A column carries a known suffix but its ids could not be parsed
    ///
    /// # Arguments
    /// * `String` - The offending column identifier (lossy UTF-8)
    #[error("Malformed column identifier: {0}")]
    MalformedColumn(String),
}

/// Errors resolving studies and samples against the metadata interface
#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    #[error("No study found for study ID: {0}")]
    UnknownStudy(u32),

    /// A column references a sample id missing from the study's id-name bijection
    #[error("Sample ID {sample_id} is not registered in study {study_id}")]
    UnknownSample { study_id: u32, sample_id: u32 },
}

/// Counting-invariant mismatches found in legacy genotype-group rows
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error(
        "Wrong number of HomRef samples for variant {variant}. Got {derived}, expected {stored} ({loaded} loaded samples)"
    )]
    HomRefCount {
        variant: String,
        derived: i64,
        stored: i64,
        loaded: usize,
    },

    #[error(
        "Pass count {stored} does not match filter fill count {derived} for variant {variant} ({loaded} loaded samples)"
    )]
    PassCount {
        variant: String,
        derived: i64,
        stored: i64,
        loaded: usize,
    },
}

/// Errors in secondary alternate references
#[derive(thiserror::Error, Debug)]
pub enum AlternateError {
    /// The reference does not split into `chr:start:end:ref:alt:type`
    #[error("Invalid secondary alternate '{0}': expected 6 ':'-separated fields")]
    InvalidFieldCount(String),

    #[error("Invalid position '{position}' in secondary alternate '{alternate}'")]
    InvalidPosition { alternate: String, position: String },

    #[error("Unknown variant type: {0}")]
    UnknownVariantType(String),

    #[error("Invalid variant '{0}': expected 'chr:start:ref:alt'")]
    InvalidVariant(String),

    /// The merge produced an allele index outside of the canonical list
    #[error("Allele index {index} out of range for {alleles} alleles")]
    AlleleOutOfRange { index: usize, alleles: usize },
}

/// Errors decoding the byte representation of column values
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    /// The value ended before the expected number of bytes
    ///
    /// # Arguments
    /// * First `usize` - The byte position of the failed read
    /// * Second `usize` - The number of bytes requested
    #[error("Value truncated at byte {0} (needed {1} more bytes)")]
    Truncated(usize, usize),

    #[error("Invalid flag byte {0} at byte {1}")]
    InvalidFlag(u8, usize),

    #[error("Trailing bytes after value: {0}")]
    TrailingBytes(usize),

    #[error("Invalid UTF-8 string at byte {0}")]
    InvalidUtf8(usize),
}

/// Errors decoding mendelian error records
#[derive(thiserror::Error, Debug)]
pub enum MendelianError {
    #[error("Malformed mendelian error record: {0}")]
    MalformedRecord(String),

    #[error("Invalid genotype index '{0}' in mendelian error record")]
    InvalidIndex(String),
}
