//! Decoder configuration
//!
//! ```rust
//! use widevar::{DecoderOptionsBuilder, IntegrityPolicy};
//!
//! let options = DecoderOptionsBuilder::default()
//!     .returned_samples(vec!["NA001".to_string(), "NA003".to_string()])
//!     .policy(IntegrityPolicy::Strict)
//!     .simple_genotypes(true)
//!     .build();
//! assert!(options.policy().is_strict());
//! ```

use crate::{core::UNKNOWN_GENOTYPE, policy::IntegrityPolicy};

/// Settings shared by every decode of one [`Decoder`](crate::Decoder)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderOptions {
    returned_samples: Option<Vec<String>>,
    policy: IntegrityPolicy,
    simple_genotypes: bool,
    unknown_genotype: String,
    study_name_as_id: bool,
    mutable_samples_position: bool,
}
impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptionsBuilder::default().build()
    }
}
impl DecoderOptions {
    /// The caller's sample selection, if any
    #[must_use]
    pub fn returned_samples(&self) -> Option<&[String]> {
        self.returned_samples.as_deref()
    }

    #[must_use]
    pub fn policy(&self) -> IntegrityPolicy {
        self.policy
    }

    /// Collapse multi-genotype legacy entries to their first genotype
    #[must_use]
    pub fn simple_genotypes(&self) -> bool {
        self.simple_genotypes
    }

    /// Genotype given to unrepresented samples outside of advanced merge mode
    #[must_use]
    pub fn unknown_genotype(&self) -> &str {
        &self.unknown_genotype
    }

    /// Label records with the study name instead of its numeric id
    #[must_use]
    pub fn study_name_as_id(&self) -> bool {
        self.study_name_as_id
    }

    /// Give every record its own copy of the sample position map
    #[must_use]
    pub fn mutable_samples_position(&self) -> bool {
        self.mutable_samples_position
    }
}

/// Builder for [`DecoderOptions`]
#[derive(Debug, Clone, Default)]
pub struct DecoderOptionsBuilder {
    returned_samples: Option<Vec<String>>,
    policy: Option<IntegrityPolicy>,
    simple_genotypes: bool,
    unknown_genotype: Option<String>,
    study_name_as_id: bool,
    mutable_samples_position: bool,
}
impl DecoderOptionsBuilder {
    /// Restrict and order the returned samples
    #[must_use]
    pub fn returned_samples(mut self, samples: Vec<String>) -> Self {
        self.returned_samples = Some(samples);
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: IntegrityPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    #[must_use]
    pub fn simple_genotypes(mut self, simple_genotypes: bool) -> Self {
        self.simple_genotypes = simple_genotypes;
        self
    }

    /// Sets the unknown genotype marker; an empty value restores `?/?`
    #[must_use]
    pub fn unknown_genotype(mut self, genotype: &str) -> Self {
        self.unknown_genotype = if genotype.is_empty() {
            None
        } else {
            Some(genotype.to_string())
        };
        self
    }

    #[must_use]
    pub fn study_name_as_id(mut self, study_name_as_id: bool) -> Self {
        self.study_name_as_id = study_name_as_id;
        self
    }

    #[must_use]
    pub fn mutable_samples_position(mut self, mutable: bool) -> Self {
        self.mutable_samples_position = mutable;
        self
    }

    #[must_use]
    pub fn build(self) -> DecoderOptions {
        DecoderOptions {
            returned_samples: self.returned_samples,
            policy: self.policy.unwrap_or_default(),
            simple_genotypes: self.simple_genotypes,
            unknown_genotype: self
                .unknown_genotype
                .unwrap_or_else(|| UNKNOWN_GENOTYPE.to_string()),
            study_name_as_id: self.study_name_as_id,
            mutable_samples_position: self.mutable_samples_position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DecoderOptions::default();
        assert!(options.returned_samples().is_none());
        assert_eq!(options.policy(), IntegrityPolicy::Lenient);
        assert!(!options.simple_genotypes());
        assert_eq!(options.unknown_genotype(), "?/?");
        assert!(!options.study_name_as_id());
        assert!(!options.mutable_samples_position());
    }

    #[test]
    fn test_unknown_genotype_reset() {
        let options = DecoderOptionsBuilder::default()
            .unknown_genotype("./.")
            .build();
        assert_eq!(options.unknown_genotype(), "./.");

        let options = DecoderOptionsBuilder::default()
            .unknown_genotype("./.")
            .unknown_genotype("")
            .build();
        assert_eq!(options.unknown_genotype(), UNKNOWN_GENOTYPE);
    }

    #[test]
    fn test_builder_settings() {
        let options = DecoderOptionsBuilder::default()
            .returned_samples(vec!["B".to_string(), "A".to_string()])
            .policy(IntegrityPolicy::Strict)
            .study_name_as_id(true)
            .mutable_samples_position(true)
            .build();
        assert_eq!(options.returned_samples().unwrap(), &["B", "A"]);
        assert!(options.policy().is_strict());
        assert!(options.study_name_as_id());
        assert!(options.mutable_samples_position());
    }
}
