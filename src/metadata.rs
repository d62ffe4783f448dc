//! Read-only study metadata consumed during decode

use std::{collections::HashMap, sync::Arc};

use auto_impl::auto_impl;
use parking_lot::RwLock;

/// Study-level configuration affecting default genotypes of unrepresented samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeMode {
    /// Unrepresented samples have an unknown genotype
    #[default]
    Basic,
    /// Every sample was merged, so unrepresented samples are homozygous reference
    Advanced,
}

/// Cardinality class of a field's values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldNumber {
    /// A fixed number of values independent of the alleles
    Fixed(u32),
    /// One value per alternate allele
    PerAlternate,
    /// One value per allele, reference included
    PerAllele,
    /// One value per diploid genotype combination
    PerGenotype,
    /// Any number of values
    Unbounded,
}

/// Scalar type of a field's values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Float,
    Flag,
    Character,
    String,
}

/// Declared semantics of one sample field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub id: String,
    pub number: FieldNumber,
    pub field_type: FieldType,
}
impl FieldDefinition {
    #[must_use]
    pub fn new(id: &str, number: FieldNumber, field_type: FieldType) -> Self {
        Self {
            id: id.to_string(),
            number,
            field_type,
        }
    }
}

/// Everything the decoder needs to know about one study
#[derive(Debug, Clone, Default)]
pub struct StudyMetadata {
    pub id: u32,
    pub name: String,
    /// Fields stored after the genotype in main data columns
    pub extra_genotype_fields: Vec<String>,
    pub exclude_genotypes: bool,
    pub merge_mode: MergeMode,
    /// Indexed (loaded) sample ids in canonical storage order
    pub indexed_samples: Vec<u32>,
    pub field_definitions: Vec<FieldDefinition>,
    sample_names: HashMap<u32, String>,
    sample_ids: HashMap<String, u32>,
}
impl StudyMetadata {
    #[must_use]
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Registers a sample in the id-name bijection
    ///
    /// Re-registering an id or a name replaces its previous pairing.
    pub fn register_sample(&mut self, sample_id: u32, name: &str) {
        if let Some(old) = self.sample_names.insert(sample_id, name.to_string()) {
            self.sample_ids.remove(&old);
        }
        if let Some(old) = self.sample_ids.insert(name.to_string(), sample_id) {
            if old != sample_id {
                self.sample_names.remove(&old);
            }
        }
    }

    /// Registers a sample and marks it as indexed
    pub fn index_sample(&mut self, sample_id: u32, name: &str) {
        self.register_sample(sample_id, name);
        if !self.indexed_samples.contains(&sample_id) {
            self.indexed_samples.push(sample_id);
        }
    }

    #[must_use]
    pub fn sample_name(&self, sample_id: u32) -> Option<&str> {
        self.sample_names.get(&sample_id).map(String::as_str)
    }

    #[must_use]
    pub fn sample_id(&self, name: &str) -> Option<u32> {
        self.sample_ids.get(name).copied()
    }

    #[must_use]
    pub fn field_definition(&self, id: &str) -> Option<&FieldDefinition> {
        self.field_definitions.iter().find(|def| def.id == id)
    }
}

/// Source of study metadata
#[auto_impl(&, Box, Arc)]
pub trait StudyMetadataSource {
    fn study(&self, study_id: u32) -> Option<Arc<StudyMetadata>>;
}

/// Metadata source backed by an in-process map
#[derive(Debug, Default, Clone)]
pub struct InMemoryMetadata {
    studies: Arc<RwLock<HashMap<u32, Arc<StudyMetadata>>>>,
}
impl InMemoryMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a study
    pub fn insert(&self, study: StudyMetadata) {
        self.studies.write().insert(study.id, Arc::new(study));
    }
}
impl StudyMetadataSource for InMemoryMetadata {
    fn study(&self, study_id: u32) -> Option<Arc<StudyMetadata>> {
        self.studies.read().get(&study_id).cloned()
    }
}
