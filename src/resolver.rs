//! Per-study sample position and format resolution
//!
//! Both values are deterministic functions of the study metadata and the
//! decoder's returned-samples selection, so they are computed once per study and
//! cached. The caches only grow; concurrent first calls may compute the same
//! value twice, and the first insert wins.

use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
    sync::Arc,
};

use log::debug;
use parking_lot::RwLock;

use crate::{
    core::{SamplePositions, FILTER_KEY, GT_KEY},
    error::{MetadataError, Result},
    metadata::{StudyMetadata, StudyMetadataSource},
};

/// Ordered sample positions of a study
///
/// Without a selection, all indexed samples in storage order. With a selection,
/// the selected samples that are indexed in the study, in selection order.
#[must_use]
pub fn returned_samples_position(
    study: &StudyMetadata,
    returned: Option<&[String]>,
) -> SamplePositions {
    let indexed_names = study
        .indexed_samples
        .iter()
        .filter_map(|&id| study.sample_name(id));
    match returned {
        None => SamplePositions::from_names(indexed_names),
        Some(returned) => {
            let indexed: HashSet<&str> = indexed_names.collect();
            SamplePositions::from_names(
                returned
                    .iter()
                    .filter(|name| indexed.contains(name.as_str()))
                    .cloned(),
            )
        }
    }
}

/// The base field list of a study
///
/// `GT` followed by the configured extra genotype fields (`FT` if none are
/// configured), or only the extra fields when genotypes are excluded.
#[must_use]
pub fn base_format(study: &StudyMetadata) -> Vec<String> {
    let extra_fields = if study.extra_genotype_fields.is_empty() {
        vec![FILTER_KEY.to_string()]
    } else {
        study.extra_genotype_fields.clone()
    };
    if study.exclude_genotypes {
        extra_fields
    } else {
        let mut format = Vec::with_capacity(1 + extra_fields.len());
        format.push(GT_KEY.to_string());
        format.extend(extra_fields);
        format
    }
}

/// Insert-if-absent cache keyed by study id
#[derive(Debug)]
struct StudyCache<K, V> {
    inner: RwLock<HashMap<K, Arc<V>>>,
}
impl<K: Eq + Hash + Copy, V> StudyCache<K, V> {
    fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn get_or_insert_with(&self, key: K, f: impl FnOnce() -> V) -> Arc<V> {
        if let Some(value) = self.inner.read().get(&key) {
            return Arc::clone(value);
        }
        let value = Arc::new(f());
        Arc::clone(self.inner.write().entry(key).or_insert(value))
    }

    fn len(&self) -> usize {
        self.inner.read().len()
    }
}

/// Resolves studies against a metadata source, memoizing per-study values
#[derive(Debug)]
pub struct StudyResolver<M> {
    metadata: M,
    returned_samples: Option<Vec<String>>,
    positions: StudyCache<u32, SamplePositions>,
    formats: StudyCache<u32, Vec<String>>,
}
impl<M: StudyMetadataSource> StudyResolver<M> {
    pub fn new(metadata: M, returned_samples: Option<Vec<String>>) -> Self {
        Self {
            metadata,
            returned_samples,
            positions: StudyCache::new(),
            formats: StudyCache::new(),
        }
    }

    pub fn study(&self, study_id: u32) -> Result<Arc<StudyMetadata>> {
        self.metadata
            .study(study_id)
            .ok_or_else(|| MetadataError::UnknownStudy(study_id).into())
    }

    pub fn samples_position(&self, study: &StudyMetadata) -> Arc<SamplePositions> {
        self.positions.get_or_insert_with(study.id, || {
            debug!("Resolving sample positions for study {}", study.id);
            returned_samples_position(study, self.returned_samples.as_deref())
        })
    }

    pub fn format(&self, study: &StudyMetadata) -> Arc<Vec<String>> {
        self.formats.get_or_insert_with(study.id, || base_format(study))
    }

    /// Number of studies with cached sample positions
    pub fn cached_studies(&self) -> usize {
        self.positions.len()
    }

    pub fn metadata(&self) -> &M {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, metadata::InMemoryMetadata};

    fn study() -> StudyMetadata {
        let mut study = StudyMetadata::new(1, "S1");
        for (id, name) in [(1, "S1"), (2, "S2"), (3, "S3"), (4, "S4")] {
            study.index_sample(id, name);
        }
        // registered but never loaded
        study.register_sample(7, "S7");
        study
    }

    #[test]
    fn test_all_indexed_samples() {
        let positions = returned_samples_position(&study(), None);
        assert_eq!(positions.names(), &["S1", "S2", "S3", "S4"]);
    }

    #[test]
    fn test_returned_samples_reordered_and_filtered() {
        let returned = vec![
            "S3".to_string(),
            "S7".to_string(),
            "S1".to_string(),
            "NOPE".to_string(),
        ];
        let positions = returned_samples_position(&study(), Some(&returned));
        assert_eq!(positions.names(), &["S3", "S1"]);
        assert_eq!(positions.get("S1"), Some(1));
    }

    #[test]
    fn test_base_format_default() {
        assert_eq!(base_format(&study()), vec!["GT", "FT"]);
    }

    #[test]
    fn test_base_format_extra_fields() {
        let mut study = study();
        study.extra_genotype_fields = vec!["AD".to_string(), "DP".to_string()];
        assert_eq!(base_format(&study), vec!["GT", "AD", "DP"]);
        study.exclude_genotypes = true;
        assert_eq!(base_format(&study), vec!["AD", "DP"]);
    }

    #[test]
    fn test_resolver_caches_per_study() {
        let source = InMemoryMetadata::new();
        source.insert(study());
        let resolver = StudyResolver::new(source, None);

        let study = resolver.study(1).unwrap();
        let first = resolver.samples_position(&study);
        let second = resolver.samples_position(&study);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&resolver.format(&study), &resolver.format(&study)));
        assert_eq!(resolver.cached_studies(), 1);
    }

    #[test]
    fn test_unknown_study() {
        let resolver = StudyResolver::new(InMemoryMetadata::new(), None);
        assert!(matches!(
            resolver.study(9),
            Err(Error::MetadataError(MetadataError::UnknownStudy(9)))
        ));
    }

    #[test]
    fn test_concurrent_population_is_consistent() {
        let source = InMemoryMetadata::new();
        source.insert(study());
        let resolver = StudyResolver::new(source, None);
        let study = resolver.study(1).unwrap();

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| resolver.samples_position(&study)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for positions in &results {
            assert_eq!(positions.as_ref(), results[0].as_ref());
        }
        assert_eq!(resolver.cached_studies(), 1);
    }
}
