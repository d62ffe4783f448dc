use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use super::AlternateCoordinate;

/// One sample's field values, parallel to the record's format.
///
/// Lists are reference counted so that defaulted samples can share one instance.
/// Mutation goes through [`Arc::make_mut`] and never touches a shared list.
pub type SampleData = Arc<Vec<String>>;

/// Ordered map from sample name to its position in a [`StudyRecord`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamplePositions {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}
impl SamplePositions {
    /// Builds the map from names in position order
    ///
    /// Repeated names keep their first position.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = Self::default();
        for name in names {
            map.push(name.into());
        }
        map
    }

    /// Appends a sample, returning its position
    pub fn push(&mut self, name: String) -> usize {
        if let Some(&pos) = self.positions.get(&name) {
            return pos;
        }
        let pos = self.names.len();
        self.positions.insert(name.clone(), pos);
        self.names.push(name);
        pos
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    #[must_use]
    pub fn name(&self, pos: usize) -> Option<&str> {
        self.names.get(pos).map(String::as_str)
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.names
            .iter()
            .enumerate()
            .map(|(pos, name)| (name.as_str(), pos))
    }
}

/// A source file referenced by extra sample data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileEntry {
    pub file_id: String,
    pub call: String,
    pub attributes: BTreeMap<String, String>,
}
impl FileEntry {
    #[must_use]
    pub fn new(file_id: &str, call: &str, attributes: BTreeMap<String, String>) -> Self {
        Self {
            file_id: file_id.to_string(),
            call: call.to_string(),
            attributes,
        }
    }
}

/// The decoded view of one study at one variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyRecord {
    study_id: String,
    format: Vec<String>,
    format_positions: HashMap<String, usize>,
    samples_position: Arc<SamplePositions>,
    samples_data: Vec<Option<SampleData>>,
    secondary_alternates: Vec<AlternateCoordinate>,
    files: Vec<FileEntry>,
}
impl StudyRecord {
    #[must_use]
    pub fn new(
        study_id: String,
        format: Vec<String>,
        samples_position: Arc<SamplePositions>,
    ) -> Self {
        let format_positions = format
            .iter()
            .enumerate()
            .map(|(idx, key)| (key.clone(), idx))
            .collect();
        let samples_data = vec![None; samples_position.len()];
        Self {
            study_id,
            format,
            format_positions,
            samples_position,
            samples_data,
            secondary_alternates: Vec::new(),
            files: Vec::new(),
        }
    }

    #[must_use]
    pub fn study_id(&self) -> &str {
        &self.study_id
    }

    #[must_use]
    pub fn format(&self) -> &[String] {
        &self.format
    }

    #[must_use]
    pub fn format_position(&self, key: &str) -> Option<usize> {
        self.format_positions.get(key).copied()
    }

    /// Appends a field to the format if absent, returning its position
    pub fn add_format(&mut self, key: &str) -> usize {
        if let Some(idx) = self.format_position(key) {
            return idx;
        }
        let idx = self.format.len();
        self.format.push(key.to_string());
        self.format_positions.insert(key.to_string(), idx);
        idx
    }

    #[must_use]
    pub fn samples_position(&self) -> &SamplePositions {
        &self.samples_position
    }

    /// The shared sample position map
    #[must_use]
    pub fn samples_position_arc(&self) -> &Arc<SamplePositions> {
        &self.samples_position
    }

    /// Appends a sample to the position map, returning its position
    ///
    /// A shared map is copied first. The new sample starts without data.
    pub fn add_sample(&mut self, name: &str) -> usize {
        let pos = Arc::make_mut(&mut self.samples_position).push(name.to_string());
        if pos >= self.samples_data.len() {
            self.samples_data.resize(pos + 1, None);
        }
        pos
    }

    #[must_use]
    pub fn sample_data_at(&self, pos: usize) -> Option<&[String]> {
        self.samples_data.get(pos)?.as_deref().map(Vec::as_slice)
    }

    #[must_use]
    pub fn sample_data(&self, name: &str) -> Option<&[String]> {
        self.sample_data_at(self.samples_position.get(name)?)
    }

    /// The reference-counted list of a sample
    #[must_use]
    pub fn sample_data_arc(&self, pos: usize) -> Option<&SampleData> {
        self.samples_data.get(pos)?.as_ref()
    }

    /// A single field of a sample, by field name
    #[must_use]
    pub fn sample_field(&self, name: &str, key: &str) -> Option<&str> {
        let idx = self.format_position(key)?;
        self.sample_data(name)?.get(idx).map(String::as_str)
    }

    #[must_use]
    pub fn has_sample_data(&self, pos: usize) -> bool {
        matches!(self.samples_data.get(pos), Some(Some(_)))
    }

    /// Mutable access to one sample's list (copy-on-write if shared)
    pub fn sample_data_mut(&mut self, pos: usize) -> Option<&mut Vec<String>> {
        self.samples_data.get_mut(pos)?.as_mut().map(Arc::make_mut)
    }

    /// Replaces a sample's list; positions outside the map are ignored
    pub fn set_sample_data(&mut self, pos: usize, data: Vec<String>) {
        if let Some(slot) = self.samples_data.get_mut(pos) {
            *slot = Some(Arc::new(data));
        }
    }

    /// Sets one field of a sample, creating the list (padded with `filler`) if needed
    pub fn set_sample_field(&mut self, pos: usize, field_idx: usize, value: &str, filler: &str) {
        let Some(slot) = self.samples_data.get_mut(pos) else {
            return;
        };
        let data = Arc::make_mut(slot.get_or_insert_with(|| Arc::new(Vec::new())));
        if data.len() <= field_idx {
            data.resize(field_idx + 1, filler.to_string());
        }
        data[field_idx] = value.to_string();
    }

    /// Number of samples that still have no list
    #[must_use]
    pub fn missing_samples(&self) -> usize {
        self.samples_data.iter().filter(|data| data.is_none()).count()
    }

    /// True once every sample holds a list at least as long as the format
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.samples_data
            .iter()
            .all(|data| data.as_ref().is_some_and(|d| d.len() >= self.format.len()))
    }

    /// Iterates samples in position order with their lists
    pub fn iter_samples(&self) -> impl Iterator<Item = (&str, Option<&[String]>)> {
        self.samples_position
            .iter()
            .map(|(name, pos)| (name, self.sample_data_at(pos)))
    }

    pub(crate) fn samples_data_mut(&mut self) -> &mut [Option<SampleData>] {
        &mut self.samples_data
    }

    #[must_use]
    pub fn secondary_alternates(&self) -> &[AlternateCoordinate] {
        &self.secondary_alternates
    }

    pub fn set_secondary_alternates(&mut self, alternates: Vec<AlternateCoordinate>) {
        self.secondary_alternates = alternates;
    }

    #[must_use]
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Adds a file unless one with the same id (case-insensitive) is present
    ///
    /// # Returns
    ///
    /// * `true` if the file was added
    pub fn add_file(&mut self, file: FileEntry) -> bool {
        if self
            .files
            .iter()
            .any(|f| f.file_id.eq_ignore_ascii_case(&file.file_id))
        {
            return false;
        }
        self.files.push(file);
        true
    }
}
