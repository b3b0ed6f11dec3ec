//! Dataset, item and prediction types.
//!
//! A [`Dataset`] is produced by an upstream loader and treated as read-only
//! here. Item ids are unique within a dataset; this is checked whenever a
//! dataset is built or deserialized, so every `Dataset` value upholds it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DatasetError, DatasetResult};
use crate::types::Metadata;

/// A single labeled example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetItem {
    id: String,
    #[serde(default)]
    input: Value,
    #[serde(default)]
    expected: Value,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    metadata: Metadata,
}

impl DatasetItem {
    /// Create an item with empty metadata.
    pub fn new(id: impl Into<String>, input: Value, expected: Value) -> Self {
        Self {
            id: id.into(),
            input,
            expected,
            metadata: Metadata::new(),
        }
    }

    /// Attach metadata to the item.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn input(&self) -> &Value {
        &self.input
    }

    /// The reference answer. Its shape depends on the metric.
    pub fn expected(&self) -> &Value {
        &self.expected
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Resolve a dotted field path against this item.
    ///
    /// The first segment selects the root (`id`, `input`, `expected` or
    /// `metadata`); remaining segments index into objects by key and into
    /// arrays by position. A path whose first segment is none of those roots
    /// is looked up inside `metadata`.
    pub fn field(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let head = segments.next()?;

        let (root, rest): (&Value, Vec<&str>) = match head {
            "id" => return Some(Value::String(self.id.clone())),
            "input" => (&self.input, segments.collect()),
            "expected" => (&self.expected, segments.collect()),
            "metadata" => {
                let key = segments.next()?;
                (self.metadata.get(key)?, segments.collect())
            }
            key => (self.metadata.get(key)?, segments.collect()),
        };

        let mut current = root;
        for segment in rest {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        if current.is_null() {
            None
        } else {
            Some(current.clone())
        }
    }
}

/// An ordered collection of uniquely identified items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    name: String,
    version: String,
    items: Vec<DatasetItem>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    metadata: Metadata,
}

/// Unchecked wire form of [`Dataset`].
#[derive(Deserialize)]
struct RawDataset {
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    items: Vec<DatasetItem>,
    #[serde(default)]
    metadata: Metadata,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = DatasetError;

    fn try_from(raw: RawDataset) -> DatasetResult<Self> {
        Dataset::new(raw.name, raw.version, raw.items, raw.metadata)
    }
}

impl Dataset {
    /// Build a dataset, rejecting duplicate item ids.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        items: Vec<DatasetItem>,
        metadata: Metadata,
    ) -> DatasetResult<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(DatasetError::DuplicateItemId(item.id.clone()));
            }
        }

        Ok(Self {
            name: name.into(),
            version: version.into(),
            items,
            metadata,
        })
    }

    /// Build a derived dataset from items already known to be unique.
    ///
    /// Used by the sampler; the new dataset keeps this dataset's name and
    /// version and extends its metadata.
    pub(crate) fn derive(&self, items: Vec<DatasetItem>, extra: Metadata) -> Self {
        let mut metadata = self.metadata.clone();
        metadata.extend(extra);
        Self {
            name: self.name.clone(),
            version: self.version.clone(),
            items,
            metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn items(&self) -> &[DatasetItem] {
        &self.items
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by id.
    pub fn get(&self, id: &str) -> Option<&DatasetItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Item ids in dataset order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.id.as_str())
    }
}

/// A model output for one dataset item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Id of the [`DatasetItem`] this prediction answers
    pub id: String,
    /// The model's answer
    pub predicted: Value,
    /// Arbitrary key-value metadata
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl Prediction {
    /// Create a prediction with empty metadata.
    pub fn new(id: impl Into<String>, predicted: Value) -> Self {
        Self {
            id: id.into(),
            predicted,
            metadata: Metadata::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str) -> DatasetItem {
        DatasetItem::new(id, json!("question"), json!("answer"))
    }

    // ==================== Dataset Construction Tests ====================

    #[test]
    fn dataset_new_accepts_unique_ids() {
        let dataset = Dataset::new("qa", "1.0", vec![item("a"), item("b")], Metadata::new())
            .unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.ids().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn dataset_new_rejects_duplicate_ids() {
        let result = Dataset::new(
            "qa",
            "1.0",
            vec![item("a"), item("b"), item("a")],
            Metadata::new(),
        );

        assert_eq!(result, Err(DatasetError::DuplicateItemId("a".to_string())));
    }

    #[test]
    fn dataset_deserialization_rejects_duplicate_ids() {
        let json = r#"{
            "name": "qa",
            "version": "1",
            "items": [
                {"id": "x", "input": "q", "expected": "a"},
                {"id": "x", "input": "q", "expected": "b"}
            ]
        }"#;

        let err = serde_json::from_str::<Dataset>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate item id"));
    }

    #[test]
    fn dataset_deserialization_defaults_optional_fields() {
        let json = r#"{"name": "qa", "items": [{"id": "1", "expected": "4"}]}"#;

        let dataset: Dataset = serde_json::from_str(json).unwrap();

        assert_eq!(dataset.version(), "");
        assert!(dataset.metadata().is_empty());
        assert_eq!(dataset.items()[0].expected(), &json!("4"));
        assert!(dataset.items()[0].input().is_null());
    }

    #[test]
    fn dataset_get_finds_item_by_id() {
        let dataset = Dataset::new("qa", "1.0", vec![item("a"), item("b")], Metadata::new())
            .unwrap();

        assert_eq!(dataset.get("b").map(DatasetItem::id), Some("b"));
        assert!(dataset.get("missing").is_none());
        assert!(dataset.contains("a"));
    }

    #[test]
    fn dataset_derive_extends_metadata_and_keeps_identity() {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), json!("hub"));
        let dataset = Dataset::new("qa", "2.1", vec![item("a"), item("b")], metadata).unwrap();

        let mut extra = Metadata::new();
        extra.insert("sample_method".to_string(), json!("random"));
        let derived = dataset.derive(vec![item("b")], extra);

        assert_eq!(derived.name(), "qa");
        assert_eq!(derived.version(), "2.1");
        assert_eq!(derived.len(), 1);
        assert_eq!(derived.metadata().get("source"), Some(&json!("hub")));
        assert_eq!(derived.metadata().get("sample_method"), Some(&json!("random")));
        assert_eq!(dataset.len(), 2);
    }

    // ==================== Field Path Tests ====================

    #[test]
    fn field_resolves_metadata_paths() {
        let mut metadata = Metadata::new();
        metadata.insert("category".to_string(), json!("math"));
        let item = item("a").with_metadata(metadata);

        assert_eq!(item.field("metadata.category"), Some(json!("math")));
        assert_eq!(item.field("category"), Some(json!("math")));
    }

    #[test]
    fn field_resolves_nested_input_and_expected_paths() {
        let item = DatasetItem::new(
            "a",
            json!({"question": {"topic": "geo"}, "choices": ["x", "y"]}),
            json!({"label": 2}),
        );

        assert_eq!(item.field("input.question.topic"), Some(json!("geo")));
        assert_eq!(item.field("input.choices.1"), Some(json!("y")));
        assert_eq!(item.field("expected.label"), Some(json!(2)));
        assert_eq!(item.field("id"), Some(json!("a")));
    }

    #[test]
    fn field_returns_none_for_missing_or_null_values() {
        let mut metadata = Metadata::new();
        metadata.insert("difficulty".to_string(), Value::Null);
        let item = item("a").with_metadata(metadata);

        assert!(item.field("metadata.category").is_none());
        assert!(item.field("difficulty").is_none());
        assert!(item.field("input.nested").is_none());
    }

    // ==================== Prediction Tests ====================

    #[test]
    fn prediction_deserializes_without_metadata() {
        let json = r#"{"id": "1", "predicted": "4"}"#;

        let prediction: Prediction = serde_json::from_str(json).unwrap();

        assert_eq!(prediction, Prediction::new("1", json!("4")));
    }
}
