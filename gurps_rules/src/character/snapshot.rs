//! Saved character purchases

use super::error::{CharacterError, CharacterResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name plus non-zero purchased levels, sorted by trait name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    pub name: String,
    #[serde(default)]
    pub purchases: BTreeMap<String, i64>,
    /// Opaque presentation data, passed through untouched
    #[serde(default)]
    pub layout: serde_json::Value,
}

impl CharacterSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> CharacterResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CharacterError::snapshot_format(e.to_string()))
    }

    pub fn from_json(text: &str) -> CharacterResult<Self> {
        serde_json::from_str(text).map_err(|e| CharacterError::snapshot_format(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_missing_fields_default() {
        let snapshot = CharacterSnapshot::from_json(r#"{"name": "Bob"}"#).unwrap();
        assert_eq!(snapshot.name, "Bob");
        assert!(snapshot.purchases.is_empty());
        assert!(snapshot.layout.is_null());
    }

    #[test]
    fn test_layout_passes_through() {
        let text = r#"{"name": "Ann", "purchases": {"ST": 2}, "layout": {"columns": [1, 2]}}"#;
        let snapshot = CharacterSnapshot::from_json(text).unwrap();
        let again = CharacterSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(again.layout["columns"][1], 2);
        assert_eq!(again.purchases.get("ST"), Some(&2));
    }

    #[test]
    fn test_malformed_json() {
        assert_matches!(
            CharacterSnapshot::from_json("{\"purchases\": 3}"),
            Err(CharacterError::SnapshotFormat { .. })
        );
    }
}
