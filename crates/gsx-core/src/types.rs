//! Catalog document model and the flattened record type.
//!
//! Catalog payloads come from third parties and are only loosely OSCAL
//! shaped, so every field here is optional and deserializes leniently:
//! scalars are stringified, values of the wrong type count as absent, and
//! list entries that are not objects are dropped. Fields the model does not
//! know about are kept in `extra` rather than rejected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lenient field deserializers shared by the catalog node types.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(scalar_to_string(&value))
    }

    pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let Value::Array(items) = Value::deserialize(deserializer)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect())
    }

    pub fn scalar_to_string(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// A `name`/`value` property attached to a control.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogProp {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A control parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogParam {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub prose: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A structural part of a control such as its statement or guidance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogPart {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Structural token, e.g. `statement` or `guidance`
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub prose: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A control node as found in the source document.
///
/// Controls may nest arbitrarily deep through `controls`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogControl {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Classification label (`class` in the document)
    #[serde(
        rename = "class",
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub class: Option<String>,
    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<CatalogProp>,
    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<CatalogParam>,
    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<CatalogPart>,
    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<CatalogControl>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A group of controls; groups nest through `groups`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogGroup {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<CatalogControl>,
    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<CatalogGroup>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `catalog` object of a payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<CatalogControl>,
    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<CatalogGroup>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload wrapper exposing the optional `catalog` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogRoot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<Catalog>,
}

/// A flattened, searchable control.
///
/// Records are produced only by the parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlRecord {
    /// Unique within one parse result
    pub id: String,
    pub title: String,
    /// Ancestor group and control titles, root first
    pub group_path: Vec<String>,
    /// Title followed by the extracted searchable text
    pub full_text: String,
    /// Source node; nested controls are split out into their own records
    pub control: CatalogControl,
}

impl ControlRecord {
    /// Group path joined with `separator`.
    pub fn joined_path(&self, separator: &str) -> String {
        self.group_path.join(separator)
    }
}

/// Records and non-fatal warnings from one parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub controls: Vec<ControlRecord>,
    pub warnings: Vec<String>,
}

impl ParseOutcome {
    /// An outcome holding no records and a single warning.
    pub fn failed(warning: impl Into<String>) -> Self {
        Self {
            controls: Vec::new(),
            warnings: vec![warning.into()],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_control_ignores_unmodeled_fields() {
        let control: CatalogControl = serde_json::from_value(json!({
            "id": "C-1",
            "title": "Patch management",
            "links": [{"href": "#x"}],
            "custom": 42
        }))
        .unwrap();

        assert_eq!(control.id.as_deref(), Some("C-1"));
        assert_eq!(control.extra.get("custom"), Some(&json!(42)));
        assert!(control.extra.contains_key("links"));
    }

    #[test]
    fn test_scalars_are_stringified() {
        let control: CatalogControl = serde_json::from_value(json!({
            "id": 7,
            "title": true,
            "class": null
        }))
        .unwrap();

        assert_eq!(control.id.as_deref(), Some("7"));
        assert_eq!(control.title.as_deref(), Some("true"));
        assert_eq!(control.class, None);
    }

    #[test]
    fn test_wrong_typed_lists_are_treated_as_absent() {
        let control: CatalogControl = serde_json::from_value(json!({
            "title": {"nested": "object"},
            "parts": "not a list",
            "props": [1, "two", {"name": "tags", "value": "backup"}, null],
            "controls": {"id": "not-a-list"}
        }))
        .unwrap();

        assert_eq!(control.title, None);
        assert!(control.parts.is_empty());
        assert!(control.controls.is_empty());
        assert_eq!(control.props.len(), 1);
        assert_eq!(control.props[0].value.as_deref(), Some("backup"));
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = ControlRecord {
            id: "A".to_string(),
            title: "Access".to_string(),
            group_path: vec!["Group".to_string()],
            full_text: "Access".to_string(),
            control: CatalogControl::default(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("groupPath").is_some());
        assert!(value.get("fullText").is_some());
        assert_eq!(record.joined_path(" > "), "Group");
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let control = CatalogControl {
            id: Some("X".to_string()),
            ..CatalogControl::default()
        };
        let value = serde_json::to_value(&control).unwrap();
        assert_eq!(value, json!({"id": "X"}));
    }
}
