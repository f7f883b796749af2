use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub mod error;
pub mod schema;
pub mod value_store;

pub use error::{FormError, SchemaError};
pub use value_store::ValueStore;

/// Field type tag as it appears in `fieldType`.
///
/// Tags the registry does not know are kept verbatim in `Other` so they can
/// still be aliased or rendered through the fallback rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    Date,
    FixedTime,
    Radio,
    Dropdown,
    Multiple,
    Checkbox,
    Weekdays,
    Other(String),
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::FixedTime => "fixed_time",
            FieldKind::Radio => "radio",
            FieldKind::Dropdown => "dropdown",
            FieldKind::Multiple => "multiple",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Weekdays => "weekdays",
            FieldKind::Other(tag) => tag,
        }
    }

    /// True for the tags the dispatch table has a dedicated rule for.
    pub fn is_known(&self) -> bool {
        !matches!(self, FieldKind::Other(_))
    }
}

impl From<&str> for FieldKind {
    fn from(tag: &str) -> Self {
        match tag {
            "text" => FieldKind::Text,
            "number" => FieldKind::Number,
            "date" => FieldKind::Date,
            "fixed_time" => FieldKind::FixedTime,
            "radio" => FieldKind::Radio,
            "dropdown" => FieldKind::Dropdown,
            "multiple" => FieldKind::Multiple,
            "checkbox" => FieldKind::Checkbox,
            "weekdays" => FieldKind::Weekdays,
            other => FieldKind::Other(other.to_string()),
        }
    }
}

impl From<String> for FieldKind {
    fn from(tag: String) -> Self {
        FieldKind::from(tag.as_str())
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldLabelProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
    /// Choices for option-driven types. Absent or `null` means no choices.
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_label_properties: Option<FieldLabelProperties>,
}

/// One schema-declared form field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_unique_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub field_type: FieldKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub field_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: FieldProperties,
}

impl FieldDescriptor {
    /// Identifier from `fieldUniqueKey`, falling back to `fieldId`.
    pub fn id(&self) -> Option<&str> {
        non_empty(self.field_unique_key.as_deref()).or_else(|| non_empty(self.field_id.as_deref()))
    }

    /// Identifier of a descriptor that went through schema flattening.
    pub fn key(&self) -> &str {
        self.id().unwrap_or_default()
    }

    /// `fieldLabelProperties.fieldLabel`, then `label`, then `fieldName`.
    pub fn label(&self) -> &str {
        let props = &self.properties;
        non_empty(
            props
                .field_label_properties
                .as_ref()
                .and_then(|l| l.field_label.as_deref()),
        )
        .or_else(|| non_empty(props.label.as_deref()))
        .unwrap_or(self.field_name.as_str())
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Current value of one field. The shape follows the field type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
    Many(Vec<String>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// Selected options. A text value is read as a single selection, the
    /// seeded empty string as none.
    pub fn selections(&self) -> Vec<String> {
        match self {
            FieldValue::Many(items) => items.clone(),
            FieldValue::Text(s) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Empty text, empty selection, or an unchecked flag.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Flag(b) => !b,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Many(items) => items.is_empty(),
        }
    }
}

#[async_trait]
pub trait SchemaPort: Send + Sync {
    /// Fetch the schema at `url` and return its flattened field list.
    async fn fetch_fields(&self, url: &str) -> Result<Vec<FieldDescriptor>, SchemaError>;
}

#[async_trait]
pub trait SubmissionPort: Send + Sync {
    async fn deliver(&self, values: &ValueStore) -> anyhow::Result<()>;
}
