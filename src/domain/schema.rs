//! Schema envelope parsing and group flattening

use serde::Deserialize;
use std::collections::HashSet;

use super::{FieldDescriptor, SchemaError};

/// Body returned by the template API: `{ data: { fields: [[...], ...] } }`
#[derive(Debug, Deserialize)]
pub struct SchemaEnvelope {
    pub data: SchemaData,
}

#[derive(Debug, Deserialize)]
pub struct SchemaData {
    pub fields: Vec<Vec<FieldDescriptor>>,
}

impl SchemaEnvelope {
    pub fn parse(body: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn into_fields(self) -> Result<Vec<FieldDescriptor>, SchemaError> {
        flatten_groups(self.data.fields)
    }
}

/// Flatten field groups into one list, group order first, then order within
/// each group.
///
/// Every descriptor must carry a non-empty identifier that no other
/// descriptor uses; otherwise the whole schema is rejected.
pub fn flatten_groups(
    groups: Vec<Vec<FieldDescriptor>>,
) -> Result<Vec<FieldDescriptor>, SchemaError> {
    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(groups.iter().map(Vec::len).sum());

    for (group_idx, group) in groups.into_iter().enumerate() {
        for (idx, field) in group.into_iter().enumerate() {
            let id = field.id().ok_or_else(|| {
                SchemaError::ShapeMismatch(format!(
                    "fields[{}][{}] has neither fieldUniqueKey nor fieldId",
                    group_idx, idx
                ))
            })?;
            if !seen.insert(id.to_string()) {
                return Err(SchemaError::ShapeMismatch(format!(
                    "duplicate field identifier '{}' at fields[{}][{}]",
                    id, group_idx, idx
                )));
            }
            fields.push(field);
        }
    }

    Ok(fields)
}
