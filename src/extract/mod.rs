//! Declarative field extraction
//!
//! A static table of field definitions is resolved against the named block
//! map. Each definition names its target block, a key/index path, and an
//! optional transform. Field-local failures (absent paths, transform
//! errors) degrade to null and are collected as diagnostics; they never
//! abort extraction of sibling fields.

mod details;
mod transform;

pub use details::{extract_details, DETAILS_MAPPINGS};
pub use transform::{Transform, TransformError};

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::path::{resolve, PathElem};

/// One field definition: where the value lives and how to post-process it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Block id the path applies to, e.g. `ds:5`.
    pub block: &'static str,
    pub path: &'static [PathElem],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

/// A field-local failure that was degraded to null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub field: String,
    pub message: String,
}

/// Flat output record. Every field name from the table is present; absent
/// or failed fields carry `Value::Null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub values: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve a field table against a parsed block map.
pub fn extract_fields(blocks: &HashMap<String, Value>, fields: &[FieldSpec]) -> ExtractionResult {
    let mut result = ExtractionResult::default();

    for field in fields {
        let resolved = blocks
            .get(field.block)
            .and_then(|root| resolve(root, field.path));

        let value = match field.transform {
            Some(transform) => match transform.apply(resolved) {
                Ok(value) => value,
                Err(err) => {
                    debug!(field = field.name, %err, "transform failed");
                    result.diagnostics.push(Diagnostic {
                        field: field.name.to_string(),
                        message: err.to_string(),
                    });
                    None
                }
            },
            None => resolved.cloned(),
        };

        result
            .values
            .insert(field.name.to_string(), value.unwrap_or(Value::Null));
    }

    result
}
