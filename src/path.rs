//! Path resolution over generic nested values
//!
//! The hydration data is an undocumented, versioned shape that adds,
//! removes, and reorders fields between releases. Resolution is therefore
//! total: any miss (null intermediate, wrong container type, out-of-bounds
//! index, unknown key) yields `None` instead of panicking, so one shape
//! change does not break extraction of unrelated fields.

use serde::Serialize;
use serde_json::Value;

/// One step into a nested value: a map key or a sequence index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathElem {
    Key(&'static str),
    Index(usize),
}

/// Walk `root` along `path`, returning the value at the end of the path.
///
/// A terminal explicit null resolves to `Some(&Value::Null)`; only a path
/// that cannot be walked yields `None`. Indices never wrap around.
pub fn resolve<'a>(root: &'a Value, path: &[PathElem]) -> Option<&'a Value> {
    let mut current = root;
    for elem in path {
        current = match (elem, current) {
            (PathElem::Key(key), Value::Object(map)) => map.get(*key)?,
            (PathElem::Index(index), Value::Array(items)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}
