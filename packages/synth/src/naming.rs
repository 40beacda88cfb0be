//! Canonical slice names.
//!
//! A child module contributes one slice to the aggregate, named after the
//! directory that encloses it: `src/App/reducer.js` contributes `AppState`,
//! stored under the field `app` and imported as the value `appState`.

use crate::import_path::normalize;
use std::path::{Component, Path};

/// Suffix shared by every slice name and by the type contract itself
pub const STATE_SUFFIX: &str = "State";

/// Slice name for the module at `path`: the enclosing directory name in
/// UpperCamelCase followed by `State`.
///
/// A path without a named parent directory yields `State` alone.
pub fn state_name(path: &Path) -> String {
    let normalized = normalize(path);
    let directory = normalized.parent().and_then(|parent| {
        parent.components().rev().find_map(|component| match component {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
    });

    match directory {
        Some(name) => format!("{}{}", upper_camel_case(name), STATE_SUFFIX),
        None => STATE_SUFFIX.to_string(),
    }
}

/// Field key of a slice in the aggregate: suffix stripped, lower-cased.
pub fn field_key(state_name: &str) -> String {
    state_name
        .strip_suffix(STATE_SUFFIX)
        .unwrap_or(state_name)
        .to_ascii_lowercase()
}

/// Local alias for a slice's initial value: first character lower-cased.
pub fn value_alias(state_name: &str) -> String {
    let mut chars = state_name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// `todo-list`, `todo_list` and `todoList` all become `TodoList`
pub fn upper_camel_case(segment: &str) -> String {
    segment
        .split(|c: char| c == '-' || c == '_' || c == '.' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
