//! The todo item entity and its JSON field application.
//!
//! # Design
//! `Item` is the in-memory image of one row of the `item` table. `id` is
//! `None` until the store assigns it on insert; `name` stays optional in
//! memory so that a nameless create reaches the database and fails at the
//! `NOT NULL` constraint, exactly like any other storage error. Partial
//! payloads are folded in with [`Item::apply`] rather than a dedicated
//! request DTO per verb — POST, PUT, and PATCH all accept any subset of the
//! mutable fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single todo item.
///
/// Serializes to exactly four fields: `id`, `name`, `description`,
/// `completed`. Unset options render as JSON `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl Item {
    /// Copies recognized fields from a JSON payload onto the item.
    ///
    /// Only `name` (string), `description` (string or null), and `completed`
    /// (bool) are applied; keys that are absent, unrecognized, or carry a
    /// value of the wrong type leave the item untouched. The identifier is
    /// never updated. A payload that is not a JSON object is a no-op —
    /// applying fields never fails.
    pub fn apply(&mut self, data: &Value) {
        let Some(map) = data.as_object() else {
            return;
        };
        if let Some(name) = map.get("name").and_then(Value::as_str) {
            self.name = Some(name.to_string());
        }
        if let Some(description) = map.get("description") {
            if description.is_null() {
                self.description = None;
            } else if let Some(text) = description.as_str() {
                self.description = Some(text.to_string());
            }
        }
        if let Some(completed) = map.get("completed").and_then(Value::as_bool) {
            self.completed = completed;
        }
    }
}
