//! Parsing of submitted annotation fields.
//!
//! The web form posts a flat object of `status-<key>` / `action-<key>` fields.
//! The CLI editor round-trips a keyed JSON document.

use crate::error::{HandoverError, Result};
use crate::ordered::OrderedMap;
use crate::store::{AnnotationStore, EditField, Edits, FetchedTicket, TicketEdit};
use serde::{Deserialize, Serialize};

const STATUS_PREFIX: &str = "status-";
const ACTION_PREFIX: &str = "action-";

/// Split a form field name into its target field and ticket key.
pub fn parse_field_name(name: &str) -> Option<(EditField, &str)> {
    let (field, key) = if let Some(key) = name.strip_prefix(STATUS_PREFIX) {
        (EditField::Status, key)
    } else if let Some(key) = name.strip_prefix(ACTION_PREFIX) {
        (EditField::Action, key)
    } else {
        return None;
    };
    if key.is_empty() {
        return None;
    }
    Some((field, key))
}

/// Collect form fields into per-ticket edits, keys in first-seen order.
///
/// Fields with other names are ignored. Values must be strings or null.
pub fn from_form(form: &serde_json::Map<String, serde_json::Value>) -> Result<Edits> {
    let mut edits = Edits::new();
    for (name, value) in form {
        let Some((field, key)) = parse_field_name(name) else {
            continue;
        };
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            _ => return Err(HandoverError::InvalidField(name.clone())),
        };
        edits.entry_or_default(key).set(field, value);
    }
    Ok(edits)
}

/// Same value pair for every fetched ticket.
pub fn fill_all(fetched: &[FetchedTicket], status: &str, action: &str) -> Edits {
    fetched
        .iter()
        .map(|t| {
            (
                t.key.clone(),
                TicketEdit {
                    status: Some(status.to_string()),
                    action: Some(action.to_string()),
                    summary: Some(t.summary.clone()),
                },
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Editor document
// ---------------------------------------------------------------------------

/// One entry of the document the CLI hands to `$EDITOR`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorEntry {
    pub ticket_number: usize,
    pub summary: String,
    pub status: String,
    pub action: String,
}

pub type EditorDocument = OrderedMap<EditorEntry>;

/// Pre-fill the editor document with fetched tickets and their saved values.
pub fn editor_document(fetched: &[FetchedTicket], saved: &AnnotationStore) -> EditorDocument {
    fetched
        .iter()
        .enumerate()
        .map(|(idx, t)| {
            (
                t.key.clone(),
                EditorEntry {
                    ticket_number: idx + 1,
                    summary: t.summary.clone(),
                    status: saved.status_of(&t.key).to_string(),
                    action: saved.action_of(&t.key).to_string(),
                },
            )
        })
        .collect()
}

/// Turn an edited document back into edits.
pub fn from_editor_document(doc: &EditorDocument) -> Edits {
    doc.iter()
        .map(|(key, entry)| {
            (
                key.to_string(),
                TicketEdit {
                    status: Some(entry.status.clone()),
                    action: Some(entry.action.clone()),
                    summary: Some(entry.summary.clone()),
                },
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
