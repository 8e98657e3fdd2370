//! Annotation store: the on-disk map from ticket key to the human-supplied
//! status/action for that ticket.
//!
//! Layout:
//!   <root>/ticket_data.json   `{ "<key>": { status, action, summary, updated_at } }`
//!
//! The file is read whole and rewritten whole. An unreadable or corrupt file
//! loads as an empty store.

use crate::error::Result;
use crate::io;
use crate::ordered::OrderedMap;
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Sentinel for a status or action that was intentionally left unset.
pub const UNSET: &str = "--";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A ticket as returned by the upstream tracker. Only the key and title matter here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedTicket {
    pub key: String,
    pub summary: String,
}

impl FetchedTicket {
    pub fn new(key: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    #[serde(default = "unset")]
    pub status: String,
    #[serde(default = "unset")]
    pub action: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
}

fn unset() -> String {
    UNSET.to_string()
}

/// RFC 3339, or a naive ISO-8601 timestamp read as local time. Files written
/// by earlier handover tools carry no offset.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    let naive: NaiveDateTime = raw.parse().ok()?;
    Some(match naive.and_local_timezone(Local).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => naive.and_utc(),
    })
}

impl TicketRecord {
    /// True when either annotation carries a real value.
    pub fn has_annotation(&self) -> bool {
        self.status != UNSET || self.action != UNSET
    }
}

/// Which annotation a form field or CLI flag targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Status,
    Action,
}

/// The submitted state for one ticket. `None` means the field was not
/// submitted and is stored as the sentinel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketEdit {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl TicketEdit {
    pub fn set(&mut self, field: EditField, value: impl Into<String>) {
        match field {
            EditField::Status => self.status = Some(value.into()),
            EditField::Action => self.action = Some(value.into()),
        }
    }
}

/// Edits keyed by ticket, in submission order.
pub type Edits = OrderedMap<TicketEdit>;

/// Trim a user value; blank becomes the sentinel.
pub fn normalize(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNSET.to_string(),
    }
}

// ---------------------------------------------------------------------------
// AnnotationStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationStore {
    records: OrderedMap<TicketRecord>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the store at `path`. Missing, unreadable or malformed files give an
    /// empty store; this never fails.
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ticket data unreadable; starting empty");
                return Self::new();
            }
        };
        if data.trim().is_empty() {
            return Self::new();
        }
        match serde_json::from_str(&data) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ticket data corrupt; starting empty");
                Self::new()
            }
        }
    }

    /// Replace the file at `path` with this store as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        io::atomic_write(path, data.as_bytes())
    }

    pub fn get(&self, key: &str) -> Option<&TicketRecord> {
        self.records.get(key)
    }

    /// Insert or overwrite the record for `key`. A new key goes to the end.
    pub fn insert(&mut self, key: impl Into<String>, record: TicketRecord) {
        self.records.insert(key.into(), record);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TicketRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Status for `key`, or the sentinel when the ticket has no record.
    pub fn status_of(&self, key: &str) -> &str {
        self.get(key).map(|r| r.status.as_str()).unwrap_or(UNSET)
    }

    /// Action for `key`, or the sentinel when the ticket has no record.
    pub fn action_of(&self, key: &str) -> &str {
        self.get(key).map(|r| r.action.as_str()).unwrap_or(UNSET)
    }

    /// Raise each `updated_at` to at least the value stored for the same key
    /// in `prior`, so timestamps never go backwards across saves.
    pub fn keep_monotonic(&mut self, prior: &AnnotationStore) {
        for (key, record) in self.records.iter_mut() {
            if let Some(old) = prior.get(key) {
                if old.updated_at > record.updated_at {
                    record.updated_at = old.updated_at;
                }
            }
        }
    }

    /// The saved annotations for exactly the fetched tickets, in fetch order,
    /// with upstream summaries. Tickets with no record get the sentinels.
    pub fn view_of(&self, fetched: &[FetchedTicket]) -> AnnotationStore {
        let mut view = AnnotationStore::new();
        for ticket in fetched {
            let saved = self.get(&ticket.key);
            view.insert(
                ticket.key.clone(),
                TicketRecord {
                    status: saved.map(|r| r.status.clone()).unwrap_or_else(unset),
                    action: saved.map(|r| r.action.clone()).unwrap_or_else(unset),
                    summary: ticket.summary.clone(),
                    updated_at: saved.map(|r| r.updated_at).unwrap_or_default(),
                },
            );
        }
        view
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Build the new complete store from the submitted `edits`.
///
/// Every key in `edits` gets its status/action replaced by the submitted
/// values (blank or missing → `"--"`). Summaries come from `fetched` when the
/// key is present there; otherwise from the edit, or empty. Every record is
/// stamped with `now`. Keys only in `fetched` are not included.
pub fn apply_edits(fetched: &[FetchedTicket], edits: &Edits, now: DateTime<Utc>) -> AnnotationStore {
    let mut store = AnnotationStore::new();
    for (key, edit) in edits.iter() {
        let summary = fetched
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.summary.clone())
            .or_else(|| edit.summary.clone())
            .unwrap_or_default();
        store.insert(
            key,
            TicketRecord {
                status: normalize(edit.status.as_deref()),
                action: normalize(edit.action.as_deref()),
                summary,
                updated_at: now,
            },
        );
    }
    store
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
