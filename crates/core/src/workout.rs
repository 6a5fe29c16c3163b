//! Workout records and their document-field mapping.
//!
//! A record only exists once the remote store has assigned it an id. Before
//! that it is a [`WorkoutDraft`]. Updates travel as a [`WorkoutPatch`], which
//! can only carry the title and description, so the owner and id of a stored
//! record are never rewritten from the client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Fields, RecordId, UserId};

pub const FIELD_TITLE: &str = "title";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_OWNER: &str = "userId";

/// Older documents nested their content under this key.
pub const FIELD_LEGACY_NESTED: &str = "taskData";

/// Title shown for a document that carries none.
pub const UNTITLED: &str = "Untitled";

/// A stored workout as seen through the local mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub owner_id: Option<UserId>,
}

impl WorkoutRecord {
    /// Map raw document fields into a record.
    ///
    /// Title and description fall back to the legacy nested layout, then to
    /// `"Untitled"` and the empty string respectively.
    pub fn from_fields(id: impl Into<RecordId>, fields: &Fields) -> Self {
        let title = text_field(fields, FIELD_TITLE)
            .filter(|t| !t.is_empty())
            .or_else(|| legacy_text_field(fields, FIELD_TITLE).filter(|t| !t.is_empty()))
            .unwrap_or(UNTITLED)
            .to_string();

        let description = text_field(fields, FIELD_DESCRIPTION)
            .filter(|d| !d.is_empty())
            .or_else(|| legacy_text_field(fields, FIELD_DESCRIPTION))
            .unwrap_or_default()
            .to_string();

        Self {
            id: id.into(),
            title,
            description,
            owner_id: text_field(fields, FIELD_OWNER).map(str::to_string),
        }
    }
}

fn text_field<'a>(fields: &'a Fields, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

fn legacy_text_field<'a>(fields: &'a Fields, key: &str) -> Option<&'a str> {
    fields
        .get(FIELD_LEGACY_NESTED)
        .and_then(Value::as_object)
        .and_then(|nested| text_field(nested, key))
}

/// A workout that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutDraft {
    pub title: String,
    pub description: String,
    pub owner_id: Option<UserId>,
}

impl WorkoutDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            owner_id: None,
        }
    }

    pub fn owned_by(mut self, owner_id: impl Into<UserId>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// Document fields written on creation. The owner is omitted when unknown.
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(FIELD_TITLE.into(), Value::String(self.title.clone()));
        fields.insert(
            FIELD_DESCRIPTION.into(),
            Value::String(self.description.clone()),
        );
        if let Some(owner) = &self.owner_id {
            fields.insert(FIELD_OWNER.into(), Value::String(owner.clone()));
        }
        fields
    }
}

/// The only fields an update may write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutPatch {
    pub title: String,
    pub description: String,
}

impl WorkoutPatch {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(FIELD_TITLE.into(), Value::String(self.title.clone()));
        fields.insert(
            FIELD_DESCRIPTION.into(),
            Value::String(self.description.clone()),
        );
        fields
    }
}

impl From<&WorkoutRecord> for WorkoutPatch {
    fn from(record: &WorkoutRecord) -> Self {
        Self::new(record.title.clone(), record.description.clone())
    }
}

impl From<WorkoutRecord> for WorkoutPatch {
    fn from(record: WorkoutRecord) -> Self {
        Self::new(record.title, record.description)
    }
}
