//! Wire envelopes and payloads of the remote note service.

use crate::model::note::{Checkpoint, Note};
use serde::{Deserialize, Serialize};

/// `{success, message, data?}` envelope returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    /// Absent on rejections and payload-less acks.
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Envelope for endpoints whose payload is ignored.
pub type Ack = ApiResponse<serde_json::Value>;

/// Body of lock and locked-read calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafePassword {
    pub safe_password: Option<String>,
}

impl SafePassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            safe_password: Some(password.into()),
        }
    }
}

/// Note as exchanged with the remote service.
///
/// Remote-only fields (`safePassword`) never reach the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteNote {
    pub note_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<i32>,
    /// Last-modified epoch milliseconds.
    pub date: i64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_password: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub todo_checkpoint: Vec<Checkpoint>,
}

impl RemoteNote {
    /// Builds the upload shape of a local note.
    ///
    /// Text fields are sent as empty strings instead of null.
    pub fn from_note(note: &Note, safe_password: Option<&str>) -> Self {
        Self {
            note_id: note.id.clone(),
            title: Some(note.title.clone().unwrap_or_default()),
            description: Some(note.description.clone().unwrap_or_default()),
            color: Some(note.color.unwrap_or_default()),
            date: note.timestamp,
            locked: note.locked,
            safe_password: safe_password.map(str::to_string),
            label: Some(note.label.clone().unwrap_or_default()),
            todo_checkpoint: note.checkpoints.clone(),
        }
    }

    /// Converts a downloaded note into a confirmed local record.
    pub fn into_note(self) -> Note {
        Note {
            id: self.note_id,
            title: self.title,
            description: self.description,
            color: self.color,
            label: self.label,
            timestamp: self.date,
            locked: self.locked,
            checkpoints: self.todo_checkpoint,
            connected: true,
            locally_deleted: false,
        }
    }
}
