//! Project types for Taskgram.
//!
//! A project is the stored representation of a chat/workspace that tasks
//! belong to. Its id is the originating chat's external id rendered as a
//! string, which makes lazy creation idempotent: the first task-bearing
//! message from a chat creates the row, later messages only refresh it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project managed by Taskgram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Stable identifier, derived from the chat's external id.
    pub id: String,

    /// Display name of the project.
    pub title: String,

    /// When the project row was first created.
    pub created_at: DateTime<Utc>,

    /// When the project was last refreshed by an inbound message.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or refreshing a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    /// Stable identifier, derived from the chat's external id.
    pub id: String,

    /// Display name of the project.
    pub title: String,
}

impl NewProject {
    /// Creates a new project input from a chat's external id and title.
    ///
    /// A chat without a title gets a generated placeholder name.
    pub fn from_chat(chat_id: i64, title: Option<&str>) -> Self {
        Self {
            id: chat_id.to_string(),
            title: title
                .map(str::to_string)
                .unwrap_or_else(|| format!("Chat {}", chat_id)),
        }
    }
}
