//! Project membership types.
//!
//! A member row records a chat participant's membership in a project. Rows
//! are unique per `(project_id, external_user_id)` and refreshed with the
//! latest observed profile fields whenever that user is seen in the chat.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to members on creation. No role escalation happens in
/// the extraction pipeline.
pub const DEFAULT_MEMBER_ROLE: &str = "member";

/// A chat participant's membership record within a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Internal row id. Tasks reference members by this id.
    pub id: Uuid,

    /// Owning project.
    pub project_id: String,

    /// Source-of-truth user identifier from the chat platform.
    pub external_user_id: i64,

    /// Username (handle), if the user has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// First name, if observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Last name, if observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Membership role.
    pub role: String,

    /// When the membership row was first created.
    pub created_at: DateTime<Utc>,

    /// When the membership was last refreshed.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or refreshing a membership row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMember {
    /// Owning project.
    pub project_id: String,

    /// Source-of-truth user identifier.
    pub external_user_id: i64,

    /// Username (handle), if any.
    pub username: Option<String>,

    /// First name, if any.
    pub first_name: Option<String>,

    /// Last name, if any.
    pub last_name: Option<String>,

    /// Membership role.
    pub role: String,
}

impl NewMember {
    /// Creates a membership input with the default role.
    pub fn new(project_id: impl Into<String>, external_user_id: i64) -> Self {
        Self {
            project_id: project_id.into(),
            external_user_id,
            username: None,
            first_name: None,
            last_name: None,
            role: DEFAULT_MEMBER_ROLE.to_string(),
        }
    }

    /// Sets the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the first name.
    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    /// Sets the last name.
    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }
}
