//! Request and response types for the API.
//!
//! The Telegram update envelope is deserialized with plain serde rather
//! than a bot framework: this service terminates the webhook itself and
//! only needs the handful of fields the pipeline reads. Unknown fields
//! are ignored.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taskgram_extractor::TaskDraft;

/// An inbound Telegram update envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramUpdate {
    /// Delivery sequence number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_id: Option<i64>,

    /// The message payload, when this update carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<TelegramMessage>,
}

/// A chat message within an update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramMessage {
    /// Message id within the chat.
    pub message_id: i64,

    /// Originating chat.
    pub chat: TelegramChat,

    /// Sender. Absent for some service messages; the pipeline
    /// short-circuits without it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<TelegramUser>,

    /// Message text, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Users that just joined the chat, when this is a join event.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_chat_members: Vec<TelegramUser>,
}

/// A chat as seen in the update envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramChat {
    /// Chat id.
    pub id: i64,

    /// Chat title, absent for private chats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A user as seen in the update envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramUser {
    /// User id.
    pub id: i64,

    /// Username (handle), if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// First name, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Last name, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Request body for the direct extraction endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    /// Message text to classify. Required; validated by the handler.
    pub text: Option<serde_json::Value>,

    /// Originating chat id, for traceability on the written task.
    pub chat_id: Option<i64>,

    /// Project to write the task into. Writing happens only when both
    /// this and `message` are supplied.
    pub project_id: Option<String>,

    /// The originating message, for member/creator reconciliation.
    pub message: Option<TelegramMessage>,
}

/// Response body for the direct extraction endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractResponse {
    /// Always true on a 200.
    pub success: bool,

    /// Whether the text was classified as a task.
    pub is_task: bool,

    /// The extracted draft, when the text was a task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskDraft>,

    /// Id of the written task row, when the writer ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<Uuid>,
}

/// Unconditional webhook acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    /// Always true: the delivery system must never see a failure.
    pub ok: bool,
}

impl WebhookAck {
    /// The fixed success acknowledgement.
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
}
