//! Task types for Taskgram.
//!
//! A task is the structured, actionable record extracted from a chat
//! message. Every task belongs to exactly one project; creator and assignee
//! are optional references that degrade to `None` when resolution fails.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum stored title length. Longer titles are truncated, not rejected.
pub const MAX_TITLE_LEN: usize = 255;

/// Priority of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Deferral markers in the source text ("no rush", "someday").
    Low,
    /// No urgency markers either way.
    #[default]
    Medium,
    /// Urgency markers in the source text ("urgent", "critical").
    High,
}

impl TaskPriority {
    /// Parses a priority from its lowercase wire form.
    ///
    /// Returns `None` for anything outside the closed low/medium/high set;
    /// callers decide whether that means "reject" or "default".
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Returns the lowercase wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Newly created, not started. Every extracted task begins here.
    #[default]
    Todo,
    /// Picked up by someone.
    InProgress,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// Parses a status from its lowercase wire form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// Returns the lowercase wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

/// A task as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Internal row id.
    pub id: Uuid,

    /// Owning project.
    pub project_id: String,

    /// Internal id of the message sender, if resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<Uuid>,

    /// Internal id of the named assignee, if resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Uuid>,

    /// Short actionable title.
    pub title: String,

    /// Additional context from the message.
    pub description: String,

    /// Due date/time, if the source text implied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<FixedOffset>>,

    /// Priority inferred from the message.
    pub priority: TaskPriority,

    /// Lifecycle status.
    pub status: TaskStatus,

    /// Extractor certainty, 0-100, when the model provided one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f32>,

    /// Originating chat, for traceability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_chat_id: Option<i64>,

    /// Originating message, for traceability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_message_id: Option<i64>,

    /// When the task row was created.
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    /// Owning project. Required: the writer must not run without one.
    pub project_id: String,

    /// Internal id of the message sender, if resolved.
    pub creator_id: Option<Uuid>,

    /// Internal id of the named assignee, if resolved.
    pub assignee_id: Option<Uuid>,

    /// Short actionable title.
    pub title: String,

    /// Additional context from the message.
    pub description: String,

    /// Due date/time, if any.
    pub deadline: Option<DateTime<FixedOffset>>,

    /// Priority.
    pub priority: TaskPriority,

    /// Lifecycle status.
    pub status: TaskStatus,

    /// Extractor certainty, 0-100, if provided.
    pub confidence_score: Option<f32>,

    /// Originating chat.
    pub telegram_chat_id: Option<i64>,

    /// Originating message.
    pub telegram_message_id: Option<i64>,
}

impl NewTask {
    /// Creates a task input with safe defaults for everything optional.
    ///
    /// The title is truncated to [`MAX_TITLE_LEN`] characters rather than
    /// rejected.
    pub fn new(project_id: impl Into<String>, title: impl Into<String>) -> Self {
        let mut title: String = title.into();
        if title.chars().count() > MAX_TITLE_LEN {
            title = title.chars().take(MAX_TITLE_LEN).collect();
        }
        Self {
            project_id: project_id.into(),
            creator_id: None,
            assignee_id: None,
            title,
            description: String::new(),
            deadline: None,
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            confidence_score: None,
            telegram_chat_id: None,
            telegram_message_id: None,
        }
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the deadline.
    pub fn with_deadline(mut self, deadline: DateTime<FixedOffset>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the originating message references.
    pub fn with_message_ref(mut self, chat_id: i64, message_id: i64) -> Self {
        self.telegram_chat_id = Some(chat_id);
        self.telegram_message_id = Some(message_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parse() {
        assert_eq!(TaskPriority::parse("low"), Some(TaskPriority::Low));
        assert_eq!(TaskPriority::parse("medium"), Some(TaskPriority::Medium));
        assert_eq!(TaskPriority::parse("high"), Some(TaskPriority::High));
        assert_eq!(TaskPriority::parse("urgent"), None);
        assert_eq!(TaskPriority::parse("HIGH"), None);
    }

    #[test]
    fn test_priority_default_is_medium() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_status_default_is_todo() {
        assert_eq!(TaskStatus::default(), TaskStatus::Todo);
        assert_eq!(TaskStatus::default().as_str(), "todo");
    }

    #[test]
    fn test_priority_serialization() {
        let json = serde_json::to_string(&TaskPriority::High).unwrap();
        assert_eq!(json, "\"high\"");

        let deserialized: TaskPriority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(deserialized, TaskPriority::Low);
    }

    #[test]
    fn test_new_task_defaults() {
        let task = NewTask::new("123", "Prepare the report");

        assert_eq!(task.project_id, "123");
        assert_eq!(task.title, "Prepare the report");
        assert_eq!(task.description, "");
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(task.creator_id.is_none());
        assert!(task.assignee_id.is_none());
        assert!(task.deadline.is_none());
        assert!(task.confidence_score.is_none());
    }

    #[test]
    fn test_new_task_truncates_long_title() {
        let long_title = "x".repeat(MAX_TITLE_LEN + 50);
        let task = NewTask::new("123", long_title);

        assert_eq!(task.title.chars().count(), MAX_TITLE_LEN);
    }

    #[test]
    fn test_new_task_truncation_is_char_aware() {
        // Multi-byte characters must not be split mid-codepoint.
        let long_title = "ё".repeat(MAX_TITLE_LEN + 10);
        let task = NewTask::new("123", long_title);

        assert_eq!(task.title.chars().count(), MAX_TITLE_LEN);
    }

    #[test]
    fn test_new_task_builder() {
        let deadline: DateTime<FixedOffset> =
            "2024-01-15T19:00:00+06:00".parse().unwrap();
        let task = NewTask::new("123", "Prepare the report")
            .with_priority(TaskPriority::High)
            .with_description("for @alice")
            .with_deadline(deadline)
            .with_message_ref(-100123, 555);

        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.description, "for @alice");
        assert_eq!(task.deadline, Some(deadline));
        assert_eq!(task.telegram_chat_id, Some(-100123));
        assert_eq!(task.telegram_message_id, Some(555));
    }
}
