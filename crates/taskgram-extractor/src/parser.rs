//! Defensive decoding of model output.
//!
//! The model's text response is untrusted input. This module strips any
//! markdown fencing, parses the JSON, and validates every field against the
//! expected shape, returning a typed [`ParseError`] on any deviation.
//! Collapsing those errors to the safe "not a task" default happens at the
//! extractor boundary, not here, so the logs can say exactly what the
//! model got wrong.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use taskgram_models::TaskPriority;

/// Errors produced while decoding model output.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The response was not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The response parsed, but was not a JSON object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),

    /// A required field was missing or null.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A field had the wrong JSON type.
    #[error("field {field} has the wrong type, expected {expected}")]
    WrongType {
        /// Field name.
        field: &'static str,
        /// Expected JSON type.
        expected: &'static str,
    },

    /// The priority value was outside the low/medium/high set.
    #[error("invalid priority value: {0}")]
    InvalidPriority(String),
}

/// Outcome of classifying one chat message.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractResult {
    /// The message does not describe an actionable task.
    NotATask,
    /// The message describes a task.
    IsTask(TaskDraft),
}

impl ExtractResult {
    /// Returns the draft when this is a task.
    pub fn task(&self) -> Option<&TaskDraft> {
        match self {
            Self::IsTask(draft) => Some(draft),
            Self::NotATask => None,
        }
    }
}

/// A structured task as extracted from a message, before any entity
/// resolution against the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Short actionable title.
    pub title: String,

    /// Assignee reference as written in the message (`@handle` or a name).
    pub assignee: Option<String>,

    /// Deadline with explicit UTC offset.
    pub deadline: Option<DateTime<FixedOffset>>,

    /// Priority inferred from the message.
    pub priority: TaskPriority,

    /// Useful context from the message.
    pub description: String,

    /// Model certainty, 0-100, when provided.
    pub confidence: Option<f32>,
}

/// Strips a markdown code fence (```json ... ``` or ``` ... ```) from the
/// response, if present.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Decodes one model response into an [`ExtractResult`].
pub fn parse_extraction(raw: &str) -> Result<ExtractResult, ParseError> {
    let value: Value = serde_json::from_str(strip_code_fences(raw))?;

    let Some(object) = value.as_object() else {
        return Err(ParseError::NotAnObject(json_type_name(&value).to_string()));
    };

    let is_task = match object.get("is_task") {
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            return Err(ParseError::WrongType {
                field: "is_task",
                expected: "boolean",
            })
        }
        None => return Err(ParseError::MissingField("is_task")),
    };

    if !is_task {
        return Ok(ExtractResult::NotATask);
    }

    let task_data = match object.get("task_data") {
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(ParseError::WrongType {
                field: "task_data",
                expected: "object",
            })
        }
        None => return Err(ParseError::MissingField("task_data")),
    };

    let title = match task_data.get("title") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            return Err(ParseError::MissingField("task_data.title"))
        }
        Some(_) => {
            return Err(ParseError::WrongType {
                field: "task_data.title",
                expected: "string",
            })
        }
    };

    let assignee = opt_string(task_data.get("assignee"), "task_data.assignee")?;

    // Deadline must be null or a string; an unparseable date string is
    // dropped rather than failing the whole extraction.
    let deadline = match opt_string(task_data.get("deadline"), "task_data.deadline")? {
        Some(s) => match DateTime::parse_from_rfc3339(&s) {
            Ok(dt) => Some(dt),
            Err(e) => {
                warn!(deadline = %s, error = %e, "Dropping unparseable deadline");
                None
            }
        },
        None => None,
    };

    let priority = match task_data.get("priority") {
        Some(Value::String(s)) => {
            TaskPriority::parse(s).ok_or_else(|| ParseError::InvalidPriority(s.clone()))?
        }
        None | Some(Value::Null) => TaskPriority::default(),
        Some(_) => {
            return Err(ParseError::WrongType {
                field: "task_data.priority",
                expected: "string",
            })
        }
    };

    let description = match task_data.get("description") {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };

    let confidence = task_data
        .get("confidence")
        .and_then(Value::as_f64)
        .map(|c| c.clamp(0.0, 100.0) as f32);

    Ok(ExtractResult::IsTask(TaskDraft {
        title,
        assignee,
        deadline,
        priority,
        description,
        confidence,
    }))
}

/// Reads an optional string field: null/absent is `None`, an empty string
/// is `None`, anything other than a string is a type error.
fn opt_string(value: Option<&Value>, field: &'static str) -> Result<Option<String>, ParseError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(ParseError::WrongType {
            field,
            expected: "string or null",
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_json() {
        let raw = "```json\n{\"is_task\": false}\n```";
        assert_eq!(strip_code_fences(raw), "{\"is_task\": false}");
    }

    #[test]
    fn test_strip_fences_plain() {
        let raw = "```\n{\"is_task\": false}\n```";
        assert_eq!(strip_code_fences(raw), "{\"is_task\": false}");
    }

    #[test]
    fn test_strip_fences_unfenced_passthrough() {
        assert_eq!(
            strip_code_fences("  {\"is_task\": false} "),
            "{\"is_task\": false}"
        );
    }

    #[test]
    fn test_fenced_and_unfenced_parse_identically() {
        let unfenced = r#"{"is_task": true, "task_data": {"title": "Fix login", "priority": "high"}}"#;
        let fenced = format!("```json\n{}\n```", unfenced);

        assert_eq!(
            parse_extraction(unfenced).unwrap(),
            parse_extraction(&fenced).unwrap()
        );
    }

    #[test]
    fn test_not_a_task() {
        let result = parse_extraction(r#"{"is_task": false}"#).unwrap();
        assert_eq!(result, ExtractResult::NotATask);
    }

    #[test]
    fn test_full_task() {
        let raw = r#"{
            "is_task": true,
            "task_data": {
                "title": "Prepare the report",
                "assignee": "@alice",
                "deadline": "2024-01-15T19:00:00+06:00",
                "priority": "high",
                "description": "quarterly numbers",
                "confidence": 92
            }
        }"#;

        let result = parse_extraction(raw).unwrap();
        let draft = result.task().unwrap();

        assert_eq!(draft.title, "Prepare the report");
        assert_eq!(draft.assignee.as_deref(), Some("@alice"));
        assert_eq!(
            draft.deadline.unwrap().to_rfc3339(),
            "2024-01-15T19:00:00+06:00"
        );
        assert_eq!(draft.priority, TaskPriority::High);
        assert_eq!(draft.description, "quarterly numbers");
        assert_eq!(draft.confidence, Some(92.0));
    }

    #[test]
    fn test_minimal_task_takes_defaults() {
        let raw = r#"{"is_task": true, "task_data": {"title": "Fix login"}}"#;

        let draft = parse_extraction(raw).unwrap();
        let draft = draft.task().unwrap();

        assert_eq!(draft.title, "Fix login");
        assert!(draft.assignee.is_none());
        assert!(draft.deadline.is_none());
        assert_eq!(draft.priority, TaskPriority::Medium);
        assert_eq!(draft.description, "");
        assert!(draft.confidence.is_none());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            parse_extraction("the model rambled instead"),
            Err(ParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_non_object_is_an_error() {
        assert!(matches!(
            parse_extraction("[1, 2, 3]"),
            Err(ParseError::NotAnObject(_))
        ));
    }

    #[test]
    fn test_missing_title_is_an_error() {
        let raw = r#"{"is_task": true, "task_data": {"assignee": "@alice"}}"#;
        assert!(matches!(
            parse_extraction(raw),
            Err(ParseError::MissingField("task_data.title"))
        ));
    }

    #[test]
    fn test_empty_title_is_an_error() {
        let raw = r#"{"is_task": true, "task_data": {"title": "  "}}"#;
        assert!(matches!(
            parse_extraction(raw),
            Err(ParseError::MissingField("task_data.title"))
        ));
    }

    #[test]
    fn test_invalid_priority_is_an_error() {
        let raw = r#"{"is_task": true, "task_data": {"title": "Fix", "priority": "urgent"}}"#;
        assert!(matches!(
            parse_extraction(raw),
            Err(ParseError::InvalidPriority(p)) if p == "urgent"
        ));
    }

    #[test]
    fn test_numeric_assignee_is_an_error() {
        let raw = r#"{"is_task": true, "task_data": {"title": "Fix", "assignee": 42}}"#;
        assert!(matches!(
            parse_extraction(raw),
            Err(ParseError::WrongType { field: "task_data.assignee", .. })
        ));
    }

    #[test]
    fn test_missing_is_task_is_an_error() {
        assert!(matches!(
            parse_extraction(r#"{"task_data": {"title": "Fix"}}"#),
            Err(ParseError::MissingField("is_task"))
        ));
    }

    #[test]
    fn test_unparseable_deadline_is_dropped_not_fatal() {
        let raw = r#"{"is_task": true, "task_data": {"title": "Fix", "deadline": "tomorrow"}}"#;

        let result = parse_extraction(raw).unwrap();
        assert!(result.task().unwrap().deadline.is_none());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let raw = r#"{"is_task": true, "task_data": {"title": "Fix", "confidence": 250}}"#;

        let result = parse_extraction(raw).unwrap();
        assert_eq!(result.task().unwrap().confidence, Some(100.0));
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let raw = r#"{"is_task": true, "task_data": {"title": "Fix login", "priority": "low"}}"#;

        let first = parse_extraction(raw).unwrap();
        let second = parse_extraction(raw).unwrap();
        assert_eq!(first, second);
    }
}
