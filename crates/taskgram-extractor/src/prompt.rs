//! Prompt construction for the task-extraction model call.
//!
//! The whole contract with the model lives in one fixed system instruction:
//! the classification heuristics, the deadline rules, and the exact JSON
//! shape the response must take. The user message only supplies the chat
//! text and the current-time context.

use chrono::{DateTime, FixedOffset};

use crate::client::ChatMessage;

/// Fixed system instruction defining the output schema and heuristics.
const SYSTEM_INSTRUCTION: &str = r#"You are a task-extraction assistant for a team chat. Given one chat message, decide whether it describes an actionable task and, if so, extract it. Messages may be in any language.

Respond with a single JSON object and nothing else:

{"is_task": boolean, "task_data": {"title": string, "assignee": string or null, "deadline": string or null, "priority": "low" | "medium" | "high", "description": string, "confidence": number 0-100}}

When "is_task" is false, omit "task_data".

Rules:
- A message is a task only if it contains an instruction, request, or plan marker: imperative phrasing such as "do X", "need to", "prepare", "check", "fix", "add", "set up", or the equivalent in the message's language. Greetings, acknowledgements, and plain discussion are not tasks.
- "title": a short actionable summary of what must be done.
- "assignee": prefer an explicit @handle from the message; otherwise an explicitly named person; otherwise null. Never guess an assignee.
- "deadline": only when the message implies a date or time. Map vague time-of-day words to fixed clock times: morning -> 09:00, afternoon -> 14:00, evening -> 19:00. A bare date with no time-of-day means 18:00. Always emit ISO 8601 with the explicit UTC offset of the supplied timezone.
- "priority": "high" when the message carries urgency markers (urgent, critical, ASAP, fire); "low" when it carries deferral markers (no rush, someday, later); otherwise "medium".
- "description": any useful context from the message (links, clarifications); empty string if none.
- "confidence": how certain you are that this is a task, 0-100."#;

/// Builds the message sequence for one extraction call.
pub fn build_messages(
    text: &str,
    now: DateTime<FixedOffset>,
    timezone: &str,
) -> Vec<ChatMessage> {
    let context = format!(
        "Current time: {}\nTimezone: {}\n\nMessage:\n{}",
        now.to_rfc3339(),
        timezone,
        text
    );
    vec![
        ChatMessage::system(SYSTEM_INSTRUCTION),
        ChatMessage::user(context),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime<FixedOffset> {
        "2024-01-15T10:00:00+06:00".parse().unwrap()
    }

    #[test]
    fn test_build_messages_shape() {
        let messages = build_messages("Fix the login bug", fixed_now(), "Asia/Almaty");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
    }

    #[test]
    fn test_user_message_carries_context() {
        let messages = build_messages("Fix the login bug", fixed_now(), "Asia/Almaty");

        let user = &messages[1].content;
        assert!(user.contains("2024-01-15T10:00:00+06:00"));
        assert!(user.contains("Asia/Almaty"));
        assert!(user.contains("Fix the login bug"));
    }

    #[test]
    fn test_system_instruction_embeds_heuristics() {
        let messages = build_messages("x", fixed_now(), "UTC");

        let system = &messages[0].content;
        assert!(system.contains("morning -> 09:00"));
        assert!(system.contains("evening -> 19:00"));
        assert!(system.contains("18:00"));
        assert!(system.contains("\"is_task\""));
        assert!(system.contains("Never guess an assignee"));
    }
}
