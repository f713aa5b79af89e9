//! Telegram webhook handler.
//!
//! The delivery contract is strict: Telegram retries any non-200 response,
//! so this handler acknowledges every delivery no matter what happened
//! inside. The body is taken as a raw string and parsed leniently; a
//! framework JSON extractor would reject malformed payloads with a 400
//! before the handler ran.

use axum::{extract::State, Json};
use tracing::{debug, error, info, warn};

use crate::pipeline::{self, PipelineOutcome};
use crate::state::AppState;
use crate::types::{TelegramUpdate, WebhookAck};

/// POST /webhook - Telegram update intake. Always returns 200.
pub async fn webhook(State(state): State<AppState>, body: String) -> Json<WebhookAck> {
    let update: TelegramUpdate = match serde_json::from_str(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "Discarding undecodable webhook payload");
            return Json(WebhookAck::ok());
        }
    };

    let Some(message) = update.message else {
        debug!(update_id = ?update.update_id, "Update carries no message");
        return Json(WebhookAck::ok());
    };

    let Some(sender) = message.from.clone() else {
        debug!(
            chat_id = message.chat.id,
            message_id = message.message_id,
            "Ignoring message without a sender"
        );
        return Json(WebhookAck::ok());
    };

    match pipeline::process_message(&state, &message, &sender).await {
        Ok(PipelineOutcome::Created(task)) => {
            info!(
                chat_id = message.chat.id,
                task_id = %task.id,
                "Webhook message produced a task"
            );
        }
        Ok(PipelineOutcome::DuplicateMessage) => {
            info!(
                chat_id = message.chat.id,
                message_id = message.message_id,
                "Redelivered message already has a task"
            );
        }
        Ok(PipelineOutcome::NotATask) => {
            debug!(chat_id = message.chat.id, "Message is not a task");
        }
        Err(e) => {
            // Swallowed on purpose: a retry would re-run the same
            // failing pipeline and duplicate work.
            error!(
                chat_id = message.chat.id,
                message_id = message.message_id,
                error = %e,
                "Webhook pipeline failed"
            );
        }
    }

    Json(WebhookAck::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, FixedOffset};

    use taskgram_extractor::{
        ExtractError, ExtractResult, Extractor, Result as ExtractorResult, TaskDraft,
    };
    use taskgram_models::{Member, NewMember, NewProject, NewTask, Project, Task, TaskPriority};
    use taskgram_store::{MemoryStore, Result as StoreResult, Store, StoreError};

    use crate::config::ApiConfig;

    struct ScriptedExtractor(ExtractResult);

    #[async_trait]
    impl Extractor for ScriptedExtractor {
        async fn extract(
            &self,
            _text: &str,
            _now: DateTime<FixedOffset>,
            _timezone: &str,
        ) -> ExtractorResult<ExtractResult> {
            Ok(self.0.clone())
        }
    }

    /// Extractor that must not be reached.
    struct UnreachableExtractor;

    #[async_trait]
    impl Extractor for UnreachableExtractor {
        async fn extract(
            &self,
            _text: &str,
            _now: DateTime<FixedOffset>,
            _timezone: &str,
        ) -> ExtractorResult<ExtractResult> {
            panic!("extractor must not be invoked");
        }
    }

    /// Extractor whose model output could not be decoded.
    struct BrokenExtractor;

    #[async_trait]
    impl Extractor for BrokenExtractor {
        async fn extract(
            &self,
            _text: &str,
            _now: DateTime<FixedOffset>,
            _timezone: &str,
        ) -> ExtractorResult<ExtractResult> {
            Err(ExtractError::Parse(
                taskgram_extractor::parse_extraction("not json").unwrap_err(),
            ))
        }
    }

    /// Store whose every operation fails.
    struct FailingStore;

    #[async_trait]
    impl Store for FailingStore {
        async fn upsert_project(&self, _project: &NewProject) -> StoreResult<Project> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn upsert_member(&self, _member: &NewMember) -> StoreResult<Member> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn find_member_by_username(
            &self,
            _project_id: &str,
            _username: &str,
        ) -> StoreResult<Option<Member>> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn find_member_by_external_id(
            &self,
            _project_id: &str,
            _external_user_id: i64,
        ) -> StoreResult<Option<Member>> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn insert_task(&self, _task: &NewTask) -> StoreResult<Option<Task>> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }
    }

    fn draft() -> TaskDraft {
        TaskDraft {
            title: "Prepare the report".to_string(),
            assignee: None,
            deadline: None,
            priority: TaskPriority::Medium,
            description: String::new(),
            confidence: None,
        }
    }

    fn state_with(store: Arc<dyn Store>, extractor: Arc<dyn Extractor>) -> AppState {
        AppState::new(ApiConfig::default(), store, extractor)
    }

    fn update_body(text: &str) -> String {
        serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 555,
                "chat": {"id": -100123, "title": "Team Chat"},
                "from": {"id": 42, "username": "creator"},
                "text": text
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_webhook_acks_malformed_body() {
        let state = state_with(
            Arc::new(MemoryStore::new()),
            Arc::new(ScriptedExtractor(ExtractResult::NotATask)),
        );

        let response = webhook(State(state), "{not json".to_string()).await;
        assert!(response.ok);
    }

    #[tokio::test]
    async fn test_webhook_acks_message_without_sender() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(
            Arc::clone(&store) as Arc<dyn Store>,
            Arc::new(UnreachableExtractor),
        );

        let body = serde_json::json!({
            "message": {
                "message_id": 9,
                "chat": {"id": -100123},
                "text": "do the thing"
            }
        })
        .to_string();

        let response = webhook(State(state), body).await;
        assert!(response.ok);
        assert!(store.tasks().await.is_empty());
    }

    #[tokio::test]
    async fn test_webhook_acks_when_store_fails() {
        let state = state_with(
            Arc::new(FailingStore),
            Arc::new(ScriptedExtractor(ExtractResult::IsTask(draft()))),
        );

        let response = webhook(State(state), update_body("urgent: report")).await;
        assert!(response.ok);
    }

    #[tokio::test]
    async fn test_webhook_acks_when_extraction_fails() {
        let state = state_with(Arc::new(MemoryStore::new()), Arc::new(BrokenExtractor));

        let response = webhook(State(state), update_body("urgent: report")).await;
        assert!(response.ok);
    }

    #[tokio::test]
    async fn test_webhook_writes_task_for_task_message() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(
            Arc::clone(&store) as Arc<dyn Store>,
            Arc::new(ScriptedExtractor(ExtractResult::IsTask(draft()))),
        );

        let response = webhook(State(state), update_body("need the report")).await;
        assert!(response.ok);

        let tasks = store.tasks().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Prepare the report");
        assert_eq!(tasks[0].telegram_message_id, Some(555));
    }
}
