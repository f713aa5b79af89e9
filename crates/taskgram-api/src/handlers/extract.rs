//! Direct extraction handler.
//!
//! Unlike the webhook, this endpoint reports failures conventionally: a
//! missing or non-string `text` is a 400 and an undecodable model
//! response is a 500. Task writing is opt-in and happens only when the
//! request names a project and carries the originating message.

use axum::{extract::State, Json};
use serde_json::Value;
use tracing::info;

use crate::error::{ApiError, Result};
use crate::pipeline;
use crate::state::AppState;
use crate::types::{ExtractRequest, ExtractResponse};

/// POST /api/extract - Classify a message and optionally write the task.
pub async fn extract(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>> {
    let text = match &req.text {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim(),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            return Err(ApiError::BadRequest("text is required".to_string()))
        }
        Some(_) => return Err(ApiError::BadRequest("text must be a string".to_string())),
    };

    let result = state
        .extractor
        .extract(text, state.now(), &state.config.timezone)
        .await?;

    let Some(draft) = result.task() else {
        return Ok(Json(ExtractResponse {
            success: true,
            is_task: false,
            task: None,
            task_id: None,
        }));
    };

    let mut task_id = None;
    if let (Some(project_id), Some(message)) = (&req.project_id, &req.message) {
        let chat_id = req.chat_id.unwrap_or(message.chat.id);
        let written =
            pipeline::reconcile_and_write(state.store.as_ref(), project_id, chat_id, draft, message)
                .await?;
        match written {
            Some(task) => task_id = Some(task.id),
            None => info!(
                project_id = %project_id,
                message_id = message.message_id,
                "Extraction request repeats a stored message"
            ),
        }
    }

    Ok(Json(ExtractResponse {
        success: true,
        is_task: true,
        task: Some(draft.clone()),
        task_id,
    }))
}
