//! The message-to-task pipeline: classify, reconcile, write.
//!
//! Linear control flow with no feedback loops: classify the text first,
//! and only when it is a task touch the store (ensure the project and the
//! sender's membership, resolve the assignee, insert the task row). A
//! non-task message therefore performs no writes at all. Join events
//! reconcile project and members without invoking the extractor.
//!
//! Concurrent webhook deliveries for the same chat are safe because every
//! mutation behind [`Store`] is an upsert on a natural key or a
//! duplicate-tolerant insert.

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use taskgram_extractor::{ExtractError, Extractor, TaskDraft};
use taskgram_models::{NewMember, NewProject, NewTask, Task};
use taskgram_store::{Store, StoreError};

use crate::state::AppState;
use crate::types::{TelegramMessage, TelegramUser};

/// Errors that can occur in a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Extraction failed (the model responded with undecodable output).
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Outcome of a pipeline run over one message.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// The message does not describe a task; nothing was written.
    NotATask,
    /// A task row was created.
    Created(Task),
    /// A task for this message already exists (webhook redelivery).
    DuplicateMessage,
}

/// Runs the full pipeline over one inbound chat message.
///
/// The caller has already verified the sender is present; a message
/// without `from` never reaches this function.
pub async fn process_message(
    state: &AppState,
    message: &TelegramMessage,
    sender: &TelegramUser,
) -> Result<PipelineOutcome, PipelineError> {
    // Join events reconcile membership without classifying anything.
    if !message.new_chat_members.is_empty() {
        let project = ensure_project(state.store.as_ref(), message).await?;
        for user in &message.new_chat_members {
            state
                .store
                .upsert_member(&member_input(&project.id, user))
                .await?;
        }
        info!(
            project_id = %project.id,
            count = message.new_chat_members.len(),
            "Reconciled new chat members"
        );
    }

    let Some(text) = message.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(PipelineOutcome::NotATask);
    };

    let result = state
        .extractor
        .extract(text, state.now(), &state.config.timezone)
        .await?;
    let Some(draft) = result.task() else {
        return Ok(PipelineOutcome::NotATask);
    };

    let project = ensure_project(state.store.as_ref(), message).await?;
    let creator = state
        .store
        .upsert_member(&member_input(&project.id, sender))
        .await?;
    let assignee_id =
        resolve_assignee(state.store.as_ref(), &project.id, draft.assignee.as_deref()).await?;

    let written = write_task(
        state.store.as_ref(),
        &project.id,
        draft,
        Some(creator.id),
        assignee_id,
        Some((message.chat.id, message.message_id)),
    )
    .await?;

    Ok(match written {
        Some(task) => PipelineOutcome::Created(task),
        None => PipelineOutcome::DuplicateMessage,
    })
}

/// Reconciles an extracted draft against an explicitly supplied project id
/// and writes the task. Used by the direct extraction endpoint, which
/// carries the project id in the request rather than deriving it from the
/// chat. Returns `None` when the message already has a task.
pub async fn reconcile_and_write(
    store: &dyn Store,
    project_id: &str,
    chat_id: i64,
    draft: &TaskDraft,
    message: &TelegramMessage,
) -> Result<Option<Task>, StoreError> {
    store
        .upsert_project(&NewProject {
            id: project_id.to_string(),
            title: message
                .chat
                .title
                .clone()
                .unwrap_or_else(|| format!("Chat {}", message.chat.id)),
        })
        .await?;

    let creator_id = match &message.from {
        Some(sender) => Some(
            store
                .upsert_member(&member_input(project_id, sender))
                .await?
                .id,
        ),
        None => None,
    };

    let assignee_id = resolve_assignee(store, project_id, draft.assignee.as_deref()).await?;

    write_task(
        store,
        project_id,
        draft,
        creator_id,
        assignee_id,
        Some((chat_id, message.message_id)),
    )
    .await
}

/// Ensures the project row for the message's chat exists and is current.
async fn ensure_project(
    store: &dyn Store,
    message: &TelegramMessage,
) -> Result<taskgram_models::Project, StoreError> {
    store
        .upsert_project(&NewProject::from_chat(
            message.chat.id,
            message.chat.title.as_deref(),
        ))
        .await
}

/// Resolves an assignee reference to a member id.
///
/// An `@handle` is stripped to its username; anything else is looked up
/// as a raw username. A miss degrades to `None` and never fails the run.
pub async fn resolve_assignee(
    store: &dyn Store,
    project_id: &str,
    assignee: Option<&str>,
) -> Result<Option<Uuid>, StoreError> {
    let Some(reference) = assignee else {
        return Ok(None);
    };

    let username = reference.strip_prefix('@').unwrap_or(reference);
    match store.find_member_by_username(project_id, username).await? {
        Some(member) => Ok(Some(member.id)),
        None => {
            warn!(
                project_id = %project_id,
                assignee = %reference,
                "Assignee not resolved, leaving unassigned"
            );
            Ok(None)
        }
    }
}

/// Writes the resolved task row. Returns `None` on a redelivery.
async fn write_task(
    store: &dyn Store,
    project_id: &str,
    draft: &TaskDraft,
    creator_id: Option<Uuid>,
    assignee_id: Option<Uuid>,
    message_ref: Option<(i64, i64)>,
) -> Result<Option<Task>, StoreError> {
    let mut task = NewTask::new(project_id, &draft.title)
        .with_priority(draft.priority)
        .with_description(&draft.description);
    task.creator_id = creator_id;
    task.assignee_id = assignee_id;
    task.deadline = draft.deadline;
    task.confidence_score = draft.confidence;
    if let Some((chat_id, message_id)) = message_ref {
        task = task.with_message_ref(chat_id, message_id);
    }

    match store.insert_task(&task).await? {
        Some(created) => {
            info!(
                task_id = %created.id,
                project_id = %project_id,
                priority = created.priority.as_str(),
                "Task created"
            );
            Ok(Some(created))
        }
        None => Ok(None),
    }
}

fn member_input(project_id: &str, user: &TelegramUser) -> NewMember {
    NewMember {
        project_id: project_id.to_string(),
        external_user_id: user.id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        role: taskgram_models::DEFAULT_MEMBER_ROLE.to_string(),
    }
}
