//! The `Store` trait: the persistence seam of the pipeline.
//!
//! Resolver and writer components take an injected `Arc<dyn Store>` rather
//! than a global client, so they can be unit-tested against
//! [`crate::MemoryStore`] and run in production against
//! [`crate::PgStore`]. Every mutation is either an upsert keyed by a
//! natural key or a duplicate-tolerant insert, which is what keeps
//! concurrent webhook deliveries for the same chat safe.

use async_trait::async_trait;

use taskgram_models::{Member, NewMember, NewProject, NewTask, Project, Task};

use crate::error::Result;

/// Table-oriented persistence operations used by the extraction pipeline.
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts the project or, on id conflict, refreshes its title.
    ///
    /// Idempotent: safe under concurrent invocation for the same chat.
    async fn upsert_project(&self, project: &NewProject) -> Result<Project>;

    /// Inserts the membership row or, on `(project_id, external_user_id)`
    /// conflict, refreshes the optional profile fields with the latest
    /// observed values. The role is fixed on creation and never escalated
    /// here.
    async fn upsert_member(&self, member: &NewMember) -> Result<Member>;

    /// Finds a member by exact username match within a project.
    ///
    /// Two or more members sharing the username is treated as "not found":
    /// an ambiguous assignee reference must not pick an arbitrary row.
    async fn find_member_by_username(
        &self,
        project_id: &str,
        username: &str,
    ) -> Result<Option<Member>>;

    /// Finds a member by the chat platform's user id within a project.
    async fn find_member_by_external_id(
        &self,
        project_id: &str,
        external_user_id: i64,
    ) -> Result<Option<Member>>;

    /// Inserts a task row.
    ///
    /// Returns `None` when a task for the same
    /// `(telegram_chat_id, telegram_message_id)` already exists, which
    /// makes redelivered webhook payloads harmless.
    async fn insert_task(&self, task: &NewTask) -> Result<Option<Task>>;
}
