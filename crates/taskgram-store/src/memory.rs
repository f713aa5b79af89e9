//! In-memory store for tests.
//!
//! Mirrors the Postgres store's conflict semantics exactly: upserts keyed
//! by the natural keys, duplicate-tolerant task inserts, ambiguous
//! username matches treated as not found. Pipeline and handler tests run
//! against this fake through the [`Store`] trait.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use taskgram_models::{Member, NewMember, NewProject, NewTask, Project, Task};

use crate::error::Result;
use crate::store::Store;

#[derive(Default)]
struct Inner {
    projects: Vec<Project>,
    members: Vec<Member>,
    tasks: Vec<Task>,
}

/// In-memory implementation of [`Store`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all projects.
    pub async fn projects(&self) -> Vec<Project> {
        self.inner.read().await.projects.clone()
    }

    /// Returns a snapshot of all members.
    pub async fn members(&self) -> Vec<Member> {
        self.inner.read().await.members.clone()
    }

    /// Returns a snapshot of all tasks.
    pub async fn tasks(&self) -> Vec<Task> {
        self.inner.read().await.tasks.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_project(&self, project: &NewProject) -> Result<Project> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        if let Some(existing) = inner.projects.iter_mut().find(|p| p.id == project.id) {
            existing.title = project.title.clone();
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let created = Project {
            id: project.id.clone(),
            title: project.title.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.projects.push(created.clone());
        Ok(created)
    }

    async fn upsert_member(&self, member: &NewMember) -> Result<Member> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        if let Some(existing) = inner.members.iter_mut().find(|m| {
            m.project_id == member.project_id && m.external_user_id == member.external_user_id
        }) {
            existing.username = member.username.clone();
            existing.first_name = member.first_name.clone();
            existing.last_name = member.last_name.clone();
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let created = Member {
            id: Uuid::new_v4(),
            project_id: member.project_id.clone(),
            external_user_id: member.external_user_id,
            username: member.username.clone(),
            first_name: member.first_name.clone(),
            last_name: member.last_name.clone(),
            role: member.role.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.members.push(created.clone());
        Ok(created)
    }

    async fn find_member_by_username(
        &self,
        project_id: &str,
        username: &str,
    ) -> Result<Option<Member>> {
        let inner = self.inner.read().await;
        let mut matches = inner
            .members
            .iter()
            .filter(|m| m.project_id == project_id && m.username.as_deref() == Some(username));

        let first = matches.next().cloned();
        if first.is_some() && matches.next().is_some() {
            warn!(
                project_id = %project_id,
                username = %username,
                "Ambiguous username match, treating as not found"
            );
            return Ok(None);
        }
        Ok(first)
    }

    async fn find_member_by_external_id(
        &self,
        project_id: &str,
        external_user_id: i64,
    ) -> Result<Option<Member>> {
        let inner = self.inner.read().await;
        Ok(inner
            .members
            .iter()
            .find(|m| m.project_id == project_id && m.external_user_id == external_user_id)
            .cloned())
    }

    async fn insert_task(&self, task: &NewTask) -> Result<Option<Task>> {
        let mut inner = self.inner.write().await;

        if let (Some(chat_id), Some(message_id)) =
            (task.telegram_chat_id, task.telegram_message_id)
        {
            let duplicate = inner.tasks.iter().any(|t| {
                t.telegram_chat_id == Some(chat_id) && t.telegram_message_id == Some(message_id)
            });
            if duplicate {
                warn!(
                    chat_id = %chat_id,
                    message_id = %message_id,
                    "Task for this message already exists, skipping duplicate"
                );
                return Ok(None);
            }
        }

        let created = Task {
            id: Uuid::new_v4(),
            project_id: task.project_id.clone(),
            creator_id: task.creator_id,
            assignee_id: task.assignee_id,
            title: task.title.clone(),
            description: task.description.clone(),
            deadline: task.deadline,
            priority: task.priority,
            status: task.status,
            confidence_score: task.confidence_score,
            telegram_chat_id: task.telegram_chat_id,
            telegram_message_id: task.telegram_message_id,
            created_at: Utc::now(),
        };
        inner.tasks.push(created.clone());
        Ok(Some(created))
    }
}
