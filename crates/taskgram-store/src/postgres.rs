//! Postgres-backed store implementation.
//!
//! All conflict handling is pushed down to the database: upserts are
//! `ON CONFLICT ... DO UPDATE` on the natural key, and the task insert is
//! `ON CONFLICT ... DO NOTHING` on the message reference, so concurrent
//! webhook deliveries never surface duplicate-row errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};
use uuid::Uuid;

use taskgram_models::{
    Member, NewMember, NewProject, NewTask, Project, Task, TaskPriority, TaskStatus,
};

use crate::error::Result;
use crate::store::Store;

/// Postgres store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects to the database at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the embedded migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: String,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: Uuid,
    project_id: String,
    external_user_id: i64,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            external_user_id: row.external_user_id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    project_id: String,
    creator_id: Option<Uuid>,
    assignee_id: Option<Uuid>,
    title: String,
    description: String,
    deadline: Option<DateTime<Utc>>,
    priority: String,
    status: String,
    confidence_score: Option<f32>,
    telegram_chat_id: Option<i64>,
    telegram_message_id: Option<i64>,
    created_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            creator_id: row.creator_id,
            assignee_id: row.assignee_id,
            title: row.title,
            description: row.description,
            deadline: row.deadline.map(|d| d.fixed_offset()),
            priority: TaskPriority::parse(&row.priority).unwrap_or_default(),
            status: TaskStatus::parse(&row.status).unwrap_or_default(),
            confidence_score: row.confidence_score,
            telegram_chat_id: row.telegram_chat_id,
            telegram_message_id: row.telegram_message_id,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn upsert_project(&self, project: &NewProject) -> Result<Project> {
        let row: ProjectRow = sqlx::query_as(
            "INSERT INTO projects (id, title) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE \
             SET title = EXCLUDED.title, updated_at = NOW() \
             RETURNING id, title, created_at, updated_at",
        )
        .bind(&project.id)
        .bind(&project.title)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn upsert_member(&self, member: &NewMember) -> Result<Member> {
        let row: MemberRow = sqlx::query_as(
            "INSERT INTO project_members \
             (id, project_id, external_user_id, username, first_name, last_name, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (project_id, external_user_id) DO UPDATE \
             SET username = EXCLUDED.username, \
                 first_name = EXCLUDED.first_name, \
                 last_name = EXCLUDED.last_name, \
                 updated_at = NOW() \
             RETURNING id, project_id, external_user_id, username, first_name, \
                       last_name, role, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&member.project_id)
        .bind(member.external_user_id)
        .bind(&member.username)
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(&member.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_member_by_username(
        &self,
        project_id: &str,
        username: &str,
    ) -> Result<Option<Member>> {
        let rows: Vec<MemberRow> = sqlx::query_as(
            "SELECT id, project_id, external_user_id, username, first_name, \
                    last_name, role, created_at, updated_at \
             FROM project_members \
             WHERE project_id = $1 AND username = $2 \
             LIMIT 2",
        )
        .bind(project_id)
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        if rows.len() > 1 {
            warn!(
                project_id = %project_id,
                username = %username,
                "Ambiguous username match, treating as not found"
            );
            return Ok(None);
        }

        Ok(rows.into_iter().next().map(Into::into))
    }

    async fn find_member_by_external_id(
        &self,
        project_id: &str,
        external_user_id: i64,
    ) -> Result<Option<Member>> {
        let row: Option<MemberRow> = sqlx::query_as(
            "SELECT id, project_id, external_user_id, username, first_name, \
                    last_name, role, created_at, updated_at \
             FROM project_members \
             WHERE project_id = $1 AND external_user_id = $2",
        )
        .bind(project_id)
        .bind(external_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn insert_task(&self, task: &NewTask) -> Result<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as(
            "INSERT INTO tasks \
             (id, project_id, creator_id, assignee_id, title, description, \
              deadline, priority, status, confidence_score, \
              telegram_chat_id, telegram_message_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (telegram_chat_id, telegram_message_id) DO NOTHING \
             RETURNING id, project_id, creator_id, assignee_id, title, description, \
                       deadline, priority, status, confidence_score, \
                       telegram_chat_id, telegram_message_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&task.project_id)
        .bind(task.creator_id)
        .bind(task.assignee_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.deadline.map(|d| d.with_timezone(&Utc)))
        .bind(task.priority.as_str())
        .bind(task.status.as_str())
        .bind(task.confidence_score)
        .bind(task.telegram_chat_id)
        .bind(task.telegram_message_id)
        .fetch_optional(&self.pool)
        .await?;

        if row.is_none() {
            warn!(
                chat_id = ?task.telegram_chat_id,
                message_id = ?task.telegram_message_id,
                "Task for this message already exists, skipping duplicate"
            );
        }

        Ok(row.map(Into::into))
    }
}
