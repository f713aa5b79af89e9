//! Core data models for Taskgram.
//!
//! This crate provides the fundamental data types used throughout the
//! Taskgram system: projects (one per chat), project members, and the
//! tasks extracted from chat messages.

pub mod member;
pub mod project;
pub mod task;

// Re-export main types
pub use member::{Member, NewMember, DEFAULT_MEMBER_ROLE};
pub use project::{NewProject, Project};
pub use task::{NewTask, Task, TaskPriority, TaskStatus, MAX_TITLE_LEN};
