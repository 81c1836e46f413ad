//! Storage abstraction traits
//!
//! The authentication core only sees [`PrincipalDirectory`]; the task service
//! additionally uses [`TaskStore`]. Both are implemented by
//! [`TursoClient`](super::turso::TursoClient).
//!
//! # Example
//!
//! ```rust,ignore
//! use tasktrack::db::{DatabaseProvider, PrincipalDirectory};
//!
//! // In-memory database (default for development/testing)
//! let db = DatabaseProvider::Memory.create_client().await?;
//! let alice = db.find_by_email("alice@example.com").await?;
//! ```

use crate::types::{Comment, Principal, Priority, Result, Status, Task};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Database provider configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabaseProvider {
    /// In-memory SQLite database (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
}

impl DatabaseProvider {
    /// Maps a configured database URL to a provider. `:memory:` and an empty
    /// string select the in-memory database.
    pub fn from_url(url: &str) -> Self {
        if url.is_empty() || url == ":memory:" {
            DatabaseProvider::Memory
        } else {
            DatabaseProvider::SQLite {
                path: url.to_string(),
            }
        }
    }

    /// Create a database client from this provider configuration
    pub async fn create_client(&self) -> Result<Arc<super::turso::TursoClient>> {
        let client = match self {
            DatabaseProvider::Memory => super::turso::TursoClient::new_memory().await?,
            DatabaseProvider::SQLite { path } => super::turso::TursoClient::new_local(path).await?,
        };
        Ok(Arc::new(client))
    }
}

/// Resolves subjects to principals and owns their registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    /// Look up a principal by subject (email). Exact, case-sensitive match.
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Principal>>;

    /// Store a new principal.
    ///
    /// Fails with `AppError::DuplicateSubject` if the email is taken.
    async fn create_principal(&self, email: &str, password_hash: &str) -> Result<Principal>;

    async fn list_principals(&self) -> Result<Vec<Principal>>;
}

/// Fields of a task that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub author_id: i64,
    pub executor_ids: BTreeSet<i64>,
}

/// Task and comment persistence.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: NewTask) -> Result<Task>;

    async fn get_task(&self, id: i64) -> Result<Option<Task>>;

    /// Overwrite every field of an existing task, including its executors.
    async fn update_task(&self, task: &Task) -> Result<()>;

    /// Delete a task together with its executors and comments.
    async fn delete_task(&self, id: i64) -> Result<()>;

    async fn tasks_by_author(&self, author_id: i64) -> Result<Vec<Task>>;

    async fn tasks_by_executor(&self, executor_id: i64) -> Result<Vec<Task>>;

    async fn insert_comment(&self, task_id: i64, user_id: i64, text: &str) -> Result<Comment>;

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>>;

    async fn comments_for_task(&self, task_id: i64) -> Result<Vec<Comment>>;
}
