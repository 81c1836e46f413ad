//! Persistence for principals, tasks and comments.
//!
//! - [`traits`] - `PrincipalDirectory` and `TaskStore` abstractions
//! - [`turso`] - libsql implementation (local file or in-memory)

pub mod traits;
pub mod turso;

// Re-exports
pub use traits::{DatabaseProvider, NewTask, PrincipalDirectory, TaskStore};
pub use turso::TursoClient;
