//! # TaskTrack - Task tracking server with token authentication
//!
//! A REST server for a small task tracker. Users register and log in with
//! email and password and receive a signed bearer token. Tasks have an author
//! and a set of executors: only the author may edit or delete a task, only an
//! executor may change its status, and any authenticated user may comment.
//!
//! ## Overview
//!
//! TaskTrack can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `tasktrack-server` binary
//! 2. **As a library** - Embed the router in your own Axum application
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use tasktrack::{api::routes::build_app, AppState, TaskTrackConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = TaskTrackConfig::load("tasktrack.toml")?;
//!     let state = AppState::from_config(config).await?;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, build_app(state)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `swagger-ui` | Serve interactive API docs at `/swagger-ui/` |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - Tokens, request authentication and authorization policy
//! - [`cli`] - Command-line interface for the server binary
//! - [`db`] - Storage traits and the libsql implementation
//! - [`tasks`] - Task and comment operations
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Token authentication, middleware and authorization policy.
pub mod auth;
/// Command-line interface.
pub mod cli;
/// Database clients (libsql/SQLite).
pub mod db;
/// Task and comment service.
pub mod tasks;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use auth::{CredentialVerifier, RequestAuthenticator, SecurityContext, TokenService};
pub use db::{DatabaseProvider, PrincipalDirectory, TaskStore, TursoClient};
pub use tasks::TaskService;
pub use types::{AppError, Result};
pub use utils::toml_config::TaskTrackConfig;

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML-based infrastructure configuration
    pub config: Arc<TaskTrackConfig>,
    /// Principal lookup and registration
    pub directory: Arc<dyn PrincipalDirectory>,
    /// Token issuing and validation
    pub token_service: Arc<TokenService>,
    /// Login credential checks
    pub credentials: Arc<CredentialVerifier>,
    /// Per-request principal resolution
    pub authenticator: Arc<RequestAuthenticator>,
    /// Task and comment operations
    pub tasks: Arc<TaskService>,
}

impl AppState {
    /// Wires every service around one database client and signing secret.
    pub fn new(config: TaskTrackConfig, db: Arc<TursoClient>, jwt_secret: &str) -> Self {
        let directory: Arc<dyn PrincipalDirectory> = db.clone();
        let store: Arc<dyn TaskStore> = db;

        let token_service = Arc::new(TokenService::new(jwt_secret, config.auth.token_ttl_secs));
        let credentials = Arc::new(CredentialVerifier::new(directory.clone()));
        let authenticator = Arc::new(RequestAuthenticator::new(
            token_service.clone(),
            directory.clone(),
        ));
        let tasks = Arc::new(TaskService::new(store, directory.clone()));

        Self {
            config: Arc::new(config),
            directory,
            token_service,
            credentials,
            authenticator,
            tasks,
        }
    }

    /// Opens the configured database and resolves the signing secret from
    /// the environment.
    pub async fn from_config(config: TaskTrackConfig) -> anyhow::Result<Self> {
        let secret = config.jwt_secret()?;
        let db = DatabaseProvider::from_url(&config.database.url)
            .create_client()
            .await?;
        Ok(Self::new(config, db, &secret))
    }
}
