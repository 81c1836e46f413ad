//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer for the task tracker, built on the
//! Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Authentication (`/api/v1/auth`)
//! - `POST /api/v1/auth/registration` - Register new user
//! - `POST /api/v1/auth/login` - Login and receive JWT token
//!
//! ## Users (`/api/v1/user`)
//! - `GET /api/v1/user/list` - List registered users
//!
//! ## Tasks (`/api/v1/task`)
//! - `POST /api/v1/task/create` - Create a task (caller must be the author)
//! - `POST /api/v1/task/update/{task_id}` - Update a task (author only)
//! - `POST /api/v1/task/change-status/{task_id}` - Change status (executors only)
//! - `POST /api/v1/task/delete/{task_id}` - Delete a task (author only)
//! - `GET /api/v1/task/{task_id}` - Get a task with its comments
//! - `GET /api/v1/task/executable/{user_id}` - Tasks assigned to a user
//! - `GET /api/v1/task/created/{user_id}` - Tasks authored by a user
//! - `POST /api/v1/task/{task_id}/add-comment` - Comment on a task
//!
//! ## Health
//! - `GET /health` - Health check endpoint
//!
//! # Authentication
//!
//! Every `/user` and `/task` endpoint requires a valid JWT token in the
//! `Authorization` header:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
