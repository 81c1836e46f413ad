//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Authentication handlers (login, registration).
pub mod auth;
/// Task and comment handlers.
pub mod tasks;
/// User listing handlers.
pub mod users;
