//! Authentication and Authorization
//!
//! This module is the security core of the task tracker: it issues and
//! validates bearer tokens, establishes a per-request principal, and decides
//! whether that principal may mutate a task.
//!
//! # Module Structure
//!
//! - [`auth::credentials`](crate::auth::credentials) - Argon2 password hashing and login verification
//! - [`auth::jwt`](crate::auth::jwt) - Token issuing, subject decoding and validation
//! - [`auth::context`](crate::auth::context) - Request-scoped `SecurityContext`
//! - [`auth::middleware`](crate::auth::middleware) - Request authenticator, Axum layer and extractor
//! - [`auth::policy`](crate::auth::policy) - Ownership-based authorization decisions
//!
//! # Request Flow
//!
//! 1. `authenticate_request` runs on every API request. It reads
//!    `Authorization: Bearer <token>`, decodes the subject, resolves it through
//!    the `PrincipalDirectory` and re-validates the token against that
//!    principal.
//! 2. On success a `SecurityContext` holding the principal is stored in the
//!    request extensions. On any failure the context stays empty and the
//!    request continues.
//! 3. Handlers that need a caller take an [`AuthUser`](middleware::AuthUser)
//!    argument, which rejects with `401` when the context is empty.
//! 4. Task mutations pass the principal explicitly to [`policy`] checks.
//!
//! Expired and malformed tokens are treated exactly like a missing header.
//!
//! # Configuration
//!
//! Configure via `tasktrack.toml`:
//! ```toml
//! [auth]
//! jwt_secret_env = "JWT_SECRET"  # env var holding the signing secret (>= 32 chars)
//! token_ttl_secs = 18000         # Token validity duration
//! ```

/// Request-scoped security context.
pub mod context;
/// Password hashing and credential verification.
pub mod credentials;
/// Bearer token service.
pub mod jwt;
/// Request authenticator, middleware and extractors.
pub mod middleware;
/// Authorization policy for task mutations.
pub mod policy;

pub use context::SecurityContext;
pub use credentials::CredentialVerifier;
pub use jwt::{TokenError, TokenService};
pub use middleware::{AuthOutcome, AuthUser, RequestAuthenticator};
