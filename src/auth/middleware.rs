use crate::auth::context::SecurityContext;
use crate::auth::jwt::{TokenError, TokenService};
use crate::db::PrincipalDirectory;
use crate::types::{AppError, Principal};
use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Result of one authentication pass over a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// A principal is established in the request's context.
    Authenticated(Principal),
    /// No usable credentials: no bearer header, unknown subject, or a token
    /// that does not validate against the resolved principal.
    Anonymous,
    /// The bearer token itself was malformed or expired.
    Rejected(TokenError),
}

/// Establishes the request's principal from its bearer token.
///
/// Never fails a request. Handlers that need a principal reject through
/// [`AuthUser`] or the authorization policy.
pub struct RequestAuthenticator {
    tokens: Arc<TokenService>,
    directory: Arc<dyn PrincipalDirectory>,
}

impl RequestAuthenticator {
    pub fn new(tokens: Arc<TokenService>, directory: Arc<dyn PrincipalDirectory>) -> Self {
        Self { tokens, directory }
    }

    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
        context: &mut SecurityContext,
    ) -> AuthOutcome {
        let token = match bearer_token(headers) {
            BearerHeader::Missing => {
                debug!("No Authorization header");
                return AuthOutcome::Anonymous;
            }
            BearerHeader::OtherScheme => {
                warn!("Authorization header is not a bearer token");
                return AuthOutcome::Anonymous;
            }
            BearerHeader::Token(token) => token,
        };

        let subject = match self.tokens.subject_of(token) {
            Ok(subject) => subject,
            Err(e) => {
                warn!(error = %e, "Rejected bearer token");
                return AuthOutcome::Rejected(e);
            }
        };

        if let Some(existing) = context.principal() {
            return AuthOutcome::Authenticated(existing.clone());
        }

        let principal = match self.directory.find_by_email(&subject).await {
            Ok(Some(principal)) => principal,
            Ok(None) => {
                warn!(subject = %subject, "Token subject does not resolve to a user");
                return AuthOutcome::Anonymous;
            }
            Err(e) => {
                error!(subject = %subject, error = %e, "Principal lookup failed");
                return AuthOutcome::Anonymous;
            }
        };

        if !self.tokens.validate(token, &principal) {
            warn!(subject = %subject, "Token validation failed");
            return AuthOutcome::Anonymous;
        }

        debug!(user_id = principal.id, "Request authenticated");
        context.establish(principal.clone());
        AuthOutcome::Authenticated(principal)
    }
}

enum BearerHeader<'a> {
    Missing,
    OtherScheme,
    Token(&'a str),
}

fn bearer_token(headers: &HeaderMap) -> BearerHeader<'_> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return BearerHeader::Missing;
    };

    match value.to_str().ok().and_then(|v| v.strip_prefix("Bearer ")) {
        Some(token) => BearerHeader::Token(token.trim()),
        None => BearerHeader::OtherScheme,
    }
}

/// Runs the authenticator and stores the request's [`SecurityContext`] in
/// its extensions before handing off to the next layer.
pub async fn authenticate_request(
    authenticator: Arc<RequestAuthenticator>,
    mut req: Request,
    next: Next,
) -> Response {
    let mut context = req
        .extensions_mut()
        .remove::<SecurityContext>()
        .unwrap_or_default();

    authenticator.authenticate(req.headers(), &mut context).await;
    req.extensions_mut().insert(context);

    next.run(req).await
}

/// Extractor for handlers that require a principal.
///
/// Rejects with `401 Unauthenticated` when the request has none.
pub struct AuthUser(pub Principal);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .and_then(SecurityContext::principal)
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthenticated)
    }
}
