use crate::types::{AppError, Principal, Result};

/// Request-scoped holder of the authenticated principal.
///
/// Starts empty and can be established at most once. Later calls to
/// [`SecurityContext::establish`] leave the first principal in place, so the
/// value observed by handlers never changes during a request.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    principal: Option<Principal>,
}

impl SecurityContext {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sets the principal if none is set yet. Returns `false` when the
    /// context was already established.
    pub fn establish(&mut self, principal: Principal) -> bool {
        if self.principal.is_some() {
            return false;
        }
        self.principal = Some(principal);
        true
    }

    pub fn is_established(&self) -> bool {
        self.principal.is_some()
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// The principal, or `Unauthenticated` when the request carries none.
    pub fn require(&self) -> Result<&Principal> {
        self.principal.as_ref().ok_or(AppError::Unauthenticated)
    }
}
