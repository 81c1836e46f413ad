//! Ownership rules for task mutations.
//!
//! Each mutation maps to exactly one predicate:
//!
//! | Operation | Predicate |
//! |-----------|-----------|
//! | create | [`can_create`] - caller authors under their own identity |
//! | update, delete | [`can_modify`] - caller is the task's author |
//! | change status | [`can_change_status`] - caller is one of the executors |
//!
//! The `ensure_*` functions take the request's principal as an `Option` so a
//! missing principal fails with `Unauthenticated` before any ownership check.
//! Callers must load the task first; a missing task is `NotFound`, never
//! `AccessDenied`.

use crate::types::{AppError, Principal, Result, Task};

pub fn can_modify(principal: &Principal, task: &Task) -> bool {
    principal.id == task.author_id
}

pub fn can_change_status(principal: &Principal, task: &Task) -> bool {
    task.executor_ids.contains(&principal.id)
}

pub fn can_create(principal: &Principal, proposed_author_id: i64) -> bool {
    principal.id == proposed_author_id
}

pub fn ensure_can_modify<'a>(
    principal: Option<&'a Principal>,
    task: &Task,
) -> Result<&'a Principal> {
    let principal = principal.ok_or(AppError::Unauthenticated)?;
    if !can_modify(principal, task) {
        return Err(AppError::AccessDenied("not the author".to_string()));
    }
    Ok(principal)
}

pub fn ensure_can_change_status<'a>(
    principal: Option<&'a Principal>,
    task: &Task,
) -> Result<&'a Principal> {
    let principal = principal.ok_or(AppError::Unauthenticated)?;
    if !can_change_status(principal, task) {
        return Err(AppError::AccessDenied("not an executor".to_string()));
    }
    Ok(principal)
}

pub fn ensure_can_create(
    principal: Option<&Principal>,
    proposed_author_id: i64,
) -> Result<&Principal> {
    let principal = principal.ok_or(AppError::Unauthenticated)?;
    if !can_create(principal, proposed_author_id) {
        return Err(AppError::AccessDenied("not the author".to_string()));
    }
    Ok(principal)
}
