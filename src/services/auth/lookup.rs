/*
 * Responsibility
 * - the two storage capabilities the request pipeline needs:
 *   subject -> principal (authentication), resource id -> owning username (authorization)
 * - object-safe so AppState can hold them as Arc<dyn ...>
 */
use std::{future::Future, pin::Pin};

use crate::repos::error::RepoResult;
use crate::services::auth::principal::Principal;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait PrincipalLookup: Send + Sync {
    /// `Ok(None)` when no user with that username exists.
    fn find_principal<'a>(&'a self, subject: &'a str) -> BoxFuture<'a, RepoResult<Option<Principal>>>;
}

pub trait ResourceOwnerLookup: Send + Sync {
    /// Username owning the traveller record, `Ok(None)` when the id is unknown.
    fn find_owner(&self, resource_id: i64) -> BoxFuture<'_, RepoResult<Option<String>>>;
}
