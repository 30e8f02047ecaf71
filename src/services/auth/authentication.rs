use std::sync::Arc;

use tracing::{debug, info};

use crate::error::AppError;
use crate::repos::user_repo::UserRepo;
use crate::services::auth::password::PasswordHasher;
use crate::services::auth::token::TokenService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub firstname: String,
    pub lastname: String,
    pub token: String,
    pub traveller_id: Option<i64>,
}

/// Username/password login issuing an access token.
pub struct AuthenticationService {
    users: Arc<dyn UserRepo>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
}

impl AuthenticationService {
    pub fn new(users: Arc<dyn UserRepo>, tokens: Arc<TokenService>, hasher: PasswordHasher) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }

    /// Unknown user, wrong password and disabled account all fail the same way.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AppError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            debug!(%username, "login for unknown user");
            return Err(AppError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash).await? {
            debug!(%username, "login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_enabled() {
            debug!(%username, "login for disabled user");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.username, user.role)?;
        info!(username = %user.username, role = %user.role, "user authenticated");

        Ok(AuthenticatedUser {
            firstname: user.firstname,
            lastname: user.lastname,
            token,
            traveller_id: user.traveller_id,
        })
    }
}
