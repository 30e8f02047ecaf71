use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::auth::AuthenticatedUser;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthenticationRequest {
    pub username: String,
    pub password: String,
}

impl AuthenticationRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = BTreeMap::new();
        if self.username.trim().is_empty() {
            errors.insert("username".to_string(), "must not be empty".to_string());
        }
        if self.password.is_empty() {
            errors.insert("password".to_string(), "must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponse {
    pub firstname: String,
    pub lastname: String,
    pub token: String,
    pub traveller_id: Option<i64>,
}

impl From<AuthenticatedUser> for AuthenticationResponse {
    fn from(u: AuthenticatedUser) -> Self {
        Self {
            firstname: u.firstname,
            lastname: u.lastname,
            token: u.token,
            traveller_id: u.traveller_id,
        }
    }
}
