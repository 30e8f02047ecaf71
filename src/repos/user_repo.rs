/*
 * Responsibility
 * - SQLx access to the users table (login lookup, uniqueness checks)
 * - principal lookup for the authentication gate
 */
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::repos::error::{RepoError, RepoResult};
use crate::services::auth::lookup::{BoxFuture, PrincipalLookup};
use crate::services::auth::principal::{Principal, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            "OTHER" => Ok(Gender::Other),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub role: Role,
    pub is_active: Option<bool>,
    pub traveller_id: Option<i64>,
}

impl UserRecord {
    /// An unset flag counts as enabled.
    pub fn is_enabled(&self) -> bool {
        self.is_active.unwrap_or(true)
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    #[sqlx(rename = "password")]
    password_hash: String,
    firstname: String,
    lastname: String,
    role: String,
    is_active: Option<bool>,
    traveller_id: Option<i64>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = RepoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| RepoError::InvalidValue(e.to_string()))?;
        Ok(Self {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            firstname: row.firstname,
            lastname: row.lastname,
            role,
            is_active: row.is_active,
            traveller_id: row.traveller_id,
        })
    }
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRecord>>;
    async fn username_exists(&self, username: &str) -> RepoResult<bool>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.username, u.password, u.firstname, u.lastname,
                   u.role, u.is_active, t.id AS traveller_id
            FROM users u
            LEFT JOIN travellers t ON t.user_id = u.id
            WHERE u.username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn username_exists(&self, username: &str) -> RepoResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)
            "#,
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

impl PrincipalLookup for PgUserRepo {
    fn find_principal<'a>(
        &'a self,
        subject: &'a str,
    ) -> BoxFuture<'a, RepoResult<Option<Principal>>> {
        Box::pin(async move {
            let role = sqlx::query_scalar::<_, String>(
                r#"
                SELECT role FROM users WHERE username = $1
                "#,
            )
            .bind(subject)
            .fetch_optional(&self.pool)
            .await?;

            role.map(|r| {
                r.parse::<Role>()
                    .map(|role| Principal::new(subject, role))
                    .map_err(|e| RepoError::InvalidValue(e.to_string()))
            })
            .transpose()
        })
    }
}
