/*
 * Responsibility
 * - read-only access to the countries reference table
 */
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CountryRecord {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub flag_url: String,
}

#[async_trait]
pub trait CountryRepo: Send + Sync {
    async fn list(&self) -> RepoResult<Vec<CountryRecord>>;
    async fn find(&self, id: i64) -> RepoResult<Option<CountryRecord>>;
    async fn count(&self) -> RepoResult<i64>;
}

#[derive(Clone)]
pub struct PgCountryRepo {
    pool: PgPool,
}

impl PgCountryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CountryRepo for PgCountryRepo {
    async fn list(&self) -> RepoResult<Vec<CountryRecord>> {
        let rows = sqlx::query_as::<_, CountryRecord>(
            r#"
            SELECT id, name, code, flag_url
            FROM countries
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find(&self, id: i64) -> RepoResult<Option<CountryRecord>> {
        let row = sqlx::query_as::<_, CountryRecord>(
            r#"
            SELECT id, name, code, flag_url
            FROM countries
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn count(&self) -> RepoResult<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM countries")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}
