/*
 * Responsibility
 * - SQLx access to travellers and everything hanging off them
 *   (user, personal information, visited countries)
 * - multi-table writes run in one transaction
 * - paged, filtered listing driven by Predicate<TravellerField>
 * - owner lookup for the authorization policy
 */
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::repos::country_repo::CountryRecord;
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::filter_sql::{SqlField, push_predicate};
use crate::repos::user_repo::Gender;
use crate::services::auth::lookup::{BoxFuture, ResourceOwnerLookup};
use crate::services::auth::principal::Role;
use crate::services::query::{Page, PageRequest, PagedSource, Predicate};
use crate::services::traveller::filters::TravellerField;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalInfo {
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravellerUser {
    pub id: i64,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravellerRecord {
    pub id: i64,
    pub uuid: String,
    pub is_active: Option<bool>,
    pub user: TravellerUser,
    pub personal_info: PersonalInfo,
    pub countries: Vec<CountryRecord>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub role: Role,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewTraveller {
    pub uuid: String,
    pub is_active: bool,
    pub user: NewUser,
    pub personal_info: PersonalInfo,
}

#[async_trait]
pub trait TravellerRepo: PagedSource<TravellerRecord, TravellerField> + Send + Sync {
    async fn insert(&self, traveller: NewTraveller) -> RepoResult<TravellerRecord>;
    async fn find(&self, id: i64) -> RepoResult<Option<TravellerRecord>>;
    async fn list_all(&self) -> RepoResult<Vec<TravellerRecord>>;
    async fn phone_exists(&self, phone: &str) -> RepoResult<bool>;
    /// Links existing countries; unknown ids and already linked ones are skipped.
    async fn add_countries(&self, id: i64, country_ids: &[i64]) -> RepoResult<()>;
    async fn remove_country(&self, id: i64, country_id: i64) -> RepoResult<bool>;
    /// Sets the flag on the traveller and its user together. `false` when the traveller is unknown.
    async fn set_active_status(&self, id: i64, active: bool) -> RepoResult<bool>;
    /// Removes the traveller with its user and personal information.
    async fn delete(&self, id: i64) -> RepoResult<bool>;
}

impl SqlField for TravellerField {
    fn column(&self) -> &'static str {
        match self {
            TravellerField::Id => "t.id",
            TravellerField::Uuid => "t.uuid",
            TravellerField::IsActive => "t.is_active",
            TravellerField::UserIsActive => "u.is_active",
        }
    }
}

const TRAVELLER_SELECT: &str = r#"
    SELECT t.id, t.uuid, t.is_active,
           u.id AS user_id, u.username, u.firstname, u.lastname, u.is_active AS user_is_active,
           p.phone, p.address, p.city, p.country
    FROM travellers t
    JOIN users u ON u.id = t.user_id
    LEFT JOIN personal_information p ON p.id = t.personal_info_id
"#;

#[derive(Debug, FromRow)]
struct TravellerRow {
    id: i64,
    uuid: String,
    is_active: Option<bool>,
    user_id: i64,
    username: String,
    firstname: String,
    lastname: String,
    user_is_active: Option<bool>,
    phone: Option<String>,
    address: Option<String>,
    city: Option<String>,
    country: Option<String>,
}

#[derive(Debug, FromRow)]
struct TravellerCountryRow {
    traveller_id: i64,
    #[sqlx(flatten)]
    country: CountryRecord,
}

impl TravellerRow {
    fn into_record(self, countries: Vec<CountryRecord>) -> TravellerRecord {
        TravellerRecord {
            id: self.id,
            uuid: self.uuid,
            is_active: self.is_active,
            user: TravellerUser {
                id: self.user_id,
                username: self.username,
                firstname: self.firstname,
                lastname: self.lastname,
                is_active: self.user_is_active,
            },
            personal_info: PersonalInfo {
                phone: self.phone.unwrap_or_default(),
                address: self.address.unwrap_or_default(),
                city: self.city.unwrap_or_default(),
                country: self.country.unwrap_or_default(),
            },
            countries,
        }
    }
}

#[derive(Clone)]
pub struct PgTravellerRepo {
    pool: PgPool,
}

impl PgTravellerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_countries(&self, rows: Vec<TravellerRow>) -> RepoResult<Vec<TravellerRecord>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let links = sqlx::query_as::<_, TravellerCountryRow>(
            r#"
            SELECT tc.traveller_id, c.id, c.name, c.code, c.flag_url
            FROM traveller_country tc
            JOIN countries c ON c.id = tc.country_id
            WHERE tc.traveller_id = ANY($1)
            ORDER BY c.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_traveller: HashMap<i64, Vec<CountryRecord>> = HashMap::new();
        for link in links {
            by_traveller
                .entry(link.traveller_id)
                .or_default()
                .push(link.country);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let countries = by_traveller.remove(&row.id).unwrap_or_default();
                row.into_record(countries)
            })
            .collect())
    }
}

#[async_trait]
impl PagedSource<TravellerRecord, TravellerField> for PgTravellerRepo {
    async fn find_page(
        &self,
        predicate: &Predicate<TravellerField>,
        request: &PageRequest<TravellerField>,
    ) -> RepoResult<Page<TravellerRecord>> {
        let mut count: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) FROM travellers t JOIN users u ON u.id = t.user_id WHERE ",
        );
        push_predicate(&mut count, predicate);
        let total_elements: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(TRAVELLER_SELECT);
        select.push(" WHERE ");
        push_predicate(&mut select, predicate);
        select
            .push(" ORDER BY ")
            .push(request.sort.column())
            .push(" ")
            .push(request.direction.as_sql())
            .push(", t.id ASC LIMIT ")
            .push_bind(request.page_size)
            .push(" OFFSET ")
            .push_bind(request.offset());

        let rows = select
            .build_query_as::<TravellerRow>()
            .fetch_all(&self.pool)
            .await?;
        let content = self.attach_countries(rows).await?;

        Ok(Page {
            content,
            total_elements,
            number: request.page,
            size: request.page_size,
        })
    }
}

#[async_trait]
impl TravellerRepo for PgTravellerRepo {
    async fn insert(&self, traveller: NewTraveller) -> RepoResult<TravellerRecord> {
        let mut tx = self.pool.begin().await?;

        let user_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password, firstname, lastname, date_of_birth, gender, role, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&traveller.user.username)
        .bind(&traveller.user.password_hash)
        .bind(&traveller.user.firstname)
        .bind(&traveller.user.lastname)
        .bind(traveller.user.date_of_birth)
        .bind(traveller.user.gender.as_str())
        .bind(traveller.user.role.as_str())
        .bind(traveller.user.is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepoError::from_sqlx)?;

        let personal_info_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO personal_information (phone, address, city, country)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&traveller.personal_info.phone)
        .bind(&traveller.personal_info.address)
        .bind(&traveller.personal_info.city)
        .bind(&traveller.personal_info.country)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepoError::from_sqlx)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO travellers (uuid, is_active, user_id, personal_info_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&traveller.uuid)
        .bind(traveller.is_active)
        .bind(user_id)
        .bind(personal_info_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepoError::from_sqlx)?;

        tx.commit().await?;

        Ok(TravellerRecord {
            id,
            uuid: traveller.uuid,
            is_active: Some(traveller.is_active),
            user: TravellerUser {
                id: user_id,
                username: traveller.user.username,
                firstname: traveller.user.firstname,
                lastname: traveller.user.lastname,
                is_active: Some(traveller.user.is_active),
            },
            personal_info: traveller.personal_info,
            countries: Vec::new(),
        })
    }

    async fn find(&self, id: i64) -> RepoResult<Option<TravellerRecord>> {
        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(TRAVELLER_SELECT);
        select.push(" WHERE t.id = ").push_bind(id);

        let row = select
            .build_query_as::<TravellerRow>()
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.attach_countries(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> RepoResult<Vec<TravellerRecord>> {
        let mut select: QueryBuilder<Postgres> = QueryBuilder::new(TRAVELLER_SELECT);
        select.push(" ORDER BY t.id");

        let rows = select
            .build_query_as::<TravellerRow>()
            .fetch_all(&self.pool)
            .await?;

        self.attach_countries(rows).await
    }

    async fn phone_exists(&self, phone: &str) -> RepoResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM personal_information WHERE phone = $1)
            "#,
        )
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn add_countries(&self, id: i64, country_ids: &[i64]) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO traveller_country (traveller_id, country_id)
            SELECT $1, c.id FROM countries c WHERE c.id = ANY($2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(country_ids)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_country(&self, id: i64, country_id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM traveller_country
            WHERE traveller_id = $1 AND country_id = $2
            "#,
        )
        .bind(id)
        .bind(country_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_active_status(&self, id: i64, active: bool) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await?;

        let user_id: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE travellers SET is_active = $2, updated_at = now()
            WHERE id = $1
            RETURNING user_id
            "#,
        )
        .bind(id)
        .bind(active)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = user_id else {
            return Ok(false);
        };

        sqlx::query(
            r#"
            UPDATE users SET is_active = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(active)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<(i64, Option<i64>)> = sqlx::query_as(
            r#"
            SELECT user_id, personal_info_id FROM travellers
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((user_id, personal_info_id)) = owned else {
            return Ok(false);
        };

        // travellers and traveller_country rows cascade from users
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if let Some(personal_info_id) = personal_info_id {
            sqlx::query("DELETE FROM personal_information WHERE id = $1")
                .bind(personal_info_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}

impl ResourceOwnerLookup for PgTravellerRepo {
    fn find_owner(&self, resource_id: i64) -> BoxFuture<'_, RepoResult<Option<String>>> {
        Box::pin(async move {
            let owner = sqlx::query_scalar::<_, String>(
                r#"
                SELECT u.username
                FROM travellers t
                JOIN users u ON u.id = t.user_id
                WHERE t.id = $1
                "#,
            )
            .bind(resource_id)
            .fetch_optional(&self.pool)
            .await?;

            Ok(owner)
        })
    }
}
