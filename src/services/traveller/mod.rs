/*
 * Responsibility
 * - traveller use cases: registration, lookup, listing, visited-country bookkeeping,
 *   activation status and deletion
 * - turns storage outcomes into AppError (not found / already exists / invalid argument)
 */
pub mod filters;

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::repos::country_repo::CountryRepo;
use crate::repos::error::RepoError;
use crate::repos::traveller_repo::{NewTraveller, NewUser, PersonalInfo, TravellerRecord, TravellerRepo};
use crate::repos::user_repo::{Gender, UserRepo};
use crate::services::auth::password::PasswordHasher;
use crate::services::auth::principal::Role;
use crate::services::query::{PaginatedResult, fetch_paginated};

use self::filters::TravellerFilters;

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub is_active: bool,
    pub username: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub role: Role,
    pub personal_info: PersonalInfo,
}

fn traveller_not_found(id: i64) -> AppError {
    AppError::not_found("Traveller", format!("Traveller with id {} not found", id))
}

pub struct TravellerService {
    travellers: Arc<dyn TravellerRepo>,
    users: Arc<dyn UserRepo>,
    countries: Arc<dyn CountryRepo>,
    hasher: PasswordHasher,
}

impl TravellerService {
    pub fn new(
        travellers: Arc<dyn TravellerRepo>,
        users: Arc<dyn UserRepo>,
        countries: Arc<dyn CountryRepo>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            travellers,
            users,
            countries,
            hasher,
        }
    }

    pub async fn register(&self, registration: Registration) -> Result<TravellerRecord, AppError> {
        if registration.role == Role::Admin {
            return Err(AppError::invalid_argument(
                "User",
                "Admin accounts cannot be created through registration",
            ));
        }

        if self.users.username_exists(&registration.username).await? {
            return Err(AppError::already_exists(
                "User",
                format!("User with username {} already exists", registration.username),
            ));
        }

        if self
            .travellers
            .phone_exists(&registration.personal_info.phone)
            .await?
        {
            return Err(AppError::already_exists(
                "PersonalInfo",
                format!(
                    "Personal info with phone {} already exists",
                    registration.personal_info.phone
                ),
            ));
        }

        let password_hash = self.hasher.hash(&registration.password).await?;

        let traveller = NewTraveller {
            uuid: Uuid::new_v4().to_string(),
            is_active: registration.is_active,
            user: NewUser {
                username: registration.username,
                password_hash,
                firstname: registration.firstname,
                lastname: registration.lastname,
                date_of_birth: registration.date_of_birth,
                gender: registration.gender,
                role: registration.role,
                is_active: registration.is_active,
            },
            personal_info: registration.personal_info,
        };

        // a concurrent registration can still win the unique index
        let record = self.travellers.insert(traveller).await.map_err(|e| match e {
            RepoError::Conflict => {
                AppError::already_exists("User", "User or personal info already exists")
            }
            other => other.into(),
        })?;

        info!(
            traveller_id = record.id,
            username = %record.user.username,
            "traveller registered"
        );
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> Result<TravellerRecord, AppError> {
        self.travellers
            .find(id)
            .await?
            .ok_or_else(|| traveller_not_found(id))
    }

    pub async fn list_all(&self) -> Result<Vec<TravellerRecord>, AppError> {
        Ok(self.travellers.list_all().await?)
    }

    pub async fn list_filtered_paginated(
        &self,
        filters: &TravellerFilters,
    ) -> Result<PaginatedResult<TravellerRecord>, AppError> {
        fetch_paginated(
            self.travellers.as_ref(),
            &filters.predicate(),
            &filters.pageable(),
        )
        .await
    }

    pub async fn add_countries(
        &self,
        id: i64,
        country_ids: &[i64],
    ) -> Result<TravellerRecord, AppError> {
        self.get(id).await?;
        self.travellers.add_countries(id, country_ids).await?;
        info!(traveller_id = id, requested = country_ids.len(), "countries added");
        self.get(id).await
    }

    pub async fn remove_country(&self, id: i64, country_id: i64) -> Result<(), AppError> {
        let traveller = self.get(id).await?;

        if self.countries.find(country_id).await?.is_none() {
            return Err(AppError::not_found(
                "Country",
                format!("Country with id {} not found", country_id),
            ));
        }

        if !traveller.countries.iter().any(|c| c.id == country_id) {
            return Err(AppError::not_found(
                "Country",
                "Country not found in traveller's list",
            ));
        }

        self.travellers.remove_country(id, country_id).await?;
        info!(traveller_id = id, country_id, "country removed");
        Ok(())
    }

    pub async fn total_travelled(&self, id: i64) -> Result<i64, AppError> {
        Ok(self.get(id).await?.countries.len() as i64)
    }

    pub async fn total_untravelled(&self, id: i64) -> Result<i64, AppError> {
        let travelled = self.total_travelled(id).await?;
        let total = self.countries.count().await?;
        Ok((total - travelled).max(0))
    }

    pub async fn deactivate(&self, id: i64) -> Result<(), AppError> {
        self.set_active_status(id, false).await
    }

    pub async fn restore(&self, id: i64) -> Result<(), AppError> {
        self.set_active_status(id, true).await
    }

    async fn set_active_status(&self, id: i64, active: bool) -> Result<(), AppError> {
        if !self.travellers.set_active_status(id, active).await? {
            return Err(traveller_not_found(id));
        }
        info!(traveller_id = id, active, "traveller status changed");
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.travellers.delete(id).await? {
            return Err(traveller_not_found(id));
        }
        info!(traveller_id = id, "traveller deleted");
        Ok(())
    }
}
