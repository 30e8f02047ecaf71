/*
 * Responsibility
 * - storage traits + their PostgreSQL implementations
 * - Storage: the bundle of trait objects AppState is built from
 */
pub mod country_repo;
pub mod error;
pub mod filter_sql;
pub mod traveller_repo;
pub mod user_repo;

use std::sync::Arc;

use sqlx::PgPool;

use crate::services::auth::lookup::{PrincipalLookup, ResourceOwnerLookup};

use self::country_repo::{CountryRepo, PgCountryRepo};
use self::traveller_repo::{PgTravellerRepo, TravellerRepo};
use self::user_repo::{PgUserRepo, UserRepo};

#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepo>,
    pub travellers: Arc<dyn TravellerRepo>,
    pub countries: Arc<dyn CountryRepo>,
    pub principals: Arc<dyn PrincipalLookup>,
    pub owners: Arc<dyn ResourceOwnerLookup>,
}

impl Storage {
    pub fn postgres(pool: PgPool) -> Self {
        let users = Arc::new(PgUserRepo::new(pool.clone()));
        let travellers = Arc::new(PgTravellerRepo::new(pool.clone()));

        Self {
            users: users.clone(),
            travellers: travellers.clone(),
            countries: Arc::new(PgCountryRepo::new(pool)),
            principals: users,
            owners: travellers,
        }
    }
}
