/*
 * Responsibility
 * - shared context handed to the Router (AppState)
 * - cheap to clone: every field is an Arc
 */
use std::sync::Arc;

use crate::repos::Storage;
use crate::repos::country_repo::CountryRepo;
use crate::services::auth::{
    AccessPolicy, AuthenticationService, PasswordHasher, PrincipalLookup, ResourceOwnerLookup,
    TokenService,
};
use crate::services::traveller::TravellerService;

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub authentication: Arc<AuthenticationService>,
    pub travellers: Arc<TravellerService>,
    pub countries: Arc<dyn CountryRepo>,
    pub principals: Arc<dyn PrincipalLookup>,
    pub owners: Arc<dyn ResourceOwnerLookup>,
    pub policy: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(tokens: Arc<TokenService>, hasher: PasswordHasher, storage: Storage) -> Self {
        let authentication = AuthenticationService::new(storage.users.clone(), tokens.clone(), hasher);
        let travellers = TravellerService::new(
            storage.travellers,
            storage.users,
            storage.countries.clone(),
            hasher,
        );

        Self {
            tokens,
            authentication: Arc::new(authentication),
            travellers: Arc::new(travellers),
            countries: storage.countries,
            principals: storage.principals,
            owners: storage.owners,
            policy: Arc::new(AccessPolicy::travellers()),
        }
    }
}
