#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use country_tracker::app::build_router;
use country_tracker::config::Config;
use country_tracker::repos::Storage;
use country_tracker::repos::country_repo::{CountryRecord, CountryRepo};
use country_tracker::repos::error::{RepoError, RepoResult};
use country_tracker::repos::traveller_repo::{
    NewTraveller, PersonalInfo, TravellerRecord, TravellerRepo, TravellerUser,
};
use country_tracker::repos::user_repo::{UserRecord, UserRepo};
use country_tracker::services::auth::lookup::{BoxFuture, PrincipalLookup, ResourceOwnerLookup};
use country_tracker::services::auth::{PasswordHasher, Principal, Role, TokenService};
use country_tracker::services::query::{Page, PageRequest, PagedSource, Predicate, SortDirection};
use country_tracker::services::traveller::filters::TravellerField;
use country_tracker::state::AppState;

pub const SECRET: &str = "591b754bd20d8a4fc975b8f5d04a1445d0e1861399cbe41e1711c55a47dce68a";
pub const PASSWORD: &str = "Passw0rd!";

#[derive(Debug, Clone)]
struct StoredUser {
    id: i64,
    username: String,
    password_hash: String,
    firstname: String,
    lastname: String,
    role: Role,
    is_active: Option<bool>,
}

#[derive(Debug, Clone)]
struct StoredTraveller {
    id: i64,
    uuid: String,
    is_active: Option<bool>,
    user_id: i64,
    personal_info: PersonalInfo,
    country_ids: Vec<i64>,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<StoredUser>,
    travellers: Vec<StoredTraveller>,
    countries: Vec<CountryRecord>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&self, t: &StoredTraveller) -> Option<TravellerRecord> {
        let user = self.users.iter().find(|u| u.id == t.user_id)?;
        let mut countries: Vec<CountryRecord> = self
            .countries
            .iter()
            .filter(|c| t.country_ids.contains(&c.id))
            .cloned()
            .collect();
        countries.sort_by(|a, b| a.name.cmp(&b.name));

        Some(TravellerRecord {
            id: t.id,
            uuid: t.uuid.clone(),
            is_active: t.is_active,
            user: TravellerUser {
                id: user.id,
                username: user.username.clone(),
                firstname: user.firstname.clone(),
                lastname: user.lastname.clone(),
                is_active: user.is_active,
            },
            personal_info: t.personal_info.clone(),
            countries,
        })
    }

    fn records(&self) -> Vec<TravellerRecord> {
        self.travellers.iter().filter_map(|t| self.record(t)).collect()
    }
}

/// In-memory stand-in for every storage trait.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_owner_lookup: Mutex<bool>,
}

impl MemoryStore {
    pub fn seed_countries(&self, names: &[(&str, &str)]) -> Vec<i64> {
        let mut t = self.tables.lock().unwrap();
        names
            .iter()
            .map(|(name, code)| {
                let id = t.next_id();
                t.countries.push(CountryRecord {
                    id,
                    name: name.to_string(),
                    code: code.to_string(),
                    flag_url: format!("https://flagcdn.com/{}.svg", code.to_lowercase()),
                });
                id
            })
            .collect()
    }

    /// Inserts a user (and a traveller unless `role` is ADMIN); returns the traveller id.
    pub fn seed_user(&self, username: &str, role: Role, is_active: Option<bool>) -> Option<i64> {
        let password_hash = bcrypt::hash(PASSWORD, 4).unwrap();
        let mut t = self.tables.lock().unwrap();
        let user_id = t.next_id();
        let firstname = username.split('@').next().unwrap_or(username).to_string();
        t.users.push(StoredUser {
            id: user_id,
            username: username.to_string(),
            password_hash,
            firstname,
            lastname: "Tester".into(),
            role,
            is_active,
        });

        if role == Role::Admin {
            return None;
        }

        let id = t.next_id();
        t.travellers.push(StoredTraveller {
            id,
            uuid: uuid::Uuid::new_v4().to_string(),
            is_active,
            user_id,
            personal_info: PersonalInfo {
                phone: format!("+30-{id}"),
                address: "1 Main St".into(),
                city: "Athens".into(),
                country: "Greece".into(),
            },
            country_ids: Vec::new(),
        });
        Some(id)
    }

    pub fn set_uuid(&self, traveller_id: i64, uuid: &str) {
        let mut t = self.tables.lock().unwrap();
        if let Some(tr) = t.travellers.iter_mut().find(|tr| tr.id == traveller_id) {
            tr.uuid = uuid.to_string();
        }
    }

    pub fn link_country(&self, traveller_id: i64, country_id: i64) {
        let mut t = self.tables.lock().unwrap();
        if let Some(tr) = t.travellers.iter_mut().find(|tr| tr.id == traveller_id) {
            tr.country_ids.push(country_id);
        }
    }

    pub fn user_is_active(&self, username: &str) -> Option<Option<bool>> {
        let t = self.tables.lock().unwrap();
        t.users.iter().find(|u| u.username == username).map(|u| u.is_active)
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().unwrap().users.len()
    }

    pub fn break_owner_lookup(&self) {
        *self.fail_owner_lookup.lock().unwrap() = true;
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRecord>> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.username == username).map(|u| UserRecord {
            id: u.id,
            username: u.username.clone(),
            password_hash: u.password_hash.clone(),
            firstname: u.firstname.clone(),
            lastname: u.lastname.clone(),
            role: u.role,
            is_active: u.is_active,
            traveller_id: t
                .travellers
                .iter()
                .find(|tr| tr.user_id == u.id)
                .map(|tr| tr.id),
        }))
    }

    async fn username_exists(&self, username: &str) -> RepoResult<bool> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().any(|u| u.username == username))
    }
}

fn compare(a: &TravellerRecord, b: &TravellerRecord, field: TravellerField) -> Ordering {
    match field {
        TravellerField::Id => a.id.cmp(&b.id),
        TravellerField::Uuid => a.uuid.cmp(&b.uuid),
        TravellerField::IsActive => a.is_active.cmp(&b.is_active),
        TravellerField::UserIsActive => a.user.is_active.cmp(&b.user.is_active),
    }
}

#[async_trait]
impl PagedSource<TravellerRecord, TravellerField> for MemoryStore {
    async fn find_page(
        &self,
        predicate: &Predicate<TravellerField>,
        request: &PageRequest<TravellerField>,
    ) -> RepoResult<Page<TravellerRecord>> {
        let t = self.tables.lock().unwrap();
        let mut hits: Vec<TravellerRecord> = t
            .records()
            .into_iter()
            .filter(|r| predicate.matches(r))
            .collect();

        hits.sort_by(|a, b| {
            let ord = compare(a, b, request.sort);
            let ord = match request.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            ord.then(a.id.cmp(&b.id))
        });

        let total_elements = hits.len() as i64;
        let content = hits
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.page_size as usize)
            .collect();

        Ok(Page {
            content,
            total_elements,
            number: request.page,
            size: request.page_size,
        })
    }
}

#[async_trait]
impl TravellerRepo for MemoryStore {
    async fn insert(&self, traveller: NewTraveller) -> RepoResult<TravellerRecord> {
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.username == traveller.user.username) {
            return Err(RepoError::Conflict);
        }

        let user_id = t.next_id();
        t.users.push(StoredUser {
            id: user_id,
            username: traveller.user.username,
            password_hash: traveller.user.password_hash,
            firstname: traveller.user.firstname,
            lastname: traveller.user.lastname,
            role: traveller.user.role,
            is_active: Some(traveller.user.is_active),
        });

        let id = t.next_id();
        let stored = StoredTraveller {
            id,
            uuid: traveller.uuid,
            is_active: Some(traveller.is_active),
            user_id,
            personal_info: traveller.personal_info,
            country_ids: Vec::new(),
        };
        let record = t.record(&stored);
        t.travellers.push(stored);
        record.ok_or_else(|| RepoError::InvalidValue("user vanished".into()))
    }

    async fn find(&self, id: i64) -> RepoResult<Option<TravellerRecord>> {
        let t = self.tables.lock().unwrap();
        Ok(t.travellers.iter().find(|tr| tr.id == id).and_then(|tr| t.record(tr)))
    }

    async fn list_all(&self) -> RepoResult<Vec<TravellerRecord>> {
        Ok(self.tables.lock().unwrap().records())
    }

    async fn phone_exists(&self, phone: &str) -> RepoResult<bool> {
        let t = self.tables.lock().unwrap();
        Ok(t.travellers.iter().any(|tr| tr.personal_info.phone == phone))
    }

    async fn add_countries(&self, id: i64, country_ids: &[i64]) -> RepoResult<()> {
        let mut t = self.tables.lock().unwrap();
        let known: Vec<i64> = t
            .countries
            .iter()
            .map(|c| c.id)
            .filter(|c| country_ids.contains(c))
            .collect();
        if let Some(tr) = t.travellers.iter_mut().find(|tr| tr.id == id) {
            for c in known {
                if !tr.country_ids.contains(&c) {
                    tr.country_ids.push(c);
                }
            }
        }
        Ok(())
    }

    async fn remove_country(&self, id: i64, country_id: i64) -> RepoResult<bool> {
        let mut t = self.tables.lock().unwrap();
        let Some(tr) = t.travellers.iter_mut().find(|tr| tr.id == id) else {
            return Ok(false);
        };
        let before = tr.country_ids.len();
        tr.country_ids.retain(|c| *c != country_id);
        Ok(tr.country_ids.len() != before)
    }

    async fn set_active_status(&self, id: i64, active: bool) -> RepoResult<bool> {
        let mut t = self.tables.lock().unwrap();
        let Some(tr) = t.travellers.iter_mut().find(|tr| tr.id == id) else {
            return Ok(false);
        };
        tr.is_active = Some(active);
        let user_id = tr.user_id;
        if let Some(u) = t.users.iter_mut().find(|u| u.id == user_id) {
            u.is_active = Some(active);
        }
        Ok(true)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.tables.lock().unwrap();
        let Some(pos) = t.travellers.iter().position(|tr| tr.id == id) else {
            return Ok(false);
        };
        let removed = t.travellers.remove(pos);
        t.users.retain(|u| u.id != removed.user_id);
        Ok(true)
    }
}

#[async_trait]
impl CountryRepo for MemoryStore {
    async fn list(&self) -> RepoResult<Vec<CountryRecord>> {
        let mut countries = self.tables.lock().unwrap().countries.clone();
        countries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(countries)
    }

    async fn find(&self, id: i64) -> RepoResult<Option<CountryRecord>> {
        let t = self.tables.lock().unwrap();
        Ok(t.countries.iter().find(|c| c.id == id).cloned())
    }

    async fn count(&self) -> RepoResult<i64> {
        Ok(self.tables.lock().unwrap().countries.len() as i64)
    }
}

impl PrincipalLookup for MemoryStore {
    fn find_principal<'a>(
        &'a self,
        subject: &'a str,
    ) -> BoxFuture<'a, RepoResult<Option<Principal>>> {
        Box::pin(async move {
            let t = self.tables.lock().unwrap();
            Ok(t
                .users
                .iter()
                .find(|u| u.username == subject)
                .map(|u| Principal::new(u.username.clone(), u.role)))
        })
    }
}

impl ResourceOwnerLookup for MemoryStore {
    fn find_owner(&self, resource_id: i64) -> BoxFuture<'_, RepoResult<Option<String>>> {
        Box::pin(async move {
            if *self.fail_owner_lookup.lock().unwrap() {
                return Err(RepoError::InvalidValue("owner lookup unavailable".into()));
            }
            let t = self.tables.lock().unwrap();
            Ok(t
                .travellers
                .iter()
                .find(|tr| tr.id == resource_id)
                .and_then(|tr| t.users.iter().find(|u| u.id == tr.user_id))
                .map(|u| u.username.clone()))
        })
    }
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("DATABASE_URL", "postgres://unused"),
        ("JWT_SECRET", SECRET),
        ("BCRYPT_COST", "4"),
    ]);
    Config::from_source(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub tokens: Arc<TokenService>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let config = test_config();
        let store = Arc::new(MemoryStore::default());
        let tokens = Arc::new(
            TokenService::new(&config.jwt_secret, &config.jwt_issuer, config.access_token_ttl_seconds)
                .unwrap(),
        );

        let storage = Storage {
            users: store.clone(),
            travellers: store.clone(),
            countries: store.clone(),
            principals: store.clone(),
            owners: store.clone(),
        };
        let state = AppState::new(tokens.clone(), PasswordHasher::new(4), storage);

        Self {
            router: build_router(state, &config),
            store,
            tokens,
        }
    }

    pub fn token_for(&self, username: &str, role: Role) -> String {
        self.tokens.issue(username, role).unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body)).await
    }
}
