/*
 * Responsibility
 * - traveller request/response DTOs
 * - registration validation: every failing field is reported at once
 */
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::v1::dto::countries::CountryResponse;
use crate::error::AppError;
use crate::repos::traveller_repo::{PersonalInfo, TravellerRecord};
use crate::repos::user_repo::Gender;
use crate::services::auth::Role;
use crate::services::traveller::Registration;

const PASSWORD_SPECIALS: &str = "!@#$%^&*";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TravellerInsertRequest {
    pub is_active: Option<bool>,
    pub user: Option<UserInsertRequest>,
    pub personal_info: Option<PersonalInfoInsertRequest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserInsertRequest {
    pub is_active: Option<bool>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub role: Option<Role>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfoInsertRequest {
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Default)]
struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    fn present<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, "must not be null");
        }
        value
    }

    fn not_blank(&mut self, field: &str, value: Option<String>) -> Option<String> {
        match value {
            Some(v) if !v.trim().is_empty() => Some(v),
            _ => {
                self.add(field, "must not be empty");
                None
            }
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn strong_password(value: &str) -> bool {
    value.chars().count() >= 8
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}

impl TravellerInsertRequest {
    pub fn into_registration(self) -> Result<Registration, AppError> {
        let mut errors = FieldErrors::default();

        let is_active = errors.present("isActive", self.is_active);

        let user = errors.present("user", self.user).unwrap_or_default();
        let firstname = errors.not_blank("user.firstname", user.firstname);
        let lastname = errors.not_blank("user.lastname", user.lastname);
        let username = errors.not_blank("user.username", user.username);
        if let Some(u) = &username
            && !looks_like_email(u)
        {
            errors.add("user.username", "must be a well-formed email address");
        }
        let password = errors.not_blank("user.password", user.password);
        if let Some(p) = &password
            && !strong_password(p)
        {
            errors.add(
                "user.password",
                "must be at least 8 characters with a lowercase letter, an uppercase letter, a digit and one of !@#$%^&*",
            );
        }
        let date_of_birth = errors.present("user.dateOfBirth", user.date_of_birth);
        let gender = errors.present("user.gender", user.gender);
        let role = errors.present("user.role", user.role);

        let info = errors
            .present("personalInfo", self.personal_info)
            .unwrap_or_default();
        let phone = errors.not_blank("personalInfo.phone", info.phone);
        let address = errors.not_blank("personalInfo.address", info.address);
        let city = errors.not_blank("personalInfo.city", info.city);
        let country = errors.not_blank("personalInfo.country", info.country);

        match (
            is_active,
            firstname,
            lastname,
            username,
            password,
            date_of_birth,
            gender,
            role,
            phone,
            address,
            city,
            country,
        ) {
            (
                Some(is_active),
                Some(firstname),
                Some(lastname),
                Some(username),
                Some(password),
                Some(date_of_birth),
                Some(gender),
                Some(role),
                Some(phone),
                Some(address),
                Some(city),
                Some(country),
            ) if errors.0.is_empty() => Ok(Registration {
                is_active,
                username,
                password,
                firstname,
                lastname,
                date_of_birth,
                gender,
                role,
                personal_info: PersonalInfo {
                    phone,
                    address,
                    city,
                    country,
                },
            }),
            _ => Err(AppError::Validation(errors.0)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravellerUserResponse {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfoResponse {
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravellerResponse {
    pub id: i64,
    pub uuid: String,
    pub is_active: Option<bool>,
    pub user: TravellerUserResponse,
    pub personal_info: PersonalInfoResponse,
    pub countries: Vec<CountryResponse>,
}

impl From<TravellerRecord> for TravellerResponse {
    fn from(t: TravellerRecord) -> Self {
        Self {
            id: t.id,
            uuid: t.uuid,
            is_active: t.is_active,
            user: TravellerUserResponse {
                firstname: t.user.firstname,
                lastname: t.user.lastname,
                username: t.user.username,
            },
            personal_info: PersonalInfoResponse {
                phone: t.personal_info.phone,
                address: t.personal_info.address,
                city: t.personal_info.city,
                country: t.personal_info.country,
            },
            countries: t.countries.into_iter().map(CountryResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
