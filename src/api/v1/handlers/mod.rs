pub mod auth;
pub mod countries;
pub mod health;
pub mod travellers;
