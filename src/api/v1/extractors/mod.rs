/*
 * Responsibility
 * - request extractors shared by v1 handlers
 * - every rejection is an AppError so it renders with the common envelope
 */
pub mod json_body;
pub mod path_id;
pub mod principal;

pub use json_body::{JsonBody, OptionalJsonBody};
pub use path_id::{CountryId, PathId, TravellerId};
pub use principal::CurrentPrincipal;
