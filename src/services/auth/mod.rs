pub mod authentication;
pub mod factory;
pub mod lookup;
pub mod password;
pub mod policy;
pub mod principal;
pub mod token;

pub use authentication::{AuthenticatedUser, AuthenticationService};
pub use factory::build_token_service;
pub use lookup::{PrincipalLookup, ResourceOwnerLookup};
pub use password::PasswordHasher;
pub use policy::{AccessPolicy, AccessRule, Decision};
pub use principal::{Principal, Role};
pub use token::{TokenClaims, TokenError, TokenService};
