/**
 * Responsibility
 *  - bundle core and types
 *  - control what handlers can see
 */
mod core;
mod types;

pub use self::core::{PathId, PathParam};
pub use types::*;
