/*!
 * Principal extractor
 *
 * Hands the principal stored by the authentication gate to handlers.
 */

mod core;

pub use self::core::CurrentPrincipal;
