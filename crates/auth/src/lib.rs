//! Identity resolution for the Chatrelay API
//!
//! Every request carries a bearer credential that an `IdentityVerifier`
//! turns into an `Identity`. The verifier is chosen at process start and
//! injected through `AuthBackend`; axum extractors work with any domain
//! state implementing `FromRef<S>` for `AuthBackend`.

mod backend;
mod claims;
mod config;
mod error;
mod extractors;
mod jwt;
mod types;
mod verifier;

pub use backend::AuthBackend;
pub use claims::IdentityClaims;
pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::AuthUser;
pub use types::Identity;
pub use verifier::{IdentityVerifier, JwtVerifier, StaticVerifier};
