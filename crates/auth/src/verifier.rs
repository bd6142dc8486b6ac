//! Pluggable identity verification
//!
//! `IdentityVerifier` is the boundary to the identity provider: it accepts a
//! bearer credential and yields an `Identity` or fails with an `AuthError`.
//! The verification scheme behind it is opaque to the rest of the system.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::jwt::validate_jwt_token;
use crate::types::Identity;

/// Verifies a bearer credential and resolves the caller's identity
#[async_trait::async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// HS256 JWT verifier (shared-secret tokens such as Supabase or a gateway)
pub struct JwtVerifier {
    config: AuthConfig,
}

impl JwtVerifier {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = validate_jwt_token(token, &self.config)?;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }
        let email = claims.email.ok_or(AuthError::MissingEmail)?;

        Ok(Identity {
            uid: claims.sub,
            email,
            name: claims.name,
        })
    }

    fn name(&self) -> &'static str {
        "jwt"
    }
}

/// Resolves every well-formed bearer credential to one configured identity.
///
/// Development only: it must be selected explicitly and the identity is
/// supplied by configuration.
pub struct StaticVerifier {
    identity: Identity,
}

impl StaticVerifier {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }
}

#[async_trait::async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, _token: &str) -> Result<Identity, AuthError> {
        Ok(self.identity.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
