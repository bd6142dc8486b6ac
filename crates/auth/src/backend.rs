//! Authentication backend
//!
//! Holds the injected `IdentityVerifier`. Domain states expose it via
//! `FromRef`:
//! ```ignore
//! impl FromRef<MyDomainState> for AuthBackend {
//!     fn from_ref(state: &MyDomainState) -> Self {
//!         state.auth.clone()
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::error::AuthError;
use crate::types::Identity;
use crate::verifier::IdentityVerifier;

#[derive(Clone)]
pub struct AuthBackend {
    verifier: Arc<dyn IdentityVerifier>,
}

impl AuthBackend {
    pub fn new(verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { verifier }
    }

    /// Resolve a bearer token to an identity
    pub async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let identity = self.verifier.verify(token).await?;

        tracing::debug!(
            uid = %identity.uid,
            verifier = self.verifier.name(),
            "Request authenticated"
        );

        Ok(identity)
    }
}

impl std::fmt::Debug for AuthBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthBackend")
            .field("verifier", &self.verifier.name())
            .finish()
    }
}
