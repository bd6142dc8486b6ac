//! JWT claims types

use serde::{Deserialize, Serialize};

/// Claims read from an identity-provider token
#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Email
    pub email: Option<String>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Issued at
    pub iat: u64,
    /// Expires at
    pub exp: u64,
}
