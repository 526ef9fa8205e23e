//! Authorization-decision path.
//!
//! A protected request flows through three stages: the bearer token is pulled from the
//! `Authorization` header, the [`TokenVerifier`] checks it against the identity provider's
//! published keys, and [`check_permissions`] matches the required permission against the
//! token's `permissions` claim. Each stage fails with its own [`AuthError`] variant.

use std::collections::BTreeSet;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod extractor;
pub mod jwks;
pub mod permissions;
pub mod verifier;

pub use extractor::{
    Authorized, DeleteDrinks, GetDrinksDetail, PatchDrinks, Permission, PostDrinks, authorize,
    bearer_token,
};
pub use jwks::{KeySource, KeySourceState, RemoteJwks, StaticJwks};
pub use permissions::check_permissions;
pub use verifier::TokenVerifier;

/// Claims
///
/// The payload of a verified access token. Only lives for the duration of the request
/// that presented it.
///
/// `iss`, `aud` and `exp` deserialize leniently so that a token lacking one of them reaches
/// the required-claim check and fails as [`AuthError::InvalidClaims`], not as a parse error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the identity provider's user id.
    pub sub: String,
    /// Issuer (iss): must match the configured tenant URL.
    #[serde(default)]
    pub iss: String,
    /// Audience (aud): Auth0 issues either a single string or a list.
    #[serde(default)]
    pub aud: Audience,
    /// Expiration Time (exp): seconds since the epoch.
    #[serde(default)]
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    /// Granted permissions. `None` means the token carries no permission structure at all,
    /// which is a different failure from an empty or non-matching set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Default for Audience {
    fn default() -> Self {
        Audience::Many(Vec::new())
    }
}

/// AuthError
///
/// Every way an authorization decision can fail. The variants stay distinct for logging and
/// tests; at the HTTP boundary all client-side failures collapse to 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header is expected to be a bearer token.")]
    MissingToken,
    #[error("Authorization token is malformed.")]
    MalformedToken,
    #[error("Invalid token header: {0}")]
    InvalidHeader(&'static str),
    #[error("Token signature could not be verified.")]
    InvalidSignature,
    #[error("Token expired.")]
    TokenExpired,
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,
    #[error("Permissions not included in token.")]
    PermissionsNotIncludedInToken,
    #[error("Permission not found.")]
    UnauthorizedPermission,
    #[error("Signing keys are unavailable: {0}")]
    KeySetUnavailable(String),
}

impl AuthError {
    /// Stable machine-readable code, used as a structured logging field.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "authorization_header_missing",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidHeader(_) => "invalid_header",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims => "invalid_claims",
            AuthError::PermissionsNotIncludedInToken => "permissions_not_included",
            AuthError::UnauthorizedPermission => "unauthorized",
            AuthError::KeySetUnavailable(_) => "key_set_unavailable",
        }
    }

    /// The status the client sees. Key fetch failures are our fault, not the caller's.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::KeySetUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}
