use std::sync::Arc;

use jsonwebtoken::{
    Algorithm, DecodingKey, Validation, decode, decode_header, errors::ErrorKind,
};

use super::{AuthError, Claims, KeySourceState, RemoteJwks};
use crate::config::AppConfig;

/// TokenVerifier
///
/// Validates RS256 access tokens issued by the configured identity provider. Cheap to clone;
/// clones share the same key source and therefore the same key cache.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: KeySourceState,
    issuer: String,
    audience: String,
}

impl TokenVerifier {
    pub fn new(keys: KeySourceState, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Builds a verifier backed by the provider's remote JWKS endpoint.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(RemoteJwks::new(config.jwks_url.clone())),
            config.issuer.clone(),
            config.audience.clone(),
        )
    }

    /// verify
    ///
    /// Checks, in order: segment count, header decodability, presence of a `kid` naming a
    /// trusted key, the signature, then expiry, issuer and audience.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        if token.split('.').count() != 3 {
            return Err(AuthError::MalformedToken);
        }

        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        let kid = header
            .kid
            .ok_or(AuthError::InvalidHeader("Authorization malformed."))?;

        let jwks = self.keys.key_set().await?;
        let jwk = jwks
            .find(&kid)
            .ok_or(AuthError::InvalidHeader("Unable to find the appropriate key."))?;

        // The provider published a key we cannot use; the caller is not at fault.
        let key = DecodingKey::from_jwk(jwk)
            .map_err(|e| AuthError::KeySetUnavailable(format!("unusable key {kid}: {e}")))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| classify(e.kind()))
    }
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::ImmatureSignature => AuthError::InvalidClaims,
        ErrorKind::InvalidAlgorithm => AuthError::InvalidHeader("Unsupported signing algorithm."),
        _ => AuthError::MalformedToken,
    }
}
