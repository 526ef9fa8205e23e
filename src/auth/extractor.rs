use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};

use super::{AuthError, Claims, TokenVerifier, check_permissions};
use crate::error::ApiError;

/// Permission
///
/// Names the capability a protected route requires. Implemented by zero-sized marker types
/// so the requirement is visible in the handler signature itself.
pub trait Permission: Send + Sync + 'static {
    const NAME: &'static str;
}

pub struct GetDrinksDetail;
pub struct PostDrinks;
pub struct PatchDrinks;
pub struct DeleteDrinks;

impl Permission for GetDrinksDetail {
    const NAME: &'static str = "get:drinks-detail";
}

impl Permission for PostDrinks {
    const NAME: &'static str = "post:drinks";
}

impl Permission for PatchDrinks {
    const NAME: &'static str = "patch:drinks";
}

impl Permission for DeleteDrinks {
    const NAME: &'static str = "delete:drinks";
}

/// bearer_token
///
/// Pulls the token out of `Authorization: Bearer <token>`. The scheme is matched
/// case-insensitively; anything other than exactly two parts is rejected.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MissingToken),
    }
}

/// authorize
///
/// The full decision for one request: extract, verify, check. Failures are logged here with
/// their classification since the client only ever sees the collapsed status.
pub async fn authorize(
    headers: &HeaderMap,
    verifier: &TokenVerifier,
    required: &str,
) -> Result<Claims, AuthError> {
    let result: Result<Claims, AuthError> = async {
        let token = bearer_token(headers)?;
        let claims = verifier.verify(token).await?;
        check_permissions(&claims, required)?;
        Ok(claims)
    }
    .await;

    match &result {
        Ok(claims) => tracing::debug!(sub = %claims.sub, permission = required, "authorized"),
        Err(e) => tracing::warn!(code = e.code(), permission = required, "authorization failed: {}", e),
    }

    result
}

/// Authorized
///
/// Extractor guarding a handler with permission `P`. Because it runs from request parts,
/// it rejects before any body extractor gets to look at the payload.
pub struct Authorized<P: Permission> {
    pub claims: Claims,
    _permission: PhantomData<P>,
}

impl<S, P> FromRequestParts<S> for Authorized<P>
where
    S: Send + Sync,
    TokenVerifier: FromRef<S>,
    P: Permission,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = TokenVerifier::from_ref(state);
        let claims = authorize(&parts.headers, &verifier, P::NAME).await?;

        Ok(Authorized {
            claims,
            _permission: PhantomData,
        })
    }
}
