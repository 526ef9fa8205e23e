mod common;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header, request::Parts},
};
use coffee_shop::{
    InMemoryRepository,
    auth::{
        Audience, AuthError, Authorized, GetDrinksDetail, PostDrinks, authorize, bearer_token,
        check_permissions,
    },
};
use common::*;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::sync::Arc;

// --- Helpers ---

fn headers_with(authorization: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(authorization).unwrap(),
    );
    headers
}

fn get_request_parts(authorization: Option<&str>) -> Parts {
    let mut builder = Request::builder().method(Method::GET).uri("/drinks-detail");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let (parts, _) = builder.body(axum::body::Body::empty()).unwrap().into_parts();
    parts
}

// --- Header Extraction ---

#[test]
fn test_bearer_token_extracted() {
    let headers = headers_with("Bearer abc.def.ghi");
    assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
}

#[test]
fn test_bearer_scheme_is_case_insensitive() {
    let headers = headers_with("bearer abc.def.ghi");
    assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
}

#[test]
fn test_missing_or_misshapen_header_is_missing_token() {
    assert_eq!(bearer_token(&HeaderMap::new()), Err(AuthError::MissingToken));

    for value in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer a.b.c extra", "abc.def.ghi"] {
        assert_eq!(
            bearer_token(&headers_with(value)),
            Err(AuthError::MissingToken),
            "header {:?} should be rejected",
            value
        );
    }
}

// --- Token Verification ---

#[tokio::test]
async fn test_valid_token_yields_claims() {
    let token = token_for(&["get:drinks-detail"]);

    let claims = test_verifier().verify(&token).await.unwrap();

    assert_eq!(claims.sub, "auth0|barista");
    assert!(claims.permissions.unwrap().contains("get:drinks-detail"));
}

#[tokio::test]
async fn test_wrong_segment_count_is_malformed() {
    let verifier = test_verifier();
    assert_eq!(verifier.verify("abc.def").await.unwrap_err(), AuthError::MalformedToken);
    assert_eq!(verifier.verify("not-a-token").await.unwrap_err(), AuthError::MalformedToken);
}

#[tokio::test]
async fn test_garbage_segments_are_malformed() {
    let err = test_verifier().verify("abc.def.ghi").await.unwrap_err();
    assert_eq!(err, AuthError::MalformedToken);
}

#[tokio::test]
async fn test_missing_kid_is_invalid_header() {
    let token = sign_with(&claims_with(&["post:drinks"]), TRUSTED_PRIVATE_KEY, None);

    let err = test_verifier().verify(&token).await.unwrap_err();

    assert!(matches!(err, AuthError::InvalidHeader(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unknown_kid_is_invalid_header() {
    let token = sign_with(
        &claims_with(&["post:drinks"]),
        TRUSTED_PRIVATE_KEY,
        Some("some-other-key"),
    );

    let err = test_verifier().verify(&token).await.unwrap_err();

    assert!(matches!(err, AuthError::InvalidHeader(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_untrusted_signing_key_is_invalid_signature() {
    // Claims a trusted kid but is signed by a key the provider never published.
    let token = sign_with(&claims_with(&["post:drinks"]), UNTRUSTED_PRIVATE_KEY, Some(KID));

    let err = test_verifier().verify(&token).await.unwrap_err();

    assert_eq!(err, AuthError::InvalidSignature);
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_symmetric_algorithm_is_rejected() {
    let mut header = Header::new(jsonwebtoken::Algorithm::HS256);
    header.kid = Some(KID.to_string());
    let token = encode(
        &header,
        &claims_with(&["post:drinks"]),
        &EncodingKey::from_secret(b"guessable"),
    )
    .unwrap();

    let err = test_verifier().verify(&token).await.unwrap_err();

    assert!(matches!(err, AuthError::InvalidHeader(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_token_expired_by_one_second() {
    let mut claims = claims_with(&["get:drinks-detail"]);
    claims.exp = now() - 1;

    let err = test_verifier().verify(&sign(&claims)).await.unwrap_err();

    assert_eq!(err, AuthError::TokenExpired);
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_issuer_is_invalid_claims() {
    let mut claims = claims_with(&["get:drinks-detail"]);
    claims.iss = "https://evil.example.com/".to_string();

    let err = test_verifier().verify(&sign(&claims)).await.unwrap_err();

    assert_eq!(err, AuthError::InvalidClaims);
}

#[tokio::test]
async fn test_wrong_audience_is_invalid_claims() {
    let mut claims = claims_with(&["get:drinks-detail"]);
    claims.aud = Audience::One("another-api".to_string());

    let err = test_verifier().verify(&sign(&claims)).await.unwrap_err();

    assert_eq!(err, AuthError::InvalidClaims);
}

#[tokio::test]
async fn test_audience_list_containing_api_is_accepted() {
    let mut claims = claims_with(&["get:drinks-detail"]);
    claims.aud = Audience::Many(vec![
        AUDIENCE.to_string(),
        "https://coffee-shop-dev.us.auth0.com/userinfo".to_string(),
    ]);

    assert!(test_verifier().verify(&sign(&claims)).await.is_ok());
}

#[tokio::test]
async fn test_missing_audience_claim_is_invalid_claims() {
    let payload = serde_json::json!({
        "sub": "auth0|barista",
        "iss": ISSUER,
        "exp": now() + 3600,
        "permissions": ["get:drinks-detail"],
    });
    let token = sign_with(&payload, TRUSTED_PRIVATE_KEY, Some(KID));

    let err = test_verifier().verify(&token).await.unwrap_err();

    assert_eq!(err, AuthError::InvalidClaims);
}

#[tokio::test]
async fn test_missing_issuer_or_expiry_is_invalid_claims() {
    let without_issuer = serde_json::json!({
        "sub": "auth0|barista",
        "aud": AUDIENCE,
        "exp": now() + 3600,
        "permissions": ["get:drinks-detail"],
    });
    let without_expiry = serde_json::json!({
        "sub": "auth0|barista",
        "iss": ISSUER,
        "aud": AUDIENCE,
        "permissions": ["get:drinks-detail"],
    });

    for payload in [without_issuer, without_expiry] {
        let token = sign_with(&payload, TRUSTED_PRIVATE_KEY, Some(KID));
        let err = test_verifier().verify(&token).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidClaims, "payload {}", payload);
    }
}

#[tokio::test]
async fn test_missing_claim_is_401_with_claims_message() {
    let payload = serde_json::json!({
        "sub": "auth0|barista",
        "iss": ISSUER,
        "exp": now() + 3600,
        "permissions": ["get:drinks-detail"],
    });
    let token = sign_with(&payload, TRUSTED_PRIVATE_KEY, Some(KID));

    let err = authorize(&headers_with(&bearer(&token)), &test_verifier(), "get:drinks-detail")
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(err.to_string(), "Incorrect claims. Please, check the audience and issuer.");
}

// --- Permission Checks ---

#[test]
fn test_permission_present_is_allowed() {
    let claims = claims_with(&["get:drinks-detail", "post:drinks"]);
    assert_eq!(check_permissions(&claims, "post:drinks"), Ok(()));
}

#[test]
fn test_permission_absent_is_unauthorized() {
    let claims = claims_with(&["get:drinks-detail"]);
    assert_eq!(
        check_permissions(&claims, "delete:drinks"),
        Err(AuthError::UnauthorizedPermission)
    );
}

#[test]
fn test_permission_check_is_case_sensitive() {
    let claims = claims_with(&["Post:Drinks"]);
    assert_eq!(
        check_permissions(&claims, "post:drinks"),
        Err(AuthError::UnauthorizedPermission)
    );
}

#[test]
fn test_no_permissions_claim_is_distinct_failure() {
    let mut claims = claims_with(&[]);
    assert_eq!(
        check_permissions(&claims, "post:drinks"),
        Err(AuthError::UnauthorizedPermission)
    );

    claims.permissions = None;
    assert_eq!(
        check_permissions(&claims, "post:drinks"),
        Err(AuthError::PermissionsNotIncludedInToken)
    );
}

#[tokio::test]
async fn test_token_without_permissions_claim_fails_authorization() {
    let mut claims = claims_with(&[]);
    claims.permissions = None;
    let headers = headers_with(&bearer(&sign(&claims)));

    let err = authorize(&headers, &test_verifier(), "post:drinks").await.unwrap_err();

    assert_eq!(err, AuthError::PermissionsNotIncludedInToken);
}

// --- Extractor ---

#[tokio::test]
async fn test_extractor_passes_claims_through() {
    let state = test_state(Arc::new(InMemoryRepository::new()));
    let token = token_for(&["get:drinks-detail"]);
    let mut parts = get_request_parts(Some(&bearer(&token)));

    let authorized = Authorized::<GetDrinksDetail>::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(authorized.claims.sub, "auth0|barista");
}

#[tokio::test]
async fn test_extractor_rejects_with_401() {
    let state = test_state(Arc::new(InMemoryRepository::new()));
    let token = token_for(&["get:drinks-detail"]);
    let mut parts = get_request_parts(Some(&bearer(&token)));

    let rejection = Authorized::<PostDrinks>::from_request_parts(&mut parts, &state)
        .await
        .err()
        .unwrap();

    assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_extractor_without_header_rejects_with_401() {
    let state = test_state(Arc::new(InMemoryRepository::new()));
    let mut parts = get_request_parts(None);

    let rejection = Authorized::<GetDrinksDetail>::from_request_parts(&mut parts, &state)
        .await
        .err()
        .unwrap();

    assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn test_key_set_unavailable_is_a_server_fault() {
    let err = AuthError::KeySetUnavailable("connection refused".to_string());
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
