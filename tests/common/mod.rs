#![allow(dead_code)]

use coffee_shop::{
    AppState, TokenVerifier,
    auth::{Audience, Claims, StaticJwks},
    create_router,
    repository::RepositoryState,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode, jwk::JwkSet};
use serde::Serialize;
use std::{
    collections::BTreeSet,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tokio::net::TcpListener;

// --- Fixtures ---

pub const TRUSTED_PRIVATE_KEY: &str = include_str!("../fixtures/trusted_private.pem");
pub const UNTRUSTED_PRIVATE_KEY: &str = include_str!("../fixtures/untrusted_private.pem");
pub const JWKS: &str = include_str!("../fixtures/jwks.json");
pub const KID: &str = "coffee-shop-test-key";

// Must line up with AppConfig::default().
pub const ISSUER: &str = "https://coffee-shop-dev.us.auth0.com/";
pub const AUDIENCE: &str = "drinks";

pub fn jwks() -> JwkSet {
    serde_json::from_str(JWKS).expect("fixture jwks.json is valid")
}

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

// --- Token Minting ---

/// Claims valid for an hour, granting exactly `permissions`.
pub fn claims_with(permissions: &[&str]) -> Claims {
    Claims {
        sub: "auth0|barista".to_string(),
        iss: ISSUER.to_string(),
        aud: Audience::One(AUDIENCE.to_string()),
        exp: now() + 3600,
        iat: Some(now()),
        permissions: Some(permissions.iter().map(|p| p.to_string()).collect::<BTreeSet<_>>()),
    }
}

/// Signs any payload with RS256 using the given PEM key and optional `kid`.
pub fn sign_with<T: Serialize>(payload: &T, private_key_pem: &str, kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).unwrap();
    encode(&header, payload, &key).unwrap()
}

/// A token the test verifier accepts, as far as signature and header go.
pub fn sign(claims: &Claims) -> String {
    sign_with(claims, TRUSTED_PRIVATE_KEY, Some(KID))
}

pub fn token_for(permissions: &[&str]) -> String {
    sign(&claims_with(permissions))
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

// --- Application Scaffolding ---

pub fn test_verifier() -> TokenVerifier {
    TokenVerifier::new(Arc::new(StaticJwks::new(jwks())), ISSUER, AUDIENCE)
}

pub fn test_state(repo: RepositoryState) -> AppState {
    AppState {
        repo,
        verifier: test_verifier(),
    }
}

/// Serves the full router on an ephemeral port and returns its base URL.
pub async fn spawn_app(state: AppState) -> String {
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}
