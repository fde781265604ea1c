//! Bearer token verification
//!
//! Tokens are RS256-signed JWTs issued by a third-party identity provider. The provider publishes its public signing
//! keys as a JSON Web Key Set (JWKS), and each token names the key it was signed with in the `kid` header field.
//!
//! [`TokenVerifier::authorize`] runs the full check for a raw `Authorization` header value:
//! 1. The header must be present and of the form `Bearer <token>`.
//! 2. The token header must carry a `kid` that matches an RSA key in the provider's key set.
//! 3. The signature, expiry, audience and issuer must all be valid.
//! 4. The `permissions` claim must contain the permission required by the route.
//!
//! Fetched keys are cached by `kid` for [`AuthConfig::key_cache_ttl`], so the key set is only requested on a cache
//! miss.
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};
use jsonwebtoken::{
    decode,
    decode_header,
    errors::{Error as JwtError, ErrorKind},
    jwk::{AlgorithmParameters, JwkSet},
    Algorithm,
    DecodingKey,
    Validation,
};
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

/// The decoded payload of a verified bearer token.
///
/// Protected handlers take this as an argument. It is placed in the request extensions by the permission middleware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthClaims {
    pub sub: Option<String>,
    pub permissions: Option<Vec<String>>,
    #[serde(flatten)]
    pub other: HashMap<String, Value>,
}

impl AuthClaims {
    pub fn subject(&self) -> &str {
        self.sub.as_deref().unwrap_or("anonymous")
    }
}

impl FromRequest for AuthClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<AuthClaims>().cloned().ok_or_else(|| {
            warn!("🔑️ No token claims found in request extensions. Is the route missing its permission check?");
            ServerError::Unspecified("No token claims found in request extensions".to_string())
        });
        ready(claims)
    }
}

/// Pulls the token out of an `Authorization` header value of the form `Bearer <token>`. The scheme is not case
/// sensitive. An empty header counts as a missing one.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.map(str::trim).filter(|h| !h.is_empty()).ok_or(AuthError::HeaderMissing)?;
    let parts = header.split_whitespace().collect::<Vec<_>>();
    match parts.as_slice() {
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(AuthError::InvalidScheme),
        [_] => Err(AuthError::TokenNotFound),
        [_, token] => Ok(*token),
        _ => Err(AuthError::MalformedHeader),
    }
}

pub fn check_permissions(permission: &str, claims: &AuthClaims) -> Result<(), AuthError> {
    let permissions = claims.permissions.as_ref().ok_or(AuthError::PermissionsMissing)?;
    if permissions.iter().any(|p| p == permission) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied(permission.to_string()))
    }
}

pub fn map_jwt_error(e: JwtError) -> AuthError {
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer | ErrorKind::ImmatureSignature => {
            AuthError::InvalidClaims
        },
        ErrorKind::MissingRequiredClaim(claim) if claim == "aud" || claim == "iss" => AuthError::InvalidClaims,
        _ => AuthError::UnparseableToken(e.to_string()),
    }
}

fn find_rsa_key(jwks: &JwkSet, kid: &str) -> Result<DecodingKey, AuthError> {
    let jwk = jwks.find(kid).ok_or_else(|| {
        debug!("🔑️ No key with id {kid} in the key set");
        AuthError::KeyNotFound
    })?;
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => DecodingKey::from_rsa_components(&rsa.n, &rsa.e).map_err(|e| {
            warn!("🔑️ Key {kid} in the key set is not a usable RSA key. {e}");
            AuthError::KeyNotFound
        }),
        _ => {
            debug!("🔑️ Key {kid} is not an RSA key");
            Err(AuthError::KeyNotFound)
        },
    }
}

//----------------------------------------------   KeyCache  ----------------------------------------------------
struct CachedKey {
    key: DecodingKey,
    expires_at: Instant,
}

/// Signing keys indexed by `kid`. A zero TTL turns the cache off.
pub struct KeyCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedKey>>,
}

impl KeyCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: RwLock::new(HashMap::new()) }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub async fn get(&self, kid: &str) -> Option<DecodingKey> {
        if !self.is_enabled() {
            return None;
        }
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(kid) {
                Some(entry) if entry.expires_at > now => return Some(entry.key.clone()),
                Some(_) => {},
                None => return None,
            }
        }
        let mut entries = self.entries.write().await;
        if entries.get(kid).is_some_and(|entry| entry.expires_at <= now) {
            trace!("🔑️ Cached key {kid} has expired");
            entries.remove(kid);
        }
        entries.get(kid).map(|entry| entry.key.clone())
    }

    /// Caches every RSA key in the set that has a `kid`.
    pub async fn store(&self, jwks: &JwkSet) {
        if !self.is_enabled() {
            return;
        }
        let expires_at = Instant::now() + self.ttl;
        let mut entries = self.entries.write().await;
        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.as_ref() else { continue };
            if let Ok(key) = find_rsa_key(jwks, kid) {
                entries.insert(kid.clone(), CachedKey { key, expires_at });
            }
        }
        trace!("🔑️ {} signing keys cached", entries.len());
    }
}

//----------------------------------------------   TokenVerifier  ----------------------------------------------------
pub struct TokenVerifier {
    config: AuthConfig,
    client: reqwest::Client,
    keys: KeyCache,
}

impl TokenVerifier {
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: AuthConfig, client: reqwest::Client) -> Self {
        let keys = KeyCache::new(config.key_cache_ttl);
        Self { config, client, keys }
    }

    /// Verifies the bearer token in `header` and checks that it grants `permission`. On success, the token's claims
    /// are returned.
    pub async fn authorize(&self, header: Option<&str>, permission: &str) -> Result<AuthClaims, AuthError> {
        let token = extract_bearer_token(header)?;
        let claims = self.verify_decode_jwt(token).await?;
        check_permissions(permission, &claims)?;
        trace!("🔑️ {} has been granted {permission}", claims.subject());
        Ok(claims)
    }

    pub async fn verify_decode_jwt(&self, token: &str) -> Result<AuthClaims, AuthError> {
        let header = decode_header(token).map_err(|e| {
            debug!("🔑️ Could not read the token header. {e}");
            AuthError::MalformedToken
        })?;
        let kid = header.kid.ok_or_else(|| {
            debug!("🔑️ Token header does not contain a key id");
            AuthError::MalformedToken
        })?;
        let key = self.decoding_key(&kid).await?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        let data = decode::<AuthClaims>(token, &key, &validation).map_err(|e| {
            debug!("🔑️ Token failed validation. {e}");
            map_jwt_error(e)
        })?;
        Ok(data.claims)
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.keys.get(kid).await {
            trace!("🔑️ Using cached key {kid}");
            return Ok(key);
        }
        let jwks = self.fetch_key_set().await?;
        self.keys.store(&jwks).await;
        find_rsa_key(&jwks, kid)
    }

    async fn fetch_key_set(&self) -> Result<JwkSet, AuthError> {
        let url = self.config.jwks_url.as_str();
        debug!("🔑️ Fetching signing keys from {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                error!("🔑️ Could not fetch the key set from {url}. {e}");
                AuthError::KeySetUnavailable(e.to_string())
            })?;
        response.json::<JwkSet>().await.map_err(|e| {
            error!("🔑️ The key set from {url} could not be read. {e}");
            AuthError::KeySetUnavailable(e.to_string())
        })
    }
}
