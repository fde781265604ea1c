//! Server configuration
//!
//! Everything is read from environment variables (a `.env` file is loaded first, if one exists). Invalid values are
//! logged and replaced with defaults, so the server always has something to start with.
//!
//! | Variable                | Default                                  |
//! |-------------------------|------------------------------------------|
//! | `DRINKS_HOST`           | `127.0.0.1`                              |
//! | `DRINKS_PORT`           | `8360`                                   |
//! | `DRINKS_DATABASE_URL`   | `sqlite://data/drinks.db`                |
//! | `DRINKS_AUTH0_DOMAIN`   | `xupler.auth0.com`                       |
//! | `DRINKS_API_AUDIENCE`   | `coffee`                                 |
//! | `DRINKS_JWKS_URL`       | `https://{domain}/.well-known/jwks.json` |
//! | `DRINKS_JWKS_CACHE_TTL` | `600` (seconds, `0` disables the cache)  |
use std::{env, time::Duration};

use log::*;

const DEFAULT_DRINKS_HOST: &str = "127.0.0.1";
const DEFAULT_DRINKS_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/drinks.db";
const DEFAULT_AUTH0_DOMAIN: &str = "xupler.auth0.com";
const DEFAULT_API_AUDIENCE: &str = "coffee";
const DEFAULT_KEY_CACHE_TTL: Duration = Duration::from_secs(600);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DRINKS_HOST.to_string(),
            port: DEFAULT_DRINKS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("DRINKS_HOST").ok().unwrap_or_else(|| DEFAULT_DRINKS_HOST.into());
        let port = env::var("DRINKS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for DRINKS_PORT. {e} Using the default, {DEFAULT_DRINKS_PORT}, \
                         instead."
                    );
                    DEFAULT_DRINKS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_DRINKS_PORT);
        let database_url = env::var("DRINKS_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ DRINKS_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let auth = AuthConfig::from_env_or_default();
        Self { host, port, database_url, auth }
    }
}

/// Where bearer tokens come from, and who they must be addressed to.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The expected `aud` claim, i.e. the API identifier registered with the identity provider.
    pub audience: String,
    /// The expected `iss` claim.
    pub issuer: String,
    /// The URL of the JSON Web Key Set used to verify token signatures.
    pub jwks_url: String,
    /// How long fetched signing keys are kept. A zero duration means the key set is fetched for every token.
    pub key_cache_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::for_domain(DEFAULT_AUTH0_DOMAIN, DEFAULT_API_AUDIENCE)
    }
}

impl AuthConfig {
    /// The standard layout for an identity provider domain: the issuer is `https://{domain}/` and the key set is
    /// published at `https://{domain}/.well-known/jwks.json`.
    pub fn for_domain(domain: &str, audience: &str) -> Self {
        Self {
            audience: audience.to_string(),
            issuer: format!("https://{domain}/"),
            jwks_url: format!("https://{domain}/.well-known/jwks.json"),
            key_cache_ttl: DEFAULT_KEY_CACHE_TTL,
        }
    }

    pub fn with_jwks_url<S: Into<String>>(mut self, url: S) -> Self {
        self.jwks_url = url.into();
        self
    }

    pub fn with_key_cache_ttl(mut self, ttl: Duration) -> Self {
        self.key_cache_ttl = ttl;
        self
    }

    pub fn from_env_or_default() -> Self {
        let domain = env::var("DRINKS_AUTH0_DOMAIN").ok().unwrap_or_else(|| {
            warn!("🪛️ DRINKS_AUTH0_DOMAIN is not set. Using the default, {DEFAULT_AUTH0_DOMAIN}.");
            DEFAULT_AUTH0_DOMAIN.to_string()
        });
        let audience = env::var("DRINKS_API_AUDIENCE").ok().unwrap_or_else(|| {
            warn!("🪛️ DRINKS_API_AUDIENCE is not set. Using the default, {DEFAULT_API_AUDIENCE}.");
            DEFAULT_API_AUDIENCE.to_string()
        });
        let mut config = Self::for_domain(&domain, &audience);
        if let Ok(url) = env::var("DRINKS_JWKS_URL") {
            info!("🪛️ Signing keys will be fetched from {url}");
            config = config.with_jwks_url(url);
        }
        let ttl = env::var("DRINKS_JWKS_CACHE_TTL")
            .map_err(|_| {
                debug!(
                    "🪛️ DRINKS_JWKS_CACHE_TTL is not set. Using the default value of {}s.",
                    DEFAULT_KEY_CACHE_TTL.as_secs()
                )
            })
            .and_then(|s| {
                s.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for DRINKS_JWKS_CACHE_TTL. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_KEY_CACHE_TTL);
        if ttl.is_zero() {
            info!("🪛️ Signing key caching is disabled. The key set will be fetched for every request.");
        }
        config.with_key_cache_ttl(ttl)
    }
}
