//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The
//! configuration file path defaults to `config.yaml` but can be specified via the `-f`
//! flag or the `BAYFRONT_CONFIG` environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override
//! earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `BAYFRONT_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For
//! example, `BAYFRONT_BACKEND__URL=https://data.internal` sets the `backend.url` field.
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port`, `site_url` - HTTP binding and the public base URL
//! - **Backend**: `backend.url`, `backend.service_key` - the hosted data service
//! - **Cache**: `cache.stale_time`, `cache.gc_time`, `cache.sweep_interval`
//! - **Checkout**: `checkout.provider` - hosted serverless function or dummy
//! - **Assistant**: `assistant.enabled`, `assistant.api_url`, `assistant.model`
//! - **Auth**: `auth.jwt_secret`, `auth.access_token_cookie`, `auth.cors`
//! - **Features**: `enable_metrics`, `enable_otel_export`

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying the config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "BAYFRONT_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Public base URL where the storefront is reachable (e.g., "https://bayfront.example.com").
    /// Used for sitemap entries and checkout redirect URLs.
    pub site_url: String,
    /// Hosted data service connection settings
    pub backend: BackendConfig,
    /// Query cache tuning
    pub cache: CacheConfig,
    /// Checkout provider configuration
    pub checkout: CheckoutConfig,
    /// Chat assistant relay configuration
    pub assistant: AssistantConfig,
    /// Authentication and CORS configuration
    pub auth: AuthConfig,
    /// Route-history driven prefetching
    pub prefetch: PrefetchConfig,
    /// Storefront metadata displayed by the SPA
    pub metadata: Metadata,
    /// Enable the Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

/// Connection settings for the hosted data service (PostgREST-style REST interface).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the data service REST interface
    pub url: Url,
    /// Service key sent as `Authorization: Bearer` and `apikey` on every request.
    /// This key carries elevated privileges; it never leaves this tier.
    pub service_key: String,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://localhost:54321/rest/v1/").expect("static URL"),
            service_key: String::new(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Query cache tuning.
///
/// `stale_time` governs how long a cached result is served without re-fetching;
/// `gc_time` governs how long an entry survives without being read at all.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Age after which a cached entry is re-fetched on next access
    #[serde(with = "humantime_serde")]
    pub stale_time: Duration,
    /// Age after which an unread entry is evicted by the sweeper
    #[serde(with = "humantime_serde")]
    pub gc_time: Duration,
    /// How often the background sweeper scans for evictable entries
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(60),
            gc_time: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Checkout provider configuration.
///
/// Adding a new provider requires a new variant here and a match arm in
/// `checkout::create_provider`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum CheckoutConfig {
    /// Delegate to the hosted serverless checkout function
    HostedFunction {
        /// Invocation URL of the checkout function
        function_url: Url,
        /// Currency used when the client doesn't name one
        #[serde(default = "default_currency")]
        default_currency: String,
    },
    /// Local provider that fabricates a redirect URL without charging anyone.
    /// Useful for development and tests.
    Dummy {
        #[serde(default = "default_currency")]
        default_currency: String,
    },
}

fn default_currency() -> String {
    "usd".to_string()
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        CheckoutConfig::Dummy {
            default_currency: default_currency(),
        }
    }
}

impl CheckoutConfig {
    pub fn default_currency(&self) -> &str {
        match self {
            CheckoutConfig::HostedFunction { default_currency, .. } => default_currency,
            CheckoutConfig::Dummy { default_currency } => default_currency,
        }
    }
}

/// Chat assistant relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssistantConfig {
    /// Whether the assistant endpoint is served at all
    pub enabled: bool,
    /// OpenAI-compatible chat completions URL
    pub api_url: Url,
    /// API key for the completions endpoint
    pub api_key: Option<String>,
    /// Model name forwarded with every request
    pub model: String,
    /// Maximum number of prior turns forwarded from the widget
    pub max_history: usize,
    /// System prompt prepended to every conversation
    pub system_prompt: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: Url::parse("https://api.openai.com/v1/chat/completions").expect("static URL"),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            max_history: 12,
            system_prompt: "You are the Bayfront shopping assistant. Help visitors find website \
                            templates, explain licensing and purchasing, and keep answers short."
                .to_string(),
        }
    }
}

/// Authentication configuration.
///
/// Bayfront never mints credentials; it verifies access tokens issued by the hosted
/// auth service using the shared JWT secret.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// HS256 secret shared with the hosted auth service (required to serve
    /// authenticated routes)
    pub jwt_secret: Option<String>,
    /// Cookie carrying the hosted-auth access token for browser clients
    pub access_token_cookie: String,
    /// CORS settings for the API surface
    pub cors: CorsConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            access_token_cookie: "bf_access_token".to_string(),
            cors: CorsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins; `"*"` for a wildcard
    pub allowed_origins: Vec<CorsOrigin>,
    pub allow_credentials: bool,
    /// Max age for preflight caching, in seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            allow_credentials: false,
            max_age: None,
        }
    }
}

/// A CORS origin: either the `"*"` wildcard or a concrete URL.
#[derive(Debug, Clone, PartialEq)]
pub enum CorsOrigin {
    Wildcard,
    Url(Url),
}

impl Serialize for CorsOrigin {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CorsOrigin::Wildcard => serializer.serialize_str("*"),
            CorsOrigin::Url(url) => serializer.serialize_str(url.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for CorsOrigin {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "*" {
            return Ok(CorsOrigin::Wildcard);
        }
        Url::parse(&raw)
            .map(CorsOrigin::Url)
            .map_err(|e| serde::de::Error::custom(format!("invalid CORS origin {raw:?}: {e}")))
    }
}

/// Route-history driven prefetching.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrefetchConfig {
    /// Page routes whose presence in the recent-route history triggers warming of
    /// the marketplace listings query
    pub marketplace_routes: Vec<String>,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            marketplace_routes: vec!["/marketplace".to_string(), "/templates".to_string()],
        }
    }
}

/// Storefront metadata surfaced to the SPA via `/api/v1/config`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Metadata {
    pub site_name: String,
    pub tagline: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            site_name: "Bayfront".to_string(),
            tagline: "Launch-ready website templates".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            site_url: "http://localhost:3001".to_string(),
            backend: BackendConfig::default(),
            cache: CacheConfig::default(),
            checkout: CheckoutConfig::default(),
            assistant: AssistantConfig::default(),
            auth: AuthConfig::default(),
            prefetch: PrefetchConfig::default(),
            metadata: Metadata::default(),
            enable_metrics: false,
            enable_otel_export: false,
        }
    }
}

impl Config {
    /// Load configuration from the YAML file named by `args`, with `BAYFRONT_`
    /// environment overrides applied on top.
    pub fn load(args: &Args) -> Result<Self, Error> {
        let config: Config = Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("BAYFRONT_").split("__"))
            .extract()
            .map_err(|e| Error::Internal {
                operation: format!("load configuration: {e}"),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde can't express.
    pub fn validate(&self) -> Result<(), Error> {
        if self.backend.service_key.is_empty() {
            tracing::warn!("backend.service_key is empty; remote store requests will be rejected");
        }
        if self.auth.jwt_secret.is_none() {
            tracing::warn!("auth.jwt_secret is not set; authenticated routes will return 401");
        }
        if self.auth.access_token_cookie.is_empty() && self.auth.jwt_secret.is_some() {
            return Err(Error::BadRequest {
                message: "auth.access_token_cookie must be set when auth.jwt_secret is configured".to_string(),
            });
        }
        Ok(())
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
        assert_eq!(config.cache.stale_time, Duration::from_secs(60));
        assert!(matches!(config.checkout, CheckoutConfig::Dummy { .. }));
        assert!(!config.assistant.enabled);
    }

    #[test]
    fn test_yaml_and_env_override() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
port: 4000
backend:
  url: "https://data.example.com/rest/v1/"
  service_key: "svc-key"
cache:
  stale_time: "30s"
checkout:
  provider: hosted_function
  function_url: "https://fns.example.com/checkout"
auth:
  jwt_secret: "secret"
  access_token_cookie: "sb-access-token"
"#,
            )?;
            jail.set_env("BAYFRONT_PORT", "5000");

            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");

            // env beats yaml
            assert_eq!(config.port, 5000);
            assert_eq!(config.backend.service_key, "svc-key");
            assert_eq!(config.cache.stale_time, Duration::from_secs(30));
            // untouched fields keep their defaults
            assert_eq!(config.cache.gc_time, Duration::from_secs(300));
            match &config.checkout {
                CheckoutConfig::HostedFunction {
                    function_url,
                    default_currency,
                } => {
                    assert_eq!(function_url.as_str(), "https://fns.example.com/checkout");
                    assert_eq!(default_currency, "usd");
                }
                other => panic!("expected hosted_function checkout, got {other:?}"),
            }
            Ok(())
        });
    }

    #[test]
    fn test_cors_origin_parsing() {
        let wildcard: CorsOrigin = serde_json::from_str("\"*\"").unwrap();
        assert_eq!(wildcard, CorsOrigin::Wildcard);

        let url: CorsOrigin = serde_json::from_str("\"https://app.example.com\"").unwrap();
        assert!(matches!(url, CorsOrigin::Url(_)));

        assert!(serde_json::from_str::<CorsOrigin>("\"not a url\"").is_err());
    }

    #[test]
    fn test_validate_rejects_missing_cookie_name() {
        let config = Config {
            auth: AuthConfig {
                jwt_secret: Some("secret".to_string()),
                access_token_cookie: String::new(),
                cors: CorsConfig::default(),
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
