//! Engine configuration.
//!
//! All tunables live in explicit config structs passed at construction;
//! there are no ambient defaults scattered across call sites.

use std::path::PathBuf;

/// Configuration for fuzzy search.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Minimum acceptable similarity (0-100); candidates scoring below
    /// this are filtered out.
    pub threshold: u8,
    /// Default maximum number of results.
    pub limit: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: 60,
            limit: 10,
        }
    }
}

/// Configuration for the external code cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live for service-sourced entries, in seconds.
    pub ttl_secs: u64,
    /// Minimum interval between external retries for the same key after
    /// a failure, in seconds.
    pub retry_interval_secs: u64,
    /// Optional on-disk cache file surviving process restarts.
    pub cache_file: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 60 * 60,
            retry_interval_secs: 60,
            cache_file: None,
        }
    }
}

/// Configuration for the WHO ICD-11 API client.
#[derive(Debug, Clone)]
pub struct IcdApiConfig {
    /// OAuth2 token endpoint base (e.g., `https://id.who.int`).
    pub auth_base_url: String,
    /// ICD API base including release (e.g.,
    /// `https://icd-api.who.int/icd/release/11/2024-01`).
    pub api_base_url: String,
    /// OAuth2 client id.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// Request timeout in seconds; bounds every network call.
    pub timeout_secs: u64,
}

impl IcdApiConfig {
    /// Builds a config from the conventional environment variables.
    ///
    /// Returns `None` when `ICD_CLIENT_ID` or `ICD_CLIENT_SECRET` is unset,
    /// in which case callers fall back to offline resolution.
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("ICD_CLIENT_ID").ok()?;
        let client_secret = std::env::var("ICD_CLIENT_SECRET").ok()?;

        let auth_base_url = std::env::var("ICD_API_BASE_URL")
            .unwrap_or_else(|_| "https://id.who.int".to_string());
        let api_version = std::env::var("ICD_API_VERSION")
            .unwrap_or_else(|_| "release/11/2024-01".to_string());

        Some(Self {
            auth_base_url,
            api_base_url: format!("https://icd-api.who.int/icd/{api_version}"),
            client_id,
            client_secret,
            timeout_secs: 10,
        })
    }
}
