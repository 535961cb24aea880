//! WHO ICD-11 API client.
//!
//! Provides the `ClassificationClient` trait consumed by the code cache,
//! plus the `reqwest`-backed implementation speaking the WHO ICD API
//! (OAuth2 client-credentials flow, then linearization search). Every
//! network call carries a bounded timeout so a slow upstream cannot stall
//! a worker.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use namaste_types::{CodeHit, TargetSystem};
use serde::Deserialize;

use crate::config::IcdApiConfig;
use crate::error::ExternalServiceError;

/// Refresh the token this long before it actually expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// An external classification lookup capability.
///
/// The engine only ever talks to the WHO API through this trait, which
/// keeps the cache and resolver testable with a mock.
#[async_trait]
pub trait ClassificationClient: Send + Sync {
    /// Searches the classification service for a term.
    ///
    /// Returns the matching codes across both the TM2 and biomedicine
    /// branches, best matches first.
    async fn search_term(&self, term: &str) -> Result<Vec<CodeHit>, ExternalServiceError>;
}

/// A client that never reaches the network.
///
/// Used when no API credentials are configured; the code cache then
/// resolves entirely from the bundled fallback table.
#[derive(Debug, Default)]
pub struct OfflineClient;

#[async_trait]
impl ClassificationClient for OfflineClient {
    async fn search_term(&self, _term: &str) -> Result<Vec<CodeHit>, ExternalServiceError> {
        Err(ExternalServiceError::Unavailable {
            reason: "no ICD-11 API credentials configured".to_string(),
        })
    }
}

/// An authenticated token and its expiry.
#[derive(Debug, Clone)]
struct TokenState {
    token: String,
    expires_at: Instant,
}

/// WHO ICD-11 API client.
///
/// Holds its token state internally and refreshes it on demand; the token
/// is never shared outside the client.
pub struct IcdApiClient {
    http: reqwest::Client,
    config: IcdApiConfig,
    token: Mutex<Option<TokenState>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    destination_entities: Vec<SearchEntity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchEntity {
    #[serde(default)]
    id: String,
    #[serde(default)]
    the_code: Option<String>,
}

impl IcdApiClient {
    /// Creates a client from the given configuration.
    ///
    /// # Errors
    /// Returns `Unavailable` if the underlying HTTP client cannot be built.
    pub fn new(config: IcdApiConfig) -> Result<Self, ExternalServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExternalServiceError::Unavailable {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    /// Returns a valid bearer token, authenticating if needed.
    async fn authenticate(&self) -> Result<String, ExternalServiceError> {
        if let Some(state) = self.cached_token() {
            return Ok(state);
        }

        tracing::debug!("authenticating with WHO ICD-11 API");

        let response = self
            .http
            .post(format!("{}/connect/token", self.config.auth_base_url))
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("scope", "icdapi_access"),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| ExternalServiceError::Unavailable {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "ICD-11 authentication rejected");
            return Err(ExternalServiceError::AuthFailed);
        }

        let body: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| ExternalServiceError::Unavailable {
                    reason: e.to_string(),
                })?;

        let expires_at = Instant::now()
            + Duration::from_secs(body.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        let token = body.access_token.clone();

        let mut guard = self.token.lock().expect("token lock poisoned");
        *guard = Some(TokenState {
            token: body.access_token,
            expires_at,
        });

        Ok(token)
    }

    /// Returns the cached token if it has not reached its refresh margin.
    fn cached_token(&self) -> Option<String> {
        let guard = self.token.lock().expect("token lock poisoned");
        guard
            .as_ref()
            .filter(|state| Instant::now() < state.expires_at)
            .map(|state| state.token.clone())
    }
}

#[async_trait]
impl ClassificationClient for IcdApiClient {
    async fn search_term(&self, term: &str) -> Result<Vec<CodeHit>, ExternalServiceError> {
        let token = self.authenticate().await?;

        let response = self
            .http
            .get(format!("{}/mms/search", self.config.api_base_url))
            .bearer_auth(&token)
            .header("Accept", "application/json")
            .header("Accept-Language", "en")
            .header("API-Version", "v2")
            .query(&[("q", term), ("flatResults", "true")])
            .send()
            .await
            .map_err(|e| ExternalServiceError::Unavailable {
                reason: e.to_string(),
            })?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            // Token expired server-side; drop it so the next call re-auths
            let mut guard = self.token.lock().expect("token lock poisoned");
            *guard = None;
            return Err(ExternalServiceError::AuthFailed);
        }

        if !response.status().is_success() {
            return Err(ExternalServiceError::Unavailable {
                reason: format!("search returned status {}", response.status()),
            });
        }

        let body: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| ExternalServiceError::Unavailable {
                    reason: e.to_string(),
                })?;

        let hits: Vec<CodeHit> = body
            .destination_entities
            .iter()
            .filter_map(entity_to_hit)
            .collect();

        tracing::debug!(term, hits = hits.len(), "ICD-11 search completed");
        Ok(hits)
    }
}

/// Converts one search entity into a code hit.
///
/// Entities under the X02 chapter belong to the Traditional Medicine
/// module; everything else is biomedicine.
fn entity_to_hit(entity: &SearchEntity) -> Option<CodeHit> {
    let code = entity
        .the_code
        .clone()
        .filter(|c| !c.is_empty())
        .or_else(|| entity.id.rsplit('/').next().map(str::to_string))
        .filter(|c| !c.is_empty())?;

    let system = if entity.id.to_lowercase().contains("x02") {
        TargetSystem::Tm2
    } else {
        TargetSystem::Biomedicine
    };

    Some(CodeHit { code, system })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_hit_partitions_by_chapter() {
        let tm2 = SearchEntity {
            id: "http://id.who.int/icd/release/11/mms/x02/123".to_string(),
            the_code: Some("SJ00".to_string()),
        };
        let biomed = SearchEntity {
            id: "http://id.who.int/icd/entity/456".to_string(),
            the_code: Some("5A11".to_string()),
        };

        assert_eq!(
            entity_to_hit(&tm2),
            Some(CodeHit {
                code: "SJ00".to_string(),
                system: TargetSystem::Tm2
            })
        );
        assert_eq!(
            entity_to_hit(&biomed),
            Some(CodeHit {
                code: "5A11".to_string(),
                system: TargetSystem::Biomedicine
            })
        );
    }

    #[test]
    fn test_entity_without_code_falls_back_to_id_segment() {
        let entity = SearchEntity {
            id: "http://id.who.int/icd/entity/456".to_string(),
            the_code: None,
        };
        assert_eq!(entity_to_hit(&entity).unwrap().code, "456");

        let empty = SearchEntity {
            id: String::new(),
            the_code: None,
        };
        assert_eq!(entity_to_hit(&empty), None);
    }

    #[tokio::test]
    async fn test_offline_client_is_unavailable() {
        let client = OfflineClient;
        let result = client.search_term("diabetes").await;
        assert!(matches!(
            result,
            Err(ExternalServiceError::Unavailable { .. })
        ));
    }
}
