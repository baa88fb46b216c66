use async_trait::async_trait;
use azure_core::auth::TokenCredential;
use azure_identity::DefaultAzureCredential;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const POWER_BI_SCOPE: &str = "https://analysis.windows.net/powerbi/api";
const CAPACITIES_URL: &str = "https://api.powerbi.com/v1.0/myorg/capacities";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the Fabric tenant's home region comes from. Returns `None` whenever
/// the region can't be determined; callers fall back to a default.
#[async_trait]
pub trait TenantRegionSource: Send + Sync {
    async fn home_region(&self) -> Option<String>;
}

#[derive(Error, Debug)]
enum RegionLookupError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] azure_core::Error),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct CapacityList {
    #[serde(default)]
    value: Vec<Capacity>,
}

#[derive(Deserialize)]
struct Capacity {
    region: Option<String>,
}

/// Reads the region of the first Power BI capacity visible to the caller.
pub struct PowerBiCapacityRegion {
    client: Client,
    credential: Arc<DefaultAzureCredential>,
}

impl Default for PowerBiCapacityRegion {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerBiCapacityRegion {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            credential: Arc::new(DefaultAzureCredential::default()),
        }
    }

    async fn first_capacity_region(&self) -> Result<Option<String>, RegionLookupError> {
        let token = self.credential.get_token(POWER_BI_SCOPE).await?;

        log::debug!("Request: GET {}", CAPACITIES_URL);
        let capacities: CapacityList = self
            .client
            .get(CAPACITIES_URL)
            .bearer_auth(token.token.secret())
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(capacities.value.into_iter().next().and_then(|c| c.region))
    }
}

#[async_trait]
impl TenantRegionSource for PowerBiCapacityRegion {
    async fn home_region(&self) -> Option<String> {
        match self.first_capacity_region().await {
            Ok(region) => region.filter(|r| !r.trim().is_empty()),
            Err(e) => {
                log::warn!("Fabric tenant region lookup failed: {}", e);
                None
            }
        }
    }
}

/// A region source with a fixed answer.
pub struct FixedRegion(pub Option<String>);

#[async_trait]
impl TenantRegionSource for FixedRegion {
    async fn home_region(&self) -> Option<String> {
        self.0.clone()
    }
}

/// "West Central US" -> "westcentralus"
pub fn normalize_region(raw: &str) -> String {
    raw.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect()
}

/// The tenant home region in deployment form, or `fallback` when it can't be
/// detected.
pub async fn resolve_region(source: &dyn TenantRegionSource, fallback: &str) -> String {
    match source.home_region().await {
        Some(region) => {
            let normalized = normalize_region(&region);
            log::info!(
                "Auto-detected Fabric tenant region: {} -> {}",
                region,
                normalized
            );
            normalized
        }
        None => {
            log::warn!(
                "Could not detect Fabric tenant region. Using default: {}",
                fallback
            );
            fallback.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_normalize_to_region_codes() {
        assert_eq!(normalize_region("West Central US"), "westcentralus");
        assert_eq!(normalize_region("northeurope"), "northeurope");
    }

    #[tokio::test]
    async fn failed_lookup_falls_back_every_time() {
        let source = FixedRegion(None);
        for _ in 0..3 {
            assert_eq!(resolve_region(&source, "westcentralus").await, "westcentralus");
        }
    }

    #[tokio::test]
    async fn detected_region_wins_over_fallback() {
        let source = FixedRegion(Some("North Europe".to_string()));
        assert_eq!(resolve_region(&source, "westcentralus").await, "northeurope");
    }
}
