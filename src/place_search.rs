//! Free-text place search with a proxy-then-direct fallback.
//!
//! The backend proxy is preferred (it holds the API key and avoids browser
//! cross-origin limits); the public geocoder is tried directly when the
//! proxy fails. Total failure degrades to an empty candidate list rather
//! than an error.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::traits::{CredentialsProvider, PlaceProvider, ProviderError};

/// Queries shorter than this never reach the network.
pub const MIN_QUERY_LEN: usize = 3;

/// Default number of candidates requested per query.
const DEFAULT_LIMIT: usize = 5;

/// A resolved address candidate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceCandidate {
    pub display: String,
    pub lat: f64,
    pub lng: f64,
}

/// Backend search proxy tier.
#[derive(Debug, Clone)]
pub struct ProxySearchConfig {
    pub base_url: String,
    /// ISO country codes the search is restricted to.
    pub country_codes: String,
    pub timeout_secs: u64,
}

impl Default for ProxySearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            country_codes: "in".to_string(),
            timeout_secs: 10,
        }
    }
}

pub struct ProxySearchProvider {
    config: ProxySearchConfig,
    credentials: Arc<dyn CredentialsProvider>,
    client: reqwest::Client,
}

impl ProxySearchProvider {
    pub fn new(
        config: ProxySearchConfig,
        credentials: Arc<dyn CredentialsProvider>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            credentials,
            client,
        })
    }
}

#[async_trait]
impl PlaceProvider for ProxySearchProvider {
    fn name(&self) -> &'static str {
        "backend-proxy"
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PlaceCandidate>, ProviderError> {
        let url = format!("{}/api/maps/search-places", self.config.base_url);
        let limit = limit.to_string();
        let mut request = self.client.get(url).query(&[
            ("q", query),
            ("limit", limit.as_str()),
            ("countrycodes", self.config.country_codes.as_str()),
        ]);
        if let Some(token) = self.credentials.bearer_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

/// Public Nominatim-style geocoder, called directly as a fallback.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    pub country_codes: String,
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            country_codes: "in".to_string(),
            timeout_secs: 10,
        }
    }
}

pub struct NominatimProvider {
    config: NominatimConfig,
    client: reqwest::Client,
}

impl NominatimProvider {
    pub fn new(config: NominatimConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("trip-planner/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

// Nominatim serializes coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

#[async_trait]
impl PlaceProvider for NominatimProvider {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PlaceCandidate>, ProviderError> {
        let url = format!("{}/search", self.config.base_url);
        let limit = limit.to_string();
        let response = self
            .client
            .get(url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", limit.as_str()),
                ("countrycodes", self.config.country_codes.as_str()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let places: Vec<NominatimPlace> = response.json().await?;
        let candidates = places
            .into_iter()
            .filter_map(|place| {
                let lat = place.lat.parse().ok()?;
                let lng = place.lon.parse().ok()?;
                Some(PlaceCandidate {
                    display: place.display_name,
                    lat,
                    lng,
                })
            })
            .collect();
        Ok(candidates)
    }
}

/// Result of a search, accounting for requests issued after it.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Candidates answering the most recently issued query.
    Fresh(Vec<PlaceCandidate>),
    /// A newer request was issued while this one was in flight; discard.
    Stale,
}

/// Tiered place search with stale-response discard.
///
/// Each request is tagged with a monotonically increasing sequence number;
/// a response that finishes after a newer request was issued comes back as
/// [`SearchOutcome::Stale`] so rapid typing cannot surface out-of-order
/// candidate lists.
pub struct PlaceSearchClient {
    providers: Vec<Box<dyn PlaceProvider>>,
    limit: usize,
    issued: AtomicU64,
}

impl PlaceSearchClient {
    pub fn new(providers: Vec<Box<dyn PlaceProvider>>) -> Self {
        Self {
            providers,
            limit: DEFAULT_LIMIT,
            issued: AtomicU64::new(0),
        }
    }

    /// Proxy-first client with the public geocoder as fallback.
    pub fn proxied(proxy: ProxySearchProvider, direct: NominatimProvider) -> Self {
        Self::new(vec![Box::new(proxy), Box::new(direct)])
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Resolves a free-text query to coordinate candidates.
    ///
    /// Queries under [`MIN_QUERY_LEN`] characters return an empty fresh
    /// result without a network call. Only tier *failure* falls through to
    /// the next tier; a successful answer is adopted even when it carries
    /// no candidates. Exhausting the chain yields an empty result, never
    /// an error.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return SearchOutcome::Fresh(Vec::new());
        }

        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        let mut candidates = Vec::new();
        for provider in &self.providers {
            match provider.search(query, self.limit).await {
                Ok(found) => {
                    tracing::debug!(
                        tier = provider.name(),
                        count = found.len(),
                        "place search served"
                    );
                    candidates = found;
                    break;
                }
                Err(err) => {
                    tracing::warn!(tier = provider.name(), error = %err, "place search tier failed");
                }
            }
        }

        if self.issued.load(Ordering::SeqCst) != seq {
            return SearchOutcome::Stale;
        }
        SearchOutcome::Fresh(candidates)
    }
}
