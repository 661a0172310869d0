//! Core seams for the trip planner.
//!
//! Networked lookups are written against small async traits so callers can
//! compose fallback chains and tests can substitute fixtures.

use async_trait::async_trait;
use thiserror::Error;

use crate::place_search::PlaceCandidate;
use crate::waypoint::{Point, Route};

/// Why a single provider tier failed.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network unavailable: {0}")]
    Network(#[from] reqwest::Error),
    #[error("service answered with status {0}")]
    Status(u16),
    #[error("no usable route in response")]
    NoRoute,
}

/// A single routing tier: one attempt, typed failure.
///
/// `points` always holds at least two entries; [`crate::route::RouteEstimator`]
/// enforces that before dispatching.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Tier name used in logs when a tier serves or fails a request.
    fn name(&self) -> &'static str;

    /// Attempts to route through the given points, in order.
    async fn route(&self, points: &[Point]) -> Result<Route, ProviderError>;
}

/// A single place-search tier.
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Resolves a free-text query to up to `limit` coordinate candidates.
    async fn search(&self, query: &str, limit: usize)
    -> Result<Vec<PlaceCandidate>, ProviderError>;
}

/// Ambient authentication context.
///
/// Injected into each client instead of read from globals at call sites;
/// clients attach the token as a bearer header when one is present.
pub trait CredentialsProvider: Send + Sync {
    /// Bearer token for backend requests, if a session exists.
    fn bearer_token(&self) -> Option<String>;
}

/// Fixed-token credentials (tests, service accounts, anonymous access).
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl CredentialsProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}
