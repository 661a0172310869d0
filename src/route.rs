//! Route estimation with a tiered fallback chain.
//!
//! Tiers are tried in order: the backend OSRM proxy, then the public OSRM
//! instance, and (only where the caller opts in) a synthetic route derived
//! from the great-circle distance. A tier failure is logged and the next
//! tier is tried; the caller sees a single error only when the whole chain
//! is exhausted.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::haversine::haversine_km;
use crate::traits::{CredentialsProvider, ProviderError, RouteProvider};
use crate::waypoint::{Point, Route, Waypoint, routable_points};

/// Multiplier applied to great-circle distance to approximate road distance.
const ROAD_FACTOR: f64 = 1.4;

/// Per-axis jitter applied to synthetic intermediate points, in degrees.
const SYNTHETIC_JITTER_DEG: f64 = 0.005;

/// Bounds on the number of synthetic intermediate points.
const SYNTHETIC_MIN_POINTS: usize = 3;
const SYNTHETIC_MAX_POINTS: usize = 8;

fn join_coords(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.6},{:.6}", p.lng, p.lat))
        .collect::<Vec<_>>()
        .join(";")
}

// OSRM route response, shared by the proxy and the public instance.
#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    /// Meters.
    distance: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON order: `[lng, lat]`.
    coordinates: Vec<[f64; 2]>,
}

impl OsrmRouteResponse {
    fn into_route(self) -> Option<Route> {
        let best = self.routes.into_iter().next()?;
        if best.geometry.coordinates.is_empty() {
            return None;
        }
        let points = best
            .geometry
            .coordinates
            .iter()
            .map(|c| Point::new(c[1], c[0]))
            .collect();
        Some(Route::new(points, best.distance / 1000.0))
    }
}

/// Backend-proxied OSRM tier.
#[derive(Debug, Clone)]
pub struct ProxyOsrmConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ProxyOsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
        }
    }
}

pub struct ProxyOsrmProvider {
    config: ProxyOsrmConfig,
    credentials: Arc<dyn CredentialsProvider>,
    client: reqwest::Client,
}

impl ProxyOsrmProvider {
    pub fn new(
        config: ProxyOsrmConfig,
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
impl RouteProvider for ProxyOsrmProvider {
    fn name(&self) -> &'static str {
        "backend-proxy"
    }

    async fn route(&self, points: &[Point]) -> Result<Route, ProviderError> {
        let url = format!("{}/api/maps/osrm", self.config.base_url);
        let coords = join_coords(points);
        let mut request = self.client.get(url).query(&[("coords", coords.as_str())]);
        if let Some(token) = self.credentials.bearer_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let body: OsrmRouteResponse = response.json().await?;
        body.into_route().ok_or(ProviderError::NoRoute)
    }
}

/// Public OSRM instance, called directly as a fallback.
#[derive(Debug, Clone)]
pub struct PublicOsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for PublicOsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

pub struct PublicOsrmProvider {
    config: PublicOsrmConfig,
    client: reqwest::Client,
}

impl PublicOsrmProvider {
    pub fn new(config: PublicOsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl RouteProvider for PublicOsrmProvider {
    fn name(&self) -> &'static str {
        "public-osrm"
    }

    async fn route(&self, points: &[Point]) -> Result<Route, ProviderError> {
        let url = format!(
            "{}/route/v1/{}/{}",
            self.config.base_url,
            self.config.profile,
            join_coords(points)
        );
        let response = self
            .client
            .get(url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let body: OsrmRouteResponse = response.json().await?;
        body.into_route().ok_or(ProviderError::NoRoute)
    }
}

/// Last-resort tier: fabricates a plausible path between the first and last
/// points and approximates road distance from the great-circle distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticRouteProvider;

#[async_trait]
impl RouteProvider for SyntheticRouteProvider {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn route(&self, points: &[Point]) -> Result<Route, ProviderError> {
        Ok(synthesize(points[0], points[points.len() - 1]))
    }
}

/// Builds a synthetic route between two points.
///
/// Intermediate points are linearly interpolated with a small random jitter
/// per axis to emulate road curvature; the distance is the haversine
/// distance scaled by [`ROAD_FACTOR`].
pub fn synthesize(origin: Point, destination: Point) -> Route {
    let mut rng = rand::thread_rng();
    let steps = rng.gen_range(SYNTHETIC_MIN_POINTS..=SYNTHETIC_MAX_POINTS);

    let mut points = Vec::with_capacity(steps + 2);
    points.push(origin);
    for i in 1..=steps {
        let t = i as f64 / (steps + 1) as f64;
        let lat = origin.lat
            + (destination.lat - origin.lat) * t
            + rng.gen_range(-SYNTHETIC_JITTER_DEG..SYNTHETIC_JITTER_DEG);
        let lng = origin.lng
            + (destination.lng - origin.lng) * t
            + rng.gen_range(-SYNTHETIC_JITTER_DEG..SYNTHETIC_JITTER_DEG);
        points.push(Point::new(lat, lng));
    }
    points.push(destination);

    Route::new(points, haversine_km(origin, destination) * ROAD_FACTOR)
}

/// Why an estimate produced no route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EstimateError {
    /// Every configured tier failed; callers keep their previous route.
    #[error("no routing service could produce a route")]
    AllProvidersFailed,
    #[error("route estimation cancelled")]
    Cancelled,
}

/// Tiered route estimator.
pub struct RouteEstimator {
    providers: Vec<Box<dyn RouteProvider>>,
}

impl RouteEstimator {
    pub fn new(providers: Vec<Box<dyn RouteProvider>>) -> Self {
        Self { providers }
    }

    /// Proxy-then-public chain used by the trip form.
    pub fn proxied(proxy: ProxyOsrmProvider, public: PublicOsrmProvider) -> Self {
        Self::new(vec![Box::new(proxy), Box::new(public)])
    }

    /// Same chain ending in the synthetic tier. Only the enquiry-to-trip
    /// conversion flow opts into fabricated routes.
    pub fn with_synthetic_fallback(proxy: ProxyOsrmProvider, public: PublicOsrmProvider) -> Self {
        Self::new(vec![
            Box::new(proxy),
            Box::new(public),
            Box::new(SyntheticRouteProvider),
        ])
    }

    /// Routes through the coordinate-bearing waypoints.
    ///
    /// Returns `Ok(None)` without touching the network when fewer than two
    /// waypoints have coordinates.
    pub async fn estimate(&self, waypoints: &[Waypoint]) -> Result<Option<Route>, EstimateError> {
        self.estimate_cancellable(waypoints, &CancellationToken::new())
            .await
    }

    /// As [`estimate`](Self::estimate), aborting as soon as `cancel` fires.
    ///
    /// The token is expected to be scoped to the consuming surface (form,
    /// modal) and cancelled when it closes.
    pub async fn estimate_cancellable(
        &self,
        waypoints: &[Waypoint],
        cancel: &CancellationToken,
    ) -> Result<Option<Route>, EstimateError> {
        let points = routable_points(waypoints);
        if points.len() < 2 {
            return Ok(None);
        }

        for provider in &self.providers {
            if cancel.is_cancelled() {
                return Err(EstimateError::Cancelled);
            }

            let attempt = tokio::select! {
                _ = cancel.cancelled() => return Err(EstimateError::Cancelled),
                result = provider.route(&points) => result,
            };

            match attempt {
                Ok(route) => {
                    tracing::info!(
                        tier = provider.name(),
                        distance_km = route.distance_km(),
                        "route served"
                    );
                    return Ok(Some(route));
                }
                Err(err) => {
                    tracing::warn!(tier = provider.name(), error = %err, "routing tier failed");
                }
            }
        }

        Err(EstimateError::AllProvidersFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waypoint::round_km;

    const DELHI: Point = Point {
        lat: 28.6139,
        lng: 77.2090,
    };
    const MUMBAI: Point = Point {
        lat: 19.0760,
        lng: 72.8777,
    };

    #[test]
    fn test_synthetic_distance_is_road_factor_times_haversine() {
        let route = synthesize(DELHI, MUMBAI);
        let expected = round_km(haversine_km(DELHI, MUMBAI) * ROAD_FACTOR);
        assert_eq!(route.distance_km(), expected);
        // Great-circle Delhi-Mumbai ~1154.5 km, so ~1616 km by road factor.
        assert!(route.distance_km() > 1590.0 && route.distance_km() < 1640.0);
    }

    #[test]
    fn test_synthetic_route_shape() {
        let route = synthesize(DELHI, MUMBAI);
        let points = route.points();

        // Origin and destination are exact; 3-8 jittered points between.
        assert_eq!(points[0], DELHI);
        assert_eq!(*points.last().unwrap(), MUMBAI);
        assert!(points.len() >= SYNTHETIC_MIN_POINTS + 2);
        assert!(points.len() <= SYNTHETIC_MAX_POINTS + 2);

        for (i, p) in points.iter().enumerate().skip(1) {
            if i == points.len() - 1 {
                break;
            }
            let t = i as f64 / (points.len() - 1) as f64;
            let lat = DELHI.lat + (MUMBAI.lat - DELHI.lat) * t;
            let lng = DELHI.lng + (MUMBAI.lng - DELHI.lng) * t;
            assert!((p.lat - lat).abs() <= SYNTHETIC_JITTER_DEG + 1e-9);
            assert!((p.lng - lng).abs() <= SYNTHETIC_JITTER_DEG + 1e-9);
        }
    }

    #[test]
    fn test_join_coords_is_lng_lat_order() {
        let joined = join_coords(&[DELHI, MUMBAI]);
        assert_eq!(joined, "77.209000,28.613900;72.877700,19.076000");
    }
}
