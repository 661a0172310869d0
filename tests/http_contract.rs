//! HTTP contract tests for the networked clients, against a mock backend.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trip_planner::availability::{AvailabilityChecker, AvailabilityConfig};
use trip_planner::place_search::{
    NominatimConfig, NominatimProvider, PlaceCandidate, PlaceSearchClient, ProxySearchConfig,
    ProxySearchProvider, SearchOutcome,
};
use trip_planner::route::{
    ProxyOsrmConfig, ProxyOsrmProvider, PublicOsrmConfig, PublicOsrmProvider, RouteEstimator,
};
use trip_planner::traits::StaticToken;
use trip_planner::waypoint::Waypoint;

fn proxy_search(server: &MockServer) -> ProxySearchProvider {
    ProxySearchProvider::new(
        ProxySearchConfig {
            base_url: server.uri(),
            ..ProxySearchConfig::default()
        },
        Arc::new(StaticToken::anonymous()),
    )
    .unwrap()
}

fn direct_search(server: &MockServer) -> NominatimProvider {
    NominatimProvider::new(NominatimConfig {
        base_url: server.uri(),
        ..NominatimConfig::default()
    })
    .unwrap()
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

#[tokio::test]
async fn proxy_search_resolves_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/maps/search-places"))
        .and(query_param("q", "New Delhi"))
        .and(query_param("countrycodes", "in"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "display": "New Delhi, Delhi, India", "lat": 28.6139, "lng": 77.2090 }
        ])))
        .mount(&server)
        .await;

    let client = PlaceSearchClient::new(vec![Box::new(proxy_search(&server))]);
    let outcome = client.search("New Delhi").await;

    assert_eq!(
        outcome,
        SearchOutcome::Fresh(vec![PlaceCandidate {
            display: "New Delhi, Delhi, India".to_string(),
            lat: 28.6139,
            lng: 77.2090,
        }])
    );
}

#[tokio::test]
async fn search_falls_back_to_direct_geocoder() {
    let proxy = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&proxy)
        .await;

    let direct = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "display_name": "Mumbai, Maharashtra, India", "lat": "19.0760", "lon": "72.8777" }
        ])))
        .mount(&direct)
        .await;

    let client = PlaceSearchClient::proxied(proxy_search(&proxy), direct_search(&direct));
    let outcome = client.search("Mumbai").await;

    match outcome {
        SearchOutcome::Fresh(candidates) => {
            assert_eq!(candidates.len(), 1);
            assert_eq!(candidates[0].display, "Mumbai, Maharashtra, India");
            assert!((candidates[0].lat - 19.0760).abs() < 1e-9);
            assert!((candidates[0].lng - 72.8777).abs() < 1e-9);
        }
        SearchOutcome::Stale => panic!("single request cannot be stale"),
    }
}

#[tokio::test]
async fn search_total_failure_is_empty_not_error() {
    let proxy = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&proxy)
        .await;
    let direct = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&direct)
        .await;

    let client = PlaceSearchClient::proxied(proxy_search(&proxy), direct_search(&direct));
    assert_eq!(
        client.search("Chennai").await,
        SearchOutcome::Fresh(Vec::new())
    );
}

#[tokio::test]
async fn osrm_proxy_route_parses_geometry_and_distance() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/maps/osrm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routes": [{
                "geometry": {
                    "coordinates": [[77.2090, 28.6139], [77.5, 28.0], [72.8777, 19.0760]]
                },
                "distance": 1392458.0
            }]
        })))
        .mount(&server)
        .await;

    let proxy = ProxyOsrmProvider::new(
        ProxyOsrmConfig {
            base_url: server.uri(),
            ..ProxyOsrmConfig::default()
        },
        Arc::new(StaticToken::anonymous()),
    )
    .unwrap();
    let public = PublicOsrmProvider::new(PublicOsrmConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        ..PublicOsrmConfig::default()
    })
    .unwrap();
    let estimator = RouteEstimator::proxied(proxy, public);

    let waypoints = vec![
        Waypoint::resolved("Delhi", 28.6139, 77.2090),
        Waypoint::resolved("Mumbai", 19.0760, 72.8777),
    ];
    let route = estimator.estimate(&waypoints).await.unwrap().unwrap();

    // Meters from the wire, km rounded to two decimals; GeoJSON order
    // flipped back to lat/lng.
    assert_eq!(route.distance_km(), 1392.46);
    assert_eq!(route.points().len(), 3);
    assert_eq!(route.points()[0].lat, 28.6139);
    assert_eq!(route.points()[0].lng, 77.2090);
}

#[tokio::test]
async fn availability_missing_endpoint_soft_fails_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let checker = AvailabilityChecker::new(
        AvailabilityConfig {
            base_url: server.uri(),
            ..AvailabilityConfig::default()
        },
        Arc::new(StaticToken::anonymous()),
    )
    .unwrap();

    let set = checker.check(date(10), date(12)).await.unwrap();

    assert!(set.unavailable_vehicles.is_empty());
    assert!(set.unavailable_drivers.is_empty());
    assert!(set.covers(date(10), date(12)));
}

#[tokio::test]
async fn availability_parses_conflicts_and_sends_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/trips/availability"))
        .and(query_param("startDate", "2024-06-10"))
        .and(query_param("endDate", "2024-06-12"))
        .and(header("authorization", "Bearer session-token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "unavailableVehicles": ["veh-1", "veh-2"],
            "unavailableDrivers": ["drv-7"]
        })))
        .mount(&server)
        .await;

    let checker = AvailabilityChecker::new(
        AvailabilityConfig {
            base_url: server.uri(),
            ..AvailabilityConfig::default()
        },
        Arc::new(StaticToken::new("session-token-1")),
    )
    .unwrap();

    let set = checker.check(date(10), date(12)).await.unwrap();

    assert!(set.vehicle_blocked("veh-1"));
    assert!(set.vehicle_blocked("veh-2"));
    assert!(set.driver_blocked("drv-7"));
    assert!(!set.vehicle_blocked("veh-3"));
}
