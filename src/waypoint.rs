//! Waypoint and route value types.
//!
//! A route is built from an ordered waypoint list: the first entry is the
//! origin, the last is the destination, anything between is a stop. A
//! waypoint may not have coordinates yet (its address is still being
//! resolved), so routing only sees the coordinate-bearing subset.

use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude in degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// An ordered stop contributing to a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub address: String,
    pub coords: Option<Point>,
}

impl Waypoint {
    /// A waypoint whose address has not been resolved to coordinates yet.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            coords: None,
        }
    }

    /// A waypoint with known coordinates.
    pub fn resolved(address: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            address: address.into(),
            coords: Some(Point::new(lat, lng)),
        }
    }
}

/// A routed path with its total road distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    points: Vec<Point>,
    distance_km: f64,
}

impl Route {
    /// Creates a route, rounding the distance to two decimals.
    pub fn new(points: Vec<Point>, distance_km: f64) -> Self {
        Self {
            points,
            distance_km: round_km(distance_km),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Total road distance in kilometers, rounded to two decimals.
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

/// Rounds a kilometer value to two decimal places.
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

/// Coordinate-bearing points of a waypoint list, in order.
pub fn routable_points(waypoints: &[Waypoint]) -> Vec<Point> {
    waypoints.iter().filter_map(|w| w.coords).collect()
}
