//! trip-planner core
//!
//! Route estimation, trip costing, and booking validation for a fleet
//! management frontend. Networked lookups (place search, routing,
//! availability) degrade through explicit fallback tiers instead of
//! throwing at the caller; cost and date logic is pure and synchronous.

pub mod availability;
pub mod cost;
pub mod dates;
pub mod form;
pub mod haversine;
pub mod place_search;
pub mod route;
pub mod traits;
pub mod waypoint;
