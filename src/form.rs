//! Trip form state: versioned waypoints and memoized recomputation.
//!
//! The source of truth is the waypoint list plus dates and rates. Derived
//! values (route, cost) carry the version they were computed against and
//! are recomputed only when that version has moved on; no serialized
//! structure is used as a change key. Route recomputation is debounced so
//! a burst of edits costs one network round trip, and all in-flight work
//! is cancelled when the form closes.

use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::cost::{TripCost, TripCostInputs, daily_total};
use crate::dates::{DateRangeError, TripRules};
use crate::route::{EstimateError, RouteEstimator};
use crate::waypoint::{Point, Route, Waypoint};

#[derive(Debug, Clone)]
pub struct FormOptions {
    /// Quiet period after the last waypoint edit before routing fires.
    pub debounce: Duration,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(400),
        }
    }
}

/// Why the form cannot be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("pick start and end dates")]
    MissingDates,
    #[error(transparent)]
    Dates(#[from] DateRangeError),
}

/// In-memory state for one trip-booking session.
///
/// Ephemeral: created per form, discarded on close or submission.
pub struct TripForm {
    waypoints: Vec<Waypoint>,
    /// Bumped on any structural waypoint change.
    waypoints_version: u64,
    /// Bumped on any change that affects the cost (waypoints, dates,
    /// rates, adopted route).
    inputs_version: u64,
    route: Option<(u64, Route)>,
    cost_memo: Option<(u64, TripCost)>,
    rate_per_km: f64,
    vehicle_rent_per_day: f64,
    driver_bata_per_day: f64,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    options: FormOptions,
    cancel: CancellationToken,
}

impl TripForm {
    pub fn new(options: FormOptions) -> Self {
        Self {
            waypoints: Vec::new(),
            waypoints_version: 0,
            inputs_version: 0,
            route: None,
            cost_memo: None,
            rate_per_km: 0.0,
            vehicle_rent_per_day: 0.0,
            driver_bata_per_day: 0.0,
            start_date: None,
            end_date: None,
            options,
            cancel: CancellationToken::new(),
        }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    fn touch_waypoints(&mut self) {
        self.waypoints_version += 1;
        self.inputs_version += 1;
    }

    pub fn push_waypoint(&mut self, waypoint: Waypoint) {
        self.waypoints.push(waypoint);
        self.touch_waypoints();
    }

    pub fn remove_waypoint(&mut self, index: usize) -> Option<Waypoint> {
        if index >= self.waypoints.len() {
            return None;
        }
        let removed = self.waypoints.remove(index);
        self.touch_waypoints();
        Some(removed)
    }

    /// Moves a waypoint to a new position (reorder).
    pub fn move_waypoint(&mut self, from: usize, to: usize) -> bool {
        if from >= self.waypoints.len() || to >= self.waypoints.len() || from == to {
            return false;
        }
        let waypoint = self.waypoints.remove(from);
        self.waypoints.insert(to, waypoint);
        self.touch_waypoints();
        true
    }

    /// Attaches resolved coordinates to a waypoint.
    pub fn set_coords(&mut self, index: usize, coords: Point) -> bool {
        match self.waypoints.get_mut(index) {
            Some(waypoint) => {
                waypoint.coords = Some(coords);
                self.touch_waypoints();
                true
            }
            None => false,
        }
    }

    pub fn set_dates(&mut self, start: NaiveDate, end: NaiveDate) {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self.inputs_version += 1;
    }

    pub fn set_rates(&mut self, rate_per_km: f64, vehicle_rent_per_day: f64, driver_bata_per_day: f64) {
        self.rate_per_km = rate_per_km;
        self.vehicle_rent_per_day = vehicle_rent_per_day;
        self.driver_bata_per_day = driver_bata_per_day;
        self.inputs_version += 1;
    }

    /// Last adopted route. Kept on estimator failure so the previous path
    /// stays visible.
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref().map(|(_, route)| route)
    }

    /// Whether the route matches the current waypoint list.
    pub fn route_is_current(&self) -> bool {
        self.route
            .as_ref()
            .is_some_and(|(version, _)| *version == self.waypoints_version)
    }

    /// Distance of the last adopted route, or zero when none exists.
    pub fn distance_km(&self) -> f64 {
        self.route().map_or(0.0, Route::distance_km)
    }

    /// Recomputes the route if the waypoint list changed since the last
    /// estimate, waiting out the debounce window first.
    ///
    /// Chain failure keeps the previous route and returns the error for a
    /// single user-facing notification. With fewer than two resolved
    /// waypoints the route is cleared without any network call.
    pub async fn refresh_route(&mut self, estimator: &RouteEstimator) -> Result<(), EstimateError> {
        if self.route_is_current() {
            return Ok(());
        }

        tokio::select! {
            _ = self.cancel.cancelled() => return Err(EstimateError::Cancelled),
            _ = tokio::time::sleep(self.options.debounce) => {}
        }

        match estimator
            .estimate_cancellable(&self.waypoints, &self.cancel)
            .await?
        {
            Some(route) => {
                self.route = Some((self.waypoints_version, route));
                self.inputs_version += 1;
                Ok(())
            }
            None => {
                self.route = None;
                self.inputs_version += 1;
                Ok(())
            }
        }
    }

    /// Current cost under day-multiplied pricing, memoized until any input
    /// changes. `None` until both dates are set.
    pub fn cost(&mut self) -> Option<TripCost> {
        let start_date = self.start_date?;
        let end_date = self.end_date?;

        if let Some((version, memo)) = self.cost_memo {
            if version == self.inputs_version {
                return Some(memo);
            }
        }

        let result = daily_total(&TripCostInputs {
            distance_km: self.distance_km(),
            rate_per_km: self.rate_per_km,
            vehicle_rent_per_day: self.vehicle_rent_per_day,
            driver_bata_per_day: self.driver_bata_per_day,
            start_date,
            end_date,
        });
        self.cost_memo = Some((self.inputs_version, result));
        Some(result)
    }

    /// Gate for submission: dates present and the date rules hold for the
    /// current distance.
    pub fn validate(&self, rules: &TripRules, today: NaiveDate) -> Result<(), FormError> {
        let (start, end) = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(FormError::MissingDates),
        };
        rules.validate(start, end, self.distance_km(), today)?;
        Ok(())
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self, rules: &TripRules, today: NaiveDate) -> bool {
        self.route_is_current() && self.validate(rules, today).is_ok()
    }

    /// Token governing this form's in-flight work.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancels in-flight estimates; call when the surface closes.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}
