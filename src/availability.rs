//! Vehicle and driver availability lookups.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::traits::{CredentialsProvider, ProviderError};

#[derive(Debug, Clone)]
pub struct AvailabilityConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Booked-up vehicles and drivers for a queried date range.
///
/// The range is kept alongside the sets: a result answers exactly one range
/// and is stale the moment the form's dates change. Blocked IDs are meant
/// to be rendered disabled in choice controls, not removed from the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilitySet {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub unavailable_vehicles: HashSet<String>,
    pub unavailable_drivers: HashSet<String>,
}

impl AvailabilitySet {
    /// A conflict-free set for the given range.
    pub fn empty(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            unavailable_vehicles: HashSet::new(),
            unavailable_drivers: HashSet::new(),
        }
    }

    /// Whether this result still answers the given range.
    pub fn covers(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date == start && self.end_date == end
    }

    pub fn vehicle_blocked(&self, id: &str) -> bool {
        self.unavailable_vehicles.contains(id)
    }

    pub fn driver_blocked(&self, id: &str) -> bool {
        self.unavailable_drivers.contains(id)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityResponse {
    #[serde(default)]
    unavailable_vehicles: Vec<String>,
    #[serde(default)]
    unavailable_drivers: Vec<String>,
}

/// Client for the booking-conflict endpoint.
pub struct AvailabilityChecker {
    config: AvailabilityConfig,
    credentials: Arc<dyn CredentialsProvider>,
    client: reqwest::Client,
}

impl AvailabilityChecker {
    pub fn new(
        config: AvailabilityConfig,
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

    /// Fetches booking conflicts for a date range.
    ///
    /// A 404 means the backend does not implement the endpoint; that is
    /// treated as "no conflicts", not as a failure, and must never surface
    /// a user-visible error.
    pub async fn check(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AvailabilitySet, ProviderError> {
        let url = format!("{}/api/trips/availability", self.config.base_url);
        let (start_param, end_param) = (start.to_string(), end.to_string());
        let mut request = self.client.get(url).query(&[
            ("startDate", start_param.as_str()),
            ("endDate", end_param.as_str()),
        ]);
        if let Some(token) = self.credentials.bearer_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("availability endpoint absent, assuming no conflicts");
            return Ok(AvailabilitySet::empty(start, end));
        }
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let body: AvailabilityResponse = response.json().await?;
        Ok(AvailabilitySet {
            start_date: start,
            end_date: end,
            unavailable_vehicles: body.unavailable_vehicles.into_iter().collect(),
            unavailable_drivers: body.unavailable_drivers.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_covers_exact_range_only() {
        let set = AvailabilitySet::empty(date(1), date(3));
        assert!(set.covers(date(1), date(3)));
        assert!(!set.covers(date(1), date(4)));
        assert!(!set.covers(date(2), date(3)));
    }

    #[test]
    fn test_blocked_lookups() {
        let mut set = AvailabilitySet::empty(date(1), date(3));
        set.unavailable_vehicles.insert("veh-1".to_string());
        set.unavailable_drivers.insert("drv-9".to_string());

        assert!(set.vehicle_blocked("veh-1"));
        assert!(!set.vehicle_blocked("veh-2"));
        assert!(set.driver_blocked("drv-9"));
        assert!(!set.driver_blocked("veh-1"));
    }
}
