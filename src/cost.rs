//! Trip cost arithmetic.
//!
//! Two formulas coexist upstream: day-multiplied pricing for regular trip
//! bookings and a flat lump sum when an enquiry is converted into a trip.
//! They produce different totals for the same inputs; both are kept as
//! named modes until product reconciles them.

use chrono::NaiveDate;

/// Default advance percentage for enquiry conversions.
pub const DEFAULT_ADVANCE_PCT: f64 = 20.0;

/// Inputs for day-multiplied pricing. Rates are non-negative; dates are
/// calendar dates, time of day does not affect the day count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripCostInputs {
    pub distance_km: f64,
    pub rate_per_km: f64,
    pub vehicle_rent_per_day: f64,
    pub driver_bata_per_day: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Result of day-multiplied pricing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripCost {
    pub num_days: i64,
    pub total_amount: f64,
}

/// Result of flat enquiry-conversion pricing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LumpSumCost {
    pub total_amount: f64,
    pub advance_amount: f64,
}

/// Inclusive day count between two dates, never below one.
///
/// Callers must validate the range first; an end before the start still
/// yields one day rather than a negative count.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    ((end - start).num_days() + 1).max(1)
}

/// Day-multiplied pricing used by the recurring trip form.
pub fn daily_total(inputs: &TripCostInputs) -> TripCost {
    let num_days = inclusive_days(inputs.start_date, inputs.end_date);
    let days = num_days as f64;
    let total = inputs.driver_bata_per_day * days
        + inputs.rate_per_km * inputs.distance_km
        + inputs.vehicle_rent_per_day * days;
    TripCost {
        num_days,
        total_amount: round2(total),
    }
}

/// Flat pricing used when an enquiry is converted into a trip: rent and
/// bata are lump sums, not daily rates.
pub fn lump_sum(
    distance_km: f64,
    rate_per_km: f64,
    vehicle_rent: f64,
    driver_bata: f64,
    advance_pct: f64,
) -> LumpSumCost {
    let total = round2(distance_km * rate_per_km + vehicle_rent + driver_bata);
    LumpSumCost {
        total_amount: total,
        advance_amount: round2(total * advance_pct / 100.0),
    }
}

/// Rounds a monetary value to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
