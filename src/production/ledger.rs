//! Production ledger - lazy elapsed-time accrual for facilities
//!
//! Nothing ticks in the background. Each facility remembers when it was last
//! collected (its anchor); a collection pays out the hours since then at the
//! modified rate and moves every anchor to the collection instant.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::core::types::{FacilityId, Timestamp};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// A munitions factory owned by one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    /// Munitions per hour before modifiers
    pub base_rate: i64,
    /// Start of the current accrual window
    pub anchor: Timestamp,
    pub built_at: Timestamp,
}

impl Facility {
    /// A freshly built facility starts accruing immediately
    pub fn new(base_rate: i64, now: Timestamp) -> Self {
        Self {
            id: FacilityId::new(),
            base_rate,
            anchor: now,
            built_at: now,
        }
    }
}

/// Outcome of collecting every facility of a player
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub total: i64,
    pub per_facility: Vec<(FacilityId, i64)>,
}

/// Hourly rate after the production modifier, floored
pub fn effective_rate(base_rate: i64, production_modifier: f64) -> i64 {
    (base_rate as f64 * production_modifier).floor() as i64
}

/// Fractional hours between anchor and now; clock skew counts as zero
pub fn elapsed_hours(anchor: Timestamp, now: Timestamp) -> f64 {
    let elapsed: Duration = now - anchor;
    elapsed.num_milliseconds().max(0) as f64 / MILLIS_PER_HOUR
}

/// Yield accumulated by one facility since its anchor
///
/// A negative production modifier yields nothing rather than draining stock.
pub fn accrue(facility: &Facility, now: Timestamp, production_modifier: f64) -> i64 {
    let rate = effective_rate(facility.base_rate, production_modifier);
    let hours = elapsed_hours(facility.anchor, now);
    ((hours * rate as f64).floor() as i64).max(0)
}

/// Pay out every facility and reset all anchors to `now`
pub fn collect(facilities: &mut [Facility], now: Timestamp, production_modifier: f64) -> Collection {
    let mut total: i64 = 0;
    let mut per_facility = Vec::with_capacity(facilities.len());

    for facility in facilities.iter_mut() {
        let amount = accrue(facility, now, production_modifier);
        total = total.saturating_add(amount);
        per_facility.push((facility.id, amount));
        // Reset even on zero yield
        facility.anchor = now;
    }

    Collection { total, per_facility }
}

/// Combined hourly rate of all facilities
pub fn hourly_output(facilities: &[Facility], production_modifier: f64) -> i64 {
    facilities
        .iter()
        .map(|f| effective_rate(f.base_rate, production_modifier))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_effective_rate_democracy() {
        assert_eq!(effective_rate(1000, 1.10), 1100);
        assert_eq!(effective_rate(1000, 1.0), 1000);
        assert_eq!(effective_rate(1000, 0.95), 950);
    }

    #[test]
    fn test_accrue_one_hour() {
        let facility = Facility::new(1000, t0());
        assert_eq!(accrue(&facility, t0() + Duration::hours(1), 1.10), 1100);
    }

    #[test]
    fn test_accrue_partial_hour_floors() {
        let facility = Facility::new(1000, t0());
        // 20 minutes at 1000/h = 333.33
        assert_eq!(accrue(&facility, t0() + Duration::minutes(20), 1.0), 333);
    }

    #[test]
    fn test_clock_skew_yields_zero() {
        let facility = Facility::new(1000, t0());
        assert_eq!(elapsed_hours(t0(), t0() - Duration::hours(3)), 0.0);
        assert_eq!(accrue(&facility, t0() - Duration::hours(3), 1.0), 0);
    }

    #[test]
    fn test_negative_modifier_yields_zero() {
        let facility = Facility::new(1000, t0());
        assert_eq!(accrue(&facility, t0() + Duration::hours(2), -0.5), 0);
    }

    #[test]
    fn test_collect_twice_same_instant() {
        let mut facilities = vec![Facility::new(1000, t0()), Facility::new(1000, t0())];
        let now = t0() + Duration::hours(2);

        let first = collect(&mut facilities, now, 1.0);
        assert_eq!(first.total, 4000);
        assert_eq!(first.per_facility.len(), 2);

        let second = collect(&mut facilities, now, 1.0);
        assert_eq!(second.total, 0);
        assert!(facilities.iter().all(|f| f.anchor == now));
    }

    #[test]
    fn test_collect_resets_anchor_on_zero_yield() {
        let mut facilities = vec![Facility::new(1000, t0())];
        let now = t0() + Duration::milliseconds(1);
        let collection = collect(&mut facilities, now, 1.0);
        assert_eq!(collection.total, 0);
        assert_eq!(facilities[0].anchor, now);

        let skewed = t0();
        let collection = collect(&mut facilities, skewed, 1.0);
        assert_eq!(collection.total, 0);
        assert_eq!(facilities[0].anchor, skewed);
    }

    #[test]
    fn test_hourly_output() {
        let facilities = vec![Facility::new(1000, t0()), Facility::new(500, t0())];
        assert_eq!(hourly_output(&facilities, 1.10), 1650);
        assert_eq!(hourly_output(&[], 1.10), 0);
    }
}
