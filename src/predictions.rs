//! Arrival predictions derived from realtime trip updates.
//!
//! Everything here is a pure function of a feed snapshot and the current
//! time, so the same inputs always rank the same way.

use serde::Serialize;

use crate::gtfs_rt::TripUpdate;

/// One predicted arrival of a trip at a stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub trip_id: String,
    pub route_id: String,
    pub stop_id: String,
    /// POSIX seconds.
    pub arrival_time: i64,
}

impl Prediction {
    /// Seconds until arrival, relative to `now`. Negative when already past.
    pub fn seconds_until(&self, now: i64) -> i64 {
        self.arrival_time - now
    }
}

/// Collects every stop-time update whose stop id starts with `stop_prefix`.
///
/// Records keep feed order. Updates with no arrival time are skipped.
pub fn extract(trip_updates: &[TripUpdate], stop_prefix: &str) -> Vec<Prediction> {
    let mut predictions = Vec::new();

    for update in trip_updates {
        let trip_id = update.trip.trip_id.clone().unwrap_or_default();
        let route_id = update.trip.route_id.clone().unwrap_or_default();

        for stop_time in &update.stop_time_update {
            let Some(stop_id) = stop_time.stop_id.as_deref() else {
                continue;
            };
            if !stop_id.starts_with(stop_prefix) {
                continue;
            }
            let Some(arrival_time) = stop_time.arrival.as_ref().and_then(|a| a.time) else {
                continue;
            };

            predictions.push(Prediction {
                trip_id: trip_id.clone(),
                route_id: route_id.clone(),
                stop_id: stop_id.to_string(),
                arrival_time,
            });
        }
    }

    predictions
}

/// Drops arrivals before `now`, orders the rest by arrival time and keeps
/// the first `limit`. Equal arrival times keep their input order.
pub fn upcoming(mut predictions: Vec<Prediction>, now: i64, limit: usize) -> Vec<Prediction> {
    predictions.retain(|p| p.arrival_time >= now);
    predictions.sort_by_key(|p| p.arrival_time);
    predictions.truncate(limit);
    predictions
}

/// [`extract`] followed by [`upcoming`].
pub fn rank(
    trip_updates: &[TripUpdate],
    stop_prefix: &str,
    now: i64,
    limit: usize,
) -> Vec<Prediction> {
    upcoming(extract(trip_updates, stop_prefix), now, limit)
}
