//! Decision-support figures derived from the trip distance alone.

use serde::{Deserialize, Serialize};

/// Flat bus fare in the metropolitan region, in cents.
pub const FARE_CENTS: u32 = 430;
pub const AVERAGE_SPEED_KMH: f64 = 20.0;
/// Placeholder transit quality sent for every facility until real transit
/// data is available.
pub const TRANSPORT_SCORE: f64 = 0.7;
/// Region code used when the service omits a facility's municipality.
pub const DEFAULT_MUNICIPALITY: &str = "RMR";

/// Estimated number of boardings. A boundary distance falls into the next
/// bracket (strict `<`), so 10 km is already two boardings.
pub fn transfer_count(distance_km: f64) -> u32 {
    if distance_km < 10.0 {
        1
    } else if distance_km < 20.0 {
        2
    } else {
        3
    }
}

/// Boardings times the flat fare. Computed in cents so the result is the
/// nearest double to the decimal amount.
pub fn transport_cost(distance_km: f64) -> f64 {
    f64::from(transfer_count(distance_km) * FARE_CENTS) / 100.0
}

pub fn travel_time_estimate(distance_km: f64) -> String {
    let minutes = (distance_km / AVERAGE_SPEED_KMH * 60.0).round() as i64;
    if minutes < 60 {
        return format!("{minutes} min");
    }
    let hours = minutes / 60;
    let remainder = minutes % 60;
    if remainder > 0 {
        format!("{hours}h{remainder}min")
    } else {
        format!("{hours}h")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripEstimate {
    #[serde(rename = "distancia")]
    pub distance_km: f64,
    #[serde(rename = "custo")]
    pub cost: f64,
    #[serde(rename = "tempoViagem")]
    pub travel_time: String,
    #[serde(rename = "numeroTransferencias")]
    pub transfers: u32,
}

impl TripEstimate {
    pub fn for_distance(distance_km: f64) -> Self {
        Self {
            distance_km,
            cost: transport_cost(distance_km),
            travel_time: travel_time_estimate(distance_km),
            transfers: transfer_count(distance_km),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_brackets_include_boundary_in_upper_bracket() {
        assert_eq!(transfer_count(0.0), 1);
        assert_eq!(transfer_count(9.99), 1);
        assert_eq!(transfer_count(10.0), 2);
        assert_eq!(transfer_count(19.99), 2);
        assert_eq!(transfer_count(20.0), 3);
        assert_eq!(transfer_count(100.0), 3);
    }

    #[test]
    fn cost_is_boardings_times_fare() {
        assert_eq!(transport_cost(5.0), 4.30);
        assert_eq!(transport_cost(15.0), 8.60);
        assert_eq!(transport_cost(25.0), 12.90);
    }

    #[test]
    fn travel_time_formats_minutes_and_hours() {
        assert_eq!(travel_time_estimate(10.0), "30 min");
        assert_eq!(travel_time_estimate(20.0), "1h");
        assert_eq!(travel_time_estimate(25.0), "1h15min");
        assert_eq!(travel_time_estimate(0.0), "0 min");
        assert_eq!(travel_time_estimate(40.0), "2h");
    }

    #[test]
    fn travel_time_rounds_to_nearest_minute() {
        // 19.99 km is 59.97 minutes, which rounds up into the hour format.
        assert_eq!(travel_time_estimate(19.99), "1h");
        assert_eq!(travel_time_estimate(3.2), "10 min");
    }

    #[test]
    fn trip_estimate_collects_all_figures() {
        let estimate = TripEstimate::for_distance(12.5);
        assert_eq!(estimate.transfers, 2);
        assert_eq!(estimate.cost, 8.60);
        assert_eq!(estimate.travel_time, "38 min");
    }
}
