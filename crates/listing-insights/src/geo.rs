use crate::numeric::round_to;
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_MILES: f64 = 3959.0;
const EARTH_RADIUS_KILOMETERS: f64 = 6371.0;

/// Unit for great-circle distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    #[default]
    Miles,
    Kilometers,
}

impl DistanceUnit {
    pub const fn earth_radius(self) -> f64 {
        match self {
            Self::Miles => EARTH_RADIUS_MILES,
            Self::Kilometers => EARTH_RADIUS_KILOMETERS,
        }
    }
}

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn distance_to(&self, other: &Coordinates, unit: DistanceUnit) -> f64 {
        haversine_distance(self.lat, self.lng, other.lat, other.lng, unit)
    }
}

/// Great-circle distance between two points, rounded to two decimals.
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64, unit: DistanceUnit) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round_to(unit.earth_radius() * c, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_longitude_at_equator() {
        let miles = haversine_distance(0.0, 0.0, 0.0, 1.0, DistanceUnit::Miles);
        assert!((miles - 69.10).abs() < 0.01, "got {miles}");

        let km = haversine_distance(0.0, 0.0, 0.0, 1.0, DistanceUnit::Kilometers);
        assert!((km - 111.19).abs() < 0.01, "got {km}");
    }

    #[test]
    fn identical_points_are_zero_apart() {
        let here = Coordinates::new(41.5868, -93.625);
        assert_eq!(here.distance_to(&here, DistanceUnit::Miles), 0.0);
    }

    #[test]
    fn distance_is_symmetric_and_rounded() {
        let des_moines = Coordinates::new(41.5868, -93.625);
        let ames = Coordinates::new(42.0308, -93.6319);

        let there = des_moines.distance_to(&ames, DistanceUnit::Miles);
        let back = ames.distance_to(&des_moines, DistanceUnit::Miles);

        assert_eq!(there, back);
        assert_eq!(there, round_to(there, 2));
        assert!(there > 30.0 && there < 31.0, "got {there}");
    }
}
