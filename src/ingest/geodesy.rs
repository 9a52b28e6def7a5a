use geo::{point, GeodesicBearing, GeodesicDistance};

use crate::render::METERS_PER_NM;

/// WGS84 geodesic distance in nautical miles, rounded to 0.01 NM.
pub fn distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let from = point!(x: lon1, y: lat1);
    let to = point!(x: lon2, y: lat2);
    let nm = from.geodesic_distance(&to) / METERS_PER_NM;
    (nm * 100.0).round() / 100.0
}

/// Initial bearing from point 1 to point 2, in degrees clockwise from north
/// within `[0, 360)`.
pub fn azimuth_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let from = point!(x: lon1, y: lat1);
    let to = point!(x: lon2, y: lat2);
    from.geodesic_bearing(to).rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_arc_minute_of_latitude_is_about_one_nm() {
        let d = distance_nm(45.0, 2.0, 45.0 + 1.0 / 60.0, 2.0);
        assert!((d - 1.0).abs() < 0.01, "got {d}");
    }

    #[test]
    fn same_point_is_zero_distance() {
        assert_eq!(distance_nm(48.6, 2.67, 48.6, 2.67), 0.0);
    }

    #[test]
    fn azimuth_is_aeronautical() {
        let north = azimuth_deg(48.0, 2.0, 48.1, 2.0);
        let east = azimuth_deg(0.0, 2.0, 0.0, 2.1);
        let west = azimuth_deg(0.0, 2.0, 0.0, 1.9);
        let north_west = azimuth_deg(48.0, 2.0, 48.05, 1.93);
        assert!(north < 0.5 || north > 359.5, "got {north}");
        assert!((east - 90.0).abs() < 0.5, "got {east}");
        assert!((west - 270.0).abs() < 0.5, "got {west}");
        assert!(north_west > 270.0 && north_west < 360.0, "got {north_west}");
    }
}
