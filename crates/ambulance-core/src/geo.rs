//! Great-circle distance and straight-line stepping between coordinates.
//!
//! Distances use the haversine formula on a sphere of radius
//! [`EARTH_RADIUS_KM`]. Stepping works directly in degree space: the
//! `(dlat, dlng)` vector is normalized and scaled by the step size. That is
//! a planar approximation and only holds over city-scale distances.

use ambulance_types::Location;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance in kilometres below which a mover counts as arrived.
pub const DEFAULT_ARRIVAL_EPSILON_KM: f64 = 0.0001;

/// Great-circle distance between two locations in kilometres.
///
/// Symmetric in its arguments and exactly zero for identical coordinates.
pub fn distance_km(a: Location, b: Location) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlng = (dlng * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlng * sin_dlng;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Move `current` by `step_degrees` along the straight line to `target`.
///
/// Returns `target` exactly when the remaining distance is under
/// `arrival_epsilon_km` or when the step would reach or pass the target, so
/// a mover never oscillates around its destination.
pub fn step_toward(
    current: Location,
    target: Location,
    step_degrees: f64,
    arrival_epsilon_km: f64,
) -> Location {
    if distance_km(current, target) < arrival_epsilon_km {
        return target;
    }

    let dlat = target.lat - current.lat;
    let dlng = target.lng - current.lng;
    let span = dlat.hypot(dlng);
    if span <= step_degrees {
        return target;
    }

    Location::new(
        current.lat + dlat / span * step_degrees,
        current.lng + dlng / span * step_degrees,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn mangalore() -> Location {
        Location::new(12.3456, 74.5678)
    }

    #[test]
    fn distance_is_zero_for_identical_points() {
        assert!(distance_km(mangalore(), mangalore()).abs() < f64::EPSILON);
    }

    #[test]
    fn distance_is_positive_for_distinct_points() {
        let b = Location::new(12.3456, 74.5679);
        assert!(distance_km(mangalore(), b) > 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = mangalore();
        let b = Location::new(12.37, 74.56);
        assert!((distance_km(a, b) - distance_km(b, a)).abs() < EPS);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance_km(Location::new(0.0, 0.0), Location::new(1.0, 0.0));
        assert!((d - 111.195).abs() < 0.01, "got {d}");
    }

    #[test]
    fn triangle_inequality_holds() {
        let a = mangalore();
        let b = Location::new(12.40, 74.60);
        let c = Location::new(12.30, 74.50);
        assert!(distance_km(a, c) <= distance_km(a, b) + distance_km(b, c) + EPS);
        assert!(distance_km(a, b) <= distance_km(a, c) + distance_km(c, b) + EPS);
    }

    #[test]
    fn step_moves_exactly_one_step_along_the_line() {
        let start = mangalore();
        let target = Location::new(12.3556, 74.5678);
        let next = step_toward(start, target, 0.0005, DEFAULT_ARRIVAL_EPSILON_KM);
        assert!((next.lat - 12.3461).abs() < EPS);
        assert!((next.lng - 74.5678).abs() < EPS);
    }

    #[test]
    fn step_direction_is_normalized() {
        let start = Location::new(0.0, 0.0);
        let target = Location::new(3.0, 4.0);
        let next = step_toward(start, target, 0.5, DEFAULT_ARRIVAL_EPSILON_KM);
        assert!((next.lat - 0.3).abs() < EPS);
        assert!((next.lng - 0.4).abs() < EPS);
    }

    #[test]
    fn step_snaps_when_within_one_step() {
        let start = mangalore();
        let target = Location::new(12.3456, 74.5679);
        assert_eq!(
            step_toward(start, target, 0.0005, DEFAULT_ARRIVAL_EPSILON_KM),
            target
        );
    }

    #[test]
    fn step_snaps_when_within_epsilon() {
        let target = mangalore();
        let start = Location::new(target.lat + 1e-10, target.lng);
        assert_eq!(
            step_toward(start, target, 0.0005, DEFAULT_ARRIVAL_EPSILON_KM),
            target
        );
    }

    #[test]
    fn repeated_steps_converge() {
        let target = Location::new(12.3500, 74.5900);
        let mut here = mangalore();
        let mut steps = 0_u32;
        while here != target {
            here = step_toward(here, target, 0.0005, DEFAULT_ARRIVAL_EPSILON_KM);
            steps += 1;
            assert!(steps < 1_000, "did not converge");
        }
        assert!(steps > 1);
    }
}
