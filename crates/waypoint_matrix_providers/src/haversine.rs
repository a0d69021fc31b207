use crate::travel_matrices::TravelMatrices;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

pub fn haversine_distance_meters(from: geo_types::Point, to: geo_types::Point) -> f64 {
    let lat1_rad = from.y().to_radians();
    let lon1_rad = from.x().to_radians();
    let lat2_rad = to.y().to_radians();
    let lon2_rad = to.x().to_radians();

    let delta_lat = lat2_rad - lat1_rad;
    let delta_lon = lon2_rad - lon1_rad;

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Straight-line matrices at an assumed average speed. This is the degraded
/// fallback when the live provider is unavailable, and the backing of the
/// `Haversine` provider variant.
pub fn haversine_matrices(points: &[geo_types::Point], speed_kmh: f64) -> TravelMatrices {
    let num_points = points.len();
    let speed_ms = speed_kmh / 3.6;

    let mut distances: Vec<f64> = vec![0.0; num_points * num_points];
    let mut durations: Vec<f64> = vec![0.0; num_points * num_points];

    for (i, &from) in points.iter().enumerate() {
        for (j, &to) in points.iter().enumerate() {
            let distance = haversine_distance_meters(from, to);
            distances[i * num_points + j] = distance;
            durations[i * num_points + j] = distance / speed_ms;
        }
    }

    TravelMatrices::new(num_points, distances, durations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric() {
        let points = vec![
            geo_types::Point::new(4.3517, 50.8503),
            geo_types::Point::new(4.4025, 51.2194),
            geo_types::Point::new(3.7174, 51.0543),
        ];

        let matrices = haversine_matrices(&points, 60.0);

        for i in 0..points.len() {
            assert_eq!(matrices.distance_meters(i, i), 0.0);
            for j in 0..points.len() {
                let forward = matrices.distance_meters(i, j);
                let backward = matrices.distance_meters(j, i);
                assert!((forward - backward).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_duration_from_speed() {
        let points = vec![
            geo_types::Point::new(4.35, 50.85),
            geo_types::Point::new(4.40, 50.85),
        ];

        let matrices = haversine_matrices(&points, 36.0);

        // 36 km/h is 10 m/s
        let expected = matrices.distance_meters(0, 1) / 10.0;
        assert!((matrices.duration_seconds(0, 1) - expected).abs() < 1e-9);
    }
}
