use crate::flight_control::{
    common::math::lerp, error::GuidanceError, flight_computer::FlightComputer,
    telemetry::FlightSample,
};
use crate::event;
use itertools::Itertools;

/// Destination after travelling `distance` along a great circle.
///
/// # Arguments
/// - `latitude`, `longitude`: Start point in degrees.
/// - `bearing`: Initial compass bearing in degrees.
/// - `distance`: Surface distance in m.
/// - `radius`: Radius of the body in m.
///
/// # Returns
/// - `(latitude, longitude)` in degrees, longitude wrapped to `[-180, 180)`.
pub fn coords_down_bearing(
    latitude: f64,
    longitude: f64,
    bearing: f64,
    distance: f64,
    radius: f64,
) -> (f64, f64) {
    let lat1 = latitude.to_radians();
    let lon1 = longitude.to_radians();
    let theta = bearing.to_radians();
    let delta = distance / radius;

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
    let lon2 = lon1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());
    (lat2.to_degrees(), (lon2.to_degrees() + 180.0).rem_euclid(360.0) - 180.0)
}

/// `samples` points evenly spaced from `from` to `to`, both included.
#[allow(clippy::cast_precision_loss)]
pub fn track_points(from: (f64, f64), to: (f64, f64), samples: usize) -> Vec<(f64, f64)> {
    if samples < 2 {
        return vec![from];
    }
    let last = (samples - 1) as f64;
    (0..samples)
        .map(|i| {
            let t = i as f64 / last;
            (lerp(from.0, to.0, t), lerp(from.1, to.1, t))
        })
        .collect_vec()
}

/// Highest terrain along the projected ground track of a descent.
///
/// The vehicle holds retrograde while descending, so the track runs opposite to the heading
/// of its nose.
///
/// # Errors
/// - Any telemetry failure that outlasts the retry budget.
pub async fn track_peak(
    f_cont: &FlightComputer,
    flight: &FlightSample,
    ground_track: f64,
    radius: f64,
    samples: usize,
) -> Result<f64, GuidanceError> {
    let touchdown = coords_down_bearing(
        flight.latitude,
        flight.longitude,
        180.0 + flight.heading,
        ground_track,
        radius,
    );
    let mut peak = f64::NEG_INFINITY;
    for (lat, lon) in track_points((flight.latitude, flight.longitude), touchdown, samples) {
        peak = peak.max(f_cont.terrain_height(lat, lon).await?);
    }
    event!("Terrain peak along {ground_track:.0} m track: {peak:.1} m");
    Ok(peak)
}
