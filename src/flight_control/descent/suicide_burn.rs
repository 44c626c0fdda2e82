use crate::flight_control::{
    common::math::larger_quadratic_root, error::GuidanceError, telemetry::TelemetrySample,
};

/// Prediction of when a full-deceleration burn has to start to stop at a safety altitude.
///
/// An estimate is only valid for the sample it was computed from and is rebuilt every tick.
/// If the current trajectory does not intersect the surface every time field is infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuicideBurnEstimate {
    /// Universal time of the sample the estimate was computed from.
    pub computed_at: f64,
    /// Epoch of the orbit snapshot in that sample.
    pub orbit_epoch: f64,
    pub ignition_time: f64,
    pub burn_duration: f64,
    /// Surface distance covered until the vehicle stops, in m.
    pub ground_track: f64,
    /// Net deceleration along the flight path, in m/s^2.
    pub effective_deceleration: f64,
    /// Altitude above sea level the burn stops at.
    pub target_altitude: f64,
    pub impact_time: f64,
}

impl SuicideBurnEstimate {
    /// Sentinel for trajectories that never reach the surface, taking `computed_at` as the
    /// orbit epoch too.
    pub fn undefined(computed_at: f64, target_altitude: f64) -> Self {
        Self {
            computed_at,
            orbit_epoch: computed_at,
            ignition_time: f64::INFINITY,
            burn_duration: f64::INFINITY,
            ground_track: f64::INFINITY,
            effective_deceleration: f64::INFINITY,
            target_altitude,
            impact_time: f64::INFINITY,
        }
    }

    pub fn is_defined(&self) -> bool { self.ignition_time.is_finite() }

    /// Seconds until ignition, negative once the burn is overdue.
    pub fn countdown(&self, ut: f64) -> f64 { self.ignition_time - ut }

    /// Checks that the estimate still describes the telemetry in `sample`.
    ///
    /// # Errors
    /// - [`GuidanceError::StaleEstimate`] if `sample` was taken later than the estimate's
    ///   sample or carries a newer orbit snapshot.
    pub fn ensure_fresh(&self, sample: &TelemetrySample) -> Result<(), GuidanceError> {
        if sample.ut > self.computed_at || sample.orbit.epoch() > self.orbit_epoch {
            Err(GuidanceError::StaleEstimate)
        } else {
            Ok(())
        }
    }

    /// Largest deceleration along a flight path dipping `sine` below the horizon.
    ///
    /// Solves `x^2 + 2*g*sine*x - (a^2 - g^2) = 0` for the larger root, i.e. the thrust vector
    /// that leaves exactly `x` along the path after gravity took its share.
    pub fn effective_deceleration(thrust_accel: f64, gravity: f64, sine: f64) -> Option<f64> {
        let decel = larger_quadratic_root(
            1.0,
            2.0 * gravity * sine,
            -(thrust_accel * thrust_accel - gravity * gravity),
        )?;
        (decel > 0.0).then_some(decel)
    }

    /// Estimates the burn for the trajectory in `sample`.
    ///
    /// # Arguments
    /// - `sample`: The latest telemetry.
    /// - `target_altitude`: Altitude above sea level the burn should stop at.
    /// - `throttle`: Throttle share the burn is planned with, the rest is overrun margin.
    pub fn compute(sample: &TelemetrySample, target_altitude: f64, throttle: f64) -> Self {
        Self { orbit_epoch: sample.orbit.epoch(), ..Self::solve(sample, target_altitude, throttle) }
    }

    fn solve(sample: &TelemetrySample, target_altitude: f64, throttle: f64) -> Self {
        let orbit = &sample.orbit;
        let ut = sample.ut;
        if orbit.validate().is_err() || orbit.periapsis_altitude() > 0.0 {
            return Self::undefined(ut, target_altitude);
        }
        let vessel = &sample.vessel;
        let speed = sample.flight.speed;
        let gravity = orbit.body().surface_gravity;
        let thrust_accel =
            if vessel.mass > 0.0 { throttle * vessel.max_thrust / vessel.mass } else { 0.0 };

        let Some(decel) =
            Self::effective_deceleration(thrust_accel, gravity, sample.flight.descent_sine())
        else {
            // cannot out-thrust gravity, start now and hope for the next stage
            return Self::immediate(ut, target_altitude, speed, 0.0);
        };
        let burn_duration = speed / decel;

        let radius = orbit.equatorial_radius() + target_altitude;
        if orbit.radius_at_true_anomaly(orbit.true_anomaly_at(ut)) < radius {
            return Self::immediate(ut, target_altitude, speed, decel);
        }
        let impact = orbit.true_anomaly_at_radius(radius).and_then(|nu| orbit.ut_at_true_anomaly(-nu));
        let Some(impact_time) = impact else {
            return Self::immediate(ut, target_altitude, speed, decel);
        };
        let ignition_time = impact_time - burn_duration / 2.0;
        Self {
            computed_at: ut,
            orbit_epoch: ut,
            ignition_time,
            burn_duration,
            ground_track: (ignition_time - ut).max(0.0) * speed + 0.5 * speed * burn_duration,
            effective_deceleration: decel,
            target_altitude,
            impact_time,
        }
    }

    fn immediate(ut: f64, target_altitude: f64, speed: f64, decel: f64) -> Self {
        let burn_duration = if decel > 0.0 { speed / decel } else { f64::INFINITY };
        Self {
            computed_at: ut,
            orbit_epoch: ut,
            ignition_time: ut,
            burn_duration,
            ground_track: if burn_duration.is_finite() { 0.5 * speed * burn_duration } else { 0.0 },
            effective_deceleration: decel,
            target_altitude,
            impact_time: ut,
        }
    }
}
