use super::{BurnVector, ManeuverNode, OrbitState};
use crate::flight_control::{
    common::{math::wrap_pi, vec3d::Vec3D},
    error::GuidanceError,
};
use std::f64::consts::{PI, SQRT_2};

/// Epoch and separation of the closest approach between two orbits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestApproach {
    pub epoch: f64,
    pub distance: f64,
}

/// Stateless vis-viva and Kepler calculators.
///
/// Every calculator takes read-only snapshots and returns a [`ManeuverNode`] with delta-v in
/// the `(prograde, normal, radial)` basis and an absolute execution epoch.
pub struct OrbitalMechanics;

impl OrbitalMechanics {
    /// Coarse step of the departure-epoch search, in s.
    const PHASE_COARSE_STEP: f64 = 10.0;
    /// Phase error accepted by the coarse pass, in rad.
    const PHASE_COARSE_TOL: f64 = 0.01;
    /// Fine step of the departure-epoch search, in s.
    const PHASE_FINE_STEP: f64 = 1.0;
    /// Phase error accepted by the fine pass, in rad.
    const PHASE_FINE_TOL: f64 = 0.001;
    /// Upper bound for the number of coarse steps of any scan.
    const MAX_SCAN_STEPS: usize = 200_000;
    /// Coarse step of the closest-approach scan, in s.
    const APPROACH_COARSE_STEP: f64 = 10.0;
    /// Fine step of the closest-approach scan, in s.
    const APPROACH_FINE_STEP: f64 = 0.5;
    /// Default divisor turning separation into a closing speed.
    pub const CLOSING_DIVISOR: f64 = 200.0;

    /// Circularizes at the next apoapsis (or periapsis).
    ///
    /// # Errors
    /// - [`GuidanceError::DegenerateOrbit`] if the orbit has no apsides.
    pub fn circularization(
        orbit: &OrbitState,
        at_apoapsis: bool,
    ) -> Result<ManeuverNode, GuidanceError> {
        orbit.validate()?;
        let (radius, dt) = if at_apoapsis {
            (orbit.apoapsis(), orbit.time_to_apoapsis())
        } else {
            (orbit.periapsis(), orbit.time_to_periapsis())
        };
        let v_now = orbit.speed_at_radius(radius);
        let v_circ = (orbit.gravitational_parameter() / radius).sqrt();
        Ok(ManeuverNode::new(
            orbit.epoch() + dt,
            BurnVector::prograde_only(v_circ - v_now),
        ))
    }

    /// Raises or lowers the apoapsis to `altitude` with a prograde burn at periapsis.
    ///
    /// # Errors
    /// - [`GuidanceError::DegenerateOrbit`] if the orbit has no apsides.
    pub fn change_apoapsis(
        orbit: &OrbitState,
        altitude: f64,
    ) -> Result<ManeuverNode, GuidanceError> {
        orbit.validate()?;
        let burn_radius = orbit.periapsis();
        let new_sma = (burn_radius + orbit.equatorial_radius() + altitude) / 2.0;
        let dv = Self::vis_viva(orbit, burn_radius, new_sma) - orbit.speed_at_radius(burn_radius);
        Ok(ManeuverNode::new(
            orbit.epoch() + orbit.time_to_periapsis(),
            BurnVector::prograde_only(dv),
        ))
    }

    /// Raises or lowers the periapsis to `altitude` with a prograde burn at apoapsis.
    ///
    /// # Errors
    /// - [`GuidanceError::DegenerateOrbit`] if the orbit has no apsides.
    pub fn change_periapsis(
        orbit: &OrbitState,
        altitude: f64,
    ) -> Result<ManeuverNode, GuidanceError> {
        orbit.validate()?;
        let burn_radius = orbit.apoapsis();
        let new_sma = (burn_radius + orbit.equatorial_radius() + altitude) / 2.0;
        let dv = Self::vis_viva(orbit, burn_radius, new_sma) - orbit.speed_at_radius(burn_radius);
        Ok(ManeuverNode::new(
            orbit.epoch() + orbit.time_to_apoapsis(),
            BurnVector::prograde_only(dv),
        ))
    }

    /// Changes the semi-major axis to `sma` with a prograde burn at universal time `epoch`.
    ///
    /// # Errors
    /// - [`GuidanceError::DegenerateOrbit`] if the orbit has no apsides or `sma` is not
    ///   positive.
    pub fn change_sma(
        orbit: &OrbitState,
        sma: f64,
        epoch: f64,
    ) -> Result<ManeuverNode, GuidanceError> {
        orbit.validate()?;
        if sma <= 0.0 || !sma.is_finite() {
            return Err(GuidanceError::DegenerateOrbit);
        }
        let radius = orbit.position_at(epoch).abs();
        let dv = Self::vis_viva(orbit, radius, sma) - orbit.speed_at_radius(radius);
        Ok(ManeuverNode::new(epoch, BurnVector::prograde_only(dv)))
    }

    /// Lead angle of the target at departure for a Hohmann transfer from radius `r1` to `r2`,
    /// in rad.
    pub fn transfer_angle(r1: f64, r2: f64) -> f64 {
        PI * (1.0 - (1.0 / (2.0 * SQRT_2)) * (r1 / r2 + 1.0).powi(3).sqrt())
    }

    /// Signed angle from the vessel's position to the target's at `ut`, measured around the
    /// vessel's orbit normal, in `(-pi, pi]`.
    pub fn phase_angle(vessel: &OrbitState, target: &OrbitState, ut: f64) -> f64 {
        let r_v = vessel.position_at(ut);
        let r_t = target.position_at(ut);
        let sin = r_v.cross(r_t).dot(vessel.normal());
        wrap_pi(sin.atan2(r_v.dot(r_t)))
    }

    /// Plans the departure burn of a Hohmann transfer onto `target`'s orbit.
    ///
    /// The departure epoch is found by scanning forward from the snapshot epoch in coarse steps
    /// until the phase error drops below the coarse tolerance, then refining around that epoch
    /// in fine steps until the fine tolerance holds.
    ///
    /// # Errors
    /// - [`GuidanceError::DegenerateOrbit`] if either orbit has no apsides.
    /// - [`GuidanceError::NoTransferWindow`] if the phase never lines up within one synodic
    ///   period.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn hohmann_transfer(
        vessel: &OrbitState,
        target: &OrbitState,
    ) -> Result<ManeuverNode, GuidanceError> {
        vessel.validate()?;
        target.validate()?;
        let r2 = target.semi_major_axis();
        let lead = Self::transfer_angle(vessel.semi_major_axis(), r2);
        let error_at = |ut: f64| wrap_pi(Self::phase_angle(vessel, target, ut) - lead).abs();

        let start = vessel.epoch();
        let horizon = Self::synodic_period(vessel, target) + vessel.period();
        let coarse_steps =
            ((horizon / Self::PHASE_COARSE_STEP).ceil() as usize).min(Self::MAX_SCAN_STEPS);
        let coarse = (0..=coarse_steps)
            .map(|i| start + i as f64 * Self::PHASE_COARSE_STEP)
            .find(|ut| error_at(*ut) < Self::PHASE_COARSE_TOL)
            .ok_or(GuidanceError::NoTransferWindow)?;

        let fine_start = (coarse - Self::PHASE_COARSE_STEP).max(start);
        let fine_steps = (2.0 * Self::PHASE_COARSE_STEP / Self::PHASE_FINE_STEP) as usize;
        let fine_epochs = (0..=fine_steps).map(|i| fine_start + i as f64 * Self::PHASE_FINE_STEP);
        let departure = fine_epochs
            .clone()
            .find(|ut| error_at(*ut) < Self::PHASE_FINE_TOL)
            .or_else(|| fine_epochs.min_by(|a, b| error_at(*a).total_cmp(&error_at(*b))))
            .unwrap_or(coarse);

        let r1 = vessel.position_at(departure).abs();
        let transfer_sma = (r1 + r2) / 2.0;
        let dv = Self::vis_viva(vessel, r1, transfer_sma) - vessel.speed_at_radius(r1);
        Ok(ManeuverNode::new(departure, BurnVector::prograde_only(dv)))
    }

    /// Rotates the orbital plane into `target`'s plane at the sooner of the two relative nodes.
    ///
    /// Returns a zero burn at the snapshot epoch if the planes already coincide.
    ///
    /// # Errors
    /// - [`GuidanceError::DegenerateOrbit`] if either orbit has no apsides.
    pub fn plane_change(
        vessel: &OrbitState,
        target: &OrbitState,
    ) -> Result<ManeuverNode, GuidanceError> {
        vessel.validate()?;
        target.validate()?;
        let Some((ascending, descending)) = vessel.relative_nodes(target) else {
            return Ok(ManeuverNode::new(vessel.epoch(), BurnVector::default()));
        };
        let to_an = vessel.time_to_true_anomaly(ascending).ok_or(GuidanceError::DegenerateOrbit)?;
        let to_dn =
            vessel.time_to_true_anomaly(descending).ok_or(GuidanceError::DegenerateOrbit)?;
        let (dt, nu, sign) =
            if to_an <= to_dn { (to_an, ascending, -1.0) } else { (to_dn, descending, 1.0) };

        let delta_i = vessel.relative_inclination(target);
        let speed = vessel.speed_at_radius(vessel.radius_at_true_anomaly(nu));
        let burn = BurnVector::new(speed * delta_i.cos() - speed, sign * speed * delta_i.sin(), 0.0);
        Ok(ManeuverNode::new(vessel.epoch() + dt, burn))
    }

    /// Finds the epoch of minimum separation in `[from, from + window]`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn closest_approach(
        vessel: &OrbitState,
        target: &OrbitState,
        from: f64,
        window: f64,
    ) -> ClosestApproach {
        let separation = |ut: f64| vessel.position_at(ut).euclid_distance(&target.position_at(ut));
        let scan = |start: f64, step: f64, steps: usize| {
            (0..=steps)
                .map(|i| start + i as f64 * step)
                .map(|ut| ClosestApproach { epoch: ut, distance: separation(ut) })
                .min_by(|a, b| a.distance.total_cmp(&b.distance))
                .unwrap_or(ClosestApproach { epoch: start, distance: separation(start) })
        };
        let steps = ((window.max(0.0) / Self::APPROACH_COARSE_STEP).ceil() as usize)
            .min(Self::MAX_SCAN_STEPS);
        let coarse = scan(from, Self::APPROACH_COARSE_STEP, steps);
        let fine_start = (coarse.epoch - Self::APPROACH_COARSE_STEP).max(from);
        let fine_steps = (2.0 * Self::APPROACH_COARSE_STEP / Self::APPROACH_FINE_STEP) as usize;
        scan(fine_start, Self::APPROACH_FINE_STEP, fine_steps)
    }

    /// Nulls the velocity relative to `target` at `epoch`.
    pub fn match_velocity_node(
        vessel: &OrbitState,
        target: &OrbitState,
        epoch: f64,
    ) -> ManeuverNode {
        let dv = target.velocity_at(epoch) - vessel.velocity_at(epoch);
        ManeuverNode::new(
            epoch,
            BurnVector::from_inertial(dv, vessel.maneuver_basis_at(epoch)),
        )
    }

    /// Sets up a closing velocity of `separation / divisor` towards `target` at `epoch`.
    pub fn closing_node(
        vessel: &OrbitState,
        target: &OrbitState,
        epoch: f64,
        divisor: f64,
    ) -> ManeuverNode {
        let offset = target.position_at(epoch) - vessel.position_at(epoch);
        let closing: Vec3D<f64> = offset.normalize() * (offset.abs() / divisor);
        let dv = target.velocity_at(epoch) + closing - vessel.velocity_at(epoch);
        ManeuverNode::new(
            epoch,
            BurnVector::from_inertial(dv, vessel.maneuver_basis_at(epoch)),
        )
    }

    /// Converts a target inclination in degrees to a launch heading in degrees.
    ///
    /// Only valid for launches from the equator. Inclinations outside `[-180, 180]` fall back
    /// to an equatorial (due east) heading.
    pub fn inc_to_heading(inclination: f64) -> f64 {
        if !(-180.0..=180.0).contains(&inclination) {
            return 90.0;
        }
        let heading = 90.0 - inclination;
        if heading < 0.0 { heading + 360.0 } else { heading }
    }

    /// Time between two successive identical phase configurations.
    fn synodic_period(vessel: &OrbitState, target: &OrbitState) -> f64 {
        let rate = (1.0 / vessel.period() - 1.0 / target.period()).abs();
        if rate <= f64::EPSILON { vessel.period() } else { 1.0 / rate }
    }

    fn vis_viva(orbit: &OrbitState, radius: f64, sma: f64) -> f64 {
        (orbit.gravitational_parameter() * (2.0 / radius - 1.0 / sma)).sqrt()
    }
}
