use crate::flight_control::{
    actuation::{Actuation, AttitudeTarget, NodeCommand, WarpCommand},
    common::math::G0,
    error::GuidanceError,
    telemetry::{NodeSample, TelemetrySample, VesselSample},
};
use crate::mission_params::{BurnParams, TaperPolicy};
use crate::phase;
use strum_macros::Display;

/// Steps of a single node execution.
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy)]
pub enum BurnPhase {
    /// Point along the burn vector and request the warp to ignition.
    Orient,
    /// Hold attitude until half the burn time before the node.
    AwaitIgnition,
    Burning,
    Complete,
}

/// Closed-loop executor for one maneuver node.
///
/// Every tick the burn time is predicted again from current mass and remaining delta-v, so the
/// executor never caches an estimate across samples.
#[derive(Debug, Clone)]
pub struct BurnExecutor {
    params: BurnParams,
    phase: BurnPhase,
}

impl BurnExecutor {
    /// Remaining delta-v at which a burn counts as complete, in m/s.
    pub const TOLERANCE: f64 = 0.1;

    pub fn new(params: BurnParams) -> Self { Self { params, phase: BurnPhase::Orient } }

    pub fn phase(&self) -> BurnPhase { self.phase }

    pub fn is_complete(&self) -> bool { self.phase == BurnPhase::Complete }

    /// Predicts the burn duration with the rocket equation.
    ///
    /// # Arguments
    /// - `mass`: Current vehicle mass, in kg.
    /// - `isp`: Specific impulse, in s.
    /// - `thrust`: Available thrust at full throttle, in N.
    /// - `delta_v`: Delta-v to apply, in m/s.
    ///
    /// # Errors
    /// - [`GuidanceError::NoThrustAvailable`] if `thrust` or `isp` is not positive.
    pub fn burn_time(mass: f64, isp: f64, thrust: f64, delta_v: f64) -> Result<f64, GuidanceError> {
        if thrust <= 0.0 || isp <= 0.0 || !thrust.is_finite() {
            return Err(GuidanceError::NoThrustAvailable);
        }
        if delta_v <= 0.0 {
            return Ok(0.0);
        }
        let exhaust = isp * G0;
        let final_mass = mass / (delta_v / exhaust).exp();
        Ok(((mass - final_mass) / (thrust / exhaust)).max(0.0))
    }

    /// Burn time of `delta_v` for the vessel as sampled.
    ///
    /// # Errors
    /// - [`GuidanceError::NoThrustAvailable`] if the vessel has no available thrust.
    pub fn vessel_burn_time(vessel: &VesselSample, delta_v: f64) -> Result<f64, GuidanceError> {
        Self::burn_time(vessel.mass, vessel.specific_impulse, vessel.available_thrust, delta_v)
    }

    /// Throttle for `remaining` m/s of delta-v left.
    ///
    /// Never increases as `remaining` shrinks and is exactly zero at or below
    /// [`TOLERANCE`](Self::TOLERANCE). Without thrust the burn keeps full throttle so a fresh
    /// stage can take over.
    pub fn taper_throttle(policy: TaperPolicy, vessel: &VesselSample, remaining: f64) -> f64 {
        if remaining <= Self::TOLERANCE {
            return 0.0;
        }
        match policy {
            TaperPolicy::HoldBurnTime { window, floor } => {
                match Self::vessel_burn_time(vessel, remaining) {
                    Ok(time) if time <= window => (time / window).clamp(floor, 1.0),
                    _ => 1.0,
                }
            }
            TaperPolicy::FixedFinal { band, throttle } => {
                if remaining < band { throttle } else { 1.0 }
            }
            TaperPolicy::TwrStepped => {
                // acceleration at full thrust, in m/s^2
                let twr = if vessel.mass > 0.0 { vessel.max_thrust / vessel.mass } else { 0.0 };
                if remaining < twr / 3.0 {
                    0.05
                } else if remaining < twr / 2.0 {
                    0.1
                } else if remaining < twr {
                    0.25
                } else {
                    1.0
                }
            }
        }
    }

    /// Advances the executor by one sample of the vehicle and the node.
    ///
    /// # Errors
    /// - [`GuidanceError::NoThrustAvailable`] if the burn is about to be planned or ignited
    ///   with zero available thrust.
    pub fn tick(
        &mut self,
        sample: &TelemetrySample,
        node: &NodeSample,
    ) -> Result<Actuation, GuidanceError> {
        let attitude = AttitudeTarget::Direction(node.remaining_direction);
        match self.phase {
            BurnPhase::Orient => {
                let burn_time = Self::vessel_burn_time(&sample.vessel, node.remaining_delta_v)?;
                let warp_until = node.node.epoch() - burn_time / 2.0 - self.params.lead_time;
                self.set_phase(BurnPhase::AwaitIgnition);
                let actuation = Actuation::cut().with_attitude(attitude);
                if warp_until > sample.ut {
                    return Ok(actuation.with_warp(WarpCommand::To(warp_until)));
                }
                Ok(actuation)
            }
            BurnPhase::AwaitIgnition => {
                let burn_time = Self::vessel_burn_time(&sample.vessel, node.remaining_delta_v)?;
                if node.node.epoch() - sample.ut > burn_time / 2.0 {
                    return Ok(Actuation::cut().with_attitude(attitude));
                }
                self.set_phase(BurnPhase::Burning);
                Ok(self.burn_tick(sample, node, attitude)?.with_warp(WarpCommand::Drop))
            }
            BurnPhase::Burning => self.burn_tick(sample, node, attitude),
            BurnPhase::Complete => Ok(Actuation::cut()),
        }
    }

    fn burn_tick(
        &mut self,
        sample: &TelemetrySample,
        node: &NodeSample,
        attitude: AttitudeTarget,
    ) -> Result<Actuation, GuidanceError> {
        if node.remaining_delta_v <= Self::TOLERANCE {
            self.set_phase(BurnPhase::Complete);
            return Ok(Actuation::cut().with_node(NodeCommand::RemoveNext));
        }
        let throttle =
            Self::taper_throttle(self.params.taper, &sample.vessel, node.remaining_delta_v);
        Ok(Actuation::hold().with_throttle(throttle).with_attitude(attitude))
    }

    fn set_phase(&mut self, to: BurnPhase) {
        phase!("Burn {} -> {to}", self.phase);
        self.phase = to;
    }
}
