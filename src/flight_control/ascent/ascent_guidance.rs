use crate::flight_control::{
    actuation::{Actuation, AttitudeTarget, NodeCommand, WarpCommand},
    autostage::AutostagePolicy,
    error::GuidanceError,
    flight_phase::{AscentPhase, FlightPhase},
    orbit::OrbitalMechanics,
    pid::{PidController, PidGains},
    telemetry::{StageResources, TelemetrySample},
};
use crate::mission_params::{AscentParams, StagingParams};
use crate::{info, log};

/// Launch-to-orbit state machine.
///
/// The machine only maps samples to actuation; the runner in
/// [`run_ascent`](super::run_ascent) owns the sample loop and the circularization burn.
#[derive(Debug, Clone)]
pub struct AscentGuidance {
    params: AscentParams,
    autostage: Option<AutostagePolicy>,
    phase: AscentPhase,
    heading: f64,
    /// Throttle loop on dynamic pressure, alive during the gravity turn only.
    q_pid: Option<PidController>,
}

impl AscentGuidance {
    pub fn new(params: AscentParams, staging: &StagingParams) -> Self {
        let heading = OrbitalMechanics::inc_to_heading(params.inclination);
        let autostage = staging.enabled.then(|| AutostagePolicy::from_params(staging));
        Self { params, autostage, phase: AscentPhase::Prelaunch, heading, q_pid: None }
    }

    pub fn phase(&self) -> AscentPhase { self.phase }

    pub fn heading(&self) -> f64 { self.heading }

    pub fn is_done(&self) -> bool { self.phase.is_terminal() }

    /// Whether the current phase wants stage resources with the next sample.
    pub fn wants_resources(&self) -> bool {
        self.autostage.is_some()
            && matches!(self.phase, AscentPhase::GravityTurn | AscentPhase::ApoapsisTrim)
    }

    /// Ease-out quadratic pitch profile in degrees, 90 on the pad and 0 at `turn_finish`.
    pub fn gravity_turn_pitch(altitude: f64, turn_finish: f64) -> f64 {
        let p = (altitude / turn_finish).clamp(0.0, 1.0);
        90.0 - (-90.0 * p * (p - 2.0))
    }

    /// Maps one sample to this tick's actuation and moves the phase forward.
    ///
    /// # Errors
    /// - [`GuidanceError::DegenerateOrbit`] if the circularization node cannot be planned.
    /// - [`GuidanceError::IllegalTransition`] if called after the ascent finished.
    pub fn tick(
        &mut self,
        sample: &TelemetrySample,
        resources: Option<&StageResources>,
    ) -> Result<Actuation, GuidanceError> {
        let apoapsis = sample.orbit.apoapsis_altitude();
        let target = self.params.target_altitude;
        match self.phase {
            AscentPhase::Prelaunch => {
                let gains = PidGains { integral_clamp: self.params.max_q, ..self.params.q_pid };
                self.q_pid = Some(PidController::with_setpoint(gains, self.params.max_q, sample.ut));
                self.enter(AscentPhase::GravityTurn)?;
                info!("Launch, heading {:.1}", self.heading);
                Ok(Actuation::hold().with_throttle(1.0).with_attitude(self.pitch_heading(90.0)))
            }
            AscentPhase::GravityTurn => {
                if apoapsis >= self.params.trim_fraction * target {
                    self.q_pid = None;
                    self.enter(AscentPhase::ApoapsisTrim)?;
                    return Ok(Actuation::cut()
                        .with_attitude(AttitudeTarget::Prograde)
                        .with_warp(WarpCommand::Drop));
                }
                let pitch = Self::gravity_turn_pitch(
                    sample.flight.mean_altitude,
                    self.params.turn_finish_altitude,
                );
                let throttle = self.q_pid.as_mut().map_or(1.0, |pid| {
                    pid.update(sample.flight.dynamic_pressure, sample.ut)
                });
                let actuation =
                    Actuation::hold().with_throttle(throttle).with_attitude(self.pitch_heading(pitch));
                Ok(self.with_staging(actuation, sample, resources))
            }
            AscentPhase::ApoapsisTrim => {
                if apoapsis >= target {
                    self.enter(AscentPhase::Coast)?;
                    return Ok(Actuation::cut().with_attitude(AttitudeTarget::Prograde));
                }
                let actuation = Actuation::hold()
                    .with_throttle(self.params.trim_throttle)
                    .with_attitude(AttitudeTarget::Prograde)
                    .with_warp(WarpCommand::Drop);
                Ok(self.with_staging(actuation, sample, resources))
            }
            AscentPhase::Coast => {
                let atmosphere = sample.orbit.body().atmosphere_depth;
                if sample.flight.mean_altitude >= atmosphere {
                    let node = OrbitalMechanics::circularization(&sample.orbit, true)?;
                    self.enter(AscentPhase::Circularize)?;
                    return Ok(Actuation::cut()
                        .with_warp(WarpCommand::Drop)
                        .with_node(NodeCommand::Add(node)));
                }
                if apoapsis < target {
                    log!("Apoapsis decayed to {apoapsis:.0} m, trimming again");
                    self.enter(AscentPhase::ApoapsisTrim)?;
                    return Ok(Actuation::cut()
                        .with_attitude(AttitudeTarget::Prograde)
                        .with_warp(WarpCommand::Drop));
                }
                Ok(Actuation::cut()
                    .with_attitude(AttitudeTarget::Prograde)
                    .with_warp(WarpCommand::Physics(self.params.max_physics_warp)))
            }
            AscentPhase::Circularize => Ok(Actuation::hold()),
            AscentPhase::Done => Err(GuidanceError::IllegalTransition),
        }
    }

    /// Marks the circularization burn as executed.
    ///
    /// # Errors
    /// - [`GuidanceError::IllegalTransition`] unless the machine is circularizing.
    pub fn finish(&mut self) -> Result<Actuation, GuidanceError> {
        self.enter(AscentPhase::Done)?;
        let actuation = Actuation::cut();
        Ok(if self.params.deploy_solar { actuation.with_solar_deploy() } else { actuation })
    }

    fn pitch_heading(&self, pitch: f64) -> AttitudeTarget {
        AttitudeTarget::PitchHeading {
            pitch,
            heading: self.heading,
            roll: self.params.force_roll.then_some(self.params.roll),
        }
    }

    fn with_staging(
        &self,
        actuation: Actuation,
        sample: &TelemetrySample,
        resources: Option<&StageResources>,
    ) -> Actuation {
        match (&self.autostage, resources) {
            (Some(policy), Some(res)) if policy.should_stage(res, sample.vessel.current_stage) => {
                actuation.with_stage()
            }
            _ => actuation,
        }
    }

    fn enter(&mut self, to: AscentPhase) -> Result<(), GuidanceError> {
        AscentPhase::advance(&mut self.phase, to)
    }
}
