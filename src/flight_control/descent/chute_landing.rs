use crate::flight_control::{
    actuation::{Actuation, AttitudeTarget, WarpCommand},
    error::GuidanceError,
    flight_phase::{ChuteLandingPhase, FlightPhase},
    telemetry::{StageResources, TelemetrySample},
};
use crate::mission_params::ChuteLandingParams;
use crate::{info, log};

/// Deorbit and unpowered return through an atmosphere.
///
/// After a fixed deceleration burn in the upper atmosphere, stages are dropped one per tick
/// until the stage that would separate next carries parachutes. That stage fires once the
/// vehicle sinks below the chute altitude.
#[derive(Debug, Clone)]
pub struct ChuteLandingGuidance {
    params: ChuteLandingParams,
    phase: ChuteLandingPhase,
    burn_started: Option<f64>,
}

impl ChuteLandingGuidance {
    pub fn new(params: ChuteLandingParams) -> Self {
        Self { params, phase: ChuteLandingPhase::DeorbitBurn, burn_started: None }
    }

    pub fn phase(&self) -> ChuteLandingPhase { self.phase }

    pub fn is_complete(&self) -> bool { self.phase.is_terminal() }

    /// Whether the next tick needs the resources of the stage that would separate next.
    pub fn wants_resources(&self) -> bool { self.phase == ChuteLandingPhase::Destage }

    /// Altitude at which the coast ends for a body with the given atmosphere depth.
    pub fn destage_altitude(&self, atmosphere_depth: f64) -> f64 {
        atmosphere_depth * self.params.destage_fraction
    }

    /// Maps one sample to this tick's actuation and moves the phase forward.
    ///
    /// # Errors
    /// - [`GuidanceError::NoAtmosphere`] if the orbited body has no atmosphere.
    /// - [`GuidanceError::NoParachutes`] if the last stage is reached without parachutes.
    /// - [`GuidanceError::IllegalTransition`] if called after the parachutes fired.
    pub fn tick(
        &mut self,
        sample: &TelemetrySample,
        resources: Option<&StageResources>,
    ) -> Result<Actuation, GuidanceError> {
        let retrograde = AttitudeTarget::Retrograde;
        let orbit = &sample.orbit;
        match self.phase {
            ChuteLandingPhase::DeorbitBurn => {
                if orbit.body().atmosphere_depth <= 0.0 {
                    return Err(GuidanceError::NoAtmosphere);
                }
                if orbit.periapsis_altitude() > self.params.target_periapsis {
                    return Ok(Actuation::hold()
                        .with_throttle(self.params.deorbit_throttle)
                        .with_attitude(retrograde));
                }
                log!("Deorbit done, periapsis at {:.0} m", orbit.periapsis_altitude());
                self.enter(ChuteLandingPhase::Coast)?;
                // the warp is cut short once the vehicle is in the upper atmosphere
                let periapsis_at = sample.ut + orbit.time_to_periapsis();
                Ok(Actuation::cut()
                    .with_attitude(retrograde)
                    .with_warp(WarpCommand::To(periapsis_at)))
            }
            ChuteLandingPhase::Coast => {
                let destage_altitude = self.destage_altitude(orbit.body().atmosphere_depth);
                if sample.flight.mean_altitude >= destage_altitude {
                    return Ok(Actuation::hold());
                }
                self.enter(ChuteLandingPhase::Deceleration)?;
                self.burn_started = Some(sample.ut);
                Ok(Actuation::hold()
                    .with_throttle(1.0)
                    .with_attitude(retrograde)
                    .with_warp(WarpCommand::Drop))
            }
            ChuteLandingPhase::Deceleration => {
                let started = *self.burn_started.get_or_insert(sample.ut);
                if sample.ut - started < self.params.deceleration_burn {
                    return Ok(Actuation::hold().with_throttle(1.0).with_attitude(retrograde));
                }
                self.enter(ChuteLandingPhase::Destage)?;
                Ok(Actuation::cut().with_attitude(retrograde))
            }
            ChuteLandingPhase::Destage => {
                let Some(resources) = resources else {
                    return Ok(Actuation::cut());
                };
                if resources.undeployed_chutes {
                    info!("Parachutes in the next stage");
                    self.enter(ChuteLandingPhase::AwaitChutes)?;
                    return Ok(Actuation::cut().with_attitude(retrograde));
                }
                if sample.vessel.current_stage <= 0 {
                    return Err(GuidanceError::NoParachutes);
                }
                log!("Dropping stage {} for landing", sample.vessel.current_stage);
                Ok(Actuation::cut().with_attitude(retrograde).with_stage())
            }
            ChuteLandingPhase::AwaitChutes => {
                if sample.flight.mean_altitude >= self.params.chute_altitude {
                    return Ok(Actuation::hold().with_attitude(retrograde));
                }
                info!("Firing parachutes at {:.0} m", sample.flight.mean_altitude);
                self.enter(ChuteLandingPhase::ChutesOut)?;
                Ok(Actuation::hold().with_stage())
            }
            ChuteLandingPhase::ChutesOut => Err(GuidanceError::IllegalTransition),
        }
    }

    fn enter(&mut self, to: ChuteLandingPhase) -> Result<(), GuidanceError> {
        ChuteLandingPhase::advance(&mut self.phase, to)
    }
}
