use super::SuicideBurnEstimate;
use crate::flight_control::{
    actuation::{Actuation, AttitudeTarget, WarpCommand},
    error::GuidanceError,
    flight_phase::{DescentPhase, FlightPhase},
    pid::PidController,
    telemetry::TelemetrySample,
};
use crate::mission_params::{BurnPass, DescentParams, SafeAltitude};
use crate::{event, info, log};

/// Deorbit-to-touchdown state machine.
///
/// Every suicide-burn pass first waits for its own countdown and then burns until the descent
/// rate drops below the pass threshold. Only the first pass waits in
/// [`DescentPhase::SuicideWait`]; later passes wait inside [`DescentPhase::SuicideBurn`] with
/// the engine cut so the phase order stays forward-only.
///
/// The altitude a pass stops at is resolved once when the pass begins, see
/// [`altitude_request`](Self::altitude_request).
#[derive(Debug, Clone)]
pub struct DescentGuidance {
    params: DescentParams,
    phase: DescentPhase,
    pass: usize,
    ignited: bool,
    warped: bool,
    /// Stop altitude of the current pass, above sea level.
    safe_altitude: Option<f64>,
    estimate: Option<SuicideBurnEstimate>,
    final_pid: Option<PidController>,
}

impl DescentGuidance {
    pub fn new(params: DescentParams) -> Self {
        Self {
            params,
            phase: DescentPhase::Deorbit,
            pass: 0,
            ignited: false,
            warped: false,
            safe_altitude: None,
            estimate: None,
            final_pid: None,
        }
    }

    pub fn phase(&self) -> DescentPhase { self.phase }

    pub fn is_landed(&self) -> bool { self.phase.is_terminal() }

    /// The suicide-burn pass being waited for or flown, if any.
    pub fn current_pass(&self) -> Option<BurnPass> {
        match self.phase {
            DescentPhase::SuicideWait | DescentPhase::SuicideBurn => {
                self.params.passes.get(self.pass).copied()
            }
            _ => None,
        }
    }

    /// How to resolve the stop altitude of the current pass, if it still needs one.
    pub fn altitude_request(&self) -> Option<SafeAltitude> {
        self.current_pass().filter(|_| self.safe_altitude.is_none()).map(|p| p.target)
    }

    /// Fixes the stop altitude of the current pass until the pass ends.
    pub fn resolve_altitude(&mut self, altitude: f64) {
        log!("Suicide burn pass {} stops at {altitude:.0} m", self.pass + 1);
        self.safe_altitude = Some(altitude);
    }

    pub fn safe_altitude(&self) -> Option<f64> { self.safe_altitude }

    /// Estimate of the last tick, `None` outside the suicide-burn passes.
    ///
    /// # Errors
    /// - [`GuidanceError::StaleEstimate`] if `sample` is newer than the telemetry the estimate
    ///   was computed from.
    pub fn estimate(
        &self,
        sample: &TelemetrySample,
    ) -> Result<Option<SuicideBurnEstimate>, GuidanceError> {
        match &self.estimate {
            Some(estimate) => estimate.ensure_fresh(sample).map(|()| Some(*estimate)),
            None => Ok(None),
        }
    }

    /// Descent rate the final descent aims for at `surface_altitude`, negative downwards.
    pub fn final_descent_setpoint(&self, surface_altitude: f64) -> f64 {
        (surface_altitude / -self.params.descent_rate_divisor).max(-self.params.max_descent_rate)
    }

    /// Maps one sample to this tick's actuation and moves the phase forward.
    ///
    /// A pass whose stop altitude is not resolved yet only holds retrograde.
    ///
    /// # Errors
    /// - [`GuidanceError::IllegalTransition`] if called after touchdown.
    pub fn tick(&mut self, sample: &TelemetrySample) -> Result<Actuation, GuidanceError> {
        match self.phase {
            DescentPhase::Deorbit => {
                let orbit = &sample.orbit;
                if orbit.eccentricity() >= self.params.deorbit_eccentricity
                    && orbit.periapsis_altitude() <= 0.0
                {
                    self.enter(DescentPhase::SuicideWait)?;
                    return Ok(Actuation::cut().with_attitude(AttitudeTarget::Retrograde));
                }
                Ok(Actuation::hold().with_throttle(1.0).with_attitude(AttitudeTarget::Retrograde))
            }
            DescentPhase::SuicideWait | DescentPhase::SuicideBurn => {
                let Some(pass) = self.params.passes.get(self.pass).copied() else {
                    return self.begin_final_descent(sample);
                };
                let Some(safe_altitude) = self.safe_altitude else {
                    return Ok(Actuation::cut().with_attitude(AttitudeTarget::Retrograde));
                };
                if self.ignited {
                    self.burn_pass(sample, pass, safe_altitude)
                } else {
                    self.await_pass(sample, pass, safe_altitude)
                }
            }
            DescentPhase::FinalDescent => {
                if sample.flight.landed {
                    self.final_pid = None;
                    self.enter(DescentPhase::Landed)?;
                    info!("Touchdown at {:.3}, {:.3}", sample.flight.latitude, sample.flight.longitude);
                    return Ok(Actuation::cut());
                }
                let setpoint = self.final_descent_setpoint(sample.flight.surface_altitude);
                let gains = self.params.final_pid;
                let pid = self
                    .final_pid
                    .get_or_insert_with(|| PidController::with_setpoint(gains, setpoint, sample.ut));
                pid.set_setpoint(setpoint);
                let throttle = pid.update(sample.flight.vertical_speed, sample.ut);
                Ok(Actuation::hold().with_throttle(throttle).with_attitude(AttitudeTarget::Retrograde))
            }
            DescentPhase::Landed => Err(GuidanceError::IllegalTransition),
        }
    }

    fn await_pass(
        &mut self,
        sample: &TelemetrySample,
        pass: BurnPass,
        safe_altitude: f64,
    ) -> Result<Actuation, GuidanceError> {
        let estimate = self.refresh(sample, safe_altitude);
        if !estimate.is_defined() {
            return Ok(Actuation::hold());
        }
        let countdown = estimate.countdown(sample.ut);
        if countdown <= 0.0 {
            if self.phase == DescentPhase::SuicideWait {
                self.enter(DescentPhase::SuicideBurn)?;
            }
            log!("Suicide burn pass {} ignition, {:.1} m/s down", self.pass + 1, -sample.flight.vertical_speed);
            self.ignited = true;
            return Ok(self.burn_actuation(countdown).with_warp(WarpCommand::Drop));
        }
        let actuation = Actuation::cut().with_attitude(AttitudeTarget::Retrograde);
        if self.params.autowarp && !self.warped && countdown > pass.threshold {
            self.warped = true;
            let until = estimate.ignition_time - self.params.warp_margin;
            if until > sample.ut {
                return Ok(actuation.with_warp(WarpCommand::To(until)));
            }
        }
        Ok(actuation)
    }

    fn burn_pass(
        &mut self,
        sample: &TelemetrySample,
        pass: BurnPass,
        safe_altitude: f64,
    ) -> Result<Actuation, GuidanceError> {
        if sample.flight.vertical_speed >= -pass.threshold {
            log!("Suicide burn pass {} done at {:.0} m", self.pass + 1, sample.flight.surface_altitude);
            self.pass += 1;
            self.ignited = false;
            self.warped = false;
            self.safe_altitude = None;
            self.estimate = None;
            if self.pass >= self.params.passes.len() {
                return self.begin_final_descent(sample);
            }
            return Ok(Actuation::cut().with_attitude(AttitudeTarget::Retrograde));
        }
        let estimate = self.refresh(sample, safe_altitude);
        Ok(self.burn_actuation(estimate.countdown(sample.ut)))
    }

    fn burn_actuation(&self, countdown: f64) -> Actuation {
        // overrun: the margin kept in reserve goes in now
        let throttle = if countdown < 0.0 { 1.0 } else { self.params.burn_throttle };
        Actuation::hold().with_throttle(throttle).with_attitude(AttitudeTarget::Retrograde)
    }

    fn refresh(&mut self, sample: &TelemetrySample, safe_altitude: f64) -> SuicideBurnEstimate {
        let estimate =
            SuicideBurnEstimate::compute(sample, safe_altitude, self.params.burn_throttle);
        event!(
            "Suicide burn: ignition in {:.1} s, track {:.0} m, target {:.0} m",
            estimate.countdown(sample.ut),
            estimate.ground_track,
            safe_altitude
        );
        self.estimate = Some(estimate);
        estimate
    }

    fn begin_final_descent(&mut self, sample: &TelemetrySample) -> Result<Actuation, GuidanceError> {
        if self.phase == DescentPhase::SuicideWait {
            self.enter(DescentPhase::SuicideBurn)?;
        }
        self.enter(DescentPhase::FinalDescent)?;
        self.safe_altitude = None;
        self.estimate = None;
        let setpoint = self.final_descent_setpoint(sample.flight.surface_altitude);
        self.final_pid = Some(PidController::with_setpoint(self.params.final_pid, setpoint, sample.ut));
        Ok(Actuation::cut().with_attitude(AttitudeTarget::Retrograde))
    }

    fn enter(&mut self, to: DescentPhase) -> Result<(), GuidanceError> {
        DescentPhase::advance(&mut self.phase, to)
    }
}
