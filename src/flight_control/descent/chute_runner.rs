use super::ChuteLandingGuidance;
use crate::flight_control::{
    error::GuidanceError, flight_computer::FlightComputer, flight_phase::ChuteLandingPhase,
};
use crate::info;
use crate::mission_params::{MissionParams, TickRates};

/// State at the moment the parachutes fired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChuteLandingReport {
    /// Stages dropped on the way down, the parachute stage not included.
    pub stages_dropped: u32,
    pub chutes_at: f64,
    pub chute_altitude: f64,
}

/// Deorbits and returns under parachutes, ending once the parachute stage fired.
///
/// # Errors
/// - Any error of [`ChuteLandingGuidance::tick`].
/// - [`GuidanceError::Aborted`] if the mission gets cancelled.
pub async fn run_chute_landing(
    f_cont: &FlightComputer,
    params: &MissionParams,
) -> Result<ChuteLandingReport, GuidanceError> {
    let res = descend(f_cont, params).await;
    if res.is_err() {
        f_cont.safe_cut().await;
    }
    res
}

async fn descend(
    f_cont: &FlightComputer,
    params: &MissionParams,
) -> Result<ChuteLandingReport, GuidanceError> {
    let mut guidance = ChuteLandingGuidance::new(params.chute_landing);
    let mut stages_dropped = 0;

    loop {
        let sample = f_cont.sample().await?;
        let resources = if guidance.wants_resources() {
            Some(f_cont.stage_resources().await?)
        } else {
            None
        };
        let actuation = guidance.tick(&sample, resources.as_ref())?;
        f_cont.apply(&actuation).await?;
        if guidance.is_complete() {
            info!("Parachutes out at {:.0} m", sample.flight.mean_altitude);
            return Ok(ChuteLandingReport {
                stages_dropped,
                chutes_at: sample.ut,
                chute_altitude: sample.flight.mean_altitude,
            });
        }
        if actuation.stage() {
            stages_dropped += 1;
        }

        let hz = match guidance.phase() {
            ChuteLandingPhase::DeorbitBurn | ChuteLandingPhase::Deceleration => params.ticks.burn,
            _ => params.ticks.guidance,
        };
        f_cont.wait(TickRates::period(hz)).await;
    }
}
