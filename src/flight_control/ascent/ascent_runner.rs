use super::AscentGuidance;
use crate::flight_control::{
    burn::{NodeExecution, execute_next_node},
    error::GuidanceError,
    flight_computer::FlightComputer,
    flight_phase::AscentPhase,
    orbit::OrbitState,
};
use crate::mission_params::{MissionParams, TickRates};
use crate::{info, warn};

/// Outcome of a completed ascent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AscentReport {
    pub orbit: OrbitState,
    pub stages_dropped: u32,
    /// Times drag pulled the apoapsis below target during the coast.
    pub retrims: u32,
}

/// Flies from the pad to a circular orbit at the configured altitude.
///
/// # Errors
/// - Any error of [`AscentGuidance::tick`] or the circularization burn.
/// - [`GuidanceError::Aborted`] if the mission gets cancelled.
pub async fn run_ascent(
    f_cont: &FlightComputer,
    params: &MissionParams,
) -> Result<AscentReport, GuidanceError> {
    let res = fly(f_cont, params).await;
    if res.is_err() {
        f_cont.safe_cut().await;
    }
    res
}

async fn fly(f_cont: &FlightComputer, params: &MissionParams) -> Result<AscentReport, GuidanceError> {
    let mut guidance = AscentGuidance::new(params.ascent.clone(), &params.staging);
    let mut stages_dropped = 0;
    let mut retrims = 0;

    while guidance.phase() != AscentPhase::Circularize {
        let sample = f_cont.sample().await?;
        let resources = if guidance.wants_resources() {
            Some(f_cont.stage_resources().await?)
        } else {
            None
        };
        let before = guidance.phase();
        let actuation = guidance.tick(&sample, resources.as_ref())?;
        if actuation.stage() {
            stages_dropped += 1;
        }
        if before == AscentPhase::Coast && guidance.phase() == AscentPhase::ApoapsisTrim {
            retrims += 1;
        }
        f_cont.apply(&actuation).await?;

        let hz = match guidance.phase() {
            AscentPhase::ApoapsisTrim => params.ticks.fine,
            _ => params.ticks.guidance,
        };
        f_cont.wait(TickRates::period(hz)).await;
    }

    if execute_next_node(f_cont, params).await? == NodeExecution::NoManeuverNode {
        warn!("Circularization node vanished before execution");
    }
    let actuation = guidance.finish()?;
    f_cont.apply(&actuation).await?;
    let orbit = f_cont.orbit().await?;
    info!(
        "Ascent complete: {:.0} x {:.0} m",
        orbit.apoapsis_altitude(),
        orbit.periapsis_altitude()
    );
    Ok(AscentReport { orbit, stages_dropped, retrims })
}
