use super::burn_executor::BurnExecutor;
use crate::flight_control::{
    actuation::Actuation, autostage::AutostagePolicy, error::GuidanceError,
    flight_computer::FlightComputer,
};
use crate::mission_params::{MissionParams, TickRates};
use crate::{event, info, log};

/// Summary of one executed node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurnReport {
    pub planned_delta_v: f64,
    /// Delta-v left when the burn was cut, at most [`BurnExecutor::TOLERANCE`].
    pub residual_delta_v: f64,
    pub ignition_ut: Option<f64>,
    pub cutoff_ut: f64,
    pub stages_dropped: u32,
}

/// Result of a request to execute the next node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeExecution {
    Executed(BurnReport),
    /// Nothing was planned. Not an error, drivers may poll with this.
    NoManeuverNode,
}

/// Executes the next planned maneuver node to completion.
///
/// # Errors
/// - [`GuidanceError::NoThrustAvailable`] if the vehicle cannot burn.
/// - [`GuidanceError::Aborted`] if the mission gets cancelled.
/// - Any link error that outlasts the retry budget.
pub async fn execute_next_node(
    f_cont: &FlightComputer,
    params: &MissionParams,
) -> Result<NodeExecution, GuidanceError> {
    let Some(first) = f_cont.next_node().await? else {
        event!("No maneuver node planned");
        return Ok(NodeExecution::NoManeuverNode);
    };
    log!(
        "Executing node: {:.2} m/s at UT {:.1}",
        first.remaining_delta_v,
        first.node.epoch()
    );
    let res = run_node(f_cont, params, first.remaining_delta_v).await;
    if res.is_err() {
        f_cont.safe_cut().await;
    }
    res.map(NodeExecution::Executed)
}

/// Executes planned nodes until none is left.
///
/// # Errors
/// - See [`execute_next_node`].
pub async fn execute_all_nodes(
    f_cont: &FlightComputer,
    params: &MissionParams,
) -> Result<Vec<BurnReport>, GuidanceError> {
    let mut reports = Vec::new();
    while let NodeExecution::Executed(report) = execute_next_node(f_cont, params).await? {
        reports.push(report);
    }
    info!("Executed {} maneuver nodes", reports.len());
    Ok(reports)
}

async fn run_node(
    f_cont: &FlightComputer,
    params: &MissionParams,
    planned_delta_v: f64,
) -> Result<BurnReport, GuidanceError> {
    let mut exec = BurnExecutor::new(params.burn);
    let autostage = (params.burn.autostage && params.staging.enabled)
        .then(|| AutostagePolicy::from_params(&params.staging));
    let period = TickRates::period(params.ticks.burn);
    let mut ignition_ut = None;
    let mut stages_dropped = 0;
    let mut settling = false;
    let mut residual = planned_delta_v;

    loop {
        let sample = f_cont.sample().await?;
        let Some(node) = f_cont.next_node().await? else {
            // node removed by someone else, nothing left to burn
            f_cont.apply(&Actuation::cut()).await?;
            break;
        };
        residual = node.remaining_delta_v;
        let mut actuation = exec.tick(&sample, &node)?;

        if exec.phase() == super::BurnPhase::Burning {
            ignition_ut.get_or_insert(sample.ut);
            if let Some(policy) = autostage.as_ref().filter(|_| !settling) {
                let resources = f_cont.stage_resources().await?;
                if policy.should_stage(&resources, sample.vessel.current_stage) {
                    actuation = actuation.with_stage();
                    stages_dropped += 1;
                    settling = true;
                }
            } else {
                // give the new stage one tick before judging its tanks
                settling = false;
            }
        }
        f_cont.apply(&actuation).await?;
        event!("Burn {}: {:.2} m/s left", exec.phase(), node.remaining_delta_v);
        if exec.is_complete() {
            break;
        }
        f_cont.wait(period).await;
    }
    let cutoff_ut = f_cont.ut().await?;
    Ok(BurnReport { planned_delta_v, residual_delta_v: residual, ignition_ut, cutoff_ut, stages_dropped })
}
