use crate::flight_control::{
    actuation::{Actuation, NodeCommand},
    burn::execute_next_node,
    error::GuidanceError,
    flight_computer::FlightComputer,
    orbit::{ManeuverNode, OrbitState, OrbitalMechanics},
};
use crate::mission_params::MissionParams;
use crate::{info, log};

/// Outcome of a rendezvous that brought the target into docking range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendezvousReport {
    pub plane_changed: bool,
    pub nodes_executed: u32,
    pub closing_iterations: u32,
    pub final_distance: f64,
}

/// Seconds between planning a closing burn and its execution.
const CLOSING_LEAD: f64 = 30.0;

/// Matches planes, transfers onto the target's orbit and closes in until the separation is
/// below the docking handoff distance.
///
/// # Errors
/// - [`GuidanceError::NoTarget`] if no target is selected.
/// - [`GuidanceError::NoTransferWindow`] if the transfer search fails.
/// - [`GuidanceError::RendezvousStalled`] if the closing loop runs out of iterations.
pub async fn run_rendezvous(
    f_cont: &FlightComputer,
    params: &MissionParams,
) -> Result<RendezvousReport, GuidanceError> {
    let res = rendezvous(f_cont, params).await;
    if res.is_err() {
        f_cont.safe_cut().await;
    }
    res
}

async fn rendezvous(
    f_cont: &FlightComputer,
    params: &MissionParams,
) -> Result<RendezvousReport, GuidanceError> {
    let cfg = params.rendezvous;
    let mut report = RendezvousReport {
        plane_changed: false,
        nodes_executed: 0,
        closing_iterations: 0,
        final_distance: f64::INFINITY,
    };

    let (vessel, target) = snapshot(f_cont).await?;
    let ut = f_cont.ut().await?;
    report.final_distance = separation(&vessel, &target, ut);
    if report.final_distance < cfg.handoff_distance {
        info!("Target already within {:.0} m", report.final_distance);
        return Ok(report);
    }

    if let Some(inclination) = plane_change_needed(&vessel, &target, cfg.min_plane_change) {
        log!("Matching planes, {inclination:.2} deg apart");
        run_node(f_cont, params, OrbitalMechanics::plane_change(&vessel, &target)?, &mut report)
            .await?;
        report.plane_changed = true;
    }

    let (vessel, target) = snapshot(f_cont).await?;
    let raising = target.semi_major_axis() > vessel.semi_major_axis();
    run_node(f_cont, params, OrbitalMechanics::hohmann_transfer(&vessel, &target)?, &mut report)
        .await?;
    let (transfer, _) = snapshot(f_cont).await?;
    run_node(f_cont, params, OrbitalMechanics::circularization(&transfer, raising)?, &mut report)
        .await?;

    while report.closing_iterations < cfg.max_closing_iterations {
        report.closing_iterations += 1;
        let (vessel, target) = snapshot(f_cont).await?;
        let ut = f_cont.ut().await?;
        let approach = OrbitalMechanics::closest_approach(&vessel, &target, ut, vessel.period());
        log!("Closest approach {:.0} m at UT {:.1}", approach.distance, approach.epoch);
        report.final_distance = approach.distance;
        if approach.distance < cfg.handoff_distance {
            return Ok(report);
        }
        let matching = OrbitalMechanics::match_velocity_node(&vessel, &target, approach.epoch);
        run_node(f_cont, params, matching, &mut report).await?;

        let (vessel, target) = snapshot(f_cont).await?;
        let ut = f_cont.ut().await?;
        report.final_distance = separation(&vessel, &target, ut);
        if report.final_distance < cfg.handoff_distance {
            return Ok(report);
        }
        let closing = OrbitalMechanics::closing_node(
            &vessel,
            &target,
            ut + CLOSING_LEAD,
            cfg.closing_divisor,
        );
        run_node(f_cont, params, closing, &mut report).await?;
    }
    Err(GuidanceError::RendezvousStalled)
}

async fn snapshot(f_cont: &FlightComputer) -> Result<(OrbitState, OrbitState), GuidanceError> {
    let target = f_cont.target().await?.ok_or(GuidanceError::NoTarget)?;
    Ok((f_cont.orbit().await?, target))
}

/// Relative inclination in degrees, if it is large enough to be worth a plane change.
pub fn plane_change_needed(
    vessel: &OrbitState,
    target: &OrbitState,
    min_degrees: f64,
) -> Option<f64> {
    let inclination = vessel.relative_inclination(target).to_degrees();
    (inclination > min_degrees).then_some(inclination)
}

fn separation(vessel: &OrbitState, target: &OrbitState, ut: f64) -> f64 {
    vessel.position_at(ut).euclid_distance(&target.position_at(ut))
}

async fn run_node(
    f_cont: &FlightComputer,
    params: &MissionParams,
    node: ManeuverNode,
    report: &mut RendezvousReport,
) -> Result<(), GuidanceError> {
    f_cont.apply(&Actuation::hold().with_node(NodeCommand::Add(node))).await?;
    execute_next_node(f_cont, params).await?;
    report.nodes_executed += 1;
    Ok(())
}
