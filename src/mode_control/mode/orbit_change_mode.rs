use super::FlightMode;
use crate::flight_control::{
    FlightComputer, GuidanceError,
    actuation::{Actuation, NodeCommand},
    burn::{NodeExecution, execute_next_node},
    orbit::{ManeuverNode, OrbitalMechanics},
};
use crate::mission_params::MissionParams;
use crate::mode_control::{mode_context::ModeContext, signal::ModeExitSignal};
use crate::warn;
use async_trait::async_trait;
use std::sync::Arc;

/// Moves the apoapsis, then the periapsis, to new altitudes in m, executing each node before
/// planning the next one.
pub struct OrbitChangeMode {
    apoapsis: f64,
    periapsis: f64,
}

impl OrbitChangeMode {
    pub fn new(apoapsis: f64, periapsis: f64) -> Self { Self { apoapsis, periapsis } }

    async fn change(
        &self,
        f_cont: &FlightComputer,
        params: &MissionParams,
    ) -> Result<(), GuidanceError> {
        let orbit = f_cont.orbit().await?;
        Self::plan_and_execute(
            f_cont,
            params,
            OrbitalMechanics::change_apoapsis(&orbit, self.apoapsis)?,
        )
        .await?;
        let orbit = f_cont.orbit().await?;
        Self::plan_and_execute(
            f_cont,
            params,
            OrbitalMechanics::change_periapsis(&orbit, self.periapsis)?,
        )
        .await
    }

    async fn plan_and_execute(
        f_cont: &FlightComputer,
        params: &MissionParams,
        node: ManeuverNode,
    ) -> Result<(), GuidanceError> {
        f_cont.apply(&Actuation::hold().with_node(NodeCommand::Add(node))).await?;
        if execute_next_node(f_cont, params).await? == NodeExecution::NoManeuverNode {
            warn!("Planned node vanished before execution");
        }
        Ok(())
    }
}

#[async_trait]
impl FlightMode for OrbitChangeMode {
    fn type_name(&self) -> &'static str { "OrbitChangeMode" }

    async fn run(&self, context: Arc<ModeContext>) -> ModeExitSignal {
        self.change(context.f_cont(), context.params()).await.into()
    }
}
