use super::FlightMode;
use crate::flight_control::rendezvous::run_rendezvous;
use crate::info;
use crate::mode_control::{mode_context::ModeContext, signal::ModeExitSignal};
use async_trait::async_trait;
use std::sync::Arc;

pub struct RendezvousMode;

#[async_trait]
impl FlightMode for RendezvousMode {
    fn type_name(&self) -> &'static str { "RendezvousMode" }

    async fn run(&self, context: Arc<ModeContext>) -> ModeExitSignal {
        let res = run_rendezvous(context.f_cont(), context.params()).await;
        if let Ok(report) = &res {
            info!(
                "Target at {:.0} m after {} nodes",
                report.final_distance, report.nodes_executed
            );
        }
        res.into()
    }
}
