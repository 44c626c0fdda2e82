use super::FlightMode;
use crate::flight_control::rendezvous::run_docking;
use crate::mode_control::{mode_context::ModeContext, signal::ModeExitSignal};
use async_trait::async_trait;
use std::sync::Arc;

pub struct DockingMode;

#[async_trait]
impl FlightMode for DockingMode {
    fn type_name(&self) -> &'static str { "DockingMode" }

    async fn run(&self, context: Arc<ModeContext>) -> ModeExitSignal {
        run_docking(context.f_cont(), context.params()).await.into()
    }
}
