use super::FlightMode;
use crate::flight_control::burn::execute_all_nodes;
use crate::mode_control::{mode_context::ModeContext, signal::ModeExitSignal};
use async_trait::async_trait;
use std::sync::Arc;

/// Executes whatever nodes are planned, finishing immediately if there are none.
pub struct ExecuteNodesMode;

#[async_trait]
impl FlightMode for ExecuteNodesMode {
    fn type_name(&self) -> &'static str { "ExecuteNodesMode" }

    async fn run(&self, context: Arc<ModeContext>) -> ModeExitSignal {
        execute_all_nodes(context.f_cont(), context.params()).await.into()
    }
}
