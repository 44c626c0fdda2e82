use super::FlightMode;
use crate::flight_control::descent::run_chute_landing;
use crate::info;
use crate::mode_control::{mode_context::ModeContext, signal::ModeExitSignal};
use async_trait::async_trait;
use std::sync::Arc;

/// Deorbit and return under parachutes to a body with an atmosphere.
pub struct ChuteLandingMode;

#[async_trait]
impl FlightMode for ChuteLandingMode {
    fn type_name(&self) -> &'static str { "ChuteLandingMode" }

    async fn run(&self, context: Arc<ModeContext>) -> ModeExitSignal {
        let res = run_chute_landing(context.f_cont(), context.params()).await;
        if let Ok(report) = &res {
            info!(
                "Under parachutes from {:.0} m after dropping {} stages",
                report.chute_altitude, report.stages_dropped
            );
        }
        res.into()
    }
}
