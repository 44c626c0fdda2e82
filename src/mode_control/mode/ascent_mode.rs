use super::FlightMode;
use crate::flight_control::ascent::run_ascent;
use crate::info;
use crate::mode_control::{mode_context::ModeContext, signal::ModeExitSignal};
use async_trait::async_trait;
use std::sync::Arc;

/// Launch into the parking orbit described by the ascent parameters.
pub struct AscentMode;

#[async_trait]
impl FlightMode for AscentMode {
    fn type_name(&self) -> &'static str { "AscentMode" }

    async fn run(&self, context: Arc<ModeContext>) -> ModeExitSignal {
        let res = run_ascent(context.f_cont(), context.params()).await;
        if let Ok(report) = &res {
            info!(
                "Orbit reached: {:.0} x {:.0} km, {} stages dropped",
                report.orbit.apoapsis_altitude() / 1000.0,
                report.orbit.periapsis_altitude() / 1000.0,
                report.stages_dropped
            );
        }
        res.into()
    }
}
