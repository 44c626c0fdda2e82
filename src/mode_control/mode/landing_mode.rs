use super::FlightMode;
use crate::flight_control::descent::run_descent;
use crate::info;
use crate::mode_control::{mode_context::ModeContext, signal::ModeExitSignal};
use async_trait::async_trait;
use std::sync::Arc;

/// Deorbit, suicide-burn passes and final descent down to touchdown.
pub struct LandingMode;

#[async_trait]
impl FlightMode for LandingMode {
    fn type_name(&self) -> &'static str { "LandingMode" }

    async fn run(&self, context: Arc<ModeContext>) -> ModeExitSignal {
        let res = run_descent(context.f_cont(), context.params()).await;
        if let Ok(report) = &res {
            info!(
                "Touchdown at {:.4}, {:.4} with {:.2} m/s",
                report.latitude, report.longitude, report.touchdown_speed
            );
        }
        res.into()
    }
}
