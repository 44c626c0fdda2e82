use crate::mode_control::{mode_context::ModeContext, signal::ModeExitSignal};
use async_trait::async_trait;
use std::sync::Arc;

/// One step of a mission. Modes own no vehicle state, everything they need lives in the
/// [`ModeContext`].
#[async_trait]
pub trait FlightMode: Send + Sync {
    fn type_name(&self) -> &'static str;
    async fn run(&self, context: Arc<ModeContext>) -> ModeExitSignal;
}
