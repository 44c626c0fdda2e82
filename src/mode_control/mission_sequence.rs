use super::{mode::FlightMode, mode_context::ModeContext, signal::ModeExitSignal};
use crate::flight_control::GuidanceError;
use crate::{error, info};
use std::{collections::VecDeque, sync::Arc};

/// Modes a mission finished, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MissionReport {
    pub completed: Vec<&'static str>,
}

/// Runs a queue of flight modes strictly in order and stops at the first failure.
pub struct MissionSequence {
    context: Arc<ModeContext>,
    queue: VecDeque<Box<dyn FlightMode>>,
}

impl MissionSequence {
    pub fn new(context: Arc<ModeContext>) -> Self { Self { context, queue: VecDeque::new() } }

    pub fn with_mode(mut self, mode: impl FlightMode + 'static) -> Self {
        self.queue.push_back(Box::new(mode));
        self
    }

    pub fn len(&self) -> usize { self.queue.len() }

    pub fn is_empty(&self) -> bool { self.queue.is_empty() }

    /// Validates the mission parameters, then runs every queued mode.
    ///
    /// # Errors
    /// - [`GuidanceError::InvalidParams`] before any mode ran.
    /// - [`GuidanceError::Aborted`] if the mission was cancelled between two modes.
    /// - The error of the first mode that aborted. Later modes are not run.
    pub async fn run(mut self) -> Result<MissionReport, GuidanceError> {
        self.context.params().validate()?;
        let mut report = MissionReport::default();
        info!("Mission with {} modes starting", self.queue.len());
        while let Some(mode) = self.queue.pop_front() {
            self.context.f_cont().check_abort()?;
            info!("Starting {}", mode.type_name());
            match mode.run(Arc::clone(&self.context)).await {
                ModeExitSignal::Continue => {
                    info!("{} done", mode.type_name());
                    report.completed.push(mode.type_name());
                }
                ModeExitSignal::Abort(err) => {
                    error!("{} aborted: {err}, {} modes skipped", mode.type_name(), self.queue.len());
                    return Err(err);
                }
            }
        }
        Ok(report)
    }
}
