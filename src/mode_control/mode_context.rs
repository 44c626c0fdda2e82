use crate::flight_control::{FlightComputer, VesselLink};
use crate::mission_params::MissionParams;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared state handed to every mode of a mission.
pub struct ModeContext {
    f_cont: Arc<FlightComputer>,
    params: Arc<MissionParams>,
    cancel: CancellationToken,
}

impl ModeContext {
    pub fn new(link: Arc<dyn VesselLink>, params: MissionParams, cancel: CancellationToken) -> Self {
        let f_cont = FlightComputer::new(link, cancel.clone(), params.max_link_retries);
        Self { f_cont: Arc::new(f_cont), params: Arc::new(params), cancel }
    }

    pub fn f_cont(&self) -> &Arc<FlightComputer> { &self.f_cont }
    pub fn params(&self) -> &Arc<MissionParams> { &self.params }
    pub fn cancel_token(&self) -> &CancellationToken { &self.cancel }
}
