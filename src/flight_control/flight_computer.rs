use super::{
    actuation::{Actuation, NodeCommand, WarpCommand},
    error::{GuidanceError, LinkError},
    orbit::OrbitState,
    telemetry::{DockingSample, NodeSample, StageResources, TelemetrySample},
    vessel_link::VesselLink,
};
use crate::{event, info, log, warn};
use std::{future::Future, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

/// Owns the connection to the vehicle and is the only place guidance talks to it through.
///
/// Telemetry reads are retried on the next tick up to `max_link_retries` consecutive times.
/// Every read first checks the mission cancellation token, so a cancelled mission surfaces as
/// [`GuidanceError::Aborted`] at the start of the next tick.
pub struct FlightComputer {
    link: Arc<dyn VesselLink>,
    cancel: CancellationToken,
    max_link_retries: u32,
    retry_delay: Duration,
}

impl FlightComputer {
    /// Pause between two attempts of a failed telemetry read.
    const DEF_RETRY_DELAY: Duration = Duration::from_millis(100);

    pub fn new(link: Arc<dyn VesselLink>, cancel: CancellationToken, max_link_retries: u32) -> Self {
        Self { link, cancel, max_link_retries, retry_delay: Self::DEF_RETRY_DELAY }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn link(&self) -> Arc<dyn VesselLink> { Arc::clone(&self.link) }

    pub fn cancel_token(&self) -> CancellationToken { self.cancel.clone() }

    /// # Errors
    /// - [`GuidanceError::Aborted`] once the mission was cancelled.
    pub fn check_abort(&self) -> Result<(), GuidanceError> {
        if self.cancel.is_cancelled() { Err(GuidanceError::Aborted) } else { Ok(()) }
    }

    /// Sleeps one tick, waking early if the mission gets cancelled.
    pub async fn wait(&self, period: Duration) {
        tokio::time::timeout(period, self.cancel.cancelled()).await.ok().unwrap_or(());
    }

    async fn read<T, F, Fut>(&self, what: &'static str, mut op: F) -> Result<T, GuidanceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LinkError>>,
    {
        let mut failures = 0;
        loop {
            self.check_abort()?;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    failures += 1;
                    if failures > self.max_link_retries {
                        return Err(GuidanceError::RetriesExhausted(err));
                    }
                    warn!("Reading {what} failed: {err}. Retry {failures}/{}", self.max_link_retries);
                    self.wait(self.retry_delay).await;
                }
            }
        }
    }

    pub async fn ut(&self) -> Result<f64, GuidanceError> {
        self.read("ut", || self.link.ut()).await
    }

    pub async fn orbit(&self) -> Result<OrbitState, GuidanceError> {
        self.read("orbit", || self.link.orbit()).await
    }

    /// Reads clock, orbit, flight and vessel state as one sample.
    pub async fn sample(&self) -> Result<TelemetrySample, GuidanceError> {
        let ut = self.ut().await?;
        let orbit = self.orbit().await?;
        let flight = self.read("flight", || self.link.flight()).await?;
        let vessel = self.read("vessel", || self.link.vessel()).await?;
        Ok(TelemetrySample { ut, orbit, flight, vessel })
    }

    pub async fn stage_resources(&self) -> Result<StageResources, GuidanceError> {
        self.read("stage resources", || self.link.stage_resources()).await
    }

    pub async fn terrain_height(&self, latitude: f64, longitude: f64) -> Result<f64, GuidanceError> {
        self.read("terrain height", || self.link.terrain_height(latitude, longitude)).await
    }

    pub async fn target(&self) -> Result<Option<OrbitState>, GuidanceError> {
        self.read("target", || self.link.target()).await
    }

    pub async fn docking_offsets(&self) -> Result<Option<DockingSample>, GuidanceError> {
        self.read("docking offsets", || self.link.docking_offsets()).await
    }

    pub async fn next_node(&self) -> Result<Option<NodeSample>, GuidanceError> {
        self.read("next node", || self.link.next_node()).await
    }

    /// Forwards one tick's commands to the vehicle.
    ///
    /// A warp drop is sent before anything else and any other warp request after everything
    /// else, so controls are never changed while time runs accelerated.
    ///
    /// # Errors
    /// - [`GuidanceError::Link`] if the collaborator rejects a command.
    pub async fn apply(&self, actuation: &Actuation) -> Result<(), GuidanceError> {
        if actuation.warp() == Some(WarpCommand::Drop) {
            self.link.drop_warp().await?;
        }
        if let Some(throttle) = actuation.throttle() {
            self.link.set_throttle(throttle).await?;
        }
        if let Some(attitude) = actuation.attitude() {
            self.link.set_attitude(attitude).await?;
        }
        if actuation.stage() {
            info!("Activating next stage");
            self.link.activate_next_stage().await?;
        }
        match actuation.node() {
            Some(NodeCommand::Add(node)) => {
                log!("Planned node: {:.2} m/s at UT {:.1}", node.delta_v(), node.epoch());
                self.link.add_node(node).await?;
            }
            Some(NodeCommand::RemoveNext) => self.link.remove_node().await?,
            None => {}
        }
        if let Some(translation) = actuation.translation() {
            self.link.set_translation(translation).await?;
        }
        if actuation.deploy_solar() {
            info!("Deploying solar panels");
            self.link.deploy_solar_panels().await?;
        }
        match actuation.warp() {
            Some(WarpCommand::To(ut)) => {
                event!("Warping to UT {ut:.1}");
                self.link.warp_to(ut).await?;
            }
            Some(WarpCommand::Physics(factor)) => self.link.set_physics_warp(factor).await?,
            Some(WarpCommand::Drop) | None => {}
        }
        Ok(())
    }

    /// Best-effort engine cut used when a runner bails out with an error.
    pub async fn safe_cut(&self) {
        if let Err(err) = self.link.set_throttle(0.0).await {
            warn!("Could not cut throttle: {err}");
        }
    }
}
