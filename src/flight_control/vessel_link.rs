use super::{
    actuation::AttitudeTarget,
    common::vec3d::Vec3D,
    error::LinkError,
    orbit::{ManeuverNode, OrbitState},
    telemetry::{DockingSample, FlightSample, NodeSample, StageResources, VesselSample},
};
use async_trait::async_trait;

/// Read side of the connection to the simulated vehicle.
#[async_trait]
pub trait TelemetryProvider: Send + Sync {
    async fn orbit(&self) -> Result<OrbitState, LinkError>;
    async fn flight(&self) -> Result<FlightSample, LinkError>;
    async fn vessel(&self) -> Result<VesselSample, LinkError>;
    /// Resources of the stage that would be dropped by the next staging event.
    async fn stage_resources(&self) -> Result<StageResources, LinkError>;
    /// Terrain height above sea level at the given coordinates in degrees.
    async fn terrain_height(&self, latitude: f64, longitude: f64) -> Result<f64, LinkError>;
    /// Orbit of the selected target, `None` if nothing is targeted.
    async fn target(&self) -> Result<Option<OrbitState>, LinkError>;
    /// `None` if no docking port is targeted.
    async fn docking_offsets(&self) -> Result<Option<DockingSample>, LinkError>;
    /// `None` if no maneuver node is planned.
    async fn next_node(&self) -> Result<Option<NodeSample>, LinkError>;
}

/// Write side of the connection to the simulated vehicle.
#[async_trait]
pub trait ActuationSink: Send + Sync {
    async fn set_throttle(&self, throttle: f64) -> Result<(), LinkError>;
    async fn set_attitude(&self, attitude: AttitudeTarget) -> Result<(), LinkError>;
    async fn activate_next_stage(&self) -> Result<(), LinkError>;
    async fn add_node(&self, node: ManeuverNode) -> Result<(), LinkError>;
    async fn remove_node(&self) -> Result<(), LinkError>;
    /// Translation axes `(right, forward, up)` in `[-1, 1]`.
    async fn set_translation(&self, translation: Vec3D<f64>) -> Result<(), LinkError>;
    async fn deploy_solar_panels(&self) -> Result<(), LinkError>;
}

/// Simulation clock and time acceleration.
#[async_trait]
pub trait TimeWarp: Send + Sync {
    /// Current universal time, in s.
    async fn ut(&self) -> Result<f64, LinkError>;
    async fn warp_to(&self, ut: f64) -> Result<(), LinkError>;
    async fn set_physics_warp(&self, factor: u8) -> Result<(), LinkError>;
    async fn drop_warp(&self) -> Result<(), LinkError>;
}

/// A full connection to one vehicle.
pub trait VesselLink: TelemetryProvider + ActuationSink + TimeWarp {}

impl<T: TelemetryProvider + ActuationSink + TimeWarp> VesselLink for T {}
