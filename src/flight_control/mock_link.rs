//! Scripted in-memory vehicle for runner tests.
//!
//! Every `ut()` read advances the simulation by one step and integrates a crude kinematic
//! model: throttle burns down the remaining delta-v of the first node and the vehicle mass,
//! an optional vertical channel integrates thrust against surface gravity, and translation
//! commands accelerate the vehicle relative to a docking target.

use super::{
    actuation::AttitudeTarget,
    common::{math::G0, vec3d::Vec3D},
    error::LinkError,
    orbit::{ManeuverNode, OrbitState},
    telemetry::{
        DockingSample, FlightSample, NodeSample, Propellant, ResourceLevel, StageResources,
        VesselSample,
    },
    vessel_link::{ActuationSink, TelemetryProvider, TimeWarp},
};
use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct PlannedNode {
    pub node: ManeuverNode,
    pub remaining: f64,
}

#[derive(Debug, Clone)]
pub struct SimState {
    pub ut: f64,
    pub dt: f64,
    pub orbit: OrbitState,
    pub flight: FlightSample,
    pub vessel: VesselSample,
    pub throttle: f64,
    pub attitude: Option<AttitudeTarget>,
    pub nodes: Vec<PlannedNode>,
    pub removed_nodes: u32,
    pub stage_resources: StageResources,
    /// Resources reported after the next staging event.
    pub next_stage_resources: Option<StageResources>,
    pub stages_activated: u32,
    pub warps: Vec<f64>,
    pub physics_warp: u8,
    /// Number of requests to return to real time.
    pub warp_drops: u32,
    pub solar_deployed: bool,
    pub terrain_height: f64,
    pub terrain_queries: u32,
    pub target: Option<OrbitState>,
    /// Docking target present.
    pub docking: bool,
    pub docking_pos: Vec3D<f64>,
    pub docking_vel: Vec3D<f64>,
    pub translation: Vec3D<f64>,
    pub translation_accel: f64,
    pub docked: bool,
    /// Integrate the vertical channel against surface gravity.
    pub vertical_model: bool,
    /// Failures still to inject into orbit reads.
    pub orbit_failures: u32,
}

pub struct MockLink {
    state: Mutex<SimState>,
}

impl MockLink {
    pub fn new(orbit: OrbitState) -> Self {
        let state = SimState {
            ut: orbit.epoch(),
            dt: 0.1,
            orbit,
            flight: FlightSample::default(),
            vessel: VesselSample {
                mass: 1000.0,
                available_thrust: 20_000.0,
                max_thrust: 20_000.0,
                specific_impulse: 300.0,
                current_stage: 3,
            },
            throttle: 0.0,
            attitude: None,
            nodes: Vec::new(),
            removed_nodes: 0,
            stage_resources: StageResources {
                stage: 2,
                levels: vec![ResourceLevel {
                    propellant: Propellant::LiquidFuel,
                    amount: 360.0,
                    max: 360.0,
                }],
                undeployed_chutes: false,
                burning_engines: 1,
            },
            next_stage_resources: None,
            stages_activated: 0,
            warps: Vec::new(),
            physics_warp: 0,
            warp_drops: 0,
            solar_deployed: false,
            terrain_height: 0.0,
            terrain_queries: 0,
            target: None,
            docking: false,
            docking_pos: Vec3D::zero(),
            docking_vel: Vec3D::zero(),
            translation: Vec3D::zero(),
            translation_accel: 0.5,
            docked: false,
            vertical_model: false,
            orbit_failures: 0,
        };
        Self { state: Mutex::new(state) }
    }

    pub fn with(mut self, setup: impl FnOnce(&mut SimState)) -> Self {
        setup(self.state.get_mut());
        self
    }

    pub async fn snapshot(&self) -> SimState { self.state.lock().await.clone() }

    fn step(s: &mut SimState) {
        let dt = s.dt;
        s.ut += dt;
        let thrust = s.throttle * s.vessel.available_thrust;
        let accel = thrust / s.vessel.mass;
        if thrust > 0.0 {
            if let Some(first) = s.nodes.first_mut() {
                first.remaining = (first.remaining - accel * dt).max(0.0);
            }
            s.vessel.mass -= thrust / (s.vessel.specific_impulse * G0) * dt;
        }
        if s.vertical_model && !s.flight.landed {
            s.flight.vertical_speed += (accel - s.orbit.body().surface_gravity) * dt;
            s.flight.surface_altitude += s.flight.vertical_speed * dt;
            s.flight.mean_altitude = s.flight.surface_altitude + s.terrain_height;
            s.flight.speed = s.flight.vertical_speed.abs();
            // legs touch the ground
            if s.flight.surface_altitude <= 0.5 {
                s.flight.landed = true;
            }
        }
        if s.docking && !s.docked {
            s.docking_vel = s.docking_vel - s.translation * (s.translation_accel * dt);
            s.docking_pos = s.docking_pos + s.docking_vel * dt;
            let lateral = s.docking_pos.x().abs().max(s.docking_pos.z().abs());
            if s.docking_pos.y() <= 0.2 && lateral < 0.3 {
                s.docked = true;
            }
        }
    }
}

#[async_trait]
impl TelemetryProvider for MockLink {
    async fn orbit(&self) -> Result<OrbitState, LinkError> {
        let mut s = self.state.lock().await;
        if s.orbit_failures > 0 {
            s.orbit_failures -= 1;
            return Err(LinkError::Timeout);
        }
        Ok(s.orbit)
    }

    async fn flight(&self) -> Result<FlightSample, LinkError> { Ok(self.state.lock().await.flight) }

    async fn vessel(&self) -> Result<VesselSample, LinkError> { Ok(self.state.lock().await.vessel) }

    async fn stage_resources(&self) -> Result<StageResources, LinkError> {
        Ok(self.state.lock().await.stage_resources.clone())
    }

    async fn terrain_height(&self, _latitude: f64, _longitude: f64) -> Result<f64, LinkError> {
        let mut s = self.state.lock().await;
        s.terrain_queries += 1;
        Ok(s.terrain_height)
    }

    async fn target(&self) -> Result<Option<OrbitState>, LinkError> {
        Ok(self.state.lock().await.target)
    }

    async fn docking_offsets(&self) -> Result<Option<DockingSample>, LinkError> {
        let s = self.state.lock().await;
        if !s.docking {
            return Ok(None);
        }
        let pos = s.docking_pos;
        Ok(Some(DockingSample {
            offset: Vec3D::new(pos.x(), pos.y(), -pos.z()),
            velocity: s.docking_vel,
            docked: s.docked,
        }))
    }

    async fn next_node(&self) -> Result<Option<NodeSample>, LinkError> {
        let s = self.state.lock().await;
        Ok(s.nodes.first().map(|p| NodeSample {
            node: p.node,
            remaining_delta_v: p.remaining,
            remaining_direction: Vec3D::new(1.0, 0.0, 0.0),
        }))
    }
}

#[async_trait]
impl ActuationSink for MockLink {
    async fn set_throttle(&self, throttle: f64) -> Result<(), LinkError> {
        self.state.lock().await.throttle = throttle;
        Ok(())
    }

    async fn set_attitude(&self, attitude: AttitudeTarget) -> Result<(), LinkError> {
        self.state.lock().await.attitude = Some(attitude);
        Ok(())
    }

    async fn activate_next_stage(&self) -> Result<(), LinkError> {
        let mut s = self.state.lock().await;
        s.stages_activated += 1;
        s.vessel.current_stage -= 1;
        if let Some(next) = s.next_stage_resources.take() {
            s.stage_resources = next;
        }
        Ok(())
    }

    async fn add_node(&self, node: ManeuverNode) -> Result<(), LinkError> {
        let mut s = self.state.lock().await;
        let remaining = node.delta_v();
        s.nodes.push(PlannedNode { node, remaining });
        s.nodes.sort_by(|a, b| a.node.epoch().total_cmp(&b.node.epoch()));
        Ok(())
    }

    async fn remove_node(&self) -> Result<(), LinkError> {
        let mut s = self.state.lock().await;
        if s.nodes.is_empty() {
            return Err(LinkError::Rejected("no node to remove".to_string()));
        }
        s.nodes.remove(0);
        s.removed_nodes += 1;
        Ok(())
    }

    async fn set_translation(&self, translation: Vec3D<f64>) -> Result<(), LinkError> {
        self.state.lock().await.translation = translation;
        Ok(())
    }

    async fn deploy_solar_panels(&self) -> Result<(), LinkError> {
        self.state.lock().await.solar_deployed = true;
        Ok(())
    }
}

#[async_trait]
impl TimeWarp for MockLink {
    async fn ut(&self) -> Result<f64, LinkError> {
        let mut s = self.state.lock().await;
        Self::step(&mut s);
        Ok(s.ut)
    }

    async fn warp_to(&self, ut: f64) -> Result<(), LinkError> {
        let mut s = self.state.lock().await;
        s.warps.push(ut);
        if ut > s.ut {
            s.ut = ut;
        }
        Ok(())
    }

    async fn set_physics_warp(&self, factor: u8) -> Result<(), LinkError> {
        self.state.lock().await.physics_warp = factor;
        Ok(())
    }

    async fn drop_warp(&self) -> Result<(), LinkError> {
        let mut s = self.state.lock().await;
        s.physics_warp = 0;
        s.warp_drops += 1;
        Ok(())
    }
}
