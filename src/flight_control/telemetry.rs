use super::{
    common::vec3d::Vec3D,
    orbit::{ManeuverNode, OrbitState},
};
use strum_macros::Display;

/// Flight-frame quantities relative to the surface of the primary body.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct FlightSample {
    /// Altitude above sea level, in m.
    pub mean_altitude: f64,
    /// Altitude above the terrain directly below, in m.
    pub surface_altitude: f64,
    /// Positive upwards, in m/s.
    pub vertical_speed: f64,
    /// Surface speed, in m/s.
    pub speed: f64,
    /// Dynamic pressure, in Pa.
    pub dynamic_pressure: f64,
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
    /// Compass heading of the nose, in degrees.
    pub heading: f64,
    /// Landed or splashed down.
    pub landed: bool,
}

impl FlightSample {
    /// Sine of the angle of the surface velocity below the local horizontal.
    pub fn descent_sine(&self) -> f64 {
        if self.speed <= f64::EPSILON {
            return 1.0;
        }
        (-self.vertical_speed / self.speed).clamp(-1.0, 1.0)
    }
}

/// Mass and propulsion state of the whole vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct VesselSample {
    /// Total mass, in kg.
    pub mass: f64,
    /// Thrust currently available at full throttle, in N.
    pub available_thrust: f64,
    /// Thrust of all active engines at full throttle, in N.
    pub max_thrust: f64,
    /// Combined specific impulse of the active engines, in s.
    pub specific_impulse: f64,
    /// Index of the current stage, counting down to zero.
    pub current_stage: i32,
}

/// Propellant kinds tracked by the autostager.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Propellant {
    LiquidFuel,
    Oxidizer,
    SolidFuel,
    MonoPropellant,
    XenonGas,
}

/// Capacity and content of one propellant in a stage, in resource units.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResourceLevel {
    pub propellant: Propellant,
    pub amount: f64,
    pub max: f64,
}

/// Resources and part composition of the stage that would be dropped next.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct StageResources {
    pub stage: i32,
    pub levels: Vec<ResourceLevel>,
    /// The stage carries a parachute that has not been deployed.
    pub undeployed_chutes: bool,
    /// Number of engines in the stage that are active and still have fuel.
    pub burning_engines: usize,
}

impl StageResources {
    /// `(amount, max)` summed over all entries of `propellant`.
    pub fn level_of(&self, propellant: Propellant) -> (f64, f64) {
        self.levels
            .iter()
            .filter(|l| l.propellant == propellant)
            .fold((0.0, 0.0), |acc, l| (acc.0 + l.amount, acc.1 + l.max))
    }
}

/// Relative state of the two docking ports.
///
/// Axes are `x` to the right, `y` forward along the port axis and `z` up.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct DockingSample {
    /// Position of the target port in the frame of the controlling port, in m.
    pub offset: Vec3D<f64>,
    /// Velocity of the vehicle in the frame of the target port, in m/s. That frame faces the
    /// vehicle, so its right and forward axes are mirrored.
    pub velocity: Vec3D<f64>,
    pub docked: bool,
}

/// The next maneuver node as reported by the collaborator, with the part of it still to burn.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeSample {
    pub node: ManeuverNode,
    /// Delta-v still to be applied, in m/s.
    pub remaining_delta_v: f64,
    /// Direction of the remaining burn in the inertial frame.
    pub remaining_direction: Vec3D<f64>,
}

/// One consistent set of readings taken at universal time `ut`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    pub ut: f64,
    pub orbit: OrbitState,
    pub flight: FlightSample,
    pub vessel: VesselSample,
}
