pub mod actuation;
pub mod ascent;
pub mod autostage;
pub mod burn;
pub mod common;
pub mod descent;
pub mod error;
pub mod flight_computer;
pub mod flight_phase;
#[cfg(test)]
pub(crate) mod mock_link;
pub mod orbit;
pub mod pid;
pub mod rendezvous;
pub mod telemetry;
pub mod vessel_link;

pub use actuation::Actuation;
pub use common::Vec3D;
pub use error::{GuidanceError, LinkError};
pub use flight_computer::FlightComputer;
pub use pid::{PidController, PidGains};
pub use telemetry::{Propellant, TelemetrySample};
pub use vessel_link::VesselLink;
