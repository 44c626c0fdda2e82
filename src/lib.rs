//! Guidance, navigation and control core for a simulated launch vehicle.
//!
//! The crate talks to the simulation only through the [`VesselLink`](flight_control::VesselLink)
//! collaborator, which the host application implements. Missions are driven by
//! [`MissionSequence`](mode_control::MissionSequence).

pub mod flight_control;
pub mod logger;
pub mod mission_params;
pub mod mode_control;
