mod ascent_mode;
mod chute_landing_mode;
mod docking_mode;
mod execute_nodes_mode;
mod flight_mode;
mod landing_mode;
mod orbit_change_mode;
mod rendezvous_mode;

pub use ascent_mode::AscentMode;
pub use chute_landing_mode::ChuteLandingMode;
pub use docking_mode::DockingMode;
pub use execute_nodes_mode::ExecuteNodesMode;
pub use flight_mode::FlightMode;
pub use landing_mode::LandingMode;
pub use orbit_change_mode::OrbitChangeMode;
pub use rendezvous_mode::RendezvousMode;
