mod maneuver_node;
mod mechanics;
mod orbit_state;

pub use maneuver_node::BurnVector;
pub use maneuver_node::ManeuverNode;
pub use mechanics::ClosestApproach;
pub use mechanics::OrbitalMechanics;
pub use orbit_state::BodyParams;
pub use orbit_state::KeplerElements;
pub use orbit_state::OrbitState;
