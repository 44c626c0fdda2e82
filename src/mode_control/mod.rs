mod mission_sequence;
pub mod mode;
mod mode_context;
mod signal;

pub use mission_sequence::{MissionReport, MissionSequence};
pub use mode_context::ModeContext;
pub use signal::ModeExitSignal;
