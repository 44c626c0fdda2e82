mod ascent_guidance;
mod ascent_runner;

pub use ascent_guidance::AscentGuidance;
pub use ascent_runner::{AscentReport, run_ascent};
