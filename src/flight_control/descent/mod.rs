mod chute_landing;
mod chute_runner;
mod descent_guidance;
mod descent_runner;
mod suicide_burn;
pub mod terrain;
#[cfg(test)]
mod tests;

pub use chute_landing::ChuteLandingGuidance;
pub use chute_runner::{ChuteLandingReport, run_chute_landing};
pub use descent_guidance::DescentGuidance;
pub use descent_runner::{LandingReport, run_descent};
pub use suicide_burn::SuicideBurnEstimate;
