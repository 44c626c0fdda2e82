use super::telemetry::{Propellant, StageResources};
use crate::mission_params::StagingParams;
use strum_macros::Display;

/// Why a stage is dropped.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum StageReason {
    /// A tracked tank in the stage has capacity but is empty.
    OutOfFuel(Propellant),
    /// The stage carries no tracked propellant at all.
    Interstage,
}

/// Outcome of one autostage evaluation.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum StageDecision {
    Stage(StageReason),
    Hold,
    /// The current stage is at or below the last stage allowed to separate automatically.
    FloorReached,
    /// Strict only: staging would fire an undeployed parachute.
    ChutesInStage,
    /// Strict only: an engine in the stage is still active and fueled.
    EnginesBurning,
}

impl StageDecision {
    pub fn should_stage(&self) -> bool { matches!(self, StageDecision::Stage(_)) }
}

/// Decides when to separate the next stage.
#[derive(Debug, Clone, PartialEq)]
pub struct AutostagePolicy {
    max_auto_stage: i32,
    tracked: Vec<Propellant>,
    strict: bool,
}

impl AutostagePolicy {
    pub fn new(max_auto_stage: i32, tracked: Vec<Propellant>, strict: bool) -> Self {
        Self { max_auto_stage, tracked, strict }
    }

    pub fn from_params(params: &StagingParams) -> Self {
        Self::new(params.max_auto_stage, params.tracked.clone(), params.strict)
    }

    /// Evaluates the stage that the next staging event would drop.
    ///
    /// # Arguments
    /// - `resources`: Resources and parts of the stage that would be separated.
    /// - `current_stage`: The vehicle's current stage index.
    pub fn decide(&self, resources: &StageResources, current_stage: i32) -> StageDecision {
        if current_stage <= self.max_auto_stage {
            return StageDecision::FloorReached;
        }
        if self.strict {
            if resources.undeployed_chutes {
                return StageDecision::ChutesInStage;
            }
            if resources.burning_engines > 0 {
                return StageDecision::EnginesBurning;
            }
        }
        let mut interstage = true;
        for propellant in &self.tracked {
            let (amount, max) = resources.level_of(*propellant);
            if max > 0.0 && amount <= 0.0 {
                return StageDecision::Stage(StageReason::OutOfFuel(*propellant));
            }
            if max > 0.0 {
                interstage = false;
            }
        }
        if interstage { StageDecision::Stage(StageReason::Interstage) } else { StageDecision::Hold }
    }

    pub fn should_stage(&self, resources: &StageResources, current_stage: i32) -> bool {
        self.decide(resources, current_stage).should_stage()
    }

    pub fn max_auto_stage(&self) -> i32 { self.max_auto_stage }

    pub fn is_strict(&self) -> bool { self.strict }
}
