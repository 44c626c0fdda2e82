use super::error::GuidanceError;
use crate::phase;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::LazyLock;
use strum_macros::Display;

/// Phases of the ascent state machine.
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy, Hash)]
pub enum AscentPhase {
    Prelaunch,
    GravityTurn,
    ApoapsisTrim,
    Coast,
    Circularize,
    Done,
}

/// Phases of the descent state machine.
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy, Hash)]
pub enum DescentPhase {
    Deorbit,
    SuicideWait,
    SuicideBurn,
    FinalDescent,
    Landed,
}

/// Phases of the parachute return.
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ChuteLandingPhase {
    DeorbitBurn,
    /// Warping down to the upper atmosphere.
    Coast,
    Deceleration,
    /// Dropping stages until the parachute stage is next.
    Destage,
    AwaitChutes,
    ChutesOut,
}

static ASCENT_TRANSITIONS: LazyLock<HashSet<(AscentPhase, AscentPhase)>> = LazyLock::new(|| {
    HashSet::from([
        (AscentPhase::Prelaunch, AscentPhase::GravityTurn),
        (AscentPhase::GravityTurn, AscentPhase::ApoapsisTrim),
        (AscentPhase::ApoapsisTrim, AscentPhase::Coast),
        // drag may pull the apoapsis back below target while coasting
        (AscentPhase::Coast, AscentPhase::ApoapsisTrim),
        (AscentPhase::Coast, AscentPhase::Circularize),
        (AscentPhase::Circularize, AscentPhase::Done),
    ])
});

static DESCENT_TRANSITIONS: LazyLock<HashSet<(DescentPhase, DescentPhase)>> =
    LazyLock::new(|| {
        HashSet::from([
            (DescentPhase::Deorbit, DescentPhase::SuicideWait),
            (DescentPhase::SuicideWait, DescentPhase::SuicideBurn),
            (DescentPhase::SuicideBurn, DescentPhase::FinalDescent),
            (DescentPhase::FinalDescent, DescentPhase::Landed),
        ])
    });

static CHUTE_TRANSITIONS: LazyLock<HashSet<(ChuteLandingPhase, ChuteLandingPhase)>> =
    LazyLock::new(|| {
        HashSet::from([
            (ChuteLandingPhase::DeorbitBurn, ChuteLandingPhase::Coast),
            (ChuteLandingPhase::Coast, ChuteLandingPhase::Deceleration),
            (ChuteLandingPhase::Deceleration, ChuteLandingPhase::Destage),
            (ChuteLandingPhase::Destage, ChuteLandingPhase::AwaitChutes),
            (ChuteLandingPhase::AwaitChutes, ChuteLandingPhase::ChutesOut),
        ])
    });

/// A phase enumeration with a fixed set of allowed transitions.
pub trait FlightPhase: Copy + Eq + Hash + fmt::Display + 'static {
    fn transitions() -> &'static HashSet<(Self, Self)>;

    fn is_terminal(self) -> bool;

    fn can_transition(self, to: Self) -> bool { Self::transitions().contains(&(self, to)) }

    /// Moves `current` to `to` if the transition is allowed and logs it.
    ///
    /// # Errors
    /// - [`GuidanceError::IllegalTransition`] for any transition outside the table, including
    ///   staying in the same phase.
    fn advance(current: &mut Self, to: Self) -> Result<(), GuidanceError> {
        if !current.can_transition(to) {
            return Err(GuidanceError::IllegalTransition);
        }
        phase!("{current} -> {to}");
        *current = to;
        Ok(())
    }
}

impl FlightPhase for AscentPhase {
    fn transitions() -> &'static HashSet<(Self, Self)> { &ASCENT_TRANSITIONS }

    fn is_terminal(self) -> bool { self == AscentPhase::Done }
}

impl FlightPhase for DescentPhase {
    fn transitions() -> &'static HashSet<(Self, Self)> { &DESCENT_TRANSITIONS }

    fn is_terminal(self) -> bool { self == DescentPhase::Landed }
}

impl FlightPhase for ChuteLandingPhase {
    fn transitions() -> &'static HashSet<(Self, Self)> { &CHUTE_TRANSITIONS }

    fn is_terminal(self) -> bool { self == ChuteLandingPhase::ChutesOut }
}
