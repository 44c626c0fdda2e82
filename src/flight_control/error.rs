use strum_macros::Display;

/// Failures reported by the collaborator connection to the vehicle.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum LinkError {
    /// The connection to the simulation is gone.
    Disconnected,
    /// A call did not answer within the collaborator's latency bound.
    Timeout,
    /// The collaborator refused the request.
    Rejected(String),
    /// The requested quantity is not available right now (e.g. no target selected).
    Unavailable(&'static str),
}

impl std::error::Error for LinkError {}

/// Conditions that end a guidance phase and are surfaced to the driver.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum GuidanceError {
    /// A burn was requested while the vehicle has zero available thrust.
    NoThrustAvailable,
    /// The orbit has no defined apsides (hyperbolic, parabolic or non-finite elements).
    DegenerateOrbit,
    /// An estimate was used against telemetry newer than the sample it was computed from.
    StaleEstimate,
    /// The transfer window search found no departure epoch.
    NoTransferWindow,
    /// A rendezvous or docking phase was started without a target.
    NoTarget,
    /// A state machine was asked to move backwards.
    IllegalTransition,
    /// Telemetry kept failing for more consecutive ticks than allowed.
    RetriesExhausted(LinkError),
    /// An actuation call failed.
    Link(LinkError),
    /// The mission was cancelled by the driver.
    Aborted,
    /// The mission parameters failed validation.
    InvalidParams(String),
    /// Closing maneuvers did not bring the target into docking range.
    RendezvousStalled,
    /// The body being landed on has no atmosphere to fly parachutes in.
    NoAtmosphere,
    /// Every stage was dropped without reaching one that carries parachutes.
    NoParachutes,
}

impl std::error::Error for GuidanceError {}

impl From<LinkError> for GuidanceError {
    fn from(value: LinkError) -> Self { GuidanceError::Link(value) }
}
