use crate::flight_control::GuidanceError;

/// How a [`FlightMode`](super::mode::FlightMode) handed control back to the sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeExitSignal {
    Continue,
    Abort(GuidanceError),
}

impl<T> From<Result<T, GuidanceError>> for ModeExitSignal {
    fn from(value: Result<T, GuidanceError>) -> Self {
        match value {
            Ok(_) => ModeExitSignal::Continue,
            Err(err) => ModeExitSignal::Abort(err),
        }
    }
}
