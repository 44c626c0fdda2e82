use super::{DescentGuidance, SuicideBurnEstimate, terrain};
use crate::flight_control::{
    error::GuidanceError, flight_computer::FlightComputer, flight_phase::DescentPhase,
    telemetry::TelemetrySample,
};
use crate::info;
use crate::mission_params::{DescentParams, MissionParams, SafeAltitude, TickRates};

/// Where and how the vehicle came down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandingReport {
    pub latitude: f64,
    pub longitude: f64,
    /// Vertical speed at the last sample before touchdown, in m/s.
    pub touchdown_speed: f64,
    pub landed_at: f64,
    /// Ignition time of the first suicide-burn pass as last predicted while waiting for it.
    pub planned_ignition: Option<f64>,
}

/// Deorbits and lands on the body currently orbited.
///
/// # Errors
/// - [`GuidanceError::Aborted`] if the mission gets cancelled.
/// - Any telemetry or actuation failure that outlasts the retry budget.
pub async fn run_descent(
    f_cont: &FlightComputer,
    params: &MissionParams,
) -> Result<LandingReport, GuidanceError> {
    let res = land(f_cont, params).await;
    if res.is_err() {
        f_cont.safe_cut().await;
    }
    res
}

async fn land(f_cont: &FlightComputer, params: &MissionParams) -> Result<LandingReport, GuidanceError> {
    let mut guidance = DescentGuidance::new(params.descent.clone());
    let period = TickRates::period(params.ticks.burn);
    let mut last_vertical_speed = 0.0;
    let mut planned_ignition = None;

    loop {
        let sample = f_cont.sample().await?;
        if let Some(target) = guidance.altitude_request() {
            let altitude = safe_altitude(f_cont, &params.descent, &sample, target).await?;
            guidance.resolve_altitude(altitude);
        }
        let actuation = guidance.tick(&sample)?;
        if guidance.phase() == DescentPhase::SuicideWait {
            if let Some(estimate) = guidance.estimate(&sample)?.filter(|e| e.is_defined()) {
                planned_ignition = Some(estimate.ignition_time);
            }
        }
        f_cont.apply(&actuation).await?;
        if guidance.phase() == DescentPhase::Landed {
            let report = LandingReport {
                latitude: sample.flight.latitude,
                longitude: sample.flight.longitude,
                touchdown_speed: last_vertical_speed,
                landed_at: sample.ut,
                planned_ignition,
            };
            info!("Landed with {:.2} m/s", report.touchdown_speed);
            return Ok(report);
        }
        last_vertical_speed = sample.flight.vertical_speed;
        f_cont.wait(period).await;
    }
}

/// Resolves the altitude a suicide-burn pass should stop at.
async fn safe_altitude(
    f_cont: &FlightComputer,
    params: &DescentParams,
    sample: &TelemetrySample,
    target: SafeAltitude,
) -> Result<f64, GuidanceError> {
    match target {
        SafeAltitude::TrackPeak => {
            let sizing = SuicideBurnEstimate::compute(
                sample,
                params.initial_estimate_altitude,
                params.burn_throttle,
            );
            if !sizing.is_defined() {
                return Ok(params.initial_estimate_altitude);
            }
            terrain::track_peak(
                f_cont,
                &sample.flight,
                sizing.ground_track,
                sample.orbit.equatorial_radius(),
                params.terrain_samples,
            )
            .await
        }
        SafeAltitude::LocalTerrain => {
            let flight = &sample.flight;
            let height = f_cont.terrain_height(flight.latitude, flight.longitude).await?;
            Ok(height + params.terrain_margin)
        }
    }
}
