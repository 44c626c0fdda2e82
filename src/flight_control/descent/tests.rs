use super::{
    ChuteLandingGuidance, DescentGuidance, SuicideBurnEstimate, run_chute_landing, run_descent,
    terrain,
};
use crate::flight_control::{
    actuation::{AttitudeTarget, WarpCommand},
    error::GuidanceError,
    flight_computer::FlightComputer,
    flight_phase::{ChuteLandingPhase, DescentPhase},
    mock_link::MockLink,
    orbit::{BodyParams, KeplerElements, OrbitState},
    telemetry::{FlightSample, StageResources, TelemetrySample, VesselSample},
};
use crate::mission_params::{ChuteLandingParams, DescentParams, MissionParams, SafeAltitude};
use rand::Rng;
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

const MUN_RADIUS: f64 = 200_000.0;

fn mun_orbit(apoapsis: f64, periapsis: f64, true_anomaly: f64) -> OrbitState {
    orbit_about(BodyParams::MUN, apoapsis, periapsis, true_anomaly)
}

/// Kerbin orbit on its way up from periapsis.
fn kerbin_orbit(apoapsis: f64, periapsis: f64) -> OrbitState {
    orbit_about(BodyParams::KERBIN, apoapsis, periapsis, 2.0)
}

fn orbit_about(body: BodyParams, apoapsis: f64, periapsis: f64, true_anomaly: f64) -> OrbitState {
    let e = (apoapsis - periapsis) / (apoapsis + periapsis);
    OrbitState::from_elements(
        body,
        KeplerElements {
            semi_major_axis: (apoapsis + periapsis) / 2.0,
            eccentricity: e,
            inclination: 0.0,
            longitude_of_ascending_node: 0.0,
            argument_of_periapsis: 0.0,
            mean_anomaly: OrbitState::mean_from_true(true_anomaly, e),
        },
        0.0,
    )
}

/// Falling towards the surface about half a minute before impact.
fn impact_orbit() -> OrbitState { mun_orbit(210_000.0, 90_000.0, 3.45) }

fn lander() -> VesselSample {
    VesselSample {
        mass: 1000.0,
        available_thrust: 20_000.0,
        max_thrust: 20_000.0,
        specific_impulse: 300.0,
        current_stage: 1,
    }
}

fn falling(altitude: f64, vertical_speed: f64) -> FlightSample {
    FlightSample {
        mean_altitude: altitude,
        surface_altitude: altitude,
        vertical_speed,
        speed: vertical_speed.abs(),
        ..FlightSample::default()
    }
}

fn sample(ut: f64, orbit: OrbitState, flight: FlightSample) -> TelemetrySample {
    TelemetrySample { ut, orbit, flight, vessel: lander() }
}

/// Guidance that already finished the deorbit burn, first pass aiming for sea level.
fn deorbited() -> DescentGuidance {
    let mut guidance = DescentGuidance::new(DescentParams::default());
    guidance.tick(&sample(0.0, impact_orbit(), falling(8000.0, -100.0))).unwrap();
    assert_eq!(guidance.phase(), DescentPhase::SuicideWait);
    assert_eq!(guidance.altitude_request(), Some(SafeAltitude::TrackPeak));
    guidance.resolve_altitude(0.0);
    guidance
}

#[test]
fn test_estimate_undefined_above_surface() {
    let mut rng = rand::rng();
    for _ in 0..300 {
        let periapsis = MUN_RADIUS + rng.random_range(1.0..500_000.0);
        let apoapsis = periapsis + rng.random_range(0.0..2_000_000.0);
        let orbit = mun_orbit(apoapsis, periapsis, rng.random_range(0.0..6.28));
        let flight = falling(rng.random_range(0.0..50_000.0), rng.random_range(-800.0..800.0));
        let ut = rng.random_range(0.0..1e6);
        let estimate = SuicideBurnEstimate::compute(
            &sample(ut, orbit, flight),
            rng.random_range(0.0..10_000.0),
            rng.random_range(0.1..1.0),
        );
        assert!(!estimate.is_defined());
        assert_eq!(estimate.countdown(ut), f64::INFINITY);
    }
}

#[test]
fn test_effective_deceleration() {
    let g = 1.63;
    let vertical = SuicideBurnEstimate::effective_deceleration(19.0, g, 1.0).unwrap();
    assert!((vertical - (19.0 - g)).abs() < 1e-9);
    let level = SuicideBurnEstimate::effective_deceleration(19.0, g, 0.0).unwrap();
    assert!((level - (19.0f64 * 19.0 - g * g).sqrt()).abs() < 1e-9);
    assert_eq!(SuicideBurnEstimate::effective_deceleration(1.0, g, 1.0), None);
}

#[test]
fn test_estimate_on_impact_course() {
    let s = sample(0.0, impact_orbit(), falling(8000.0, -100.0));
    let estimate = SuicideBurnEstimate::compute(&s, 0.0, 0.95);
    assert!(estimate.is_defined());
    assert!(estimate.impact_time > 30.0 && estimate.impact_time < 40.0, "{estimate:?}");
    assert!((estimate.burn_duration - 100.0 / estimate.effective_deceleration).abs() < 1e-9);
    assert!((estimate.ignition_time - (estimate.impact_time - estimate.burn_duration / 2.0)).abs() < 1e-9);
    assert!(estimate.ground_track > 0.0);
    assert_eq!(estimate.ensure_fresh(&s), Ok(()));
    let later = sample(0.1, impact_orbit(), falling(7990.0, -100.0));
    assert_eq!(estimate.ensure_fresh(&later), Err(GuidanceError::StaleEstimate));
    // same clock reading, but the orbit was updated since
    let refit = OrbitState::from_elements(BodyParams::MUN, *impact_orbit().elements(), 0.5);
    let resampled = sample(0.0, refit, falling(8000.0, -100.0));
    assert_eq!(estimate.ensure_fresh(&resampled), Err(GuidanceError::StaleEstimate));

    // stopping higher means starting earlier
    let higher = SuicideBurnEstimate::compute(&s, 2000.0, 0.95);
    assert!(higher.ignition_time < estimate.ignition_time);
}

#[test]
fn test_estimate_below_target_ignites_now() {
    let s = sample(50.0, impact_orbit(), falling(100.0, -40.0));
    let estimate = SuicideBurnEstimate::compute(&s, 0.0, 0.95);
    assert!(estimate.is_defined());
    assert!(estimate.countdown(50.0).abs() < f64::EPSILON);
}

#[test]
fn test_deorbit_needs_eccentricity_and_impact() {
    let params = DescentParams::default();
    let flight = falling(20_000.0, -10.0);

    // eccentric but still clear of the surface
    let mut guidance = DescentGuidance::new(params.clone());
    let act = guidance.tick(&sample(0.0, mun_orbit(400_000.0, 210_000.0, 1.0), flight)).unwrap();
    assert_eq!(guidance.phase(), DescentPhase::Deorbit);
    assert_eq!(act.throttle(), Some(1.0));
    assert_eq!(act.attitude(), Some(AttitudeTarget::Retrograde));

    // impacting but nearly circular
    let mut guidance = DescentGuidance::new(params.clone());
    guidance.tick(&sample(0.0, mun_orbit(209_000.0, 171_000.0, 1.0), flight)).unwrap();
    assert_eq!(guidance.phase(), DescentPhase::Deorbit);

    let mut guidance = DescentGuidance::new(params);
    let act = guidance.tick(&sample(0.0, impact_orbit(), flight)).unwrap();
    assert_eq!(guidance.phase(), DescentPhase::SuicideWait);
    assert_eq!(act.throttle(), Some(0.0));
    assert_eq!(act.warp(), None);
}

#[test]
fn test_wait_warps_once_then_ignites() {
    let mut guidance = deorbited();
    let s = sample(1.0, impact_orbit(), falling(8000.0, -100.0));
    let ignition = SuicideBurnEstimate::compute(&s, 0.0, 0.95).ignition_time;

    let act = guidance.tick(&s).unwrap();
    assert_eq!(act.throttle(), Some(0.0));
    let Some(WarpCommand::To(until)) = act.warp() else { panic!("no warp: {act:?}") };
    assert!((until - (ignition - 10.0)).abs() < 1e-9);
    assert_eq!(guidance.estimate(&s).unwrap().map(|e| e.computed_at), Some(1.0));

    let next = sample(2.0, impact_orbit(), falling(7900.0, -100.0));
    assert_eq!(guidance.estimate(&next), Err(GuidanceError::StaleEstimate));
    let act = guidance.tick(&next).unwrap();
    assert_eq!(act.warp(), None);
    assert_eq!(guidance.phase(), DescentPhase::SuicideWait);

    let late = sample(ignition + 0.5, impact_orbit(), falling(5000.0, -110.0));
    let act = guidance.tick(&late).unwrap();
    assert_eq!(guidance.phase(), DescentPhase::SuicideBurn);
    // overdue, so the reserve goes in
    assert_eq!(act.throttle(), Some(1.0));
    assert_eq!(act.warp(), Some(WarpCommand::Drop));
}

#[test]
fn test_pass_waits_for_its_stop_altitude() {
    let mut guidance = DescentGuidance::new(DescentParams::default());
    let orbit = impact_orbit();
    guidance.tick(&sample(0.0, orbit, falling(8000.0, -100.0))).unwrap();
    assert_eq!(guidance.safe_altitude(), None);

    // overdue, but nothing to aim for yet
    let act = guidance.tick(&sample(100.0, orbit, falling(300.0, -100.0))).unwrap();
    assert_eq!(guidance.phase(), DescentPhase::SuicideWait);
    assert_eq!(act.throttle(), Some(0.0));
    assert_eq!(guidance.altitude_request(), Some(SafeAltitude::TrackPeak));

    guidance.resolve_altitude(120.0);
    assert_eq!(guidance.altitude_request(), None);
    for tick in 1..5 {
        guidance.tick(&sample(100.0 + f64::from(tick) * 0.1, orbit, falling(300.0, -100.0))).unwrap();
        assert_eq!(guidance.altitude_request(), None);
        assert_eq!(guidance.safe_altitude(), Some(120.0));
    }
    assert_eq!(guidance.phase(), DescentPhase::SuicideBurn);
    let s = sample(100.5, orbit, falling(290.0, -95.0));
    guidance.tick(&s).unwrap();
    assert_eq!(guidance.estimate(&s).unwrap().map(|e| e.target_altitude), Some(120.0));
}

#[test]
fn test_passes_then_final_descent() {
    let mut guidance = deorbited();
    let orbit = impact_orbit();
    let ignition = SuicideBurnEstimate::compute(&sample(0.5, orbit, falling(8000.0, -100.0)), 0.0, 0.95)
        .ignition_time;
    let act = guidance.tick(&sample(ignition, orbit, falling(5000.0, -100.0))).unwrap();
    assert_eq!(guidance.phase(), DescentPhase::SuicideBurn);
    assert_eq!(guidance.current_pass().map(|p| p.target), Some(SafeAltitude::TrackPeak));
    assert_eq!(act.warp(), Some(WarpCommand::Drop));

    let act = guidance.tick(&sample(ignition + 1.0, orbit, falling(4900.0, -60.0))).unwrap();
    assert!(act.throttle().unwrap() >= 0.95);
    assert_eq!(act.warp(), None);

    // first pass done, the second one waits with the engine off
    let act = guidance.tick(&sample(ignition + 5.0, orbit, falling(4600.0, -9.0))).unwrap();
    assert_eq!(act.throttle(), Some(0.0));
    assert_eq!(guidance.phase(), DescentPhase::SuicideBurn);
    assert_eq!(guidance.current_pass().map(|p| p.target), Some(SafeAltitude::LocalTerrain));
    assert_eq!(guidance.altitude_request(), Some(SafeAltitude::LocalTerrain));
    guidance.resolve_altitude(10.0);

    let act = guidance.tick(&sample(ignition + 5.1, orbit, falling(4599.0, -9.2))).unwrap();
    assert_eq!(act.warp(), Some(WarpCommand::Drop));
    let last = sample(ignition + 5.5, orbit, falling(4597.0, -4.0));
    guidance.tick(&last).unwrap();
    assert_eq!(guidance.phase(), DescentPhase::FinalDescent);
    assert_eq!(guidance.current_pass(), None);
    assert_eq!(guidance.altitude_request(), None);
    assert_eq!(guidance.estimate(&last), Ok(None));
}

#[test]
fn test_final_descent_setpoint_and_touchdown() {
    let guidance = DescentGuidance::new(DescentParams::default());
    assert!((guidance.final_descent_setpoint(400.0) + 15.0).abs() < f64::EPSILON);
    assert!((guidance.final_descent_setpoint(50.0) + 5.0).abs() < f64::EPSILON);
    assert!(guidance.final_descent_setpoint(0.0).abs() < f64::EPSILON);

    let mut guidance = deorbited();
    let orbit = impact_orbit();
    let mut ut = 100.0;
    // past impact on the static orbit, every pass ignites right away
    for vs in [-30.0, -8.0, -8.0, -3.0] {
        if guidance.altitude_request().is_some() {
            guidance.resolve_altitude(10.0);
        }
        guidance.tick(&sample(ut, orbit, falling(300.0, vs))).unwrap();
        ut += 0.1;
    }
    assert_eq!(guidance.phase(), DescentPhase::FinalDescent);
    // well below the setpoint of -15 m/s, throttle up
    let act = guidance.tick(&sample(ut, orbit, falling(300.0, -25.0))).unwrap();
    assert_eq!(act.throttle(), Some(1.0));
    // on the setpoint and slowing fast, throttle back
    let act = guidance.tick(&sample(ut + 0.1, orbit, falling(298.5, -15.0))).unwrap();
    assert!(act.throttle().unwrap() < 0.5, "{act:?}");

    let landed = FlightSample { landed: true, ..falling(0.0, -0.5) };
    let act = guidance.tick(&sample(ut + 0.2, orbit, landed)).unwrap();
    assert!(guidance.is_landed());
    assert_eq!(act.throttle(), Some(0.0));
    assert_eq!(
        guidance.tick(&sample(ut + 0.3, orbit, landed)),
        Err(GuidanceError::IllegalTransition)
    );
}

#[test]
fn test_coords_down_bearing() {
    let quarter = MUN_RADIUS * std::f64::consts::FRAC_PI_2;
    let (lat, lon) = terrain::coords_down_bearing(0.0, 0.0, 90.0, quarter, MUN_RADIUS);
    assert!(lat.abs() < 1e-9 && (lon - 90.0).abs() < 1e-9, "{lat} {lon}");
    let (lat, _) = terrain::coords_down_bearing(0.0, 10.0, 0.0, quarter, MUN_RADIUS);
    assert!((lat - 90.0).abs() < 1e-9);
    let (lat, lon) = terrain::coords_down_bearing(0.0, 170.0, 90.0, quarter / 4.5, MUN_RADIUS);
    assert!(lat.abs() < 1e-9 && (lon + 170.0).abs() < 1e-9, "{lat} {lon}");
}

#[test]
fn test_track_points() {
    let points = terrain::track_points((0.0, 0.0), (1.0, -2.0), 20);
    assert_eq!(points.len(), 20);
    assert_eq!(points[0], (0.0, 0.0));
    assert!((points[19].0 - 1.0).abs() < 1e-12 && (points[19].1 + 2.0).abs() < 1e-12);
    assert_eq!(terrain::track_points((3.0, 4.0), (5.0, 6.0), 1), vec![(3.0, 4.0)]);
}

#[tokio::test(start_paused = true)]
async fn test_run_descent_lands_softly() {
    let link = Arc::new(MockLink::new(impact_orbit()).with(|s| {
        s.vessel = lander();
        s.flight = falling(8000.0, -100.0);
        s.vertical_model = true;
    }));
    let f_cont = FlightComputer::new(link.clone(), CancellationToken::new(), 5);
    let report = tokio::time::timeout(
        Duration::from_secs(3600),
        run_descent(&f_cont, &MissionParams::default()),
    )
    .await
    .expect("descent did not finish")
    .unwrap();

    let state = link.snapshot().await;
    assert!(state.flight.landed);
    assert_eq!(state.throttle, 0.0);
    assert!(report.touchdown_speed > -2.0, "{report:?}");
    assert!(report.planned_ignition.is_some());
    // one warp towards the first ignition, dropped again before each pass lights
    assert_eq!(state.warps.len(), 1);
    assert!(state.warp_drops >= 2);
    // track peak once for the first pass, local terrain once for the second
    let samples = MissionParams::default().descent.terrain_samples;
    assert_eq!(state.terrain_queries as usize, samples + 1);
}

fn next_stage(undeployed_chutes: bool) -> StageResources {
    StageResources { stage: 0, levels: Vec::new(), undeployed_chutes, burning_engines: 0 }
}

#[test]
fn test_chute_landing_sequence() {
    let mut guidance = ChuteLandingGuidance::new(ChuteLandingParams::default());
    let high = kerbin_orbit(700_000.0, 680_000.0);
    let act = guidance.tick(&sample(0.0, high, falling(80_000.0, 0.0)), None).unwrap();
    assert_eq!(guidance.phase(), ChuteLandingPhase::DeorbitBurn);
    assert_eq!(act.throttle(), Some(0.5));
    assert_eq!(act.attitude(), Some(AttitudeTarget::Retrograde));

    let low = kerbin_orbit(700_000.0, 640_000.0);
    let act = guidance.tick(&sample(10.0, low, falling(80_000.0, -10.0)), None).unwrap();
    assert_eq!(guidance.phase(), ChuteLandingPhase::Coast);
    assert_eq!(act.throttle(), Some(0.0));
    assert_eq!(act.warp(), Some(WarpCommand::To(10.0 + low.time_to_periapsis())));

    // 90 % of Kerbin's 70 km atmosphere
    let act = guidance.tick(&sample(500.0, low, falling(63_500.0, -300.0)), None).unwrap();
    assert_eq!(guidance.phase(), ChuteLandingPhase::Coast);
    assert_eq!(act.warp(), None);
    let act = guidance.tick(&sample(501.0, low, falling(62_900.0, -300.0)), None).unwrap();
    assert_eq!(guidance.phase(), ChuteLandingPhase::Deceleration);
    assert_eq!(act.throttle(), Some(1.0));
    assert_eq!(act.warp(), Some(WarpCommand::Drop));

    let act = guidance.tick(&sample(515.0, low, falling(61_000.0, -150.0)), None).unwrap();
    assert_eq!(act.throttle(), Some(1.0));
    let act = guidance.tick(&sample(521.0, low, falling(60_000.0, -50.0)), None).unwrap();
    assert_eq!(guidance.phase(), ChuteLandingPhase::Destage);
    assert_eq!(act.throttle(), Some(0.0));
    assert!(guidance.wants_resources());

    let spent = next_stage(false);
    let act = guidance.tick(&sample(521.5, low, falling(60_000.0, -50.0)), Some(&spent)).unwrap();
    assert!(act.stage());
    assert_eq!(guidance.phase(), ChuteLandingPhase::Destage);
    let chutes = next_stage(true);
    let act = guidance.tick(&sample(522.0, low, falling(60_000.0, -55.0)), Some(&chutes)).unwrap();
    assert!(!act.stage());
    assert_eq!(guidance.phase(), ChuteLandingPhase::AwaitChutes);

    let act = guidance.tick(&sample(600.0, low, falling(3500.0, -200.0)), None).unwrap();
    assert!(!act.stage());
    let act = guidance.tick(&sample(603.0, low, falling(2900.0, -200.0)), None).unwrap();
    assert!(act.stage());
    assert!(guidance.is_complete());
    assert_eq!(
        guidance.tick(&sample(604.0, low, falling(2700.0, -200.0)), None),
        Err(GuidanceError::IllegalTransition)
    );
}

#[test]
fn test_chute_landing_needs_air_and_chutes() {
    let mut guidance = ChuteLandingGuidance::new(ChuteLandingParams::default());
    let res = guidance.tick(&sample(0.0, impact_orbit(), falling(8000.0, -100.0)), None);
    assert_eq!(res, Err(GuidanceError::NoAtmosphere));

    let params = ChuteLandingParams { deceleration_burn: 0.0, ..ChuteLandingParams::default() };
    let mut guidance = ChuteLandingGuidance::new(params);
    let low = kerbin_orbit(700_000.0, 640_000.0);
    for (ut, altitude) in [(0.0, 80_000.0), (1.0, 60_000.0), (2.0, 59_000.0)] {
        guidance.tick(&sample(ut, low, falling(altitude, -100.0)), None).unwrap();
    }
    assert_eq!(guidance.phase(), ChuteLandingPhase::Destage);
    let mut last_stage = sample(3.0, low, falling(58_000.0, -100.0));
    last_stage.vessel.current_stage = 0;
    assert_eq!(
        guidance.tick(&last_stage, Some(&next_stage(false))),
        Err(GuidanceError::NoParachutes)
    );
}

#[tokio::test(start_paused = true)]
async fn test_run_chute_landing() {
    let link = Arc::new(MockLink::new(kerbin_orbit(700_000.0, 640_000.0)).with(|s| {
        s.vessel = lander();
        s.flight = falling(65_000.0, -200.0);
        s.vertical_model = true;
        s.next_stage_resources = Some(next_stage(true));
    }));
    let f_cont = FlightComputer::new(link.clone(), CancellationToken::new(), 5);
    let report = tokio::time::timeout(
        Duration::from_secs(3600),
        run_chute_landing(&f_cont, &MissionParams::default()),
    )
    .await
    .expect("chute landing did not finish")
    .unwrap();

    assert_eq!(report.stages_dropped, 1);
    assert!(report.chute_altitude < 3000.0 && report.chute_altitude > 2000.0, "{report:?}");
    let state = link.snapshot().await;
    // the spent stage, then the parachutes
    assert_eq!(state.stages_activated, 2);
    assert_eq!(state.warps.len(), 1);
    assert_eq!(state.warp_drops, 1);
    assert_eq!(state.throttle, 0.0);
}
