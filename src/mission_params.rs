use crate::flight_control::{GuidanceError, PidGains, Propellant};
use itertools::Itertools;
use std::time::Duration;

/// Immutable configuration of one mission, handed to every guidance state machine at
/// construction.
///
/// Altitudes are in m above sea level, speeds in m/s and angles in degrees unless noted.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MissionParams {
    pub ascent: AscentParams,
    pub staging: StagingParams,
    pub burn: BurnParams,
    pub descent: DescentParams,
    pub chute_landing: ChuteLandingParams,
    pub rendezvous: RendezvousParams,
    pub docking: DockingParams,
    pub ticks: TickRates,
    /// Consecutive failed telemetry reads tolerated before a runner gives up.
    pub max_link_retries: u32,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AscentParams {
    pub target_altitude: f64,
    /// Altitude at which the gravity turn reaches zero pitch.
    pub turn_finish_altitude: f64,
    /// Target inclination, converted to a launch heading.
    pub inclination: f64,
    pub force_roll: bool,
    pub roll: f64,
    /// Dynamic pressure limit, in Pa.
    pub max_q: f64,
    /// Gains of the dynamic-pressure throttle loop. The integral clamp is raised to `max_q`.
    pub q_pid: PidGains,
    /// Fraction of the target apoapsis at which the gravity turn ends.
    pub trim_fraction: f64,
    pub trim_throttle: f64,
    pub max_physics_warp: u8,
    pub deploy_solar: bool,
}

impl Default for AscentParams {
    fn default() -> Self {
        Self {
            target_altitude: 100_000.0,
            turn_finish_altitude: 55_000.0,
            inclination: 0.0,
            force_roll: true,
            roll: 90.0,
            max_q: 20_000.0,
            q_pid: PidGains::new(0.001, 0.0001, 0.01, 20_000.0),
            trim_fraction: 0.95,
            trim_throttle: 0.2,
            max_physics_warp: 3,
            deploy_solar: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StagingParams {
    pub enabled: bool,
    /// Last stage that may be separated automatically.
    pub max_auto_stage: i32,
    pub tracked: Vec<Propellant>,
    /// Also refuse staging through parachutes or burning engines.
    pub strict: bool,
}

impl Default for StagingParams {
    fn default() -> Self {
        Self {
            enabled: true,
            max_auto_stage: 0,
            tracked: vec![Propellant::LiquidFuel, Propellant::SolidFuel],
            strict: false,
        }
    }
}

/// Throttle reduction at the end of a burn.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TaperPolicy {
    /// Full throttle until the predicted remaining burn time drops below `window` seconds,
    /// then throttle so that the rest takes exactly `window` seconds, never below `floor`.
    HoldBurnTime { window: f64, floor: f64 },
    /// Full throttle until `band` m/s remain, then a fixed `throttle`.
    FixedFinal { band: f64, throttle: f64 },
    /// Steps down to 0.25, 0.1 and 0.05 once the remaining delta-v falls below one, a half and
    /// a third of a second of full-thrust acceleration.
    TwrStepped,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BurnParams {
    /// Margin between the end of the warp and the ignition time, in s.
    pub lead_time: f64,
    pub taper: TaperPolicy,
    /// Evaluate the autostager every burn tick.
    pub autostage: bool,
}

impl Default for BurnParams {
    fn default() -> Self {
        Self {
            lead_time: 5.0,
            taper: TaperPolicy::HoldBurnTime { window: 2.0, floor: 0.005 },
            autostage: true,
        }
    }
}

/// Safety altitude a suicide-burn pass aims for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SafeAltitude {
    /// Highest terrain sampled along the projected ground track.
    TrackPeak,
    /// Terrain directly below plus the terrain margin.
    LocalTerrain,
}

/// One suicide-burn pass, ended once the descent rate drops below `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BurnPass {
    pub threshold: f64,
    pub target: SafeAltitude,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DescentParams {
    /// Eccentricity the deorbit burn must reach.
    pub deorbit_eccentricity: f64,
    /// Throttle share the estimator plans with. The rest is kept for overruns.
    pub burn_throttle: f64,
    /// Altitude of the first, ground-track-sizing estimate.
    pub initial_estimate_altitude: f64,
    pub terrain_margin: f64,
    pub terrain_samples: usize,
    /// Passes run strictly in order, thresholds must decrease.
    pub passes: Vec<BurnPass>,
    pub autowarp: bool,
    /// Warp stops this many seconds before ignition.
    pub warp_margin: f64,
    /// Throttle loop of the final descent. Its setpoint moves every tick and so resets the
    /// integral, leaving `kp + ki` as the effective proportional gain.
    pub final_pid: PidGains,
    /// The final descent rate is the height above terrain divided by this.
    pub descent_rate_divisor: f64,
    pub max_descent_rate: f64,
}

impl Default for DescentParams {
    fn default() -> Self {
        Self {
            deorbit_eccentricity: 0.3,
            burn_throttle: 0.95,
            initial_estimate_altitude: 5000.0,
            terrain_margin: 10.0,
            terrain_samples: 20,
            passes: vec![
                BurnPass { threshold: 10.0, target: SafeAltitude::TrackPeak },
                BurnPass { threshold: 5.0, target: SafeAltitude::LocalTerrain },
            ],
            autowarp: true,
            warp_margin: 10.0,
            final_pid: PidGains::new(0.25, 0.05, 0.01, 1.0),
            descent_rate_divisor: 10.0,
            max_descent_rate: 15.0,
        }
    }
}

/// Unpowered return through an atmosphere under parachutes.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChuteLandingParams {
    /// Periapsis altitude the deorbit burn lowers the orbit to.
    pub target_periapsis: f64,
    pub deorbit_throttle: f64,
    /// Share of the atmosphere depth below which the warp ends and the deceleration burn
    /// starts.
    pub destage_fraction: f64,
    /// Length of the full-throttle deceleration burn, in s.
    pub deceleration_burn: f64,
    /// The parachute stage fires below this altitude.
    pub chute_altitude: f64,
}

impl Default for ChuteLandingParams {
    fn default() -> Self {
        Self {
            target_periapsis: 45_000.0,
            deorbit_throttle: 0.5,
            destage_fraction: 0.9,
            deceleration_burn: 20.0,
            chute_altitude: 3000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RendezvousParams {
    /// Relative inclination below which no plane change is planned.
    pub min_plane_change: f64,
    /// Separation is divided by this to get the closing speed.
    pub closing_divisor: f64,
    /// Separation at which docking takes over, in m.
    pub handoff_distance: f64,
    pub max_closing_iterations: u32,
}

impl Default for RendezvousParams {
    fn default() -> Self {
        Self {
            min_plane_change: 0.25,
            closing_divisor: 200.0,
            handoff_distance: 100.0,
            max_closing_iterations: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DockingParams {
    pub lateral_pid: PidGains,
    pub forward_pid: PidGains,
    /// Bound for every velocity setpoint, in m/s.
    pub speed_limit: f64,
    /// Hold distance in front of the target port while lining up, in m.
    pub standoff: f64,
    /// Line-up tolerance on every axis, in m.
    pub tolerance: f64,
    /// Forward velocity setpoint once lined up, in m/s.
    pub crawl_speed: f64,
}

impl Default for DockingParams {
    fn default() -> Self {
        Self {
            lateral_pid: PidGains::new(0.75, 0.25, 1.0, 1.0),
            forward_pid: PidGains::new(0.75, 0.2, 0.5, 1.0),
            speed_limit: 1.0,
            standoff: 10.0,
            tolerance: 0.1,
            crawl_speed: -0.2,
        }
    }
}

/// Sample rates of the runners, in Hz.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TickRates {
    /// Gravity turn and coast.
    pub guidance: f64,
    /// Node execution and descent.
    pub burn: f64,
    /// Apoapsis trim, which has no natural sample rate.
    pub fine: f64,
    pub docking: f64,
}

impl Default for TickRates {
    fn default() -> Self { Self { guidance: 2.0, burn: 10.0, fine: 50.0, docking: 10.0 } }
}

impl TickRates {
    pub fn period(hz: f64) -> Duration { Duration::from_secs_f64(1.0 / hz) }
}

impl Default for MissionParams {
    fn default() -> Self {
        Self {
            ascent: AscentParams::default(),
            staging: StagingParams::default(),
            burn: BurnParams::default(),
            descent: DescentParams::default(),
            chute_landing: ChuteLandingParams::default(),
            rendezvous: RendezvousParams::default(),
            docking: DockingParams::default(),
            ticks: TickRates::default(),
            max_link_retries: 5,
        }
    }
}

impl MissionParams {
    /// Checks value ranges that would otherwise surface as NaN or endless loops mid-flight.
    ///
    /// # Errors
    /// - [`GuidanceError::InvalidParams`] naming the first offending field.
    pub fn validate(&self) -> Result<(), GuidanceError> {
        let invalid = |field: &str| Err(GuidanceError::InvalidParams(field.to_string()));
        let a = &self.ascent;
        if a.target_altitude <= 0.0 {
            return invalid("ascent.target_altitude");
        }
        if a.turn_finish_altitude <= 0.0 {
            return invalid("ascent.turn_finish_altitude");
        }
        if a.max_q <= 0.0 {
            return invalid("ascent.max_q");
        }
        if !(0.0..=1.0).contains(&a.trim_fraction) || !(0.0..=1.0).contains(&a.trim_throttle) {
            return invalid("ascent.trim");
        }
        if self.burn.lead_time < 0.0 {
            return invalid("burn.lead_time");
        }
        match self.burn.taper {
            TaperPolicy::HoldBurnTime { window, floor } if window <= 0.0 || floor <= 0.0 => {
                return invalid("burn.taper");
            }
            TaperPolicy::FixedFinal { band, throttle } if band <= 0.0 || throttle <= 0.0 => {
                return invalid("burn.taper");
            }
            _ => {}
        }
        let d = &self.descent;
        if d.burn_throttle <= 0.0 || d.burn_throttle > 1.0 {
            return invalid("descent.burn_throttle");
        }
        if d.terrain_samples == 0 || d.descent_rate_divisor <= 0.0 || d.max_descent_rate <= 0.0 {
            return invalid("descent.final");
        }
        if d.passes.is_empty()
            || d.passes.iter().any(|p| p.threshold <= 0.0)
            || d.passes.iter().tuple_windows().any(|(a, b)| b.threshold >= a.threshold)
        {
            return invalid("descent.passes");
        }
        let c = &self.chute_landing;
        if c.deorbit_throttle <= 0.0 || c.deorbit_throttle > 1.0 {
            return invalid("chute_landing.deorbit_throttle");
        }
        if c.destage_fraction <= 0.0 || c.destage_fraction > 1.0 || c.chute_altitude <= 0.0 {
            return invalid("chute_landing.altitudes");
        }
        if c.deceleration_burn < 0.0 {
            return invalid("chute_landing.deceleration_burn");
        }
        let r = &self.rendezvous;
        if r.closing_divisor <= 0.0 || r.handoff_distance <= 0.0 {
            return invalid("rendezvous");
        }
        let k = &self.docking;
        if k.speed_limit <= 0.0 || k.standoff <= 0.0 || k.tolerance <= 0.0 {
            return invalid("docking");
        }
        let t = &self.ticks;
        if [t.guidance, t.burn, t.fine, t.docking].iter().any(|hz| *hz <= 0.0 || !hz.is_finite()) {
            return invalid("ticks");
        }
        Ok(())
    }
}
