use crate::flight_control::{
    actuation::{Actuation, WarpCommand},
    common::{math::clamp_symmetric, vec3d::Vec3D},
    error::GuidanceError,
    flight_computer::FlightComputer,
    pid::PidController,
    telemetry::DockingSample,
};
use crate::mission_params::{DockingParams, MissionParams, TickRates};
use crate::{info, phase};

/// Translation-only port-to-port approach.
///
/// Offsets are read in the frame of the controlling port, velocities in the frame of the target
/// port, whose right and forward axes point the other way. Each axis has its own PID driving
/// the matching translation control. The controller first holds a standoff in front of the
/// target port and, once lined up, crawls forward at a fixed speed.
#[derive(Debug, Clone)]
pub struct DockingController {
    params: DockingParams,
    right: PidController,
    forward: PidController,
    up: PidController,
    proceed: bool,
}

impl DockingController {
    pub fn new(params: DockingParams, now: f64) -> Self {
        Self {
            right: PidController::new(params.lateral_pid, now),
            forward: PidController::new(params.forward_pid, now),
            up: PidController::new(params.lateral_pid, now),
            params,
            proceed: false,
        }
    }

    pub fn is_proceeding(&self) -> bool { self.proceed }

    /// Whether the port is lined up on the standoff point within tolerance on every axis.
    pub fn proceed_check(&self, offset: Vec3D<f64>) -> bool {
        let tol = self.params.tolerance;
        offset.z().abs() < tol
            && offset.x().abs() < tol
            && (self.params.standoff - offset.y()).abs() < tol
    }

    /// Velocity setpoints `(right, forward, up)` in the target port frame.
    pub fn setpoints(&self, offset: Vec3D<f64>, proceed: bool) -> Vec3D<f64> {
        let limit = self.params.speed_limit;
        let forward = if proceed {
            self.params.crawl_speed
        } else {
            clamp_symmetric(self.params.standoff - offset.y(), limit)
        };
        Vec3D::new(-clamp_symmetric(offset.x(), limit), forward, clamp_symmetric(offset.z(), limit))
    }

    /// Maps one relative-state sample taken at `now` to translation commands.
    pub fn tick(&mut self, sample: &DockingSample, now: f64) -> Actuation {
        if !self.proceed && self.proceed_check(sample.offset) {
            phase!("Docking: lined up, proceeding");
            self.proceed = true;
        }
        let setpoints = self.setpoints(sample.offset, self.proceed);
        self.right.set_setpoint(setpoints.x());
        self.forward.set_setpoint(setpoints.y());
        self.up.set_setpoint(setpoints.z());

        let vel = sample.velocity;
        let translation = Vec3D::new(
            -self.right.update(vel.x(), now),
            -self.forward.update(vel.y(), now),
            -self.up.update(vel.z(), now),
        );
        Actuation::hold().with_translation(translation)
    }
}

/// Outcome of a completed docking approach.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DockingReport {
    pub docked_at: f64,
    /// Universal time at which the line-up finished, if it did before contact.
    pub lined_up_at: Option<f64>,
}

/// Flies the final approach until the ports report a hard dock.
///
/// # Errors
/// - [`GuidanceError::NoTarget`] if no target docking port is selected.
/// - [`GuidanceError::Aborted`] if the mission gets cancelled.
pub async fn run_docking(
    f_cont: &FlightComputer,
    params: &MissionParams,
) -> Result<DockingReport, GuidanceError> {
    let period = TickRates::period(params.ticks.docking);
    let mut controller = DockingController::new(params.docking, f_cont.ut().await?);
    let mut lined_up_at = None;
    let mut first_tick = true;
    loop {
        let ut = f_cont.ut().await?;
        let Some(sample) = f_cont.docking_offsets().await? else {
            f_cont.apply(&Actuation::hold().with_translation(Vec3D::zero())).await?;
            return Err(GuidanceError::NoTarget);
        };
        if sample.docked {
            f_cont.apply(&Actuation::hold().with_translation(Vec3D::zero())).await?;
            info!("Docked");
            return Ok(DockingReport { docked_at: ut, lined_up_at });
        }
        let mut actuation = controller.tick(&sample, ut);
        if first_tick {
            actuation = actuation.with_warp(WarpCommand::Drop);
            first_tick = false;
        }
        if controller.is_proceeding() {
            lined_up_at.get_or_insert(ut);
        }
        f_cont.apply(&actuation).await?;
        f_cont.wait(period).await;
    }
}
