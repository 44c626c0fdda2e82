use super::{common::vec3d::Vec3D, orbit::ManeuverNode};
use strum_macros::Display;

/// Attitude the autopilot should hold.
#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum AttitudeTarget {
    /// Pitch above the horizon and compass heading in degrees, with an optional roll.
    PitchHeading { pitch: f64, heading: f64, roll: Option<f64> },
    Prograde,
    Retrograde,
    /// Point along an inertial direction.
    Direction(Vec3D<f64>),
}

#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum WarpCommand {
    /// Warp on rails until the given universal time.
    To(f64),
    /// Physics warp factor, zero for real time.
    Physics(u8),
    /// Back to real time.
    Drop,
}

#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum NodeCommand {
    Add(ManeuverNode),
    RemoveNext,
}

/// Everything a guidance state machine wants done after one tick.
///
/// Unset fields leave the corresponding control untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Actuation {
    throttle: Option<f64>,
    attitude: Option<AttitudeTarget>,
    stage: bool,
    warp: Option<WarpCommand>,
    node: Option<NodeCommand>,
    translation: Option<Vec3D<f64>>,
    deploy_solar: bool,
}

impl Actuation {
    /// No change to any control.
    pub fn hold() -> Self { Self::default() }

    /// Zero throttle and nothing else.
    pub fn cut() -> Self { Self::hold().with_throttle(0.0) }

    /// Sets the throttle, clamped to `[0, 1]`. NaN is treated as zero.
    pub fn with_throttle(mut self, throttle: f64) -> Self {
        self.throttle = Some(if throttle.is_nan() { 0.0 } else { throttle.clamp(0.0, 1.0) });
        self
    }

    pub fn with_attitude(mut self, attitude: AttitudeTarget) -> Self {
        self.attitude = Some(attitude);
        self
    }

    pub fn with_stage(mut self) -> Self {
        self.stage = true;
        self
    }

    pub fn with_warp(mut self, warp: WarpCommand) -> Self {
        self.warp = Some(warp);
        self
    }

    pub fn with_node(mut self, node: NodeCommand) -> Self {
        self.node = Some(node);
        self
    }

    /// Sets the translation axes `(right, forward, up)`, each clamped to `[-1, 1]`.
    pub fn with_translation(mut self, translation: Vec3D<f64>) -> Self {
        let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) };
        self.translation =
            Some(Vec3D::new(clamp(translation.x()), clamp(translation.y()), clamp(translation.z())));
        self
    }

    pub fn with_solar_deploy(mut self) -> Self {
        self.deploy_solar = true;
        self
    }

    pub fn throttle(&self) -> Option<f64> { self.throttle }
    pub fn attitude(&self) -> Option<AttitudeTarget> { self.attitude }
    pub fn stage(&self) -> bool { self.stage }
    pub fn warp(&self) -> Option<WarpCommand> { self.warp }
    pub fn node(&self) -> Option<NodeCommand> { self.node }
    pub fn translation(&self) -> Option<Vec3D<f64>> { self.translation }
    pub fn deploy_solar(&self) -> bool { self.deploy_solar }
}
