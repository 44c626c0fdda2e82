use super::common::math::clamp_symmetric;

/// Gains and integral limit of a [`PidController`], as stored in the mission parameters.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Bound for the accumulated integral term.
    pub integral_clamp: f64,
}

impl PidGains {
    pub const fn new(kp: f64, ki: f64, kd: f64, integral_clamp: f64) -> Self {
        Self { kp, ki, kd, integral_clamp }
    }
}

/// Discrete PID controller with integral clamping and derivative on measurement.
///
/// One instance is owned per control axis by the phase that created it and dropped when that
/// phase exits. The controller keeps no clock of its own, every [`update`](Self::update) is
/// given the sample timestamp.
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    proportional: f64,
    /// Always inside `[-integral_clamp, integral_clamp]`.
    integral: f64,
    derivative: f64,
    setpoint: f64,
    integral_clamp: f64,
    last_sample_time: f64,
    last_measurement: f64,
}

impl PidController {
    /// Creates a controller at time `now` with a zero setpoint.
    pub fn new(gains: PidGains, now: f64) -> Self {
        Self {
            kp: gains.kp,
            ki: gains.ki,
            kd: gains.kd,
            proportional: 0.0,
            integral: 0.0,
            derivative: 0.0,
            setpoint: 0.0,
            integral_clamp: gains.integral_clamp.abs(),
            last_sample_time: now,
            last_measurement: 0.0,
        }
    }

    /// Creates a controller at time `now` already tracking `setpoint`.
    pub fn with_setpoint(gains: PidGains, setpoint: f64, now: f64) -> Self {
        let mut pid = Self::new(gains, now);
        pid.set_setpoint(setpoint);
        pid
    }

    /// Feeds one measurement taken at `now` and returns the control output.
    ///
    /// A zero time step (first sample right after construction) is replaced by one second.
    #[allow(clippy::float_cmp)]
    pub fn update(&mut self, measurement: f64, now: f64) -> f64 {
        let mut dt = now - self.last_sample_time;
        if dt == 0.0 {
            dt = 1.0;
        }
        let error = self.setpoint - measurement;
        self.proportional = error;
        self.integral = clamp_symmetric(self.integral + error, self.integral_clamp);
        self.derivative = (measurement - self.last_measurement) / dt;

        self.last_measurement = measurement;
        self.last_sample_time = now;

        self.kp * self.proportional + self.ki * self.integral - self.kd * self.derivative
    }

    /// Moves the setpoint and discards the accumulated integral.
    pub fn set_setpoint(&mut self, value: f64) {
        self.setpoint = value;
        self.integral = 0.0;
    }

    pub fn setpoint(&self) -> f64 { self.setpoint }

    pub fn integral(&self) -> f64 { self.integral }

    pub fn integral_clamp(&self) -> f64 { self.integral_clamp }

    pub fn proportional(&self) -> f64 { self.proportional }

    pub fn derivative(&self) -> f64 { self.derivative }
}
