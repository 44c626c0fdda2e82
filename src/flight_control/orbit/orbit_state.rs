use crate::flight_control::{
    common::{
        math::{wrap_pi, wrap_two_pi},
        vec3d::Vec3D,
    },
    error::GuidanceError,
};
use std::f64::consts::{PI, TAU};

/// Physical parameters of the primary body the vehicle orbits.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BodyParams {
    /// Standard gravitational parameter `mu`, in m^3/s^2.
    pub gravitational_parameter: f64,
    /// Equatorial radius, in m.
    pub equatorial_radius: f64,
    /// Gravitational acceleration at the surface, in m/s^2.
    pub surface_gravity: f64,
    /// Height of the atmosphere, zero for airless bodies, in m.
    pub atmosphere_depth: f64,
}

impl BodyParams {
    /// Kerbin, the usual launch site.
    pub const KERBIN: BodyParams = BodyParams {
        gravitational_parameter: 3.531_6e12,
        equatorial_radius: 600_000.0,
        surface_gravity: 9.81,
        atmosphere_depth: 70_000.0,
    };

    /// The Mun, an airless landing target.
    pub const MUN: BodyParams = BodyParams {
        gravitational_parameter: 6.514_2e10,
        equatorial_radius: 200_000.0,
        surface_gravity: 1.63,
        atmosphere_depth: 0.0,
    };

    /// Earth, used for sanity checks against textbook numbers.
    pub const EARTH: BodyParams = BodyParams {
        gravitational_parameter: 3.986e14,
        equatorial_radius: 6_378_000.0,
        surface_gravity: 9.80665,
        atmosphere_depth: 100_000.0,
    };
}

/// Classical Keplerian elements, angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeplerElements {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub longitude_of_ascending_node: f64,
    pub argument_of_periapsis: f64,
    /// Mean anomaly at the epoch of the snapshot.
    pub mean_anomaly: f64,
}

/// Read-only snapshot of the vehicle's orbit at one telemetry sample.
///
/// All derived quantities (apsides, anomalies, times to apsides) are computed once on
/// construction from the Keplerian elements, so a snapshot is always self-consistent. Elliptic
/// orbits support propagation, everything else is reported as degenerate by
/// [`validate`](Self::validate).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrbitState {
    body: BodyParams,
    elements: KeplerElements,
    /// Universal time the snapshot was taken at, in s.
    epoch: f64,
    apoapsis: f64,
    periapsis: f64,
    true_anomaly: f64,
    radius: f64,
    speed: f64,
    period: f64,
    time_to_apoapsis: f64,
    time_to_periapsis: f64,
}

impl OrbitState {
    /// Iteration bound for the Newton solver of Kepler's equation.
    const KEPLER_MAX_ITER: usize = 50;
    /// Convergence bound for the Newton solver, in rad.
    const KEPLER_TOL: f64 = 1e-12;

    /// Builds a snapshot from Keplerian elements sampled at universal time `epoch`.
    pub fn from_elements(body: BodyParams, elements: KeplerElements, epoch: f64) -> Self {
        let a = elements.semi_major_axis;
        let e = elements.eccentricity;
        let mu = body.gravitational_parameter;
        let elliptic = e < 1.0 && a > 0.0;

        let periapsis = a * (1.0 - e);
        let apoapsis = if elliptic { a * (1.0 + e) } else { f64::INFINITY };
        let period = if elliptic { TAU * (a.powi(3) / mu).sqrt() } else { f64::INFINITY };
        let true_anomaly = if elliptic {
            Self::true_from_mean(wrap_two_pi(elements.mean_anomaly), e)
        } else {
            f64::NAN
        };
        let radius = if elliptic {
            a * (1.0 - e * e) / (1.0 + e * true_anomaly.cos())
        } else {
            periapsis
        };
        let speed = (mu * (2.0 / radius - 1.0 / a)).sqrt();

        let mut state = Self {
            body,
            elements,
            epoch,
            apoapsis,
            periapsis,
            true_anomaly,
            radius,
            speed,
            period,
            time_to_apoapsis: f64::INFINITY,
            time_to_periapsis: f64::NAN,
        };
        if elliptic {
            state.time_to_apoapsis = state.time_to_true_anomaly(PI).unwrap_or(f64::INFINITY);
            state.time_to_periapsis = state.time_to_true_anomaly(0.0).unwrap_or(f64::NAN);
        }
        state
    }

    /// Builds a circular orbit of the given radius with the vehicle at the ascending node.
    pub fn circular(body: BodyParams, radius: f64, inclination: f64, epoch: f64) -> Self {
        Self::from_elements(
            body,
            KeplerElements {
                semi_major_axis: radius,
                eccentricity: 0.0,
                inclination,
                longitude_of_ascending_node: 0.0,
                argument_of_periapsis: 0.0,
                mean_anomaly: 0.0,
            },
            epoch,
        )
    }

    /// Returns the same orbit with the vehicle advanced by `mean_anomaly` radians.
    pub fn with_mean_anomaly(&self, mean_anomaly: f64) -> Self {
        let elements = KeplerElements { mean_anomaly, ..self.elements };
        Self::from_elements(self.body, elements, self.epoch)
    }

    /// Rejects orbits without well-defined apsides or with non-finite elements.
    ///
    /// # Errors
    /// - [`GuidanceError::DegenerateOrbit`] for hyperbolic, parabolic or non-finite orbits.
    pub fn validate(&self) -> Result<(), GuidanceError> {
        let el = &self.elements;
        let finite = [
            el.semi_major_axis,
            el.eccentricity,
            el.inclination,
            el.longitude_of_ascending_node,
            el.argument_of_periapsis,
            el.mean_anomaly,
            self.body.gravitational_parameter,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite || el.semi_major_axis <= 0.0 || !(0.0..1.0).contains(&el.eccentricity) {
            return Err(GuidanceError::DegenerateOrbit);
        }
        Ok(())
    }

    /// Solves Kepler's equation for the eccentric anomaly by Newton iteration.
    pub fn eccentric_from_mean(mean_anomaly: f64, e: f64) -> f64 {
        let m = wrap_two_pi(mean_anomaly);
        let mut ecc = if e > 0.8 { PI } else { m };
        for _ in 0..Self::KEPLER_MAX_ITER {
            let step = (ecc - e * ecc.sin() - m) / (1.0 - e * ecc.cos());
            ecc -= step;
            if step.abs() < Self::KEPLER_TOL {
                break;
            }
        }
        ecc
    }

    /// Converts a mean anomaly to a true anomaly in `[0, 2*pi)`.
    pub fn true_from_mean(mean_anomaly: f64, e: f64) -> f64 {
        let ecc = Self::eccentric_from_mean(mean_anomaly, e);
        let nu = 2.0 * ((1.0 + e).sqrt() * (ecc / 2.0).sin()).atan2((1.0 - e).sqrt() * (ecc / 2.0).cos());
        wrap_two_pi(nu)
    }

    /// Converts a true anomaly to a mean anomaly in `[0, 2*pi)`.
    pub fn mean_from_true(true_anomaly: f64, e: f64) -> f64 {
        let half = wrap_pi(true_anomaly) / 2.0;
        let ecc = 2.0 * ((1.0 - e).sqrt() * half.sin()).atan2((1.0 + e).sqrt() * half.cos());
        wrap_two_pi(ecc - e * ecc.sin())
    }

    /// Mean motion `n = sqrt(mu / a^3)`, in rad/s.
    pub fn mean_motion(&self) -> f64 {
        (self.body.gravitational_parameter / self.elements.semi_major_axis.powi(3)).sqrt()
    }

    /// Semi-latus rectum `p = a (1 - e^2)`.
    pub fn semi_latus_rectum(&self) -> f64 {
        self.elements.semi_major_axis * (1.0 - self.elements.eccentricity.powi(2))
    }

    /// Orbital speed at distance `radius` from the body's center (vis-viva).
    pub fn speed_at_radius(&self, radius: f64) -> f64 {
        (self.body.gravitational_parameter * (2.0 / radius - 1.0 / self.elements.semi_major_axis))
            .sqrt()
    }

    /// Distance from the body's center at the given true anomaly.
    pub fn radius_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        self.semi_latus_rectum() / (1.0 + self.elements.eccentricity * true_anomaly.cos())
    }

    /// True anomaly in `[0, pi]` at which the orbit passes through `radius`.
    ///
    /// The descending-side crossing is the negated value. Returns `None` if the orbit never
    /// reaches that radius or the orbit is degenerate.
    pub fn true_anomaly_at_radius(&self, radius: f64) -> Option<f64> {
        if self.validate().is_err() || radius <= 0.0 {
            return None;
        }
        let cos_nu = (self.semi_latus_rectum() / radius - 1.0) / self.elements.eccentricity;
        // apsides land a rounding error outside [-1, 1]
        if !cos_nu.is_finite() || cos_nu.abs() > 1.0 + 1e-9 {
            return None;
        }
        Some(cos_nu.clamp(-1.0, 1.0).acos())
    }

    /// Mean anomaly at universal time `ut`.
    pub fn mean_anomaly_at(&self, ut: f64) -> f64 {
        wrap_two_pi(self.elements.mean_anomaly + self.mean_motion() * (ut - self.epoch))
    }

    /// True anomaly at universal time `ut`.
    pub fn true_anomaly_at(&self, ut: f64) -> f64 {
        Self::true_from_mean(self.mean_anomaly_at(ut), self.elements.eccentricity)
    }

    /// Time from the snapshot epoch until the vehicle next passes `true_anomaly`, in
    /// `[0, period)`.
    pub fn time_to_true_anomaly(&self, true_anomaly: f64) -> Option<f64> {
        self.validate().ok()?;
        let target = Self::mean_from_true(true_anomaly, self.elements.eccentricity);
        let current = wrap_two_pi(self.elements.mean_anomaly);
        Some(wrap_two_pi(target - current) / self.mean_motion())
    }

    /// Universal time at which the vehicle next passes `true_anomaly`.
    pub fn ut_at_true_anomaly(&self, true_anomaly: f64) -> Option<f64> {
        self.time_to_true_anomaly(true_anomaly).map(|dt| self.epoch + dt)
    }

    /// Unit vectors `(P, Q, W)` of the perifocal frame expressed in the body-centered inertial
    /// frame: `P` towards periapsis, `W` along the orbital angular momentum.
    pub fn perifocal_basis(&self) -> (Vec3D<f64>, Vec3D<f64>, Vec3D<f64>) {
        let (sin_o, cos_o) = self.elements.longitude_of_ascending_node.sin_cos();
        let (sin_w, cos_w) = self.elements.argument_of_periapsis.sin_cos();
        let (sin_i, cos_i) = self.elements.inclination.sin_cos();
        let p = Vec3D::new(
            cos_o * cos_w - sin_o * sin_w * cos_i,
            sin_o * cos_w + cos_o * sin_w * cos_i,
            sin_w * sin_i,
        );
        let q = Vec3D::new(
            -cos_o * sin_w - sin_o * cos_w * cos_i,
            -sin_o * sin_w + cos_o * cos_w * cos_i,
            cos_w * sin_i,
        );
        let w = Vec3D::new(sin_o * sin_i, -cos_o * sin_i, cos_i);
        (p, q, w)
    }

    /// Unit normal of the orbital plane.
    pub fn normal(&self) -> Vec3D<f64> { self.perifocal_basis().2 }

    /// Inertial position at universal time `ut`.
    pub fn position_at(&self, ut: f64) -> Vec3D<f64> {
        let nu = self.true_anomaly_at(ut);
        let (p, q, _) = self.perifocal_basis();
        let r = self.radius_at_true_anomaly(nu);
        (p * nu.cos() + q * nu.sin()) * r
    }

    /// Inertial velocity at universal time `ut`.
    pub fn velocity_at(&self, ut: f64) -> Vec3D<f64> {
        let nu = self.true_anomaly_at(ut);
        let (p, q, _) = self.perifocal_basis();
        let scale = (self.body.gravitational_parameter / self.semi_latus_rectum()).sqrt();
        (p * -nu.sin() + q * (self.elements.eccentricity + nu.cos())) * scale
    }

    /// Orbital maneuver basis `(prograde, normal, radial)` at universal time `ut`, as unit
    /// vectors in the inertial frame.
    pub fn maneuver_basis_at(&self, ut: f64) -> (Vec3D<f64>, Vec3D<f64>, Vec3D<f64>) {
        let prograde = self.velocity_at(ut).normalize();
        let normal = self.normal();
        let radial = prograde.cross(normal).normalize();
        (prograde, normal, radial)
    }

    /// Angle between this orbit's plane and `other`'s, in `[0, pi]`.
    pub fn relative_inclination(&self, other: &OrbitState) -> f64 {
        self.normal().angle_to(other.normal())
    }

    /// True anomalies of the ascending and descending node of this orbit relative to the plane
    /// of `target`. `None` if the planes coincide.
    pub fn relative_nodes(&self, target: &OrbitState) -> Option<(f64, f64)> {
        let line = target.normal().cross(self.normal());
        if line.abs() < 1e-9 {
            return None;
        }
        let (p, q, _) = self.perifocal_basis();
        let ascending = wrap_two_pi(line.dot(q).atan2(line.dot(p)));
        Some((ascending, wrap_two_pi(ascending + PI)))
    }

    /// Time from the snapshot epoch to the ascending node relative to `target`'s plane.
    pub fn time_to_ascending_node(&self, target: &OrbitState) -> Option<f64> {
        self.relative_nodes(target).and_then(|(an, _)| self.time_to_true_anomaly(an))
    }

    /// Time from the snapshot epoch to the descending node relative to `target`'s plane.
    pub fn time_to_descending_node(&self, target: &OrbitState) -> Option<f64> {
        self.relative_nodes(target).and_then(|(_, dn)| self.time_to_true_anomaly(dn))
    }

    pub fn body(&self) -> &BodyParams { &self.body }
    pub fn elements(&self) -> &KeplerElements { &self.elements }
    pub fn epoch(&self) -> f64 { self.epoch }
    pub fn gravitational_parameter(&self) -> f64 { self.body.gravitational_parameter }
    pub fn equatorial_radius(&self) -> f64 { self.body.equatorial_radius }
    pub fn semi_major_axis(&self) -> f64 { self.elements.semi_major_axis }
    pub fn eccentricity(&self) -> f64 { self.elements.eccentricity }
    pub fn inclination(&self) -> f64 { self.elements.inclination }
    pub fn mean_anomaly(&self) -> f64 { self.elements.mean_anomaly }
    pub fn true_anomaly(&self) -> f64 { self.true_anomaly }
    pub fn apoapsis(&self) -> f64 { self.apoapsis }
    pub fn periapsis(&self) -> f64 { self.periapsis }
    pub fn apoapsis_altitude(&self) -> f64 { self.apoapsis - self.body.equatorial_radius }
    pub fn periapsis_altitude(&self) -> f64 { self.periapsis - self.body.equatorial_radius }
    pub fn radius(&self) -> f64 { self.radius }
    pub fn speed(&self) -> f64 { self.speed }
    pub fn period(&self) -> f64 { self.period }
    pub fn time_to_apoapsis(&self) -> f64 { self.time_to_apoapsis }
    pub fn time_to_periapsis(&self) -> f64 { self.time_to_periapsis }
}
