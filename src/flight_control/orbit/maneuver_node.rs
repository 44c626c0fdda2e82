use crate::flight_control::common::vec3d::Vec3D;

/// Delta-v in the orbital maneuver basis of the vehicle at the node epoch, in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct BurnVector {
    pub prograde: f64,
    pub normal: f64,
    pub radial: f64,
}

impl BurnVector {
    pub const fn new(prograde: f64, normal: f64, radial: f64) -> Self {
        Self { prograde, normal, radial }
    }

    pub const fn prograde_only(prograde: f64) -> Self { Self::new(prograde, 0.0, 0.0) }

    pub fn magnitude(&self) -> f64 {
        Vec3D::new(self.prograde, self.normal, self.radial).abs()
    }

    /// Projects an inertial delta-v onto the given `(prograde, normal, radial)` unit vectors.
    pub fn from_inertial(dv: Vec3D<f64>, basis: (Vec3D<f64>, Vec3D<f64>, Vec3D<f64>)) -> Self {
        Self::new(dv.dot(basis.0), dv.dot(basis.1), dv.dot(basis.2))
    }

    /// Expresses the burn as an inertial vector given the `(prograde, normal, radial)` basis.
    pub fn to_inertial(&self, basis: (Vec3D<f64>, Vec3D<f64>, Vec3D<f64>)) -> Vec3D<f64> {
        basis.0 * self.prograde + basis.1 * self.normal + basis.2 * self.radial
    }
}

/// A planned velocity change at an absolute universal time.
///
/// Created by the maneuver calculators and handed to the collaborator, which owns the node
/// until the burn executor removes it.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ManeuverNode {
    epoch: f64,
    burn: BurnVector,
}

impl ManeuverNode {
    pub const fn new(epoch: f64, burn: BurnVector) -> Self { Self { epoch, burn } }

    pub fn epoch(&self) -> f64 { self.epoch }

    pub fn burn(&self) -> BurnVector { self.burn }

    pub fn delta_v(&self) -> f64 { self.burn.magnitude() }
}
