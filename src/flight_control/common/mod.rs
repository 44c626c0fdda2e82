pub(crate) mod math;
pub(crate) mod vec3d;

pub use vec3d::Vec3D;
