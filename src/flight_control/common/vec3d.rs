use num::Float;
use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// A 3D vector generic over any floating point type.
///
/// Used for velocities, burn vectors and attitude directions. Which basis the components live in
/// (body-fixed, orbital prograde/normal/radial, inertial, ...) is up to the caller; every API
/// taking a [`Vec3D`] documents its frame.
///
/// # Type Parameters
/// * `T` - The floating point type of the components.
#[derive(Debug, PartialEq, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct Vec3D<T> {
    /// The x-component of the vector.
    x: T,
    /// The y-component of the vector.
    y: T,
    /// The z-component of the vector.
    z: T,
}

impl<T: Copy> Vec3D<T> {
    /// Creates a new vector with the given components.
    pub const fn new(x: T, y: T, z: T) -> Self { Self { x, y, z } }

    /// Returns the x-component of the vector.
    pub const fn x(&self) -> T { self.x }

    /// Returns the y-component of the vector.
    pub const fn y(&self) -> T { self.y }

    /// Returns the z-component of the vector.
    pub const fn z(&self) -> T { self.z }
}

impl<T: Float> Vec3D<T> {
    /// Creates a zero vector.
    pub fn zero() -> Self { Self::new(T::zero(), T::zero(), T::zero()) }

    /// Computes the magnitude (absolute value) of the vector.
    pub fn abs(&self) -> T { self.dot(*self).sqrt() }

    /// Computes the dot product with another vector.
    pub fn dot(&self, other: Self) -> T { self.x * other.x + self.y * other.y + self.z * other.z }

    /// Computes the right-handed cross product `self x other`.
    pub fn cross(&self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Normalizes the vector to have a magnitude of 1.
    /// If the magnitude is zero, the original vector is returned unmodified.
    pub fn normalize(self) -> Self {
        let magnitude = self.abs();
        if magnitude.is_zero() { self } else { self / magnitude }
    }

    /// Returns the angle between `self` and `other` in radians, in `[0, pi]`.
    ///
    /// Returns zero if either vector has zero length.
    pub fn angle_to(&self, other: Self) -> T {
        let mags = self.abs() * other.abs();
        if mags.is_zero() {
            return T::zero();
        }
        (self.dot(other) / mags).max(-T::one()).min(T::one()).acos()
    }

    /// Computes the Euclidean distance between `self` and `other`.
    pub fn euclid_distance(&self, other: &Self) -> T { (*self - *other).abs() }

    /// Scales every component by `factor`.
    pub fn scale(self, factor: T) -> Self { Self::new(self.x * factor, self.y * factor, self.z * factor) }

    /// Returns `true` if every component is finite.
    pub fn is_finite(&self) -> bool { self.x.is_finite() && self.y.is_finite() && self.z.is_finite() }
}

impl<T: Float> Add for Vec3D<T> {
    type Output = Vec3D<T>;

    fn add(self, rhs: Self) -> Self::Output { Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z) }
}

impl<T: Float> AddAssign for Vec3D<T> {
    fn add_assign(&mut self, rhs: Self) { *self = *self + rhs; }
}

impl<T: Float> Sub for Vec3D<T> {
    type Output = Vec3D<T>;

    fn sub(self, rhs: Self) -> Self::Output { Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z) }
}

impl<T: Float> Neg for Vec3D<T> {
    type Output = Vec3D<T>;

    fn neg(self) -> Self::Output { Self::new(-self.x, -self.y, -self.z) }
}

impl<T: Float> Mul<T> for Vec3D<T> {
    type Output = Vec3D<T>;

    fn mul(self, rhs: T) -> Self::Output { self.scale(rhs) }
}

impl<T: Float> Div<T> for Vec3D<T> {
    type Output = Vec3D<T>;

    fn div(self, rhs: T) -> Self::Output { Self::new(self.x / rhs, self.y / rhs, self.z / rhs) }
}

impl<T: Copy> From<(T, T, T)> for Vec3D<T> {
    fn from(tuple: (T, T, T)) -> Self { Self::new(tuple.0, tuple.1, tuple.2) }
}

impl<T: Display> Display for Vec3D<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}
