//! Fixed-dimension vectors.
//!
//! `Vector<T, D>` is the canonical representation of a particle position.
//! It is a thin wrapper over `[T; D]` so a column of vectors is one
//! contiguous run of scalars.

use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Neg, Sub, SubAssign};

use bytemuck::{Pod, Zeroable};

/// D-dimensional vector with elementwise arithmetic.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector<T, const D: usize>(pub [T; D]);

/// 2D double-precision vector.
pub type Vec2 = Vector<f64, 2>;

/// 3D double-precision vector.
pub type Vec3 = Vector<f64, 3>;

// SAFETY: `Vector` is `repr(transparent)` over `[T; D]`, which is `Pod`
// whenever `T` is. No padding, no invalid bit patterns.
#[allow(unsafe_code)]
unsafe impl<T: Zeroable, const D: usize> Zeroable for Vector<T, D> {}

// SAFETY: see `Zeroable` above.
#[allow(unsafe_code)]
unsafe impl<T: Pod, const D: usize> Pod for Vector<T, D> {}

impl<T: Copy, const D: usize> Vector<T, D> {
    /// Number of components.
    pub const DIM: usize = D;

    /// Creates a vector from its components.
    #[inline]
    #[must_use]
    pub const fn new(components: [T; D]) -> Self {
        Self(components)
    }

    /// Creates a vector with every component set to `value`.
    #[inline]
    #[must_use]
    pub const fn splat(value: T) -> Self {
        Self([value; D])
    }

    /// Returns the components as an array.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [T; D] {
        self.0
    }

    /// Applies `f` to every component.
    #[inline]
    #[must_use]
    pub fn map<U: Copy, F: FnMut(T) -> U>(self, f: F) -> Vector<U, D> {
        Vector(self.0.map(f))
    }

    /// Iterates over the components.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }
}

impl<T, const D: usize> Vector<T, D>
where
    T: Copy + Default + Add<Output = T> + Mul<Output = T>,
{
    /// Dot product.
    #[inline]
    #[must_use]
    pub fn dot(self, other: Self) -> T {
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(T::default(), |acc, (&a, &b)| acc + a * b)
    }

    /// Squared Euclidean length (avoids sqrt).
    #[inline]
    #[must_use]
    pub fn squared_norm(self) -> T {
        self.dot(self)
    }
}

impl<const D: usize> Vector<f64, D> {
    /// Euclidean length.
    #[inline]
    #[must_use]
    pub fn norm(self) -> f64 {
        self.squared_norm().sqrt()
    }
}

impl<const D: usize> Vector<f32, D> {
    /// Euclidean length.
    #[inline]
    #[must_use]
    pub fn norm(self) -> f32 {
        self.squared_norm().sqrt()
    }
}

impl<T: Copy + Default, const D: usize> Default for Vector<T, D> {
    fn default() -> Self {
        Self([T::default(); D])
    }
}

impl<T, const D: usize> From<[T; D]> for Vector<T, D> {
    fn from(components: [T; D]) -> Self {
        Self(components)
    }
}

impl<T, const D: usize> Index<usize> for Vector<T, D> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.0[index]
    }
}

impl<T, const D: usize> IndexMut<usize> for Vector<T, D> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.0[index]
    }
}

impl<T: Copy + Add<Output = T>, const D: usize> Add for Vector<T, D> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a = *a + b;
        }
        self
    }
}

impl<T: Copy + Sub<Output = T>, const D: usize> Sub for Vector<T, D> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a = *a - b;
        }
        self
    }
}

impl<T: Copy + Mul<Output = T>, const D: usize> Mul<T> for Vector<T, D> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Self(self.0.map(|a| a * rhs))
    }
}

impl<T: Copy + Neg<Output = T>, const D: usize> Neg for Vector<T, D> {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.map(|a| -a))
    }
}

impl<T: Copy + Add<Output = T>, const D: usize> AddAssign for Vector<T, D> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<T: Copy + Sub<Output = T>, const D: usize> SubAssign for Vector<T, D> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_arithmetic() {
        let a = Vec3::new([1.0, 2.0, 3.0]);
        let b = Vec3::splat(1.0);
        assert_eq!(a + b, Vec3::new([2.0, 3.0, 4.0]));
        assert_eq!(a - b, Vec3::new([0.0, 1.0, 2.0]));
        assert_eq!(a * 2.0, Vec3::new([2.0, 4.0, 6.0]));
        assert_eq!(-b, Vec3::splat(-1.0));
    }

    #[test]
    fn test_vector_norm() {
        let v = Vec2::new([3.0, 4.0]);
        assert!((v.norm() - 5.0).abs() < f64::EPSILON);
        assert!((v.squared_norm() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_vector_is_pod() {
        let columns = [Vec2::new([1.0, 2.0]), Vec2::new([3.0, 4.0])];
        let scalars: &[f64] = bytemuck::cast_slice(&columns);
        assert_eq!(scalars, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(std::mem::size_of::<Vec3>(), 24);
    }
}
