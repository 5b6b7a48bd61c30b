//! Planar coordinate type and small vector utilities.
//!
//! `Vector2` uses `f32`. The venue is a 2-D (x, z) floor plan a few tens of
//! metres across, so single precision gives sub-millimetre resolution while
//! halving memory versus `f64`.

/// A point or displacement in world meters, planar (x, z). There is no y
/// axis — the scene is 2-D only, per the simulator's scope.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2 {
    pub x: f32,
    pub z: f32,
}

impl Vector2 {
    #[inline]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    pub const ZERO: Vector2 = Vector2 { x: 0.0, z: 0.0 };

    #[inline]
    pub fn distance(self, other: Vector2) -> f32 {
        (self - other).length()
    }

    #[inline]
    pub fn distance_sq(self, other: Vector2) -> f32 {
        (self - other).length_sq()
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    #[inline]
    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.z * self.z
    }

    /// Unit vector in the same direction, or `Vector2::ZERO` if this vector
    /// is (near-)zero length.
    pub fn normalized(self) -> Vector2 {
        let len = self.length();
        if len < 1e-6 {
            Vector2::ZERO
        } else {
            Vector2::new(self.x / len, self.z / len)
        }
    }

    #[inline]
    pub fn dot(self, other: Vector2) -> f32 {
        self.x * other.x + self.z * other.z
    }

    /// Perpendicular vector, rotated 90° counter-clockwise in the (x, z) plane.
    #[inline]
    pub fn perp(self) -> Vector2 {
        Vector2::new(-self.z, self.x)
    }

    #[inline]
    pub fn scale(self, s: f32) -> Vector2 {
        Vector2::new(self.x * s, self.z * s)
    }

    pub fn clamp_bounds(self, min: Vector2, max: Vector2) -> Vector2 {
        Vector2::new(self.x.clamp(min.x, max.x), self.z.clamp(min.z, max.z))
    }
}

impl std::ops::Add for Vector2 {
    type Output = Vector2;
    #[inline]
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vector2 {
    type Output = Vector2;
    #[inline]
    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.z - rhs.z)
    }
}

impl std::ops::Mul<f32> for Vector2 {
    type Output = Vector2;
    #[inline]
    fn mul(self, rhs: f32) -> Vector2 {
        self.scale(rhs)
    }
}

impl std::ops::AddAssign for Vector2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.z += rhs.z;
    }
}

impl std::fmt::Display for Vector2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.z)
    }
}
