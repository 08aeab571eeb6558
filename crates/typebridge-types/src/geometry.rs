//! Geometric records.

use std::ops::{Add, Div, Mul, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn magnitude(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn unit(self) -> Self {
        self / self.magnitude()
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y
    }

    pub fn lerp(self, goal: Self, alpha: f32) -> Self {
        self + (goal - self) * alpha
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn unit(self) -> Self {
        self / self.magnitude()
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    pub fn lerp(self, goal: Self, alpha: f32) -> Self {
        self + (goal - self) * alpha
    }
}

macro_rules! vector_ops {
    ($ty:ident { $($f:ident),* }) => {
        impl Add for $ty {
            type Output = $ty;
            fn add(self, rhs: $ty) -> $ty {
                $ty { $($f: self.$f + rhs.$f),* }
            }
        }

        impl Sub for $ty {
            type Output = $ty;
            fn sub(self, rhs: $ty) -> $ty {
                $ty { $($f: self.$f - rhs.$f),* }
            }
        }

        impl Mul for $ty {
            type Output = $ty;
            fn mul(self, rhs: $ty) -> $ty {
                $ty { $($f: self.$f * rhs.$f),* }
            }
        }

        impl Mul<f32> for $ty {
            type Output = $ty;
            fn mul(self, rhs: f32) -> $ty {
                $ty { $($f: self.$f * rhs),* }
            }
        }

        impl Div for $ty {
            type Output = $ty;
            fn div(self, rhs: $ty) -> $ty {
                $ty { $($f: self.$f / rhs.$f),* }
            }
        }

        impl Div<f32> for $ty {
            type Output = $ty;
            fn div(self, rhs: f32) -> $ty {
                $ty { $($f: self.$f / rhs),* }
            }
        }

        impl Neg for $ty {
            type Output = $ty;
            fn neg(self) -> $ty {
                $ty { $($f: -self.$f),* }
            }
        }
    };
}

vector_ops!(Vector2 { x, y });
vector_ops!(Vector3 { x, y, z });

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector2int16 {
    pub x: i16,
    pub y: i16,
}

impl Vector2int16 {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector3int16 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Vector3int16 {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

impl Add for Vector2int16 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x.wrapping_add(rhs.x), self.y.wrapping_add(rhs.y))
    }
}

impl Sub for Vector2int16 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x.wrapping_sub(rhs.x), self.y.wrapping_sub(rhs.y))
    }
}

impl Add for Vector3int16 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.x.wrapping_add(rhs.x),
            self.y.wrapping_add(rhs.y),
            self.z.wrapping_add(rhs.z),
        )
    }
}

impl Sub for Vector3int16 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.x.wrapping_sub(rhs.x),
            self.y.wrapping_sub(rhs.y),
            self.z.wrapping_sub(rhs.z),
        )
    }
}

impl Neg for Vector2int16 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(self.x.wrapping_neg(), self.y.wrapping_neg())
    }
}

impl Neg for Vector3int16 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(self.x.wrapping_neg(), self.y.wrapping_neg(), self.z.wrapping_neg())
    }
}

// ============================================================================
// CFrame
// ============================================================================

/// Position plus a row-major 3x3 rotation matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CFrame {
    pub position: Vector3,
    pub rotation: [f32; 9],
}

const IDENTITY_ROTATION: [f32; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

impl Default for CFrame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl CFrame {
    pub const IDENTITY: CFrame = CFrame {
        position: Vector3::ZERO,
        rotation: IDENTITY_ROTATION,
    };

    pub fn from_position(position: Vector3) -> Self {
        Self {
            position,
            rotation: IDENTITY_ROTATION,
        }
    }

    /// Position with its -Z axis pointing at `look_at`.
    pub fn look_at(position: Vector3, look_at: Vector3) -> Self {
        let forward = (look_at - position).unit();
        let mut right = forward.cross(Vector3::new(0.0, 1.0, 0.0));
        if right.magnitude() < 1e-6 {
            right = Vector3::new(1.0, 0.0, 0.0);
        } else {
            right = right.unit();
        }
        let up = right.cross(forward);
        Self::from_columns(position, right, up, -forward)
    }

    /// Position plus a rotation given as quaternion `(qx, qy, qz, qw)`.
    pub fn from_quaternion(position: Vector3, qx: f32, qy: f32, qz: f32, qw: f32) -> Self {
        let n = (qx * qx + qy * qy + qz * qz + qw * qw).sqrt();
        let (x, y, z, w) = (qx / n, qy / n, qz / n, qw / n);
        Self {
            position,
            rotation: [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - z * w),
                2.0 * (x * z + y * w),
                2.0 * (x * y + z * w),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - x * w),
                2.0 * (x * z - y * w),
                2.0 * (y * z + x * w),
                1.0 - 2.0 * (x * x + y * y),
            ],
        }
    }

    /// Twelve components: position followed by the rotation rows.
    pub fn from_components(c: [f32; 12]) -> Self {
        Self {
            position: Vector3::new(c[0], c[1], c[2]),
            rotation: [c[3], c[4], c[5], c[6], c[7], c[8], c[9], c[10], c[11]],
        }
    }

    fn from_columns(position: Vector3, x: Vector3, y: Vector3, z: Vector3) -> Self {
        Self {
            position,
            rotation: [x.x, y.x, z.x, x.y, y.y, z.y, x.z, y.z, z.z],
        }
    }

    pub fn components(&self) -> [f32; 12] {
        let p = self.position;
        let r = self.rotation;
        [p.x, p.y, p.z, r[0], r[1], r[2], r[3], r[4], r[5], r[6], r[7], r[8]]
    }

    pub fn right_vector(&self) -> Vector3 {
        Vector3::new(self.rotation[0], self.rotation[3], self.rotation[6])
    }

    pub fn up_vector(&self) -> Vector3 {
        Vector3::new(self.rotation[1], self.rotation[4], self.rotation[7])
    }

    pub fn look_vector(&self) -> Vector3 {
        -Vector3::new(self.rotation[2], self.rotation[5], self.rotation[8])
    }

    fn rotate(&self, v: Vector3) -> Vector3 {
        let r = &self.rotation;
        Vector3::new(
            r[0] * v.x + r[1] * v.y + r[2] * v.z,
            r[3] * v.x + r[4] * v.y + r[5] * v.z,
            r[6] * v.x + r[7] * v.y + r[8] * v.z,
        )
    }

    /// Inverse of a rigid transform (rotation assumed orthonormal).
    pub fn inverse(&self) -> Self {
        let r = &self.rotation;
        let t = [r[0], r[3], r[6], r[1], r[4], r[7], r[2], r[5], r[8]];
        let inv = CFrame {
            position: Vector3::ZERO,
            rotation: t,
        };
        CFrame {
            position: -inv.rotate(self.position),
            rotation: t,
        }
    }

    pub fn point_to_world_space(&self, v: Vector3) -> Vector3 {
        *self * v
    }

    pub fn point_to_object_space(&self, v: Vector3) -> Vector3 {
        self.inverse() * v
    }
}

impl Mul for CFrame {
    type Output = CFrame;
    fn mul(self, rhs: CFrame) -> CFrame {
        let a = &self.rotation;
        let b = &rhs.rotation;
        let mut rotation = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                rotation[row * 3 + col] = a[row * 3] * b[col]
                    + a[row * 3 + 1] * b[3 + col]
                    + a[row * 3 + 2] * b[6 + col];
            }
        }
        CFrame {
            position: self.position + self.rotate(rhs.position),
            rotation,
        }
    }
}

impl Mul<Vector3> for CFrame {
    type Output = Vector3;
    fn mul(self, rhs: Vector3) -> Vector3 {
        self.position + self.rotate(rhs)
    }
}

impl Add<Vector3> for CFrame {
    type Output = CFrame;
    fn add(self, rhs: Vector3) -> CFrame {
        CFrame {
            position: self.position + rhs,
            rotation: self.rotation,
        }
    }
}

impl Sub<Vector3> for CFrame {
    type Output = CFrame;
    fn sub(self, rhs: Vector3) -> CFrame {
        CFrame {
            position: self.position - rhs,
            rotation: self.rotation,
        }
    }
}

// ============================================================================
// Color, UDim, Rect, NumberRange
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color3 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color3 {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Hue, saturation and value, each in `[0, 1]`.
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let h = (h.rem_euclid(1.0)) * 6.0;
        let i = h.floor();
        let f = h - i;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        match i as i32 {
            0 => Self::new(v, t, p),
            1 => Self::new(q, v, p),
            2 => Self::new(p, v, t),
            3 => Self::new(p, q, v),
            4 => Self::new(t, p, v),
            _ => Self::new(v, p, q),
        }
    }

    pub fn to_hsv(self) -> (f32, f32, f32) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let d = max - min;
        let s = if max == 0.0 { 0.0 } else { d / max };
        let h = if d == 0.0 {
            0.0
        } else if max == self.r {
            ((self.g - self.b) / d).rem_euclid(6.0) / 6.0
        } else if max == self.g {
            ((self.b - self.r) / d + 2.0) / 6.0
        } else {
            ((self.r - self.g) / d + 4.0) / 6.0
        };
        (h, s, max)
    }

    pub fn lerp(self, goal: Self, alpha: f32) -> Self {
        Self::new(
            self.r + (goal.r - self.r) * alpha,
            self.g + (goal.g - self.g) * alpha,
            self.b + (goal.b - self.b) * alpha,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UDim {
    pub scale: f32,
    pub offset: i32,
}

impl UDim {
    pub const fn new(scale: f32, offset: i32) -> Self {
        Self { scale, offset }
    }
}

impl Add for UDim {
    type Output = UDim;
    fn add(self, rhs: UDim) -> UDim {
        UDim::new(self.scale + rhs.scale, self.offset.wrapping_add(rhs.offset))
    }
}

impl Sub for UDim {
    type Output = UDim;
    fn sub(self, rhs: UDim) -> UDim {
        UDim::new(self.scale - rhs.scale, self.offset.wrapping_sub(rhs.offset))
    }
}

impl Neg for UDim {
    type Output = UDim;
    fn neg(self) -> UDim {
        UDim::new(-self.scale, self.offset.wrapping_neg())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UDim2 {
    pub x: UDim,
    pub y: UDim,
}

impl UDim2 {
    pub const fn new(x: UDim, y: UDim) -> Self {
        Self { x, y }
    }

    pub fn from_scale(x: f32, y: f32) -> Self {
        Self::new(UDim::new(x, 0), UDim::new(y, 0))
    }

    pub fn from_offset(x: i32, y: i32) -> Self {
        Self::new(UDim::new(0.0, x), UDim::new(0.0, y))
    }

    pub fn lerp(self, goal: Self, alpha: f32) -> Self {
        let lerp = |a: UDim, b: UDim| {
            UDim::new(
                a.scale + (b.scale - a.scale) * alpha,
                a.offset + ((b.offset - a.offset) as f32 * alpha).round() as i32,
            )
        };
        Self::new(lerp(self.x, goal.x), lerp(self.y, goal.y))
    }
}

impl Add for UDim2 {
    type Output = UDim2;
    fn add(self, rhs: UDim2) -> UDim2 {
        UDim2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for UDim2 {
    type Output = UDim2;
    fn sub(self, rhs: UDim2) -> UDim2 {
        UDim2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for UDim2 {
    type Output = UDim2;
    fn neg(self) -> UDim2 {
        UDim2::new(-self.x, -self.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    pub min: Vector2,
    pub max: Vector2,
}

impl Rect {
    pub const fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Closed interval; `min <= max` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NumberRange {
    pub min: f32,
    pub max: f32,
}

impl NumberRange {
    /// Returns `None` when `min > max`.
    pub fn new(min: f32, max: f32) -> Option<Self> {
        (min <= max).then_some(Self { min, max })
    }

    pub fn point(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }
}
