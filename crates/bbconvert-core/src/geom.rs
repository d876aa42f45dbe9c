use serde::{Deserialize, Serialize};

/// Edge length of the target format's UV space.
pub const TARGET_UV_SPAN: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn components(&self) -> [(Axis, f64); 3] {
        [(Axis::X, self.x), (Axis::Y, self.y), (Axis::Z, self.z)]
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "z" => Some(Self::Z),
            _ => None,
        }
    }
}

/// Face sampling rectangle `(u0, v0, u1, v1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct UvRect {
    pub u0: f64,
    pub v0: f64,
    pub u1: f64,
    pub v1: f64,
}

impl UvRect {
    pub const fn new(u0: f64, v0: f64, u1: f64, v1: f64) -> Self {
        Self { u0, v0, u1, v1 }
    }

    pub fn rescale(&self, scale: UvScale) -> Self {
        Self {
            u0: self.u0 / scale.width,
            v0: self.v0 / scale.height,
            u1: self.u1 / scale.width,
            v1: self.v1 / scale.height,
        }
    }
}

impl From<[f64; 4]> for UvRect {
    fn from([u0, v0, u1, v1]: [f64; 4]) -> Self {
        Self::new(u0, v0, u1, v1)
    }
}

impl From<UvRect> for [f64; 4] {
    fn from(r: UvRect) -> Self {
        [r.u0, r.v0, r.u1, r.v1]
    }
}

/// Per-axis divisor mapping the source UV space onto the fixed 0..16 space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvScale {
    pub width: f64,
    pub height: f64,
}

impl UvScale {
    pub const IDENTITY: Self = Self {
        width: 1.0,
        height: 1.0,
    };

    pub fn from_resolution(width: i64, height: i64) -> Self {
        Self {
            width: axis_scale(width),
            height: axis_scale(height),
        }
    }
}

impl Default for UvScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn axis_scale(size: i64) -> f64 {
    let scale = size as f64 / TARGET_UV_SPAN;
    if scale > 0.0 { scale } else { 1.0 }
}
