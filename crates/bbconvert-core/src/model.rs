use crate::error::{ConvertError, Result};
use crate::geom::{Axis, UvRect, Vec3};
use crate::target::AxisRotation;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Rotation axes with a magnitude at or below this are treated as zero.
pub const ROTATION_EPSILON: f64 = 1e-7;

pub const DEFAULT_RESOLUTION: i64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: i64,
    pub height: i64,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: DEFAULT_RESOLUTION,
            height: DEFAULT_RESOLUTION,
        }
    }
}

/// Where a texture's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TexturePayload {
    /// A `data:` URI carrying base64 content.
    Inline(String),
    /// A file path, absolute or relative to the bbmodel's directory.
    External(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceTexture {
    pub index: usize,
    pub name: String,
    pub payload: TexturePayload,
    pub width: i64,
    pub height: i64,
    pub uv_width: i64,
    pub uv_height: i64,
    pub frame_time: i64,
    pub frame_interpolate: bool,
}

impl SourceTexture {
    pub fn new(index: usize, name: impl Into<String>, payload: TexturePayload) -> Self {
        Self {
            index,
            name: name.into(),
            payload,
            width: 0,
            height: 0,
            uv_width: 0,
            uv_height: 0,
            frame_time: 1,
            frame_interpolate: false,
        }
    }

    /// Vertically stacked animation frames.
    ///
    /// With UV dimensions declared, a texture is animated when it is taller
    /// relative to its UV height than it is wide relative to its UV width.
    /// Without them, a texture taller than it is wide is assumed animated.
    pub fn is_animated(&self) -> bool {
        if self.uv_width > 0 && self.uv_height > 0 {
            let width_ratio = if self.width > 0 {
                self.width as f64 / self.uv_width as f64
            } else {
                0.0
            };
            let height_ratio = if self.height > 0 {
                self.height as f64 / self.uv_height as f64
            } else {
                0.0
            };
            height_ratio > width_ratio
        } else {
            self.width > 0 && self.height > self.width
        }
    }
}

/// The two shapes a cube rotation takes in a bbmodel.
#[derive(Debug, Clone, PartialEq)]
pub enum RotationSpec {
    /// `{"axis": "y", "angle": 22.5, "origin": [..], "rescale": true}`
    Axis {
        axis: Axis,
        angle: f64,
        origin: Vec3,
        rescale: bool,
    },
    /// `"rotation": [x, y, z]` with the pivot in the element's `origin`.
    Euler { angles: Vec3, origin: Option<Vec3> },
}

impl RotationSpec {
    /// Collapses to the single-axis rotation the target format supports.
    pub fn to_axis_rotation(&self, element: &str) -> Result<Option<AxisRotation>> {
        match self {
            RotationSpec::Axis {
                axis,
                angle,
                origin,
                rescale,
            } => Ok(Some(AxisRotation {
                axis: *axis,
                angle: *angle,
                origin: *origin,
                rescale: *rescale,
            })),
            RotationSpec::Euler { angles, origin } => {
                let non_zero: Vec<(Axis, f64)> = angles
                    .components()
                    .into_iter()
                    .filter(|(_, v)| v.abs() > ROTATION_EPSILON)
                    .collect();
                match non_zero.as_slice() {
                    [] => Ok(None),
                    [(axis, angle)] => {
                        let origin = origin.ok_or_else(|| {
                            ConvertError::malformed(format!(
                                "element '{element}' has invalid origin; expected 3-number array"
                            ))
                        })?;
                        Ok(Some(AxisRotation {
                            axis: *axis,
                            angle: *angle,
                            origin,
                            rescale: false,
                        }))
                    }
                    _ => Err(ConvertError::UnsupportedRotation {
                        element: element.to_string(),
                        reason: format!(
                            "multi-axis rotation [{}, {}, {}] is not a single cube rotation",
                            angles.x, angles.y, angles.z
                        ),
                    }),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceDirection {
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl FaceDirection {
    pub const ALL: [FaceDirection; 6] = [
        FaceDirection::North,
        FaceDirection::East,
        FaceDirection::South,
        FaceDirection::West,
        FaceDirection::Up,
        FaceDirection::Down,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FaceDirection::North => "north",
            FaceDirection::East => "east",
            FaceDirection::South => "south",
            FaceDirection::West => "west",
            FaceDirection::Up => "up",
            FaceDirection::Down => "down",
        }
    }
}

/// One optional slot per cube face, iterated and serialized in
/// north, east, south, west, up, down order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Faces<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub north: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub east: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub south: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub west: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub up: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down: Option<T>,
}

impl<T> Default for Faces<T> {
    fn default() -> Self {
        Self {
            north: None,
            east: None,
            south: None,
            west: None,
            up: None,
            down: None,
        }
    }
}

impl<T> Faces<T> {
    pub fn get(&self, dir: FaceDirection) -> Option<&T> {
        self.slot(dir).as_ref()
    }

    pub fn set(&mut self, dir: FaceDirection, face: T) {
        *self.slot_mut(dir) = Some(face);
    }

    pub fn iter(&self) -> impl Iterator<Item = (FaceDirection, &T)> {
        FaceDirection::ALL
            .into_iter()
            .filter_map(move |dir| self.get(dir).map(|f| (dir, f)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, dir: FaceDirection) -> &Option<T> {
        match dir {
            FaceDirection::North => &self.north,
            FaceDirection::East => &self.east,
            FaceDirection::South => &self.south,
            FaceDirection::West => &self.west,
            FaceDirection::Up => &self.up,
            FaceDirection::Down => &self.down,
        }
    }

    fn slot_mut(&mut self, dir: FaceDirection) -> &mut Option<T> {
        match dir {
            FaceDirection::North => &mut self.north,
            FaceDirection::East => &mut self.east,
            FaceDirection::South => &mut self.south,
            FaceDirection::West => &mut self.west,
            FaceDirection::Up => &mut self.up,
            FaceDirection::Down => &mut self.down,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFace {
    pub uv: UvRect,
    /// Index into the document's texture list. Not yet checked against it.
    pub texture: i64,
    pub rotation: Option<f64>,
    pub tintindex: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceElement {
    pub name: String,
    pub visible: bool,
    pub from: Vec3,
    pub to: Vec3,
    pub rotation: Option<RotationSpec>,
    pub shade: bool,
    pub light_emission: Option<i64>,
    pub faces: Faces<SourceFace>,
}

impl SourceElement {
    pub fn new(name: impl Into<String>, from: Vec3, to: Vec3) -> Self {
        Self {
            name: name.into(),
            visible: true,
            from,
            to,
            rotation: None,
            shade: true,
            light_emission: None,
            faces: Faces::default(),
        }
    }

    /// Hidden elements are never converted, so their geometry is not decoded.
    pub fn hidden(name: impl Into<String>) -> Self {
        Self {
            visible: false,
            ..Self::new(name, Vec3::ZERO, Vec3::ZERO)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceDocument {
    pub resolution: Resolution,
    pub textures: Vec<SourceTexture>,
    pub elements: Vec<SourceElement>,
    /// Passed through verbatim.
    pub display: Option<Map<String, Value>>,
    pub front_gui_light: bool,
}
