use crate::geom::{Axis, UvRect, Vec3};
use crate::model::Faces;
use serde::Serialize;
use serde_json::{Map, Value};

pub const PARTICLE_KEY: &str = "particle";

/// Texture variables in insertion order: one per resolved source index,
/// then `particle`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct TextureTable(Map<String, Value>);

impl TextureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, reference: impl Into<String>) {
        self.0.insert(key.into(), Value::String(reference.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisRotation {
    pub axis: Axis,
    pub angle: f64,
    pub origin: Vec3,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub rescale: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetFace {
    pub uv: UvRect,
    /// `#<index>`
    pub texture: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tintindex: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetElement {
    pub from: Vec3,
    pub to: Vec3,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<AxisRotation>,
    /// Only ever `Some(false)`; shading is on by default in the target format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shade: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_emission: Option<u32>,
    pub faces: Faces<TargetFace>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuiLight {
    Front,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDocument {
    pub textures: TextureTable,
    pub elements: Vec<TargetElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gui_light: Option<GuiLight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<Map<String, Value>>,
}

impl ModelDocument {
    /// Pretty JSON, 2-space indent, trailing newline.
    pub fn to_json(&self) -> serde_json::Result<String> {
        to_json_file(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Animation {
    pub interpolate: bool,
    pub frametime: i64,
}

/// Contents of a `.png.mcmeta` sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct McMeta {
    pub animation: Animation,
}

impl McMeta {
    pub fn to_json(&self) -> serde_json::Result<String> {
        to_json_file(self)
    }
}

fn to_json_file<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}
