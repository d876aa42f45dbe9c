use anyhow::{Context, Result};
use bbconvert_core::coerce::{coerce_f64, coerce_int, is_truthy, read_positive_int};
use bbconvert_core::geom::{Axis, UvRect, Vec3};
use bbconvert_core::model::{
    FaceDirection, Resolution, RotationSpec, SourceDocument, SourceElement, SourceFace,
    SourceTexture, TexturePayload, DEFAULT_RESOLUTION, ROTATION_EPSILON,
};
use bbconvert_core::ConvertError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

type DecodeResult<T> = bbconvert_core::Result<T>;

pub fn import_bbmodel(path: &Path) -> Result<SourceDocument> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read bbmodel: {path:?}"))?;
    let root: Value =
        serde_json::from_str(&text).with_context(|| format!("invalid JSON in {path:?}"))?;
    let doc = decode_document(&root)?;
    debug!(
        textures = doc.textures.len(),
        elements = doc.elements.len(),
        "decoded bbmodel {path:?}"
    );
    Ok(doc)
}

/// Directory relative texture paths are resolved against.
pub fn base_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Turns the loosely typed bbmodel tree into a [`SourceDocument`].
pub fn decode_document(root: &Value) -> DecodeResult<SourceDocument> {
    let obj = root
        .as_object()
        .ok_or_else(|| ConvertError::malformed("bbmodel root is not a JSON object"))?;

    let resolution = obj.get("resolution");
    let resolution = Resolution {
        width: read_positive_int(resolution.and_then(|r| r.get("width")), DEFAULT_RESOLUTION),
        height: read_positive_int(resolution.and_then(|r| r.get("height")), DEFAULT_RESOLUTION),
    };

    let textures = obj
        .get("textures")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ConvertError::malformed("bbmodel 'textures' field is missing or not an array")
        })?
        .iter()
        .enumerate()
        .map(|(i, t)| decode_texture(i, t))
        .collect::<DecodeResult<Vec<_>>>()?;

    let elements = obj
        .get("elements")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ConvertError::malformed("bbmodel 'elements' field is missing or not an array")
        })?
        .iter()
        .enumerate()
        .map(|(i, e)| decode_element(i, e))
        .collect::<DecodeResult<Vec<_>>>()?;

    Ok(SourceDocument {
        resolution,
        textures,
        elements,
        display: obj.get("display").and_then(Value::as_object).cloned(),
        front_gui_light: matches!(obj.get("front_gui_light"), Some(Value::Bool(true))),
    })
}

fn decode_texture(index: usize, value: &Value) -> DecodeResult<SourceTexture> {
    let tex = value
        .as_object()
        .ok_or_else(|| ConvertError::malformed(format!("texture entry {index} is not an object")))?;

    let name = match tex.get("name") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    let mut texture = SourceTexture::new(index, name, texture_payload(index, tex)?);
    texture.width = read_positive_int(tex.get("width"), 0);
    texture.height = read_positive_int(tex.get("height"), 0);
    texture.uv_width = read_positive_int(tex.get("uv_width"), 0);
    texture.uv_height = read_positive_int(tex.get("uv_height"), 0);
    texture.frame_time = read_positive_int(tex.get("frame_time"), 1);
    texture.frame_interpolate = is_truthy(tex.get("frame_interpolate"));
    Ok(texture)
}

/// `source` holds either a data URI or a path; `path` is the fallback.
fn texture_payload(index: usize, tex: &Map<String, Value>) -> DecodeResult<TexturePayload> {
    let non_empty = |key: &str| tex.get(key).and_then(Value::as_str).filter(|s| !s.is_empty());

    if let Some(source) = non_empty("source") {
        return Ok(if source.starts_with("data:") {
            TexturePayload::Inline(source.to_string())
        } else {
            TexturePayload::External(PathBuf::from(source))
        });
    }
    if let Some(path) = non_empty("path") {
        return Ok(TexturePayload::External(PathBuf::from(path)));
    }
    Err(ConvertError::malformed(format!(
        "texture {index} has neither embedded source nor external path"
    )))
}

fn decode_element(index: usize, value: &Value) -> DecodeResult<SourceElement> {
    let elem = value
        .as_object()
        .ok_or_else(|| ConvertError::malformed(format!("element entry {index} is not an object")))?;

    let name = match elem.get("name") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => format!("element_{index}"),
    };

    if matches!(elem.get("visibility"), Some(Value::Bool(false))) {
        return Ok(SourceElement::hidden(name));
    }

    let from = vec3(elem.get("from"), "from", &name)?;
    let to = vec3(elem.get("to"), "to", &name)?;
    let mut out = SourceElement::new(name, from, to);
    out.rotation = decode_rotation(elem, &out.name)?;
    out.shade = !matches!(elem.get("shade"), Some(Value::Bool(false)));
    out.light_emission = elem.get("light_emission").and_then(Value::as_i64);

    let faces = elem.get("faces").and_then(Value::as_object).ok_or_else(|| {
        ConvertError::malformed(format!("element '{}' is missing valid faces object", out.name))
    })?;
    for dir in FaceDirection::ALL {
        // Non-object entries (null, false) mean the face is absent.
        if let Some(Value::Object(face)) = faces.get(dir.as_str()) {
            let face = decode_face(face, &out.name, dir)?;
            out.faces.set(dir, face);
        }
    }
    Ok(out)
}

fn decode_rotation(
    elem: &Map<String, Value>,
    name: &str,
) -> DecodeResult<Option<RotationSpec>> {
    match elem.get("rotation") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(rot)) => {
            let axis = rot.get("axis").and_then(Value::as_str).and_then(Axis::parse);
            let angle = rot.get("angle").and_then(Value::as_f64);
            let (Some(axis), Some(angle)) = (axis, angle) else {
                return Err(ConvertError::UnsupportedRotation {
                    element: name.to_string(),
                    reason: "rotation object is missing axis/angle/origin".to_string(),
                });
            };
            Ok(Some(RotationSpec::Axis {
                axis,
                angle,
                origin: vec3(rot.get("origin"), "rotation.origin", name)?,
                rescale: matches!(rot.get("rescale"), Some(Value::Bool(true))),
            }))
        }
        Some(raw @ Value::Array(_)) => {
            let angles = vec3(Some(raw), "rotation", name)?;
            let origin = vec3(elem.get("origin"), "origin", name);
            // Only needed, and only validated, for a single-axis rotation.
            let single_axis = angles
                .components()
                .into_iter()
                .filter(|(_, v)| v.abs() > ROTATION_EPSILON)
                .count()
                == 1;
            let origin = if single_axis { Some(origin?) } else { origin.ok() };
            Ok(Some(RotationSpec::Euler { angles, origin }))
        }
        Some(_) => Err(ConvertError::UnsupportedRotation {
            element: name.to_string(),
            reason: "unsupported rotation format".to_string(),
        }),
    }
}

fn decode_face(
    face: &Map<String, Value>,
    elem_name: &str,
    dir: FaceDirection,
) -> DecodeResult<SourceFace> {
    let texture = coerce_int(face.get("texture")).map_err(|e| {
        ConvertError::numeric(
            format!("element '{elem_name}' face '{}'", dir.as_str()),
            format!("texture ref ({e})"),
        )
    })?;
    let [u0, v0, u1, v1] = numbers::<4>(face.get("uv"), "face uv", elem_name)?;

    // `tintindex` wins over the legacy `tint` key.
    let tint = |key: &str| {
        face.get(key)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
    };

    Ok(SourceFace {
        uv: UvRect::new(u0, v0, u1, v1),
        texture,
        rotation: face.get("rotation").and_then(Value::as_f64),
        tintindex: tint("tintindex").or_else(|| tint("tint")),
    })
}

fn vec3(value: Option<&Value>, label: &str, elem_name: &str) -> DecodeResult<Vec3> {
    numbers::<3>(value, label, elem_name).map(Vec3::from)
}

fn numbers<const N: usize>(
    value: Option<&Value>,
    label: &str,
    elem_name: &str,
) -> DecodeResult<[f64; N]> {
    let items = value
        .and_then(Value::as_array)
        .filter(|a| a.len() == N)
        .ok_or_else(|| {
            ConvertError::malformed(format!(
                "element '{elem_name}' has invalid {label}; expected {N}-number array"
            ))
        })?;

    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = coerce_f64(Some(item))
            .map_err(|_| ConvertError::numeric(format!("element '{elem_name}'"), label))?;
    }
    Ok(out)
}
