use crate::error::{ConvertError, Result};
use crate::geom::UvScale;
use crate::model::{FaceDirection, Faces, SourceElement, SourceFace};
use crate::target::{TargetElement, TargetFace};
use std::collections::HashSet;
use tracing::debug;

/// Converts visible cuboids in declaration order.
///
/// Hidden elements and elements left without any face are dropped. Fails
/// with [`ConvertError::EmptyResult`] when nothing survives.
pub fn convert_elements(
    elements: &[SourceElement],
    scale: UvScale,
    known_textures: &HashSet<usize>,
) -> Result<Vec<TargetElement>> {
    let mut out = Vec::with_capacity(elements.len());
    for elem in elements {
        if !elem.visible {
            debug!(element = %elem.name, "skipping hidden element");
            continue;
        }
        match convert_element(elem, scale, known_textures)? {
            Some(converted) => out.push(converted),
            None => debug!(element = %elem.name, "skipping element without faces"),
        }
    }

    if out.is_empty() {
        return Err(ConvertError::EmptyResult);
    }
    Ok(out)
}

fn convert_element(
    elem: &SourceElement,
    scale: UvScale,
    known_textures: &HashSet<usize>,
) -> Result<Option<TargetElement>> {
    let rotation = match &elem.rotation {
        Some(spec) => spec.to_axis_rotation(&elem.name)?,
        None => None,
    };

    let mut faces = Faces::default();
    for (dir, face) in elem.faces.iter() {
        faces.set(dir, convert_face(elem, dir, face, scale, known_textures)?);
    }
    if faces.is_empty() {
        return Ok(None);
    }

    Ok(Some(TargetElement {
        from: elem.from,
        to: elem.to,
        rotation,
        shade: (!elem.shade).then_some(false),
        light_emission: elem
            .light_emission
            .filter(|v| *v > 0)
            .and_then(|v| u32::try_from(v).ok()),
        faces,
    }))
}

fn convert_face(
    elem: &SourceElement,
    dir: FaceDirection,
    face: &SourceFace,
    scale: UvScale,
    known_textures: &HashSet<usize>,
) -> Result<TargetFace> {
    let index = usize::try_from(face.texture)
        .ok()
        .filter(|i| known_textures.contains(i))
        .ok_or_else(|| ConvertError::UnknownTextureRef {
            element: elem.name.clone(),
            face: dir.as_str().to_string(),
            index: face.texture,
        })?;

    Ok(TargetFace {
        uv: face.uv.rescale(scale),
        texture: format!("#{index}"),
        rotation: face.rotation.filter(|r| *r != 0.0),
        tintindex: face.tintindex,
    })
}
