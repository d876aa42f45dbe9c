use base64::{prelude::BASE64_STANDARD, Engine};
use bbconvert_core::assemble::{ConvertConfig, Converter};
use bbconvert_core::geom::{UvRect, Vec3};
use bbconvert_core::model::{
    FaceDirection, Resolution, SourceDocument, SourceElement, SourceFace, SourceTexture,
    TexturePayload,
};
use bbconvert_core::target::GuiLight;
use bbconvert_core::ConvertError;
use serde_json::{json, Value};
use std::path::Path;

fn texture(index: usize, name: &str) -> SourceTexture {
    let uri = format!("data:image/png;base64,{}", BASE64_STANDARD.encode(b"png"));
    SourceTexture::new(index, name, TexturePayload::Inline(uri))
}

fn element(name: &str, texture: i64, dirs: &[FaceDirection]) -> SourceElement {
    let mut elem = SourceElement::new(name, Vec3::ZERO, Vec3::new(16.0, 16.0, 16.0));
    for &dir in dirs {
        elem.faces.set(
            dir,
            SourceFace {
                uv: UvRect::new(0.0, 0.0, 32.0, 32.0),
                texture,
                rotation: None,
                tintindex: None,
            },
        );
    }
    elem
}

fn converter() -> Converter {
    Converter::new(ConvertConfig {
        namespace: "bloodstone".to_string(),
        asset: "sword".to_string(),
        variant: "default".to_string(),
        model_name: "ruby_sword".to_string(),
        prefix_textures: false,
    })
}

fn document() -> SourceDocument {
    let mut hidden = element("ghost", 0, &FaceDirection::ALL);
    hidden.visible = false;
    SourceDocument {
        resolution: Resolution {
            width: 32,
            height: 32,
        },
        textures: vec![texture(0, "blade.png"), texture(1, "hilt.png"), texture(2, "blade")],
        elements: vec![
            element("blade", 0, &FaceDirection::ALL),
            hidden,
            element("guard", 2, &[FaceDirection::North, FaceDirection::South]),
            element("hilt", 1, &[FaceDirection::Up]),
        ],
        display: None,
        front_gui_light: false,
    }
}

#[test]
fn table_has_every_texture_plus_particle() {
    let conversion = converter().convert(&document(), Path::new(".")).expect("convert");
    let model = &conversion.model;

    assert_eq!(4, model.textures.len());
    assert_eq!(vec!["0", "1", "2", "particle"], model.textures.keys().collect::<Vec<_>>());
    assert_eq!(Some("bloodstone:item/sword/default/blade_2"), model.textures.get("2"));
    assert_eq!(model.textures.get("0"), model.textures.get("particle"));

    let face_counts: Vec<_> = model.elements.iter().map(|e| e.faces.len()).collect();
    assert_eq!(vec![6, 2, 1], face_counts);
    assert_eq!(None, model.gui_light);
    assert_eq!(0, conversion.animated_count());
}

#[test]
fn serialized_model_matches_target_shape() {
    let mut doc = document();
    doc.elements.truncate(1);
    doc.front_gui_light = true;
    doc.display = json!({"gui": {"rotation": [30, 225, 0]}, "ground": {"scale": [0.5, 0.5, 0.5]}})
        .as_object()
        .cloned();

    let conversion = converter().convert(&doc, Path::new(".")).expect("convert");
    assert_eq!(Some(GuiLight::Front), conversion.model.gui_light);

    let text = conversion.model.to_json().expect("json");
    assert!(text.ends_with("}\n"));
    assert!(text.contains("\n  \"textures\": {\n    \"0\": "));

    let value: Value = serde_json::from_str(&text).expect("parse");
    let keys: Vec<_> = value.as_object().expect("object").keys().cloned().collect();
    assert_eq!(vec!["textures", "elements", "gui_light", "display"], keys);
    assert_eq!(json!("front"), value["gui_light"]);
    let display_keys: Vec<_> = value["display"]
        .as_object()
        .expect("display")
        .keys()
        .cloned()
        .collect();
    assert_eq!(vec!["gui", "ground"], display_keys);

    let north = &value["elements"][0]["faces"]["north"];
    assert_eq!(json!({"uv": [0.0, 0.0, 16.0, 16.0], "texture": "#0"}), *north);
    let face_keys: Vec<_> = value["elements"][0]["faces"]
        .as_object()
        .expect("faces")
        .keys()
        .cloned()
        .collect();
    assert_eq!(vec!["north", "east", "south", "west", "up", "down"], face_keys);
    assert!(value["elements"][0].get("rotation").is_none());
    assert!(value["elements"][0].get("shade").is_none());
}

#[test]
fn empty_display_is_dropped() {
    let mut doc = document();
    doc.display = Some(serde_json::Map::new());
    let conversion = converter().convert(&doc, Path::new(".")).expect("convert");
    assert!(conversion.model.display.is_none());
}

#[test]
fn all_hidden_is_an_error() {
    let mut doc = document();
    for elem in &mut doc.elements {
        elem.visible = false;
    }
    let err = converter().convert(&doc, Path::new(".")).expect_err("empty");
    assert!(matches!(err, ConvertError::EmptyResult));
}

#[test]
fn texture_failure_aborts_before_geometry() {
    let mut doc = document();
    doc.textures[1].payload = TexturePayload::Inline("data:image/png;base64".to_string());
    let err = converter().convert(&doc, Path::new(".")).expect_err("bad payload");
    assert!(matches!(err, ConvertError::InvalidPayload { index: 1, .. }));
}
