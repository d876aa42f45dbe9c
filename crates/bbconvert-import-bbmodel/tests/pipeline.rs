//! bbmodel on disk -> planned and written model, textures and sidecars.

use bbconvert_core::assemble::{ConvertConfig, Converter};
use bbconvert_core::plan::{OutputPlan, WriteOptions};
use bbconvert_core::ConvertError;
use bbconvert_import_bbmodel::{base_dir, import_bbmodel};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::tempdir;

// 1x1 transparent PNG.
const PNG_B64: &str = concat!(
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk",
    "YPhfDwAChwGA60e6kgAAAABJRU5ErkJggg=="
);

fn face(texture: i64) -> Value {
    json!({"uv": [0, 0, 16, 16], "texture": texture})
}

fn write_bbmodel(dir: &Path) -> std::path::PathBuf {
    std::fs::write(dir.join("strip.png"), b"external-bytes").expect("external texture");
    let bbmodel = json!({
        "meta": {"format_version": "4.10"},
        "resolution": {"width": 16, "height": 16},
        "textures": [
            {"name": "Body.png", "source": format!("data:image/png;base64,{PNG_B64}"),
             "width": 16, "height": 16, "uv_width": 16, "uv_height": 16},
            {"name": "strip.png", "path": "strip.png", "width": 16, "height": 64,
             "frame_time": 4}
        ],
        "elements": [
            {"name": "body", "from": [0, 0, 0], "to": [16, 16, 16],
             "faces": {"north": face(0), "east": face(0), "south": face(0),
                       "west": face(0), "up": face(1), "down": face(1)}},
            {"name": "hidden", "visibility": false, "from": [0, 0, 0], "to": [1, 1, 1],
             "faces": {"north": face(0)}}
        ],
        "display": {"gui": {"rotation": [30, 45, 0]}}
    });
    let path = dir.join("Fire Totem.bbmodel");
    std::fs::write(&path, serde_json::to_string_pretty(&bbmodel).expect("json")).expect("bbmodel");
    path
}

fn cfg() -> ConvertConfig {
    ConvertConfig {
        namespace: "bloodstone".to_string(),
        asset: "fire_totem".to_string(),
        variant: "default".to_string(),
        model_name: "fire_totem".to_string(),
        prefix_textures: true,
    }
}

#[test]
fn converts_bbmodel_file_end_to_end() {
    let src = tempdir().expect("src");
    let assets = tempdir().expect("assets");
    let path = write_bbmodel(src.path());

    let doc = import_bbmodel(&path).expect("import");
    let conversion = Converter::new(cfg())
        .convert(&doc, &base_dir(&path))
        .expect("convert");
    let plan = OutputPlan::new(assets.path(), &cfg(), &conversion).expect("plan");
    plan.execute(&WriteOptions::default()).expect("write");

    let model: Value = serde_json::from_str(
        &std::fs::read_to_string(
            assets
                .path()
                .join("bloodstone/models/item/fire_totem/default/fire_totem.json"),
        )
        .expect("model file"),
    )
    .expect("model json");

    assert_eq!(
        json!({
            "0": "bloodstone:item/fire_totem/default/fire_totem_body",
            "1": "bloodstone:item/fire_totem/default/fire_totem_strip",
            "particle": "bloodstone:item/fire_totem/default/fire_totem_body"
        }),
        model["textures"]
    );
    assert_eq!(1, model["elements"].as_array().expect("elements").len());
    assert_eq!(json!("#1"), model["elements"][0]["faces"]["up"]["texture"]);
    assert_eq!(json!({"gui": {"rotation": [30, 45, 0]}}), model["display"]);
    assert!(model.get("gui_light").is_none());

    let tex_dir = assets.path().join("bloodstone/textures/item/fire_totem/default");
    assert_eq!(
        b"external-bytes".to_vec(),
        std::fs::read(tex_dir.join("fire_totem_strip.png")).expect("strip")
    );
    assert!(tex_dir.join("fire_totem_body.png").is_file());
    assert!(!tex_dir.join("fire_totem_body.png.mcmeta").exists());

    let meta: Value = serde_json::from_str(
        &std::fs::read_to_string(tex_dir.join("fire_totem_strip.png.mcmeta")).expect("mcmeta"),
    )
    .expect("mcmeta json");
    assert_eq!(json!({"animation": {"interpolate": false, "frametime": 4}}), meta);

    // A second identical run is refused, then accepted with overwrite.
    let err = plan.execute(&WriteOptions::default()).expect_err("collision");
    assert!(matches!(err, ConvertError::DestinationCollision { ref paths } if paths.len() == 4));
    plan.execute(&WriteOptions {
        overwrite: true,
        dry_run: false,
    })
    .expect("overwrite");
}

#[test]
fn invalid_json_is_reported_with_path() {
    let src = tempdir().expect("src");
    let path = src.path().join("broken.bbmodel");
    std::fs::write(&path, "{ not json").expect("write");
    let err = import_bbmodel(&path).expect_err("invalid json");
    assert!(format!("{err:#}").contains("broken.bbmodel"));
}

#[test]
fn missing_external_texture_fails_conversion() {
    let src = tempdir().expect("src");
    let path = write_bbmodel(src.path());
    std::fs::remove_file(src.path().join("strip.png")).expect("remove");

    let doc = import_bbmodel(&path).expect("import");
    let err = Converter::new(cfg())
        .convert(&doc, &base_dir(&path))
        .expect_err("missing texture");
    assert!(matches!(err, ConvertError::MissingExternalAsset { index: 1, .. }));
}
