use base64::{prelude::BASE64_STANDARD, Engine};
use bbconvert_core::assemble::ConvertConfig;
use bbconvert_core::model::{SourceTexture, TexturePayload};
use bbconvert_core::normalize::{texture_stem, to_pack_name, StemRegistry};
use bbconvert_core::texture::{decode_data_uri, resolve_textures};
use bbconvert_core::ConvertError;
use std::path::{Path, PathBuf};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake";

fn inline(index: usize, name: &str) -> SourceTexture {
    let uri = format!("data:image/png;base64,{}", BASE64_STANDARD.encode(PNG_BYTES));
    SourceTexture::new(index, name, TexturePayload::Inline(uri))
}

fn cfg() -> ConvertConfig {
    ConvertConfig {
        namespace: "bloodstone".to_string(),
        asset: "sword".to_string(),
        variant: "default".to_string(),
        model_name: "ruby_sword".to_string(),
        prefix_textures: false,
    }
}

#[test]
fn duplicate_names_get_numbered_stems() {
    let textures = vec![inline(0, "tex"), inline(1, "tex.png"), inline(2, "TEX")];
    let resolved = resolve_textures(&textures, Path::new("."), &cfg()).expect("resolve");

    let stems: Vec<_> = resolved.iter().map(|t| t.stem.as_str()).collect();
    assert_eq!(vec!["tex", "tex_2", "tex_3"], stems);
    assert_eq!("bloodstone:item/sword/default/tex_2", resolved[1].reference);
    assert_eq!(PNG_BYTES, resolved[0].bytes.as_slice());
}

#[test]
fn blank_names_and_prefixing() {
    assert_eq!("texture_4", texture_stem("", 4, None));
    assert_eq!("my_texture", texture_stem("My Texture.png", 0, None));
    assert_eq!("ruby_sword_blade", texture_stem("Blade.png", 0, Some("ruby_sword")));
    assert_eq!("ruby_sword_texture_3", texture_stem("", 3, Some("ruby_sword")));
    assert_eq!("a.b", texture_stem("a.b.png", 0, None));

    let mut cfg = cfg();
    cfg.prefix_textures = true;
    let resolved =
        resolve_textures(&[inline(0, "blade.png")], Path::new("."), &cfg).expect("resolve");
    assert_eq!("ruby_sword_blade", resolved[0].stem);
}

#[test]
fn pack_names_are_restricted() {
    assert_eq!("hello_world_.png", to_pack_name("Hello World!.png"));
    assert_eq!("caf_", to_pack_name("café"));

    let mut registry = StemRegistry::new();
    assert_eq!("a", registry.claim("a"));
    assert_eq!("a_2", registry.claim("a"));
    assert_eq!("a_2_2", registry.claim("a_2"));
    assert_eq!(3, registry.len());
}

#[test]
fn equal_ratios_are_not_animated() {
    let mut tex = inline(0, "flat");
    tex.width = 16;
    tex.height = 32;
    tex.uv_width = 16;
    tex.uv_height = 32;
    assert!(!tex.is_animated());

    tex.height = 64;
    assert!(tex.is_animated());
}

#[test]
fn falls_back_to_pixel_aspect_without_uv_size() {
    let mut tex = inline(0, "strip");
    tex.width = 16;
    tex.height = 48;
    assert!(tex.is_animated());

    tex.height = 16;
    assert!(!tex.is_animated());

    tex.width = 0;
    tex.height = 48;
    assert!(!tex.is_animated());
}

#[test]
fn animated_texture_carries_mcmeta() {
    let mut tex = inline(0, "fire");
    tex.width = 16;
    tex.height = 64;
    tex.uv_width = 16;
    tex.uv_height = 16;
    tex.frame_time = 3;
    tex.frame_interpolate = true;

    let resolved = resolve_textures(&[tex], Path::new("."), &cfg()).expect("resolve");
    let meta = resolved[0].animation.expect("animated");
    assert!(meta.animation.interpolate);
    assert_eq!(3, meta.animation.frametime);
    assert_eq!(
        "{\n  \"animation\": {\n    \"interpolate\": true,\n    \"frametime\": 3\n  }\n}\n",
        meta.to_json().expect("json")
    );
}

#[test]
fn malformed_data_uris_are_rejected() {
    assert!(matches!(
        decode_data_uri(5, "data:image/png;base64"),
        Err(ConvertError::InvalidPayload { index: 5, .. })
    ));
    assert!(matches!(
        decode_data_uri(1, "data:image/png;base64,@@@not-base64"),
        Err(ConvertError::InvalidPayload { index: 1, .. })
    ));
    assert_eq!(
        b"hi".to_vec(),
        decode_data_uri(0, "data:text/plain;base64,aG\nk=").expect("decode")
    );    // Non-zero bits in the last symbol are ignored.
    assert_eq!(
        b"hi".to_vec(),
        decode_data_uri(0, "data:text/plain;base64,aGl=").expect("trailing bits")
    );
}

#[test]
fn external_textures_resolve_relative_to_base_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path().join("tex")).expect("mkdir");
    std::fs::write(dir.path().join("tex/stone.png"), PNG_BYTES).expect("write");

    let external = |path: &str| TexturePayload::External(PathBuf::from(path));
    let found = SourceTexture::new(0, "stone.png", external("tex/stone.png"));
    let resolved = resolve_textures(&[found], dir.path(), &cfg()).expect("resolve");
    assert_eq!(PNG_BYTES, resolved[0].bytes.as_slice());

    let missing = SourceTexture::new(2, "gone.png", external("gone.png"));
    let err = resolve_textures(&[inline(0, "a"), inline(1, "b"), missing], dir.path(), &cfg())
        .expect_err("missing file");
    match err {
        ConvertError::MissingExternalAsset { index, path } => {
            assert_eq!(2, index);
            assert_eq!(dir.path().join("gone.png"), path);
        }
        other => panic!("unexpected error: {other}"),
    }
}
