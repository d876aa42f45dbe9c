use crate::assemble::ConvertConfig;
use crate::error::{ConvertError, Result};
use crate::model::{SourceTexture, TexturePayload};
use crate::normalize::{texture_stem, StemRegistry};
use crate::target::{Animation, McMeta};
use base64::alphabet::STANDARD;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Standard alphabet, tolerating non-zero bits in the final symbol.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTexture {
    /// Position in the source texture list.
    pub index: usize,
    /// Unique within the run; becomes `<stem>.png`.
    pub stem: String,
    /// `<namespace>:item/<asset>/<variant>/<stem>`
    pub reference: String,
    pub bytes: Vec<u8>,
    pub animation: Option<McMeta>,
}

impl ResolvedTexture {
    pub fn is_animated(&self) -> bool {
        self.animation.is_some()
    }
}

/// Decodes, names and classifies every texture in declaration order.
/// The first failure aborts the whole pass.
pub fn resolve_textures(
    textures: &[SourceTexture],
    base_dir: &Path,
    cfg: &ConvertConfig,
) -> Result<Vec<ResolvedTexture>> {
    let mut stems = StemRegistry::new();
    let prefix = cfg.prefix_textures.then_some(cfg.model_name.as_str());

    textures
        .iter()
        .map(|texture| -> Result<ResolvedTexture> {
            let stem = stems.claim(&texture_stem(&texture.name, texture.index, prefix));
            let bytes = load_payload(texture, base_dir)?;
            let animation = texture.is_animated().then(|| McMeta {
                animation: Animation {
                    interpolate: texture.frame_interpolate,
                    frametime: texture.frame_time,
                },
            });
            debug!(
                index = texture.index,
                stem = %stem,
                bytes = bytes.len(),
                animated = animation.is_some(),
                "resolved texture"
            );
            Ok(ResolvedTexture {
                index: texture.index,
                reference: cfg.texture_reference(&stem),
                stem,
                bytes,
                animation,
            })
        })
        .collect()
}

fn load_payload(texture: &SourceTexture, base_dir: &Path) -> Result<Vec<u8>> {
    match &texture.payload {
        TexturePayload::Inline(uri) => decode_data_uri(texture.index, uri),
        TexturePayload::External(path) => {
            let path = resolve_external(path, base_dir);
            if !path.is_file() {
                return Err(ConvertError::MissingExternalAsset {
                    index: texture.index,
                    path,
                });
            }
            std::fs::read(&path).map_err(|e| ConvertError::io(path, e))
        }
    }
}

fn resolve_external(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Decodes the base64 part of a `data:[<mime>][;base64],<payload>` URI.
pub fn decode_data_uri(index: usize, uri: &str) -> Result<Vec<u8>> {
    let Some((_, payload)) = uri.split_once(',') else {
        return Err(ConvertError::InvalidPayload {
            index,
            reason: "data URI has no ',' separator".to_string(),
        });
    };
    // Blockbench occasionally wraps long payloads.
    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    LENIENT_BASE64
        .decode(payload.as_bytes())
        .map_err(|e| ConvertError::InvalidPayload {
            index,
            reason: e.to_string(),
        })
}
