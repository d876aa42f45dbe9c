use crate::error::Result;
use crate::geom::UvScale;
use crate::geometry::convert_elements;
use crate::model::SourceDocument;
use crate::target::{GuiLight, ModelDocument, TextureTable, PARTICLE_KEY};
use crate::texture::{resolve_textures, ResolvedTexture};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Naming context for one run. All names are expected to be normalized
/// with [`crate::normalize::to_pack_name`] already.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub namespace: String,
    pub asset: String,
    pub variant: String,
    pub model_name: String,
    pub prefix_textures: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            namespace: "bloodstone".to_string(),
            asset: "model".to_string(),
            variant: "default".to_string(),
            model_name: "model".to_string(),
            prefix_textures: false,
        }
    }
}

impl ConvertConfig {
    pub fn texture_reference(&self, stem: &str) -> String {
        format!(
            "{}:item/{}/{}/{stem}",
            self.namespace, self.asset, self.variant
        )
    }
}

/// Everything a run produces before anything touches the disk.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub model: ModelDocument,
    pub textures: Vec<ResolvedTexture>,
}

impl Conversion {
    pub fn animated_count(&self) -> usize {
        self.textures.iter().filter(|t| t.is_animated()).count()
    }
}

pub struct Converter {
    cfg: ConvertConfig,
}

impl Converter {
    pub fn new(cfg: ConvertConfig) -> Self {
        Self { cfg }
    }

    /// `base_dir` is the bbmodel's directory; relative texture paths are
    /// resolved against it.
    pub fn convert(&self, doc: &SourceDocument, base_dir: &Path) -> Result<Conversion> {
        let textures = resolve_textures(&doc.textures, base_dir, &self.cfg)?;

        let known: HashSet<usize> = textures.iter().map(|t| t.index).collect();
        let scale = UvScale::from_resolution(doc.resolution.width, doc.resolution.height);
        let elements = convert_elements(&doc.elements, scale, &known)?;

        let mut table = TextureTable::new();
        for tex in &textures {
            table.insert(tex.index.to_string(), tex.reference.clone());
        }
        if let Some(first) = textures.first() {
            table.insert(PARTICLE_KEY, first.reference.clone());
        }

        let model = ModelDocument {
            textures: table,
            elements,
            gui_light: doc.front_gui_light.then_some(GuiLight::Front),
            display: doc.display.clone().filter(|d| !d.is_empty()),
        };

        info!(
            model = %self.cfg.model_name,
            textures = textures.len(),
            elements = model.elements.len(),
            "assembled model"
        );
        Ok(Conversion { model, textures })
    }
}
