//! Destination layout and the all-or-nothing write step.
//!
//! ```text
//! <root>/<namespace>/models/item/<asset>/<variant>/<model_name>.json
//! <root>/<namespace>/textures/item/<asset>/<variant>/<stem>.png
//! <root>/<namespace>/textures/item/<asset>/<variant>/<stem>.png.mcmeta
//! ```

use crate::assemble::{ConvertConfig, Conversion};
use crate::error::{ConvertError, Result};
use crate::report::{WriteOutcome, WriteRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const MCMETA_SUFFIX: &str = ".mcmeta";

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Replace existing destination files instead of refusing the run.
    pub overwrite: bool,
    /// Validate and plan, but write nothing.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteKind {
    Model,
    Texture,
    #[serde(rename = "mcmeta")]
    McMeta,
}

#[derive(Debug, Clone)]
pub struct PlannedWrite {
    pub kind: WriteKind,
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

pub fn model_dir(root: &Path, cfg: &ConvertConfig) -> PathBuf {
    item_dir(root, cfg, "models")
}

pub fn texture_dir(root: &Path, cfg: &ConvertConfig) -> PathBuf {
    item_dir(root, cfg, "textures")
}

fn item_dir(root: &Path, cfg: &ConvertConfig, kind: &str) -> PathBuf {
    root.join(&cfg.namespace)
        .join(kind)
        .join("item")
        .join(&cfg.asset)
        .join(&cfg.variant)
}

pub fn sidecar_path(texture_path: &Path) -> PathBuf {
    let mut name = texture_path.as_os_str().to_owned();
    name.push(MCMETA_SUFFIX);
    PathBuf::from(name)
}

/// Every file one run will produce: the model, then textures, then sidecars.
#[derive(Debug, Clone)]
pub struct OutputPlan {
    model_path: PathBuf,
    texture_dir: PathBuf,
    writes: Vec<PlannedWrite>,
    /// Sidecar locations of static textures; removed if present on overwrite.
    static_sidecars: Vec<PathBuf>,
    /// `<namespace>:item/<asset>/<variant>/`, shared by every texture reference.
    reference_prefix: String,
    stems: HashSet<String>,
}

impl OutputPlan {
    pub fn new(root: &Path, cfg: &ConvertConfig, conversion: &Conversion) -> Result<Self> {
        let model_path = model_dir(root, cfg).join(format!("{}.json", cfg.model_name));
        let texture_dir = texture_dir(root, cfg);

        let model_json = conversion
            .model
            .to_json()
            .map_err(|e| ConvertError::io(&model_path, e.into()))?;
        let mut writes = vec![PlannedWrite {
            kind: WriteKind::Model,
            path: model_path.clone(),
            contents: model_json.into_bytes(),
        }];

        let mut sidecars = Vec::new();
        let mut static_sidecars = Vec::new();
        let mut stems = HashSet::new();
        for tex in &conversion.textures {
            stems.insert(tex.stem.clone());
            let png = texture_dir.join(format!("{}.png", tex.stem));
            let sidecar = sidecar_path(&png);
            match &tex.animation {
                Some(meta) => {
                    let json = meta.to_json().map_err(|e| ConvertError::io(&sidecar, e.into()))?;
                    sidecars.push(PlannedWrite {
                        kind: WriteKind::McMeta,
                        path: sidecar,
                        contents: json.into_bytes(),
                    });
                }
                None => static_sidecars.push(sidecar),
            }
            writes.push(PlannedWrite {
                kind: WriteKind::Texture,
                path: png,
                contents: tex.bytes.clone(),
            });
        }
        writes.extend(sidecars);

        Ok(Self {
            model_path,
            texture_dir,
            writes,
            static_sidecars,
            reference_prefix: cfg.texture_reference(""),
            stems,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn texture_dir(&self) -> &Path {
        &self.texture_dir
    }

    pub fn writes(&self) -> &[PlannedWrite] {
        &self.writes
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.writes.iter().map(|w| w.path.as_path())
    }

    /// Planned paths that already exist on disk.
    pub fn collisions(&self) -> Vec<PathBuf> {
        self.paths()
            .filter(|p| p.exists())
            .map(Path::to_path_buf)
            .collect()
    }

    pub fn ensure_writable(&self, overwrite: bool) -> Result<()> {
        if overwrite {
            return Ok(());
        }
        let paths = self.collisions();
        if paths.is_empty() {
            Ok(())
        } else {
            Err(ConvertError::DestinationCollision { paths })
        }
    }

    /// Checks for collisions, then writes every planned file (or none).
    pub fn execute(&self, opts: &WriteOptions) -> Result<Vec<WriteRecord>> {
        self.ensure_writable(opts.overwrite)?;

        if opts.dry_run {
            return Ok(self
                .writes
                .iter()
                .map(|w| {
                    info!(path = ?w.path, "DRY-RUN WRITE");
                    record(w.kind, &w.path, WriteOutcome::Planned)
                })
                .collect());
        }

        // Must be read before the model is replaced.
        let stale = if opts.overwrite {
            self.removed_textures()
        } else {
            Vec::new()
        };

        for dir in [self.model_path.parent(), Some(self.texture_dir.as_path())]
            .into_iter()
            .flatten()
        {
            std::fs::create_dir_all(dir).map_err(|e| ConvertError::io(dir, e))?;
        }

        let mut records = Vec::with_capacity(self.writes.len());
        for w in &self.writes {
            let outcome = if holds_bytes(&w.path, &w.contents) {
                debug!(path = ?w.path, "destination already identical, skipping");
                WriteOutcome::Unchanged
            } else {
                std::fs::write(&w.path, &w.contents)
                    .map_err(|e| ConvertError::io(&w.path, e))?;
                info!(path = ?w.path, "WRITE");
                WriteOutcome::Written
            };
            records.push(record(w.kind, &w.path, outcome));
        }

        for sidecar in self.static_sidecars.iter().filter(|p| p.is_file()) {
            if opts.overwrite {
                std::fs::remove_file(sidecar).map_err(|e| ConvertError::io(sidecar, e))?;
                info!(path = ?sidecar, "removed stale animation sidecar");
                records.push(record(WriteKind::McMeta, sidecar, WriteOutcome::Removed));
            } else {
                warn!(path = ?sidecar, "static texture has a leftover animation sidecar");
            }
        }

        for stem in &stale {
            let png = self.texture_dir.join(format!("{stem}.png"));
            let sidecar = sidecar_path(&png);
            for (kind, path) in [(WriteKind::Texture, png), (WriteKind::McMeta, sidecar)] {
                if path.is_file() {
                    std::fs::remove_file(&path).map_err(|e| ConvertError::io(&path, e))?;
                    info!(path = ?path, "removed texture dropped since the previous run");
                    records.push(record(kind, &path, WriteOutcome::Removed));
                }
            }
        }

        Ok(records)
    }

    /// Stems referenced by the model currently on disk that this plan no
    /// longer produces. Only files that model referenced are candidates.
    fn removed_textures(&self) -> Vec<String> {
        let Ok(bytes) = std::fs::read(&self.model_path) else {
            return Vec::new();
        };
        let previous: Value = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => {
                warn!(path = ?self.model_path, error = %e, "existing model is not valid JSON");
                return Vec::new();
            }
        };
        let Some(textures) = previous.get("textures").and_then(Value::as_object) else {
            return Vec::new();
        };
        textures
            .values()
            .filter_map(Value::as_str)
            .filter_map(|r| r.strip_prefix(self.reference_prefix.as_str()))
            .filter(|stem| is_plain_stem(stem) && !self.stems.contains(*stem))
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// A bare file stem; anything that could escape the texture directory is ignored.
fn is_plain_stem(stem: &str) -> bool {
    !stem.is_empty() && stem != "." && stem != ".." && !stem.contains(['/', '\\'])
}

fn record(kind: WriteKind, path: &Path, outcome: WriteOutcome) -> WriteRecord {
    WriteRecord {
        kind,
        path: path.to_path_buf(),
        outcome,
    }
}

fn holds_bytes(path: &Path, contents: &[u8]) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() == contents.len() as u64 => {
            std::fs::read(path).is_ok_and(|existing| existing == contents)
        }
        _ => false,
    }
}
