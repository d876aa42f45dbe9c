use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;

/// Every way a single conversion run can fail. None of these are recoverable;
/// the run stops at the first one and writes nothing.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A required array/object is missing or an entry has the wrong shape.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("{owner} has non-numeric {field}")]
    InvalidNumericField { owner: String, field: String },

    #[error("texture {index} has invalid inline payload: {reason}")]
    InvalidPayload { index: usize, reason: String },

    #[error("texture {index} external source missing: {path:?}")]
    MissingExternalAsset { index: usize, path: PathBuf },

    #[error("element '{element}' has unsupported rotation: {reason}")]
    UnsupportedRotation { element: String, reason: String },

    #[error("element '{element}' face '{face}' references missing texture index {index}")]
    UnknownTextureRef {
        element: String,
        face: String,
        index: i64,
    },

    #[error("no visible textured elements were generated from the bbmodel")]
    EmptyResult,

    #[error("destination files already exist; use --force to overwrite\n{}", CollisionList(.paths))]
    DestinationCollision { paths: Vec<PathBuf> },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    pub fn numeric(owner: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidNumericField {
            owner: owner.into(),
            field: field.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

const COLLISION_PREVIEW: usize = 10;

struct CollisionList<'a>(&'a [PathBuf]);

impl fmt::Display for CollisionList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, path) in self.0.iter().take(COLLISION_PREVIEW).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "- {}", path.display())?;
        }
        if self.0.len() > COLLISION_PREVIEW {
            write!(f, "\n... and {} more", self.0.len() - COLLISION_PREVIEW)?;
        }
        Ok(())
    }
}
