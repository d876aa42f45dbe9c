//! Blockbench `.bbmodel` to vanilla item model conversion.
//!
//! One run turns one [`model::SourceDocument`] into one [`target::ModelDocument`]
//! plus its PNG textures and animation sidecars:
//! textures are resolved ([`texture`]), cuboids converted ([`geometry`]), the
//! two are combined ([`assemble`]) and finally laid out on disk ([`plan`]).

pub mod assemble;
pub mod coerce;
pub mod error;
pub mod geom;
pub mod geometry;
pub mod model;
pub mod normalize;
pub mod plan;
pub mod report;
pub mod target;
pub mod texture;

pub use error::{ConvertError, Result};
