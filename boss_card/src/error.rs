use std::path::PathBuf;

use thiserror::Error;

use crate::assets::AssetKind;

/// Failure modes of the composition engine.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A text or shape render produced no visible pixels.
    #[error("rendered element has no visible pixels")]
    EmptyContent,
    #[error("{kind} '{id}' not found at {}", path.display())]
    MissingAsset {
        kind: AssetKind,
        id: String,
        path: PathBuf,
    },
    #[error("{kind} id {id:?} is not a plain file name")]
    InvalidAssetId { kind: AssetKind, id: String },
    #[error("cannot draw a health ratio of {current_hp} / {max_hp}")]
    InvalidRatio { current_hp: i64, max_hp: i64 },
    #[error(
        "rectangle {width}x{height}+{x}+{y} exceeds {canvas_width}x{canvas_height} canvas"
    )]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        canvas_width: u32,
        canvas_height: u32,
    },
    #[error("decoding {id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: image::ImageError,
    },
    #[error("loading font: {0}")]
    Font(String),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("encoding PNG to {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
