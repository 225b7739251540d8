use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::{ColorType, ImageEncoder, codecs::png::PngEncoder};

use crate::canvas::Canvas;
use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Icon,
    Avatar,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Icon => f.write_str("boss icon"),
            AssetKind::Avatar => f.write_str("avatar"),
        }
    }
}

/// Ids name a single file inside the store's directory: non-empty, no path
/// separators, and not `.` or `..`.
pub fn is_plain_id(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\', '\0'])
}

/// Resolves an opaque asset id (user id, boss icon id) to a decoded image.
pub trait AssetStore: Send + Sync {
    fn open(&self, id: &str) -> Result<Canvas, RenderError>;
}

/// Images stored as `{root}/{id}.{extension}`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    kind: AssetKind,
    root: PathBuf,
    extension: String,
}

impl DirectoryStore {
    pub fn new(kind: AssetKind, root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            kind,
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.{}", self.extension))
    }
}

impl AssetStore for DirectoryStore {
    fn open(&self, id: &str) -> Result<Canvas, RenderError> {
        if !is_plain_id(id) {
            return Err(RenderError::InvalidAssetId {
                kind: self.kind,
                id: id.to_string(),
            });
        }
        let path = self.path_for(id);
        if !path.is_file() {
            return Err(RenderError::MissingAsset {
                kind: self.kind,
                id: id.to_string(),
                path,
            });
        }
        let image = image::open(&path).map_err(|source| RenderError::Decode {
            id: id.to_string(),
            source,
        })?;
        Ok(Canvas::from(image))
    }
}

/// Images already held in memory, keyed by id.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    kind: AssetKind,
    images: HashMap<String, Canvas>,
}

impl MemoryStore {
    pub fn new(kind: AssetKind) -> Self {
        Self {
            kind,
            images: HashMap::new(),
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, image: Canvas) {
        self.images.insert(id.into(), image);
    }

    pub fn with(mut self, id: impl Into<String>, image: Canvas) -> Self {
        self.insert(id, image);
        self
    }
}

impl AssetStore for MemoryStore {
    fn open(&self, id: &str) -> Result<Canvas, RenderError> {
        self.images
            .get(id)
            .cloned()
            .ok_or_else(|| RenderError::MissingAsset {
                kind: self.kind,
                id: id.to_string(),
                path: PathBuf::from(id),
            })
    }
}

pub fn write_png(canvas: &Canvas, destination: &Path) -> Result<(), RenderError> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| RenderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    let file = File::create(destination).map_err(|source| RenderError::Io {
        path: destination.to_path_buf(),
        source,
    })?;
    let encoder = PngEncoder::new(BufWriter::new(file));
    encoder
        .write_image(
            canvas.as_image().as_raw(),
            canvas.width(),
            canvas.height(),
            ColorType::Rgba8.into(),
        )
        .map_err(|source| RenderError::Encode {
            path: destination.to_path_buf(),
            source,
        })
}
