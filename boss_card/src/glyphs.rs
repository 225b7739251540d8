//! Glyph sources feeding the text rasterizer.
//!
//! A [`GlyphSource`] lays out one run of text and hands back alpha coverage
//! masks positioned relative to the pen origin (y grows downward). The
//! production source wraps a single `fontdue` font that is loaded once and
//! shared read-only between renders.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};

use crate::error::RenderError;

/// Coverage mask for one glyph, `width * height` bytes in row-major order.
#[derive(Debug, Clone)]
pub struct PlacedGlyph {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub coverage: Arc<[u8]>,
}

pub trait GlyphSource: Send + Sync {
    /// Lays out `text` at `size` pixels. `'\n'` starts a new line.
    fn layout_run(&self, text: &str, size: f32) -> Vec<PlacedGlyph>;
}

pub struct FontGlyphs {
    font: Font,
    cache: Mutex<HashMap<GlyphRasterConfig, Arc<[u8]>>>,
}

impl FontGlyphs {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RenderError> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|err| RenderError::Font(err.to_string()))?;
        Ok(Self {
            font,
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn open(path: &Path) -> Result<Self, RenderError> {
        let bytes = fs::read(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    fn coverage_for(&self, key: GlyphRasterConfig) -> Arc<[u8]> {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache
            .entry(key)
            .or_insert_with(|| {
                let (_, bitmap) = self.font.rasterize_config(key);
                Arc::from(bitmap.into_boxed_slice())
            })
            .clone()
    }
}

impl GlyphSource for FontGlyphs {
    fn layout_run(&self, text: &str, size: f32) -> Vec<PlacedGlyph> {
        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[&self.font], &TextStyle::new(text, size, 0));

        layout
            .glyphs()
            .iter()
            .filter(|glyph| glyph.char_data.rasterize() && glyph.width > 0 && glyph.height > 0)
            .map(|glyph| PlacedGlyph {
                x: glyph.x.round() as i32,
                y: glyph.y.round() as i32,
                width: glyph.width as u32,
                height: glyph.height as u32,
                coverage: self.coverage_for(glyph.key),
            })
            .collect()
    }
}
