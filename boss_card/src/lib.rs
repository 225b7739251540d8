//! Raster composition for boss-status cards and stacked reports.

pub mod assets;
pub mod canvas;
pub mod card;
pub mod chip;
pub mod chip_list;
pub mod config;
pub mod error;
pub mod geometry;
pub mod glyphs;
pub mod mask;
pub mod progress;
pub mod report;
pub mod text;

pub use assets::{AssetKind, AssetStore, DirectoryStore, MemoryStore, is_plain_id, write_png};
pub use canvas::{BoundingBox, Canvas, Color, Rect};
pub use card::{BossStatus, CardRenderer, ChipCategory, RenderedCard};
pub use config::{RenderConfig, load_render_config};
pub use error::RenderError;
pub use glyphs::{FontGlyphs, GlyphSource, PlacedGlyph};
pub use report::{render_report, stack_cards};
