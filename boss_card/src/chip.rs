//! Participant badges: avatar thumbnail plus name on a tinted pill.

use rand::Rng;

use crate::canvas::{Canvas, Color};
use crate::geometry::center_offset;
use crate::glyphs::GlyphSource;
use crate::mask::round_corners;
use crate::text::render_text;

pub const CHIP_HEIGHT: u32 = 24;
pub const THUMBNAIL_SIZE: u32 = 20;
pub const LABEL_SIZE: f32 = 20.0;
const THUMBNAIL_POSITION: (i32, i32) = (5, 2);
const LABEL_X: i32 = 30;
/// Horizontal padding around the thumbnail and label combined.
const PADDING: u32 = 15;

/// White text reads better on backgrounds darker than mid-gray.
pub fn prefers_white_text(background: Color) -> bool {
    background.luminance() < 0.5
}

pub fn contrast_text_color(background: Color) -> Color {
    if prefers_white_text(background) {
        Color::WHITE
    } else {
        Color::BLACK
    }
}

/// Opaque tint with every channel drawn uniformly from `10..=240`.
pub fn random_chip_color<R: Rng + ?Sized>(rng: &mut R) -> Color {
    Color::rgb(
        rng.random_range(10..=240),
        rng.random_range(10..=240),
        rng.random_range(10..=240),
    )
}

pub fn render_chip(
    glyphs: &dyn GlyphSource,
    thumbnail: &Canvas,
    label: &str,
    tint: Color,
) -> Canvas {
    let thumbnail = round_corners(&thumbnail.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE), None);
    let text = render_text(glyphs, label, LABEL_SIZE, contrast_text_color(tint));

    let width = PADDING + thumbnail.width() + text.width();
    let mut badge = Canvas::new(width, CHIP_HEIGHT, tint);
    badge.composite_over(thumbnail, THUMBNAIL_POSITION.0, THUMBNAIL_POSITION.1);
    if !text.is_empty() {
        let y = center_offset(CHIP_HEIGHT, text.height());
        badge.composite_over(text, LABEL_X, y);
    }
    round_corners(&badge, None)
}
