//! Health bar with a label that changes colour where the fill ends.
//!
//! The label is rendered twice, white and black, with identical geometry.
//! Columns of the label left of the fill boundary come from the white copy
//! (readable on red), the rest from the black copy (readable on gray).

use crate::canvas::{Canvas, Color, Rect};
use crate::error::RenderError;
use crate::geometry::{center_in, round_half_even};
use crate::glyphs::GlyphSource;
use crate::mask::round_corners;
use crate::text::render_text;

pub const BAR_WIDTH: u32 = 340;
pub const BAR_HEIGHT: u32 = 24;
pub const LABEL_SIZE: f32 = 20.0;
pub const BACKDROP: Color = Color::rgb(200, 200, 200);
pub const FILL: Color = Color::rgb(255, 0, 0);

/// Column where the red fill ends, `round(current / max * BAR_WIDTH)`.
///
/// Health above the maximum pins the cursor to the right edge.
pub fn fill_cursor(current_hp: i64, max_hp: i64) -> Result<u32, RenderError> {
    if max_hp <= 0 || current_hp < 0 {
        return Err(RenderError::InvalidRatio { current_hp, max_hp });
    }
    if current_hp > max_hp {
        log::warn!("current hp {current_hp} exceeds max hp {max_hp}; drawing a full bar");
        return Ok(BAR_WIDTH);
    }
    let cursor = round_half_even(current_hp as f64 / max_hp as f64 * BAR_WIDTH as f64);
    Ok(cursor.clamp(0, BAR_WIDTH as i64) as u32)
}

/// Joins the white label's columns `[0, seek)` with the black label's
/// columns `[seek, width)`. Both labels must share dimensions.
pub fn split_tint(white: &Canvas, black: &Canvas, seek: i64) -> Result<Canvas, RenderError> {
    let (width, height) = white.dimensions();
    if seek <= 0 {
        return Ok(black.clone());
    }
    if seek >= width as i64 {
        return Ok(white.clone());
    }
    let seek = seek as u32;
    let mut label = Canvas::transparent(width, height);
    label.paste(&white.crop(Rect::new(0, 0, seek, height))?, 0, 0);
    label.paste(
        &black.crop(Rect::new(seek, 0, width - seek, height))?,
        seek as i32,
        0,
    );
    Ok(label)
}

pub fn render_progress_bar(
    glyphs: &dyn GlyphSource,
    current_hp: i64,
    max_hp: i64,
) -> Result<Canvas, RenderError> {
    let cursor = fill_cursor(current_hp, max_hp)?;

    let mut bar = Canvas::new(BAR_WIDTH, BAR_HEIGHT, BACKDROP);
    // the fill includes the cursor column itself
    bar.fill_rect(Rect::new(0, 0, cursor + 1, BAR_HEIGHT), FILL);

    let text = format!("{current_hp} / {max_hp}");
    let white = render_text(glyphs, &text, LABEL_SIZE, Color::WHITE);
    let black = render_text(glyphs, &text, LABEL_SIZE, Color::BLACK);
    let (label_x, label_y) = center_in(BAR_WIDTH, BAR_HEIGHT, &white);
    let seek = cursor as i64 - label_x as i64 + 1;
    log::debug!("hp bar {text}: fill cursor {cursor}, label at {label_x}, split at column {seek}");

    let label = split_tint(&white, &black, seek)?;
    bar.composite_over(label, label_x, label_y);

    Ok(round_corners(&bar, None))
}
