//! Text rasterization into tightly cropped canvases.

use crate::canvas::{Canvas, Color};
use crate::glyphs::{GlyphSource, PlacedGlyph};

/// Renders `text` in `color` and crops the result to its visible pixels.
///
/// Extents come from the glyph layout, so the canvas is allocated at the
/// size of the ink rather than at a guessed upper bound. Text with no
/// visible glyphs (empty, whitespace) yields [`Canvas::empty`], which the
/// compositors skip.
pub fn render_text(glyphs: &dyn GlyphSource, text: &str, size: f32, color: Color) -> Canvas {
    let placed = glyphs.layout_run(text, size);
    let Some((left, top, right, bottom)) = ink_extents(&placed) else {
        log::debug!("text {text:?} at {size}px has no glyphs to draw");
        return Canvas::empty();
    };

    let mut canvas = Canvas::transparent((right - left) as u32, (bottom - top) as u32);
    for glyph in &placed {
        draw_glyph(&mut canvas, glyph, glyph.x - left, glyph.y - top, color);
    }

    canvas.trimmed().unwrap_or_else(|_| {
        log::debug!("text {text:?} at {size}px rasterized without coverage");
        Canvas::empty()
    })
}

fn ink_extents(placed: &[PlacedGlyph]) -> Option<(i32, i32, i32, i32)> {
    placed
        .iter()
        .filter(|glyph| glyph.width > 0 && glyph.height > 0)
        .map(|glyph| {
            (
                glyph.x,
                glyph.y,
                glyph.x + glyph.width as i32,
                glyph.y + glyph.height as i32,
            )
        })
        .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
}

fn draw_glyph(canvas: &mut Canvas, glyph: &PlacedGlyph, origin_x: i32, origin_y: i32, color: Color) {
    for gy in 0..glyph.height {
        let row = gy as usize * glyph.width as usize;
        for gx in 0..glyph.width {
            let coverage = glyph.coverage.get(row + gx as usize).copied().unwrap_or(0);
            if coverage == 0 {
                continue;
            }
            let x = (origin_x + gx as i32) as u32;
            let y = (origin_y + gy as i32) as u32;
            let alpha = ((coverage as u16 * color.a as u16) / u8::MAX as u16) as u8;
            // Overlapping glyph boxes keep the stronger coverage.
            if canvas.pixel(x, y).a >= alpha {
                continue;
            }
            canvas.put_pixel(x, y, Color::rgba(color.r, color.g, color.b, alpha));
        }
    }
}
