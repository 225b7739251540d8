//! Row-wrapped block of chips for one category.
//!
//! Placement is computed up front by [`pack_rows`] from the chip widths
//! alone, so the block canvas is allocated at its final height.

use crate::canvas::{Canvas, Color};
use crate::geometry::center_offset;
use crate::glyphs::GlyphSource;
use crate::mask::round_corners;
use crate::text::render_text;

pub const LIST_WIDTH: u32 = 340;
pub const MIN_HEIGHT: u32 = 64;
/// Left margin reserved for the vertical category label.
pub const ORIGIN_X: u32 = 34;
pub const ORIGIN_Y: u32 = 5;
pub const ROW_STEP: u32 = 29;
pub const CHIP_GAP: u32 = 5;
const BOTTOM_PADDING: u32 = 34;
const CATEGORY_LABEL_X: i32 = 5;
const CATEGORY_LABEL_SIZE: f32 = 24.0;
const PLACEHOLDER_SIZE: f32 = 28.0;
const CORNER_RADIUS: u32 = 5;

/// Tints for category blocks.
pub const CONTAINER_PALETTE: [Color; 6] = [
    Color::rgb(229, 115, 115),
    Color::rgb(186, 104, 200),
    Color::rgb(149, 177, 205),
    Color::rgb(100, 181, 246),
    Color::rgb(77, 182, 172),
    Color::rgb(220, 231, 177),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Index into the widths handed to [`pack_rows`].
    pub index: usize,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLayout {
    pub placements: Vec<Placement>,
    pub height: u32,
}

/// Greedy left-to-right, top-to-bottom packing, narrowest chips first.
///
/// A chip that starts a wrapped row advances the cursor by its width only;
/// chips placed on the current row also add [`CHIP_GAP`].
pub fn pack_rows(widths: &[u32]) -> RowLayout {
    let mut order: Vec<usize> = (0..widths.len()).collect();
    order.sort_by_key(|&index| widths[index]);

    let mut x = ORIGIN_X;
    let mut y = ORIGIN_Y;
    let mut placements = Vec::with_capacity(widths.len());
    for index in order {
        let width = widths[index];
        if x + width <= LIST_WIDTH {
            placements.push(Placement { index, x, y });
            x += width + CHIP_GAP;
        } else {
            y += ROW_STEP;
            x = ORIGIN_X;
            placements.push(Placement { index, x, y });
            x += width;
        }
    }

    RowLayout {
        placements,
        height: (y + BOTTOM_PADDING).max(MIN_HEIGHT),
    }
}

/// Lays `chips` out under a vertical `category` label on a `background`
/// block. With no chips the block shows `placeholder` instead.
pub fn render_chip_list(
    glyphs: &dyn GlyphSource,
    category: &str,
    chips: Vec<Canvas>,
    background: Color,
    placeholder: &str,
) -> Canvas {
    let label = render_text(
        glyphs,
        &vertical_text(category),
        CATEGORY_LABEL_SIZE,
        Color::WHITE,
    );

    if chips.is_empty() {
        let mut block = Canvas::new(LIST_WIDTH, MIN_HEIGHT, background);
        composite_label(&mut block, label);
        let message = render_text(glyphs, placeholder, PLACEHOLDER_SIZE, Color::WHITE);
        if !message.is_empty() {
            let x = center_offset(LIST_WIDTH, message.width());
            let y = center_offset(MIN_HEIGHT, message.height());
            block.composite_over(message, x, y);
        }
        return round_corners(&block, Some(CORNER_RADIUS));
    }

    let widths: Vec<u32> = chips.iter().map(Canvas::width).collect();
    let layout = pack_rows(&widths);
    log::debug!(
        "category {category:?}: {} chips packed into {}px",
        chips.len(),
        layout.height
    );

    let mut block = Canvas::new(LIST_WIDTH, layout.height, background);
    let mut chips: Vec<Option<Canvas>> = chips.into_iter().map(Some).collect();
    for placement in &layout.placements {
        if let Some(chip) = chips[placement.index].take() {
            block.composite_over(chip, placement.x as i32, placement.y as i32);
        }
    }
    composite_label(&mut block, label);
    round_corners(&block, Some(CORNER_RADIUS))
}

fn composite_label(block: &mut Canvas, label: Canvas) {
    if label.is_empty() {
        return;
    }
    let y = center_offset(block.height(), label.height());
    block.composite_over(label, CATEGORY_LABEL_X, y);
}

/// One character per line.
fn vertical_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for (index, ch) in text.chars().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tests::BlockGlyphs;

    fn positions(layout: &RowLayout) -> Vec<(usize, u32, u32)> {
        layout
            .placements
            .iter()
            .map(|p| (p.index, p.x, p.y))
            .collect()
    }

    #[test]
    fn single_row_uses_minimum_height() {
        let layout = pack_rows(&[60, 40]);
        assert_eq!(positions(&layout), vec![(1, 34, 5), (0, 79, 5)]);
        assert_eq!(layout.height, MIN_HEIGHT);
    }

    #[test]
    fn wrapped_rows_skip_the_gap_after_the_row_starter() {
        let layout = pack_rows(&[100, 100, 100, 100]);
        // 34 -> 139 -> 244 fits nothing more (244 + 100 > 340)
        assert_eq!(
            positions(&layout),
            vec![(0, 34, 5), (1, 139, 5), (2, 34, 34), (3, 134, 34)]
        );
        assert_eq!(layout.height, 34 + 34);
    }

    #[test]
    fn ties_keep_input_order() {
        let layout = pack_rows(&[50, 20, 50, 20]);
        let order: Vec<usize> = layout.placements.iter().map(|p| p.index).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn packed_chips_never_cross_the_right_edge() {
        let widths: Vec<u32> = (0..40).map(|i| 30 + (i * 37) % 270).collect();
        let layout = pack_rows(&widths);
        assert_eq!(layout.placements.len(), widths.len());
        for placement in &layout.placements {
            assert!(placement.x + widths[placement.index] <= LIST_WIDTH);
            assert_eq!((placement.y - ORIGIN_Y) % ROW_STEP, 0);
        }
        let last_row = layout.placements.iter().map(|p| p.y).max().unwrap();
        assert_eq!(layout.height, (last_row + 34).max(MIN_HEIGHT));
    }

    #[test]
    fn empty_input_packs_to_minimum() {
        let layout = pack_rows(&[]);
        assert!(layout.placements.is_empty());
        assert_eq!(layout.height, MIN_HEIGHT);
    }

    #[test]
    fn vertical_text_puts_one_char_per_line() {
        assert_eq!(vertical_text("abc"), "a\nb\nc");
        assert_eq!(vertical_text(""), "");
    }

    #[test]
    fn empty_category_renders_fixed_placeholder() {
        let tint = CONTAINER_PALETTE[3];
        let block = render_chip_list(&BlockGlyphs, "RS", Vec::new(), tint, "NO RS YET");
        assert_eq!(block.dimensions(), (LIST_WIDTH, MIN_HEIGHT));
        assert_eq!(block.pixel(0, 0).a, 0);
        assert_eq!(block.pixel(LIST_WIDTH - 1, MIN_HEIGHT - 1).a, 0);
        // placeholder text sits on the centre line, clear of the label band
        assert_eq!(block.pixel(LIST_WIDTH / 2, MIN_HEIGHT / 2), Color::WHITE);
        assert_eq!(block.pixel(LIST_WIDTH - 10, MIN_HEIGHT / 2), tint);
    }

    #[test]
    fn chips_land_at_packed_positions() {
        let tint = Color::rgb(77, 182, 172);
        let red = Canvas::new(100, 24, Color::rgb(255, 0, 0));
        let blue = Canvas::new(60, 24, Color::rgb(0, 0, 255));
        let block = render_chip_list(&BlockGlyphs, "Q", vec![red, blue], tint, "unused");

        assert_eq!(block.dimensions(), (LIST_WIDTH, MIN_HEIGHT));
        // narrower chip first
        assert_eq!(block.pixel(34, 5), Color::rgb(0, 0, 255));
        assert_eq!(block.pixel(99, 5), Color::rgb(255, 0, 0));
        assert_eq!(block.pixel(96, 20), tint);
        // vertical label in the reserved margin
        assert_eq!(block.pixel(10, 32), Color::WHITE);
    }
}
