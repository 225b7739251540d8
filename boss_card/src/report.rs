//! Multi-card report: cards stacked top to bottom with alternating tints.

use rand::Rng;

use crate::canvas::{Canvas, Color};
use crate::card::{BossStatus, CARD_WIDTH, CardRenderer, RenderedCard};
use crate::error::RenderError;

pub const PALE_GREEN: Color = Color::rgb(200, 230, 201);

/// Background for the card at `index`: white first, then pale green.
pub fn row_tint(index: usize) -> Color {
    if index % 2 == 0 { Color::WHITE } else { PALE_GREEN }
}

/// Renders every status and stacks the cards. Any card failure fails the
/// whole report.
pub fn render_report<R: Rng + ?Sized>(
    renderer: &CardRenderer<'_>,
    statuses: &[BossStatus],
    rng: &mut R,
) -> Result<Canvas, RenderError> {
    let mut cards = Vec::with_capacity(statuses.len());
    for (index, status) in statuses.iter().enumerate() {
        cards.push(renderer.render_card(status, row_tint(index), rng)?);
    }
    Ok(stack_cards(cards))
}

/// Concatenates cards vertically with no gap.
pub fn stack_cards(cards: Vec<RenderedCard>) -> Canvas {
    let total: u32 = cards.iter().map(RenderedCard::height).sum();
    let mut report = Canvas::transparent(CARD_WIDTH, total);
    let mut cursor = 0u32;
    for card in cards {
        report.paste(card.canvas(), 0, cursor as i32);
        cursor += card.height();
    }
    log::debug!("report height {total}");
    report
}
