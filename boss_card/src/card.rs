//! One boss-status card: icon, name, phase/round tag, health bar and a
//! stack of chip lists.
//!
//! Layout runs in two passes. Every sub-element is rendered first so the
//! card height is known, then the card canvas is allocated once at
//! `CARD_WIDTH` x height and the pieces are composited onto it.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::assets::AssetStore;
use crate::canvas::{Canvas, Color};
use crate::chip::{random_chip_color, render_chip};
use crate::chip_list::{CONTAINER_PALETTE, render_chip_list};
use crate::config::{
    DEFAULT_EMPTY_TEMPLATE, DEFAULT_TAG_TEMPLATE, fill_empty_template, fill_tag_template,
};
use crate::error::RenderError;
use crate::geometry::center_in;
use crate::glyphs::GlyphSource;
use crate::mask::round_corners;
use crate::progress::{fill_cursor, render_progress_bar};
use crate::text::render_text;

pub const CARD_WIDTH: u32 = 498;
pub const ICON_SIZE: u32 = 128;
const ICON_POSITION: (i32, i32) = (10, 10);
const ICON_RADIUS: u32 = 10;
const NAME_POSITION: (i32, i32) = (148, 10);
const NAME_SIZE: f32 = 24.0;
/// Space between the end of the name and the tag.
const TAG_SPACING: i32 = 10;
const BAR_POSITION: (i32, i32) = (148, 44);
const LISTS_X: i32 = 148;
/// First chip list starts here; also the card height with no categories.
pub const HEADER_HEIGHT: u32 = 78;
const LIST_SPACING: u32 = 10;

pub const TAG_HEIGHT: u32 = 24;
const TAG_PADDING: u32 = 24;
const TAG_TEXT_SIZE: f32 = 20.0;
pub const TAG_COLOR: Color = Color::rgb(3, 169, 244);

/// Participants of one kind, keyed by owner id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipCategory {
    pub name: String,
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossStatus {
    pub cycle: i64,
    pub round: i64,
    pub current_hp: i64,
    pub max_hp: i64,
    pub name: String,
    pub icon_id: String,
    #[serde(default)]
    pub chip_categories: Vec<ChipCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCard {
    canvas: Canvas,
}

impl RenderedCard {
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Content height; always the canvas height.
    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn into_canvas(self) -> Canvas {
        self.canvas
    }
}

/// Renders the "{cycle} phase, {round} round" badge.
pub fn render_tag(glyphs: &dyn GlyphSource, text: &str) -> Canvas {
    let label = render_text(glyphs, text, TAG_TEXT_SIZE, Color::WHITE);
    let mut badge = Canvas::new(label.width() + TAG_PADDING, TAG_HEIGHT, TAG_COLOR);
    let (x, y) = center_in(badge.width(), TAG_HEIGHT, &label);
    badge.composite_over(label, x, y);
    round_corners(&badge, None)
}

pub struct CardRenderer<'a> {
    glyphs: &'a dyn GlyphSource,
    icons: &'a dyn AssetStore,
    avatars: &'a dyn AssetStore,
    tag_template: &'a str,
    empty_template: &'a str,
}

impl<'a> CardRenderer<'a> {
    pub fn new(
        glyphs: &'a dyn GlyphSource,
        icons: &'a dyn AssetStore,
        avatars: &'a dyn AssetStore,
    ) -> Self {
        Self {
            glyphs,
            icons,
            avatars,
            tag_template: DEFAULT_TAG_TEMPLATE,
            empty_template: DEFAULT_EMPTY_TEMPLATE,
        }
    }

    pub fn with_templates(mut self, tag_template: &'a str, empty_template: &'a str) -> Self {
        self.tag_template = tag_template;
        self.empty_template = empty_template;
        self
    }

    /// Renders `status` on a solid `background`.
    ///
    /// Fails without drawing anything if the health ratio is invalid or any
    /// icon or avatar is missing. Tints are drawn from `rng` in category
    /// order: the container colour, then one colour per participant.
    pub fn render_card<R: Rng + ?Sized>(
        &self,
        status: &BossStatus,
        background: Color,
        rng: &mut R,
    ) -> Result<RenderedCard, RenderError> {
        fill_cursor(status.current_hp, status.max_hp)?;

        let icon = self.icons.open(&status.icon_id)?;
        let icon = round_corners(&icon.resize(ICON_SIZE, ICON_SIZE), Some(ICON_RADIUS));
        let name = render_text(self.glyphs, &status.name, NAME_SIZE, Color::BLACK);
        let tag = render_tag(
            self.glyphs,
            &fill_tag_template(self.tag_template, status.cycle, status.round),
        );
        let bar = render_progress_bar(self.glyphs, status.current_hp, status.max_hp)?;

        let mut lists = Vec::with_capacity(status.chip_categories.len());
        for category in &status.chip_categories {
            lists.push(self.render_category(category, rng)?);
        }

        let height = lists
            .iter()
            .fold(HEADER_HEIGHT, |cursor, list| cursor + list.height() + LIST_SPACING);
        log::debug!(
            "card {:?}: {} chip lists, height {height}",
            status.name,
            lists.len()
        );

        let mut canvas = Canvas::new(CARD_WIDTH, height, background);
        let tag_x = NAME_POSITION.0 + name.width() as i32 + TAG_SPACING;
        canvas.composite_over(name, NAME_POSITION.0, NAME_POSITION.1);
        canvas.composite_over(tag, tag_x, NAME_POSITION.1);
        canvas.composite_over(bar, BAR_POSITION.0, BAR_POSITION.1);
        canvas.composite_over(icon, ICON_POSITION.0, ICON_POSITION.1);

        let mut cursor = HEADER_HEIGHT;
        for list in lists {
            let list_height = list.height();
            canvas.composite_over(list, LISTS_X, cursor as i32);
            cursor += list_height + LIST_SPACING;
        }

        Ok(RenderedCard::new(canvas))
    }

    fn render_category<R: Rng + ?Sized>(
        &self,
        category: &ChipCategory,
        rng: &mut R,
    ) -> Result<Canvas, RenderError> {
        let container = CONTAINER_PALETTE[rng.random_range(0..CONTAINER_PALETTE.len())];
        let mut chips = Vec::with_capacity(category.entries.len());
        for (owner_id, label) in &category.entries {
            let avatar = self.avatars.open(owner_id)?;
            let tint = random_chip_color(rng);
            chips.push(render_chip(self.glyphs, &avatar, label, tint));
        }
        let placeholder = fill_empty_template(self.empty_template, &category.name);
        Ok(render_chip_list(
            self.glyphs,
            &category.name,
            chips,
            container,
            &placeholder,
        ))
    }
}
