//! Straight-alpha RGBA8 surface used by every compositor in the crate.
//!
//! Pixels live in an `image::RgbaImage`; this module adds the handful of
//! operations the card layout needs (source-over compositing, exact copies,
//! strict crops and content bounding boxes) on top of it.

use image::{DynamicImage, Rgba, RgbaImage, imageops::FilterType};
use serde::Deserialize;

use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "ColorChannels")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Perceived brightness in `0.0..=1.0` using Rec. 601 weights.
    pub fn luminance(self) -> f64 {
        (self.r as f64 * 0.299 + self.g as f64 * 0.587 + self.b as f64 * 0.114) / 255.0
    }
}

impl From<Color> for Rgba<u8> {
    fn from(color: Color) -> Self {
        Rgba([color.r, color.g, color.b, color.a])
    }
}

impl From<Rgba<u8>> for Color {
    fn from(pixel: Rgba<u8>) -> Self {
        let [r, g, b, a] = pixel.0;
        Color { r, g, b, a }
    }
}

/// Presets spell colours as `[r, g, b]` or `[r, g, b, a]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorChannels {
    Rgb([u8; 3]),
    Rgba([u8; 4]),
}

impl From<ColorChannels> for Color {
    fn from(channels: ColorChannels) -> Self {
        match channels {
            ColorChannels::Rgb([r, g, b]) => Color::rgb(r, g, b),
            ColorChannels::Rgba([r, g, b, a]) => Color::rgba(r, g, b, a),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Smallest box holding every pixel with non-zero alpha. `right` and
/// `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    pub fn to_rect(self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.right - self.left,
            self.bottom - self.top,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, fill.into()),
        }
    }

    pub fn transparent(width: u32, height: u32) -> Self {
        Self::new(width, height, Color::TRANSPARENT)
    }

    /// Zero-sized canvas standing in for an element with no visible content.
    pub fn empty() -> Self {
        Self::transparent(0, 0)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        (*self.pixels.get_pixel(x, y)).into()
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.pixels.put_pixel(x, y, color.into());
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Fills `rect` with `color`, clipped to the canvas.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let right = rect.x.saturating_add(rect.width).min(self.width());
        let bottom = rect.y.saturating_add(rect.height).min(self.height());
        let pixel: Rgba<u8> = color.into();
        for y in rect.y..bottom {
            for x in rect.x..right {
                self.pixels.put_pixel(x, y, pixel);
            }
        }
    }

    /// Blends `source` over this canvas with its top-left corner at
    /// `(x, y)`. Parts of `source` that fall outside the canvas are dropped.
    pub fn composite_over(&mut self, source: Canvas, x: i32, y: i32) {
        self.for_each_overlap(&source, x, y, |dst, src| {
            *dst = blend_over(*src, *dst);
        });
    }

    /// Copies `source` verbatim (alpha included) with its top-left corner at
    /// `(x, y)`, clipped to the canvas.
    pub fn paste(&mut self, source: &Canvas, x: i32, y: i32) {
        image::imageops::replace(&mut self.pixels, &source.pixels, x as i64, y as i64);
    }

    pub fn crop(&self, rect: Rect) -> Result<Canvas, RenderError> {
        let fits_x = rect.x.checked_add(rect.width).is_some_and(|r| r <= self.width());
        let fits_y = rect.y.checked_add(rect.height).is_some_and(|b| b <= self.height());
        if !fits_x || !fits_y {
            return Err(RenderError::OutOfBounds {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                canvas_width: self.width(),
                canvas_height: self.height(),
            });
        }
        let view = image::imageops::crop_imm(&self.pixels, rect.x, rect.y, rect.width, rect.height);
        Ok(Canvas {
            pixels: view.to_image(),
        })
    }

    /// Bilinear resample; only used to normalise thumbnails and icons.
    pub fn resize(&self, width: u32, height: u32) -> Canvas {
        if self.dimensions() == (width, height) {
            return self.clone();
        }
        Canvas {
            pixels: image::imageops::resize(&self.pixels, width, height, FilterType::Triangle),
        }
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut bounds: Option<BoundingBox> = None;
        for (x, y, pixel) in self.pixels.enumerate_pixels() {
            if pixel.0[3] == 0 {
                continue;
            }
            let current = bounds.get_or_insert(BoundingBox {
                left: x,
                top: y,
                right: x + 1,
                bottom: y + 1,
            });
            current.left = current.left.min(x);
            current.top = current.top.min(y);
            current.right = current.right.max(x + 1);
            current.bottom = current.bottom.max(y + 1);
        }
        bounds
    }

    /// Crops the canvas to its bounding box.
    pub fn trimmed(self) -> Result<Canvas, RenderError> {
        let bounds = self.bounding_box().ok_or(RenderError::EmptyContent)?;
        if bounds.to_rect() == Rect::new(0, 0, self.width(), self.height()) {
            return Ok(self);
        }
        self.crop(bounds.to_rect())
    }

    fn for_each_overlap(
        &mut self,
        source: &Canvas,
        x: i32,
        y: i32,
        mut apply: impl FnMut(&mut Rgba<u8>, &Rgba<u8>),
    ) {
        if source.is_empty() || self.is_empty() {
            return;
        }
        let x = x as i64;
        let y = y as i64;
        let start_x = x.max(0);
        let start_y = y.max(0);
        let end_x = (x + source.width() as i64).min(self.width() as i64);
        let end_y = (y + source.height() as i64).min(self.height() as i64);
        for dy in start_y..end_y {
            for dx in start_x..end_x {
                let src = source.pixels.get_pixel((dx - x) as u32, (dy - y) as u32);
                let dst = self.pixels.get_pixel_mut(dx as u32, dy as u32);
                apply(dst, src);
            }
        }
    }
}

impl From<RgbaImage> for Canvas {
    fn from(pixels: RgbaImage) -> Self {
        Self { pixels }
    }
}

impl From<DynamicImage> for Canvas {
    fn from(image: DynamicImage) -> Self {
        Self {
            pixels: image.to_rgba8(),
        }
    }
}

/// Straight-alpha "over": `src` on top of `dst`.
fn blend_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let src_alpha = src.0[3] as u32;
    if src_alpha == 0 {
        return dst;
    }
    if src_alpha == 255 {
        return src;
    }
    // Both weights carry an extra factor of 255.
    let dst_weight = dst.0[3] as u32 * (255 - src_alpha);
    let src_weight = src_alpha * 255;
    let total = src_weight + dst_weight;
    let mut out = [0u8; 4];
    for channel in 0..3 {
        let mixed = src.0[channel] as u32 * src_weight + dst.0[channel] as u32 * dst_weight;
        out[channel] = ((mixed + total / 2) / total) as u8;
    }
    out[3] = ((total + 127) / 255) as u8;
    Rgba(out)
}
