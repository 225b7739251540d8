//! Rounded-corner alpha masks.
//!
//! Corners are cut from a circle drawn at five times the target size and
//! shrunk with a bilinear filter, which gives smoother edges than drawing
//! the small circle directly. Two shapes share the construction:
//!
//! * pill: no radius given; the circle is as tall as the image and is split
//!   into a left and right half for the two short ends.
//! * fixed radius: a `2r` circle is split into quadrants, one per corner.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use image::{
    GrayImage, Luma,
    imageops::{self, FilterType},
};
use once_cell::sync::Lazy;

use crate::canvas::{Canvas, Color};
use crate::geometry::round_half_even;

const OVERSAMPLE: u32 = 5;

static CIRCLE_CACHE: Lazy<Mutex<HashMap<u32, Arc<GrayImage>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Builds the alpha mask for a `width` x `height` image.
pub fn corner_mask(width: u32, height: u32, radius: Option<u32>) -> GrayImage {
    let mut mask = GrayImage::from_pixel(width, height, Luma([255]));
    match radius {
        None => {
            if height == 0 {
                return mask;
            }
            let circle = circle(height);
            let split = round_half_even(height as f64 / 2.0) as u32;
            let left = imageops::crop_imm(&*circle, 0, 0, split, height).to_image();
            let right =
                imageops::crop_imm(&*circle, split, 0, height - split, height).to_image();
            imageops::replace(&mut mask, &left, 0, 0);
            imageops::replace(&mut mask, &right, width as i64 - right.width() as i64, 0);
        }
        Some(0) => {}
        Some(radius) => {
            let circle = circle(radius * 2);
            let quadrant = |x: u32, y: u32| {
                imageops::crop_imm(&*circle, x, y, radius, radius).to_image()
            };
            let far_x = width as i64 - radius as i64;
            let far_y = height as i64 - radius as i64;
            imageops::replace(&mut mask, &quadrant(0, 0), 0, 0);
            imageops::replace(&mut mask, &quadrant(radius, 0), far_x, 0);
            imageops::replace(&mut mask, &quadrant(0, radius), 0, far_y);
            imageops::replace(&mut mask, &quadrant(radius, radius), far_x, far_y);
        }
    }
    mask
}

/// Rounds the corners of `image`; pixels outside the rounded rectangle
/// become fully transparent.
pub fn round_corners(image: &Canvas, radius: Option<u32>) -> Canvas {
    let mask = corner_mask(image.width(), image.height(), radius);
    apply_mask(image, &mask)
}

/// Mixes `image` with a transparent white backdrop, channel by channel,
/// weighted by `mask`: 255 keeps the source pixel, 0 keeps the backdrop.
pub fn apply_mask(image: &Canvas, mask: &GrayImage) -> Canvas {
    const BACKDROP: [u8; 4] = [255, 255, 255, 0];
    let (width, height) = image.dimensions();
    let mut out = Canvas::transparent(width, height);
    for y in 0..height {
        for x in 0..width {
            let weight = mask.get_pixel(x, y).0[0] as u32;
            let source = image.pixel(x, y);
            let channels = [source.r, source.g, source.b, source.a];
            let mut mixed = [0u8; 4];
            for (index, value) in channels.into_iter().enumerate() {
                let blended = value as u32 * weight + BACKDROP[index] as u32 * (255 - weight);
                mixed[index] = ((blended + 127) / 255) as u8;
            }
            out.put_pixel(x, y, Color::rgba(mixed[0], mixed[1], mixed[2], mixed[3]));
        }
    }
    out
}

fn circle(size: u32) -> Arc<GrayImage> {
    let mut cache = CIRCLE_CACHE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    cache
        .entry(size)
        .or_insert_with(|| Arc::new(draw_circle(size)))
        .clone()
}

fn draw_circle(size: u32) -> GrayImage {
    let large = size * OVERSAMPLE;
    let radius = large as f64 / 2.0;
    let oversampled = GrayImage::from_fn(large, large, |x, y| {
        let dx = x as f64 + 0.5 - radius;
        let dy = y as f64 + 0.5 - radius;
        if dx * dx + dy * dy <= radius * radius {
            Luma([255])
        } else {
            Luma([0])
        }
    });
    imageops::resize(&oversampled, size, size, FilterType::Triangle)
}
