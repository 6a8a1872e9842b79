//! Rasterization of grid geometry onto tile images.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut,
};
use imageproc::rect::Rect;
use rusttype::{Font, Scale};
use tracing::warn;

use crate::grid::GridOverlaySpec;

/// Embedded font for zone labels - DejaVu Sans Mono.
const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

const GRID_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const PLATE_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

const LABEL_FONT_SIZE: f32 = 14.0;
/// Labels anchored closer than this to a tile edge are dropped rather
/// than clipped.
const LABEL_MARGIN: f32 = 10.0;
const PLATE_PAD_X: i32 = 2;
const PLATE_PAD_Y: i32 = 1;

/// Burn grid lines and labels into a tile image in place.
pub fn render_overlay(img: &mut RgbaImage, spec: &GridOverlaySpec) {
    let (width, height) = img.dimensions();

    for &x in &spec.verticals {
        if (0.0..=width as f32).contains(&x) {
            draw_line_segment_mut(img, (x, 0.0), (x, height as f32), GRID_COLOR);
        }
    }
    for &y in &spec.horizontals {
        if (0.0..=height as f32).contains(&y) {
            draw_line_segment_mut(img, (0.0, y), (width as f32, y), GRID_COLOR);
        }
    }

    if spec.labels.is_empty() {
        return;
    }

    let font = match Font::try_from_bytes(FONT_DATA) {
        Some(f) => f,
        None => {
            warn!("Failed to load embedded label font, drawing lines only");
            return;
        }
    };
    let scale = Scale::uniform(LABEL_FONT_SIZE);

    for label in &spec.labels {
        if label.x < LABEL_MARGIN
            || label.x > width as f32 - LABEL_MARGIN
            || label.y < LABEL_MARGIN
            || label.y > height as f32 - LABEL_MARGIN
        {
            continue;
        }

        // Monospace face, so the advance is uniform per glyph
        let text_width = (label.text.len() as f32 * LABEL_FONT_SIZE * 0.6).ceil() as i32;
        let text_height = LABEL_FONT_SIZE.ceil() as i32;

        // Shift the anchor so the plate stays inside the tile
        let max_x = width as i32 - text_width - PLATE_PAD_X;
        let max_y = height as i32 - text_height - PLATE_PAD_Y;
        let x = (label.x as i32).clamp(PLATE_PAD_X, max_x.max(PLATE_PAD_X));
        let y = (label.y as i32).clamp(PLATE_PAD_Y, max_y.max(PLATE_PAD_Y));

        let plate = Rect::at(x - PLATE_PAD_X, y - PLATE_PAD_Y).of_size(
            (text_width + 2 * PLATE_PAD_X) as u32,
            (text_height + 2 * PLATE_PAD_Y) as u32,
        );
        draw_filled_rect_mut(img, plate, PLATE_FILL);
        draw_hollow_rect_mut(img, plate, GRID_COLOR);

        draw_text_mut(img, GRID_COLOR, x, y, scale, &font, &label.text);
    }
}
