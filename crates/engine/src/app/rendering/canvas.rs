use crate::app::assets::SpriteSheet;
use crate::sim::{Placement, SpriteRef, TileCoord};

use super::palette::Rgb;
use super::text::{glyph_index, ShadowStyle, GLYPH_WIDTH_PX};

/// Software blitter over an RGBA frame buffer.
pub(crate) struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub(crate) fn clear(&mut self, color: Rgb) {
        let rgba = color.to_rgba();
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
    }

    /// Draws `sprite` centered on `placement.center`, scaled, optionally
    /// flipped vertically, then rotated counter-clockwise. Sampling is
    /// nearest-neighbour through the inverse rotation.
    pub(crate) fn draw_sprite(&mut self, sheet: &SpriteSheet, sprite: SpriteRef, placement: Placement) {
        let scale = sprite.scale.max(1);
        let (tile_width, tile_height) = sheet.tile_size();
        let half_w = (tile_width * scale) as f32 * 0.5;
        let half_h = (tile_height * scale) as f32 * 0.5;
        let (sin, cos) = placement.rotation_degrees.to_radians().sin_cos();
        if !sin.is_finite() || !cos.is_finite() {
            return;
        }

        let extent_x = half_w * cos.abs() + half_h * sin.abs();
        let extent_y = half_w * sin.abs() + half_h * cos.abs();
        let center = placement.center;
        let left = ((center.x - extent_x).floor() as i32).max(0);
        let top = ((center.y - extent_y).floor() as i32).max(0);
        let right = ((center.x + extent_x).ceil() as i32).min(self.width as i32);
        let bottom = ((center.y + extent_y).ceil() as i32).min(self.height as i32);

        for out_y in top..bottom {
            for out_x in left..right {
                let dx = out_x as f32 + 0.5 - center.x;
                let dy = out_y as f32 + 0.5 - center.y;
                let u = dx * cos - dy * sin + half_w;
                let v = dx * sin + dy * cos + half_h;
                if u < 0.0 || v < 0.0 {
                    continue;
                }
                let tx = (u / scale as f32).floor() as u32;
                let ty = (v / scale as f32).floor() as u32;
                if tx >= tile_width || ty >= tile_height {
                    continue;
                }
                let ty = if sprite.flip_y { tile_height - 1 - ty } else { ty };
                if let Some(pixel) = sheet.tile_pixel(sprite.tile, tx, ty) {
                    self.put_pixel(out_x, out_y, pixel);
                }
            }
        }
    }

    /// Draws `text` with its top-left at `origin`. Glyphs are white on the
    /// sheet and get tinted by `color`; shadows are drawn first.
    pub(crate) fn draw_text(
        &mut self,
        font: &SpriteSheet,
        text: &str,
        origin: (i32, i32),
        color: Rgb,
        scale: u32,
        shadow: Option<&ShadowStyle>,
    ) {
        let scale = scale.max(1);
        if let Some(shadow) = shadow {
            for &(ox, oy) in shadow.offsets() {
                let shifted = (
                    origin.0 + (ox * scale) as i32,
                    origin.1 + (oy * scale) as i32,
                );
                self.draw_glyph_run(font, text, shifted, shadow.color(), scale);
            }
        }
        self.draw_glyph_run(font, text, origin, color, scale);
    }

    fn draw_glyph_run(&mut self, font: &SpriteSheet, text: &str, origin: (i32, i32), color: Rgb, scale: u32) {
        let (_, glyph_height) = font.tile_size();
        for (index, ch) in text.chars().enumerate() {
            let Some(column) = glyph_index(ch) else {
                continue;
            };
            let glyph_left = origin.0 + (index as u32 * GLYPH_WIDTH_PX * scale) as i32;
            for gy in 0..glyph_height {
                for gx in 0..GLYPH_WIDTH_PX {
                    let Some(pixel) = font.tile_pixel(TileCoord::new(column, 0), gx, gy) else {
                        continue;
                    };
                    let tinted = Rgb::new(pixel[0], pixel[1], pixel[2]).multiply(color);
                    self.fill_block(
                        glyph_left + (gx * scale) as i32,
                        origin.1 + (gy * scale) as i32,
                        scale,
                        tinted.to_rgba(),
                    );
                }
            }
        }
    }

    fn fill_block(&mut self, x: i32, y: i32, size: u32, rgba: [u8; 4]) {
        for by in 0..size as i32 {
            for bx in 0..size as i32 {
                self.put_pixel(x + bx, y + by, rgba);
            }
        }
    }

    fn put_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        if let Some(dst) = self.frame.get_mut(offset..offset + 4) {
            dst.copy_from_slice(&rgba);
        }
    }
}
