use thiserror::Error;

use super::palette::{self, Rgb};

pub const GLYPH_WIDTH_PX: u32 = 8;
pub const GLYPH_HEIGHT_PX: u32 = 16;

/// Glyph order on the font sheet, one row, left to right.
const PRINTABLE: &str =
    " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

const DEFAULT_SHADOW_OFFSETS: [(i32, i32); 4] = [(1, 1), (0, 1), (1, 0), (2, 2)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("shadow offset ({x}, {y}) is negative; only right/down offsets are supported")]
    NegativeOffset { x: i32, y: i32 },
}

/// Column of `ch` on the font sheet. Characters outside the sheet have none
/// and render as blank space.
pub fn glyph_index(ch: char) -> Option<u32> {
    PRINTABLE.chars().position(|c| c == ch).map(|index| index as u32)
}

/// Drop-shadow copies drawn under the text, in unscaled glyph pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowStyle {
    offsets: Vec<(u32, u32)>,
    color: Rgb,
}

impl ShadowStyle {
    pub fn new(offsets: &[(i32, i32)], color: Rgb) -> Result<Self, TextError> {
        let offsets = offsets
            .iter()
            .map(|&(x, y)| match (u32::try_from(x), u32::try_from(y)) {
                (Ok(x), Ok(y)) => Ok((x, y)),
                _ => Err(TextError::NegativeOffset { x, y }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { offsets, color })
    }

    pub fn offsets(&self) -> &[(u32, u32)] {
        &self.offsets
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn max_offset(&self) -> (u32, u32) {
        self.offsets
            .iter()
            .fold((0, 0), |(mx, my), &(x, y)| (mx.max(x), my.max(y)))
    }
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self {
            offsets: DEFAULT_SHADOW_OFFSETS
                .iter()
                .map(|&(x, y)| (x.unsigned_abs(), y.unsigned_abs()))
                .collect(),
            color: palette::SHADOW,
        }
    }
}

/// Pixel size of `text` rendered at `scale`, including the shadow margin.
pub fn text_size_px(text: &str, scale: u32, shadow: Option<&ShadowStyle>) -> (u32, u32) {
    let (extra_x, extra_y) = shadow.map_or((0, 0), ShadowStyle::max_offset);
    let glyphs = text.chars().count() as u32;
    (
        (glyphs * GLYPH_WIDTH_PX + extra_x) * scale,
        (GLYPH_HEIGHT_PX + extra_y) * scale,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_index_follows_printable_order() {
        assert_eq!(glyph_index(' '), Some(0));
        assert_eq!(glyph_index('!'), Some(1));
        assert_eq!(glyph_index('0'), Some(16));
        assert_eq!(glyph_index('A'), Some(33));
        assert_eq!(glyph_index('a'), Some(65));
        assert_eq!(glyph_index('~'), Some(94));
        assert_eq!(glyph_index('é'), None);
    }

    #[test]
    fn negative_shadow_offsets_are_rejected() {
        assert_eq!(
            ShadowStyle::new(&[(1, 1), (-1, 0)], palette::SHADOW),
            Err(TextError::NegativeOffset { x: -1, y: 0 })
        );
        assert!(ShadowStyle::new(&[(0, 0), (3, 2)], palette::SHADOW).is_ok());
    }

    #[test]
    fn default_shadow_matches_classic_offsets() {
        let shadow = ShadowStyle::default();
        assert_eq!(shadow.offsets(), &[(1, 1), (0, 1), (1, 0), (2, 2)]);
        assert_eq!(shadow.max_offset(), (2, 2));
        assert_eq!(shadow.color(), Rgb::new(25, 25, 25));
    }

    #[test]
    fn text_size_includes_shadow_margin_and_scale() {
        let shadow = ShadowStyle::default();
        assert_eq!(text_size_px("Hello", 1, None), (40, 16));
        assert_eq!(text_size_px("Hello", 2, Some(&shadow)), (84, 36));
        assert_eq!(text_size_px("", 2, None), (0, 32));
    }
}
