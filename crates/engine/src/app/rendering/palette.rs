#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// Per-channel multiply, as used for tinting white glyphs.
    pub fn multiply(self, other: Rgb) -> Rgb {
        let channel = |a: u8, b: u8| ((a as u16 * b as u16) / 255) as u8;
        Rgb::new(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }
}

// Catppuccin mocha.
pub const BASE: Rgb = Rgb::new(30, 30, 46);
pub const TEXT: Rgb = Rgb::new(205, 214, 244);
pub const BLUE: Rgb = Rgb::new(137, 180, 250);
pub const RED: Rgb = Rgb::new(243, 139, 168);

pub const SHADOW: Rgb = Rgb::new(25, 25, 25);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiply_by_white_is_identity() {
        let white = Rgb::new(255, 255, 255);
        assert_eq!(white.multiply(TEXT), TEXT);
        assert_eq!(RED.multiply(white), RED);
    }

    #[test]
    fn multiply_by_black_is_black() {
        assert_eq!(BLUE.multiply(Rgb::default()), Rgb::default());
    }
}
