mod canvas;
pub mod palette;
mod renderer;
mod text;

pub use palette::Rgb;
pub use renderer::Renderer;
pub use text::{
    glyph_index, text_size_px, ShadowStyle, TextError, GLYPH_HEIGHT_PX, GLYPH_WIDTH_PX,
};
