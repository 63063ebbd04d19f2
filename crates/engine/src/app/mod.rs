mod assets;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use assets::{AssetError, AssetStore, SpriteSheet, DUNGEON_SHEET_KEY, FONT_SHEET_KEY};
pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    glyph_index, palette, text_size_px, Renderer, Rgb, ShadowStyle, TextError, GLYPH_HEIGHT_PX,
    GLYPH_WIDTH_PX,
};
pub use scene::{
    Entity, EntityId, InputSnapshot, RenderLayer, RenderableDesc, RenderableKind, Scene,
    SceneCommand, SceneKey, SceneMachineError, SceneWorld, TextDesc, Transform,
};
