use engine::app::{text_size_px, ShadowStyle};
use engine::sim::{Rect, Vec2};
use engine::{EntityId, RenderLayer, RenderableDesc, RenderableKind, Rgb, SceneWorld, TextDesc, Transform};

pub(crate) const HUD_TEXT_SCALE: u32 = 2;
const HUD_MARGIN_PX: f32 = 32.0;
const HUD_LINE_STEP_PX: f32 = 32.0;

/// Top-left corner of HUD line `index`.
pub(crate) fn line_origin(index: usize) -> Vec2 {
    Vec2::new(HUD_MARGIN_PX, HUD_MARGIN_PX + HUD_LINE_STEP_PX * index as f32)
}

/// Screen rectangle covered by `text` on line `index`, shadow included.
pub(crate) fn line_rect(index: usize, text: &str) -> Rect {
    let origin = line_origin(index);
    let (width, height) = text_size_px(text, HUD_TEXT_SCALE, Some(&ShadowStyle::default()));
    Rect::new(origin.x, origin.y, width.max(1) as f32, height as f32)
}

/// Shadowed instruction lines stacked down the top-left corner.
#[derive(Debug, Default)]
pub(crate) struct Hud {
    lines: Vec<EntityId>,
}

impl Hud {
    pub(crate) fn spawn(world: &mut SceneWorld, lines: &[(&str, Rgb)]) -> Self {
        let lines = lines
            .iter()
            .enumerate()
            .map(|(index, (text, color))| {
                world.spawn(
                    Transform::at(line_origin(index)),
                    RenderableDesc {
                        kind: RenderableKind::Text(TextDesc {
                            text: (*text).to_string(),
                            color: *color,
                            scale: HUD_TEXT_SCALE,
                            shadow: true,
                        }),
                        layer: RenderLayer::Hud,
                        debug_name: "hud_line",
                    },
                )
            })
            .collect();
        Self { lines }
    }

    pub(crate) fn set_line(&self, world: &mut SceneWorld, index: usize, text: &str, color: Rgb) {
        if let Some(&id) = self.lines.get(index) {
            world.set_text(id, text, color);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
pub(crate) fn text_lines(world: &SceneWorld) -> Vec<(String, Rgb)> {
    world
        .entities()
        .iter()
        .filter_map(|entity| match &entity.renderable.kind {
            RenderableKind::Text(desc) => Some((desc.text.clone(), desc.color)),
            RenderableKind::Sprite(_) => None,
        })
        .collect()
}
