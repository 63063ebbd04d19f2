use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::assets::AssetStore;
use crate::app::{Entity, RenderableKind, SceneWorld};
use crate::sim::{Placement, Vec2};

use super::canvas::Canvas;
use super::palette;
use super::text::ShadowStyle;

/// Fixed-size software frame scaled onto the window surface by `pixels`.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    frame_width: u32,
    frame_height: u32,
    assets: AssetStore,
    shadow: ShadowStyle,
    draw_order: Vec<usize>,
}

impl Renderer {
    pub fn new(
        window: Arc<Window>,
        frame_size: (u32, u32),
        assets: AssetStore,
    ) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), frame_size, size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            frame_width: frame_size.0,
            frame_height: frame_size.1,
            assets,
            shadow: ShadowStyle::default(),
            draw_order: Vec::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(
            Arc::clone(&self.window),
            (self.frame_width, self.frame_height),
            width,
            height,
        )?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        frame_size: (u32, u32),
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width, surface_height, window);
        Pixels::new(frame_size.0, frame_size.1, surface)
    }

    /// Maps a physical window position onto the frame. `None` outside it.
    pub fn window_to_frame_px(&self, x: f64, y: f64) -> Option<Vec2> {
        self.pixels
            .window_pos_to_pixel((x as f32, y as f32))
            .ok()
            .map(|(px, py)| Vec2::new(px as f32, py as f32))
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        collect_draw_order(world.entities(), &mut self.draw_order);

        let (width, height) = (self.frame_width, self.frame_height);
        let mut canvas = Canvas::new(self.pixels.frame_mut(), width, height);
        canvas.clear(palette::BASE);

        let entities = world.entities();
        for &index in &self.draw_order {
            let entity = &entities[index];
            match &entity.renderable.kind {
                RenderableKind::Sprite(sprite) => canvas.draw_sprite(
                    self.assets.sheet(sprite.sheet),
                    *sprite,
                    Placement {
                        center: entity.transform.position,
                        rotation_degrees: entity.transform.rotation_degrees,
                    },
                ),
                RenderableKind::Text(text) => canvas.draw_text(
                    self.assets.font(),
                    &text.text,
                    (
                        entity.transform.position.x.round() as i32,
                        entity.transform.position.y.round() as i32,
                    ),
                    text.color,
                    text.scale,
                    text.shadow.then_some(&self.shadow),
                ),
            }
        }

        self.pixels.render()
    }
}

/// Visible entities ordered by layer, then by the order they were applied.
fn collect_draw_order(entities: &[Entity], out: &mut Vec<usize>) {
    out.clear();
    out.extend(
        entities
            .iter()
            .enumerate()
            .filter(|(_, entity)| entity.visible)
            .map(|(index, _)| index),
    );
    out.sort_by_key(|&index| {
        let entity = &entities[index];
        (entity.renderable.layer, entity.applied_spawn_order())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{RenderLayer, RenderableDesc, Transform};
    use crate::sim::SpriteRef;

    fn spawn(world: &mut SceneWorld, layer: RenderLayer, debug_name: &'static str) {
        world.spawn(
            Transform::default(),
            RenderableDesc {
                kind: RenderableKind::Sprite(SpriteRef::dungeon(0, 0, 1)),
                layer,
                debug_name,
            },
        );
    }

    fn names_in_draw_order(world: &SceneWorld) -> Vec<&'static str> {
        let mut order = Vec::new();
        collect_draw_order(world.entities(), &mut order);
        order
            .into_iter()
            .map(|index| world.entities()[index].renderable.debug_name)
            .collect()
    }

    #[test]
    fn renderer_type_is_non_generic() {
        let _ = std::mem::size_of::<Renderer>();
    }

    #[test]
    fn draw_order_sorts_by_layer_then_spawn() {
        let mut world = SceneWorld::default();
        spawn(&mut world, RenderLayer::Hud, "hud");
        spawn(&mut world, RenderLayer::Actors, "wizard");
        spawn(&mut world, RenderLayer::Props, "chest");
        spawn(&mut world, RenderLayer::Actors, "warrior");
        world.apply_pending();

        assert_eq!(
            names_in_draw_order(&world),
            vec!["chest", "wizard", "warrior", "hud"]
        );
    }

    #[test]
    fn hidden_entities_are_skipped() {
        let mut world = SceneWorld::default();
        spawn(&mut world, RenderLayer::Actors, "shown");
        spawn(&mut world, RenderLayer::Actors, "hidden");
        world.apply_pending();
        let hidden = world.entities()[1].id;
        assert!(world.set_visible(hidden, false));

        assert_eq!(names_in_draw_order(&world), vec!["shown"]);
    }
}
