use engine::app::palette;
use engine::sim::{
    resolve_direction, Actor, AttachmentMode, FrameTime, RadialAttachment, SpriteRef,
    SwingConfig, Vec2,
};
use engine::{EntityId, InputSnapshot, RenderLayer, Scene, SceneCommand, SceneWorld};
use tracing::debug;

use super::hud::Hud;
use super::screen_bounds;
use super::tuning::SceneTuning;

const WARRIOR_SPRITE: SpriteRef = SpriteRef::dungeon(3, 7, 6);
const AXE_SPRITE: SpriteRef = SpriteRef::dungeon(10, 9, 6).flipped_y();
const WARRIOR_CENTER: Vec2 = Vec2::new(320.0, 240.0);
const AXE_RADIUS_PX: f32 = 96.0;

const HUD_LINES: [&str; 2] = ["Press [w,a,s,d] to move", "Mouse click to swing"];

/// A warrior whose battle axe tracks the pointer and swings on click.
pub(crate) struct WarriorSwingScene {
    movement_speed: f32,
    warrior: Actor,
    axe: RadialAttachment,
    ids: Option<(EntityId, EntityId)>,
    hud: Hud,
}

impl WarriorSwingScene {
    pub(crate) fn new(tuning: &SceneTuning) -> Self {
        let swing = SwingConfig {
            swing_ms: tuning.swing_ms,
            cooldown_ms: tuning.swing_cooldown_ms,
            extent_degrees: tuning.swing_extent_degrees,
        };
        Self {
            movement_speed: tuning.movement_speed_px_per_ms,
            warrior: Actor::centered_at(WARRIOR_CENTER, WARRIOR_SPRITE),
            axe: RadialAttachment::with_swing(AXE_RADIUS_PX, AXE_SPRITE, swing),
            ids: None,
            hud: Hud::default(),
        }
    }
}

impl Scene for WarriorSwingScene {
    fn load(&mut self, world: &mut SceneWorld) {
        self.axe.update(
            0,
            self.warrior.center(),
            AttachmentMode::PointerFollow { target: None },
        );
        let axe = world.spawn_drawable(&self.axe, RenderLayer::Props, "battle_axe");
        let warrior = world.spawn_drawable(&self.warrior, RenderLayer::Actors, "warrior");
        self.ids = Some((warrior, axe));
        let lines = HUD_LINES.map(|text| (text, palette::TEXT));
        self.hud = Hud::spawn(world, &lines);
        world.set_cursor_visible(true);
    }

    fn update(
        &mut self,
        time: FrameTime,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        let cursor = input.cursor_position_px();
        if let Some(target) = cursor.filter(|_| input.pointer_pressed()) {
            if self.axe.trigger_swing(time.now_ms, self.warrior.center(), target) {
                debug!(now_ms = time.now_ms, "swing_started");
            }
        }

        let delta = resolve_direction(input.directions(), time.elapsed_ms, self.movement_speed);
        self.warrior.move_clamped(delta, screen_bounds(input));
        self.axe.update(
            time.now_ms,
            self.warrior.center(),
            AttachmentMode::PointerFollow { target: cursor },
        );

        if let Some((warrior, axe)) = self.ids {
            world.sync_drawable(warrior, &self.warrior);
            world.sync_drawable(axe, &self.axe);
        }
        SceneCommand::None
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.ids = None;
        self.hud.clear();
    }
}
