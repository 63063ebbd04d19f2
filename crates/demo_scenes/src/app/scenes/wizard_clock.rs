use engine::app::palette;
use engine::sim::{
    resolve_direction, Actor, AttachmentMode, FrameTime, RadialAttachment, SpriteRef, Vec2,
};
use engine::{EntityId, InputSnapshot, RenderLayer, Scene, SceneCommand, SceneWorld};

use super::hud::Hud;
use super::screen_bounds;
use super::tuning::SceneTuning;

const WIZARD_SPRITE: SpriteRef = SpriteRef::dungeon(0, 7, 6);
const HAND_SPRITE: SpriteRef = SpriteRef::dungeon(5, 10, 6).flipped_y();
const WIZARD_CENTER: Vec2 = Vec2::new(320.0, 240.0);
const HAND_RADIUS_PX: f32 = 96.0;
const ANGLE_LINE: usize = 2;

fn angle_line(angle: f32) -> String {
    format!("Hand angle is currently {}", angle as i32)
}

pub(crate) struct WizardClockScene {
    movement_speed: f32,
    rate_degrees_per_second: f32,
    wizard: Actor,
    hand: RadialAttachment,
    ids: Option<(EntityId, EntityId)>,
    hud: Hud,
}

impl WizardClockScene {
    pub(crate) fn new(tuning: &SceneTuning) -> Self {
        Self {
            movement_speed: tuning.movement_speed_px_per_ms,
            rate_degrees_per_second: tuning.clock_rate_degrees_per_second,
            wizard: Actor::centered_at(WIZARD_CENTER, WIZARD_SPRITE),
            hand: RadialAttachment::new(HAND_RADIUS_PX, HAND_SPRITE),
            ids: None,
            hud: Hud::default(),
        }
    }

    fn rotating(&self, elapsed_ms: f32) -> AttachmentMode {
        AttachmentMode::Rotating {
            rate_degrees_per_second: self.rate_degrees_per_second,
            elapsed_ms,
        }
    }
}

impl Scene for WizardClockScene {
    fn load(&mut self, world: &mut SceneWorld) {
        let mode = self.rotating(0.0);
        self.hand.update(0, self.wizard.center(), mode);
        let wizard = world.spawn_drawable(&self.wizard, RenderLayer::Actors, "wizard");
        let hand = world.spawn_drawable(&self.hand, RenderLayer::Attachments, "clock_hand");
        self.ids = Some((wizard, hand));

        let angle = angle_line(self.hand.angle());
        self.hud = Hud::spawn(
            world,
            &[
                ("Watch the clock move", palette::TEXT),
                ("Arrow keys move the wizard around", palette::TEXT),
                (angle.as_str(), palette::TEXT),
            ],
        );
        world.set_cursor_visible(true);
    }

    fn update(
        &mut self,
        time: FrameTime,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        let delta = resolve_direction(input.directions(), time.elapsed_ms, self.movement_speed);
        self.wizard.move_clamped(delta, screen_bounds(input));
        let mode = self.rotating(time.elapsed_ms);
        self.hand.update(time.now_ms, self.wizard.center(), mode);

        if let Some((wizard, hand)) = self.ids {
            world.sync_drawable(wizard, &self.wizard);
            world.sync_drawable(hand, &self.hand);
        }
        let angle = angle_line(self.hand.angle());
        self.hud.set_line(world, ANGLE_LINE, &angle, palette::TEXT);
        SceneCommand::None
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.ids = None;
        self.hud.clear();
    }
}
