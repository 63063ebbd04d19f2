use engine::app::palette;
use engine::sim::{
    resolve_collision, resolve_direction, Actor, CooldownGate, FrameTime, Obstacle,
    OpenCloseAnimator, SpriteRef, Vec2,
};
use engine::{EntityId, InputAction, InputSnapshot, RenderLayer, Scene, SceneCommand, SceneWorld};
use tracing::info;

use super::hud::Hud;
use super::screen_bounds;
use super::tuning::SceneTuning;

const WIZARD_SPRITE: SpriteRef = SpriteRef::dungeon(0, 7, 6);
const CHEST_SPRITE: SpriteRef = SpriteRef::dungeon(5, 7, 6);
const SWITCH_SPRITE: SpriteRef = SpriteRef::dungeon(1, 5, 6);

const WIZARD_TOP_LEFT: Vec2 = Vec2::new(160.0, 120.0);
const CHEST_CENTER: Vec2 = Vec2::new(320.0, 240.0);
const SWITCH_CENTER: Vec2 = Vec2::new(480.0, 240.0);

const HUD_LINES: [&str; 2] = ["Move around using Keyboard", "Use [z] to interact"];

#[derive(Debug, Clone, Copy)]
struct SceneIds {
    wizard: EntityId,
    chest: EntityId,
}

/// Walk the wizard around a chest that bounces it back, and open or close
/// the chest from the switch next to it.
pub(crate) struct AnimateMovementScene {
    movement_speed: f32,
    wizard: Actor,
    chest: Obstacle,
    switch: Obstacle,
    ids: Option<SceneIds>,
    hud: Hud,
}

impl AnimateMovementScene {
    pub(crate) fn new(tuning: &SceneTuning) -> Self {
        Self {
            movement_speed: tuning.movement_speed_px_per_ms,
            wizard: Actor::new(WIZARD_TOP_LEFT, WIZARD_SPRITE),
            chest: Obstacle::animated(
                CHEST_CENTER,
                CHEST_SPRITE,
                OpenCloseAnimator::new(tuning.chest_frame_count, tuning.chest_step_window_ms),
                CooldownGate::new(tuning.interact_lock_ms),
            ),
            switch: Obstacle::fixed(SWITCH_CENTER, SWITCH_SPRITE),
            ids: None,
            hud: Hud::default(),
        }
    }
}

impl Scene for AnimateMovementScene {
    fn load(&mut self, world: &mut SceneWorld) {
        world.spawn_drawable(&self.switch, RenderLayer::Props, "switch");
        let chest = world.spawn_drawable(&self.chest, RenderLayer::Props, "chest");
        let wizard = world.spawn_drawable(&self.wizard, RenderLayer::Actors, "wizard");
        self.ids = Some(SceneIds { wizard, chest });
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
        self.chest.advance(time.now_ms);

        let wizard_rect = self.wizard.rect();
        let mut proposed =
            resolve_direction(input.directions(), time.elapsed_ms, self.movement_speed);
        if wizard_rect.intersects(&self.chest.rect()) {
            proposed = resolve_collision(wizard_rect, self.chest.rect(), proposed);
        }

        if input.is_down(InputAction::Interact) && wizard_rect.intersects(&self.switch.rect()) {
            if let Some(cue) = self.chest.trigger(time.now_ms) {
                world.push_audio_cue(cue);
                info!(
                    state = ?self.chest.state(),
                    frame = self.chest.frame_index(),
                    "chest_transition_started"
                );
            }
        }

        self.wizard.move_clamped(proposed, screen_bounds(input));

        if let Some(ids) = self.ids {
            world.sync_drawable(ids.wizard, &self.wizard);
            world.sync_drawable(ids.chest, &self.chest);
        }
        SceneCommand::None
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.ids = None;
        self.hud.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::sim::{AnimationState, AudioCue};
    use engine::RenderableKind;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn loaded_scene() -> (AnimateMovementScene, SceneWorld) {
        let mut scene = AnimateMovementScene::new(&SceneTuning::default());
        let mut world = SceneWorld::default();
        scene.load(&mut world);
        world.apply_pending();
        (scene, world)
    }

    fn input() -> InputSnapshot {
        InputSnapshot::empty().with_frame_size((640, 480))
    }

    fn tick(
        scene: &mut AnimateMovementScene,
        world: &mut SceneWorld,
        now_ms: u64,
        input: &InputSnapshot,
    ) {
        scene.update(FrameTime::new(now_ms, 16.0), input, world);
        world.apply_pending();
    }

    fn chest_sprite(scene: &AnimateMovementScene, world: &SceneWorld) -> SpriteRef {
        let ids = scene.ids.expect("loaded");
        match &world.find_entity(ids.chest).expect("chest").renderable.kind {
            RenderableKind::Sprite(sprite) => *sprite,
            RenderableKind::Text(_) => panic!("chest should be a sprite"),
        }
    }

    #[test]
    fn load_spawns_props_actor_and_hud() {
        let (scene, world) = loaded_scene();
        assert_eq!(world.entity_count(), 5);
        assert!(world.cursor_visible());
        assert!(approx_eq(scene.wizard.position().x, 160.0));
        assert!(approx_eq(scene.wizard.position().y, 120.0));
    }

    #[test]
    fn right_arrow_moves_wizard_by_speed_times_elapsed() {
        let (mut scene, mut world) = loaded_scene();
        let input = input().with_action_down(InputAction::MoveRight, true);

        tick(&mut scene, &mut world, 16, &input);

        assert!(approx_eq(scene.wizard.position().x, 168.0));
        assert!(approx_eq(scene.wizard.position().y, 120.0));
        let ids = scene.ids.expect("loaded");
        let synced = world.find_entity(ids.wizard).expect("wizard").transform.position;
        assert!(approx_eq(synced.x, scene.wizard.center().x));
    }

    #[test]
    fn walking_down_into_chest_bounces_back_up() {
        let (mut scene, mut world) = loaded_scene();
        scene.wizard = Actor::new(Vec2::new(300.0, 100.0), WIZARD_SPRITE);
        let input = input().with_action_down(InputAction::MoveDown, true);

        tick(&mut scene, &mut world, 16, &input);

        assert!(approx_eq(scene.wizard.position().y, 92.0));
        assert!(approx_eq(scene.wizard.position().x, 300.0));
    }

    #[test]
    fn interact_on_switch_opens_chest_with_one_cue() {
        let (mut scene, mut world) = loaded_scene();
        scene.wizard = Actor::new(Vec2::new(400.0, 200.0), WIZARD_SPRITE);
        let input = input().with_action_down(InputAction::Interact, true);

        tick(&mut scene, &mut world, 16, &input);
        assert_eq!(scene.chest.state(), AnimationState::TransitioningOpen);
        assert_eq!(world.drain_audio_cues(), vec![AudioCue::DoorOpen]);

        tick(&mut scene, &mut world, 32, &input);
        assert_eq!(scene.chest.state(), AnimationState::Open);
        assert!(world.drain_audio_cues().is_empty());
        assert_eq!(chest_sprite(&scene, &world).tile.col, 7);
    }

    #[test]
    fn held_interact_within_lock_does_not_close_chest() {
        let (mut scene, mut world) = loaded_scene();
        scene.wizard = Actor::new(Vec2::new(400.0, 200.0), WIZARD_SPRITE);
        let input = input().with_action_down(InputAction::Interact, true);

        for now in [16, 32, 48, 399] {
            tick(&mut scene, &mut world, now, &input);
        }
        assert_eq!(scene.chest.state(), AnimationState::Open);
        assert_eq!(world.drain_audio_cues(), vec![AudioCue::DoorOpen]);

        tick(&mut scene, &mut world, 416, &input);
        assert_eq!(scene.chest.state(), AnimationState::TransitioningClose);
        assert_eq!(world.drain_audio_cues(), vec![AudioCue::DoorClose]);
    }

    #[test]
    fn interact_away_from_switch_is_ignored() {
        let (mut scene, mut world) = loaded_scene();
        let input = input().with_action_down(InputAction::Interact, true);

        tick(&mut scene, &mut world, 16, &input);
        assert_eq!(scene.chest.state(), AnimationState::Closed);
        assert!(world.drain_audio_cues().is_empty());
    }

    #[test]
    fn wizard_stays_inside_frame() {
        let (mut scene, mut world) = loaded_scene();
        let input = input()
            .with_action_down(InputAction::MoveLeft, true)
            .with_action_down(InputAction::MoveUp, true);

        for step in 1..=60 {
            tick(&mut scene, &mut world, step * 16, &input);
        }
        assert!(approx_eq(scene.wizard.position().x, 0.0));
        assert!(approx_eq(scene.wizard.position().y, 0.0));
    }
}
