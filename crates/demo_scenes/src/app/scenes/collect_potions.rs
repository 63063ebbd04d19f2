use engine::app::palette;
use engine::sim::{resolve_direction, Actor, CooldownGate, FrameTime, SpriteRef, Vec2};
use engine::{
    EntityId, InputAction, InputSnapshot, RenderLayer, Rgb, Scene, SceneCommand, SceneWorld,
};
use tracing::{debug, info};

use super::hud::Hud;
use super::tuning::SceneTuning;
use super::{frame_size, screen_bounds, DEFAULT_FRAME_SIZE};

const WIZARD_SPRITE: SpriteRef = SpriteRef::dungeon(0, 7, 2);
const POTION_SPRITE: SpriteRef = SpriteRef::dungeon(7, 9, 2);
const WIZARD_TOP_LEFT: Vec2 = Vec2::new(160.0, 120.0);
const POTION_GRID_PX: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Keyboard,
    Mouse,
}

#[derive(Debug)]
struct Potion {
    actor: Actor,
    id: EntityId,
}

/// Top-left corners for `count` potions, each on its own grid column and row.
fn potion_positions(rng: &mut fastrand::Rng, frame_size: (u32, u32), count: usize) -> Vec<Vec2> {
    let mut columns: Vec<u32> = (0..(frame_size.0 / POTION_GRID_PX).saturating_sub(1)).collect();
    let mut rows: Vec<u32> = (0..(frame_size.1 / POTION_GRID_PX).saturating_sub(1)).collect();
    rng.shuffle(&mut columns);
    rng.shuffle(&mut rows);
    columns
        .into_iter()
        .zip(rows)
        .take(count)
        .map(|(column, row)| {
            Vec2::new(
                (column * POTION_GRID_PX) as f32,
                (row * POTION_GRID_PX) as f32,
            )
        })
        .collect()
}

/// Drops `actor` by `dy`; once its bottom passes `frame_height` it restarts at the top.
fn fall_and_wrap(actor: &mut Actor, dy: f32, frame_height: f32) {
    let center = actor.center();
    actor.set_center(Vec2::new(center.x, center.y + dy));
    if actor.rect().bottom() > frame_height {
        actor.set_center(Vec2::new(center.x, actor.footprint().y * 0.5));
    }
}

/// Collect potions with the keyboard or the mouse while gravity optionally
/// pulls them down the screen.
pub(crate) struct CollectPotionsScene {
    movement_speed: f32,
    gravity_speed: f32,
    potion_count: usize,
    rng: fastrand::Rng,
    input_mode: InputMode,
    gravity_enabled: bool,
    gravity_gate: CooldownGate,
    score: u32,
    frame_size: (u32, u32),
    wizard: Actor,
    wizard_id: Option<EntityId>,
    potions: Vec<Potion>,
    hud: Hud,
}

impl CollectPotionsScene {
    pub(crate) fn new(tuning: &SceneTuning, seed: u64) -> Self {
        Self {
            movement_speed: tuning.movement_speed_px_per_ms,
            gravity_speed: tuning.gravity_speed_px_per_ms,
            potion_count: tuning.potion_count,
            rng: fastrand::Rng::with_seed(seed),
            input_mode: InputMode::Mouse,
            gravity_enabled: false,
            gravity_gate: CooldownGate::new(tuning.gravity_lock_ms),
            score: 0,
            frame_size: DEFAULT_FRAME_SIZE,
            wizard: Actor::new(WIZARD_TOP_LEFT, WIZARD_SPRITE),
            wizard_id: None,
            potions: Vec::new(),
            hud: Hud::default(),
        }
    }

    fn place_potions(&mut self, world: &mut SceneWorld) {
        for position in potion_positions(&mut self.rng, self.frame_size, self.potion_count) {
            let actor = Actor::new(position, POTION_SPRITE);
            let id = world.spawn_drawable(&actor, RenderLayer::Props, "potion");
            self.potions.push(Potion { actor, id });
        }
    }

    fn set_input_mode(&mut self, mode: InputMode) {
        if self.input_mode != mode {
            self.input_mode = mode;
            info!(mode = ?mode, "input_mode_changed");
        }
    }

    fn hud_lines(&self) -> [(String, Rgb); 4] {
        let mode_color = |mode: InputMode| {
            if self.input_mode == mode {
                palette::BLUE
            } else {
                palette::TEXT
            }
        };
        let gravity = if self.gravity_enabled { "ON" } else { "OFF" };
        [
            (format!(" Score: {}", self.score), palette::TEXT),
            (" Keyboard mode [K]".to_string(), mode_color(InputMode::Keyboard)),
            (" Mouse mode [M]".to_string(), mode_color(InputMode::Mouse)),
            (format!(" Toggle Gravity [G]: {gravity}"), palette::TEXT),
        ]
    }

    fn collect_overlapping(&mut self, world: &mut SceneWorld) {
        let wizard_rect = self.wizard.rect();
        let before = self.potions.len();
        self.potions.retain(|potion| {
            if potion.actor.rect().intersects(&wizard_rect) {
                world.despawn(potion.id);
                false
            } else {
                true
            }
        });

        let collected = (before - self.potions.len()) as u32;
        if collected > 0 {
            self.score = self.score.saturating_add(collected);
            debug!(collected, score = self.score, "potion_collected");
        }
    }
}

impl Scene for CollectPotionsScene {
    fn load(&mut self, world: &mut SceneWorld) {
        self.potions.clear();
        self.place_potions(world);
        self.wizard_id = Some(world.spawn_drawable(&self.wizard, RenderLayer::Actors, "wizard"));
        let lines = self.hud_lines();
        let lines: Vec<(&str, Rgb)> = lines
            .iter()
            .map(|(text, color)| (text.as_str(), *color))
            .collect();
        self.hud = Hud::spawn(world, &lines);
        world.set_cursor_visible(self.input_mode != InputMode::Mouse);
    }

    fn update(
        &mut self,
        time: FrameTime,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        self.frame_size = frame_size(input);
        let bounds = screen_bounds(input);

        if input.is_down(InputAction::KeyboardMode) {
            self.set_input_mode(InputMode::Keyboard);
        }
        if input.is_down(InputAction::MouseMode) {
            self.set_input_mode(InputMode::Mouse);
        }
        if input.is_down(InputAction::ToggleGravity) && self.gravity_gate.try_fire(time.now_ms) {
            self.gravity_enabled = !self.gravity_enabled;
            info!(enabled = self.gravity_enabled, "gravity_toggled");
        }
        world.set_cursor_visible(self.input_mode != InputMode::Mouse);

        match self.input_mode {
            InputMode::Mouse => {
                if let Some(cursor) = input.cursor_position_px() {
                    self.wizard.set_center(cursor);
                }
            }
            InputMode::Keyboard => {
                let delta =
                    resolve_direction(input.directions(), time.elapsed_ms, self.movement_speed);
                self.wizard.move_clamped(delta, bounds);
            }
        }

        if self.gravity_enabled {
            let dy = self.gravity_speed * time.elapsed_ms;
            for potion in &mut self.potions {
                fall_and_wrap(&mut potion.actor, dy, bounds.height);
            }
        }

        self.collect_overlapping(world);
        if self.potions.is_empty() {
            self.place_potions(world);
            info!(count = self.potions.len(), "potions_reset");
        }

        if let Some(id) = self.wizard_id {
            world.sync_drawable(id, &self.wizard);
        }
        for potion in &self.potions {
            world.sync_drawable(potion.id, &potion.actor);
        }
        for (index, (text, color)) in self.hud_lines().iter().enumerate() {
            self.hud.set_line(world, index, text, *color);
        }
        SceneCommand::None
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.wizard_id = None;
        self.potions.clear();
        self.hud.clear();
    }
}
