use super::input::{ActionStates, InputAction};
use super::rendering::Rgb;
use crate::sim::{AudioCue, Direction, DirectionSet, Drawable, FrameTime, SpriteRef, Vec2};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    TitleMenu,
    AnimateMovement,
    CollectPotions,
    WizardClock,
    WarriorSwing,
}

impl SceneKey {
    pub const fn name(self) -> &'static str {
        match self {
            SceneKey::TitleMenu => "TitleMenu",
            SceneKey::AnimateMovement => "AnimateMovement",
            SceneKey::CollectPotions => "CollectPotions",
            SceneKey::WizardClock => "WizardClock",
            SceneKey::WarriorSwing => "WarriorSwing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    back_pressed: bool,
    actions: ActionStates,
    cursor_position_px: Option<Vec2>,
    pointer_pressed: bool,
    frame_width: u32,
    frame_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        back_pressed: bool,
        actions: ActionStates,
        cursor_position_px: Option<Vec2>,
        pointer_pressed: bool,
        frame_size: (u32, u32),
    ) -> Self {
        Self {
            quit_requested,
            back_pressed,
            actions,
            cursor_position_px,
            pointer_pressed,
            frame_width: frame_size.0,
            frame_height: frame_size.1,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn back_pressed(&self) -> bool {
        self.back_pressed
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// Held movement actions as a direction set.
    pub fn directions(&self) -> DirectionSet {
        [
            (InputAction::MoveUp, Direction::Up),
            (InputAction::MoveDown, Direction::Down),
            (InputAction::MoveLeft, Direction::Left),
            (InputAction::MoveRight, Direction::Right),
        ]
        .into_iter()
        .filter(|(action, _)| self.is_down(*action))
        .map(|(_, direction)| direction)
        .collect()
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_pointer_pressed(mut self, pointer_pressed: bool) -> Self {
        self.pointer_pressed = pointer_pressed;
        self
    }

    pub fn with_back_pressed(mut self, back_pressed: bool) -> Self {
        self.back_pressed = back_pressed;
        self
    }

    pub fn with_frame_size(mut self, frame_size: (u32, u32)) -> Self {
        self.frame_width = frame_size.0;
        self.frame_height = frame_size.1;
        self
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn pointer_pressed(&self) -> bool {
        self.pointer_pressed
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

/// Center position plus counter-clockwise rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub rotation_degrees: f32,
}

impl Transform {
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            rotation_degrees: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDesc {
    pub text: String,
    pub color: Rgb,
    pub scale: u32,
    pub shadow: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderableKind {
    Sprite(SpriteRef),
    /// Anchored at its top-left corner rather than its center.
    Text(TextDesc),
}

/// Draw order bucket. Within a layer entities draw in spawn order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenderLayer {
    Props,
    #[default]
    Actors,
    Attachments,
    Hud,
}

#[derive(Debug, Clone)]
pub struct RenderableDesc {
    pub kind: RenderableKind,
    pub layer: RenderLayer,
    pub debug_name: &'static str,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub transform: Transform,
    pub renderable: RenderableDesc,
    pub visible: bool,
    applied_spawn_order: u64,
}

impl Entity {
    pub fn applied_spawn_order(&self) -> u64 {
        self.applied_spawn_order
    }
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug)]
pub struct SceneWorld {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
    pending_spawns: Vec<Entity>,
    pending_despawns: Vec<EntityId>,
    next_applied_spawn_order: u64,
    cursor_visible: bool,
    audio_cues: Vec<AudioCue>,
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self {
            allocator: EntityIdAllocator::default(),
            entities: Vec::new(),
            pending_spawns: Vec::new(),
            pending_despawns: Vec::new(),
            next_applied_spawn_order: 0,
            cursor_visible: true,
            audio_cues: Vec::new(),
        }
    }
}

impl SceneWorld {
    pub fn spawn(&mut self, transform: Transform, renderable: RenderableDesc) -> EntityId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(Entity {
            id,
            transform,
            renderable,
            visible: true,
            applied_spawn_order: 0,
        });
        id
    }

    pub fn spawn_drawable(
        &mut self,
        drawable: &impl Drawable,
        layer: RenderLayer,
        debug_name: &'static str,
    ) -> EntityId {
        let placement = drawable.placement();
        self.spawn(
            Transform {
                position: placement.center,
                rotation_degrees: placement.rotation_degrees,
            },
            RenderableDesc {
                kind: RenderableKind::Sprite(drawable.sprite()),
                layer,
                debug_name,
            },
        )
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        let exists_now = self.entities.iter().any(|entity| entity.id == id);
        let pending_spawn = self.pending_spawns.iter().any(|entity| entity.id == id);
        if !exists_now && !pending_spawn {
            return false;
        }
        self.pending_despawns.push(id);
        true
    }

    pub fn apply_pending(&mut self) {
        if !self.pending_despawns.is_empty() {
            self.pending_despawns.sort_by_key(|id| id.0);
            self.pending_despawns.dedup();
            let pending = &self.pending_despawns;
            let doomed = |entity: &Entity| pending.binary_search_by_key(&entity.id.0, |id| id.0).is_ok();
            self.entities.retain(|entity| !doomed(entity));
            self.pending_spawns.retain(|entity| !doomed(entity));
            self.pending_despawns.clear();
        }

        if !self.pending_spawns.is_empty() {
            for mut entity in self.pending_spawns.drain(..) {
                entity.applied_spawn_order = self.next_applied_spawn_order;
                self.next_applied_spawn_order = self.next_applied_spawn_order.saturating_add(1);
                self.entities.push(entity);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending_spawns.clear();
        self.pending_despawns.clear();
        self.next_applied_spawn_order = 0;
        self.cursor_visible = true;
        self.audio_cues.clear();
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    /// Looks through applied entities first, then pending spawns.
    pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .chain(self.pending_spawns.iter_mut())
            .find(|entity| entity.id == id)
    }

    /// Copies placement and current sprite from `drawable` onto entity `id`.
    pub fn sync_drawable(&mut self, id: EntityId, drawable: &impl Drawable) -> bool {
        let Some(entity) = self.find_entity_mut(id) else {
            return false;
        };
        let placement = drawable.placement();
        entity.transform = Transform {
            position: placement.center,
            rotation_degrees: placement.rotation_degrees,
        };
        if let RenderableKind::Sprite(sprite) = &mut entity.renderable.kind {
            *sprite = drawable.sprite();
        }
        true
    }

    /// Replaces the text of a text entity. Leaves sprites untouched.
    pub fn set_text(&mut self, id: EntityId, text: &str, color: Rgb) -> bool {
        let Some(entity) = self.find_entity_mut(id) else {
            return false;
        };
        match &mut entity.renderable.kind {
            RenderableKind::Text(desc) => {
                if desc.text != text {
                    desc.text.clear();
                    desc.text.push_str(text);
                }
                desc.color = color;
                true
            }
            RenderableKind::Sprite(_) => false,
        }
    }

    pub fn set_visible(&mut self, id: EntityId, visible: bool) -> bool {
        match self.find_entity_mut(id) {
            Some(entity) => {
                entity.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    pub fn push_audio_cue(&mut self, cue: AudioCue) {
        self.audio_cues.push(cue);
    }

    pub fn drain_audio_cues(&mut self) -> Vec<AudioCue> {
        std::mem::take(&mut self.audio_cues)
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        time: FrameTime,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn unload(&mut self, world: &mut SceneWorld);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SceneMachineError {
    #[error("no scene registered for {0:?}")]
    MissingScene(SceneKey),
    #[error("scene {0:?} registered twice")]
    DuplicateScene(SceneKey),
}

struct SceneRuntime {
    key: SceneKey,
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

/// Owns every scene and its world for the process lifetime. Switching away
/// keeps the scene loaded so coming back resumes where it left off.
pub(crate) struct SceneMachine {
    runtimes: Vec<SceneRuntime>,
    active: usize,
}

impl SceneMachine {
    pub(crate) fn new(
        scenes: Vec<(SceneKey, Box<dyn Scene>)>,
        active_scene: SceneKey,
    ) -> Result<Self, SceneMachineError> {
        let mut runtimes: Vec<SceneRuntime> = Vec::with_capacity(scenes.len());
        for (key, scene) in scenes {
            if runtimes.iter().any(|runtime| runtime.key == key) {
                return Err(SceneMachineError::DuplicateScene(key));
            }
            runtimes.push(SceneRuntime {
                key,
                scene,
                world: SceneWorld::default(),
                is_loaded: false,
            });
        }
        let active = index_of(&runtimes, active_scene)?;
        Ok(Self { runtimes, active })
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.runtimes[self.active].key
    }

    pub(crate) fn load_active(&mut self) {
        self.load_index_if_needed(self.active);
    }

    pub(crate) fn update_active(&mut self, time: FrameTime, input: &InputSnapshot) -> SceneCommand {
        let runtime = &mut self.runtimes[self.active];
        let (scene, world) = (&mut runtime.scene, &mut runtime.world);
        scene.update(time, input, world)
    }

    /// Runs one tick on the active scene. A back press replaces the update
    /// with a switch to the title menu.
    pub(crate) fn step_active(&mut self, time: FrameTime, input: &InputSnapshot) -> SceneCommand {
        let command = if input.back_pressed() {
            SceneCommand::SwitchTo(SceneKey::TitleMenu)
        } else {
            self.update_active(time, input)
        };
        self.apply_pending_active();
        command
    }

    pub(crate) fn apply_pending_active(&mut self) {
        self.runtimes[self.active].world.apply_pending();
    }

    pub(crate) fn active_world(&self) -> &SceneWorld {
        &self.runtimes[self.active].world
    }

    pub(crate) fn active_world_mut(&mut self) -> &mut SceneWorld {
        &mut self.runtimes[self.active].world
    }

    pub(crate) fn switch_to(&mut self, next_scene: SceneKey) -> Result<bool, SceneMachineError> {
        if self.active_scene() == next_scene {
            return Ok(false);
        }

        let next = index_of(&self.runtimes, next_scene)?;
        self.load_index_if_needed(next);
        self.active = next;
        Ok(true)
    }

    pub(crate) fn shutdown_all(&mut self) {
        for runtime in &mut self.runtimes {
            if runtime.is_loaded {
                let (scene, world) = (&mut runtime.scene, &mut runtime.world);
                scene.unload(world);
                runtime.world.clear();
                runtime.is_loaded = false;
            }
        }
    }

    fn load_index_if_needed(&mut self, index: usize) {
        let runtime = &mut self.runtimes[index];
        if runtime.is_loaded {
            return;
        }
        {
            let (scene, world) = (&mut runtime.scene, &mut runtime.world);
            scene.load(world);
        }
        runtime.world.apply_pending();
        runtime.is_loaded = true;
    }
}

fn index_of(runtimes: &[SceneRuntime], key: SceneKey) -> Result<usize, SceneMachineError> {
    runtimes
        .iter()
        .position(|runtime| runtime.key == key)
        .ok_or(SceneMachineError::MissingScene(key))
}
