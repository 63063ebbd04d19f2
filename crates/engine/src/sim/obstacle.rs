use super::clock::Timestamp;
use super::cooldown::CooldownGate;
use super::drawable::{Drawable, Placement, SpriteRef};
use super::geometry::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Closed,
    TransitioningOpen,
    Open,
    TransitioningClose,
}

/// Sound a scene asks the runtime to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    DoorOpen,
    DoorClose,
}

/// Open/close frame-strip animation driven by triggers.
///
/// A trigger from `Closed` or `Open` starts a transition and steps one frame
/// right away. Each later `advance` inside the step window steps one more
/// frame and re-arms the window. Hitting the last frame settles on `Open`,
/// hitting frame 0 settles on `Closed`. A lapsed window finishes the
/// transition on the next `advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenCloseAnimator {
    state: AnimationState,
    frame: usize,
    frame_count: usize,
    step_window_ms: u64,
    step_deadline: Option<Timestamp>,
}

impl OpenCloseAnimator {
    pub fn new(frame_count: usize, step_window_ms: u64) -> Self {
        Self {
            state: AnimationState::Closed,
            frame: 0,
            frame_count: frame_count.max(1),
            step_window_ms,
            step_deadline: None,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn frame_index(&self) -> usize {
        self.frame
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(
            self.state,
            AnimationState::TransitioningOpen | AnimationState::TransitioningClose
        )
    }

    /// Starts a transition if settled. Returns the cue for the transition
    /// that began; `None` while a transition is already running.
    pub fn start(&mut self, now: Timestamp) -> Option<AudioCue> {
        let (next, cue) = match self.state {
            AnimationState::Closed => (AnimationState::TransitioningOpen, AudioCue::DoorOpen),
            AnimationState::Open => (AnimationState::TransitioningClose, AudioCue::DoorClose),
            AnimationState::TransitioningOpen | AnimationState::TransitioningClose => {
                return None
            }
        };
        self.state = next;
        self.step(now);
        Some(cue)
    }

    pub fn advance(&mut self, now: Timestamp) {
        if !self.is_transitioning() {
            return;
        }
        match self.step_deadline {
            Some(deadline) if now < deadline => self.step(now),
            _ => self.finish(),
        }
    }

    fn last_frame(&self) -> usize {
        self.frame_count - 1
    }

    fn step(&mut self, now: Timestamp) {
        self.frame = match self.state {
            AnimationState::TransitioningOpen => (self.frame + 1).min(self.last_frame()),
            AnimationState::TransitioningClose => self.frame.saturating_sub(1),
            AnimationState::Closed | AnimationState::Open => self.frame,
        };
        self.step_deadline = Some(now.saturating_add(self.step_window_ms));
        self.settle_if_terminal();
    }

    fn finish(&mut self) {
        self.frame = match self.state {
            AnimationState::TransitioningOpen => self.last_frame(),
            _ => 0,
        };
        self.settle_if_terminal();
    }

    fn settle_if_terminal(&mut self) {
        let settled = match self.state {
            AnimationState::TransitioningOpen if self.frame == self.last_frame() => {
                AnimationState::Open
            }
            AnimationState::TransitioningClose if self.frame == 0 => AnimationState::Closed,
            _ => return,
        };
        self.state = settled;
        self.step_deadline = None;
    }
}

/// Something an actor can bump into. Animated obstacles (the chest) carry a
/// frame strip and a trigger gate; fixed ones (the switch) never change.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    rect: Rect,
    sprite: SpriteRef,
    animation: Option<AnimatedParts>,
}

#[derive(Debug, Clone, PartialEq)]
struct AnimatedParts {
    animator: OpenCloseAnimator,
    trigger_gate: CooldownGate,
}

impl Obstacle {
    pub fn fixed(center: Vec2, sprite: SpriteRef) -> Self {
        Self {
            rect: Rect::from_center(center, sprite.scaled_size()),
            sprite,
            animation: None,
        }
    }

    /// `sprite` is frame 0; frame `n` is `n` tiles to its right.
    pub fn animated(
        center: Vec2,
        sprite: SpriteRef,
        animator: OpenCloseAnimator,
        trigger_gate: CooldownGate,
    ) -> Self {
        Self {
            rect: Rect::from_center(center, sprite.scaled_size()),
            sprite,
            animation: Some(AnimatedParts {
                animator,
                trigger_gate,
            }),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn state(&self) -> AnimationState {
        self.animation
            .as_ref()
            .map_or(AnimationState::Closed, |parts| parts.animator.state())
    }

    pub fn frame_index(&self) -> usize {
        self.animation
            .as_ref()
            .map_or(0, |parts| parts.animator.frame_index())
    }

    pub fn advance(&mut self, now: Timestamp) {
        if let Some(parts) = self.animation.as_mut() {
            parts.animator.advance(now);
        }
    }

    /// Fixed obstacles ignore triggers. Animated ones consult their gate
    /// first; a gated-out trigger never reaches the animator.
    pub fn trigger(&mut self, now: Timestamp) -> Option<AudioCue> {
        let parts = self.animation.as_mut()?;
        if !parts.trigger_gate.try_fire(now) {
            return None;
        }
        parts.animator.start(now)
    }
}

impl Drawable for Obstacle {
    fn placement(&self) -> Placement {
        Placement::upright(self.rect.center())
    }

    fn sprite(&self) -> SpriteRef {
        self.sprite.offset_col(self.frame_index() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHEST: SpriteRef = SpriteRef::dungeon(5, 7, 6);

    fn chest() -> Obstacle {
        Obstacle::animated(
            Vec2::new(320.0, 240.0),
            CHEST,
            OpenCloseAnimator::new(3, 2_000),
            CooldownGate::new(400),
        )
    }

    #[test]
    fn trigger_opens_over_qualifying_ticks_with_one_cue() {
        let mut chest = chest();
        assert_eq!(chest.state(), AnimationState::Closed);

        let mut cues = Vec::new();
        cues.extend(chest.trigger(1_000));
        assert_eq!(chest.state(), AnimationState::TransitioningOpen);
        assert_eq!(chest.frame_index(), 1);

        let mut now = 1_000;
        while chest.state() != AnimationState::Open {
            now += 16;
            chest.advance(now);
            // Held key: the gate swallows repeats while the chest animates.
            cues.extend(chest.trigger(now));
            assert!(now < 1_100, "chest never opened");
        }

        assert_eq!(now, 1_016);
        assert_eq!(chest.frame_index(), 2);
        assert_eq!(cues, vec![AudioCue::DoorOpen]);
    }

    #[test]
    fn open_chest_closes_with_close_cue() {
        let mut chest = chest();
        chest.trigger(0);
        chest.advance(16);
        assert_eq!(chest.state(), AnimationState::Open);

        assert_eq!(chest.trigger(200), None, "gate still locked");
        assert_eq!(chest.trigger(400), Some(AudioCue::DoorClose));
        assert_eq!(chest.state(), AnimationState::TransitioningClose);
        chest.advance(416);
        assert_eq!(chest.state(), AnimationState::Closed);
        assert_eq!(chest.frame_index(), 0);
    }

    #[test]
    fn sprite_follows_frame_index() {
        let mut chest = chest();
        assert_eq!(chest.sprite().tile.col, 5);
        chest.trigger(0);
        assert_eq!(chest.sprite().tile.col, 6);
        chest.advance(1);
        assert_eq!(chest.sprite().tile.col, 7);
    }

    #[test]
    fn lapsed_step_window_finishes_transition() {
        let mut animator = OpenCloseAnimator::new(5, 100);
        assert_eq!(animator.start(0), Some(AudioCue::DoorOpen));
        animator.advance(50);
        assert_eq!(animator.frame_index(), 2);

        animator.advance(500);
        assert_eq!(animator.state(), AnimationState::Open);
        assert_eq!(animator.frame_index(), 4);
    }

    #[test]
    fn start_is_ignored_mid_transition() {
        let mut animator = OpenCloseAnimator::new(4, 2_000);
        animator.start(0);
        assert_eq!(animator.start(10), None);
        assert_eq!(animator.state(), AnimationState::TransitioningOpen);
    }

    #[test]
    fn settled_animator_ignores_advance() {
        let mut animator = OpenCloseAnimator::new(3, 2_000);
        animator.advance(100);
        assert_eq!(animator.state(), AnimationState::Closed);
        assert_eq!(animator.frame_index(), 0);
    }

    #[test]
    fn fixed_obstacle_never_triggers() {
        let mut switch = Obstacle::fixed(Vec2::new(480.0, 240.0), SpriteRef::dungeon(1, 5, 6));
        assert_eq!(switch.trigger(0), None);
        switch.advance(10);
        assert_eq!(switch.state(), AnimationState::Closed);
        assert_eq!(switch.rect(), Rect::new(432.0, 192.0, 96.0, 96.0));
    }
}
