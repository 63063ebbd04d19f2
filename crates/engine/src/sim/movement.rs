use super::drawable::{Drawable, Placement, SpriteRef};
use super::geometry::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Currently held directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionSet {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl DirectionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, direction: Direction) -> Self {
        self.set(direction, true);
        self
    }

    pub fn set(&mut self, direction: Direction, pressed: bool) {
        match direction {
            Direction::Up => self.up = pressed,
            Direction::Down => self.down = pressed,
            Direction::Left => self.left = pressed,
            Direction::Right => self.right = pressed,
        }
    }

    pub fn contains(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

/// Per-tick displacement for the held directions.
///
/// Each axis is resolved on its own: opposite keys cancel to zero, a single
/// key moves `speed * elapsed_ms`. Diagonals are not normalized.
pub fn resolve_direction(pressed: DirectionSet, elapsed_ms: f32, speed: f32) -> Vec2 {
    Vec2 {
        x: axis_displacement(pressed.left, pressed.right, elapsed_ms, speed),
        y: axis_displacement(pressed.up, pressed.down, elapsed_ms, speed),
    }
}

fn axis_displacement(negative: bool, positive: bool, elapsed_ms: f32, speed: f32) -> f32 {
    match (negative, positive) {
        (true, false) => -(speed * elapsed_ms),
        (false, true) => speed * elapsed_ms,
        _ => 0.0,
    }
}

/// A moving entity that stays inside its bounds after every move.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    rect: Rect,
    sprite: SpriteRef,
}

impl Actor {
    /// The footprint used for clamping is the sprite's scaled tile size.
    pub fn new(top_left: Vec2, sprite: SpriteRef) -> Self {
        let footprint = sprite.scaled_size();
        Self {
            rect: Rect::new(top_left.x, top_left.y, footprint.x, footprint.y),
            sprite,
        }
    }

    pub fn centered_at(center: Vec2, sprite: SpriteRef) -> Self {
        Self {
            rect: Rect::from_center(center, sprite.scaled_size()),
            sprite,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn position(&self) -> Vec2 {
        self.rect.position()
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    pub fn footprint(&self) -> Vec2 {
        self.rect.size()
    }

    /// Snaps the center to `center` without clamping.
    pub fn set_center(&mut self, center: Vec2) {
        self.rect.set_center(center);
    }

    /// Applies `delta`, then clamps so the footprint stays within `bounds`.
    /// Bounds smaller than the footprint pin the actor to the bounds origin.
    pub fn move_clamped(&mut self, delta: Vec2, bounds: Rect) {
        let max_x = (bounds.right() - self.rect.width).max(bounds.x);
        let max_y = (bounds.bottom() - self.rect.height).max(bounds.y);
        self.rect.x = (self.rect.x + delta.x).max(bounds.x).min(max_x);
        self.rect.y = (self.rect.y + delta.y).max(bounds.y).min(max_y);
    }
}

impl Drawable for Actor {
    fn placement(&self) -> Placement {
        Placement::upright(self.center())
    }

    fn sprite(&self) -> SpriteRef {
        self.sprite
    }
}
