use super::clock::Timestamp;
use super::cooldown::CooldownGate;
use super::drawable::{Drawable, Placement, SpriteRef};
use super::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingConfig {
    pub swing_ms: u64,
    pub cooldown_ms: u64,
    pub extent_degrees: f32,
}

impl Default for SwingConfig {
    fn default() -> Self {
        Self {
            swing_ms: 50,
            cooldown_ms: 200,
            extent_degrees: 60.0,
        }
    }
}

/// How the attachment picks its angle this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttachmentMode {
    /// Constant rotation, clockwise from straight down in screen space.
    Rotating {
        rate_degrees_per_second: f32,
        elapsed_ms: f32,
    },
    /// Faces the pointer at half radius. `None` keeps the last offset.
    PointerFollow { target: Option<Vec2> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveSwing {
    swing_end: Timestamp,
    target_angle: f32,
    sign: f32,
}

/// A sprite orbiting a pivot it does not own.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialAttachment {
    angle: f32,
    radius: f32,
    sprite: SpriteRef,
    swing: SwingConfig,
    swing_gate: CooldownGate,
    active_swing: Option<ActiveSwing>,
    offset: Vec2,
    placement: Placement,
}

impl RadialAttachment {
    pub fn new(radius: f32, sprite: SpriteRef) -> Self {
        Self::with_swing(radius, sprite, SwingConfig::default())
    }

    pub fn with_swing(radius: f32, sprite: SpriteRef, swing: SwingConfig) -> Self {
        Self {
            angle: 0.0,
            radius,
            sprite,
            swing,
            swing_gate: CooldownGate::new(swing.swing_ms.saturating_add(swing.cooldown_ms)),
            active_swing: None,
            offset: Vec2::ZERO,
            placement: Placement::default(),
        }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_swinging(&self, now: Timestamp) -> bool {
        self.active_swing
            .is_some_and(|swing| now < swing.swing_end)
    }

    /// Starts a swing toward `target` unless the previous swing or its
    /// cooldown is still running.
    pub fn trigger_swing(&mut self, now: Timestamp, pivot: Vec2, target: Vec2) -> bool {
        if !self.swing_gate.try_fire(now) {
            return false;
        }
        self.active_swing = Some(ActiveSwing {
            swing_end: now.saturating_add(self.swing.swing_ms),
            target_angle: pointer_angle(pivot, target),
            sign: 1.0f32.copysign(target.x - pivot.x),
        });
        true
    }

    pub fn update(&mut self, now: Timestamp, pivot: Vec2, mode: AttachmentMode) -> Placement {
        if let Some(swing) = self.active_swing.filter(|swing| now < swing.swing_end) {
            let remaining = (swing.swing_end - now) as f32 / self.swing.swing_ms.max(1) as f32;
            self.angle = wrap_degrees(
                swing.target_angle + remaining * self.swing.extent_degrees * swing.sign,
            );
            return self.place(pivot, self.radius);
        }

        match mode {
            AttachmentMode::Rotating {
                rate_degrees_per_second,
                elapsed_ms,
            } => {
                self.angle =
                    wrap_degrees(self.angle + elapsed_ms / 1000.0 * rate_degrees_per_second);
                self.place(pivot, self.radius)
            }
            AttachmentMode::PointerFollow {
                target: Some(target),
            } => {
                self.angle = pointer_angle(pivot, target);
                self.place(pivot, self.radius * 0.5)
            }
            AttachmentMode::PointerFollow { target: None } => {
                self.placement = Placement {
                    center: pivot + self.offset,
                    rotation_degrees: self.angle,
                };
                self.placement
            }
        }
    }

    fn place(&mut self, pivot: Vec2, radius: f32) -> Placement {
        let radians = self.angle.to_radians();
        self.offset = Vec2::new(radius * radians.sin(), radius * radians.cos());
        self.placement = Placement {
            center: pivot + self.offset,
            rotation_degrees: self.angle,
        };
        self.placement
    }
}

impl Drawable for RadialAttachment {
    fn placement(&self) -> Placement {
        self.placement
    }

    fn sprite(&self) -> SpriteRef {
        self.sprite
    }
}

/// Angle from `pivot` toward `target`, measured so that straight down is 0
/// and straight right is 90. Coincident points give 0.
pub fn pointer_angle(pivot: Vec2, target: Vec2) -> f32 {
    let dx = target.x - pivot.x;
    let dy = target.y - pivot.y;

    if dx == 0.0 && dy == 0.0 {
        0.0
    } else if dy == 0.0 && dx > 0.0 {
        90.0
    } else if dx == 0.0 && dy > 0.0 {
        0.0
    } else if dy == 0.0 && dx < 0.0 {
        270.0
    } else if dx == 0.0 && dy < 0.0 {
        180.0
    } else {
        let mut angle = (dx / dy).atan().to_degrees();
        if dy < 0.0 {
            angle += 180.0;
        }
        wrap_degrees(angle)
    }
}

/// Wraps into `[0, 360)`. Non-finite input maps to 0.
pub fn wrap_degrees(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
