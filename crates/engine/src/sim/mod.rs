//! Frame-synchronous simulation core shared by the demo scenes.
//!
//! Everything in here is pure state plus `FrameTime`; nothing reads wall time
//! or touches the window.

mod clock;
mod collision;
mod cooldown;
mod drawable;
mod geometry;
mod movement;
mod obstacle;
mod radial;

pub use clock::{FrameTime, SimClock, Timestamp};
pub use collision::resolve_collision;
pub use cooldown::CooldownGate;
pub use drawable::{Drawable, Placement, SheetId, SpriteRef, TileCoord};
pub use geometry::{Rect, Vec2};
pub use movement::{resolve_direction, Actor, Direction, DirectionSet};
pub use obstacle::{AnimationState, AudioCue, Obstacle, OpenCloseAnimator};
pub use radial::{pointer_angle, wrap_degrees, AttachmentMode, RadialAttachment, SwingConfig};
