use super::geometry::{Rect, Vec2};

/// Reflects the proposed movement on every axis where the actor has already
/// pushed an edge into `obstacle`.
///
/// Probes are taken from the actor's current (pre-movement) rectangle:
///
/// | edge   | probes                                 | reflects when |
/// |--------|----------------------------------------|---------------|
/// | bottom | mid_bottom, bottom_right, bottom_left  | `y > 0`       |
/// | top    | mid_top, top_right, top_left           | `y < 0`       |
/// | left   | mid_left, top_left, bottom_left        | `x < 0`       |
/// | right  | mid_right, top_right, bottom_right     | `x > 0`       |
///
/// Bottom is checked before top and left before right; the second edge of a
/// pair is only consulted when the first has no probe inside. The two axes
/// are independent, so a corner hit reflects both.
///
/// This bounces rather than stops: an actor walking into the obstacle is
/// pushed back out by the reflected step.
pub fn resolve_collision(actor: Rect, obstacle: Rect, proposed: Vec2) -> Vec2 {
    let any_inside = |probes: [Vec2; 3]| probes.iter().any(|p| obstacle.contains_point(*p));
    let mut resolved = proposed;

    if any_inside([actor.mid_bottom(), actor.bottom_right(), actor.bottom_left()]) {
        if resolved.y > 0.0 {
            resolved.y = -resolved.y;
        }
    } else if any_inside([actor.mid_top(), actor.top_right(), actor.top_left()])
        && resolved.y < 0.0
    {
        resolved.y = -resolved.y;
    }

    if any_inside([actor.mid_left(), actor.top_left(), actor.bottom_left()]) {
        if resolved.x < 0.0 {
            resolved.x = -resolved.x;
        }
    } else if any_inside([actor.mid_right(), actor.top_right(), actor.bottom_right()])
        && resolved.x > 0.0
    {
        resolved.x = -resolved.x;
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBSTACLE: Rect = Rect::new(272.0, 192.0, 96.0, 96.0);

    fn actor_at(x: f32, y: f32) -> Rect {
        Rect::new(x, y, 96.0, 96.0)
    }

    #[test]
    fn landing_on_top_edge_reflects_downward_motion() {
        // Actor above the obstacle with its bottom edge 4px inside.
        let actor = actor_at(272.0, 100.0);
        let resolved = resolve_collision(actor, OBSTACLE, Vec2::new(3.0, 8.0));

        assert_eq!(resolved, Vec2::new(3.0, -8.0));
    }

    #[test]
    fn moving_away_is_untouched() {
        let actor = actor_at(272.0, 100.0);
        let resolved = resolve_collision(actor, OBSTACLE, Vec2::new(0.0, -8.0));

        assert_eq!(resolved, Vec2::new(0.0, -8.0));
    }

    #[test]
    fn hitting_from_below_reflects_upward_motion() {
        let actor = actor_at(272.0, 280.0);
        let resolved = resolve_collision(actor, OBSTACLE, Vec2::new(0.0, -8.0));

        assert_eq!(resolved, Vec2::new(0.0, 8.0));
    }

    #[test]
    fn side_hits_reflect_horizontal_motion() {
        let from_left = actor_at(180.0, 192.0);
        let from_right = actor_at(360.0, 192.0);

        assert_eq!(
            resolve_collision(from_left, OBSTACLE, Vec2::new(8.0, 0.0)),
            Vec2::new(-8.0, 0.0)
        );
        assert_eq!(
            resolve_collision(from_right, OBSTACLE, Vec2::new(-8.0, 0.0)),
            Vec2::new(8.0, 0.0)
        );
    }

    #[test]
    fn corner_hit_reflects_both_axes() {
        let actor = Rect::new(0.0, 0.0, 96.0, 96.0);
        let obstacle = Rect::new(80.0, 80.0, 96.0, 96.0);

        let resolved = resolve_collision(actor, obstacle, Vec2::new(8.0, 8.0));
        assert_eq!(resolved, Vec2::new(-8.0, -8.0));
    }

    #[test]
    fn bottom_probe_shadows_top_probe() {
        // Actor taller than the obstacle: both its top and bottom probes land
        // inside, so only the bottom rule applies and upward motion passes.
        let actor = Rect::new(290.0, 200.0, 20.0, 40.0);
        let obstacle = Rect::new(280.0, 190.0, 60.0, 60.0);

        let resolved = resolve_collision(actor, obstacle, Vec2::new(0.0, -5.0));
        assert_eq!(resolved, Vec2::new(0.0, -5.0));
    }

    #[test]
    fn disjoint_rects_pass_through() {
        let actor = actor_at(0.0, 0.0);
        let proposed = Vec2::new(-4.0, 7.5);
        assert_eq!(resolve_collision(actor, OBSTACLE, proposed), proposed);
    }
}
