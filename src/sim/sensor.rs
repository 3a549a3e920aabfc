//! Sensors: fixed probe segments attached to an actor.
//!
//! A sensor is described once, in the unrotated floor frame, relative to
//! the actor's centre.  Queries rotate it into world space for the current
//! movement mode and ask the obstacle map what touches the segment.

use glam::{IVec2, Vec2};

use crate::world::{Layer, MovementMode, ObstacleMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sensor {
    head: IVec2,
    tail: IVec2,
}

/// Rotate a floor-frame offset into `mode`'s frame.
#[inline]
pub fn rotate(v: IVec2, mode: MovementMode) -> IVec2 {
    match mode {
        MovementMode::Floor => v,
        MovementMode::LeftWall => IVec2::new(-v.y, v.x),
        MovementMode::Ceiling => -v,
        MovementMode::RightWall => IVec2::new(v.y, -v.x),
    }
}

impl Sensor {
    /// Vertical segment at `x`, from `y1` down to `y2`.
    pub const fn vertical(x: i32, y1: i32, y2: i32) -> Sensor {
        Sensor {
            head: IVec2::new(x, y1),
            tail: IVec2::new(x, y2),
        }
    }

    /// Horizontal segment at `y`, from `x1` right to `x2`.
    pub const fn horizontal(y: i32, x1: i32, x2: i32) -> Sensor {
        Sensor {
            head: IVec2::new(x1, y),
            tail: IVec2::new(x2, y),
        }
    }

    #[inline]
    pub fn x1(&self) -> i32 {
        self.head.x
    }

    #[inline]
    pub fn y1(&self) -> i32 {
        self.head.y
    }

    #[inline]
    pub fn x2(&self) -> i32 {
        self.tail.x
    }

    #[inline]
    pub fn y2(&self) -> i32 {
        self.tail.y
    }

    /// World position of the first endpoint.
    #[inline]
    pub fn head(&self, position: Vec2, mode: MovementMode) -> IVec2 {
        position.floor().as_ivec2() + rotate(self.head, mode)
    }

    /// World position of the second endpoint.
    #[inline]
    pub fn tail(&self, position: Vec2, mode: MovementMode) -> IVec2 {
        position.floor().as_ivec2() + rotate(self.tail, mode)
    }

    /// Normalised world rectangle `(min, max)` covered by the segment.
    #[inline]
    pub fn world_rect(&self, position: Vec2, mode: MovementMode) -> (IVec2, IVec2) {
        let (h, t) = (self.head(position, mode), self.tail(position, mode));
        (h.min(t), h.max(t))
    }

    /// Best obstacle touching the sensor, if any.
    pub fn check<'m, M: ObstacleMap>(
        &self,
        position: Vec2,
        mode: MovementMode,
        layer: Layer,
        map: &'m M,
    ) -> Option<&'m M::Obstacle> {
        let (min, max) = self.world_rect(position, mode);
        map.best_obstacle_at(min.x, min.y, max.x, max.y, mode, layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Brick, BrickMap};

    #[test]
    fn rotations_follow_the_mode() {
        let a = Sensor::vertical(-9, 0, 20);
        let p = Vec2::new(100.7, 50.2);
        assert_eq!(a.tail(p, MovementMode::Floor), IVec2::new(91, 70));
        assert_eq!(a.tail(p, MovementMode::RightWall), IVec2::new(120, 59));
        assert_eq!(a.tail(p, MovementMode::Ceiling), IVec2::new(109, 30));
        assert_eq!(a.tail(p, MovementMode::LeftWall), IVec2::new(80, 41));

        let (min, max) = a.world_rect(p, MovementMode::Ceiling);
        assert_eq!(min, IVec2::new(109, 30));
        assert_eq!(max, IVec2::new(109, 50));
    }

    #[test]
    fn check_hits_the_floor_under_the_foot() {
        let map: BrickMap = [Brick::solid(0, 100, 200, 16)].into_iter().collect();
        let a = Sensor::vertical(-9, 0, 20);
        assert!(
            a.check(Vec2::new(50.0, 81.0), MovementMode::Floor, Layer::Default, &map)
                .is_some()
        );
        assert!(
            a.check(Vec2::new(50.0, 79.0), MovementMode::Floor, Layer::Default, &map)
                .is_none()
        );
    }
}
