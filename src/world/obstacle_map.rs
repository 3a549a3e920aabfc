//! Brick grid – a small sparse spatial hash over static obstacles.
//!
//! * One cell ≙ 128×128 pixels.
//! * Each cell keeps a `SmallVec` of brick indices; a brick is listed in
//!   every cell its bounding box overlaps, so lookups never miss one that
//!   straddles a cell border.

use std::collections::HashMap;

use smallvec::SmallVec;

use super::obstacle::{Brick, GroundDir, Layer, MovementMode, Obstacle};

/*──────────────────────── query contract ────────────────────────*/

pub trait ObstacleMap {
    type Obstacle: Obstacle;

    /// Best obstacle touching the inclusive rectangle for an actor moving
    /// in `mode`: the one whose ground is highest relative to that mode.
    fn best_obstacle_at(
        &self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        mode: MovementMode,
        layer: Layer,
    ) -> Option<&Self::Obstacle>;

    /// Is there any obstacle (solid or not) at the pixel?
    fn obstacle_exists(&self, x: i32, y: i32, layer: Layer) -> bool;
}

/*──────────────────────── brick grid ────────────────────────────*/

pub const CELL_SIZE: i32 = 128;

type Cell = SmallVec<[u32; 8]>;

#[derive(Debug, Default)]
pub struct BrickMap {
    bricks: Vec<Brick>,
    cells: HashMap<(i32, i32), Cell>,
}

impl BrickMap {
    pub fn new() -> BrickMap {
        BrickMap::default()
    }

    #[inline]
    fn world_to_cell(v: i32) -> i32 {
        v.div_euclid(CELL_SIZE)
    }

    pub fn insert(&mut self, brick: Brick) {
        let id = self.bricks.len() as u32;
        let (min, max) = (brick.pos, brick.max());
        for cx in Self::world_to_cell(min.x)..=Self::world_to_cell(max.x) {
            for cy in Self::world_to_cell(min.y)..=Self::world_to_cell(max.y) {
                self.cells.entry((cx, cy)).or_default().push(id);
            }
        }
        self.bricks.push(brick);
    }

    #[inline]
    pub fn bricks(&self) -> &[Brick] {
        &self.bricks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bricks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bricks.is_empty()
    }

    /// Visit every brick whose bounding box may overlap the rectangle.
    /// Each brick is visited at most once.
    fn for_each_near<'a, F>(&'a self, x1: i32, y1: i32, x2: i32, y2: i32, mut f: F)
    where
        F: FnMut(&'a Brick),
    {
        let mut seen: SmallVec<[u32; 16]> = SmallVec::new();
        for cx in Self::world_to_cell(x1)..=Self::world_to_cell(x2) {
            for cy in Self::world_to_cell(y1)..=Self::world_to_cell(y2) {
                let Some(cell) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                for &id in cell {
                    if seen.contains(&id) {
                        continue;
                    }
                    seen.push(id);
                    f(&self.bricks[id as usize]);
                }
            }
        }
    }
}

impl FromIterator<Brick> for BrickMap {
    fn from_iter<I: IntoIterator<Item = Brick>>(iter: I) -> Self {
        let mut map = BrickMap::new();
        for brick in iter {
            map.insert(brick);
        }
        map
    }
}

/// Is `a` a better ground than `b` for an actor in `mode`?
/// Ties go to solid obstacles.
fn is_better(a: &Brick, b: &Brick, x: i32, y: i32, mode: MovementMode) -> bool {
    let dir = mode.ground_dir();
    let (ha, hb) = (a.ground_position(x, y, dir), b.ground_position(x, y, dir));
    if ha == hb {
        return a.is_solid() && !b.is_solid();
    }
    match dir {
        GroundDir::Down | GroundDir::Right => ha < hb,
        GroundDir::Up | GroundDir::Left => ha > hb,
    }
}

impl ObstacleMap for BrickMap {
    type Obstacle = Brick;

    fn best_obstacle_at(
        &self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        mode: MovementMode,
        layer: Layer,
    ) -> Option<&Brick> {
        let (cx, cy) = ((x1 + x2) / 2, (y1 + y2) / 2);
        let mut best: Option<&Brick> = None;

        self.for_each_near(x1, y1, x2, y2, |brick| {
            if !brick.layer.matches(layer) || !brick.got_collision(x1, y1, x2, y2) {
                return;
            }
            best = match best {
                Some(b) if !is_better(brick, b, cx, cy, mode) => Some(b),
                _ => Some(brick),
            };
        });
        best
    }

    fn obstacle_exists(&self, x: i32, y: i32, layer: Layer) -> bool {
        let mut found = false;
        self.for_each_near(x, y, x, y, |brick| {
            found |= brick.layer.matches(layer) && brick.point_collision(x, y);
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::obstacle::BrickKind;

    #[test]
    fn straddling_bricks_are_found_from_every_cell() {
        let map: BrickMap = [Brick::solid(120, 120, 16, 16)].into_iter().collect();
        assert!(map.obstacle_exists(121, 121, Layer::Default));
        assert!(map.obstacle_exists(130, 130, Layer::Default));
        assert!(!map.obstacle_exists(140, 140, Layer::Default));
    }

    #[test]
    fn highest_ground_wins_on_the_floor() {
        let map: BrickMap = [Brick::solid(0, 110, 32, 32), Brick::solid(0, 100, 32, 8)]
            .into_iter()
            .collect();
        let best = map
            .best_obstacle_at(10, 90, 10, 120, MovementMode::Floor, Layer::Default)
            .unwrap();
        assert_eq!(best.pos.y, 100);

        // on the ceiling the lowest surface wins instead
        let best = map
            .best_obstacle_at(10, 90, 10, 120, MovementMode::Ceiling, Layer::Default)
            .unwrap();
        assert_eq!(best.pos.y, 110);
    }

    #[test]
    fn layer_filtering() {
        let map: BrickMap = [Brick::solid(0, 0, 16, 16).with_layer(Layer::Green)]
            .into_iter()
            .collect();
        assert!(
            map.best_obstacle_at(4, 4, 4, 4, MovementMode::Floor, Layer::Yellow)
                .is_none()
        );
        assert!(
            map.best_obstacle_at(4, 4, 4, 4, MovementMode::Floor, Layer::Green)
                .is_some()
        );
        assert!(map.obstacle_exists(4, 4, Layer::Default));
    }

    #[test]
    fn solid_beats_cloud_at_equal_height() {
        let map: BrickMap = [Brick::cloud(0, 0, 16, 16), Brick::solid(0, 0, 16, 16)]
            .into_iter()
            .collect();
        let best = map
            .best_obstacle_at(4, 0, 4, 4, MovementMode::Floor, Layer::Default)
            .unwrap();
        assert_eq!(best.kind, BrickKind::Solid);
    }
}
