//! ASCII tile levels.
//!
//! One character per 16×16 tile, rows top to bottom:
//!
//! ```text
//! #   solid            g  solid, green layer
//! /   ramp rising →    y  solid, yellow layer
//! \   ramp falling →   =  cloud (one-way platform)
//! @   spawn point      .  empty (so is a space)
//! ```

use std::{path::Path, sync::Arc};

use glam::{IVec2, Vec2};
use once_cell::sync::Lazy;
use thiserror::Error;

use super::{
    obstacle::{Brick, BrickKind, CollisionMask, Layer},
    obstacle_map::BrickMap,
};

pub const TILE: i32 = 16;

static SOLID: Lazy<Arc<CollisionMask>> = Lazy::new(|| Arc::new(CollisionMask::solid(TILE, TILE)));
static RAMP_UP: Lazy<Arc<CollisionMask>> =
    Lazy::new(|| Arc::new(CollisionMask::ramp_up(TILE, TILE)));
static RAMP_DOWN: Lazy<Arc<CollisionMask>> =
    Lazy::new(|| Arc::new(CollisionMask::ramp_down(TILE, TILE)));
static CLOUD: Lazy<Arc<CollisionMask>> = Lazy::new(|| Arc::new(CollisionMask::cloud(TILE, TILE)));

/// Built-in demo: a floor with a ramp, a wall, a ledge and a cloud.
pub const DEMO: &str = "\
................................................
................................................
..............................======............
................................................
.........................................#......
.@.......................................#......
.........................................#......
.................../####\\................#......
................../######\\...............#......
#################################.....##########
#################################.....##########
";

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level has no tiles")]
    Empty,

    #[error("unknown tile {ch:?} at row {row}, column {col}")]
    UnknownTile { ch: char, row: usize, col: usize },

    #[error("level has no spawn point (`@`)")]
    NoSpawn,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A parsed level: its bricks plus where the actor starts.
#[derive(Debug)]
pub struct Level {
    pub map: BrickMap,
    pub spawn: Vec2,
    /// Size in pixels.
    pub size: IVec2,
}

impl Level {
    pub fn load(path: impl AsRef<Path>) -> Result<Level, LevelError> {
        let text = std::fs::read_to_string(path)?;
        parse(&text)
    }
}

pub fn parse(text: &str) -> Result<Level, LevelError> {
    let mut map = BrickMap::new();
    let mut spawn = None;
    let (mut cols, mut rows) = (0usize, 0usize);

    for (row, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        cols = cols.max(line.chars().count());
        if !line.is_empty() {
            rows = row + 1;
        }

        for (col, ch) in line.chars().enumerate() {
            let pos = IVec2::new(col as i32 * TILE, row as i32 * TILE);
            let brick = match ch {
                '.' | ' ' => None,
                '@' => {
                    // stand the actor roughly on the tile's floor
                    spawn = Some(pos.as_vec2() + Vec2::new(TILE as f32 / 2.0, 0.0));
                    None
                }
                '#' => Some(Brick::new(pos, BrickKind::Solid, SOLID.clone())),
                '/' => Some(Brick::new(pos, BrickKind::Solid, RAMP_UP.clone())),
                '\\' => Some(Brick::new(pos, BrickKind::Solid, RAMP_DOWN.clone())),
                '=' => Some(Brick::new(pos, BrickKind::Cloud, CLOUD.clone())),
                'g' => Some(Brick::new(pos, BrickKind::Solid, SOLID.clone()).with_layer(Layer::Green)),
                'y' => {
                    Some(Brick::new(pos, BrickKind::Solid, SOLID.clone()).with_layer(Layer::Yellow))
                }
                _ => return Err(LevelError::UnknownTile { ch, row, col }),
            };
            if let Some(brick) = brick {
                map.insert(brick);
            }
        }
    }

    if rows == 0 || cols == 0 {
        return Err(LevelError::Empty);
    }
    let spawn = spawn.ok_or(LevelError::NoSpawn)?;

    Ok(Level {
        map,
        spawn,
        size: IVec2::new(cols as i32 * TILE, rows as i32 * TILE),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{MovementMode, Obstacle, ObstacleMap};

    #[test]
    fn parses_the_demo() {
        let level = parse(DEMO).unwrap();
        assert_eq!(level.spawn, Vec2::new(24.0, 80.0));
        assert_eq!(level.size, IVec2::new(48 * TILE, 11 * TILE));
        assert!(level.map.obstacle_exists(0, 9 * TILE, Layer::Default));

        // the ramp rises to the right
        let ramp = level
            .map
            .best_obstacle_at(19 * TILE + 12, 7 * TILE, 19 * TILE + 12, 8 * TILE - 1, MovementMode::Floor, Layer::Default)
            .unwrap();
        assert!(ramp.is_solid());
        assert!(ramp.point_collision(19 * TILE + 15, 7 * TILE + 1));
        assert!(!ramp.point_collision(19 * TILE, 7 * TILE + 1));
    }

    #[test]
    fn layered_and_cloud_tiles() {
        let level = parse("@\ng\ny\n=").unwrap();
        assert!(level.map.obstacle_exists(4, 20, Layer::Green));
        assert!(!level.map.obstacle_exists(4, 20, Layer::Yellow));
        assert!(level.map.obstacle_exists(4, 36, Layer::Yellow));
        let cloud = &level.map.bricks()[2];
        assert!(!cloud.is_solid());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(parse(""), Err(LevelError::Empty)));
        assert!(matches!(parse("###"), Err(LevelError::NoSpawn)));
        assert!(matches!(
            parse("@.\n#?"),
            Err(LevelError::UnknownTile { ch: '?', row: 1, col: 1 })
        ));
    }
}
