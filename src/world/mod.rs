pub mod level;
mod obstacle;
mod obstacle_map;

pub use level::{Level, LevelError, TILE};
pub use obstacle::{
    Brick, BrickKind, CollisionMask, GroundDir, Layer, MovementMode, Obstacle,
};
pub use obstacle_map::{BrickMap, CELL_SIZE, ObstacleMap};
