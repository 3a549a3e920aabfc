//! Obstacles: anything a physics actor can stand on, run along or bump into.
//!
//! The actor only ever talks to the [`Obstacle`] trait.  [`Brick`] is the
//! stock implementation: a pixel [`CollisionMask`] placed in the world.

use std::sync::Arc;

use glam::IVec2;

/*------------------------- orientation -------------------------------*/

/// Which way an actor's feet are pointing.  Floor is the usual "down".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MovementMode {
    #[default]
    Floor,
    LeftWall,
    Ceiling,
    RightWall,
}

impl MovementMode {
    /// Direction a ground probe looks in while in this mode.
    #[inline]
    pub fn ground_dir(self) -> GroundDir {
        match self {
            MovementMode::Floor => GroundDir::Down,
            MovementMode::LeftWall => GroundDir::Left,
            MovementMode::Ceiling => GroundDir::Up,
            MovementMode::RightWall => GroundDir::Right,
        }
    }
}

/// Direction of a ground scan.  The returned coordinate is the surface you
/// would hit travelling that way: `Down` gives a top edge, `Right` gives a
/// left edge, and so on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroundDir {
    Down,
    Left,
    Up,
    Right,
}

/// Obstacle subset filter.  `Default` matches everything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Layer {
    #[default]
    Default,
    Green,
    Yellow,
}

impl Layer {
    #[inline]
    pub fn matches(self, filter: Layer) -> bool {
        self == Layer::Default || filter == Layer::Default || self == filter
    }
}

/*------------------------- obstacle contract -------------------------*/

pub trait Obstacle {
    /// Solid obstacles block from every side; the rest are one-way clouds.
    fn is_solid(&self) -> bool;

    fn layer(&self) -> Layer;

    /// World coordinate of the surface met when scanning from `(x, y)`
    /// in `dir`.  An x for `Left`/`Right`, a y for `Up`/`Down`.
    fn ground_position(&self, x: i32, y: i32, dir: GroundDir) -> i32;

    fn point_collision(&self, x: i32, y: i32) -> bool;

    /// Does any solid pixel lie inside the inclusive rectangle?
    fn got_collision(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> bool;
}

/*------------------------- collision mask ----------------------------*/

/// Per-pixel solidity bitmap, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionMask {
    width: i32,
    height: i32,
    bits: Vec<bool>,
}

impl CollisionMask {
    pub fn from_fn<F>(width: i32, height: i32, f: F) -> Self
    where
        F: Fn(i32, i32) -> bool,
    {
        let (width, height) = (width.max(1), height.max(1));
        let mut bits = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    pub fn solid(width: i32, height: i32) -> Self {
        Self::from_fn(width, height, |_, _| true)
    }

    /// Ramp rising towards the right: empty top-left, solid bottom-right.
    pub fn ramp_up(width: i32, height: i32) -> Self {
        Self::from_fn(width, height, |x, y| y >= ((width - 1 - x) * height) / width)
    }

    /// Ramp falling towards the right.
    pub fn ramp_down(width: i32, height: i32) -> Self {
        Self::from_fn(width, height, |x, y| y >= (x * height) / width)
    }

    /// Thin platform occupying the upper half of the box.
    pub fn cloud(width: i32, height: i32) -> Self {
        let thickness = (height / 2).max(1);
        Self::from_fn(width, height, |_, y| y < thickness)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Out-of-bounds pixels are empty.
    #[inline]
    pub fn at(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return false;
        }
        self.bits[(y * self.width + x) as usize]
    }

    /// Scan for the surface starting at local `(x, y)`, clamped into the
    /// mask.  From inside solid we back out against `dir`; from empty space
    /// we advance along `dir` until something solid shows up.
    pub fn locate_ground(&self, x: i32, y: i32, dir: GroundDir) -> i32 {
        let mut x = x.clamp(0, self.width - 1);
        let mut y = y.clamp(0, self.height - 1);

        match dir {
            GroundDir::Down => {
                if self.at(x, y) {
                    while y > 0 && self.at(x, y - 1) {
                        y -= 1;
                    }
                } else {
                    while y < self.height - 1 && !self.at(x, y) {
                        y += 1;
                    }
                }
                y
            }
            GroundDir::Up => {
                if self.at(x, y) {
                    while y < self.height - 1 && self.at(x, y + 1) {
                        y += 1;
                    }
                } else {
                    while y > 0 && !self.at(x, y) {
                        y -= 1;
                    }
                }
                y
            }
            GroundDir::Left => {
                if self.at(x, y) {
                    while x < self.width - 1 && self.at(x + 1, y) {
                        x += 1;
                    }
                } else {
                    while x > 0 && !self.at(x, y) {
                        x -= 1;
                    }
                }
                x
            }
            GroundDir::Right => {
                if self.at(x, y) {
                    while x > 0 && self.at(x - 1, y) {
                        x -= 1;
                    }
                } else {
                    while x < self.width - 1 && !self.at(x, y) {
                        x += 1;
                    }
                }
                x
            }
        }
    }
}

/*------------------------- bricks ------------------------------------*/

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrickKind {
    Solid,
    Cloud,
}

/// A collision mask placed at `pos` (top-left corner).  Masks are shared
/// between bricks of the same shape.
#[derive(Clone, Debug)]
pub struct Brick {
    pub pos: IVec2,
    pub kind: BrickKind,
    pub layer: Layer,
    mask: Arc<CollisionMask>,
}

impl Brick {
    pub fn new(pos: IVec2, kind: BrickKind, mask: Arc<CollisionMask>) -> Self {
        Self {
            pos,
            kind,
            layer: Layer::Default,
            mask,
        }
    }

    pub fn solid(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(
            IVec2::new(x, y),
            BrickKind::Solid,
            Arc::new(CollisionMask::solid(width, height)),
        )
    }

    pub fn cloud(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(
            IVec2::new(x, y),
            BrickKind::Cloud,
            Arc::new(CollisionMask::cloud(width, height)),
        )
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    #[inline]
    pub fn mask(&self) -> &CollisionMask {
        &self.mask
    }

    #[inline]
    pub fn size(&self) -> IVec2 {
        IVec2::new(self.mask.width(), self.mask.height())
    }

    /// Inclusive bottom-right corner.
    #[inline]
    pub fn max(&self) -> IVec2 {
        self.pos + self.size() - IVec2::ONE
    }
}

impl Obstacle for Brick {
    #[inline]
    fn is_solid(&self) -> bool {
        self.kind == BrickKind::Solid
    }

    #[inline]
    fn layer(&self) -> Layer {
        self.layer
    }

    fn ground_position(&self, x: i32, y: i32, dir: GroundDir) -> i32 {
        let local = self.mask.locate_ground(x - self.pos.x, y - self.pos.y, dir);
        match dir {
            GroundDir::Down | GroundDir::Up => self.pos.y + local,
            GroundDir::Left | GroundDir::Right => self.pos.x + local,
        }
    }

    #[inline]
    fn point_collision(&self, x: i32, y: i32) -> bool {
        self.mask.at(x - self.pos.x, y - self.pos.y)
    }

    fn got_collision(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> bool {
        let max = self.max();
        let (lx, hx) = (x1.max(self.pos.x), x2.min(max.x));
        let (ly, hy) = (y1.max(self.pos.y), y2.min(max.y));
        if lx > hx || ly > hy {
            return false;
        }
        (ly..=hy).any(|y| (lx..=hx).any(|x| self.point_collision(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_filter() {
        assert!(Layer::Default.matches(Layer::Green));
        assert!(Layer::Green.matches(Layer::Default));
        assert!(Layer::Green.matches(Layer::Green));
        assert!(!Layer::Green.matches(Layer::Yellow));
    }

    #[test]
    fn ramp_masks() {
        let up = CollisionMask::ramp_up(64, 64);
        assert!(!up.at(0, 0));
        assert!(up.at(63, 0));
        assert!(up.at(0, 63));
        assert_eq!(up.locate_ground(10, 0, GroundDir::Down), 53);

        let down = CollisionMask::ramp_down(16, 16);
        assert!(down.at(0, 0));
        assert!(!down.at(15, 0));
        assert_eq!(down.locate_ground(15, 0, GroundDir::Down), 15);
    }

    #[test]
    fn ground_scans_in_every_direction() {
        let b = Brick::solid(100, 200, 32, 16);

        // from above and from inside
        assert_eq!(b.ground_position(110, 150, GroundDir::Down), 200);
        assert_eq!(b.ground_position(110, 210, GroundDir::Down), 200);
        // ceilings report the bottom edge
        assert_eq!(b.ground_position(110, 260, GroundDir::Up), 215);
        // walls: scanning right meets the left edge and vice versa
        assert_eq!(b.ground_position(90, 205, GroundDir::Right), 100);
        assert_eq!(b.ground_position(120, 205, GroundDir::Right), 100);
        assert_eq!(b.ground_position(150, 205, GroundDir::Left), 131);
    }

    #[test]
    fn rectangle_collision() {
        let b = Brick::solid(0, 0, 16, 16);
        assert!(b.got_collision(15, 15, 30, 30));
        assert!(!b.got_collision(16, 0, 30, 30));
        assert!(b.point_collision(0, 0));
        assert!(!b.point_collision(-1, 0));

        let c = Brick::cloud(0, 0, 16, 16);
        assert!(!c.is_solid());
        assert!(c.got_collision(0, 0, 0, 0));
        assert!(!c.got_collision(0, 12, 15, 15));
    }
}
