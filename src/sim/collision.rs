//! Moving the actor and resolving what it ran into.
//!
//! Listed in evaluation order: sub-stepped movement, walls, ceilings,
//! sticky reattachment, ground snapping, landing and falling off.

use glam::{IVec2, Vec2};
use log::trace;

use crate::defs::{Buttons, TARGET_FPS, trig};
use crate::world::{GroundDir, MovementMode, Obstacle, ObstacleMap};

use super::{
    components::{Slot, State},
    sensor::Sensor,
    step::{Step, nearly_zero, sign},
};

/// Largest movement increment, in pixels.  Smaller means sturdier against
/// thin geometry and more sensor queries.
const MAX_INCREMENT: f32 = 2.0;

/// Sticky reattachment probe range, in pixels.
const STICKY_MIN: i32 = 4;
const STICKY_MAX: i32 = 12;

/// Airborne time after which a midair roll unrolls on landing.
const UNROLL_AFTER: f32 = 0.2;

/// Horizontal lock applied when sliding off a wall or ceiling.
const FALL_OFF_LOCK: f32 = 0.5;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Pick {
    First,
    Second,
}

impl<M: ObstacleMap> Step<'_, '_, M> {
    /* ---------------------------------------------------------------- */
    /* movement                                                         */
    /* ---------------------------------------------------------------- */

    /// Move by small increments, stopping each axis once something blocks
    /// it.
    pub(super) fn advance(&mut self) {
        let cfg = &self.pa.cfg;
        let ds = Vec2::new(self.pa.xsp, self.pa.ysp) * self.dt;
        let (sx, sy) = (ds.x.signum_or_zero(), ds.y.signum_or_zero());

        let max_ds_length = cfg.capspeed.max(cfg.topyspeed) / TARGET_FPS;
        let max_increments = (max_ds_length / MAX_INCREMENT).ceil() as i32;
        let count = max_increments.min(ds.length().ceil() as i32);
        if count <= 0 {
            return;
        }
        let mut increment = ds / count as f32;

        for _ in 0..count {
            let next = self.pa.position + increment;
            self.move_to(next);

            let side = (self.at.m.is_some(), self.at.n.is_some());
            let top = self.at.c.is_some() || self.at.d.is_some();
            match self.pa.mode {
                MovementMode::Floor => {
                    if (side.0 && sx < 0) || (side.1 && sx > 0) {
                        increment.x = 0.0;
                    }
                    if top && sy < 0 {
                        increment.y = 0.0;
                    }
                }
                MovementMode::RightWall => {
                    if (side.0 && sy > 0) || (side.1 && sy < 0) {
                        increment.y = 0.0;
                    }
                    if top && sx < 0 {
                        increment.x = 0.0;
                    }
                }
                MovementMode::Ceiling => {
                    if (side.0 && sx > 0) || (side.1 && sx < 0) {
                        increment.x = 0.0;
                    }
                    if top && sy > 0 {
                        increment.y = 0.0;
                    }
                }
                MovementMode::LeftWall => {
                    if (side.0 && sy < 0) || (side.1 && sy > 0) {
                        increment.y = 0.0;
                    }
                    if top && sx > 0 {
                        increment.x = 0.0;
                    }
                }
            }

            if increment == Vec2::ZERO {
                break;
            }
        }
    }

    pub(super) fn land_after_hit(&mut self) {
        let pa = &mut *self.pa;
        if !pa.midair && pa.was_midair && pa.state == State::GettingHit {
            pa.gsp = 0.0;
            pa.xsp = 0.0;
            pa.state = State::Stopped;
        }
    }

    /* ---------------------------------------------------------------- */
    /* walls                                                            */
    /* ---------------------------------------------------------------- */

    pub(super) fn right_wall(&mut self) {
        let Some(wall) = self.at.n else {
            return;
        };
        let pa = &mut *self.pa;
        let origin = pa.position.floor();
        let tail = pa.sensor(Slot::N).tail(origin, pa.mode);
        let local = tail - origin.as_ivec2();

        if pa.gsp > 0.0 {
            pa.gsp = 0.0;
        }

        let mut next = pa.position;
        let on_floor = match pa.mode {
            MovementMode::Floor => {
                next.x = (wall.ground_position(tail.x, tail.y, GroundDir::Right) - local.x - 1) as f32;
                pa.xsp = pa.xsp.min(0.0);
                true
            }
            MovementMode::Ceiling => {
                next.x = (wall.ground_position(tail.x, tail.y, GroundDir::Left) - local.x + 1) as f32;
                pa.xsp = pa.xsp.max(0.0);
                false
            }
            MovementMode::RightWall => {
                next.y = (wall.ground_position(tail.x, tail.y, GroundDir::Up) - local.y - 1) as f32;
                pa.ysp = pa.ysp.max(0.0);
                false
            }
            MovementMode::LeftWall => {
                next.y = (wall.ground_position(tail.x, tail.y, GroundDir::Down) - local.y + 1) as f32;
                pa.ysp = pa.ysp.min(0.0);
                false
            }
        };

        self.move_to(next);
        if !on_floor {
            self.force_angle(0x00);
        }
        self.push_against_wall(Buttons::RIGHT, true);
    }

    pub(super) fn left_wall(&mut self) {
        let Some(wall) = self.at.m else {
            return;
        };
        let pa = &mut *self.pa;
        let origin = pa.position.floor();
        let head = pa.sensor(Slot::M).head(origin, pa.mode);
        let local = head - origin.as_ivec2();

        if pa.gsp < 0.0 {
            pa.gsp = 0.0;
        }

        let mut next = pa.position;
        let on_floor = match pa.mode {
            MovementMode::Floor => {
                next.x = (wall.ground_position(head.x, head.y, GroundDir::Left) - local.x + 1) as f32;
                pa.xsp = pa.xsp.max(0.0);
                true
            }
            MovementMode::Ceiling => {
                next.x = (wall.ground_position(head.x, head.y, GroundDir::Right) - local.x - 1) as f32;
                pa.xsp = pa.xsp.min(0.0);
                false
            }
            MovementMode::RightWall => {
                next.y = (wall.ground_position(head.x, head.y, GroundDir::Down) - local.y - 1) as f32;
                pa.ysp = pa.ysp.min(0.0);
                false
            }
            MovementMode::LeftWall => {
                next.y = (wall.ground_position(head.x, head.y, GroundDir::Up) - local.y + 1) as f32;
                pa.ysp = pa.ysp.max(0.0);
                false
            }
        };

        self.move_to(next);
        if !on_floor {
            self.force_angle(0x00);
        }
        self.push_against_wall(Buttons::LEFT, false);
    }

    fn push_against_wall(&mut self, towards: Buttons, facing_right: bool) {
        if self.pa.midair || self.pa.mode != MovementMode::Floor || self.pa.state == State::Rolling {
            return;
        }
        if self.down(towards) {
            self.pa.state = State::Pushing;
            self.pa.facing_right = facing_right;
        } else {
            self.pa.state = State::Stopped;
        }
    }

    /* ---------------------------------------------------------------- */
    /* ceiling                                                          */
    /* ---------------------------------------------------------------- */

    pub(super) fn ceiling(&mut self) {
        if !self.pa.midair || !self.pa.touching_ceiling {
            return;
        }

        let (c_sensor, d_sensor) = (*self.pa.sensor(Slot::C), *self.pa.sensor(Slot::D));
        let (ceiling, sensor) = match self.pick_ceiling(&c_sensor, &d_sensor) {
            Pick::First => (self.at.c, c_sensor),
            Pick::Second => (self.at.d, d_sensor),
        };

        let mut reattached = false;
        if self.pa.ysp < 0.0 {
            self.force_angle(0x80);
            self.set_auto_angle();

            let angle = self.pa.angle;
            if (0xA0..=0xBF).contains(&angle) || (0x40..=0x5F).contains(&angle) {
                reattached = !self.pa.midair;
                if reattached {
                    let pa = &mut *self.pa;
                    pa.gsp = if pa.xsp.abs() > -pa.ysp {
                        -pa.xsp
                    } else {
                        pa.ysp * -sign(trig::sin(angle))
                    };
                    pa.xsp = 0.0;
                    pa.ysp = 0.0;
                    if self.pa.state != State::Rolling {
                        self.pa.state = self.walking_or_running();
                    }
                    trace!("reattached to the ceiling at angle {angle:#04x}");
                }
            }
        }

        if reattached {
            return;
        }

        self.pa.ysp = self.pa.ysp.max(0.0);
        self.force_angle(0x00);

        let Some(ceiling) = ceiling else {
            return;
        };
        let origin = self.pa.position.floor();
        let head = sensor.head(origin, self.pa.mode);
        let local = head - origin.as_ivec2();
        let y = ceiling.ground_position(head.x, head.y, GroundDir::Up) - local.y + 1;
        let next = Vec2::new(self.pa.position.x, y as f32);
        self.move_to(next);
    }

    /// The lower of the two ceiling contacts, relative to the mode.
    fn pick_ceiling(&self, c_sensor: &Sensor, d_sensor: &Sensor) -> Pick {
        let (Some(c), Some(d)) = (self.at.c, self.at.d) else {
            return if self.at.c.is_none() { Pick::Second } else { Pick::First };
        };
        let mode = self.pa.mode;
        let probe = |s: &Sensor| self.truncated() + super::sensor::rotate(IVec2::new(s.x1(), s.y1()), mode);
        let (pc, pd) = (probe(c_sensor), probe(d_sensor));
        let dir = match mode {
            MovementMode::Floor => GroundDir::Up,
            MovementMode::LeftWall => GroundDir::Right,
            MovementMode::Ceiling => GroundDir::Down,
            MovementMode::RightWall => GroundDir::Left,
        };
        let hc = c.ground_position(pc.x, pc.y, dir);
        let hd = d.ground_position(pd.x, pd.y, dir);
        let c_wins = match mode {
            MovementMode::Floor | MovementMode::RightWall => hc >= hd,
            MovementMode::LeftWall | MovementMode::Ceiling => hc < hd,
        };
        if c_wins { Pick::First } else { Pick::Second }
    }

    /// The higher of the two ground contacts, relative to the mode.
    fn pick_ground(&self, a_sensor: &Sensor, b_sensor: &Sensor) -> Pick {
        let (Some(a), Some(b)) = (self.at.a, self.at.b) else {
            return if self.at.a.is_none() { Pick::Second } else { Pick::First };
        };
        let mode = self.pa.mode;
        let probe = |s: &Sensor| self.truncated() + super::sensor::rotate(IVec2::new(s.x2(), s.y2()), mode);
        let (pa_, pb) = (probe(a_sensor), probe(b_sensor));
        let dir = mode.ground_dir();
        let ha = a.ground_position(pa_.x, pa_.y, dir);
        let hb = b.ground_position(pb.x, pb.y, dir);
        let a_wins = match mode {
            MovementMode::Floor | MovementMode::RightWall => ha < hb,
            MovementMode::LeftWall | MovementMode::Ceiling => ha >= hb,
        };
        if a_wins { Pick::First } else { Pick::Second }
    }

    /// Actor position truncated towards zero.
    #[inline]
    fn truncated(&self) -> IVec2 {
        IVec2::new(self.pa.position.x as i32, self.pa.position.y as i32)
    }

    /* ---------------------------------------------------------------- */
    /* staying on the ground                                            */
    /* ---------------------------------------------------------------- */

    /// After losing the ground without meaning to, look a few pixels
    /// further for it and snap back on.
    pub(super) fn sticky(&mut self) {
        let pa = &*self.pa;
        let lost_ground = !pa.was_midair && !pa.state.is_launched();
        let rolling = pa.state == State::Rolling && !pa.sticky_lock;
        if !pa.midair {
            if pa.state == State::Rolling {
                self.pa.sticky_lock = false;
            }
            return;
        }
        if !lost_ground && !rolling {
            return;
        }

        let mut u = STICKY_MIN;
        if pa.xsp.abs() > pa.cfg.topspeed || pa.state == State::Rolling {
            let foot = if pa.xsp > 0.0 { Slot::B } else { Slot::A };
            let (_, tip) = pa.sensor(foot).world_rect(pa.position, pa.mode);
            while u < STICKY_MAX {
                let probe = match pa.mode {
                    MovementMode::Floor => IVec2::new(tip.x, tip.y + u),
                    MovementMode::RightWall => IVec2::new(tip.x + u, tip.y),
                    MovementMode::Ceiling => IVec2::new(tip.x, tip.y - u),
                    MovementMode::LeftWall => IVec2::new(tip.x - u, tip.y),
                };
                if self.map.obstacle_exists(probe.x, probe.y, pa.layer) {
                    break;
                }
                u += 1;
            }
        }

        let u = u as f32;
        let offset = match pa.mode {
            MovementMode::Floor => Vec2::new(0.0, u),
            MovementMode::Ceiling => Vec2::new(0.0, -u),
            MovementMode::RightWall => Vec2::new(u, 0.0),
            MovementMode::LeftWall => Vec2::new(-u, 0.0),
        };

        let next = pa.position + offset;
        self.pa.midair = false;
        self.move_to(next);
        self.set_auto_angle();

        if self.pa.midair {
            let back = self.pa.position - offset;
            self.move_to(back);
            self.set_auto_angle();
            if self.pa.state == State::Rolling {
                self.pa.sticky_lock = true;
            }
        } else {
            trace!("sticky reattachment by {u} px");
        }
    }

    /// Snap onto the best ground under the feet.
    pub(super) fn stick_to_ground(&mut self) {
        let pa = &*self.pa;
        if pa.midair || (pa.state.is_launched() && pa.ysp < 0.0) {
            return;
        }

        let (a_sensor, b_sensor) = (*pa.sensor(Slot::A), *pa.sensor(Slot::B));
        let (ground, sensor) = match self.pick_ground(&a_sensor, &b_sensor) {
            Pick::First => (self.at.a, a_sensor),
            Pick::Second => (self.at.b, b_sensor),
        };
        let Some(ground) = ground else {
            return;
        };

        let offset = sensor.y2() - 1;
        let p = self.truncated();
        let (x2, y2) = (sensor.x2(), sensor.y2());
        let mut next = pa.position;
        match pa.mode {
            MovementMode::Floor => {
                next.y = (ground.ground_position(p.x + x2, p.y + y2, GroundDir::Down) - offset) as f32;
            }
            MovementMode::LeftWall => {
                next.x = (ground.ground_position(p.x - y2, p.y + x2, GroundDir::Left) + offset) as f32;
            }
            MovementMode::Ceiling => {
                next.y = (ground.ground_position(p.x - x2, p.y - y2, GroundDir::Up) + offset) as f32;
            }
            MovementMode::RightWall => {
                next.x = (ground.ground_position(p.x + y2, p.y - x2, GroundDir::Right) - offset) as f32;
            }
        }
        self.move_to(next);

        if self.pa.was_midair && self.pa.mode == MovementMode::Floor {
            let unroll = self.pa.midair_timer >= UNROLL_AFTER && !self.down(Buttons::DOWN);
            self.pa.gsp = self.pa.xsp;
            if self.pa.state != State::Rolling {
                self.pa.state = self.walking_or_running();
            } else if unroll {
                self.pa.state = self.walking_or_running();
                if !nearly_zero(self.pa.gsp) {
                    self.pa.facing_right = self.pa.gsp > 0.0;
                }
            }
        }

        self.set_auto_angle();
    }

    /// Convert airborne velocity into ground speed on the landing tick.
    pub(super) fn reacquire_ground(&mut self) {
        if self.pa.midair || !self.pa.was_midair {
            return;
        }

        let pa = &mut *self.pa;
        let (angle, xsp, ysp) = (pa.angle, pa.xsp, pa.ysp);
        let dir = -sign(trig::sin(angle));
        match angle {
            0xF0..=0xFF | 0x00..=0x0F => pa.gsp = xsp,
            0xE0..=0xEF | 0x10..=0x1F => {
                pa.gsp = if xsp.abs() > ysp { xsp } else { ysp * 0.5 * dir };
            }
            0xC0..=0xDF | 0x20..=0x3F => {
                pa.gsp = if xsp.abs() > ysp { xsp } else { ysp * dir };
            }
            _ => {}
        }

        pa.xsp = 0.0;
        pa.ysp = 0.0;
        if self.pa.state != State::Rolling {
            self.pa.state = self.walking_or_running();
        }
        trace!("landed: gsp {:.2} at angle {angle:#04x}", self.pa.gsp);
    }

    /// Slow actors slide off walls and ceilings.
    pub(super) fn fall_off(&mut self) {
        let pa = &mut *self.pa;
        if pa.midair || pa.mode == MovementMode::Floor || pa.hlock_timer != 0.0 {
            return;
        }
        if pa.gsp.abs() >= pa.cfg.falloffthreshold {
            return;
        }

        pa.hlock_timer = FALL_OFF_LOCK;
        if (0x40..=0xC0).contains(&pa.angle) {
            pa.gsp = 0.0;
            self.force_angle(0x00);
        }
    }

    /// End-of-tick bookkeeping and state clean-up.
    pub(super) fn settle(&mut self) {
        if self.pa.midair {
            self.pa.midair_timer += self.dt;
            self.force_angle(0x00);

            // don't carry a stale ground speed into the landing
            if self.pa.ysp < 0.0 {
                self.pa.gsp = 0.0;
            }
        } else {
            self.pa.midair_timer = 0.0;
        }

        if self.pa.midair {
            if self.pa.state.is_grounded_only() {
                self.pa.state = self.walking_or_running();
            }
        } else if self.pa.state == State::Walking && nearly_zero(self.pa.gsp) {
            self.pa.state = State::Stopped;
        }
    }
}

trait SignumOrZero {
    fn signum_or_zero(self) -> i32;
}

impl SignumOrZero for f32 {
    /// `-1`, `0` or `1`; unlike `f32::signum`, zero maps to zero.
    #[inline]
    fn signum_or_zero(self) -> i32 {
        (self > 0.0) as i32 - (self < 0.0) as i32
    }
}
