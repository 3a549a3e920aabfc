//! One simulated tick.
//!
//! [`Step`] borrows the actor and the obstacle map for the duration of a
//! tick and caches the latest sensor contacts.  The tick itself is an
//! ordered list of rules (see [`Step::run`]); each rule lives in
//! `locomotion.rs` or `collision.rs` and reads or writes the actor through
//! the step.
//!
//! Position and angle changes go through [`Step::move_to`],
//! [`Step::force_angle`] and [`Step::set_auto_angle`], which always refresh
//! the movement mode and the contacts afterwards.

use glam::Vec2;
use log::trace;

use crate::defs::{Buttons, SensorMask};
use crate::world::{GroundDir, MovementMode, Obstacle, ObstacleMap};

use super::{
    actor::PhysicsActor,
    components::{Slot, movement_mode_of},
};

/// Clouds are only stood on if the probe is at most this far below their
/// surface.
pub(super) const CLOUD_OFFSET: i32 = 12;

/// What each contact sensor touched at the last refresh.
pub(super) struct Contacts<'m, O> {
    pub a: Option<&'m O>,
    pub b: Option<&'m O>,
    pub c: Option<&'m O>,
    pub d: Option<&'m O>,
    pub m: Option<&'m O>,
    pub n: Option<&'m O>,
}

impl<O> Contacts<'_, O> {
    fn none() -> Self {
        Self {
            a: None,
            b: None,
            c: None,
            d: None,
            m: None,
            n: None,
        }
    }
}

pub(crate) struct Step<'a, 'm, M: ObstacleMap> {
    pub(super) pa: &'a mut PhysicsActor,
    pub(super) map: &'m M,
    pub(super) at: Contacts<'m, M::Obstacle>,
    pub(super) dt: f32,
}

type Rule<'a, 'm, M> = fn(&mut Step<'a, 'm, M>);

#[inline]
pub(super) fn nearly_zero(x: f32) -> bool {
    x.abs() < f32::EPSILON
}

/// `1` for zero and positive values, `-1` otherwise.
#[inline]
pub(super) fn sign(x: f32) -> f32 {
    if x >= 0.0 { 1.0 } else { -1.0 }
}

/// Identity, not equality: two probes landing on the same obstacle.
#[inline]
pub(super) fn same<O>(a: &O, b: &O) -> bool {
    std::ptr::eq(a, b)
}

impl<'a, 'm, M: ObstacleMap> Step<'a, 'm, M> {
    pub(crate) fn run(pa: &'a mut PhysicsActor, map: &'m M, dt: f32) {
        let before = pa.state;
        let mut step = Step {
            pa,
            map,
            at: Contacts::none(),
            dt,
        };

        step.refresh();
        step.pa.was_midair = step.pa.midair;

        if step.dead_or_drowned() {
            return;
        }

        let rules: [Rule<'a, 'm, M>; 27] = [
            // locomotion
            Self::getting_hit,
            Self::waiting,
            Self::winning,
            Self::horizontal_lock,
            Self::facing,
            Self::walking_and_running,
            Self::ducking_and_looking_up,
            Self::springing,
            Self::breathing,
            Self::ledge,
            Self::start_rolling,
            Self::rolling,
            Self::start_charging,
            Self::charging,
            Self::ground_speed,
            Self::airborne,
            Self::jumping,
            // collision
            Self::advance,
            Self::land_after_hit,
            Self::right_wall,
            Self::left_wall,
            Self::ceiling,
            Self::sticky,
            Self::stick_to_ground,
            Self::reacquire_ground,
            Self::fall_off,
            Self::settle,
        ];
        for rule in rules {
            rule(&mut step);
        }

        if step.pa.state != before {
            trace!("{:?} -> {:?}", before, step.pa.state);
        }
    }

    /* ---------------------------------------------------------------- */
    /* input                                                            */
    /* ---------------------------------------------------------------- */

    #[inline]
    pub(super) fn down(&self, button: Buttons) -> bool {
        self.pa.input.is_down(button)
    }

    #[inline]
    pub(super) fn pressed(&self, button: Buttons) -> bool {
        self.pa.input.was_pressed(button)
    }

    /* ---------------------------------------------------------------- */
    /* invariant-keeping mutators                                       */
    /* ---------------------------------------------------------------- */

    pub(super) fn move_to(&mut self, position: Vec2) {
        self.pa.position = position;
        self.refresh();
    }

    pub(super) fn force_angle(&mut self, angle: u8) {
        self.pa.angle = angle;
        self.update_mode();
        self.refresh();
    }

    pub(super) fn set_auto_angle(&mut self) {
        self.update_angle();
        self.update_mode();
        self.refresh();
    }

    fn update_mode(&mut self) {
        let pa = &mut *self.pa;
        let mode = movement_mode_of(pa.angle, pa.mode);
        if pa.mode == MovementMode::Ceiling && mode == MovementMode::Floor {
            pa.gsp = -pa.gsp;
        }
        pa.mode = mode;
    }

    /// Re-query the contact sensors and recompute `midair` and
    /// `touching_ceiling`.
    pub(super) fn refresh(&mut self) {
        let map = self.map;
        let pa = &mut *self.pa;

        // only look where we are heading
        let mut mask = SensorMask::empty();
        if !pa.midair {
            mask |= SensorMask::A | SensorMask::B;
            mask.set(SensorMask::M, pa.gsp < 0.0);
            mask.set(SensorMask::N, pa.gsp > 0.0);
        } else {
            mask.set(SensorMask::A | SensorMask::B, pa.ysp >= 0.0);
            mask.set(SensorMask::C | SensorMask::D, pa.ysp < 0.0);
            mask.set(SensorMask::M, pa.xsp < 0.0);
            mask.set(SensorMask::N, pa.xsp > 0.0);
        }
        pa.enabled = mask;

        let (pos, mode, layer) = (pa.position, pa.mode, pa.layer);
        let probe = |slot: Slot, flag: SensorMask| {
            if mask.contains(flag) {
                pa.sensor(slot).check(pos, mode, layer, map)
            } else {
                None
            }
        };
        let solid = |o: Option<&'m M::Obstacle>| o.filter(|o| o.is_solid());

        let mut a = probe(Slot::A, SensorMask::A);
        let mut b = probe(Slot::B, SensorMask::B);
        // ceilings and walls ignore clouds
        let c = solid(probe(Slot::C, SensorMask::C));
        let d = solid(probe(Slot::D, SensorMask::D));
        let m = solid(probe(Slot::M, SensorMask::M));
        let n = solid(probe(Slot::N, SensorMask::N));

        // so do the feet while moving mostly upwards
        if pa.ysp < 0.0 && -pa.ysp > pa.xsp.abs() {
            a = solid(a);
            b = solid(b);
        }

        // a cloud only counts if the tip of the foot is inside it, and
        // while falling onto flat ground, not too deep inside it
        let foot_on_cloud = |slot: Slot, o: Option<&'m M::Obstacle>| {
            let o = o?;
            if o.is_solid() {
                return Some(o);
            }
            let tail = pa.sensor(slot).tail(pos, mode);
            if !o.point_collision(tail.x, tail.y) {
                return None;
            }
            if pa.midair && mode == MovementMode::Floor && pa.angle == 0 {
                let ground = o.ground_position(tail.x, tail.y, GroundDir::Down);
                return (tail.y < ground + CLOUD_OFFSET).then_some(o);
            }
            Some(o)
        };
        a = foot_on_cloud(Slot::A, a);
        b = foot_on_cloud(Slot::B, b);

        // two different clouds under the feet: keep the higher one
        if let (Some(oa), Some(ob)) = (a, b) {
            if !same(oa, ob) && !oa.is_solid() && !ob.is_solid() && mode == MovementMode::Floor {
                let ta = pa.sensor(Slot::A).tail(pos, mode);
                let tb = pa.sensor(Slot::B).tail(pos, mode);
                let ga = oa.ground_position(ta.x, ta.y, GroundDir::Down);
                let gb = ob.ground_position(tb.x, tb.y, GroundDir::Down);
                if (ga - gb).abs() > 8 {
                    if ga < gb {
                        a = None;
                    } else {
                        b = None;
                    }
                }
            }
        }

        pa.midair = a.is_none() && b.is_none();
        pa.touching_ceiling = c.is_some() || d.is_some();
        self.at = Contacts { a, b, c, d, m, n };
    }
}
