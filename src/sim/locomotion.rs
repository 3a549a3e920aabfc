//! Locomotion rules: everything that turns input and slopes into speed and
//! state, before the actor is moved.  Listed in evaluation order.

use glam::Vec2;

use crate::defs::{Buttons, trig};
use crate::world::{MovementMode, ObstacleMap};

use super::{
    components::{Slot, State},
    step::{Step, nearly_zero, sign},
};

/// Ground speed under which the winning pose stops steering.
const WINNING_BRAKE_THRESHOLD: f32 = 60.0;

/// Jump lock imposed after releasing a charge, in seconds.
const CHARGE_RELEASE_JUMP_LOCK: f32 = 0.09375;

/// Per-second multiplicative decay of an idle charge, linearised as
/// `DECAY.0 - DECAY.1 * dt` (0.96875 per frame at 60 Hz).
const CHARGE_DECAY: (f32, f32) = (0.999506551, 1.84539309);

impl<M: ObstacleMap> Step<'_, '_, M> {
    #[inline]
    pub(super) fn walking_or_running(&self) -> State {
        if self.pa.gsp.abs() >= self.pa.cfg.topspeed {
            State::Running
        } else {
            State::Walking
        }
    }

    /// Dead and drowned actors only fall.  Returns `true` when the rest of
    /// the tick must be skipped.
    pub(super) fn dead_or_drowned(&mut self) -> bool {
        if !matches!(self.pa.state, State::Dead | State::Drowned) {
            return false;
        }
        let pa = &mut *self.pa;
        pa.ysp = (pa.ysp + pa.cfg.grv * self.dt).min(pa.cfg.topyspeed);
        pa.facing_right = true;
        let next = pa.position + Vec2::new(0.0, pa.ysp * self.dt);
        self.move_to(next);
        true
    }

    pub(super) fn getting_hit(&mut self) {
        let pa = &mut *self.pa;
        if pa.state == State::GettingHit {
            pa.input.reset();
            if !nearly_zero(pa.xsp) {
                pa.facing_right = pa.xsp < 0.0;
            }
        }
    }

    pub(super) fn waiting(&mut self) {
        let pa = &mut *self.pa;
        if pa.state == State::Stopped {
            pa.wait_timer += self.dt;
            if pa.wait_timer >= pa.cfg.waittime {
                pa.state = State::Waiting;
            }
        } else {
            pa.wait_timer = 0.0;
        }
    }

    /// Brake to a halt on level clear and strike the pose.
    pub(super) fn winning(&mut self) {
        let pa = &mut *self.pa;
        if !pa.winning_pose {
            return;
        }

        pa.input.reset();
        let cap = 0.67 * pa.cfg.capspeed;
        pa.gsp = pa.gsp.clamp(-cap, cap);
        if pa.state == State::Rolling {
            pa.state = State::Braking;
        }

        if pa.gsp > WINNING_BRAKE_THRESHOLD {
            pa.input.simulate_down(Buttons::LEFT);
        } else if pa.gsp < -WINNING_BRAKE_THRESHOLD {
            pa.input.simulate_down(Buttons::RIGHT);
        } else {
            pa.input.disable();
        }

        if !pa.midair && pa.gsp.abs() < pa.cfg.walkthreshold {
            pa.state = State::Winning;
        }
    }

    pub(super) fn horizontal_lock(&mut self) {
        let pa = &mut *self.pa;
        if pa.hlock_timer <= 0.0 {
            return;
        }

        pa.hlock_timer = (pa.hlock_timer - self.dt).max(0.0);
        pa.input.simulate_up(Buttons::LEFT);
        pa.input.simulate_up(Buttons::RIGHT);

        if !pa.midair && !nearly_zero(pa.gsp) {
            pa.facing_right = pa.gsp > 0.0;
        } else if pa.midair && !nearly_zero(pa.xsp) {
            pa.facing_right = pa.xsp > 0.0;
        }
    }

    pub(super) fn facing(&mut self) {
        if self.pa.state == State::Rolling || (nearly_zero(self.pa.gsp) && nearly_zero(self.pa.xsp)) {
            return;
        }
        let (gsp, midair) = (self.pa.gsp, self.pa.midair);
        if (gsp > 0.0 || midair) && self.down(Buttons::RIGHT) {
            self.pa.facing_right = true;
        } else if (gsp < 0.0 || midair) && self.down(Buttons::LEFT) {
            self.pa.facing_right = false;
        }
    }

    pub(super) fn walking_and_running(&mut self) {
        if self.pa.midair || matches!(self.pa.state, State::Rolling | State::Charging) {
            return;
        }

        let (left, right) = (self.down(Buttons::LEFT), self.down(Buttons::RIGHT));
        let dt = self.dt;
        let pa = &mut *self.pa;
        let cfg = &pa.cfg;
        let sin = trig::sin(pa.angle);

        // slope factor
        if pa.gsp.abs() >= cfg.walkthreshold || sin.abs() >= 0.707 {
            pa.gsp += cfg.slp * -sin * dt;
        }

        // acceleration
        if right && !left && pa.gsp >= 0.0 {
            if pa.gsp < cfg.topspeed {
                pa.gsp += cfg.acc * dt;
                if pa.gsp >= cfg.topspeed {
                    pa.gsp = cfg.topspeed;
                    pa.state = State::Running;
                } else if !(pa.state == State::Pushing && pa.facing_right) {
                    pa.state = State::Walking;
                }
            }
        } else if left && !right && pa.gsp <= 0.0 && pa.gsp > -cfg.topspeed {
            pa.gsp -= cfg.acc * dt;
            if pa.gsp <= -cfg.topspeed {
                pa.gsp = -cfg.topspeed;
                pa.state = State::Running;
            } else if !(pa.state == State::Pushing && !pa.facing_right) {
                pa.state = State::Walking;
            }
        }

        // deceleration
        let opposing = if right && pa.gsp < 0.0 {
            Some(1.0)
        } else if left && pa.gsp > 0.0 {
            Some(-1.0)
        } else {
            None
        };
        if let Some(dir) = opposing {
            pa.gsp += dir * cfg.dec * dt;
            if pa.gsp * dir >= 0.0 {
                pa.gsp = 0.0;
                pa.state = State::Stopped;
            } else if pa.gsp.abs() >= cfg.brakingthreshold && pa.mode == MovementMode::Floor {
                pa.state = State::Braking;
            }
        }

        if pa.state == State::Braking {
            let brk = cfg.frc * (1.5 + 3.0 * sin.abs());
            if pa.gsp.abs() <= brk * dt {
                pa.gsp = 0.0;
                pa.state = State::Stopped;
            } else {
                pa.gsp -= brk * sign(pa.gsp) * dt;
            }
        } else if !left && !right {
            // friction; idle poses are kept
            if pa.gsp.abs() <= cfg.frc * dt {
                pa.gsp = 0.0;
                if !matches!(pa.state, State::Waiting | State::Winning) {
                    pa.state = State::Stopped;
                }
            } else {
                pa.gsp -= cfg.frc * sign(pa.gsp) * dt;
            }
        }

        // settle the animation state
        if pa.gsp.abs() < cfg.walkthreshold {
            if pa.state == State::Pushing && !left && !right {
                pa.state = State::Stopped;
            } else if matches!(pa.state, State::Pushing | State::LookingUp | State::Ducking) {
                // keep
            } else if left || right {
                pa.state = if left && right {
                    State::Stopped
                } else {
                    State::Walking
                };
            } else if !matches!(pa.state, State::Waiting | State::Winning) {
                pa.state = State::Stopped;
            } else if pa.state == State::Waiting && !nearly_zero(pa.gsp) {
                pa.state = State::Walking;
            }
        } else if matches!(
            pa.state,
            State::Stopped
                | State::Waiting
                | State::Ledge
                | State::Walking
                | State::Running
                | State::Ducking
                | State::LookingUp
        ) {
            pa.state = if pa.gsp.abs() >= cfg.topspeed {
                State::Running
            } else {
                State::Walking
            };
        } else if pa.state == State::Pushing {
            pa.state = State::Walking;
        }
    }

    pub(super) fn ducking_and_looking_up(&mut self) {
        let pa = &*self.pa;
        if pa.midair
            || matches!(pa.state, State::Pushing | State::Rolling | State::Charging)
            || !nearly_zero(pa.gsp)
        {
            return;
        }
        if self.down(Buttons::DOWN) {
            self.pa.state = State::Ducking;
        } else if self.down(Buttons::UP) {
            self.pa.state = State::LookingUp;
        }
    }

    pub(super) fn springing(&mut self) {
        let pa = &mut *self.pa;
        if pa.state == State::Springing && pa.midair && pa.ysp > 0.0 {
            pa.state = State::Walking;
        }
    }

    pub(super) fn breathing(&mut self) {
        let pa = &mut *self.pa;
        if pa.breathe_timer > 0.0 {
            pa.breathe_timer -= self.dt;
            pa.state = State::Breathing;
        } else if pa.state == State::Breathing && pa.midair {
            pa.breathe_timer = 0.0;
            pa.state = State::Walking;
        }
    }

    /// Balance on a ledge when only one foot has support and there is
    /// nothing below the actor's centre either.
    pub(super) fn ledge(&mut self) {
        let pa = &*self.pa;
        if pa.midair
            || pa.mode != MovementMode::Floor
            || !nearly_zero(pa.gsp)
            || matches!(pa.state, State::Ledge | State::Pushing)
        {
            return;
        }

        let facing_right = match (self.at.a.is_some(), self.at.b.is_some()) {
            (true, false) => true,
            (false, true) => false,
            _ => return,
        };
        let foot = if facing_right { Slot::A } else { Slot::B };
        let x = pa.position.x as i32;
        let y = pa.position.y as i32 + pa.sensor(foot).y2() + 8;
        if self
            .map
            .best_obstacle_at(x, y, x, y, pa.mode, pa.layer)
            .is_none()
        {
            self.pa.state = State::Ledge;
            self.pa.facing_right = facing_right;
        }
    }

    pub(super) fn start_rolling(&mut self) {
        let pa = &*self.pa;
        if !pa.midair
            && matches!(pa.state, State::Walking | State::Running)
            && pa.gsp.abs() >= pa.cfg.rollthreshold
            && self.down(Buttons::DOWN)
        {
            self.pa.state = State::Rolling;
        }
    }

    pub(super) fn rolling(&mut self) {
        if self.pa.midair || self.pa.state != State::Rolling {
            return;
        }

        let (left, right) = (self.down(Buttons::LEFT), self.down(Buttons::RIGHT));
        let dt = self.dt;
        let pa = &mut *self.pa;
        let cfg = &pa.cfg;
        let sin = trig::sin(pa.angle);

        // slope factor
        let slope = if pa.gsp * sin >= 0.0 {
            cfg.rolluphillslp
        } else {
            cfg.rolldownhillslp
        };
        pa.gsp += slope * -sin * dt;

        // deceleration
        if right && pa.gsp < 0.0 {
            pa.gsp = (pa.gsp + cfg.rolldec * dt).min(0.0);
        } else if left && pa.gsp > 0.0 {
            pa.gsp = (pa.gsp - cfg.rolldec * dt).max(0.0);
        }

        // friction
        if pa.gsp.abs() > cfg.rollfrc * dt {
            pa.gsp -= cfg.rollfrc * sign(pa.gsp) * dt;
        } else {
            pa.gsp = 0.0;
        }

        if pa.gsp.abs() < cfg.unrollthreshold {
            pa.state = State::Stopped;
        }

        if !nearly_zero(pa.gsp) {
            pa.facing_right = pa.gsp > 0.0;
        }
    }

    pub(super) fn start_charging(&mut self) {
        if self.pa.state == State::Ducking
            && self.down(Buttons::DOWN)
            && self.pressed(Buttons::FIRE1)
            && !nearly_zero(self.pa.cfg.chrg)
        {
            self.pa.state = State::Charging;
        }
    }

    pub(super) fn charging(&mut self) {
        if self.pa.state != State::Charging {
            return;
        }

        let (pressed, holding) = (self.pressed(Buttons::FIRE1), self.down(Buttons::DOWN));
        let dt = self.dt;
        let pa = &mut *self.pa;

        if pressed {
            pa.charge_intensity = (pa.charge_intensity + 0.25).min(1.0);
        } else if pa.charge_intensity.abs() >= pa.cfg.chrgthreshold {
            pa.charge_intensity *= CHARGE_DECAY.0 - CHARGE_DECAY.1 * dt;
        }

        if holding {
            pa.gsp = 0.0;
            return;
        }

        // release
        let dir = if pa.facing_right { 1.0 } else { -1.0 };
        pa.gsp = dir * pa.cfg.chrg * (0.67 + pa.charge_intensity * 0.33);
        pa.state = State::Rolling;
        pa.charge_intensity = 0.0;
        pa.jump_lock_timer = CHARGE_RELEASE_JUMP_LOCK;
    }

    /// Project ground speed onto the surface.
    pub(super) fn ground_speed(&mut self) {
        let pa = &mut *self.pa;
        if pa.midair {
            return;
        }
        pa.gsp = pa.gsp.clamp(-pa.cfg.capspeed, pa.cfg.capspeed);
        pa.xsp = pa.gsp * trig::cos(pa.angle);
        pa.ysp = pa.gsp * -trig::sin(pa.angle);
    }

    /// Air control, air drag and gravity.
    pub(super) fn airborne(&mut self) {
        if !self.pa.midair {
            return;
        }

        let (left, right) = (self.down(Buttons::LEFT), self.down(Buttons::RIGHT));
        let dt = self.dt;
        let pa = &mut *self.pa;
        let cfg = &pa.cfg;

        if right && !left && pa.xsp < cfg.topspeed {
            pa.xsp = (pa.xsp + cfg.air * dt).min(cfg.topspeed);
        }
        if left && !right && pa.xsp > -cfg.topspeed {
            pa.xsp = (pa.xsp - cfg.air * dt).max(-cfg.topspeed);
        }

        if pa.state != State::GettingHit
            && pa.ysp < 0.0
            && pa.ysp > cfg.airdragthreshold
            && pa.xsp.abs() >= cfg.airdragxthreshold
        {
            let [c0, c1] = pa.airdrag_coefficients;
            pa.xsp *= c0 * dt + c1;
        }

        let grv = if pa.state == State::GettingHit {
            cfg.grv / 7.0 * 6.0
        } else {
            cfg.grv
        };
        pa.ysp = (pa.ysp + grv * dt).min(cfg.topyspeed);
    }

    pub(super) fn jumping(&mut self) {
        if self.pa.midair {
            // variable jump height
            if self.pa.state == State::Jumping
                && !self.down(Buttons::FIRE1)
                && self.pa.ysp < self.pa.cfg.jmprel
            {
                self.pa.ysp = self.pa.cfg.jmprel;
            }
            return;
        }

        self.pa.jump_lock_timer -= self.dt;
        if self.pa.jump_lock_timer > 0.0 {
            return;
        }
        self.pa.jump_lock_timer = 0.0;

        let wants = self.pressed(Buttons::FIRE1)
            && ((!self.down(Buttons::UP) && !self.down(Buttons::DOWN))
                || self.pa.state == State::Rolling)
            && !self.pa.touching_ceiling;
        if !wants {
            return;
        }

        let pa = &mut *self.pa;
        let (sin, cos) = (trig::sin(pa.angle), trig::cos(pa.angle));
        // optionally jump lower when running uphill
        let attenuation = if !pa.cfg.jump_attenuation || pa.gsp * sin < 0.0 {
            1.0
        } else {
            0.5
        };
        pa.xsp = pa.cfg.jmp * sin + pa.gsp * cos;
        pa.ysp = pa.cfg.jmp * cos - pa.gsp * sin * attenuation;
        pa.gsp = 0.0;
        pa.state = State::Jumping;
        self.force_angle(0x00);
    }
}
