//! Ground angle acquisition.
//!
//! Two probes are cast along the surface normal, one on each side of the
//! actor.  Once both find ground, the obstacle surfaces under them give a
//! displacement that the slope table turns into an angle byte.  The probes
//! start wide and move inwards two pixels at a time until the answer looks
//! trustworthy.

use glam::Vec2;

use crate::defs::trig::{self, SLOPE_LIMIT};
use crate::world::{GroundDir, MovementMode, Obstacle, ObstacleMap};

use super::{
    components::Slot,
    step::{CLOUD_OFFSET, Step, same},
};

/// A new angle this far from the old one needs another, narrower pass.
const ANGULAR_TOLERANCE: u8 = 0x14;

/// Within one pass, probes on different obstacles must agree this well.
const SEAM_TOLERANCE: u8 = 0x25;

impl<M: ObstacleMap> Step<'_, '_, M> {
    /// Recompute `pa.angle` from the ground under the actor.  Keeps the
    /// previous angle when nothing trustworthy is found.
    pub(super) fn update_angle(&mut self) {
        let sensor = *self.pa.sensor(Slot::A);
        let sensor_height = sensor.y2() - sensor.y1();
        let search_base = sensor.y2() - 1;
        let max_iterations = sensor_height * 3;

        // the standing set keeps the spacing stable across poses
        let half_dist = (1 - self.pa.standing_sensor(Slot::A).x1()) / 2;
        let mut hoff = half_dist + (1 - half_dist % 2); // odd
        let min_hoff = if self.pa.was_midair { 3 } else { 1 };
        let max_delta = (hoff * 2).min(SLOPE_LIMIT);
        let current = self.pa.angle;

        loop {
            self.pa.angle = current;
            let (dx, dy) = self.angle_pass(hoff, search_base, max_iterations);
            hoff -= 2;

            let unsettled = dx.abs() > max_delta
                || dy.abs() > max_delta
                || trig::delta_angle(self.pa.angle, current) > ANGULAR_TOLERANCE;
            let walled_in = self.at.m.is_some() || self.at.n.is_some();
            if hoff < min_hoff || walled_in || !unsettled {
                break;
            }
        }
    }

    /// Does `(x, y)` hit ground we may stand on?  Clouds qualify only near
    /// their surface.
    fn probe_hits(&self, x: i32, y: i32) -> bool {
        let (pa, map) = (&*self.pa, self.map);
        let Some(gnd) = map.best_obstacle_at(x, y, x, y, pa.mode, pa.layer) else {
            return false;
        };
        gnd.is_solid()
            || match pa.mode {
                MovementMode::Floor => y < gnd.ground_position(x, y, GroundDir::Down) + CLOUD_OFFSET,
                MovementMode::Ceiling => y > gnd.ground_position(x, y, GroundDir::Up) - CLOUD_OFFSET,
                MovementMode::LeftWall => x > gnd.ground_position(x, y, GroundDir::Left) - CLOUD_OFFSET,
                MovementMode::RightWall => {
                    x < gnd.ground_position(x, y, GroundDir::Right) + CLOUD_OFFSET
                }
            }
    }

    /// One pass at half-spacing `hoff`.  Updates the angle when accepted and
    /// returns the measured `(dx, dy)`, or zeros.
    fn angle_pass(&mut self, hoff: i32, search_base: i32, max_iterations: i32) -> (i32, i32) {
        let (s, c) = (trig::sin(self.pa.angle), trig::cos(self.pa.angle));
        let hoff = hoff as f32;
        let (mut found_a, mut found_b) = (false, false);
        let (mut xa, mut ya, mut xb, mut yb) = (0, 0, 0, 0);

        let mut i = 0;
        while i < max_iterations && !(found_a && found_b) {
            let h = (search_base + i) as f32;
            let x = (self.pa.position.x + h * s + 0.5) as i32;
            let y = (self.pa.position.y + h * c + 0.5) as i32;
            if !found_a {
                xa = (x as f32 - hoff * c) as i32;
                ya = (y as f32 + hoff * s) as i32;
                found_a = self.probe_hits(xa, ya);
            }
            if !found_b {
                xb = (x as f32 + hoff * c) as i32;
                yb = (y as f32 - hoff * s) as i32;
                found_b = self.probe_hits(xb, yb);
            }
            i += 1;
        }

        self.pa.angle_sensors = [self.pa.position; 2];
        if !(found_a && found_b) {
            return (0, 0);
        }

        let (mode, layer) = (self.pa.mode, self.pa.layer);
        let ga = self.map.best_obstacle_at(xa, ya, xa, ya, mode, layer);
        let gb = self.map.best_obstacle_at(xb, yb, xb, yb, mode, layer);
        let (Some(ga), Some(gb)) = (ga, gb) else {
            return (0, 0);
        };

        match mode {
            MovementMode::Floor => {
                ya = ga.ground_position(xa, ya, GroundDir::Down);
                yb = gb.ground_position(xb, yb, GroundDir::Down);
            }
            MovementMode::LeftWall => {
                xa = ga.ground_position(xa, ya, GroundDir::Left);
                xb = gb.ground_position(xb, yb, GroundDir::Left);
            }
            MovementMode::Ceiling => {
                ya = ga.ground_position(xa, ya, GroundDir::Up);
                yb = gb.ground_position(xb, yb, GroundDir::Up);
            }
            MovementMode::RightWall => {
                xa = ga.ground_position(xa, ya, GroundDir::Right);
                xb = gb.ground_position(xb, yb, GroundDir::Right);
            }
        }

        let (dx, dy) = (xb - xa, yb - ya);
        if dx == 0 && dy == 0 {
            return (0, 0);
        }

        let angle = trig::slope(dy, dx);
        if same(ga, gb) || trig::delta_angle(angle, self.pa.angle) <= SEAM_TOLERANCE {
            self.pa.angle = angle;
            self.pa.angle_sensors = [
                Vec2::new(xa as f32, ya as f32),
                Vec2::new(xb as f32, yb as f32),
            ];
            (dx, dy)
        } else {
            (0, 0)
        }
    }
}
