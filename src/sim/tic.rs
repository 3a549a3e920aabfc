//! Fixed-step timing and the ECS runner that drives every actor.

use super::actor::PhysicsActor;
use crate::defs::TARGET_FPS;
use crate::world::ObstacleMap;
use glam::Vec2;
use hecs::{Entity, World};
use log::debug;
use std::time::Instant;

/// Duration of one simulated tick at the target rate.
pub const FIXED_TIMESTEP: f32 = 1.0 / TARGET_FPS;

/// Fixed-timestep accumulator.
///
/// Hands out [`FIXED_TIMESTEP`] while the real clock stays within one tick
/// of the simulated clock.  Once it falls further behind, the real delta is
/// used instead and the simulated clock catches up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FixedStep {
    reference_time: f32,
    fixed_time: f32,
}

impl FixedStep {
    /// Feed `dt` seconds of real time; returns the delta to simulate.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.reference_time += dt;
        if self.reference_time <= self.fixed_time + FIXED_TIMESTEP {
            self.fixed_time += FIXED_TIMESTEP;
            FIXED_TIMESTEP
        } else {
            self.fixed_time = self.reference_time;
            dt
        }
    }
}

/// Owns the ECS world of actors and drives their updates.
pub struct TicRunner {
    world: World,
    last: Instant,
}

impl Default for TicRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TicRunner {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            last: Instant::now(),
        }
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Spawn a fresh actor at `position` and return its handle.
    pub fn spawn_actor(&mut self, position: Vec2) -> Entity {
        self.spawn(PhysicsActor::new(position))
    }

    /// Spawn an already configured actor.
    pub fn spawn(&mut self, actor: PhysicsActor) -> Entity {
        let position = actor.position();
        let e = self.world.spawn((actor,));
        debug!("spawned actor {e:?} at {position}");
        e
    }

    /// Remove an actor.  Returns `false` if the handle was stale.
    pub fn despawn_actor(&mut self, entity: Entity) -> bool {
        let gone = self.world.despawn(entity).is_ok();
        if gone {
            debug!("despawned actor {entity:?}");
        }
        gone
    }

    pub fn actor(&self, entity: Entity) -> Option<hecs::Ref<'_, PhysicsActor>> {
        self.world.get::<&PhysicsActor>(entity).ok()
    }

    pub fn actor_mut(&mut self, entity: Entity) -> Option<hecs::RefMut<'_, PhysicsActor>> {
        self.world.get::<&mut PhysicsActor>(entity).ok()
    }

    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.world.len() == 0
    }

    /// Update every actor once with a frame delta of `dt` seconds.
    pub fn step<M: ObstacleMap>(&mut self, map: &M, dt: f32) {
        for (_, pa) in self.world.query_mut::<&mut PhysicsActor>() {
            pa.update(map, dt);
        }
    }

    /// Update every actor with the real time elapsed since the last pump.
    pub fn pump<M: ObstacleMap>(&mut self, map: &M) {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        self.step(map, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Brick, BrickMap};

    #[test]
    fn on_time_frames_use_the_fixed_step() {
        let mut clock = FixedStep::default();
        for _ in 0..10 {
            assert_eq!(clock.advance(FIXED_TIMESTEP), FIXED_TIMESTEP);
        }
        // slightly early frames still tick at the fixed rate
        assert_eq!(clock.advance(0.01), FIXED_TIMESTEP);
    }

    #[test]
    fn lagging_frames_use_the_real_delta() {
        let mut clock = FixedStep::default();
        assert_eq!(clock.advance(FIXED_TIMESTEP), FIXED_TIMESTEP);
        assert_eq!(clock.advance(0.1), 0.1);
        // resynchronised: the next on-time frame is fixed again
        assert_eq!(clock.advance(FIXED_TIMESTEP), FIXED_TIMESTEP);
    }

    #[test]
    fn spawn_step_despawn() {
        let map: BrickMap = [Brick::solid(0, 100, 400, 32)].into_iter().collect();
        let mut runner = TicRunner::new();
        let a = runner.spawn_actor(Vec2::new(50.0, 81.0));
        let b = runner.spawn_actor(Vec2::new(150.0, 40.0));
        assert_eq!(runner.len(), 2);

        runner.step(&map, FIXED_TIMESTEP);
        assert!(!runner.actor(a).unwrap().is_midair());
        assert!(runner.actor(b).unwrap().ysp() > 0.0);

        runner.actor_mut(b).unwrap().kill();
        assert!(runner.despawn_actor(b));
        assert!(!runner.despawn_actor(b));
        assert!(runner.actor(b).is_none());
        assert_eq!(runner.len(), 1);
    }
}
