//! Recorded input sequences.
//!
//! A [`Replay`] is a spawn point, a frame delta and one [`Buttons`] bit
//! pattern per frame.  Since the simulation is deterministic, playing the
//! same replay over the same map always ends in the same snapshot.

use super::{actor::PhysicsActor, components::ActorSnapshot};
use crate::defs::Buttons;
use crate::world::ObstacleMap;
use bincode::{Decode, Encode, config};
use glam::Vec2;
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("encoding replay: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("decoding replay: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("replay I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad script token {token:?}")]
    BadScript { token: String },
}

#[derive(Clone, Debug, PartialEq, Encode, Decode)]
pub struct Replay {
    pub spawn: [f32; 2],
    pub dt: f32,
    pub frames: Vec<u8>,
}

impl Replay {
    pub fn new(spawn: Vec2, dt: f32) -> Self {
        Self {
            spawn: spawn.to_array(),
            dt,
            frames: Vec::new(),
        }
    }

    /// Build a replay from a whitespace separated script.
    ///
    /// Each token is a set of buttons (`L R U D J` joined by `+`, or `.` for
    /// none), optionally followed by `*N` to hold it for `N` frames:
    /// `"R*60 R+J D*10 .*30"`.
    pub fn from_script(spawn: Vec2, dt: f32, script: &str) -> Result<Self, ReplayError> {
        let mut replay = Self::new(spawn, dt);
        for token in script.split_whitespace() {
            let bad = || ReplayError::BadScript {
                token: token.to_owned(),
            };
            let (buttons, count) = match token.split_once('*') {
                Some((b, n)) => (b, n.parse::<usize>().map_err(|_| bad())?),
                None => (token, 1),
            };
            let buttons = Buttons::from_token(buttons).ok_or_else(bad)?;
            replay.frames.extend(std::iter::repeat_n(buttons.bits(), count));
        }
        Ok(replay)
    }

    #[inline]
    pub fn push(&mut self, buttons: Buttons) {
        self.frames.push(buttons.bits());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn spawn(&self) -> Vec2 {
        Vec2::from_array(self.spawn)
    }

    /// Buttons held on each frame.
    pub fn buttons(&self) -> impl Iterator<Item = Buttons> + '_ {
        self.frames.iter().map(|&b| Buttons::from_bits_truncate(b))
    }

    pub fn encode(&self) -> Result<Vec<u8>, ReplayError> {
        Ok(bincode::encode_to_vec(self, config::standard())?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ReplayError> {
        let (replay, _) = bincode::decode_from_slice(bytes, config::standard())?;
        Ok(replay)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        fs::write(path, self.encode()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        Self::decode(&fs::read(path)?)
    }

    /// Run a fresh actor through every frame and return where it ended up.
    pub fn play<M: ObstacleMap>(&self, map: &M) -> ActorSnapshot {
        self.play_with(PhysicsActor::new(self.spawn()), map, |_, _| {})
    }

    /// Like [`Replay::play`], but with a prepared actor and a callback after
    /// every frame.
    pub fn play_with<M, F>(&self, mut pa: PhysicsActor, map: &M, mut on_frame: F) -> ActorSnapshot
    where
        M: ObstacleMap,
        F: FnMut(usize, &PhysicsActor),
    {
        for (frame, buttons) in self.buttons().enumerate() {
            pa.press(buttons);
            pa.update(map, self.dt);
            on_frame(frame, &pa);
        }
        pa.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::FIXED_TIMESTEP;
    use crate::world::{Brick, BrickMap};

    #[test]
    fn script_expands_repeats() {
        let r = Replay::from_script(Vec2::ZERO, FIXED_TIMESTEP, "R*3 R+J .*2 D").unwrap();
        let frames: Vec<_> = r.buttons().collect();
        assert_eq!(
            frames,
            [
                Buttons::RIGHT,
                Buttons::RIGHT,
                Buttons::RIGHT,
                Buttons::RIGHT | Buttons::FIRE1,
                Buttons::empty(),
                Buttons::empty(),
                Buttons::DOWN,
            ]
        );
    }

    #[test]
    fn script_rejects_garbage() {
        for script in ["Q", "R*x", "R+", "L*"] {
            match Replay::from_script(Vec2::ZERO, FIXED_TIMESTEP, script) {
                Err(ReplayError::BadScript { token }) => assert_eq!(token, script),
                other => panic!("{script}: {other:?}"),
            }
        }
    }

    #[test]
    fn encoded_replay_decodes() {
        let r = Replay::from_script(Vec2::new(24.0, 80.0), FIXED_TIMESTEP, "R*60 J .*30").unwrap();
        let bytes = r.encode().unwrap();
        assert_eq!(Replay::decode(&bytes).unwrap(), r);
        assert!(Replay::decode(&bytes[..3]).is_err());
    }

    #[test]
    fn playback_is_deterministic() {
        let map: BrickMap = [
            Brick::solid(0, 100, 640, 32),
            Brick::solid(400, 36, 32, 64),
        ]
        .into_iter()
        .collect();
        let r = Replay::from_script(
            Vec2::new(50.0, 81.0),
            FIXED_TIMESTEP,
            "R*90 R+J R*40 L*20 D*5 .*60",
        )
        .unwrap();
        let decoded = Replay::decode(&r.encode().unwrap()).unwrap();
        assert_eq!(r.play(&map), decoded.play(&map));
    }
}
