use glam::Vec2;

use crate::world::MovementMode;

/// Locomotion state of a physics actor.  Exactly one holds at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum State {
    #[default]
    Stopped,
    Walking,
    Running,
    Jumping,
    Springing,
    Rolling,
    Charging,
    Pushing,
    GettingHit,
    Dead,
    Braking,
    Ledge,
    Drowned,
    Breathing,
    Waiting,
    Ducking,
    LookingUp,
    Winning,
}

impl State {
    /// States that make no sense while airborne.
    #[inline]
    pub fn is_grounded_only(self) -> bool {
        matches!(
            self,
            State::Pushing | State::Stopped | State::Waiting | State::Ducking | State::LookingUp
        )
    }

    /// States whose upward motion is intentional (no sticky reattachment).
    #[inline]
    pub fn is_launched(self) -> bool {
        matches!(
            self,
            State::Jumping | State::GettingHit | State::Springing | State::Drowned | State::Dead
        )
    }
}

/// Which of the three sensor sets is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pose {
    Standing,
    Airborne,
    Rolling,
}

impl Pose {
    pub const COUNT: usize = 3;

    /// Pure function of the locomotion state and the midair flag.
    #[inline]
    pub fn select(state: State, midair: bool) -> Pose {
        if matches!(state, State::Jumping | State::Rolling) {
            Pose::Rolling
        } else if midair || state == State::Springing {
            Pose::Airborne
        } else {
            Pose::Standing
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Sensor slot within a set.
///
/// ```text
///      U
///  C | | D
///  M -.- N
///  A | | B
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    A,
    B,
    C,
    D,
    M,
    N,
    U,
}

impl Slot {
    pub const ALL: [Slot; 7] = [Slot::A, Slot::B, Slot::C, Slot::D, Slot::M, Slot::N, Slot::U];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Movement mode for `angle`.  The four seam angles keep `prev`.
pub fn movement_mode_of(angle: u8, prev: MovementMode) -> MovementMode {
    match angle {
        0x00..=0x1F | 0xE1..=0xFF => MovementMode::Floor,
        0x21..=0x5F => MovementMode::LeftWall,
        0x61..=0x9F => MovementMode::Ceiling,
        0xA1..=0xDF => MovementMode::RightWall,
        _ => prev,
    }
}

/// Plain copy of everything observable about an actor, for comparisons
/// and traces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorSnapshot {
    pub position: Vec2,
    pub xsp: f32,
    pub ysp: f32,
    pub gsp: f32,
    pub angle: u8,
    pub mode: MovementMode,
    pub state: State,
    pub midair: bool,
    pub facing_right: bool,
    pub touching_ceiling: bool,
    pub inside_wall: bool,
}
