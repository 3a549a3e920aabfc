mod actor;
mod angle;
mod collision;
mod components;
mod input;
mod locomotion;
mod replay;
mod sensor;
mod step;
mod tic;


pub use actor::{PhysicsActor, SensorLine};
pub use components::{ActorSnapshot, Pose, Slot, State, movement_mode_of};
pub use input::{InputSource, VirtualInput};
pub use replay::{Replay, ReplayError};
pub use sensor::Sensor;
pub use tic::{FIXED_TIMESTEP, FixedStep, TicRunner};
