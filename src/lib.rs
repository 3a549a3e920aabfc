//! Deterministic character physics for 2D platformers.
//!
//! * [`defs`]  – angle tables, button flags, tunables.
//! * [`world`] – obstacles, collision masks, the brick grid and ASCII levels.
//! * [`sim`]   – the sensor-driven physics actor, its input, the fixed-step
//!   driver and replays.

pub mod defs;
pub mod logging;
pub mod sim;
pub mod world;
