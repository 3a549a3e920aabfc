//! Static definitions shared by the world and the simulation: the
//! byte-angle tables, button and sensor flag sets, and the tunables.

pub mod flags;
pub mod params;
pub mod trig;

pub use self::{
    flags::{Buttons, SensorMask},
    params::{Param, ParamError, TARGET_FPS, Tunables, airdrag_coefficients},
};
