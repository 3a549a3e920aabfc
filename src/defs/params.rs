//! Tunable physics parameters.
//!
//! Every tunable is one `f32` field on [`Tunables`] and one variant of
//! [`Param`]; both are generated from the single table below so the
//! by-name and by-field views can never disagree.  Defaults are the
//! classic per-frame magic numbers scaled to per-second units at
//! [`TARGET_FPS`].

use std::collections::HashMap;

use once_cell::sync::Lazy;
use thiserror::Error;

/// Rate the default constants were tuned for, and the fixed step rate.
pub const TARGET_FPS: f32 = 60.0;
const FPS: f32 = TARGET_FPS;

/// Things that can go wrong when addressing tunables by name.
#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("unknown tunable `{0}`")]
    Unknown(String),

    #[error("expected `name=value`, got `{0}`")]
    Malformed(String),

    #[error("tunable `{name}` must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },
}

macro_rules! param_table {
    ($( $variant:ident => $field:ident = $default:expr, $doc:literal; )*) => {
        /// Name of one tunable.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum Param {
            $( #[doc = $doc] $variant, )*
        }

        impl Param {
            pub const ALL: &'static [Param] = &[ $( Param::$variant, )* ];

            /// Lower-case identifier used in configuration strings.
            pub fn name(self) -> &'static str {
                match self {
                    $( Param::$variant => stringify!($field), )*
                }
            }
        }

        /// The full set of tunables of one actor.
        #[derive(Clone, Debug, PartialEq)]
        pub struct Tunables {
            $( #[doc = $doc] pub $field: f32, )*
            /// Reduce the jump impulse when jumping uphill.  Off by default.
            pub jump_attenuation: bool,
        }

        impl Default for Tunables {
            fn default() -> Self {
                Self {
                    $( $field: $default, )*
                    jump_attenuation: false,
                }
            }
        }

        impl Tunables {
            #[inline]
            pub fn get(&self, param: Param) -> f32 {
                match param {
                    $( Param::$variant => self.$field, )*
                }
            }

            #[inline]
            fn slot_mut(&mut self, param: Param) -> &mut f32 {
                match param {
                    $( Param::$variant => &mut self.$field, )*
                }
            }
        }
    };
}

param_table! {
    Acc               => acc               = (3.0 / 64.0) * FPS * FPS,  "acceleration";
    Dec               => dec               = 0.5 * FPS * FPS,           "deceleration";
    Frc               => frc               = (3.0 / 64.0) * FPS * FPS,  "friction";
    CapSpeed          => capspeed          = 16.0 * FPS,                "cap speed";
    TopSpeed          => topspeed          = 6.0 * FPS,                 "top speed";
    TopYSpeed         => topyspeed         = 16.0 * FPS,                "top y speed";
    Air               => air               = (6.0 / 64.0) * FPS * FPS,  "air acceleration";
    AirDrag           => airdrag           = 31.0 / 32.0,               "air drag, in [0,1]";
    Jmp               => jmp               = -6.5 * FPS,                "initial jump velocity";
    JmpRel            => jmprel            = -4.0 * FPS,                "release jump velocity";
    DieJmp            => diejmp            = -7.0 * FPS,                "death jump velocity";
    HitJmp            => hitjmp            = -4.0 * FPS,                "get hit jump velocity";
    Grv               => grv               = (14.0 / 64.0) * FPS * FPS, "gravity";
    Slp               => slp               = (8.0 / 64.0) * FPS * FPS,  "slope factor";
    Chrg              => chrg              = 12.0 * FPS,                "charge-and-release max speed";
    RollFrc           => rollfrc           = (3.0 / 128.0) * FPS * FPS, "roll friction";
    RollDec           => rolldec           = (8.0 / 64.0) * FPS * FPS,  "roll deceleration";
    RollUphillSlp     => rolluphillslp     = (5.0 / 64.0) * FPS * FPS,  "roll uphill slope factor";
    RollDownhillSlp   => rolldownhillslp   = (20.0 / 64.0) * FPS * FPS, "roll downhill slope factor";
    RollThreshold     => rollthreshold     = 1.0 * FPS,                 "roll threshold";
    UnrollThreshold   => unrollthreshold   = 0.5 * FPS,                 "unroll threshold";
    WalkThreshold     => walkthreshold     = 0.5 * FPS,                 "walk threshold";
    FallOffThreshold  => falloffthreshold  = 2.5 * FPS,                 "fall off threshold";
    BrakingThreshold  => brakingthreshold  = 4.0 * FPS,                 "braking threshold";
    AirDragThreshold  => airdragthreshold  = -4.0 * FPS,                "air drag y-threshold";
    AirDragXThreshold => airdragxthreshold = (8.0 / 64.0) * FPS,        "air drag x-threshold";
    ChrgThreshold     => chrgthreshold     = 1.0 / 64.0,                "charge intensity threshold";
    WaitTime          => waittime          = 3.0,                       "idle time before waiting, in seconds";
}

static BY_NAME: Lazy<HashMap<&'static str, Param>> =
    Lazy::new(|| Param::ALL.iter().map(|&p| (p.name(), p)).collect());

impl Param {
    pub fn from_name(name: &str) -> Result<Param, ParamError> {
        BY_NAME
            .get(name.trim())
            .copied()
            .ok_or_else(|| ParamError::Unknown(name.trim().to_string()))
    }

    /// Parse a `name=value` assignment, e.g. `topspeed=400`.
    pub fn parse_assignment(text: &str) -> Result<(Param, f32), ParamError> {
        let (name, value) = text
            .split_once('=')
            .ok_or_else(|| ParamError::Malformed(text.to_string()))?;
        let param = Param::from_name(name)?;
        let value: f32 = value
            .trim()
            .parse()
            .map_err(|_| ParamError::Malformed(text.to_string()))?;
        Ok((param, value))
    }
}

impl Tunables {
    /// Store `value`; non-finite values are refused.  Air drag is clamped
    /// into `[0, 1]`.
    pub fn set(&mut self, param: Param, value: f32) -> Result<(), ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NotFinite {
                name: param.name(),
                value,
            });
        }
        *self.slot_mut(param) = match param {
            Param::AirDrag => value.clamp(0.0, 1.0),
            _ => value,
        };
        Ok(())
    }
}

/// Linear approximation `c0 * dt + c1` of the per-frame air drag
/// `airdrag.powf(60 * dt)`, exact at `dt = 1/60`.
pub fn airdrag_coefficients(airdrag: f32) -> [f32; 2] {
    let d = airdrag.clamp(0.0, 1.0);
    if d > 0.0 && d < 1.0 {
        [FPS * d * d.ln(), d * (1.0 - d.ln())]
    } else if d > 0.0 {
        [0.0, 1.0] // no drag
    } else {
        [0.0, 0.0] // full stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_param_round_trips_by_name() {
        assert_eq!(Param::ALL.len(), 28);
        for &p in Param::ALL {
            assert_eq!(Param::from_name(p.name()), Ok(p));
        }
        assert_eq!(
            Param::from_name("warpspeed"),
            Err(ParamError::Unknown("warpspeed".into()))
        );
    }

    #[test]
    fn defaults_match_the_pinned_table() {
        let t = Tunables::default();
        assert_eq!(t.topspeed, 360.0);
        assert_eq!(t.acc, 168.75);
        assert_eq!(t.jmp, -390.0);
        assert_eq!(t.grv, 787.5);
        assert_eq!(t.waittime, 3.0);
        assert!(!t.jump_attenuation);
    }

    #[test]
    fn set_and_get_by_param() {
        let mut t = Tunables::default();
        t.set(Param::TopSpeed, 400.0).unwrap();
        assert_eq!(t.get(Param::TopSpeed), 400.0);
        assert_eq!(t.topspeed, 400.0);

        t.set(Param::AirDrag, 1.7).unwrap();
        assert_eq!(t.airdrag, 1.0);
        t.set(Param::AirDrag, -3.0).unwrap();
        assert_eq!(t.airdrag, 0.0);

        assert!(matches!(
            t.set(Param::Grv, f32::NAN),
            Err(ParamError::NotFinite { name: "grv", .. })
        ));
    }

    #[test]
    fn parse_assignments() {
        assert_eq!(
            Param::parse_assignment("topspeed = 400"),
            Ok((Param::TopSpeed, 400.0))
        );
        assert_eq!(
            Param::parse_assignment("topspeed"),
            Err(ParamError::Malformed("topspeed".into()))
        );
        assert_eq!(
            Param::parse_assignment("jmp=high"),
            Err(ParamError::Malformed("jmp=high".into()))
        );
    }

    #[test]
    fn airdrag_coefficients_degenerate_cases() {
        assert_eq!(airdrag_coefficients(1.0), [0.0, 1.0]);
        assert_eq!(airdrag_coefficients(0.0), [0.0, 0.0]);

        let d = 31.0 / 32.0;
        let [c0, c1] = airdrag_coefficients(d);
        // one frame at the target rate applies exactly one drag factor
        assert!((c0 / FPS + c1 - d).abs() < 1e-5);
    }
}
