use bitflags::bitflags;

bitflags! {
    /// Virtual controller buttons read by the simulation.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        const UP    = 0x01;
        const DOWN  = 0x02;
        const LEFT  = 0x04;
        const RIGHT = 0x08;
        // Jump / action.
        const FIRE1 = 0x10;
    }
}

bitflags! {
    /// Which of the six contact sensors are queried this tick.
    ///
    /// Sensors are never mutated; the actor recomputes this mask every time
    /// it refreshes its contacts and skips the ones that are off.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SensorMask: u8 {
        const A = 0x01;
        const B = 0x02;
        const C = 0x04;
        const D = 0x08;
        const M = 0x10;
        const N = 0x20;
    }
}

impl Buttons {
    /// Parse one replay-script token such as `R`, `R+J` or `.`.
    pub fn from_token(token: &str) -> Option<Buttons> {
        if token == "." {
            return Some(Buttons::empty());
        }
        token.split('+').try_fold(Buttons::empty(), |acc, part| {
            let b = match part {
                "U" => Buttons::UP,
                "D" => Buttons::DOWN,
                "L" => Buttons::LEFT,
                "R" => Buttons::RIGHT,
                "J" => Buttons::FIRE1,
                _ => return None,
            };
            Some(acc | b)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_tokens() {
        assert_eq!(Buttons::from_token("."), Some(Buttons::empty()));
        assert_eq!(Buttons::from_token("R"), Some(Buttons::RIGHT));
        assert_eq!(
            Buttons::from_token("D+J"),
            Some(Buttons::DOWN | Buttons::FIRE1)
        );
        assert_eq!(Buttons::from_token("X"), None);
        assert_eq!(Buttons::from_token("R+"), None);
    }
}
