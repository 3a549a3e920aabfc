//! Virtual controller owned by each physics actor.
//!
//! The actor both reads it (level and edge queries) and drives it (action
//! triggers, braking on the winning pose, horizontal lock).  Hosts press
//! buttons every frame they want them held: [`InputSource::end_frame`]
//! releases everything once a frame has been simulated.

use crate::defs::Buttons;

pub trait InputSource {
    fn is_down(&self, button: Buttons) -> bool;

    /// Pressed this frame but not the previous one.
    fn was_pressed(&self, button: Buttons) -> bool;

    fn simulate_down(&mut self, button: Buttons);
    fn simulate_up(&mut self, button: Buttons);

    /// Release every button and forget the previous frame.
    fn reset(&mut self);

    /// Report every button as up until [`InputSource::enable`].
    fn disable(&mut self);
    fn enable(&mut self);

    /// Close the frame: snapshot for edge detection, then release.
    fn end_frame(&mut self);
}

#[derive(Clone, Debug, Default)]
pub struct VirtualInput {
    down: Buttons,
    previous: Buttons,
    disabled: bool,
}

impl VirtualInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buttons currently held, ignoring the disabled flag.
    #[inline]
    pub fn buttons(&self) -> Buttons {
        self.down
    }
}

impl InputSource for VirtualInput {
    #[inline]
    fn is_down(&self, button: Buttons) -> bool {
        !self.disabled && self.down.contains(button)
    }

    #[inline]
    fn was_pressed(&self, button: Buttons) -> bool {
        !self.disabled && self.down.contains(button) && !self.previous.contains(button)
    }

    #[inline]
    fn simulate_down(&mut self, button: Buttons) {
        self.down.insert(button);
    }

    #[inline]
    fn simulate_up(&mut self, button: Buttons) {
        self.down.remove(button);
    }

    fn reset(&mut self) {
        self.down = Buttons::empty();
        self.previous = Buttons::empty();
    }

    fn disable(&mut self) {
        self.disabled = true;
    }

    fn enable(&mut self) {
        self.disabled = false;
    }

    fn end_frame(&mut self) {
        self.previous = self.down;
        self.down = Buttons::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_need_a_release_in_between() {
        let mut input = VirtualInput::new();
        input.simulate_down(Buttons::FIRE1);
        assert!(input.is_down(Buttons::FIRE1));
        assert!(input.was_pressed(Buttons::FIRE1));
        input.end_frame();

        // still held next frame: no new edge
        input.simulate_down(Buttons::FIRE1);
        assert!(input.is_down(Buttons::FIRE1));
        assert!(!input.was_pressed(Buttons::FIRE1));
        input.end_frame();

        // released for a frame, then pressed again
        input.end_frame();
        input.simulate_down(Buttons::FIRE1);
        assert!(input.was_pressed(Buttons::FIRE1));
    }

    #[test]
    fn disable_masks_until_enabled() {
        let mut input = VirtualInput::new();
        input.disable();
        input.simulate_down(Buttons::RIGHT);
        assert!(!input.is_down(Buttons::RIGHT));
        input.end_frame();
        input.simulate_down(Buttons::RIGHT);
        assert!(!input.is_down(Buttons::RIGHT));
        input.enable();
        assert!(input.is_down(Buttons::RIGHT));
    }

    #[test]
    fn reset_releases_everything() {
        let mut input = VirtualInput::new();
        input.simulate_down(Buttons::LEFT | Buttons::DOWN);
        input.reset();
        assert!(!input.is_down(Buttons::LEFT));
        assert_eq!(input.buttons(), Buttons::empty());
    }
}
