use bitflags::bitflags;
use std::time::{Duration, Instant};
use tracing::trace;
use vlcd_common::Point;

bitflags! {
    /// Mouse buttons as carried in the mouse event's button byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ButtonMask: u8 {
        const LEFT    = 1 << 0;
        const RIGHT   = 1 << 1;
        const MIDDLE  = 1 << 2;
        const BACK    = 1 << 3;
        const FORWARD = 1 << 4;
        const EXTRA1  = 1 << 5;
        const EXTRA2  = 1 << 6;
    }
}

/// A physical mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Extra1,
    Extra2,
}

impl MouseButton {
    /// Bit for this button in a [`ButtonMask`].
    pub const fn mask(self) -> ButtonMask {
        match self {
            Self::Left => ButtonMask::LEFT,
            Self::Right => ButtonMask::RIGHT,
            Self::Middle => ButtonMask::MIDDLE,
            Self::Back => ButtonMask::BACK,
            Self::Forward => ButtonMask::FORWARD,
            Self::Extra1 => ButtonMask::EXTRA1,
            Self::Extra2 => ButtonMask::EXTRA2,
        }
    }
}

/// Rate limit for pointer position updates.
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    pub enabled: bool,
    pub min_interval_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval_ms: 20,
        }
    }
}

/// Shared mouse and touch pointer state.
///
/// Mouse and touch events report the same position. Touch is "down" while
/// the left button is held.
#[derive(Debug, Clone)]
pub struct PointerState {
    pub position: Point,
    pub buttons: ButtonMask,
    pub touch_down: bool,
    wheel: i8,
    config: ThrottleConfig,
    last_move_sent: Option<Instant>,
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerState {
    pub fn new() -> Self {
        Self::with_config(ThrottleConfig::default())
    }

    pub fn with_config(config: ThrottleConfig) -> Self {
        Self {
            position: Point::default(),
            buttons: ButtonMask::empty(),
            touch_down: false,
            wheel: 0,
            config,
            last_move_sent: None,
        }
    }

    /// Applies a button transition and returns the new mask.
    pub fn set_button(&mut self, button: MouseButton, pressed: bool) -> ButtonMask {
        self.buttons.set(button.mask(), pressed);
        self.buttons
    }

    /// Stores a new position. Returns true if a movement update is due.
    pub fn move_to(&mut self, position: Point, now: Instant) -> bool {
        self.position = position;
        self.should_send_movement(now)
    }

    /// Stores a wheel delta, saturated to the wire's `i8` range.
    pub fn set_wheel(&mut self, delta: i32) {
        self.wheel = delta.clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8;
    }

    /// Returns the pending wheel delta and clears it.
    pub fn take_wheel(&mut self) -> i8 {
        std::mem::take(&mut self.wheel)
    }

    pub fn wheel(&self) -> i8 {
        self.wheel
    }

    /// Makes the next movement bypass the throttle.
    pub fn force_next_movement(&mut self) {
        self.last_move_sent = None;
    }

    fn should_send_movement(&mut self, now: Instant) -> bool {
        if !self.config.enabled {
            return true;
        }

        let threshold = Duration::from_millis(self.config.min_interval_ms);
        let due = match self.last_move_sent {
            Some(last) => now.saturating_duration_since(last) > threshold,
            None => true,
        };

        if due {
            self.last_move_sent = Some(now);
        } else {
            trace!(x = self.position.x, y = self.position.y, "pointer move throttled");
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_mask_bits() {
        assert_eq!(MouseButton::Left.mask().bits(), 0x01);
        assert_eq!(MouseButton::Right.mask().bits(), 0x02);
        assert_eq!(MouseButton::Middle.mask().bits(), 0x04);
        assert_eq!(MouseButton::Extra2.mask().bits(), 0x40);
    }

    #[test]
    fn test_set_button() {
        let mut p = PointerState::new();
        assert_eq!(p.set_button(MouseButton::Left, true), ButtonMask::LEFT);
        assert_eq!(
            p.set_button(MouseButton::Back, true),
            ButtonMask::LEFT | ButtonMask::BACK
        );
        assert_eq!(p.set_button(MouseButton::Left, false), ButtonMask::BACK);
    }

    #[test]
    fn test_first_move_is_sent() {
        let mut p = PointerState::new();
        assert!(p.move_to(Point::new(1, 1), Instant::now()));
    }

    #[test]
    fn test_moves_within_interval_are_throttled() {
        let t0 = Instant::now();
        let mut p = PointerState::new();
        assert!(p.move_to(Point::new(1, 1), t0));
        assert!(!p.move_to(Point::new(2, 2), t0 + Duration::from_millis(10)));
        assert_eq!(p.position, Point::new(2, 2));
        assert!(!p.move_to(Point::new(3, 3), t0 + Duration::from_millis(20)));
        assert!(p.move_to(Point::new(4, 4), t0 + Duration::from_millis(21)));
    }

    #[test]
    fn test_throttle_disabled() {
        let t0 = Instant::now();
        let mut p = PointerState::with_config(ThrottleConfig {
            enabled: false,
            min_interval_ms: 20,
        });
        assert!(p.move_to(Point::new(1, 1), t0));
        assert!(p.move_to(Point::new(2, 2), t0));
    }

    #[test]
    fn test_force_next_movement() {
        let t0 = Instant::now();
        let mut p = PointerState::new();
        p.move_to(Point::new(1, 1), t0);
        p.force_next_movement();
        assert!(p.move_to(Point::new(2, 2), t0));
    }

    #[test]
    fn test_wheel_clamped_and_taken() {
        let mut p = PointerState::new();
        p.set_wheel(120);
        assert_eq!(p.take_wheel(), 120);
        assert_eq!(p.wheel(), 0);
        p.set_wheel(-240);
        assert_eq!(p.take_wheel(), -128);
        p.set_wheel(1000);
        assert_eq!(p.wheel(), 127);
    }
}
