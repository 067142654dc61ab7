//! vlcd-input: Map host input to outbound device events
//!
//! This crate provides [`InputDispatcher`], which tracks pointer, encoder and
//! keyboard state and turns host input into [`InputEvent`]s for the device.
//! Each event class is gated by the input-device mask from the device's latest
//! init command.

mod keyboard;
mod mouse;
mod rotary;

use std::time::Instant;
use tracing::debug;
use vlcd_common::{InputDeviceMask, Point};
use vlcd_protocol::InputEvent;

pub use keyboard::{ascii_of, KeyInput};
pub use mouse::{ButtonMask, MouseButton, PointerState, ThrottleConfig};
pub use rotary::EncoderState;

/// Stateful translator from host input to device events.
#[derive(Debug, Clone)]
pub struct InputDispatcher {
    devices: InputDeviceMask,
    pointer: PointerState,
    encoder: EncoderState,
}

impl Default for InputDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::with_throttle(ThrottleConfig::default())
    }

    pub fn with_throttle(config: ThrottleConfig) -> Self {
        Self {
            devices: InputDeviceMask::default(),
            pointer: PointerState::with_config(config),
            encoder: EncoderState::new(),
        }
    }

    /// Updates the enabled device classes.
    pub fn set_device_mask(&mut self, devices: InputDeviceMask) {
        self.devices = devices;
    }

    pub fn device_mask(&self) -> InputDeviceMask {
        self.devices
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn encoder(&self) -> &EncoderState {
        &self.encoder
    }

    fn enabled(&self, class: InputDeviceMask) -> bool {
        self.devices.contains(class)
    }

    /// Passes `event` through when its device class is enabled.
    fn gate(&self, event: InputEvent) -> Option<InputEvent> {
        match event.device() {
            Some(class) if !self.enabled(class) => {
                debug!(kind = event.kind(), "device class disabled, event dropped");
                None
            }
            _ => Some(event),
        }
    }

    fn mouse_event(&self, wheel: i8) -> InputEvent {
        InputEvent::Mouse {
            x: self.pointer.position.x,
            y: self.pointer.position.y,
            wheel,
            buttons: self.pointer.buttons.bits(),
        }
    }

    fn touch_event(&self) -> InputEvent {
        InputEvent::Touch {
            x: self.pointer.position.x,
            y: self.pointer.position.y,
            down: self.pointer.touch_down,
        }
    }

    /// Mouse button press or release at `position`. Never throttled.
    ///
    /// The left button doubles as the touch contact: it is reported as touch
    /// while touch is enabled, or while a touch is still down.
    pub fn mouse_button(
        &mut self,
        button: MouseButton,
        pressed: bool,
        position: Point,
    ) -> Vec<InputEvent> {
        let mut out = Vec::new();
        self.pointer.set_button(button, pressed);
        self.pointer.position = position;

        out.extend(self.gate(self.mouse_event(0)));
        if (self.enabled(InputDeviceMask::TOUCH) || self.pointer.touch_down)
            && button == MouseButton::Left
        {
            self.pointer.touch_down = pressed;
            out.push(self.touch_event());
        }
        out
    }

    /// Pointer movement, rate limited by the throttle configuration.
    pub fn mouse_move(&mut self, position: Point, now: Instant) -> Vec<InputEvent> {
        let mut out = Vec::new();
        if !self.pointer.move_to(position, now) {
            return out;
        }
        out.extend(self.gate(self.mouse_event(0)));
        if self.pointer.touch_down {
            out.extend(self.gate(self.touch_event()));
        }
        out
    }

    /// Wheel rotation, sent as one mouse event carrying the clamped delta.
    pub fn mouse_wheel(&mut self, delta: i32) -> Vec<InputEvent> {
        self.pointer.set_wheel(delta);
        let wheel = self.pointer.take_wheel();
        self.gate(self.mouse_event(wheel)).into_iter().collect()
    }

    /// Encoder push button.
    pub fn encoder_press(&mut self, pressed: bool) -> Vec<InputEvent> {
        self.encoder.pressed = pressed;
        self.gate(InputEvent::Encoder { delta: 0, pressed })
            .into_iter()
            .collect()
    }

    /// Encoder rotation, sent with the clamped delta.
    pub fn encoder_rotate(&mut self, delta: i32) -> Vec<InputEvent> {
        self.encoder.set_delta(delta);
        let event = InputEvent::Encoder {
            delta: self.encoder.take_delta(),
            pressed: self.encoder.pressed,
        };
        self.gate(event).into_iter().collect()
    }

    /// Keyboard transition.
    pub fn key(&mut self, key: &KeyInput) -> Vec<InputEvent> {
        self.gate(key.to_event()).into_iter().collect()
    }

    /// Physical button transition.
    pub fn button(&mut self, index: u8, pressed: bool) -> Vec<InputEvent> {
        self.gate(InputEvent::Button { index, pressed })
            .into_iter()
            .collect()
    }

    /// Init request, only while the screen is not yet initialized.
    pub fn init_request(&self, screen_enabled: bool) -> Option<InputEvent> {
        (!screen_enabled).then_some(InputEvent::InitRequest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_button_sends_mouse_and_touch() {
        let mut d = InputDispatcher::new();
        let out = d.mouse_button(MouseButton::Left, true, Point::new(5, 6));
        assert_eq!(
            out,
            vec![
                InputEvent::Mouse {
                    x: 5,
                    y: 6,
                    wheel: 0,
                    buttons: 0x01
                },
                InputEvent::Touch {
                    x: 5,
                    y: 6,
                    down: true
                },
            ]
        );
    }

    #[test]
    fn test_right_button_is_not_touch() {
        let mut d = InputDispatcher::new();
        let out = d.mouse_button(MouseButton::Right, true, Point::new(0, 0));
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], InputEvent::Mouse { buttons: 0x02, .. }));
    }

    #[test]
    fn test_touch_release_sent_after_touch_disabled() {
        let mut d = InputDispatcher::new();
        d.mouse_button(MouseButton::Left, true, Point::new(1, 1));
        d.set_device_mask(InputDeviceMask::empty());

        let out = d.mouse_button(MouseButton::Left, false, Point::new(1, 1));
        assert_eq!(
            out,
            vec![InputEvent::Touch {
                x: 1,
                y: 1,
                down: false
            }]
        );
        assert!(!d.pointer().touch_down);
    }

    #[test]
    fn test_move_sends_touch_only_while_down() {
        let t0 = Instant::now();
        let mut d = InputDispatcher::new();
        d.set_device_mask(InputDeviceMask::TOUCH);
        assert!(d.mouse_move(Point::new(1, 1), t0).is_empty());

        d.mouse_button(MouseButton::Left, true, Point::new(1, 1));
        d.pointer.force_next_movement();
        let out = d.mouse_move(Point::new(2, 2), t0);
        assert_eq!(
            out,
            vec![InputEvent::Touch {
                x: 2,
                y: 2,
                down: true
            }]
        );
    }

    #[test]
    fn test_wheel_clamped_and_reset() {
        let mut d = InputDispatcher::new();
        let out = d.mouse_wheel(-360);
        assert!(matches!(out[0], InputEvent::Mouse { wheel: -128, .. }));
        assert_eq!(d.pointer().wheel(), 0);
    }

    #[test]
    fn test_wheel_gated_by_mouse() {
        let mut d = InputDispatcher::new();
        d.set_device_mask(InputDeviceMask::TOUCH);
        assert!(d.mouse_wheel(120).is_empty());
    }

    #[test]
    fn test_encoder_events() {
        let mut d = InputDispatcher::new();
        assert_eq!(
            d.encoder_press(true),
            vec![InputEvent::Encoder {
                delta: 0,
                pressed: true
            }]
        );
        assert_eq!(
            d.encoder_rotate(300),
            vec![InputEvent::Encoder {
                delta: 127,
                pressed: true
            }]
        );
        assert_eq!(d.encoder().delta(), 0);

        d.set_device_mask(InputDeviceMask::MOUSE);
        assert!(d.encoder_rotate(1).is_empty());
    }

    #[test]
    fn test_key_and_button_gating() {
        let mut d = InputDispatcher::new();
        d.set_device_mask(InputDeviceMask::BUTTON);
        assert!(d.key(&KeyInput::new(30, true)).is_empty());
        assert_eq!(
            d.button(2, true),
            vec![InputEvent::Button {
                index: 2,
                pressed: true
            }]
        );

        d.set_device_mask(InputDeviceMask::KEYBOARD);
        assert!(d.button(2, false).is_empty());
        assert_eq!(d.key(&KeyInput::new(30, false)).len(), 1);
    }

    #[test]
    fn test_disabled_encoder_keeps_state_without_events() {
        let mut d = InputDispatcher::new();
        d.set_device_mask(InputDeviceMask::BUTTON);
        assert!(d.encoder_press(true).is_empty());
        assert!(d.encoder_rotate(-40).is_empty());
        assert!(d.encoder().pressed);
        assert_eq!(d.encoder().delta(), 0);

        d.set_device_mask(InputDeviceMask::ENCODER);
        assert_eq!(
            d.encoder_rotate(2),
            vec![InputEvent::Encoder {
                delta: 2,
                pressed: true
            }]
        );
    }

    #[test]
    fn test_empty_mask_drops_device_events() {
        let mut d = InputDispatcher::new();
        d.set_device_mask(InputDeviceMask::empty());
        assert!(d.key(&KeyInput::new(30, true)).is_empty());
        assert!(d.button(0, true).is_empty());
        assert!(d.mouse_wheel(120).is_empty());
        assert!(d
            .mouse_button(MouseButton::Left, true, Point::new(3, 3))
            .is_empty());
        assert!(d.init_request(false).is_some());
    }

    #[test]
    fn test_init_request_only_while_disabled() {
        let d = InputDispatcher::new();
        assert_eq!(d.init_request(false), Some(InputEvent::InitRequest));
        assert_eq!(d.init_request(true), None);
    }
}
