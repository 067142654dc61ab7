use std::time::{Duration, Instant};
use vlcd_common::{InputDeviceMask, Point};
use vlcd_input::{InputDispatcher, MouseButton, ThrottleConfig};
use vlcd_protocol::messages::input::MOUSE;
use vlcd_protocol::InputEvent;

fn mouse_frames(events: &[InputEvent]) -> usize {
    events.iter().filter(|e| e.kind() == MOUSE).count()
}

/// Two moves within the interval produce one mouse frame.
#[test]
fn test_moves_within_interval_coalesce() {
    let t0 = Instant::now();
    let mut d = InputDispatcher::new();
    d.set_device_mask(InputDeviceMask::MOUSE);

    let mut sent = d.mouse_move(Point::new(10, 10), t0);
    sent.extend(d.mouse_move(Point::new(11, 10), t0 + Duration::from_millis(5)));

    assert_eq!(mouse_frames(&sent), 1);
}

/// A button press between two moves forces a second frame.
#[test]
fn test_button_press_forces_frame() {
    let t0 = Instant::now();
    let mut d = InputDispatcher::new();
    d.set_device_mask(InputDeviceMask::MOUSE);

    let mut sent = d.mouse_move(Point::new(10, 10), t0);
    sent.extend(d.mouse_button(MouseButton::Left, true, Point::new(10, 10)));
    sent.extend(d.mouse_move(Point::new(12, 10), t0 + Duration::from_millis(5)));

    assert_eq!(mouse_frames(&sent), 2);
}

#[test]
fn test_move_after_interval_is_sent() {
    let t0 = Instant::now();
    let mut d = InputDispatcher::new();

    assert_eq!(mouse_frames(&d.mouse_move(Point::new(0, 0), t0)), 1);
    assert_eq!(
        mouse_frames(&d.mouse_move(Point::new(1, 0), t0 + Duration::from_millis(25))),
        1
    );
}

#[test]
fn test_custom_interval() {
    let t0 = Instant::now();
    let mut d = InputDispatcher::with_throttle(ThrottleConfig {
        enabled: true,
        min_interval_ms: 100,
    });

    d.mouse_move(Point::new(0, 0), t0);
    assert!(d
        .mouse_move(Point::new(1, 0), t0 + Duration::from_millis(50))
        .is_empty());
    assert_eq!(
        d.mouse_move(Point::new(2, 0), t0 + Duration::from_millis(101))
            .len(),
        1
    );
}

#[test]
fn test_mouse_disabled_sends_nothing_on_move() {
    let t0 = Instant::now();
    let mut d = InputDispatcher::new();
    d.set_device_mask(InputDeviceMask::KEYBOARD);
    assert!(d.mouse_move(Point::new(3, 3), t0).is_empty());
    assert_eq!(d.pointer().position, Point::new(3, 3));
}
