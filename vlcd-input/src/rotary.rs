//! Rotary encoder state.

/// Press state and pending rotation of the emulated rotary encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncoderState {
    pub pressed: bool,
    delta: i8,
}

impl EncoderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a rotation delta, saturated to `i8`.
    pub fn set_delta(&mut self, delta: i32) {
        self.delta = delta.clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8;
    }

    /// Returns the pending rotation and clears it.
    pub fn take_delta(&mut self) -> i8 {
        std::mem::take(&mut self.delta)
    }

    pub fn delta(&self) -> i8 {
        self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_saturates() {
        let mut e = EncoderState::new();
        e.set_delta(-500);
        assert_eq!(e.delta(), i8::MIN);
        assert_eq!(e.take_delta(), i8::MIN);
        assert_eq!(e.delta(), 0);
    }
}
