//! Length counter: silences a channel after a programmed duration.

/// Load values indexed by the top five bits of the length-register write.
const LENGTH_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, //
    12, 16, 24, 18, 48, 20, 96, 22, 192, 24, 72, 26, 16, 28, 32, 30,
];

/// Per-channel length counter, clocked on half-frame signals.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LengthCounter {
    value: u8,
    halt: bool,
    enabled: bool,
}

impl LengthCounter {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// $4015 channel enable. Disabling zeroes the counter immediately.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.value = 0;
        }
        self.enabled = enabled;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Halt bit (the envelope loop / linear control alias).
    pub fn set_halt(&mut self, halt: bool) {
        self.halt = halt;
    }

    /// Reload from the lookup table. Ignored while the channel is disabled.
    pub fn load(&mut self, index: u8) {
        if self.enabled {
            self.value = LENGTH_TABLE[usize::from(index & 0x1F)];
        }
    }

    /// Half-frame clock.
    pub fn clock(&mut self) {
        if !self.halt && self.value > 0 {
            self.value -= 1;
        }
    }

    /// The channel plays while the counter is nonzero.
    pub fn active(&self) -> bool {
        self.value > 0
    }
}
