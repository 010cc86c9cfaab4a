//! CPU status register (P).
//!
//! ```text
//! 7  6  5  4  3  2  1  0
//! N  V  U  B  D  I  Z  C
//! │  │  │  │  │  │  │  └─ Carry
//! │  │  │  │  │  │  └──── Zero
//! │  │  │  │  │  └─────── Interrupt disable
//! │  │  │  │  └────────── Decimal (latches but has no effect on the 2A03)
//! │  │  │  └───────────── Break (only meaningful in the pushed stack image)
//! │  │  └──────────────── Unused (reads back as 1)
//! │  └─────────────────── Overflow
//! └────────────────────── Negative
//! ```

use bitflags::bitflags;

bitflags! {
    /// CPU status flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        /// Carry.
        const C = 1 << 0;
        /// Zero.
        const Z = 1 << 1;
        /// Interrupt disable. Gates IRQ only; NMI is never masked.
        const I = 1 << 2;
        /// Decimal mode. Stored but ignored by the arithmetic unit.
        const D = 1 << 3;
        /// Break. Set in the stack image pushed by PHP/BRK, clear for NMI/IRQ.
        const B = 1 << 4;
        /// Unused constant bit, always 1 in the stack image.
        const U = 1 << 5;
        /// Overflow.
        const V = 1 << 6;
        /// Negative (bit 7 of the last result).
        const N = 1 << 7;
    }
}

impl Status {
    /// Power-on value: interrupt disable plus the constant bit ($24).
    pub const POWER_ON: Self = Self::I.union(Self::U);

    /// Set or clear the Z and N flags from a result byte.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set(Self::Z, value == 0);
        self.set(Self::N, value & 0x80 != 0);
    }

    /// Byte image pushed to the stack. Bit 5 is forced, bit 4 depends on
    /// whether the push came from BRK/PHP (`b4` true) or NMI/IRQ entry.
    #[inline]
    #[must_use]
    pub const fn to_stack_byte(self, b4: bool) -> u8 {
        let mut value = self.bits() | Self::U.bits();
        if b4 {
            value |= Self::B.bits();
        } else {
            value &= !Self::B.bits();
        }
        value
    }

    /// Rebuild the register from a byte pulled off the stack.
    /// Bits 4 and 5 of the pulled byte are ignored.
    #[inline]
    #[must_use]
    pub fn from_stack_byte(value: u8) -> Self {
        Self::from_bits_truncate((value & !Self::B.bits()) | Self::U.bits())
    }
}
