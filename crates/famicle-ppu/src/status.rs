//! PPU status register ($2002).

use bitflags::bitflags;

bitflags! {
    /// PPUSTATUS. Only the top three bits are real flags; the low five read
    /// back stale bus contents.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        /// Sprite overflow (more than eight sprites on a line).
        const SPR_OVERFLOW = 1 << 5;
        /// Sprite 0 hit.
        const SPR0_HIT = 1 << 6;
        /// Vertical blank.
        const VBLANK = 1 << 7;
    }
}

impl Status {
    /// Register byte as seen by a $2002 read: the flag bits merged with the
    /// low five bits of the open-bus latch.
    #[inline]
    #[must_use]
    pub const fn read(self, open_bus: u8) -> u8 {
        self.bits() | (open_bus & 0x1F)
    }
}
