//! PPU control register ($2000).

use bitflags::bitflags;

bitflags! {
    /// PPUCTRL.
    ///
    /// ```text
    /// 7  6  5  4  3  2  1  0
    /// V  P  H  B  S  I  N  N
    /// │  │  │  │  │  │  └──┴─ Base nametable (0-3)
    /// │  │  │  │  │  └─────── VRAM increment (0: +1, 1: +32)
    /// │  │  │  │  └────────── Sprite pattern table (8x8 only)
    /// │  │  │  └───────────── Background pattern table
    /// │  │  └──────────────── Sprite size (0: 8x8, 1: 8x16)
    /// │  └─────────────────── Master/slave select (unused)
    /// └────────────────────── NMI at vblank
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Ctrl: u8 {
        /// Base nametable select, low bit.
        const NT_LO = 1 << 0;
        /// Base nametable select, high bit.
        const NT_HI = 1 << 1;
        /// $2007 increments V by 32 instead of 1.
        const INC32 = 1 << 2;
        /// Sprite pattern table at $1000 (ignored for 8x16 sprites).
        const SPR_PATTERN = 1 << 3;
        /// Background pattern table at $1000.
        const BG_PATTERN = 1 << 4;
        /// 8x16 sprite mode.
        const SPR_16 = 1 << 5;
        /// Master/slave select. Latched, never consulted.
        const SLAVE = 1 << 6;
        /// Generate NMI when vblank begins.
        const NMI = 1 << 7;
    }
}

impl Ctrl {
    /// Base nametable index (0-3).
    #[inline]
    #[must_use]
    pub const fn nametable(self) -> u8 {
        self.bits() & 0x03
    }

    /// $2007 address increment: 1 or 32.
    #[inline]
    #[must_use]
    pub const fn vram_increment(self) -> u16 {
        if self.contains(Self::INC32) { 32 } else { 1 }
    }

    /// Background pattern table base address.
    #[inline]
    #[must_use]
    pub const fn bg_pattern_base(self) -> u16 {
        if self.contains(Self::BG_PATTERN) { 0x1000 } else { 0x0000 }
    }

    /// Sprite pattern table base address (8x8 mode).
    #[inline]
    #[must_use]
    pub const fn spr_pattern_base(self) -> u16 {
        if self.contains(Self::SPR_PATTERN) { 0x1000 } else { 0x0000 }
    }

    /// Sprite height in pixels: 8 or 16.
    #[inline]
    #[must_use]
    pub const fn sprite_height(self) -> u16 {
        if self.contains(Self::SPR_16) { 16 } else { 8 }
    }

    /// Whether the vblank NMI is enabled.
    #[inline]
    #[must_use]
    pub const fn nmi_enabled(self) -> bool {
        self.contains(Self::NMI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_decoding() {
        let ctrl = Ctrl::from_bits_truncate(0x93);
        assert_eq!(ctrl.nametable(), 3);
        assert_eq!(ctrl.vram_increment(), 1);
        assert_eq!(ctrl.bg_pattern_base(), 0x1000);
        assert!(ctrl.nmi_enabled());
        assert_eq!(ctrl.sprite_height(), 8);

        let ctrl = Ctrl::from_bits_truncate(0x2C);
        assert_eq!(ctrl.vram_increment(), 32);
        assert_eq!(ctrl.spr_pattern_base(), 0x1000);
        assert_eq!(ctrl.sprite_height(), 16);
    }
}
