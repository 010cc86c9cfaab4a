//! PPU mask register ($2001).

use bitflags::bitflags;

bitflags! {
    /// PPUMASK. Rendering enables plus the emphasis/grayscale bits, which
    /// are latched but not applied by this scanline renderer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Mask: u8 {
        /// Grayscale output.
        const GRAYSCALE = 1 << 0;
        /// Show background in the leftmost 8 pixels.
        const BG_LEFT = 1 << 1;
        /// Show sprites in the leftmost 8 pixels.
        const SPR_LEFT = 1 << 2;
        /// Background rendering enable.
        const BG_ON = 1 << 3;
        /// Sprite rendering enable.
        const SPR_ON = 1 << 4;
        /// Emphasize red.
        const EMPH_RED = 1 << 5;
        /// Emphasize green.
        const EMPH_GREEN = 1 << 6;
        /// Emphasize blue.
        const EMPH_BLUE = 1 << 7;
    }
}

impl Mask {
    /// True when either background or sprite rendering is on; gates the
    /// scroll-register updates.
    #[inline]
    #[must_use]
    pub const fn rendering_enabled(self) -> bool {
        self.intersects(Self::BG_ON.union(Self::SPR_ON))
    }
}
