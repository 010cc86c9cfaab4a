//! Bus abstraction seen by the CPU.

/// Memory and device access for the CPU.
///
/// Beyond plain reads and writes, the trait carries the side channels the
/// console needs: a per-instruction APU tick, the DMA stall cycles queued by
/// bus writes, and one-shot interrupt latches raised by the PPU and APU.
/// Everything except `read`/`write` has a no-op default so unit-test buses
/// stay small.
pub trait CpuBus {
    /// Read a byte from the CPU address space.
    fn read(&mut self, addr: u16) -> u8;

    /// Write a byte to the CPU address space.
    fn write(&mut self, addr: u16, value: u8);

    /// Advance the APU by `cycles` CPU cycles.
    ///
    /// Called once per instruction with the cycles accumulated since the
    /// previous call. Returns the stall cycles incurred by DMC DMA fetches
    /// during the tick; the CPU charges them through its normal cycle
    /// accounting.
    fn tick_apu(&mut self, cycles: u32) -> u32 {
        let _ = cycles;
        0
    }

    /// Drain the stall cycles queued by OAM DMA since the last call.
    fn take_dma_stall(&mut self) -> u32 {
        0
    }

    /// Drain the one-shot NMI latch.
    fn take_nmi(&mut self) -> bool {
        false
    }

    /// Drain the one-shot IRQ latch.
    fn take_irq(&mut self) -> bool {
        false
    }
}
