//! Bus abstraction seen by the APU.

/// Callbacks the APU needs from the rest of the machine.
pub trait ApuBus {
    /// Fetch one DMC sample byte from CPU space ($8000-$FFFF). The
    /// implementation is expected to charge the CPU the DMA stall cost.
    fn read_dmc(&mut self, addr: u16) -> u8;

    /// Raise the frame-counter IRQ line.
    fn trigger_frame_irq(&mut self);

    /// Raise the DMC IRQ line.
    fn trigger_dmc_irq(&mut self);
}
