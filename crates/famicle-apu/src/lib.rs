//! 2A03 APU core for the famicle NES emulator.
//!
//! Five channels (two squares, triangle, noise, DMC) each render their
//! output into a per-frame buffer of one sample per CPU cycle. The console
//! ticks the APU once per CPU instruction with the elapsed cycle count; the
//! frame sequencer, expressed in 1/48-CPU-cycle units, clocks envelopes,
//! length counters and sweeps from those ticks.
//!
//! Register writes flush the affected channel's buffer up to the current
//! timestamp before taking effect, so a mid-frame parameter change lands on
//! the exact sample where it happened. The host collects the buffers once
//! per frame through the [`Apu::sound_sq1`]-style accessors.
//!
//! DMC sample fetches, frame IRQs, and DMC IRQs reach the rest of the
//! machine through the [`ApuBus`] trait.

mod apu;
mod buffer;
mod bus;
mod dmc;
mod envelope;
mod length_counter;
mod noise;
mod pulse;
mod sweep;
mod triangle;

pub use apu::Apu;
pub use bus::ApuBus;
pub use sweep::PulseChannel;

/// Per-channel sample buffer capacity: comfortably above the CPU cycles in
/// one frame, DMA stalls included.
pub const SOUND_BUF_LEN: usize = 40000;
