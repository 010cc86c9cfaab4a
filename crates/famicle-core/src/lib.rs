//! Console core for famicle.
//!
//! Ties the CPU, PPU and APU together over the system bus and drives them a
//! frame at a time. The observable surface is [`Console`]: feed it a 32 KiB
//! PRG image and an 8 KiB CHR image (or an iNES container via [`Rom`]),
//! call [`Console::emulate_frame`] in a loop, and collect the 256x240
//! palette-index framebuffer and the five per-CPU-cycle audio channel
//! buffers after each frame.
//!
//! Timing model: one frame is 262 scanlines of 341 PPU dots; the CPU runs
//! at a third of the dot rate and the APU is ticked per CPU instruction.
//! Rendering is scanline-accurate (Mapper 0 only, so no mid-line raster
//! tricks are lost).

mod bus;
mod console;
mod controller;
mod ines;

pub use bus::Mirroring;
pub use console::{timing, Console, FrameSound};
pub use controller::Button;
pub use famicle_cpu::{CpuState, ExecHook};
pub use ines::{Rom, RomError};
