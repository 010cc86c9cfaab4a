//! Console: the frame driver tying CPU, PPU and APU together.

use famicle_cpu::{Cpu, CpuState, ExecHook};
use famicle_ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

use crate::bus::{Bus, Mirroring, CHR_SIZE, PRG_SIZE};
use crate::ines::{Rom, RomError};

/// NTSC timing constants.
pub mod timing {
    /// PPU dots per scanline.
    pub const DOTS_PER_LINE: i32 = 341;
    /// Scanlines per frame, vblank and pre-render included.
    pub const LINES_PER_FRAME: i32 = 262;
    /// Visible scanlines.
    pub const VISIBLE_LINES: u16 = 240;
    /// PPU dots per CPU cycle.
    pub const DOTS_PER_CPU_CYCLE: i32 = 3;
}

/// One frame's audio output: per-CPU-cycle sample slices for the five
/// channels. The squares, triangle and noise are in [0,15]; the DMC is in
/// [0,127].
#[derive(Debug, Clone, Copy)]
pub struct FrameSound<'a> {
    /// Square 1.
    pub sq1: &'a [u8],
    /// Square 2.
    pub sq2: &'a [u8],
    /// Triangle.
    pub tri: &'a [u8],
    /// Noise.
    pub noi: &'a [u8],
    /// Delta modulation channel.
    pub dmc: &'a [u8],
}

/// A complete NES: CPU, PPU, APU, bus, and the frame sequencing between
/// them.
pub struct Console {
    cpu: Cpu,
    bus: Bus,
    framebuffer: Box<[u8; SCREEN_WIDTH * SCREEN_HEIGHT]>,
    /// Frames left before the PPU starts rendering after a reset.
    ppu_warmup: u32,
    /// Odd frames drop one dot from the pre-render line.
    odd_frame: bool,
}

impl Console {
    /// Build a console around raw 32 KiB PRG and 8 KiB CHR images, then
    /// hard-reset it.
    #[must_use]
    pub fn new(prg: &[u8; PRG_SIZE], chr: &[u8; CHR_SIZE], mirroring: Mirroring) -> Self {
        let mut console = Self {
            cpu: Cpu::new(),
            bus: Bus::new(Box::new(*prg), Box::new(*chr), mirroring),
            framebuffer: Box::new([0; SCREEN_WIDTH * SCREEN_HEIGHT]),
            ppu_warmup: 0,
            odd_frame: false,
        };
        console.hard_reset();
        console
    }

    /// Build a console from an iNES container.
    ///
    /// # Errors
    ///
    /// Returns a [`RomError`] when the container is malformed or needs
    /// anything beyond Mapper 0.
    pub fn from_ines(data: &[u8]) -> Result<Self, RomError> {
        let rom = Rom::load(data)?;
        Ok(Self::new(&rom.prg, &rom.chr, rom.mirroring))
    }

    /// Power-on reset.
    pub fn hard_reset(&mut self) {
        log::debug!("hard reset");
        self.bus.hard_reset();
        self.cpu.hard_reset(&mut self.bus);
        self.ppu_warmup = 2;
        self.odd_frame = false;
        self.framebuffer.fill(0);
    }

    /// Reset-button reset: memories and most register contents survive.
    pub fn soft_reset(&mut self) {
        log::debug!("soft reset");
        self.cpu.soft_reset(&mut self.bus);
        self.bus.soft_reset();
        self.ppu_warmup = 2;
        self.odd_frame = false;
        self.framebuffer.fill(0);
    }

    /// Update a controller port's input byte (bit 0 = A ... bit 7 =
    /// Right). Ports other than 0 and 1 are ignored.
    pub fn set_input(&mut self, port: usize, value: u8) {
        if port < 2 {
            self.bus.controllers.set_input(port, value);
        }
    }

    /// The 256x240 framebuffer of palette indices produced by the last
    /// frame.
    #[must_use]
    pub fn screen(&self) -> &[u8] {
        &self.framebuffer[..]
    }

    /// The audio buffers produced by the last frame.
    #[must_use]
    pub fn sound(&self) -> FrameSound<'_> {
        FrameSound {
            sq1: self.bus.apu.sound_sq1(),
            sq2: self.bus.apu.sound_sq2(),
            tri: self.bus.apu.sound_tri(),
            noi: self.bus.apu.sound_noi(),
            dmc: self.bus.apu.sound_dmc(),
        }
    }

    /// Install or clear a hook called before every CPU instruction.
    pub fn set_exec_hook(&mut self, hook: Option<ExecHook>) {
        self.cpu.set_exec_hook(hook);
    }

    /// Current CPU register snapshot.
    #[must_use]
    pub fn cpu_state(&self) -> CpuState {
        self.cpu.state()
    }

    /// Run one full frame.
    ///
    /// The interleave follows the reference scanline timing: the frame
    /// starts at the post-render line, vblank spans lines 241-260, the
    /// pre-render line clears the status flags and reloads scrolling, and
    /// the 240 visible lines render with 341 dots of CPU between them.
    pub fn emulate_frame(&mut self) {
        use timing::{DOTS_PER_LINE, LINES_PER_FRAME, VISIBLE_LINES};

        if self.ppu_warmup > 0 {
            // The PPU ignores the first frames after reset; run CPU + APU
            // flat out.
            self.bus.apu.start_frame();
            self.cpu.exec(&mut self.bus, DOTS_PER_LINE * LINES_PER_FRAME);
            self.bus.apu.end_frame();
            self.ppu_warmup -= 1;
            return;
        }

        self.bus.apu.start_frame();

        // Line 240 (post-render).
        self.cpu.exec(&mut self.bus, DOTS_PER_LINE);

        // Line 241: vblank begins; NMI lands a few dots in.
        self.bus.ppu.set_vblank(true);
        self.bus.ppu.reset_oam_addr();
        self.cpu.exec(&mut self.bus, 12);
        if self.bus.ppu.nmi_enabled() {
            self.bus.raise_nmi();
        }
        self.cpu.exec(&mut self.bus, DOTS_PER_LINE - 12);

        // Lines 242-260: idle vblank.
        self.cpu.exec(&mut self.bus, DOTS_PER_LINE * 19);

        // Line 261 (pre-render): flags clear, scroll reload, odd-frame dot.
        self.bus.ppu.set_sprite_overflow(false);
        self.bus.ppu.set_sprite0_hit(false);
        self.bus.ppu.set_vblank(false);
        self.cpu.exec(&mut self.bus, 325);
        self.bus.ppu.reload_addr();
        self.cpu.exec(&mut self.bus, if self.odd_frame { 15 } else { 16 });
        self.odd_frame = !self.odd_frame;

        // Lines 0-239: render.
        for line in 0..VISIBLE_LINES {
            let offset = usize::from(line) * SCREEN_WIDTH;
            let (ppu, mut view) = self.bus.render_parts();
            ppu.start_line();
            ppu.render_line(
                line,
                &mut view,
                &mut self.framebuffer[offset..offset + SCREEN_WIDTH],
            );
            self.cpu.exec(&mut self.bus, DOTS_PER_LINE);
            self.bus.ppu.end_line();
        }

        self.bus.apu.end_frame();
    }
}
