//! System bus: CPU and PPU address decode, memories, DMA, interrupt latches.

use famicle_apu::{Apu, ApuBus};
use famicle_cpu::CpuBus;
use famicle_ppu::{Ppu, PpuBus, OAM_SIZE};

use crate::controller::Controllers;

/// Nametable arrangement selected by the cartridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    /// $2000/$2400 share one table, $2800/$2C00 the other.
    Horizontal,
    /// $2000/$2800 share one table, $2400/$2C00 the other.
    Vertical,
}

/// PRG image size (32 KiB, Mapper 0).
pub(crate) const PRG_SIZE: usize = 0x8000;
/// CHR image size (8 KiB, Mapper 0).
pub(crate) const CHR_SIZE: usize = 0x2000;
const WRAM_SIZE: usize = 0x800;
const VRAM_SIZE: usize = 0x800;

/// OAM DMA stall charged to the CPU, in CPU cycles.
const OAM_DMA_CYCLES: u32 = 512;
/// Stall per DMC sample fetch, in CPU cycles.
const DMC_DMA_CYCLES: u32 = 4;

/// Physical VRAM index for a nametable address under the given mirroring.
fn vram_index(mirroring: Mirroring, addr: u16) -> usize {
    let bank = match mirroring {
        Mirroring::Horizontal => (addr & 0x0800) >> 1,
        Mirroring::Vertical => addr & 0x0400,
    };
    usize::from(bank | (addr & 0x03FF))
}

/// The PPU's window onto bus-owned memory: CHR ROM plus mirrored VRAM.
pub(crate) struct PpuView<'a> {
    chr: &'a [u8; CHR_SIZE],
    vram: &'a mut [u8; VRAM_SIZE],
    mirroring: Mirroring,
}

impl PpuBus for PpuView<'_> {
    fn read(&mut self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => self.chr[usize::from(addr)],
            0x2000..=0x3EFF => self.vram[vram_index(self.mirroring, addr)],
            // Palette range: the PPU handles it internally, but $2007
            // buffer fills read the nametable underneath.
            _ => self.vram[vram_index(self.mirroring, addr - 0x1000)],
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        let addr = addr & 0x3FFF;
        match addr {
            // CHR is ROM on Mapper 0.
            0x0000..=0x1FFF => {}
            0x2000..=0x3EFF => self.vram[vram_index(self.mirroring, addr)] = value,
            _ => {}
        }
    }
}

/// The APU's window: PRG for DMC fetches plus the IRQ/stall latches.
struct ApuView<'a> {
    prg: &'a [u8; PRG_SIZE],
    irq: &'a mut bool,
    stall: &'a mut u32,
}

impl ApuBus for ApuView<'_> {
    fn read_dmc(&mut self, addr: u16) -> u8 {
        debug_assert!(addr >= 0x8000);
        *self.stall += DMC_DMA_CYCLES;
        self.prg[usize::from(addr & 0x7FFF)]
    }

    fn trigger_frame_irq(&mut self) {
        *self.irq = true;
    }

    fn trigger_dmc_irq(&mut self) {
        *self.irq = true;
    }
}

/// System bus. Owns every memory and the PPU/APU; the CPU drives it through
/// the `CpuBus` trait.
pub(crate) struct Bus {
    wram: [u8; WRAM_SIZE],
    vram: [u8; VRAM_SIZE],
    prg: Box<[u8; PRG_SIZE]>,
    chr: Box<[u8; CHR_SIZE]>,
    mirroring: Mirroring,
    pub(crate) ppu: Ppu,
    pub(crate) apu: Apu,
    pub(crate) controllers: Controllers,
    /// One-shot interrupt latches drained by the CPU at instruction
    /// boundaries.
    nmi_pending: bool,
    irq_pending: bool,
    /// OAM DMA stall cycles awaiting collection.
    dma_stall: u32,
}

impl Bus {
    pub fn new(prg: Box<[u8; PRG_SIZE]>, chr: Box<[u8; CHR_SIZE]>, mirroring: Mirroring) -> Self {
        Self {
            wram: [0; WRAM_SIZE],
            vram: [0; VRAM_SIZE],
            prg,
            chr,
            mirroring,
            ppu: Ppu::new(),
            apu: Apu::new(),
            controllers: Controllers::default(),
            nmi_pending: false,
            irq_pending: false,
            dma_stall: 0,
        }
    }

    /// Power-on reset: memories cleared, devices hard-reset.
    pub fn hard_reset(&mut self) {
        self.wram.fill(0);
        self.vram.fill(0);
        self.ppu.hard_reset();
        self.apu.hard_reset();
        self.controllers.reset();
        self.nmi_pending = false;
        self.irq_pending = false;
        self.dma_stall = 0;
    }

    /// Reset-button reset: memories survive, devices soft-reset.
    pub fn soft_reset(&mut self) {
        self.ppu.soft_reset();
        self.apu.soft_reset();
        self.controllers.reset();
        self.nmi_pending = false;
        self.irq_pending = false;
        self.dma_stall = 0;
    }

    /// Latch an NMI for the CPU (frame driver's vblank edge).
    pub fn raise_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Split out the PPU and its memory view for rendering and $2007
    /// traffic.
    pub fn render_parts(&mut self) -> (&mut Ppu, PpuView<'_>) {
        (
            &mut self.ppu,
            PpuView {
                chr: &*self.chr,
                vram: &mut self.vram,
                mirroring: self.mirroring,
            },
        )
    }

    /// $4014 write: copy one CPU page into OAM and stall the CPU.
    fn oam_dma(&mut self, page: u8) {
        let base = u16::from(page) << 8;
        let mut buf = [0u8; OAM_SIZE];
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = self.read(base + i as u16);
        }

        self.dma_stall += OAM_DMA_CYCLES;
        self.ppu.oam_dma(&buf);
    }
}

impl CpuBus for Bus {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.wram[usize::from(addr & 0x07FF)],
            0x2000..=0x3FFF => match addr & 7 {
                2 => self.ppu.read_status(),
                4 => self.ppu.read_oam_data(),
                7 => {
                    let (ppu, mut view) = self.render_parts();
                    ppu.read_data(&mut view)
                }
                _ => self.ppu.read_open_bus(),
            },
            0x4015 => self.apu.read_status(),
            0x4016 => self.controllers.read(0),
            0x4017 => self.controllers.read(1),
            // APU registers, $4014, and the expansion area are open bus.
            0x4000..=0x7FFF => 0,
            0x8000..=0xFFFF => self.prg[usize::from(addr & 0x7FFF)],
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.wram[usize::from(addr & 0x07FF)] = value,
            0x2000..=0x3FFF => match addr & 7 {
                0 => {
                    if self.ppu.write_ctrl(value) {
                        self.nmi_pending = true;
                    }
                }
                1 => self.ppu.write_mask(value),
                2 => self.ppu.write_status(value),
                3 => self.ppu.write_oam_addr(value),
                4 => self.ppu.write_oam_data(value),
                5 => self.ppu.write_scroll(value),
                6 => self.ppu.write_addr(value),
                _ => {
                    let (ppu, mut view) = self.render_parts();
                    ppu.write_data(&mut view, value);
                }
            },
            0x4014 => self.oam_dma(value),
            0x4016 => self.controllers.write_strobe(value),
            0x4000..=0x4013 | 0x4015 | 0x4017 => {
                let Self {
                    apu,
                    prg,
                    irq_pending,
                    ..
                } = self;
                let mut stall = 0;
                let mut view = ApuView {
                    prg: &**prg,
                    irq: irq_pending,
                    stall: &mut stall,
                };
                apu.write(addr, value, &mut view);
                self.dma_stall += stall;
            }
            // $4018-$7FFF unmapped, $8000-$FFFF is ROM.
            _ => {}
        }
    }

    fn tick_apu(&mut self, cycles: u32) -> u32 {
        let Self {
            apu,
            prg,
            irq_pending,
            ..
        } = self;
        let mut stall = 0;
        let mut view = ApuView {
            prg: &**prg,
            irq: irq_pending,
            stall: &mut stall,
        };
        apu.tick(cycles, &mut view);
        stall
    }

    fn take_dma_stall(&mut self) -> u32 {
        std::mem::take(&mut self.dma_stall)
    }

    fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    fn take_irq(&mut self) -> bool {
        std::mem::take(&mut self.irq_pending)
    }
}
