//! 6502 execution core.
//!
//! The interpreter runs whole instructions against a PPU-cycle credit: the
//! console hands [`Cpu::exec`] a number of PPU dots, and the CPU keeps
//! fetching and executing until fewer than three dots (one CPU cycle) remain.
//! Each instruction charges its base cost up front, flushes the accumulated
//! CPU cycles to the APU through the bus, then performs its memory traffic
//! and register effects. DMA stalls reported by the bus are folded into the
//! same credit counters, so cycle totals stay exact across OAM and DMC DMA.

use crate::bus::CpuBus;
use crate::opcodes::{OP_ARGLEN, OP_CYCLES};
use crate::status::Status;

const VEC_NMI: u16 = 0xFFFA;
const VEC_RESET: u16 = 0xFFFC;
const VEC_IRQ: u16 = 0xFFFE;

/// Register snapshot passed to the instruction hook.
///
/// Captured before the opcode fetch, so `pc` points at the opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuState {
    /// Program counter.
    pub pc: u16,
    /// Accumulator.
    pub a: u8,
    /// X index.
    pub x: u8,
    /// Y index.
    pub y: u8,
    /// Stack pointer (page $01).
    pub s: u8,
    /// Status register byte.
    pub p: u8,
}

/// Per-instruction observability hook.
///
/// Receives the pre-fetch register snapshot, the opcode byte, and the
/// operand zero-extended to 16 bits (0 for implied/accumulator opcodes).
pub type ExecHook = Box<dyn FnMut(&CpuState, u8, u16)>;

/// NES 6502 CPU.
pub struct Cpu {
    /// Accumulator.
    pub a: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Program counter.
    pub pc: u16,
    /// Stack pointer.
    pub s: u8,
    /// Status register.
    pub status: Status,
    /// Pending-NMI latch, serviced at the next instruction boundary.
    nmi_pending: bool,
    /// Pending-IRQ latch. Consumed at the boundary even when I masks it.
    irq_pending: bool,
    /// Halted by a KIL opcode. Cleared only by reset.
    jammed: bool,
    /// Remaining PPU-cycle credit. May go negative within an instruction.
    rest_cycle: i32,
    /// CPU cycles consumed since the last APU tick.
    apu_rest_cycle: u32,
    hook: Option<ExecHook>,
}

impl Cpu {
    /// Create a CPU in its pre-reset state. Call [`Cpu::hard_reset`] before
    /// executing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            s: 0xFD,
            status: Status::POWER_ON,
            nmi_pending: false,
            irq_pending: false,
            jammed: false,
            rest_cycle: 0,
            apu_rest_cycle: 0,
            hook: None,
        }
    }

    /// Power-on reset: registers to their documented power-up values, PC
    /// loaded from the reset vector.
    pub fn hard_reset(&mut self, bus: &mut impl CpuBus) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.s = 0xFD;
        self.status = Status::POWER_ON;
        self.nmi_pending = false;
        self.irq_pending = false;
        self.jammed = false;
        self.rest_cycle = 0;
        self.apu_rest_cycle = 0;
        self.pc = self.read16(bus, VEC_RESET);
    }

    /// Reset-button reset: S drops by 3 without writes, I is set, PC is
    /// reloaded. Register contents and cycle counters survive.
    pub fn soft_reset(&mut self, bus: &mut impl CpuBus) {
        self.s = self.s.wrapping_sub(3);
        self.status.insert(Status::I);
        self.nmi_pending = false;
        self.irq_pending = false;
        self.jammed = false;
        self.pc = self.read16(bus, VEC_RESET);
    }

    /// Current register snapshot.
    #[must_use]
    pub fn state(&self) -> CpuState {
        CpuState {
            pc: self.pc,
            a: self.a,
            x: self.x,
            y: self.y,
            s: self.s,
            p: self.status.bits(),
        }
    }

    /// Install or clear the per-instruction hook.
    pub fn set_exec_hook(&mut self, hook: Option<ExecHook>) {
        self.hook = hook;
    }

    /// Raise the NMI line. Serviced at the next instruction boundary.
    pub fn trigger_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Raise the IRQ line. Serviced at the next boundary if I is clear.
    pub fn trigger_irq(&mut self) {
        self.irq_pending = true;
    }

    /// Whether a KIL opcode has halted the CPU.
    #[must_use]
    pub fn jammed(&self) -> bool {
        self.jammed
    }

    /// Consume `cycles` CPU cycles: three PPU dots of credit each, and the
    /// same count queued for the next APU tick.
    fn delay(&mut self, cycles: u32) {
        self.rest_cycle -= 3 * cycles as i32;
        self.apu_rest_cycle += cycles;
    }

    /// Run instructions until the PPU-cycle credit drops below one CPU cycle.
    pub fn exec(&mut self, bus: &mut impl CpuBus, ppu_cycles: i32) {
        self.rest_cycle += ppu_cycles;

        while self.rest_cycle >= 3 {
            if bus.take_nmi() {
                self.nmi_pending = true;
            }
            if bus.take_irq() {
                self.irq_pending = true;
            }

            if self.jammed {
                // Halted: time passes but nothing executes.
                self.rest_cycle = 0;
                return;
            }

            if self.nmi_pending {
                self.nmi_pending = false;
                self.interrupt(bus, VEC_NMI);
            } else if self.irq_pending {
                self.irq_pending = false;
                if !self.status.contains(Status::I) {
                    self.interrupt(bus, VEC_IRQ);
                }
            }

            let st = self.state();
            let (opcode, arg) = self.fetch_op(bus);
            if let Some(hook) = self.hook.as_mut() {
                hook(&st, opcode, arg);
            }

            self.delay(u32::from(OP_CYCLES[opcode as usize]));

            // Flush the cycles owed to the APU once per instruction; a DMC
            // fetch during the tick stalls the CPU through the same path.
            let owed = std::mem::take(&mut self.apu_rest_cycle);
            let stall = bus.tick_apu(owed);
            if stall != 0 {
                self.delay(stall);
            }

            self.execute(bus, opcode, arg);

            let stall = bus.take_dma_stall();
            if stall != 0 {
                self.delay(stall);
            }
        }
    }

    /// Hardware interrupt entry (7 cycles). The pushed status image has
    /// bit 4 clear.
    fn interrupt(&mut self, bus: &mut impl CpuBus, vector: u16) {
        self.delay(7);
        self.push16(bus, self.pc);
        self.push8(bus, self.status.to_stack_byte(false));
        self.pc = self.read16(bus, vector);
        self.status.insert(Status::I);
    }

    fn fetch_op(&mut self, bus: &mut impl CpuBus) -> (u8, u16) {
        let opcode = self.read8(bus, self.pc);
        self.pc = self.pc.wrapping_add(1);

        let arg = match OP_ARGLEN[opcode as usize] {
            1 => {
                let value = self.read8(bus, self.pc);
                self.pc = self.pc.wrapping_add(1);
                u16::from(value)
            }
            2 => {
                let value = self.read16(bus, self.pc);
                self.pc = self.pc.wrapping_add(2);
                value
            }
            _ => 0,
        };

        (opcode, arg)
    }

    // ===== memory helpers =====

    fn read8(&mut self, bus: &mut impl CpuBus, addr: u16) -> u8 {
        bus.read(addr)
    }

    fn write8(&mut self, bus: &mut impl CpuBus, addr: u16, value: u8) {
        bus.write(addr, value);
    }

    /// 16-bit read that may cross a page ($FFFF wraps to $0000).
    fn read16(&mut self, bus: &mut impl CpuBus, addr: u16) -> u16 {
        let lo = self.read8(bus, addr);
        let hi = self.read8(bus, addr.wrapping_add(1));
        u16::from(lo) | (u16::from(hi) << 8)
    }

    /// 16-bit read whose second byte wraps within the page (the 6502
    /// indirect bug).
    fn read16_inpage(&mut self, bus: &mut impl CpuBus, addr: u16) -> u16 {
        let next = (addr & 0xFF00) | u16::from((addr as u8).wrapping_add(1));
        let lo = self.read8(bus, addr);
        let hi = self.read8(bus, next);
        u16::from(lo) | (u16::from(hi) << 8)
    }

    fn push8(&mut self, bus: &mut impl CpuBus, value: u8) {
        self.write8(bus, 0x100 | u16::from(self.s), value);
        self.s = self.s.wrapping_sub(1);
    }

    fn pop8(&mut self, bus: &mut impl CpuBus) -> u8 {
        self.s = self.s.wrapping_add(1);
        self.read8(bus, 0x100 | u16::from(self.s))
    }

    /// Push a 16-bit value; both bytes stay within page $01.
    fn push16(&mut self, bus: &mut impl CpuBus, value: u16) {
        self.push8(bus, (value >> 8) as u8);
        self.push8(bus, value as u8);
    }

    /// Pop a 16-bit value; wraps within page $01 (S == $FE reads $01FF then
    /// $0100).
    fn pop16(&mut self, bus: &mut impl CpuBus) -> u16 {
        self.s = self.s.wrapping_add(1);
        let addr = 0x100 | u16::from(self.s);
        self.s = self.s.wrapping_add(1);
        self.read16_inpage(bus, addr)
    }

    // ===== addressing =====

    /// Zero-page indexed: wraps within page 0.
    fn addr_zpi(arg: u16, idx: u8) -> u16 {
        u16::from((arg as u8).wrapping_add(idx))
    }

    /// Absolute indexed for read-only access: one extra cycle and a
    /// speculative wrong-page read when the index crosses a page.
    fn addr_abi_read(&mut self, bus: &mut impl CpuBus, arg: u16, idx: u8) -> u16 {
        let addr = arg.wrapping_add(u16::from(idx));
        if (arg ^ addr) & 0x100 != 0 {
            self.delay(1);
            self.read8(bus, addr ^ 0x100);
        }
        addr
    }

    /// Absolute indexed for write/RMW access: no penalty cycle, but the
    /// wrong-page read always happens.
    fn addr_abi_write(&mut self, bus: &mut impl CpuBus, arg: u16, idx: u8) -> u16 {
        let addr = arg.wrapping_add(u16::from(idx));
        self.read8(bus, (arg & 0xFF00) | (addr & 0x00FF));
        addr
    }

    fn addr_ix(&mut self, bus: &mut impl CpuBus, arg: u16) -> u16 {
        let ptr = Self::addr_zpi(arg, self.x);
        self.read16_inpage(bus, ptr)
    }

    fn addr_iy_read(&mut self, bus: &mut impl CpuBus, arg: u16) -> u16 {
        let base = self.read16_inpage(bus, arg);
        let addr = base.wrapping_add(u16::from(self.y));
        if (base ^ addr) & 0x100 != 0 {
            self.delay(1);
            self.read8(bus, addr ^ 0x100);
        }
        addr
    }

    fn addr_iy_write(&mut self, bus: &mut impl CpuBus, arg: u16) -> u16 {
        let base = self.read16_inpage(bus, arg);
        let addr = base.wrapping_add(u16::from(self.y));
        self.read8(bus, (base & 0xFF00) | (addr & 0x00FF));
        addr
    }

    // ===== operand loads/stores =====

    fn ld_zp(&mut self, bus: &mut impl CpuBus, arg: u16) -> u8 {
        self.read8(bus, arg)
    }

    fn ld_zpx(&mut self, bus: &mut impl CpuBus, arg: u16) -> u8 {
        let addr = Self::addr_zpi(arg, self.x);
        self.read8(bus, addr)
    }

    fn ld_zpy(&mut self, bus: &mut impl CpuBus, arg: u16) -> u8 {
        let addr = Self::addr_zpi(arg, self.y);
        self.read8(bus, addr)
    }

    fn ld_ab(&mut self, bus: &mut impl CpuBus, arg: u16) -> u8 {
        self.read8(bus, arg)
    }

    fn ld_abx(&mut self, bus: &mut impl CpuBus, arg: u16) -> u8 {
        let addr = self.addr_abi_read(bus, arg, self.x);
        self.read8(bus, addr)
    }

    fn ld_aby(&mut self, bus: &mut impl CpuBus, arg: u16) -> u8 {
        let addr = self.addr_abi_read(bus, arg, self.y);
        self.read8(bus, addr)
    }

    fn ld_ix(&mut self, bus: &mut impl CpuBus, arg: u16) -> u8 {
        let addr = self.addr_ix(bus, arg);
        self.read8(bus, addr)
    }

    fn ld_iy(&mut self, bus: &mut impl CpuBus, arg: u16) -> u8 {
        let addr = self.addr_iy_read(bus, arg);
        self.read8(bus, addr)
    }

    fn st_zpx(&mut self, bus: &mut impl CpuBus, arg: u16, value: u8) {
        let addr = Self::addr_zpi(arg, self.x);
        self.write8(bus, addr, value);
    }

    fn st_zpy(&mut self, bus: &mut impl CpuBus, arg: u16, value: u8) {
        let addr = Self::addr_zpi(arg, self.y);
        self.write8(bus, addr, value);
    }

    fn st_abx(&mut self, bus: &mut impl CpuBus, arg: u16, value: u8) {
        let addr = self.addr_abi_write(bus, arg, self.x);
        self.write8(bus, addr, value);
    }

    fn st_aby(&mut self, bus: &mut impl CpuBus, arg: u16, value: u8) {
        let addr = self.addr_abi_write(bus, arg, self.y);
        self.write8(bus, addr, value);
    }

    fn st_ix(&mut self, bus: &mut impl CpuBus, arg: u16, value: u8) {
        let addr = self.addr_ix(bus, arg);
        self.write8(bus, addr, value);
    }

    fn st_iy(&mut self, bus: &mut impl CpuBus, arg: u16, value: u8) {
        let addr = self.addr_iy_write(bus, arg);
        self.write8(bus, addr, value);
    }

    // ===== read-modify-write access =====
    //
    // Zero-page RMW skips the hardware's redundant write-back of the
    // original value; the wider modes perform it because the target can be
    // a side-effecting register.

    fn rmw_zp(&mut self, bus: &mut impl CpuBus, arg: u16) -> (u16, u8) {
        (arg, self.read8(bus, arg))
    }

    fn rmw_zpx(&mut self, bus: &mut impl CpuBus, arg: u16) -> (u16, u8) {
        let addr = Self::addr_zpi(arg, self.x);
        (addr, self.read8(bus, addr))
    }

    fn rmw_ab(&mut self, bus: &mut impl CpuBus, arg: u16) -> (u16, u8) {
        let value = self.read8(bus, arg);
        self.write8(bus, arg, value);
        (arg, value)
    }

    fn rmw_abx(&mut self, bus: &mut impl CpuBus, arg: u16) -> (u16, u8) {
        let addr = self.addr_abi_write(bus, arg, self.x);
        let value = self.read8(bus, addr);
        self.write8(bus, addr, value);
        (addr, value)
    }

    fn rmw_aby(&mut self, bus: &mut impl CpuBus, arg: u16) -> (u16, u8) {
        let addr = self.addr_abi_write(bus, arg, self.y);
        let value = self.read8(bus, addr);
        self.write8(bus, addr, value);
        (addr, value)
    }

    fn rmw_ix(&mut self, bus: &mut impl CpuBus, arg: u16) -> (u16, u8) {
        let addr = self.addr_ix(bus, arg);
        let value = self.read8(bus, addr);
        self.write8(bus, addr, value);
        (addr, value)
    }

    fn rmw_iy(&mut self, bus: &mut impl CpuBus, arg: u16) -> (u16, u8) {
        let addr = self.addr_iy_write(bus, arg);
        let value = self.read8(bus, addr);
        self.write8(bus, addr, value);
        (addr, value)
    }

    // ===== ALU =====

    fn set_zn(&mut self, value: u8) {
        self.status.set_zn(value);
    }

    fn lda(&mut self, value: u8) {
        self.a = value;
        self.set_zn(value);
    }

    fn ldx(&mut self, value: u8) {
        self.x = value;
        self.set_zn(value);
    }

    fn ldy(&mut self, value: u8) {
        self.y = value;
        self.set_zn(value);
    }

    fn adc(&mut self, value: u8) {
        let carry = u16::from(self.status.contains(Status::C));
        let result = u16::from(self.a) + u16::from(value) + carry;
        self.status.set(Status::C, result & 0x100 != 0);
        self.status.set(
            Status::V,
            (self.a ^ value) & 0x80 == 0 && (self.a ^ result as u8) & 0x80 != 0,
        );
        self.a = result as u8;
        self.set_zn(self.a);
    }

    fn sbc(&mut self, value: u8) {
        let borrow = u16::from(!self.status.contains(Status::C));
        let result = u16::from(self.a)
            .wrapping_sub(u16::from(value))
            .wrapping_sub(borrow);
        self.status.set(Status::C, result & 0x100 == 0);
        self.status.set(
            Status::V,
            (self.a ^ value) & (self.a ^ result as u8) & 0x80 != 0,
        );
        self.a = result as u8;
        self.set_zn(self.a);
    }

    fn ora(&mut self, value: u8) {
        self.a |= value;
        self.set_zn(self.a);
    }

    fn and(&mut self, value: u8) {
        self.a &= value;
        self.set_zn(self.a);
    }

    fn eor(&mut self, value: u8) {
        self.a ^= value;
        self.set_zn(self.a);
    }

    fn asl_value(&mut self, value: u8) -> u8 {
        self.status.set(Status::C, value & 0x80 != 0);
        let result = value << 1;
        self.set_zn(result);
        result
    }

    fn lsr_value(&mut self, value: u8) -> u8 {
        self.status.set(Status::C, value & 1 != 0);
        let result = value >> 1;
        self.set_zn(result);
        result
    }

    fn rol_value(&mut self, value: u8) -> u8 {
        let carry_out = value & 0x80 != 0;
        let result = (value << 1) | u8::from(self.status.contains(Status::C));
        self.status.set(Status::C, carry_out);
        self.set_zn(result);
        result
    }

    fn ror_value(&mut self, value: u8) -> u8 {
        let carry_out = value & 1 != 0;
        let result = (value >> 1) | (u8::from(self.status.contains(Status::C)) << 7);
        self.status.set(Status::C, carry_out);
        self.set_zn(result);
        result
    }

    fn bit(&mut self, value: u8) {
        self.status.set(Status::Z, self.a & value == 0);
        self.status.set(Status::V, value & 0x40 != 0);
        self.status.set(Status::N, value & 0x80 != 0);
    }

    fn inc_value(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.set_zn(result);
        result
    }

    fn dec_value(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.set_zn(result);
        result
    }

    fn compare(&mut self, lhs: u8, rhs: u8) {
        let result = u16::from(lhs).wrapping_sub(u16::from(rhs));
        self.status.set(Status::C, result & 0x100 == 0);
        self.set_zn(result as u8);
    }

    fn branch(&mut self, arg: u16, cond: bool) {
        if cond {
            self.delay(1);
            let offset = i16::from(arg as u8 as i8);
            let target = self.pc.wrapping_add(offset as u16);
            if (self.pc ^ target) & 0x100 != 0 {
                self.delay(1);
            }
            self.pc = target;
        }
    }

    fn brk(&mut self, bus: &mut impl CpuBus) {
        self.push16(bus, self.pc);
        self.push8(bus, self.status.to_stack_byte(true));
        self.pc = self.read16(bus, VEC_IRQ);
        self.status.insert(Status::I);
    }

    fn plp(&mut self, bus: &mut impl CpuBus) {
        let value = self.pop8(bus);
        self.status = Status::from_stack_byte(value);
    }

    fn kil(&mut self) {
        self.delay(0xFF);
        self.jammed = true;
        self.pc = self.pc.wrapping_sub(1);
    }

    // ===== unofficial helpers =====

    fn axs(&mut self, value: u8) {
        let result = u16::from(self.a & self.x).wrapping_sub(u16::from(value));
        self.status.set(Status::C, result & 0x100 == 0);
        self.x = result as u8;
        self.set_zn(self.x);
    }

    fn arr(&mut self, value: u8) {
        self.a &= value;
        self.a = (self.a >> 1) | (u8::from(self.status.contains(Status::C)) << 7);
        self.set_zn(self.a);
        self.status.set(Status::C, self.a & 0x40 != 0);
        self.status.set(Status::V, (self.a ^ (self.a >> 1)) & 0x20 != 0);
    }

    fn lax(&mut self, value: u8) {
        self.a = value;
        self.x = value;
        self.set_zn(value);
    }

    /// High-byte mask shared by AHX/TAS/SHX/SHY: `((base - index) >> 8) + 1`.
    fn hi_mask(arg: u16, idx: u8) -> u8 {
        ((arg.wrapping_sub(u16::from(idx)) >> 8).wrapping_add(1)) as u8
    }

    // ===== dispatch =====

    #[allow(clippy::too_many_lines)]
    fn execute(&mut self, bus: &mut impl CpuBus, opcode: u8, arg: u16) {
        match opcode {
            //------------------------------------------------------------
            // official
            //------------------------------------------------------------
            0xA9 => self.lda(arg as u8),
            0xA5 => { let v = self.ld_zp(bus, arg); self.lda(v); }
            0xB5 => { let v = self.ld_zpx(bus, arg); self.lda(v); }
            0xAD => { let v = self.ld_ab(bus, arg); self.lda(v); }
            0xBD => { let v = self.ld_abx(bus, arg); self.lda(v); }
            0xB9 => { let v = self.ld_aby(bus, arg); self.lda(v); }
            0xA1 => { let v = self.ld_ix(bus, arg); self.lda(v); }
            0xB1 => { let v = self.ld_iy(bus, arg); self.lda(v); }

            0xA2 => self.ldx(arg as u8),
            0xA6 => { let v = self.ld_zp(bus, arg); self.ldx(v); }
            0xB6 => { let v = self.ld_zpy(bus, arg); self.ldx(v); }
            0xAE => { let v = self.ld_ab(bus, arg); self.ldx(v); }
            0xBE => { let v = self.ld_aby(bus, arg); self.ldx(v); }

            0xA0 => self.ldy(arg as u8),
            0xA4 => { let v = self.ld_zp(bus, arg); self.ldy(v); }
            0xB4 => { let v = self.ld_zpx(bus, arg); self.ldy(v); }
            0xAC => { let v = self.ld_ab(bus, arg); self.ldy(v); }
            0xBC => { let v = self.ld_abx(bus, arg); self.ldy(v); }

            // STA
            0x85 => self.write8(bus, arg, self.a),
            0x95 => self.st_zpx(bus, arg, self.a),
            0x8D => self.write8(bus, arg, self.a),
            0x9D => self.st_abx(bus, arg, self.a),
            0x99 => self.st_aby(bus, arg, self.a),
            0x81 => self.st_ix(bus, arg, self.a),
            0x91 => self.st_iy(bus, arg, self.a),

            // STX
            0x86 => self.write8(bus, arg, self.x),
            0x96 => self.st_zpy(bus, arg, self.x),
            0x8E => self.write8(bus, arg, self.x),

            // STY
            0x84 => self.write8(bus, arg, self.y),
            0x94 => self.st_zpx(bus, arg, self.y),
            0x8C => self.write8(bus, arg, self.y),

            0xAA => { self.x = self.a; self.set_zn(self.x); } // TAX
            0x8A => { self.a = self.x; self.set_zn(self.a); } // TXA
            0xA8 => { self.y = self.a; self.set_zn(self.y); } // TAY
            0x98 => { self.a = self.y; self.set_zn(self.a); } // TYA
            0xBA => { self.x = self.s; self.set_zn(self.x); } // TSX
            0x9A => self.s = self.x,                          // TXS

            0x69 => self.adc(arg as u8),
            0x65 => { let v = self.ld_zp(bus, arg); self.adc(v); }
            0x75 => { let v = self.ld_zpx(bus, arg); self.adc(v); }
            0x6D => { let v = self.ld_ab(bus, arg); self.adc(v); }
            0x7D => { let v = self.ld_abx(bus, arg); self.adc(v); }
            0x79 => { let v = self.ld_aby(bus, arg); self.adc(v); }
            0x61 => { let v = self.ld_ix(bus, arg); self.adc(v); }
            0x71 => { let v = self.ld_iy(bus, arg); self.adc(v); }

            0xE9 => self.sbc(arg as u8),
            0xE5 => { let v = self.ld_zp(bus, arg); self.sbc(v); }
            0xF5 => { let v = self.ld_zpx(bus, arg); self.sbc(v); }
            0xED => { let v = self.ld_ab(bus, arg); self.sbc(v); }
            0xFD => { let v = self.ld_abx(bus, arg); self.sbc(v); }
            0xF9 => { let v = self.ld_aby(bus, arg); self.sbc(v); }
            0xE1 => { let v = self.ld_ix(bus, arg); self.sbc(v); }
            0xF1 => { let v = self.ld_iy(bus, arg); self.sbc(v); }

            0x09 => self.ora(arg as u8),
            0x05 => { let v = self.ld_zp(bus, arg); self.ora(v); }
            0x15 => { let v = self.ld_zpx(bus, arg); self.ora(v); }
            0x0D => { let v = self.ld_ab(bus, arg); self.ora(v); }
            0x1D => { let v = self.ld_abx(bus, arg); self.ora(v); }
            0x19 => { let v = self.ld_aby(bus, arg); self.ora(v); }
            0x01 => { let v = self.ld_ix(bus, arg); self.ora(v); }
            0x11 => { let v = self.ld_iy(bus, arg); self.ora(v); }

            0x29 => self.and(arg as u8),
            0x25 => { let v = self.ld_zp(bus, arg); self.and(v); }
            0x35 => { let v = self.ld_zpx(bus, arg); self.and(v); }
            0x2D => { let v = self.ld_ab(bus, arg); self.and(v); }
            0x3D => { let v = self.ld_abx(bus, arg); self.and(v); }
            0x39 => { let v = self.ld_aby(bus, arg); self.and(v); }
            0x21 => { let v = self.ld_ix(bus, arg); self.and(v); }
            0x31 => { let v = self.ld_iy(bus, arg); self.and(v); }

            0x49 => self.eor(arg as u8),
            0x45 => { let v = self.ld_zp(bus, arg); self.eor(v); }
            0x55 => { let v = self.ld_zpx(bus, arg); self.eor(v); }
            0x4D => { let v = self.ld_ab(bus, arg); self.eor(v); }
            0x5D => { let v = self.ld_abx(bus, arg); self.eor(v); }
            0x59 => { let v = self.ld_aby(bus, arg); self.eor(v); }
            0x41 => { let v = self.ld_ix(bus, arg); self.eor(v); }
            0x51 => { let v = self.ld_iy(bus, arg); self.eor(v); }

            0x0A => self.a = self.asl_value(self.a),
            0x06 => { let (addr, v) = self.rmw_zp(bus, arg); let v = self.asl_value(v); self.write8(bus, addr, v); }
            0x16 => { let (addr, v) = self.rmw_zpx(bus, arg); let v = self.asl_value(v); self.write8(bus, addr, v); }
            0x0E => { let (addr, v) = self.rmw_ab(bus, arg); let v = self.asl_value(v); self.write8(bus, addr, v); }
            0x1E => { let (addr, v) = self.rmw_abx(bus, arg); let v = self.asl_value(v); self.write8(bus, addr, v); }

            0x4A => self.a = self.lsr_value(self.a),
            0x46 => { let (addr, v) = self.rmw_zp(bus, arg); let v = self.lsr_value(v); self.write8(bus, addr, v); }
            0x56 => { let (addr, v) = self.rmw_zpx(bus, arg); let v = self.lsr_value(v); self.write8(bus, addr, v); }
            0x4E => { let (addr, v) = self.rmw_ab(bus, arg); let v = self.lsr_value(v); self.write8(bus, addr, v); }
            0x5E => { let (addr, v) = self.rmw_abx(bus, arg); let v = self.lsr_value(v); self.write8(bus, addr, v); }

            0x2A => self.a = self.rol_value(self.a),
            0x26 => { let (addr, v) = self.rmw_zp(bus, arg); let v = self.rol_value(v); self.write8(bus, addr, v); }
            0x36 => { let (addr, v) = self.rmw_zpx(bus, arg); let v = self.rol_value(v); self.write8(bus, addr, v); }
            0x2E => { let (addr, v) = self.rmw_ab(bus, arg); let v = self.rol_value(v); self.write8(bus, addr, v); }
            0x3E => { let (addr, v) = self.rmw_abx(bus, arg); let v = self.rol_value(v); self.write8(bus, addr, v); }

            0x6A => self.a = self.ror_value(self.a),
            0x66 => { let (addr, v) = self.rmw_zp(bus, arg); let v = self.ror_value(v); self.write8(bus, addr, v); }
            0x76 => { let (addr, v) = self.rmw_zpx(bus, arg); let v = self.ror_value(v); self.write8(bus, addr, v); }
            0x6E => { let (addr, v) = self.rmw_ab(bus, arg); let v = self.ror_value(v); self.write8(bus, addr, v); }
            0x7E => { let (addr, v) = self.rmw_abx(bus, arg); let v = self.ror_value(v); self.write8(bus, addr, v); }

            0x24 => { let v = self.ld_zp(bus, arg); self.bit(v); }
            0x2C => { let v = self.ld_ab(bus, arg); self.bit(v); }

            0xE6 => { let (addr, v) = self.rmw_zp(bus, arg); let v = self.inc_value(v); self.write8(bus, addr, v); }
            0xF6 => { let (addr, v) = self.rmw_zpx(bus, arg); let v = self.inc_value(v); self.write8(bus, addr, v); }
            0xEE => { let (addr, v) = self.rmw_ab(bus, arg); let v = self.inc_value(v); self.write8(bus, addr, v); }
            0xFE => { let (addr, v) = self.rmw_abx(bus, arg); let v = self.inc_value(v); self.write8(bus, addr, v); }
            0xE8 => self.x = self.inc_value(self.x), // INX
            0xC8 => self.y = self.inc_value(self.y), // INY

            0xC6 => { let (addr, v) = self.rmw_zp(bus, arg); let v = self.dec_value(v); self.write8(bus, addr, v); }
            0xD6 => { let (addr, v) = self.rmw_zpx(bus, arg); let v = self.dec_value(v); self.write8(bus, addr, v); }
            0xCE => { let (addr, v) = self.rmw_ab(bus, arg); let v = self.dec_value(v); self.write8(bus, addr, v); }
            0xDE => { let (addr, v) = self.rmw_abx(bus, arg); let v = self.dec_value(v); self.write8(bus, addr, v); }
            0xCA => self.x = self.dec_value(self.x), // DEX
            0x88 => self.y = self.dec_value(self.y), // DEY

            0xC9 => self.compare(self.a, arg as u8),
            0xC5 => { let v = self.ld_zp(bus, arg); self.compare(self.a, v); }
            0xD5 => { let v = self.ld_zpx(bus, arg); self.compare(self.a, v); }
            0xCD => { let v = self.ld_ab(bus, arg); self.compare(self.a, v); }
            0xDD => { let v = self.ld_abx(bus, arg); self.compare(self.a, v); }
            0xD9 => { let v = self.ld_aby(bus, arg); self.compare(self.a, v); }
            0xC1 => { let v = self.ld_ix(bus, arg); self.compare(self.a, v); }
            0xD1 => { let v = self.ld_iy(bus, arg); self.compare(self.a, v); }

            0xE0 => self.compare(self.x, arg as u8),
            0xE4 => { let v = self.ld_zp(bus, arg); self.compare(self.x, v); }
            0xEC => { let v = self.ld_ab(bus, arg); self.compare(self.x, v); }

            0xC0 => self.compare(self.y, arg as u8),
            0xC4 => { let v = self.ld_zp(bus, arg); self.compare(self.y, v); }
            0xCC => { let v = self.ld_ab(bus, arg); self.compare(self.y, v); }

            0xB0 => { let c = self.status.contains(Status::C); self.branch(arg, c); }  // BCS
            0x90 => { let c = self.status.contains(Status::C); self.branch(arg, !c); } // BCC
            0xF0 => { let z = self.status.contains(Status::Z); self.branch(arg, z); }  // BEQ
            0xD0 => { let z = self.status.contains(Status::Z); self.branch(arg, !z); } // BNE
            0x70 => { let v = self.status.contains(Status::V); self.branch(arg, v); }  // BVS
            0x50 => { let v = self.status.contains(Status::V); self.branch(arg, !v); } // BVC
            0x30 => { let n = self.status.contains(Status::N); self.branch(arg, n); }  // BMI
            0x10 => { let n = self.status.contains(Status::N); self.branch(arg, !n); } // BPL

            0x38 => self.status.insert(Status::C), // SEC
            0x18 => self.status.remove(Status::C), // CLC
            0x78 => self.status.insert(Status::I), // SEI
            0x58 => self.status.remove(Status::I), // CLI
            0xF8 => self.status.insert(Status::D), // SED
            0xD8 => self.status.remove(Status::D), // CLD
            0xB8 => self.status.remove(Status::V), // CLV

            0x4C => self.pc = arg,                              // JMP abs
            0x6C => self.pc = self.read16_inpage(bus, arg),     // JMP (ind)

            0x20 => { self.push16(bus, self.pc.wrapping_sub(1)); self.pc = arg; } // JSR
            0x60 => self.pc = self.pop16(bus).wrapping_add(1),                    // RTS
            0x40 => { self.plp(bus); self.pc = self.pop16(bus); }                 // RTI

            0x00 => self.brk(bus),

            0x48 => self.push8(bus, self.a),                              // PHA
            0x08 => self.push8(bus, self.status.to_stack_byte(true)),     // PHP

            0x68 => { let v = self.pop8(bus); self.a = v; self.set_zn(v); } // PLA
            0x28 => self.plp(bus),                                          // PLP

            0xEA => {} // NOP

            //------------------------------------------------------------
            // unofficial
            //------------------------------------------------------------
            0x02 | 0x12 | 0x22 | 0x32 | 0x42 | 0x52 | 0x62 | 0x72 | 0x92 | 0xB2 | 0xD2
            | 0xF2 => self.kil(),

            // NOP
            0x1A | 0x3A | 0x5A | 0x7A | 0xDA | 0xFA => {}

            // DOP: immediate and zero-page operands have no side effects,
            // so the dummy read is skipped.
            0x80 | 0x82 | 0x89 | 0xC2 | 0xE2 => {}
            0x04 | 0x44 | 0x64 => {}
            0x14 | 0x34 | 0x54 | 0x74 | 0xD4 | 0xF4 => {}

            // TOP: absolute operands can hit side-effecting registers, so
            // the read happens for real (with the page-cross penalty).
            0x0C => { self.ld_ab(bus, arg); }
            0x1C | 0x3C | 0x5C | 0x7C | 0xDC | 0xFC => { self.ld_abx(bus, arg); }

            0xEB => self.sbc(arg as u8), // SBC alias

            0x4B => { self.a &= arg as u8; self.a = self.lsr_value(self.a); } // ALR

            0x0B | 0x2B => { // ANC
                self.and(arg as u8);
                let n = self.status.contains(Status::N);
                self.status.set(Status::C, n);
            }

            0x6B => self.arr(arg as u8),

            0xCB => self.axs(arg as u8),

            0xA7 => { let v = self.ld_zp(bus, arg); self.lax(v); }
            0xB7 => { let v = self.ld_zpy(bus, arg); self.lax(v); }
            0xAF => { let v = self.ld_ab(bus, arg); self.lax(v); }
            0xBF => { let v = self.ld_aby(bus, arg); self.lax(v); }
            0xA3 => { let v = self.ld_ix(bus, arg); self.lax(v); }
            0xB3 => { let v = self.ld_iy(bus, arg); self.lax(v); }

            // SAX
            0x87 => self.write8(bus, arg, self.a & self.x),
            0x97 => { let v = self.a & self.x; self.st_zpy(bus, arg, v); }
            0x8F => self.write8(bus, arg, self.a & self.x),
            0x83 => { let v = self.a & self.x; self.st_ix(bus, arg, v); }

            // DCP
            0xC7 => { let (addr, v) = self.rmw_zp(bus, arg); let v = v.wrapping_sub(1); self.compare(self.a, v); self.write8(bus, addr, v); }
            0xD7 => { let (addr, v) = self.rmw_zpx(bus, arg); let v = v.wrapping_sub(1); self.compare(self.a, v); self.write8(bus, addr, v); }
            0xCF => { let (addr, v) = self.rmw_ab(bus, arg); let v = v.wrapping_sub(1); self.compare(self.a, v); self.write8(bus, addr, v); }
            0xDF => { let (addr, v) = self.rmw_abx(bus, arg); let v = v.wrapping_sub(1); self.compare(self.a, v); self.write8(bus, addr, v); }
            0xDB => { let (addr, v) = self.rmw_aby(bus, arg); let v = v.wrapping_sub(1); self.compare(self.a, v); self.write8(bus, addr, v); }
            0xC3 => { let (addr, v) = self.rmw_ix(bus, arg); let v = v.wrapping_sub(1); self.compare(self.a, v); self.write8(bus, addr, v); }
            0xD3 => { let (addr, v) = self.rmw_iy(bus, arg); let v = v.wrapping_sub(1); self.compare(self.a, v); self.write8(bus, addr, v); }

            // ISC
            0xE7 => { let (addr, v) = self.rmw_zp(bus, arg); let v = v.wrapping_add(1); self.sbc(v); self.write8(bus, addr, v); }
            0xF7 => { let (addr, v) = self.rmw_zpx(bus, arg); let v = v.wrapping_add(1); self.sbc(v); self.write8(bus, addr, v); }
            0xEF => { let (addr, v) = self.rmw_ab(bus, arg); let v = v.wrapping_add(1); self.sbc(v); self.write8(bus, addr, v); }
            0xFF => { let (addr, v) = self.rmw_abx(bus, arg); let v = v.wrapping_add(1); self.sbc(v); self.write8(bus, addr, v); }
            0xFB => { let (addr, v) = self.rmw_aby(bus, arg); let v = v.wrapping_add(1); self.sbc(v); self.write8(bus, addr, v); }
            0xE3 => { let (addr, v) = self.rmw_ix(bus, arg); let v = v.wrapping_add(1); self.sbc(v); self.write8(bus, addr, v); }
            0xF3 => { let (addr, v) = self.rmw_iy(bus, arg); let v = v.wrapping_add(1); self.sbc(v); self.write8(bus, addr, v); }

            // RLA
            0x27 => { let (addr, v) = self.rmw_zp(bus, arg); let v = self.rla_shift(v); self.and(v); self.write8(bus, addr, v); }
            0x37 => { let (addr, v) = self.rmw_zpx(bus, arg); let v = self.rla_shift(v); self.and(v); self.write8(bus, addr, v); }
            0x2F => { let (addr, v) = self.rmw_ab(bus, arg); let v = self.rla_shift(v); self.and(v); self.write8(bus, addr, v); }
            0x3F => { let (addr, v) = self.rmw_abx(bus, arg); let v = self.rla_shift(v); self.and(v); self.write8(bus, addr, v); }
            0x3B => { let (addr, v) = self.rmw_aby(bus, arg); let v = self.rla_shift(v); self.and(v); self.write8(bus, addr, v); }
            0x23 => { let (addr, v) = self.rmw_ix(bus, arg); let v = self.rla_shift(v); self.and(v); self.write8(bus, addr, v); }
            0x33 => { let (addr, v) = self.rmw_iy(bus, arg); let v = self.rla_shift(v); self.and(v); self.write8(bus, addr, v); }

            // RRA
            0x67 => { let (addr, v) = self.rmw_zp(bus, arg); let v = self.rra_shift(v); self.adc(v); self.write8(bus, addr, v); }
            0x77 => { let (addr, v) = self.rmw_zpx(bus, arg); let v = self.rra_shift(v); self.adc(v); self.write8(bus, addr, v); }
            0x6F => { let (addr, v) = self.rmw_ab(bus, arg); let v = self.rra_shift(v); self.adc(v); self.write8(bus, addr, v); }
            0x7F => { let (addr, v) = self.rmw_abx(bus, arg); let v = self.rra_shift(v); self.adc(v); self.write8(bus, addr, v); }
            0x7B => { let (addr, v) = self.rmw_aby(bus, arg); let v = self.rra_shift(v); self.adc(v); self.write8(bus, addr, v); }
            0x63 => { let (addr, v) = self.rmw_ix(bus, arg); let v = self.rra_shift(v); self.adc(v); self.write8(bus, addr, v); }
            0x73 => { let (addr, v) = self.rmw_iy(bus, arg); let v = self.rra_shift(v); self.adc(v); self.write8(bus, addr, v); }

            // SLO (writes the shifted value before the ORA)
            0x07 => { let (addr, v) = self.rmw_zp(bus, arg); let v = self.slo_shift(v); self.write8(bus, addr, v); self.ora(v); }
            0x17 => { let (addr, v) = self.rmw_zpx(bus, arg); let v = self.slo_shift(v); self.write8(bus, addr, v); self.ora(v); }
            0x0F => { let (addr, v) = self.rmw_ab(bus, arg); let v = self.slo_shift(v); self.write8(bus, addr, v); self.ora(v); }
            0x1F => { let (addr, v) = self.rmw_abx(bus, arg); let v = self.slo_shift(v); self.write8(bus, addr, v); self.ora(v); }
            0x1B => { let (addr, v) = self.rmw_aby(bus, arg); let v = self.slo_shift(v); self.write8(bus, addr, v); self.ora(v); }
            0x03 => { let (addr, v) = self.rmw_ix(bus, arg); let v = self.slo_shift(v); self.write8(bus, addr, v); self.ora(v); }
            0x13 => { let (addr, v) = self.rmw_iy(bus, arg); let v = self.slo_shift(v); self.write8(bus, addr, v); self.ora(v); }

            // SRE (EOR happens before the write-back)
            0x47 => { let (addr, v) = self.rmw_zp(bus, arg); let v = self.sre_shift(v); self.eor(v); self.write8(bus, addr, v); }
            0x57 => { let (addr, v) = self.rmw_zpx(bus, arg); let v = self.sre_shift(v); self.eor(v); self.write8(bus, addr, v); }
            0x4F => { let (addr, v) = self.rmw_ab(bus, arg); let v = self.sre_shift(v); self.eor(v); self.write8(bus, addr, v); }
            0x5F => { let (addr, v) = self.rmw_abx(bus, arg); let v = self.sre_shift(v); self.eor(v); self.write8(bus, addr, v); }
            0x5B => { let (addr, v) = self.rmw_aby(bus, arg); let v = self.sre_shift(v); self.eor(v); self.write8(bus, addr, v); }
            0x43 => { let (addr, v) = self.rmw_ix(bus, arg); let v = self.sre_shift(v); self.eor(v); self.write8(bus, addr, v); }
            0x53 => { let (addr, v) = self.rmw_iy(bus, arg); let v = self.sre_shift(v); self.eor(v); self.write8(bus, addr, v); }

            0xBB => { // LAS
                let (addr, v) = self.rmw_aby(bus, arg);
                let result = self.s & v;
                self.a = result;
                self.x = result;
                self.s = result;
                self.set_zn(result);
                self.write8(bus, addr, v);
            }

            0x9F => { let v = self.a & self.x & Self::hi_mask(arg, self.y); self.st_aby(bus, arg, v); } // AHX abs,Y
            0x93 => { let v = self.a & self.x & Self::hi_mask(arg, self.y); self.st_iy(bus, arg, v); }  // AHX (zp),Y

            0x9B => { // TAS
                self.s = self.a & self.x;
                let v = self.s & Self::hi_mask(arg, self.y);
                self.st_aby(bus, arg, v);
            }

            0x9E => { let v = self.x & Self::hi_mask(arg, self.y); self.st_aby(bus, arg, v); } // SHX
            0x9C => { let v = self.y & Self::hi_mask(arg, self.x); self.st_abx(bus, arg, v); } // SHY

            0xAB => { // LAX #imm, with the magic OR
                self.a |= 0xFF;
                self.and(arg as u8);
                self.x = self.a;
            }

            0x8B => { // XAA, with the magic constant
                self.a |= 0xEE;
                self.a &= self.x;
                self.and(arg as u8);
            }
        }
    }

    fn rla_shift(&mut self, value: u8) -> u8 {
        let carry_out = value & 0x80 != 0;
        let result = (value << 1) | u8::from(self.status.contains(Status::C));
        self.status.set(Status::C, carry_out);
        result
    }

    fn rra_shift(&mut self, value: u8) -> u8 {
        let carry_out = value & 1 != 0;
        let result = (value >> 1) | (u8::from(self.status.contains(Status::C)) << 7);
        self.status.set(Status::C, carry_out);
        result
    }

    fn slo_shift(&mut self, value: u8) -> u8 {
        self.status.set(Status::C, value & 0x80 != 0);
        value << 1
    }

    fn sre_shift(&mut self, value: u8) -> u8 {
        self.status.set(Status::C, value & 1 != 0);
        value >> 1
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
