//! APU register decode and frame sequencer.

use crate::bus::ApuBus;
use crate::dmc::Dmc;
use crate::noise::Noise;
use crate::pulse::Pulse;
use crate::sweep::PulseChannel;
use crate::triangle::Triangle;

/// Cycles between sequencer steps, in 1/48 CPU cycles. The fractional step
/// spacing (29830/4 CPU cycles) stays exact at this resolution.
const STEP_CYCLE: i32 = 48 * 29830 / 4;

/// NES 2A03 APU.
pub struct Apu {
    sq1: Pulse,
    sq2: Pulse,
    tri: Triangle,
    noi: Noise,
    dmc: Dmc,
    /// Sequencer step about to fire (0-3).
    next_step: u32,
    /// 1/48-CPU-cycle countdown to the next step.
    rest_cycle: i32,
    /// Frame IRQ armed ($4017 bit 6 clear). Cleared once the IRQ fires or
    /// $4015 is read.
    frame_irq_on: bool,
    /// 5-step mode: step 3 takes two periods and no frame IRQ ever fires.
    step5: bool,
    /// CPU cycles into the current frame.
    sound_timestamp: i32,
}

impl Apu {
    /// Create a powered-off APU.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sq1: Pulse::new(PulseChannel::One),
            sq2: Pulse::new(PulseChannel::Two),
            tri: Triangle::new(),
            noi: Noise::new(),
            dmc: Dmc::new(),
            next_step: 0,
            rest_cycle: STEP_CYCLE,
            frame_irq_on: true,
            step5: false,
            sound_timestamp: 0,
        }
    }

    /// Power-on reset.
    pub fn hard_reset(&mut self) {
        self.sq1.hard_reset();
        self.sq2.hard_reset();
        self.tri.hard_reset();
        self.noi.hard_reset();
        self.dmc.hard_reset();

        self.next_step = 0;
        self.rest_cycle = STEP_CYCLE;
        self.frame_irq_on = true;
        self.step5 = false;
        self.sound_timestamp = 0;
    }

    /// Reset-button reset.
    pub fn soft_reset(&mut self) {
        self.sq1.soft_reset();
        self.sq2.soft_reset();
        self.tri.soft_reset();
        self.noi.soft_reset();
        self.dmc.soft_reset();

        self.next_step = 0;
        self.rest_cycle = STEP_CYCLE;
        self.frame_irq_on = true;
        self.step5 = false;
        self.sound_timestamp = 0;
    }

    /// Advance by `cycles` CPU cycles: at most one sequencer step fires,
    /// then the DMC catches up (possibly fetching over DMA).
    pub fn tick(&mut self, cycles: u32, bus: &mut impl ApuBus) {
        self.rest_cycle -= 48 * cycles as i32;
        if self.rest_cycle <= 0 {
            self.step(bus);
        }

        self.dmc.tick(cycles, self.sound_timestamp, bus);

        self.sound_timestamp += cycles as i32;
    }

    /// Fire one sequencer step.
    fn step(&mut self, bus: &mut impl ApuBus) {
        self.flush_channels();

        if self.frame_irq_on && self.next_step == 0 && !self.step5 {
            self.frame_irq_on = false;
            log::trace!("frame irq");
            bus.trigger_frame_irq();
        }

        self.frame_quarter();
        if self.next_step == 0 || self.next_step == 2 {
            self.frame_half();
        }

        // In 5-step mode the gap leaving step 3 doubles.
        self.rest_cycle += STEP_CYCLE;
        if self.step5 && self.next_step == 3 {
            self.rest_cycle += STEP_CYCLE;
        }
        self.next_step = (self.next_step + 1) & 3;
    }

    /// Flush the four waveform channels up to the current timestamp (the
    /// DMC flushes itself inside its tick).
    fn flush_channels(&mut self) {
        self.sq1.gen_sound(self.sound_timestamp);
        self.sq2.gen_sound(self.sound_timestamp);
        self.tri.gen_sound(self.sound_timestamp);
        self.noi.gen_sound(self.sound_timestamp);
    }

    /// Quarter-frame signal: envelopes and the triangle linear counter.
    fn frame_quarter(&mut self) {
        self.sq1.frame_quarter();
        self.sq2.frame_quarter();
        self.tri.frame_quarter();
        self.noi.frame_quarter();
    }

    /// Half-frame signal: length counters and sweeps.
    fn frame_half(&mut self) {
        self.sq1.frame_half();
        self.sq2.frame_half();
        self.tri.frame_half();
        self.noi.frame_half();
    }

    /// $4015 read: channel activity plus the IRQ flags. Clears the frame
    /// IRQ flag.
    pub fn read_status(&mut self) -> u8 {
        let mut status = 0u8;
        if self.sq1.active() {
            status |= 0x01;
        }
        if self.sq2.active() {
            status |= 0x02;
        }
        if self.tri.active() {
            status |= 0x04;
        }
        if self.noi.active() {
            status |= 0x08;
        }
        if self.dmc.active() {
            status |= 0x10;
        }
        if self.frame_irq_on {
            status |= 0x40;
        }
        if self.dmc.irq_flag() {
            status |= 0x80;
        }

        self.frame_irq_on = false;

        status
    }

    /// Register write dispatch for $4000-$4013, $4015 and $4017.
    pub fn write(&mut self, addr: u16, value: u8, bus: &mut impl ApuBus) {
        let ts = self.sound_timestamp;
        match addr {
            0x4000 => self.sq1.write_ctrl(value, ts),
            0x4001 => self.sq1.write_sweep(value),
            0x4002 => self.sq1.write_timer_lo(value, ts),
            0x4003 => self.sq1.write_timer_hi(value, ts),

            0x4004 => self.sq2.write_ctrl(value, ts),
            0x4005 => self.sq2.write_sweep(value),
            0x4006 => self.sq2.write_timer_lo(value, ts),
            0x4007 => self.sq2.write_timer_hi(value, ts),

            0x4008 => self.tri.write_ctrl(value),
            0x400A => self.tri.write_timer_lo(value, ts),
            0x400B => self.tri.write_timer_hi(value, ts),

            0x400C => self.noi.write_ctrl(value, ts),
            0x400E => self.noi.write_mode(value, ts),
            0x400F => self.noi.write_length(value, ts),

            0x4010 => self.dmc.write_ctrl(value, ts, bus),
            0x4011 => self.dmc.write_level(value, ts),
            0x4012 => self.dmc.write_addr(value),
            0x4013 => self.dmc.write_length(value),

            0x4015 => self.write_enables(value),
            0x4017 => self.write_frame_counter(value),

            // $4009, $400D and anything else in range: no register there.
            _ => {}
        }
    }

    /// $4015 write: per-channel enables.
    fn write_enables(&mut self, value: u8) {
        let ts = self.sound_timestamp;
        self.sq1.enable(value & 0x01 != 0, ts);
        self.sq2.enable(value & 0x02 != 0, ts);
        self.tri.enable(value & 0x04 != 0, ts);
        self.noi.enable(value & 0x08 != 0, ts);
        self.dmc.enable(value & 0x10 != 0, ts);
    }

    /// $4017 write: sequencer restart. Bit 7 pulses quarter+half right
    /// away; bit 6 gates the frame IRQ.
    fn write_frame_counter(&mut self, value: u8) {
        self.flush_channels();

        if value & 0x80 != 0 {
            self.frame_quarter();
            self.frame_half();
        }

        self.next_step = 1;
        self.rest_cycle = STEP_CYCLE;

        self.frame_irq_on = value & 0x40 == 0;
        self.step5 = value & 0x80 != 0;
    }

    /// Begin a frame: rewind all channel buffers.
    pub fn start_frame(&mut self) {
        self.sound_timestamp = 0;
        self.sq1.start_frame();
        self.sq2.start_frame();
        self.tri.start_frame();
        self.noi.start_frame();
        self.dmc.start_frame();
    }

    /// Finish a frame: flush every channel to the final timestamp.
    pub fn end_frame(&mut self) {
        self.sq1.gen_sound(self.sound_timestamp);
        self.sq2.gen_sound(self.sound_timestamp);
        self.tri.gen_sound(self.sound_timestamp);
        self.noi.gen_sound(self.sound_timestamp);
        self.dmc.gen_sound(self.sound_timestamp);
    }

    /// Square 1 samples for the current frame, one per CPU cycle, in [0,15].
    #[must_use]
    pub fn sound_sq1(&self) -> &[u8] {
        self.sq1.samples()
    }

    /// Square 2 samples for the current frame.
    #[must_use]
    pub fn sound_sq2(&self) -> &[u8] {
        self.sq2.samples()
    }

    /// Triangle samples for the current frame.
    #[must_use]
    pub fn sound_tri(&self) -> &[u8] {
        self.tri.samples()
    }

    /// Noise samples for the current frame.
    #[must_use]
    pub fn sound_noi(&self) -> &[u8] {
        self.noi.samples()
    }

    /// DMC samples for the current frame, in [0,127].
    #[must_use]
    pub fn sound_dmc(&self) -> &[u8] {
        self.dmc.samples()
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullBus {
        frame_irqs: u32,
        dmc_irqs: u32,
    }

    impl NullBus {
        fn new() -> Self {
            Self {
                frame_irqs: 0,
                dmc_irqs: 0,
            }
        }
    }

    impl ApuBus for NullBus {
        fn read_dmc(&mut self, _addr: u16) -> u8 {
            0
        }

        fn trigger_frame_irq(&mut self) {
            self.frame_irqs += 1;
        }

        fn trigger_dmc_irq(&mut self) {
            self.dmc_irqs += 1;
        }
    }

    /// Run whole CPU cycles through the sequencer.
    fn run_cycles(apu: &mut Apu, bus: &mut NullBus, cycles: u32) {
        let mut left = cycles;
        while left > 0 {
            let chunk = left.min(100);
            apu.tick(chunk, bus);
            left -= chunk;
        }
    }

    /// CPU cycles per sequencer step, rounded up.
    const STEP_CPU: u32 = 29830 / 4 + 1;

    #[test]
    fn frame_irq_fires_on_step_zero() {
        let mut apu = Apu::new();
        let mut bus = NullBus::new();

        // Steps fire in order 0,1,2,3; the IRQ comes with the first one.
        run_cycles(&mut apu, &mut bus, STEP_CPU);
        assert_eq!(bus.frame_irqs, 1);

        // Armed flag dropped: later laps stay quiet until rearmed.
        run_cycles(&mut apu, &mut bus, STEP_CPU * 8);
        assert_eq!(bus.frame_irqs, 1);
    }

    #[test]
    fn status_read_reports_and_clears_frame_irq() {
        let mut apu = Apu::new();
        assert_eq!(apu.read_status() & 0x40, 0x40);
        assert_eq!(apu.read_status() & 0x40, 0);
    }

    #[test]
    fn five_step_mode_never_raises_frame_irq() {
        let mut apu = Apu::new();
        let mut bus = NullBus::new();
        apu.write(0x4017, 0x80, &mut bus); // 5-step, IRQ not inhibited

        run_cycles(&mut apu, &mut bus, STEP_CPU * 24);
        assert_eq!(bus.frame_irqs, 0);
    }

    #[test]
    fn irq_inhibit_bit_disarms() {
        let mut apu = Apu::new();
        let mut bus = NullBus::new();
        apu.write(0x4017, 0x40, &mut bus);

        run_cycles(&mut apu, &mut bus, STEP_CPU * 8);
        assert_eq!(bus.frame_irqs, 0);
    }

    #[test]
    fn write_4017_bit7_pulses_quarter_and_half() {
        let mut apu = Apu::new();
        let mut bus = NullBus::new();

        // Load a short length on SQ1, then pulse: one half-frame clock.
        apu.write(0x4015, 0x01, &mut bus);
        apu.write(0x4000, 0x10, &mut bus); // constant volume, no halt
        apu.write(0x4003, 0x18, &mut bus); // length index 3 -> 2
        apu.write(0x4017, 0x80, &mut bus);
        apu.write(0x4017, 0x80, &mut bus);
        assert_eq!(apu.read_status() & 0x01, 0, "two pulses drained length 2");
    }

    #[test]
    fn status_reports_channel_activity() {
        let mut apu = Apu::new();
        let mut bus = NullBus::new();

        apu.write(0x4015, 0x0F, &mut bus);
        apu.write(0x4003, 0xF8, &mut bus);
        apu.write(0x4007, 0xF8, &mut bus);
        apu.write(0x400B, 0xF8, &mut bus);
        apu.write(0x400F, 0xF8, &mut bus);
        assert_eq!(apu.read_status() & 0x0F, 0x0F);

        apu.write(0x4015, 0x00, &mut bus);
        assert_eq!(apu.read_status() & 0x0F, 0x00);
    }

    #[test]
    fn end_frame_flushes_all_channels() {
        let mut apu = Apu::new();
        let mut bus = NullBus::new();
        apu.start_frame();
        apu.tick(100, &mut bus);
        apu.end_frame();
        assert_eq!(apu.sound_sq1().len(), 100);
        assert_eq!(apu.sound_sq2().len(), 100);
        assert_eq!(apu.sound_tri().len(), 100);
        assert_eq!(apu.sound_noi().len(), 100);
        assert_eq!(apu.sound_dmc().len(), 100);
    }

    #[test]
    fn sample_ranges_stay_legal() {
        let mut apu = Apu::new();
        let mut bus = NullBus::new();
        apu.start_frame();
        apu.write(0x4015, 0x1F, &mut bus);
        apu.write(0x4000, 0x3F, &mut bus);
        apu.write(0x4002, 0x80, &mut bus);
        apu.write(0x4003, 0x11, &mut bus);
        apu.write(0x4011, 0x7F, &mut bus);
        run_cycles(&mut apu, &mut bus, 20000);
        apu.end_frame();

        assert!(apu.sound_sq1().iter().all(|&s| s <= 15));
        assert!(apu.sound_tri().iter().all(|&s| s <= 15));
        assert!(apu.sound_noi().iter().all(|&s| s <= 15));
        assert!(apu.sound_dmc().iter().all(|&s| s <= 127));
    }
}
