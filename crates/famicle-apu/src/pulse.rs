//! Square (pulse) channel.

use crate::buffer::SampleBuf;
use crate::envelope::Envelope;
use crate::length_counter::LengthCounter;
use crate::sweep::{PulseChannel, Sweep};

/// Duty sequences, laid out for a sequencer that starts at step 7 after a
/// length write (the FCEUX phase convention).
const DUTY_TABLE: [[u8; 8]; 4] = [
    [1, 0, 0, 0, 0, 0, 0, 0], // 12.5%
    [1, 1, 0, 0, 0, 0, 0, 0], // 25%
    [1, 1, 1, 1, 0, 0, 0, 0], // 50%
    [1, 1, 1, 1, 1, 1, 0, 0], // 75%
];

/// One of the two square channels.
pub(crate) struct Pulse {
    envelope: Envelope,
    sweep: Sweep,
    length: LengthCounter,
    /// Duty select (0-3).
    duty: u8,
    /// Sequencer step; only the low three bits are consulted.
    step: u32,
    /// Timer down-counter, in CPU cycles.
    timer: u32,
    /// 11-bit timer register ($4002/$4003 pair, also rewritten by the sweep).
    timer_reg: u16,
    buf: SampleBuf,
}

impl Pulse {
    pub fn new(channel: PulseChannel) -> Self {
        Self {
            envelope: Envelope::default(),
            sweep: Sweep::new(channel),
            length: LengthCounter::default(),
            duty: 0,
            step: 0,
            timer: 0x7FF,
            timer_reg: 0,
            buf: SampleBuf::new(),
        }
    }

    pub fn hard_reset(&mut self) {
        self.duty = 0;
        self.envelope.reset();
        self.sweep.reset();
        self.length.reset();
        self.soft_reset();
    }

    pub fn soft_reset(&mut self) {
        self.length.set_enabled(false);
        self.timer = 0x7FF;
        self.timer_reg = 0;
        self.sweep.set_enabled(false);
        self.step = 0;
    }

    /// $4015 enable bit.
    pub fn enable(&mut self, enabled: bool, timestamp: i32) {
        self.gen_sound(timestamp);
        self.length.set_enabled(enabled);
    }

    /// Length counter still running ($4015 read).
    pub fn active(&self) -> bool {
        self.length.active()
    }

    /// $4000/$4004: duty and envelope parameters.
    pub fn write_ctrl(&mut self, value: u8, timestamp: i32) {
        self.gen_sound(timestamp);

        self.duty = value >> 6;
        self.envelope.write(value);
        self.length.set_halt(self.envelope.loop_flag());
    }

    /// $4001/$4005: sweep parameters.
    pub fn write_sweep(&mut self, value: u8) {
        self.sweep.write(value);
    }

    /// $4002/$4006: timer low byte.
    pub fn write_timer_lo(&mut self, value: u8, timestamp: i32) {
        self.gen_sound(timestamp);

        self.timer_reg = (self.timer_reg & 0x0700) | u16::from(value);
    }

    /// $4003/$4007: timer high bits, length reload, envelope restart. The
    /// sequencer restarts at step 7 so the next advance lands on step 0.
    pub fn write_timer_hi(&mut self, value: u8, timestamp: i32) {
        if self.length.enabled() {
            self.gen_sound(timestamp);
            self.length.load(value >> 3);
        }

        self.timer_reg = (self.timer_reg & 0x00FF) | (u16::from(value & 7) << 8);
        self.envelope.start();
        self.step = 7;
    }

    /// Quarter-frame signal.
    pub fn frame_quarter(&mut self) {
        self.envelope.clock();
    }

    /// Half-frame signal.
    pub fn frame_half(&mut self) {
        self.length.clock();
        self.sweep.clock(&mut self.timer_reg);
    }

    /// Whether the timer/sweep state silences the channel outright.
    fn silenced(&self) -> bool {
        !(8..=0x7FF).contains(&self.timer_reg)
            || !self.sweep.target_in_range(self.timer_reg)
            || !self.length.active()
    }

    /// Advance the sample buffer to `timestamp` (CPU cycles into the frame).
    /// The timer state freezes while the channel is silenced.
    pub fn gen_sound(&mut self, timestamp: i32) {
        let end = self.buf.clamp(timestamp);

        if self.silenced() {
            self.buf.fill_to(end, 0);
            return;
        }

        let amp = self.envelope.output();
        while self.buf.pos() < end {
            let duty_bit = DUTY_TABLE[usize::from(self.duty)][(self.step & 7) as usize];
            self.buf.push(amp * duty_bit);
            if self.timer == 0 {
                // The period is 2*(reg+1) CPU cycles; the reload accounts
                // for the cycle spent at zero.
                self.timer = 2 * u32::from(self.timer_reg) + 1;
                self.step = (self.step + 1) & 7;
            } else {
                self.timer -= 1;
            }
        }
    }

    pub fn start_frame(&mut self) {
        self.buf.start_frame();
    }

    pub fn samples(&self) -> &[u8] {
        self.buf.samples()
    }
}
