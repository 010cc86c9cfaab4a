//! Triangle channel.

use crate::buffer::SampleBuf;
use crate::length_counter::LengthCounter;

/// 32-step output sequence value for a step index: 15 down to 0, then 0 up
/// to 15.
#[inline]
fn tri_output(step: u32) -> u8 {
    let sample = (step & 0xF) as u8;
    if step & 0x10 == 0 {
        sample ^ 0xF
    } else {
        sample
    }
}

/// Triangle channel: a 1-CPU-cycle timer walking the 32-entry sequence,
/// gated by both the length counter and the linear counter.
pub(crate) struct Triangle {
    length: LengthCounter,
    /// Timer down-counter, in CPU cycles.
    timer: u32,
    /// 11-bit timer register ($400A/$400B pair).
    timer_reg: u16,
    linear: u8,
    /// Linear counter reload value ($4008 bits 0-6).
    linear_reg: u8,
    linear_reload: bool,
    /// $4008 bit 7: halts length and keeps the reload flag set.
    control: bool,
    /// Sequencer step; only the low five bits are consulted.
    step: u32,
    buf: SampleBuf,
}

impl Triangle {
    pub fn new() -> Self {
        Self {
            length: LengthCounter::default(),
            timer: 0,
            timer_reg: 0,
            linear: 0,
            linear_reg: 0,
            linear_reload: false,
            control: false,
            step: 0,
            buf: SampleBuf::new(),
        }
    }

    pub fn hard_reset(&mut self) {
        self.timer_reg = 0;
        self.linear_reg = 0;
        self.control = false;
        self.length.reset();
        self.soft_reset();
    }

    pub fn soft_reset(&mut self) {
        self.length.set_enabled(false);
        self.timer = 0;
        self.linear = 0;
        self.linear_reload = false;
        self.step = 0;
    }

    pub fn enable(&mut self, enabled: bool, timestamp: i32) {
        self.gen_sound(timestamp);
        self.length.set_enabled(enabled);
    }

    pub fn active(&self) -> bool {
        self.length.active()
    }

    /// $4008: linear counter reload value and the control/halt bit.
    pub fn write_ctrl(&mut self, value: u8) {
        self.linear_reg = value & 0x7F;
        self.control = value & 0x80 != 0;
        self.length.set_halt(self.control);
    }

    /// $400A: timer low byte.
    pub fn write_timer_lo(&mut self, value: u8, timestamp: i32) {
        self.gen_sound(timestamp);

        self.timer_reg = (self.timer_reg & 0x0700) | u16::from(value);
    }

    /// $400B: timer high bits, length reload, linear reload request.
    pub fn write_timer_hi(&mut self, value: u8, timestamp: i32) {
        self.gen_sound(timestamp);

        if self.length.enabled() {
            self.length.load(value >> 3);
        }
        self.timer_reg = (self.timer_reg & 0x00FF) | (u16::from(value & 7) << 8);
        self.linear_reload = true;
    }

    /// Quarter-frame signal: the linear counter reloads or decrements, and
    /// the reload flag sticks only while the control bit is set.
    pub fn frame_quarter(&mut self) {
        if self.linear_reload {
            self.linear = self.linear_reg;
        } else if self.linear > 0 {
            self.linear -= 1;
        }

        if !self.control {
            self.linear_reload = false;
        }
    }

    /// Half-frame signal.
    pub fn frame_half(&mut self) {
        self.length.clock();
    }

    /// Advance the sample buffer to `timestamp`. Silence (either counter at
    /// zero) emits zeros without advancing the sequencer.
    pub fn gen_sound(&mut self, timestamp: i32) {
        let end = self.buf.clamp(timestamp);

        if !self.length.active() || self.linear == 0 {
            self.buf.fill_to(end, 0);
            return;
        }

        let mut output = tri_output(self.step);
        while self.buf.pos() < end {
            self.buf.push(output);
            if self.timer == 0 {
                self.timer = u32::from(self.timer_reg);
                self.step += 1;
                output = tri_output(self.step);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_walks_down_then_up() {
        let values: Vec<u8> = (0..32).map(tri_output).collect();
        let mut expected: Vec<u8> = (0..=15).rev().collect();
        expected.extend(0..=15);
        assert_eq!(values, expected);
    }

    #[test]
    fn plays_sequence_at_timer_rate() {
        let mut tri = Triangle::new();
        tri.enable(true, 0);
        tri.write_ctrl(0x7F); // linear reload 127, control off
        tri.write_timer_lo(0x01, 0); // period: step every 2 cycles
        tri.write_timer_hi(0x00, 0);
        tri.frame_quarter(); // load the linear counter

        tri.gen_sound(8);
        // The reset-time down-counter is empty, so the first sample steps
        // immediately; each later value holds for the two-cycle period.
        assert_eq!(tri.samples(), &[15, 14, 14, 13, 13, 12, 12, 11]);
    }

    #[test]
    fn silent_when_linear_counter_empty() {
        let mut tri = Triangle::new();
        tri.enable(true, 0);
        tri.write_ctrl(0x00);
        tri.write_timer_lo(0x10, 0);
        tri.write_timer_hi(0x00, 0); // length loaded, linear still 0
        tri.gen_sound(16);
        assert!(tri.samples().iter().all(|&s| s == 0));
    }

    #[test]
    fn linear_reload_flag_clears_without_control() {
        let mut tri = Triangle::new();
        tri.write_ctrl(0x05);
        tri.write_timer_hi(0x00, 0); // sets the reload flag
        tri.frame_quarter();
        assert_eq!(tri.linear, 5);
        tri.frame_quarter(); // flag cleared: now it decrements
        assert_eq!(tri.linear, 4);
    }

    #[test]
    fn control_bit_keeps_reloading() {
        let mut tri = Triangle::new();
        tri.write_ctrl(0x85); // control set, reload 5
        tri.write_timer_hi(0x00, 0);
        tri.frame_quarter();
        tri.frame_quarter();
        assert_eq!(tri.linear, 5, "reload flag sticks while control is set");
    }
}
