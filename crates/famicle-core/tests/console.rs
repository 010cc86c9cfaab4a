//! End-to-end scenarios running small programs through whole frames.

use famicle_core::{Console, Mirroring};

/// KIL opcode: parks the CPU so a test can inspect the registers.
const KIL: u8 = 0x02;

/// 32 KiB PRG with `program` at $8000, NMI -> $9000, IRQ -> $9500.
fn prg_with(program: &[u8]) -> [u8; 0x8000] {
    let mut prg = [0u8; 0x8000];
    prg[..program.len()].copy_from_slice(program);
    prg[0x7FFA] = 0x00;
    prg[0x7FFB] = 0x90;
    prg[0x7FFC] = 0x00;
    prg[0x7FFD] = 0x80;
    prg[0x7FFE] = 0x00;
    prg[0x7FFF] = 0x95;
    prg
}

fn console_with(program: &[u8]) -> Console {
    Console::new(&prg_with(program), &[0u8; 0x2000], Mirroring::Horizontal)
}

/// Place `handler` at $9000 (the NMI vector target).
fn with_nmi_handler(program: &[u8], handler: &[u8]) -> Console {
    let mut prg = prg_with(program);
    prg[0x1000..0x1000 + handler.len()].copy_from_slice(handler);
    Console::new(&prg, &[0u8; 0x2000], Mirroring::Horizontal)
}

#[test]
fn hard_reset_state() {
    let console = console_with(&[KIL]);
    let st = console.cpu_state();
    assert_eq!(st.pc, 0x8000);
    assert_eq!((st.a, st.x, st.y), (0, 0, 0));
    assert_eq!(st.s, 0xFD);
    assert_eq!(st.p, 0x24);
}

#[test]
fn lda_immediate_over_a_frame() {
    let mut console = console_with(&[0xA9, 0x55, KIL]);
    console.emulate_frame();
    let st = console.cpu_state();
    assert_eq!(st.a, 0x55);
    assert_eq!(st.pc, 0x8002, "LDA advanced PC by 2, KIL parked it");
    assert_eq!(st.p & 0x82, 0, "Z and N clear for $55");
}

#[test]
fn controller_strobe_and_shift() {
    // Strobe the pads, shift all eight bits of port 0 into $00 (LSB
    // first), take a ninth read into X, and park.
    #[rustfmt::skip]
    let mut console = console_with(&[
        0xA9, 0x01,             // LDA #$01
        0x8D, 0x16, 0x40,       // STA $4016
        0xA9, 0x00,             // LDA #$00
        0x8D, 0x16, 0x40,       // STA $4016
        0xA2, 0x08,             // LDX #$08
        0xAD, 0x16, 0x40,       // loop: LDA $4016
        0x4A,                   // LSR A
        0x66, 0x00,             // ROR $00
        0xCA,                   // DEX
        0xD0, 0xF7,             // BNE loop
        0xAD, 0x16, 0x40,       // LDA $4016 (ninth read)
        0x29, 0x01,             // AND #$01
        0xAA,                   // TAX
        0xA5, 0x00,             // LDA $00
        KIL,
    ]);

    console.set_input(0, 0x81); // A and Right
    console.emulate_frame();

    let st = console.cpu_state();
    assert_eq!(st.a, 0x81, "eight reads reproduce the input byte");
    assert_eq!(st.x, 0x01, "ninth read returns 1");
}

#[test]
fn nmi_enable_during_vblank_fires_immediately() {
    // Main: enable NMI, spin. Handler: count entries in $10; on the first
    // entry, toggle NMI enable off and on again while vblank is still set,
    // which must latch a second NMI at once; on the second entry, park.
    #[rustfmt::skip]
    let main = [
        0xA9, 0x80,             // LDA #$80
        0x8D, 0x00, 0x20,       // STA $2000
        0x4C, 0x05, 0x80,       // spin: JMP spin
    ];
    #[rustfmt::skip]
    let handler = [
        0xE6, 0x10,             // INC $10
        0xA5, 0x10,             // LDA $10
        0xC9, 0x02,             // CMP #$02
        0xF0, 0x0B,             // BEQ done
        0xA9, 0x00,             // LDA #$00
        0x8D, 0x00, 0x20,       // STA $2000 (NMI off)
        0xA9, 0x80,             // LDA #$80
        0x8D, 0x00, 0x20,       // STA $2000 (NMI on, vblank set -> NMI now)
        0x40,                   // RTI
        KIL,                    // done:
    ];
    let mut console = with_nmi_handler(&main, &handler);

    // Two warmup frames never assert vblank; the third frame delivers the
    // line-241 NMI and then the immediate re-trigger.
    for _ in 0..3 {
        console.emulate_frame();
    }
    assert_eq!(console.cpu_state().a, 2, "both NMIs delivered in one vblank");
}

#[test]
fn palette_mirror_through_data_port() {
    // Write $30 to $3F10, then read $3F00 back: the universal-background
    // mirror must return it.
    #[rustfmt::skip]
    let mut console = console_with(&[
        0xA9, 0x3F,             // LDA #$3F
        0x8D, 0x06, 0x20,       // STA $2006
        0xA9, 0x10,             // LDA #$10
        0x8D, 0x06, 0x20,       // STA $2006
        0xA9, 0x30,             // LDA #$30
        0x8D, 0x07, 0x20,       // STA $2007
        0xA9, 0x3F,             // LDA #$3F
        0x8D, 0x06, 0x20,       // STA $2006
        0xA9, 0x00,             // LDA #$00
        0x8D, 0x06, 0x20,       // STA $2006
        0xAD, 0x07, 0x20,       // LDA $2007 (palette reads skip the buffer)
        KIL,
    ]);
    console.emulate_frame();
    assert_eq!(console.cpu_state().a, 0x30);
}

#[test]
fn square_one_duty_pattern_over_frames() {
    // SQ1: constant volume 15, halted length, timer $1FF, duty 0.
    #[rustfmt::skip]
    let mut console = console_with(&[
        0xA9, 0x01,             // LDA #$01
        0x8D, 0x15, 0x40,       // STA $4015
        0xA9, 0x3F,             // LDA #$3F (duty 0, halt, constant 15)
        0x8D, 0x00, 0x40,       // STA $4000
        0xA9, 0xFF,             // LDA #$FF
        0x8D, 0x02, 0x40,       // STA $4002
        0xA9, 0x01,             // LDA #$01
        0x8D, 0x03, 0x40,       // STA $4003 (timer = $1FF)
        0x4C, 0x14, 0x80,       // spin
    ]);

    for _ in 0..16 {
        console.emulate_frame();
    }

    let sq1 = console.sound().sq1;
    assert!(sq1.len() > 29_000 && sq1.len() < 30_600, "len {}", sq1.len());
    assert!(sq1.iter().all(|&s| s == 0 || s == 15));

    // Duty 0 is high one sequencer step in eight; with a 1024-cycle step
    // the per-frame high count sits between three and four full phases.
    let high = sq1.iter().filter(|&&s| s == 15).count();
    assert!((3 * 1024..=4 * 1024).contains(&high), "high count {high}");
}

#[test]
fn soft_reset_keeps_wram_hard_reset_clears_it() {
    // First run leaves a marker in $10; after a soft reset the second run
    // sees it and takes the other branch.
    #[rustfmt::skip]
    let program = [
        0xA5, 0x10,             // LDA $10
        0xD0, 0x04,             // BNE second
        0xE6, 0x10,             // INC $10
        KIL,                    // first run parks here
        0xEA,                   // (pad)
        0xA2, 0x99,             // second: LDX #$99
        KIL,
    ];
    let mut console = console_with(&program);

    console.emulate_frame();
    assert_eq!(console.cpu_state().x, 0x00);

    console.soft_reset();
    console.emulate_frame();
    assert_eq!(console.cpu_state().x, 0x99, "marker survived soft reset");
    assert_eq!(console.cpu_state().s, 0xFA, "soft reset drops S by 3");

    console.hard_reset();
    console.emulate_frame();
    assert_eq!(console.cpu_state().x, 0x00, "hard reset cleared WRAM");
}

#[test]
fn oam_dma_sprite_reaches_screen() {
    // Stage sprite 0 in page $02, DMA it, set a sprite palette, enable
    // sprite rendering, and check the pixels after the warmup frames.
    #[rustfmt::skip]
    let program = [
        0xA9, 0x0A,             // LDA #$0A (y: visible from line 11)
        0x8D, 0x00, 0x02,       // STA $0200
        0xA9, 0x01,             // LDA #$01 (tile 1)
        0x8D, 0x01, 0x02,       // STA $0201
        0xA9, 0x00,             // LDA #$00 (attributes)
        0x8D, 0x02, 0x02,       // STA $0202
        0xA9, 0x08,             // LDA #$08 (x = 8)
        0x8D, 0x03, 0x02,       // STA $0203
        0xA9, 0x02,             // LDA #$02
        0x8D, 0x14, 0x40,       // STA $4014 (OAM DMA from $0200)
        0xA9, 0x3F,             // LDA #$3F
        0x8D, 0x06, 0x20,       // STA $2006
        0xA9, 0x11,             // LDA #$11
        0x8D, 0x06, 0x20,       // STA $2006
        0xA9, 0x2C,             // LDA #$2C
        0x8D, 0x07, 0x20,       // STA $2007 (sprite palette entry)
        0xA9, 0x10,             // LDA #$10
        0x8D, 0x01, 0x20,       // STA $2001 (sprites on)
        0x4C, 0x2D, 0x80,       // spin
    ];

    let mut chr = [0u8; 0x2000];
    chr[0x10] = 0xFF; // tile 1, row 0: solid pixel value 1

    let mut console = Console::new(&prg_with(&program), &chr, Mirroring::Horizontal);
    for _ in 0..3 {
        console.emulate_frame();
    }

    let screen = console.screen();
    assert_eq!(screen[11 * 256 + 8], 0x2C);
    assert_eq!(screen[11 * 256 + 15], 0x2C);
    assert_eq!(screen[11 * 256 + 7], 0x00);
    assert_eq!(screen[10 * 256 + 8], 0x00, "line above the sprite is blank");
}

#[test]
fn exec_hook_reports_instructions() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let seen: Rc<RefCell<Vec<(u16, u8, u16)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);

    let mut console = console_with(&[0xA9, 0x55, 0x85, 0x10, KIL]);
    console.set_exec_hook(Some(Box::new(move |st, opcode, operand| {
        sink.borrow_mut().push((st.pc, opcode, operand));
    })));
    console.emulate_frame();

    let seen = seen.borrow();
    assert_eq!(seen[0], (0x8000, 0xA9, 0x0055));
    assert_eq!(seen[1], (0x8002, 0x85, 0x0010));
    assert_eq!(seen[2], (0x8004, KIL, 0x0000));
}

#[test]
fn frame_sound_lengths_cover_the_frame() {
    let mut console = console_with(&[0x4C, 0x00, 0x80]); // JMP $8000
    console.emulate_frame();

    let sound = console.sound();
    let len = sound.sq1.len();
    assert!(
        (29_000..30_600).contains(&len),
        "one frame of CPU cycles, got {len}"
    );
    assert_eq!(sound.sq2.len(), len);
    assert_eq!(sound.tri.len(), len);
    assert_eq!(sound.noi.len(), len);
    assert_eq!(sound.dmc.len(), len);
}

#[test]
fn ines_console_boots() {
    let mut data = vec![0u8; 16 + 0x4000];
    data[0..4].copy_from_slice(b"NES\x1A");
    data[4] = 1; // one PRG bank, mirrored
    data[16] = 0xA9; // LDA #$77
    data[17] = 0x77;
    data[18] = KIL;
    // Reset vector lives at the top of the mirrored bank.
    data[16 + 0x3FFC] = 0x00;
    data[16 + 0x3FFD] = 0x80;

    let mut console = Console::from_ines(&data).expect("valid image");
    console.emulate_frame();
    assert_eq!(console.cpu_state().a, 0x77);
}
