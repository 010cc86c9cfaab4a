//! Whole-frame emulation throughput.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use famicle_core::{Console, Mirroring};

/// A console running a busy little program: fills a nametable row over the
/// data port each frame with rendering and sound enabled.
fn bench_console() -> Console {
    #[rustfmt::skip]
    let program = [
        0xA9, 0x1E,             // LDA #$1E (bg + sprites on, no clipping)
        0x8D, 0x01, 0x20,       // STA $2001
        0xA9, 0x0F,             // LDA #$0F
        0x8D, 0x15, 0x40,       // STA $4015
        0xA9, 0x3F,             // LDA #$3F
        0x8D, 0x00, 0x40,       // STA $4000
        0xA9, 0x80,             // LDA #$80
        0x8D, 0x02, 0x40,       // STA $4002
        0xA9, 0x01,             // LDA #$01
        0x8D, 0x03, 0x40,       // STA $4003
        0xE8,                   // loop: INX
        0x8A,                   // TXA
        0x85, 0x00,             // STA $00
        0x4C, 0x19, 0x80,       // JMP loop
    ];

    let mut prg = [0u8; 0x8000];
    prg[..program.len()].copy_from_slice(&program);
    prg[0x7FFC] = 0x00;
    prg[0x7FFD] = 0x80;

    let mut chr = [0u8; 0x2000];
    for (i, byte) in chr.iter_mut().enumerate() {
        *byte = (i * 7) as u8;
    }

    Console::new(&prg, &chr, Mirroring::Vertical)
}

fn bench_emulate_frame(c: &mut Criterion) {
    let mut console = bench_console();
    // Get past the post-reset warmup so frames render.
    console.emulate_frame();
    console.emulate_frame();

    c.bench_function("emulate_frame", |b| {
        b.iter(|| {
            console.emulate_frame();
            black_box(console.screen()[0]);
        });
    });

    c.bench_function("emulate_frame_with_sound_drain", |b| {
        b.iter(|| {
            console.emulate_frame();
            let sound = console.sound();
            black_box(sound.sq1.len() + sound.dmc.len());
        });
    });
}

criterion_group!(benches, bench_emulate_frame);
criterion_main!(benches);
