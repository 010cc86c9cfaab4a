//! Opcode lookup tables.
//!
//! Two flat 256-entry tables drive the interpreter: operand length in bytes
//! and base cycle cost. Penalty cycles (page crossing, branches taken, DMA
//! stalls) are charged separately by the execution core.

/// Operand bytes following each opcode (0, 1 or 2).
pub const OP_ARGLEN: [u8; 256] = [
    /* 0x00 */ 1, 1, 0, 1, 1, 1, 1, 1, 0, 1, 0, 1, 2, 2, 2, 2,
    /* 0x10 */ 1, 1, 0, 1, 1, 1, 1, 1, 0, 2, 0, 2, 2, 2, 2, 2,
    /* 0x20 */ 2, 1, 0, 1, 1, 1, 1, 1, 0, 1, 0, 1, 2, 2, 2, 2,
    /* 0x30 */ 1, 1, 0, 1, 1, 1, 1, 1, 0, 2, 0, 2, 2, 2, 2, 2,
    /* 0x40 */ 0, 1, 0, 1, 1, 1, 1, 1, 0, 1, 0, 1, 2, 2, 2, 2,
    /* 0x50 */ 1, 1, 0, 1, 1, 1, 1, 1, 0, 2, 0, 2, 2, 2, 2, 2,
    /* 0x60 */ 0, 1, 0, 1, 1, 1, 1, 1, 0, 1, 0, 1, 2, 2, 2, 2,
    /* 0x70 */ 1, 1, 0, 1, 1, 1, 1, 1, 0, 2, 0, 2, 2, 2, 2, 2,
    /* 0x80 */ 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 0, 1, 2, 2, 2, 2,
    /* 0x90 */ 1, 1, 0, 1, 1, 1, 1, 1, 0, 2, 0, 2, 2, 2, 2, 2,
    /* 0xA0 */ 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 0, 1, 2, 2, 2, 2,
    /* 0xB0 */ 1, 1, 0, 1, 1, 1, 1, 1, 0, 2, 0, 2, 2, 2, 2, 2,
    /* 0xC0 */ 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 0, 1, 2, 2, 2, 2,
    /* 0xD0 */ 1, 1, 0, 1, 1, 1, 1, 1, 0, 2, 0, 2, 2, 2, 2, 2,
    /* 0xE0 */ 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 0, 1, 2, 2, 2, 2,
    /* 0xF0 */ 1, 1, 0, 1, 1, 1, 1, 1, 0, 2, 0, 2, 2, 2, 2, 2,
];

/// Base CPU-cycle cost of each opcode, before penalties.
pub const OP_CYCLES: [u8; 256] = [
    /* 0x00 */ 7, 6, 2, 8, 3, 3, 5, 5, 3, 2, 2, 2, 4, 4, 6, 6,
    /* 0x10 */ 2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7,
    /* 0x20 */ 6, 6, 2, 8, 3, 3, 5, 5, 4, 2, 2, 2, 4, 4, 6, 6,
    /* 0x30 */ 2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7,
    /* 0x40 */ 6, 6, 2, 8, 3, 3, 5, 5, 3, 2, 2, 2, 3, 4, 6, 6,
    /* 0x50 */ 2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7,
    /* 0x60 */ 6, 6, 2, 8, 3, 3, 5, 5, 4, 2, 2, 2, 5, 4, 6, 6,
    /* 0x70 */ 2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7,
    /* 0x80 */ 2, 6, 2, 6, 3, 3, 3, 3, 2, 2, 2, 2, 4, 4, 4, 4,
    /* 0x90 */ 2, 6, 2, 6, 4, 4, 4, 4, 2, 5, 2, 5, 5, 5, 5, 5,
    /* 0xA0 */ 2, 6, 2, 6, 3, 3, 3, 3, 2, 2, 2, 2, 4, 4, 4, 4,
    /* 0xB0 */ 2, 5, 2, 5, 4, 4, 4, 4, 2, 4, 2, 4, 4, 4, 4, 4,
    /* 0xC0 */ 2, 6, 2, 8, 3, 3, 5, 5, 2, 2, 2, 2, 4, 4, 6, 6,
    /* 0xD0 */ 2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7,
    /* 0xE0 */ 2, 6, 3, 8, 3, 3, 5, 5, 2, 2, 2, 2, 4, 4, 6, 6,
    /* 0xF0 */ 2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arglen_matches_known_opcodes() {
        assert_eq!(OP_ARGLEN[0xA9], 1); // LDA #imm
        assert_eq!(OP_ARGLEN[0xAD], 2); // LDA abs
        assert_eq!(OP_ARGLEN[0xEA], 0); // NOP
        assert_eq!(OP_ARGLEN[0x00], 1); // BRK consumes a padding byte
        assert_eq!(OP_ARGLEN[0x20], 2); // JSR
        assert_eq!(OP_ARGLEN[0x60], 0); // RTS
    }

    #[test]
    fn cycles_match_known_opcodes() {
        assert_eq!(OP_CYCLES[0xA9], 2); // LDA #imm
        assert_eq!(OP_CYCLES[0x00], 7); // BRK
        assert_eq!(OP_CYCLES[0x4C], 3); // JMP abs
        assert_eq!(OP_CYCLES[0x6C], 5); // JMP (ind)
        assert_eq!(OP_CYCLES[0x91], 6); // STA (zp),Y
        assert_eq!(OP_CYCLES[0xFE], 7); // INC abs,X
    }
}
