//! Global constants

/// Sizes in bytes.
pub const WORD_SIZE: u32 = 4;

/// Fixed memory image size, in bytes.
pub const MEM_SIZE: usize = 1000;

/// Simulator-only halt opcode (not part of RV32I).
pub const HALT_OPCODE: u32 = 0b111_1111;

/// Full-word halt sentinel: a fetch of this exact word latches halt.
pub const HALT_WORD: u32 = 0xFFFF_FFFF;

// Masks to isolate specific parts of the instruction using logical AND (&)
pub const OPCODE_MASK: u32 = 0x7f;
pub const RD_MASK: u32 = 0xf80;
pub const FUNCT3_MASK: u32 = 0x7000;
pub const RS1_MASK: u32 = 0xf8000;
pub const RS2_MASK: u32 = 0x1f00000;
pub const FUNCT7_MASK: u32 = 0xfe00000;
pub const FUNCT7BIT_MASK: u32 = 0x4000_0000;

// Indices of instruction parts for shifting
pub const RD_SHIFT: u8 = 7;
pub const FUNCT3_SHIFT: u8 = 12;
pub const RS1_SHIFT: u8 = 15;
pub const RS2_SHIFT: u8 = 20;
pub const FUNCT7_SHIFT: u8 = 25;
pub const FUNCT7BIT_SHIFT: u8 = 30;
