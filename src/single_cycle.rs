//! The single-cycle reference core: fetch, decode, execute, memory access,
//! and writeback all complete within one tick. Used as the oracle the
//! five-stage core's final register file and data memory are checked
//! against.

use crate::alu;
use crate::consts::{HALT_WORD, WORD_SIZE};
use crate::control::ControlSignals;
use crate::instruction::{Instruction, Opcode};
use crate::memory::DataMemory;
use crate::register::RegisterFile;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

pub struct SingleCycleCore {
    pub reg: RegisterFile,
    pub dmem: DataMemory,
    pub pc: u32,
    pub cycle: u64,
    pub halted: bool,
}

impl SingleCycleCore {
    pub fn new(dmem: DataMemory) -> SingleCycleCore {
        SingleCycleCore {
            reg: RegisterFile::new(),
            dmem,
            pc: 0,
            cycle: 0,
            halted: false,
        }
    }

    /// Executes one instruction. Returns `true` once HALT has retired, at
    /// which point the cycle count stands at "instructions executed + 1"
    /// per the reference accounting.
    pub fn tick(&mut self, imem: &crate::memory::InstructionMemory) -> bool {
        if self.halted {
            return true;
        }

        let word = imem.read_word(self.pc);
        let instr = Instruction::decode(word);

        if instr.opcode == Opcode::Halt {
            self.halted = true;
            self.cycle += 1;
            return true;
        }

        let control = ControlSignals::decode(instr.opcode);
        let rs1_val = self.reg.read(instr.rs1) as i32;
        let rs2_val = self.reg.read(instr.rs2) as i32;

        let func_code = if instr.opcode == Opcode::R {
            ((instr.funct7bit as u8) << 3) | instr.funct3
        } else {
            instr.funct3
        };
        let alu_ctrl = alu::alu_control(control.alu_op, func_code);

        let (operand_a, operand_b) = if control.jal {
            (self.pc as i32, WORD_SIZE as i32)
        } else {
            let b = if control.alu_src_b { instr.imm } else { rs2_val };
            (rs1_val, b)
        };
        let (alu_result, zero) = alu::execute(alu_ctrl, operand_a, operand_b);

        if control.mem_write {
            self.dmem.write_word(alu_result as u32, rs2_val as u32);
        }
        let mem_result = if control.mem_read {
            self.dmem.read_word(alu_result as u32) as i32
        } else {
            0
        };

        if control.reg_write {
            let write_value = if control.mem_to_reg {
                mem_result
            } else {
                alu_result
            };
            self.reg.write(instr.rd, write_value as u32);
        }

        let bne = instr.funct3 & 0x1 != 0;
        let branch_taken = control.branch && (zero != bne);
        self.pc = if control.jal || branch_taken {
            (self.pc as i32 + instr.imm) as u32
        } else {
            self.pc + WORD_SIZE
        };

        self.cycle += 1;
        false
    }

    /// Appends a debug-only snapshot of this cycle's state to `path`. Not
    /// part of the bit-exactness contract; truncates on cycle 0.
    pub fn dump_cycle(&self, path: &Path, cycle: u64) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(cycle == 0)
            .append(cycle != 0)
            .open(path)?;

        writeln!(file, "{}", "-".repeat(70))?;
        writeln!(file, "State after executing cycle: {cycle}")?;
        writeln!(file, "IF.PC: {}", self.pc)?;
        writeln!(file, "IF.nop: {}", self.halted)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InstructionMemory;
    use std::io::Write;

    fn image(words: &[u32]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for word in words {
            for shift in [24, 16, 8, 0] {
                writeln!(file, "{:08b}", (word >> shift) as u8).unwrap();
            }
        }
        file
    }

    fn r_type(funct7: u32, rs2: u32, rs1: u32, funct3: u32, rd: u32) -> u32 {
        (funct7 << 25) | (rs2 << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | 0b0110011
    }

    fn i_type(imm: u32, rs1: u32, funct3: u32, rd: u32) -> u32 {
        (imm << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | 0b0010011
    }

    #[test]
    fn addi_then_add_accumulates() {
        let program = image(&[
            i_type(5, 0, 0b000, 1), // addi x1, x0, 5
            i_type(7, 0, 0b000, 2), // addi x2, x0, 7
            r_type(0, 2, 1, 0b000, 3), // add x3, x1, x2
            HALT_WORD,
        ]);
        let imem = InstructionMemory::load(program.path()).unwrap();
        let dmem_file = tempfile::NamedTempFile::new().unwrap();
        let dmem = DataMemory::load(dmem_file.path()).unwrap();
        let mut core = SingleCycleCore::new(dmem);

        while !core.tick(&imem) {}

        assert_eq!(core.reg.read(3), 12);
        assert_eq!(core.cycle, 4);
    }

    #[test]
    fn beq_taken_skips_the_next_instruction() {
        let program = image(&[
            i_type(0, 0, 0b000, 1), // addi x1, x0, 0
            // beq x1, x0, +8 (skip the next instruction)
            (8u32 >> 11 << 31)
                | ((8u32 >> 5 & 0x3f) << 25)
                | (0 << 20)
                | (1 << 15)
                | (0b000 << 12)
                | ((8u32 >> 1 & 0xf) << 8)
                | ((8u32 >> 11 & 0x1) << 7)
                | 0b1100011,
            i_type(99, 0, 0b000, 2), // addi x2, x0, 99 (skipped)
            HALT_WORD,
        ]);
        let imem = InstructionMemory::load(program.path()).unwrap();
        let dmem_file = tempfile::NamedTempFile::new().unwrap();
        let dmem = DataMemory::load(dmem_file.path()).unwrap();
        let mut core = SingleCycleCore::new(dmem);

        while !core.tick(&imem) {}

        assert_eq!(core.reg.read(2), 0);
    }
}
