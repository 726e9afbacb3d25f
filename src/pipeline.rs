//! Pipeline-register record types for the five-stage core.
//!
//! Each latch holds exactly what the stage downstream of it needs to read.
//! `FiveStageCore` keeps two full snapshots, `state` and `next`: every stage
//! method reads only from `state` and writes only into `next`, and the core
//! swaps them at the end of a tick. Running the stages WB, MEM, EX, ID, IF
//! in that order lets a later-in-program-order stage observe this cycle's
//! `next` writes from an earlier stage before it commits its own nop flag.

use crate::control::ControlSignals;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Latch feeding the IF stage: PC plus the branch redirect ID raises.
#[derive(Clone, Copy, Debug, Default)]
pub struct IfLatch {
    pub pc: u32,
    pub nop: bool,
    /// Set by ID when it resolves a taken branch/JAL this tick; tells IF
    /// to squash the instruction it just fetched and redirect `next.pc`.
    pub pc_src: bool,
    pub branch_pc: u32,
}

/// Latch feeding the ID stage: the raw word IF fetched.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdLatch {
    pub nop: bool,
    pub pc: u32,
    pub instr: u32,
}

/// Latch feeding the EX stage: decoded operands, forwarding keys, and
/// control signals for the rest of the pipeline.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExLatch {
    pub nop: bool,
    pub pc: u32,
    pub rs1: u8,
    pub rs2: u8,
    pub rd: u8,
    pub read_data1: i32,
    pub read_data2: i32,
    pub imm: i32,
    pub func_code: u8,
    pub control: ControlSignals,
}

/// Latch feeding the MEM stage.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemLatch {
    pub nop: bool,
    pub rd: u8,
    pub alu_result: i32,
    pub store_data: i32,
    pub mem_read: bool,
    pub mem_write: bool,
    pub mem_to_reg: bool,
    pub reg_write: bool,
}

/// Latch feeding the WB stage.
#[derive(Clone, Copy, Debug, Default)]
pub struct WbLatch {
    pub nop: bool,
    pub rd: u8,
    pub alu_result: i32,
    pub mem_result: i32,
    pub mem_to_reg: bool,
    pub reg_write: bool,
}

impl WbLatch {
    /// The value actually committed to the register file: the ALU result,
    /// or the loaded word when `mem_to_reg` is set.
    pub(crate) fn wrt_data(&self) -> i32 {
        if self.mem_to_reg {
            self.mem_result
        } else {
            self.alu_result
        }
    }
}

/// A full snapshot of every pipeline latch at one point in time.
#[derive(Clone, Copy, Debug, Default)]
pub struct Latches {
    pub if_: IfLatch,
    pub id: IdLatch,
    pub ex: ExLatch,
    pub mem: MemLatch,
    pub wb: WbLatch,
}

impl Latches {
    /// Appends a debug-only snapshot of every stage's latch contents to
    /// `path`, one section per cycle. Not part of the bit-exactness
    /// contract; truncates on cycle 0.
    pub fn dump_cycle(&self, path: &Path, cycle: u64) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(cycle == 0)
            .append(cycle != 0)
            .open(path)?;

        writeln!(file, "{}", "-".repeat(70))?;
        writeln!(file, "State after executing cycle: {cycle}")?;
        writeln!(file, "IF.nop: {}", self.if_.nop)?;
        writeln!(file, "IF.PC: {}", self.if_.pc)?;
        writeln!(file, "ID.nop: {}", self.id.nop)?;
        writeln!(file, "ID.Instr: {:032b}", self.id.instr)?;
        writeln!(file, "EX.nop: {}", self.ex.nop)?;
        writeln!(file, "EX.Read_data1: {}", self.ex.read_data1)?;
        writeln!(file, "EX.Read_data2: {}", self.ex.read_data2)?;
        writeln!(file, "EX.Imm: {}", self.ex.imm)?;
        writeln!(file, "EX.Rs: {}", self.ex.rs1)?;
        writeln!(file, "EX.Rt: {}", self.ex.rs2)?;
        writeln!(file, "EX.Wrt_reg_addr: {}", self.ex.rd)?;
        writeln!(file, "EX.alu_op: {:02b}", self.ex.control.alu_op)?;
        writeln!(file, "EX.wrt_enable: {}", self.ex.control.reg_write)?;
        writeln!(file, "MEM.nop: {}", self.mem.nop)?;
        writeln!(file, "MEM.ALUresult: {}", self.mem.alu_result)?;
        writeln!(file, "MEM.Store_data: {}", self.mem.store_data)?;
        writeln!(file, "MEM.Wrt_reg_addr: {}", self.mem.rd)?;
        writeln!(file, "MEM.rd_mem: {}", self.mem.mem_read)?;
        writeln!(file, "MEM.wrt_mem: {}", self.mem.mem_write)?;
        writeln!(file, "MEM.wrt_enable: {}", self.mem.reg_write)?;
        writeln!(file, "WB.nop: {}", self.wb.nop)?;
        writeln!(file, "WB.Wrt_data: {}", self.wb.wrt_data())?;
        writeln!(file, "WB.Wrt_reg_addr: {}", self.wb.rd)?;
        writeln!(file, "WB.wrt_enable: {}", self.wb.reg_write)?;
        Ok(())
    }
}
