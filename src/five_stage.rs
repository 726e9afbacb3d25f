//! The classic five-stage pipelined core: IF, ID, EX, MEM, WB.
//!
//! Each tick runs the stages in WB, MEM, EX, ID, IF order against two
//! latch snapshots, `state` (committed at the end of the previous tick)
//! and `next` (built up over the course of this tick). Branches and JAL
//! resolve in ID, one stage later than IF, so the instruction IF fetches
//! in the same tick ID resolves a taken branch is already in flight on
//! the wrong path; ID flags it for flush and IF marks it `nop` when it
//! lands in IF/ID, the conventional one-slot branch penalty. A load-use
//! hazard instead freezes PC/IF-ID for one cycle and drops a bubble into
//! EX.

use crate::alu;
use crate::consts::{HALT_WORD, WORD_SIZE};
use crate::control::ControlSignals;
use crate::hazard::{self, Forward};
use crate::instruction::{Instruction, Opcode};
use crate::memory::{DataMemory, InstructionMemory};
use crate::pipeline::{ExLatch, IdLatch, Latches, MemLatch, WbLatch};
use crate::register::RegisterFile;

pub struct FiveStageCore {
    pub reg: RegisterFile,
    pub dmem: DataMemory,
    state: Latches,
    cycle: u64,
    instructions_retired: u64,
    stall_cycles: u64,
    flush_cycles: u64,
    halt_detected: bool,
    pub halted: bool,
}

impl FiveStageCore {
    pub fn new(dmem: DataMemory) -> FiveStageCore {
        FiveStageCore {
            reg: RegisterFile::new(),
            dmem,
            state: Latches {
                id: IdLatch {
                    nop: true,
                    ..Default::default()
                },
                ex: ExLatch {
                    nop: true,
                    ..Default::default()
                },
                mem: MemLatch {
                    nop: true,
                    ..Default::default()
                },
                wb: WbLatch {
                    nop: true,
                    ..Default::default()
                },
                ..Default::default()
            },
            cycle: 0,
            instructions_retired: 0,
            stall_cycles: 0,
            flush_cycles: 0,
            halt_detected: false,
            halted: false,
        }
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn instructions_retired(&self) -> u64 {
        self.instructions_retired
    }

    pub fn stall_cycles(&self) -> u64 {
        self.stall_cycles
    }

    pub fn flush_cycles(&self) -> u64 {
        self.flush_cycles
    }

    /// Appends a debug-only per-stage state snapshot for the cycle just
    /// executed; see `Latches::dump_cycle`.
    pub fn dump_state_cycle(&self, path: &std::path::Path, cycle: u64) -> std::io::Result<()> {
        self.state.dump_cycle(path, cycle)
    }

    /// Runs one clock tick. Returns `true` once every latch downstream of
    /// the halted fetch has drained, meaning the core has produced its
    /// final architectural state.
    pub fn tick(&mut self, imem: &InstructionMemory) -> bool {
        if self.halted {
            return true;
        }

        let mut next = Latches::default();

        self.wb_stage();
        self.mem_stage(&mut next);
        self.ex_stage(&mut next);
        let stall = self.id_stage(&mut next);
        let flushed = self.if_stage(&mut next, imem, stall);

        self.state = next;
        self.cycle += 1;
        if stall {
            self.stall_cycles += 1;
        }
        if flushed {
            self.flush_cycles += 1;
        }

        self.halted = self.halt_detected
            && self.state.id.nop
            && self.state.ex.nop
            && self.state.mem.nop
            && self.state.wb.nop;
        self.halted
    }

    fn wb_stage(&mut self) {
        let wb = self.state.wb;
        if wb.nop {
            return;
        }
        if wb.reg_write {
            self.reg.write(wb.rd, wb.wrt_data() as u32);
        }
        self.instructions_retired += 1;
    }

    fn mem_stage(&mut self, next: &mut Latches) {
        let mem = self.state.mem;
        if mem.nop {
            next.wb = WbLatch {
                nop: true,
                ..Default::default()
            };
            return;
        }

        if mem.mem_write {
            self.dmem.write_word(mem.alu_result as u32, mem.store_data as u32);
        }
        let mem_result = if mem.mem_read {
            self.dmem.read_word(mem.alu_result as u32) as i32
        } else {
            0
        };

        next.wb = WbLatch {
            nop: false,
            rd: mem.rd,
            alu_result: mem.alu_result,
            mem_result,
            mem_to_reg: mem.mem_to_reg,
            reg_write: mem.reg_write,
        };
    }

    fn ex_stage(&self, next: &mut Latches) {
        let ex = self.state.ex;
        if ex.nop {
            next.mem = MemLatch {
                nop: true,
                ..Default::default()
            };
            return;
        }

        let (forward_a, forward_b) = hazard::forwarding_unit(&self.state);
        let resolve = |forward: Forward, register_value: i32| match forward {
            Forward::RegisterFile => register_value,
            Forward::MemWb => self.state.wb.wrt_data(),
            Forward::ExMem => self.state.mem.alu_result,
        };
        let forwarded_b = resolve(forward_b, ex.read_data2);

        let (operand_a, operand_b) = if ex.control.jal {
            (ex.pc as i32, WORD_SIZE as i32)
        } else {
            let a = resolve(forward_a, ex.read_data1);
            let b = if ex.control.alu_src_b { ex.imm } else { forwarded_b };
            (a, b)
        };

        let alu_ctrl = alu::alu_control(ex.control.alu_op, ex.func_code);
        let (alu_result, _zero) = alu::execute(alu_ctrl, operand_a, operand_b);

        next.mem = MemLatch {
            nop: false,
            rd: ex.rd,
            alu_result,
            store_data: forwarded_b,
            mem_read: ex.control.mem_read,
            mem_write: ex.control.mem_write,
            mem_to_reg: ex.control.mem_to_reg,
            reg_write: ex.control.reg_write,
        };
    }

    /// Returns `true` when a load-use hazard forced a stall this cycle.
    fn id_stage(&self, next: &mut Latches) -> bool {
        let id = self.state.id;
        if id.nop {
            next.ex = ExLatch {
                nop: true,
                ..Default::default()
            };
            return false;
        }

        let instr = Instruction::decode(id.instr);

        if hazard::hazard_detection_unit(&self.state, instr.rs1, instr.rs2) {
            next.ex = ExLatch {
                nop: true,
                ..Default::default()
            };
            next.if_.pc_src = false;
            return true;
        }

        let control = ControlSignals::decode(instr.opcode);
        let func_code = if instr.opcode == Opcode::R {
            ((instr.funct7bit as u8) << 3) | instr.funct3
        } else {
            instr.funct3
        };

        let read_data1 = self.reg.read(instr.rs1) as i32;
        let read_data2 = self.reg.read(instr.rs2) as i32;

        let (forward_a, forward_b) =
            hazard::forwarding_unit_for_branch(instr.rs1, instr.rs2, next);
        let resolve = |forward: Forward, register_value: i32| match forward {
            Forward::RegisterFile => register_value,
            Forward::MemWb => next.wb.wrt_data(),
            Forward::ExMem => next.mem.alu_result,
        };
        let branch_a = resolve(forward_a, read_data1);
        let branch_b = resolve(forward_b, read_data2);
        let bne = instr.funct3 & 0x1 != 0;
        let branch_taken = control.branch && ((branch_a == branch_b) != bne);

        next.if_.pc_src = control.jal || branch_taken;
        next.if_.branch_pc = (id.pc as i32 + instr.imm) as u32;

        next.ex = ExLatch {
            nop: false,
            pc: id.pc,
            rs1: instr.rs1,
            rs2: instr.rs2,
            rd: instr.rd,
            read_data1,
            read_data2,
            imm: instr.imm,
            func_code,
            control,
        };
        false
    }

    /// Returns `true` when the instruction fetched this cycle is squashed
    /// by a branch/JAL ID resolved in this same tick (the one-slot penalty).
    fn if_stage(&mut self, next: &mut Latches, imem: &InstructionMemory, stall: bool) -> bool {
        if self.halt_detected {
            next.if_.nop = true;
            next.if_.pc = self.state.if_.pc;
            next.id = IdLatch {
                nop: self.state.if_.nop,
                pc: self.state.if_.pc,
                instr: 0,
            };
            return false;
        }

        if stall {
            next.if_.pc = self.state.if_.pc;
            next.id = self.state.id;
            return false;
        }

        let fetch_pc = self.state.if_.pc;
        let word = imem.read_word(fetch_pc);
        let taken = next.if_.pc_src;

        if word == HALT_WORD && !taken {
            self.halt_detected = true;
            next.if_.nop = true;
            next.id = IdLatch {
                nop: true,
                pc: fetch_pc,
                instr: word,
            };
            next.if_.pc = fetch_pc;
            return false;
        }

        next.id = IdLatch {
            nop: taken,
            pc: fetch_pc,
            instr: word,
        };
        next.if_.pc = if taken {
            next.if_.branch_pc
        } else {
            fetch_pc + WORD_SIZE
        };
        taken
    }
}
