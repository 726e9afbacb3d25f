//! Hazard detection and operand forwarding for the five-stage core.

use crate::pipeline::Latches;

/// Selects where an EX-stage operand comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Forward {
    /// Use the value read from the register file.
    RegisterFile,
    /// Use the value about to be written back (MEM/WB forwarding).
    MemWb,
    /// Use the ALU result still in the EX/MEM latch (EX/MEM forwarding).
    ExMem,
}

/// Resolves data hazards for the EX stage's ALU operands.
///
/// EX/MEM forwarding takes priority over MEM/WB forwarding, matching the
/// textbook forwarding unit: a value produced one cycle ago is fresher than
/// one produced two cycles ago. The EX/MEM register is whatever instruction
/// `state.mem` currently holds (the one MEM is acting on this tick); `next`
/// isn't populated with this tick's MEM result until after EX runs, so it
/// can't be consulted here.
pub fn forwarding_unit(state: &Latches) -> (Forward, Forward) {
    let forward = |rs: u8| -> Forward {
        if state.mem.reg_write && state.mem.rd != 0 && state.mem.rd == rs {
            Forward::ExMem
        } else if state.wb.reg_write && state.wb.rd != 0 && state.wb.rd == rs {
            Forward::MemWb
        } else {
            Forward::RegisterFile
        }
    };
    (forward(state.ex.rs1), forward(state.ex.rs2))
}

/// Resolves data hazards for the branch operands compared in the ID stage.
///
/// Branch resolution happens a stage earlier than the ALU, so it forwards
/// from `next`'s EX/MEM and MEM/WB latches instead of `state`'s.
pub fn forwarding_unit_for_branch(rs1: u8, rs2: u8, next: &Latches) -> (Forward, Forward) {
    let forward = |rs: u8| -> Forward {
        if next.mem.reg_write && next.mem.rd != 0 && next.mem.rd == rs {
            Forward::ExMem
        } else if next.wb.reg_write && next.wb.rd != 0 && next.wb.rd == rs {
            Forward::MemWb
        } else {
            Forward::RegisterFile
        }
    };
    (forward(rs1), forward(rs2))
}

/// Detects a load-use hazard: the instruction now in EX is a load whose
/// destination register is a source of the instruction now in ID.
///
/// Returns `true` when the pipeline must stall: hold the PC and IF/ID latch
/// for one cycle and inject a bubble into EX.
pub fn hazard_detection_unit(state: &Latches, id_rs1: u8, id_rs2: u8) -> bool {
    state.ex.control.mem_read
        && state.ex.rd != 0
        && (state.ex.rd == id_rs1 || state.ex.rd == id_rs2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlSignals;

    #[test]
    fn ex_mem_forwarding_has_priority_over_mem_wb() {
        let mut state = Latches::default();
        state.ex.rs1 = 1;
        state.mem.reg_write = true;
        state.mem.rd = 1;
        state.wb.reg_write = true;
        state.wb.rd = 1;

        let (a, _) = forwarding_unit(&state);
        assert_eq!(a, Forward::ExMem);
    }

    #[test]
    fn mem_wb_forwarding_when_ex_mem_does_not_match() {
        let mut state = Latches::default();
        state.ex.rs2 = 2;
        state.wb.reg_write = true;
        state.wb.rd = 2;

        let (_, b) = forwarding_unit(&state);
        assert_eq!(b, Forward::MemWb);
    }

    #[test]
    fn no_forwarding_when_no_register_matches() {
        let mut state = Latches::default();
        state.ex.rs1 = 3;
        state.ex.rs2 = 4;
        state.mem.rd = 1;
        state.wb.rd = 2;

        let (a, b) = forwarding_unit(&state);
        assert_eq!(a, Forward::RegisterFile);
        assert_eq!(b, Forward::RegisterFile);
    }

    #[test]
    fn writes_to_x0_never_forward() {
        let mut state = Latches::default();
        state.ex.rs1 = 0;
        state.mem.reg_write = true;
        state.mem.rd = 0;

        let (a, _) = forwarding_unit(&state);
        assert_eq!(a, Forward::RegisterFile);
    }

    #[test]
    fn load_use_hazard_forces_a_stall() {
        let mut state = Latches::default();
        state.ex.control = ControlSignals {
            mem_read: true,
            ..Default::default()
        };
        state.ex.rd = 5;
        assert!(hazard_detection_unit(&state, 5, 9));
    }

    #[test]
    fn no_stall_without_a_pending_load() {
        let mut state = Latches::default();
        state.ex.rd = 5;
        assert!(!hazard_detection_unit(&state, 5, 9));
    }

    #[test]
    fn no_stall_when_hazard_register_is_x0() {
        let mut state = Latches::default();
        state.ex.control = ControlSignals {
            mem_read: true,
            ..Default::default()
        };
        state.ex.rd = 0;
        assert!(!hazard_detection_unit(&state, 0, 0));
    }
}
