//! Main control unit: derives per-instruction datapath signals from opcode.

use crate::instruction::Opcode;

/// Control signals driving the rest of the datapath for one instruction.
///
/// JAL is a special case handled directly by the stage code rather than
/// through `alu_src_b`/`alu_op`: its ALU operand pair is hardwired to
/// `(PC, 4)` to produce the link address, and its branch target is always
/// taken, so `branch`/`alu_op` are left at their zeroed defaults for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ControlSignals {
    pub reg_write: bool,
    /// true: second ALU operand is the sign-extended immediate.
    /// false: second ALU operand is the `rs2` register value.
    pub alu_src_b: bool,
    pub mem_read: bool,
    pub mem_write: bool,
    pub mem_to_reg: bool,
    pub branch: bool,
    pub jal: bool,
    /// 2-bit ALUOp, consumed by `alu::alu_control`.
    pub alu_op: u8,
}

impl ControlSignals {
    /// Derives the control bundle for `opcode`. Halt and undefined opcodes
    /// produce an all-zero bundle: no register or memory writes, no branch.
    pub fn decode(opcode: Opcode) -> ControlSignals {
        match opcode {
            Opcode::R => ControlSignals {
                reg_write: true,
                alu_src_b: false,
                alu_op: 0b10,
                ..Default::default()
            },
            Opcode::IArith => ControlSignals {
                reg_write: true,
                alu_src_b: true,
                alu_op: 0b10,
                ..Default::default()
            },
            Opcode::Load => ControlSignals {
                reg_write: true,
                alu_src_b: true,
                mem_read: true,
                mem_to_reg: true,
                alu_op: 0b00,
                ..Default::default()
            },
            Opcode::Store => ControlSignals {
                alu_src_b: true,
                mem_write: true,
                alu_op: 0b00,
                ..Default::default()
            },
            Opcode::Branch => ControlSignals {
                branch: true,
                alu_op: 0b01,
                ..Default::default()
            },
            Opcode::Jal => ControlSignals {
                reg_write: true,
                jal: true,
                ..Default::default()
            },
            Opcode::Halt | Opcode::Undefined => ControlSignals::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn r_type_writes_register_from_alu_operands() {
        let c = ControlSignals::decode(Opcode::R);
        assert!(c.reg_write);
        assert!(!c.alu_src_b);
        assert_eq!(c.alu_op, 0b10);
    }

    #[test]
    fn load_reads_memory_into_register() {
        let c = ControlSignals::decode(Opcode::Load);
        assert!(c.reg_write);
        assert!(c.mem_read);
        assert!(c.mem_to_reg);
        assert!(!c.mem_write);
    }

    #[test]
    fn store_writes_memory_not_register() {
        let c = ControlSignals::decode(Opcode::Store);
        assert!(!c.reg_write);
        assert!(c.mem_write);
    }

    #[test]
    fn branch_sets_branch_and_subtract_alu_op() {
        let c = ControlSignals::decode(Opcode::Branch);
        assert!(c.branch);
        assert_eq!(c.alu_op, 0b01);
        assert!(!c.reg_write);
    }

    #[test]
    fn jal_writes_link_register_without_touching_memory() {
        let c = ControlSignals::decode(Opcode::Jal);
        assert!(c.reg_write);
        assert!(c.jal);
        assert!(!c.mem_read);
        assert!(!c.mem_write);
    }

    #[test]
    fn halt_and_undefined_are_inert() {
        assert_eq!(ControlSignals::decode(Opcode::Halt), ControlSignals::default());
        assert_eq!(
            ControlSignals::decode(Opcode::Undefined),
            ControlSignals::default()
        );
    }
}
