//! Arithmetic logic unit and its control logic.
//!
//! This simulator implements exactly the six ALU operations the supported
//! opcode family needs. Control-signal encoding follows consts::OP_* below;
//! note op 7 is redefined from the conventional "set less than" to XOR.

/// 4-bit ALU control signal, as produced by `alu_control`.
pub const OP_AND: u8 = 0b0000;
pub const OP_OR: u8 = 0b0001;
pub const OP_ADD: u8 = 0b0010;
pub const OP_SUB: u8 = 0b0110;
pub const OP_XOR: u8 = 0b0111;
pub const OP_NOR: u8 = 0b1100;

/// Combines the 2-bit `ALUOp` from the main control unit with the
/// instruction's `func_code` (`funct7bit << 3 | funct3`) to select a
/// 4-bit ALU control signal.
///
/// - `alu_op == 0b00`: load/store address calculation, always ADD.
/// - `alu_op == 0b01`: branch comparison, always SUB.
/// - `alu_op == 0b10`: R-type/I-type arithmetic, decoded from `func_code`.
pub fn alu_control(alu_op: u8, func_code: u8) -> u8 {
    match alu_op {
        0b00 => OP_ADD,
        0b01 => OP_SUB,
        0b10 => match func_code {
            0b0000 => OP_ADD,
            0b1000 => OP_SUB,
            0b0111 => OP_AND,
            0b0110 => OP_OR,
            0b0100 => OP_XOR,
            other => {
                log::error!("undefined ALU func_code {other:#06b}");
                0b1111
            }
        },
        other => {
            log::error!("undefined ALUOp {other:#04b}");
            0b1111
        }
    }
}

/// Executes one ALU operation, returning `(result, zero)`.
pub fn execute(alu_control: u8, a: i32, b: i32) -> (i32, bool) {
    let result = match alu_control {
        OP_AND => a & b,
        OP_OR => a | b,
        OP_ADD => a.wrapping_add(b),
        OP_SUB => a.wrapping_sub(b),
        OP_XOR => a ^ b,
        OP_NOR => !(a | b),
        _ => 0,
    };
    (result, result == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_store_always_adds() {
        assert_eq!(alu_control(0b00, 0b1111), OP_ADD);
    }

    #[test]
    fn branch_always_subtracts() {
        assert_eq!(alu_control(0b01, 0b0000), OP_SUB);
    }

    #[test]
    fn r_type_selects_by_func_code() {
        assert_eq!(alu_control(0b10, 0b0000), OP_ADD);
        assert_eq!(alu_control(0b10, 0b1000), OP_SUB);
        assert_eq!(alu_control(0b10, 0b0111), OP_AND);
        assert_eq!(alu_control(0b10, 0b0110), OP_OR);
        assert_eq!(alu_control(0b10, 0b0100), OP_XOR);
    }

    #[test]
    fn sub_sets_zero_on_equal_operands() {
        let (result, zero) = execute(OP_SUB, 5, 5);
        assert_eq!(result, 0);
        assert!(zero);
    }

    #[test]
    fn add_wraps_on_overflow() {
        let (result, _) = execute(OP_ADD, i32::MAX, 1);
        assert_eq!(result, i32::MIN);
    }

    #[test]
    fn xor_is_the_redefined_op7() {
        let (result, _) = execute(OP_XOR, 0b1010, 0b0110);
        assert_eq!(result, 0b1100);
    }
}
