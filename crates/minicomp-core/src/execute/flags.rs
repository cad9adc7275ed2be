//! Status-updating arithmetic shared by the ALU instructions.

use crate::state::{RegisterFile, FLAG_C, FLAG_V};

/// `A + operand + C`; binary only, the decimal flag is ignored.
pub(super) fn add_with_carry(regs: &mut RegisterFile, operand: u8) {
    let a = regs.a();
    let carry = u16::from(regs.flag_is_set(FLAG_C));
    let sum = u16::from(a) + u16::from(operand) + carry;
    let [result, high] = sum.to_le_bytes();
    regs.set_flag(FLAG_C, high != 0);
    regs.set_flag(FLAG_V, (a ^ result) & (operand ^ result) & 0x80 != 0);
    regs.set_a(result);
    regs.set_nz(result);
}

/// `A - operand - !C`, expressed as addition of the complement.
pub(super) fn subtract_with_borrow(regs: &mut RegisterFile, operand: u8) {
    add_with_carry(regs, !operand);
}

/// Sets C, Z and N as if `register - operand` had been computed.
pub(super) const fn compare(regs: &mut RegisterFile, register: u8, operand: u8) {
    regs.set_flag(FLAG_C, register >= operand);
    regs.set_nz(register.wrapping_sub(operand));
}

#[cfg(test)]
mod tests {
    use super::{add_with_carry, compare, subtract_with_borrow};
    use crate::state::{RegisterFile, FLAG_C, FLAG_N, FLAG_V, FLAG_Z};

    fn with_a(a: u8, carry: bool) -> RegisterFile {
        let mut regs = RegisterFile::at_entry(0);
        regs.set_a(a);
        regs.set_flag(FLAG_C, carry);
        regs
    }

    #[test]
    fn addition_sets_carry_and_zero_on_wrap() {
        let mut regs = with_a(0xFF, false);
        add_with_carry(&mut regs, 0x01);
        assert_eq!(regs.a(), 0x00);
        assert!(regs.flag_is_set(FLAG_C));
        assert!(regs.flag_is_set(FLAG_Z));
        assert!(!regs.flag_is_set(FLAG_V));
    }

    #[test]
    fn addition_detects_signed_overflow() {
        let mut regs = with_a(0x7F, false);
        add_with_carry(&mut regs, 0x01);
        assert_eq!(regs.a(), 0x80);
        assert!(regs.flag_is_set(FLAG_V));
        assert!(regs.flag_is_set(FLAG_N));
    }

    #[test]
    fn subtraction_borrows_when_carry_clear() {
        let mut regs = with_a(0x05, false);
        subtract_with_borrow(&mut regs, 0x02);
        assert_eq!(regs.a(), 0x02);
        assert!(regs.flag_is_set(FLAG_C));

        let mut regs = with_a(0x05, true);
        subtract_with_borrow(&mut regs, 0x06);
        assert_eq!(regs.a(), 0xFF);
        assert!(!regs.flag_is_set(FLAG_C));
    }

    #[test]
    fn compare_orders_unsigned() {
        let mut regs = RegisterFile::at_entry(0);
        compare(&mut regs, 0x10, 0x10);
        assert!(regs.flag_is_set(FLAG_Z));
        assert!(regs.flag_is_set(FLAG_C));
        compare(&mut regs, 0x01, 0x02);
        assert!(!regs.flag_is_set(FLAG_C));
        assert!(regs.flag_is_set(FLAG_N));
    }
}
