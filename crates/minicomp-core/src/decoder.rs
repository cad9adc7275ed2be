//! Opcode decode table for the reference processor.
//!
//! The reference processor implements a 6502 subset: enough to run small
//! firmware images that poll the keyboard register and drive the screen.

/// Addressing modes understood by the reference processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand bytes.
    Implied,
    /// One literal operand byte.
    Immediate,
    /// One-byte address in page zero.
    ZeroPage,
    /// Two-byte little-endian address.
    Absolute,
    /// Two-byte address plus the X register, wrapping at 64 KiB.
    AbsoluteX,
    /// Signed one-byte displacement from the next instruction.
    Relative,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    #[must_use]
    pub const fn operand_len(self) -> u16 {
        match self {
            Self::Implied => 0,
            Self::Immediate | Self::ZeroPage | Self::Relative => 1,
            Self::Absolute | Self::AbsoluteX => 2,
        }
    }
}

/// Operations implemented by the reference processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Operation {
    Lda,
    Ldx,
    Ldy,
    Sta,
    Stx,
    Sty,
    Tax,
    Txa,
    Tay,
    Tya,
    Inx,
    Iny,
    Dex,
    Dey,
    Cmp,
    Cpx,
    Cpy,
    Adc,
    Sbc,
    And,
    Ora,
    Eor,
    Beq,
    Bne,
    Bcc,
    Bcs,
    Bmi,
    Bpl,
    Jmp,
    Jsr,
    Rts,
    Pha,
    Pla,
    Clc,
    Sec,
    Nop,
    Brk,
}

impl Operation {
    /// Whether the operation stores to its effective address.
    #[must_use]
    pub const fn is_store(self) -> bool {
        matches!(self, Self::Sta | Self::Stx | Self::Sty)
    }

    /// Whether the operation is a conditional branch.
    #[must_use]
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Self::Beq | Self::Bne | Self::Bcc | Self::Bcs | Self::Bmi | Self::Bpl
        )
    }
}

/// A decoded opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// What the instruction does.
    pub operation: Operation,
    /// Where its operand comes from.
    pub mode: AddressingMode,
}

/// Decodes an opcode byte; `None` for opcodes outside the implemented subset.
#[must_use]
#[allow(clippy::enum_glob_use)]
pub const fn decode(opcode: u8) -> Option<Instruction> {
    use AddressingMode::{Absolute, AbsoluteX, Immediate, Implied, Relative, ZeroPage};
    use Operation::*;

    let (operation, mode) = match opcode {
        0xA9 => (Lda, Immediate),
        0xA5 => (Lda, ZeroPage),
        0xAD => (Lda, Absolute),
        0xBD => (Lda, AbsoluteX),
        0xA2 => (Ldx, Immediate),
        0xA6 => (Ldx, ZeroPage),
        0xAE => (Ldx, Absolute),
        0xA0 => (Ldy, Immediate),
        0xA4 => (Ldy, ZeroPage),
        0xAC => (Ldy, Absolute),
        0x85 => (Sta, ZeroPage),
        0x8D => (Sta, Absolute),
        0x9D => (Sta, AbsoluteX),
        0x86 => (Stx, ZeroPage),
        0x8E => (Stx, Absolute),
        0x84 => (Sty, ZeroPage),
        0x8C => (Sty, Absolute),
        0xAA => (Tax, Implied),
        0x8A => (Txa, Implied),
        0xA8 => (Tay, Implied),
        0x98 => (Tya, Implied),
        0xE8 => (Inx, Implied),
        0xC8 => (Iny, Implied),
        0xCA => (Dex, Implied),
        0x88 => (Dey, Implied),
        0xC9 => (Cmp, Immediate),
        0xC5 => (Cmp, ZeroPage),
        0xCD => (Cmp, Absolute),
        0xE0 => (Cpx, Immediate),
        0xC0 => (Cpy, Immediate),
        0x69 => (Adc, Immediate),
        0x65 => (Adc, ZeroPage),
        0x6D => (Adc, Absolute),
        0xE9 => (Sbc, Immediate),
        0x29 => (And, Immediate),
        0x09 => (Ora, Immediate),
        0x49 => (Eor, Immediate),
        0xF0 => (Beq, Relative),
        0xD0 => (Bne, Relative),
        0x90 => (Bcc, Relative),
        0xB0 => (Bcs, Relative),
        0x30 => (Bmi, Relative),
        0x10 => (Bpl, Relative),
        0x4C => (Jmp, Absolute),
        0x20 => (Jsr, Absolute),
        0x60 => (Rts, Implied),
        0x48 => (Pha, Implied),
        0x68 => (Pla, Implied),
        0x18 => (Clc, Implied),
        0x38 => (Sec, Implied),
        0xEA => (Nop, Implied),
        0x00 => (Brk, Implied),
        _ => return None,
    };
    Some(Instruction { operation, mode })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{decode, AddressingMode, Operation};

    #[rstest]
    #[case(0xA9, Operation::Lda, AddressingMode::Immediate)]
    #[case(0xAD, Operation::Lda, AddressingMode::Absolute)]
    #[case(0x8D, Operation::Sta, AddressingMode::Absolute)]
    #[case(0xF0, Operation::Beq, AddressingMode::Relative)]
    #[case(0x4C, Operation::Jmp, AddressingMode::Absolute)]
    #[case(0x00, Operation::Brk, AddressingMode::Implied)]
    fn decodes_known_opcodes(
        #[case] opcode: u8,
        #[case] operation: Operation,
        #[case] mode: AddressingMode,
    ) {
        let instruction = decode(opcode).expect("opcode is implemented");
        assert_eq!(instruction.operation, operation);
        assert_eq!(instruction.mode, mode);
    }

    #[rstest]
    #[case(0x02)]
    #[case(0xFF)]
    #[case(0x6C)]
    fn rejects_unimplemented_opcodes(#[case] opcode: u8) {
        assert_eq!(decode(opcode), None);
    }

    #[test]
    fn stores_and_branches_are_classified() {
        assert!(Operation::Sty.is_store());
        assert!(!Operation::Lda.is_store());
        assert!(Operation::Bpl.is_branch());
        assert!(!Operation::Jmp.is_branch());
    }

    #[test]
    fn operand_lengths_follow_mode() {
        assert_eq!(AddressingMode::Implied.operand_len(), 0);
        assert_eq!(AddressingMode::Relative.operand_len(), 1);
        assert_eq!(AddressingMode::AbsoluteX.operand_len(), 2);
    }
}
