//! Fixed cycle costs of the reference processor's instruction forms.

/// Instruction forms with distinct fixed cycle costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleCostKind {
    /// Register-only instruction (transfers, increments, flag ops, `NOP`).
    Implied,
    /// Operand taken from the instruction stream.
    Immediate,
    /// Read from page zero.
    ZeroPageRead,
    /// Write to page zero.
    ZeroPageWrite,
    /// Read from a 16-bit address.
    AbsoluteRead,
    /// Write to a 16-bit address.
    AbsoluteWrite,
    /// Indexed write to a 16-bit address.
    AbsoluteIndexedWrite,
    /// Conditional branch, not taken.
    BranchNotTaken,
    /// Conditional branch, taken.
    BranchTaken,
    /// Unconditional jump.
    Jump,
    /// Subroutine call.
    Call,
    /// Subroutine return.
    Ret,
    /// Stack push.
    Push,
    /// Stack pop.
    Pop,
    /// Software break.
    Break,
}

/// Returns the fixed cycle cost for `kind`.
#[must_use]
pub const fn cycle_cost(kind: CycleCostKind) -> u8 {
    match kind {
        CycleCostKind::Implied
        | CycleCostKind::Immediate
        | CycleCostKind::BranchNotTaken => 2,
        CycleCostKind::ZeroPageRead
        | CycleCostKind::ZeroPageWrite
        | CycleCostKind::BranchTaken
        | CycleCostKind::Jump
        | CycleCostKind::Push => 3,
        CycleCostKind::AbsoluteRead | CycleCostKind::AbsoluteWrite | CycleCostKind::Pop => 4,
        CycleCostKind::AbsoluteIndexedWrite => 5,
        CycleCostKind::Call | CycleCostKind::Ret => 6,
        CycleCostKind::Break => 7,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{cycle_cost, CycleCostKind};

    #[rstest]
    #[case(CycleCostKind::Implied, 2)]
    #[case(CycleCostKind::BranchNotTaken, 2)]
    #[case(CycleCostKind::BranchTaken, 3)]
    #[case(CycleCostKind::AbsoluteRead, 4)]
    #[case(CycleCostKind::AbsoluteIndexedWrite, 5)]
    #[case(CycleCostKind::Call, 6)]
    #[case(CycleCostKind::Break, 7)]
    fn costs_follow_the_instruction_form(#[case] kind: CycleCostKind, #[case] cycles: u8) {
        assert_eq!(cycle_cost(kind), cycles);
    }

    #[test]
    fn taken_branch_costs_one_more() {
        assert_eq!(
            cycle_cost(CycleCostKind::BranchTaken),
            cycle_cost(CycleCostKind::BranchNotTaken) + 1
        );
    }
}
