//! Narrow contract between the command layer and an instruction-set processor.

use crate::fault::CpuFault;
use crate::memory::AddressSpace;
use crate::state::RegisterFile;

/// Result of one retired instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepOutcome {
    /// Address the opcode was fetched from.
    pub pc: u16,
    /// Opcode byte that retired.
    pub opcode: u8,
    /// Cycles consumed.
    pub cycles: u8,
}

/// Single-stepped processor driving an [`AddressSpace`].
pub trait Processor {
    /// Executes exactly one instruction and advances the cycle counter.
    ///
    /// With `capture_stats` set the processor records its register file in
    /// the log after retiring.
    ///
    /// # Errors
    ///
    /// Returns a [`CpuFault`] when the instruction cannot retire; register
    /// state is left as it was before the step.
    fn step(&mut self, bus: &mut AddressSpace, capture_stats: bool)
        -> Result<StepOutcome, CpuFault>;

    /// Side-effect-free read of the register file.
    fn registers(&self) -> RegisterFile;

    /// Total cycles consumed since reset.
    fn cycles(&self) -> u64;

    /// Restores the power-on register state.
    fn reset(&mut self);
}
