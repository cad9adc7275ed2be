//! Reference processor: a 6502 subset stepping over an [`AddressSpace`].
//!
//! Faults are precise at the register level: an instruction that cannot
//! retire leaves the register file and cycle counter as they were. Memory
//! side effects that already happened (a consumed keyboard byte, a pushed
//! stack byte) are not rolled back.

mod flags;

use crate::decoder::{decode, AddressingMode, Instruction, Operation};
use crate::fault::{AccessError, CpuFault};
use crate::memory::AddressSpace;
use crate::processor::{Processor, StepOutcome};
use crate::state::{RegisterFile, FLAG_B, FLAG_C, FLAG_I, FLAG_N, FLAG_Z, STACK_PAGE};
use crate::timing::{cycle_cost, CycleCostKind};

/// Address of the little-endian `BRK` handler vector.
pub const BRK_VECTOR: u16 = 0xFFFE;

/// Bit 5 of a pushed status byte; always set in pushed copies.
const FLAG_UNUSED: u8 = 1 << 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    None,
    Value(u8),
    Address(u16),
}

/// Reference processor state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpu {
    regs: RegisterFile,
    entry: u16,
    cycles: u64,
}

impl Cpu {
    /// Creates a processor that starts (and restarts) execution at `entry`.
    #[must_use]
    pub const fn new(entry: u16) -> Self {
        Self {
            regs: RegisterFile::at_entry(entry),
            entry,
            cycles: 0,
        }
    }

    /// Reset entry point.
    #[must_use]
    pub const fn entry(&self) -> u16 {
        self.entry
    }

    #[allow(clippy::too_many_lines)]
    fn execute(
        &mut self,
        bus: &mut AddressSpace,
        instruction: Instruction,
    ) -> Result<u8, AccessError> {
        let operand_pc = self.regs.pc().wrapping_add(1);
        self.regs
            .set_pc(operand_pc.wrapping_add(instruction.mode.operand_len()));
        let operand = self.resolve(bus, instruction.mode, operand_pc)?;
        let mut kind = cost_kind(instruction);

        match instruction.operation {
            Operation::Lda => {
                let value = load(bus, operand)?;
                self.regs.set_a(value);
                self.regs.set_nz(value);
            }
            Operation::Ldx => {
                let value = load(bus, operand)?;
                self.regs.set_x(value);
                self.regs.set_nz(value);
            }
            Operation::Ldy => {
                let value = load(bus, operand)?;
                self.regs.set_y(value);
                self.regs.set_nz(value);
            }
            Operation::Sta => store(bus, operand, self.regs.a())?,
            Operation::Stx => store(bus, operand, self.regs.x())?,
            Operation::Sty => store(bus, operand, self.regs.y())?,
            Operation::Tax => {
                let value = self.regs.a();
                self.regs.set_x(value);
                self.regs.set_nz(value);
            }
            Operation::Txa => {
                let value = self.regs.x();
                self.regs.set_a(value);
                self.regs.set_nz(value);
            }
            Operation::Tay => {
                let value = self.regs.a();
                self.regs.set_y(value);
                self.regs.set_nz(value);
            }
            Operation::Tya => {
                let value = self.regs.y();
                self.regs.set_a(value);
                self.regs.set_nz(value);
            }
            Operation::Inx => {
                let value = self.regs.x().wrapping_add(1);
                self.regs.set_x(value);
                self.regs.set_nz(value);
            }
            Operation::Iny => {
                let value = self.regs.y().wrapping_add(1);
                self.regs.set_y(value);
                self.regs.set_nz(value);
            }
            Operation::Dex => {
                let value = self.regs.x().wrapping_sub(1);
                self.regs.set_x(value);
                self.regs.set_nz(value);
            }
            Operation::Dey => {
                let value = self.regs.y().wrapping_sub(1);
                self.regs.set_y(value);
                self.regs.set_nz(value);
            }
            Operation::Cmp => {
                let register = self.regs.a();
                let value = load(bus, operand)?;
                flags::compare(&mut self.regs, register, value);
            }
            Operation::Cpx => {
                let register = self.regs.x();
                let value = load(bus, operand)?;
                flags::compare(&mut self.regs, register, value);
            }
            Operation::Cpy => {
                let register = self.regs.y();
                let value = load(bus, operand)?;
                flags::compare(&mut self.regs, register, value);
            }
            Operation::Adc => {
                let value = load(bus, operand)?;
                flags::add_with_carry(&mut self.regs, value);
            }
            Operation::Sbc => {
                let value = load(bus, operand)?;
                flags::subtract_with_borrow(&mut self.regs, value);
            }
            Operation::And => {
                let value = self.regs.a() & load(bus, operand)?;
                self.regs.set_a(value);
                self.regs.set_nz(value);
            }
            Operation::Ora => {
                let value = self.regs.a() | load(bus, operand)?;
                self.regs.set_a(value);
                self.regs.set_nz(value);
            }
            Operation::Eor => {
                let value = self.regs.a() ^ load(bus, operand)?;
                self.regs.set_a(value);
                self.regs.set_nz(value);
            }
            Operation::Beq
            | Operation::Bne
            | Operation::Bcc
            | Operation::Bcs
            | Operation::Bmi
            | Operation::Bpl => {
                if self.branch_taken(instruction.operation) {
                    if let Operand::Address(target) = operand {
                        self.regs.set_pc(target);
                    }
                    kind = CycleCostKind::BranchTaken;
                }
            }
            Operation::Jmp => {
                if let Operand::Address(target) = operand {
                    self.regs.set_pc(target);
                }
            }
            Operation::Jsr => {
                let [lo, hi] = self.regs.pc().wrapping_sub(1).to_le_bytes();
                self.push(bus, hi)?;
                self.push(bus, lo)?;
                if let Operand::Address(target) = operand {
                    self.regs.set_pc(target);
                }
            }
            Operation::Rts => {
                let lo = self.pull(bus)?;
                let hi = self.pull(bus)?;
                self.regs
                    .set_pc(u16::from_le_bytes([lo, hi]).wrapping_add(1));
            }
            Operation::Pha => self.push(bus, self.regs.a())?,
            Operation::Pla => {
                let value = self.pull(bus)?;
                self.regs.set_a(value);
                self.regs.set_nz(value);
            }
            Operation::Clc => self.regs.set_flag(FLAG_C, false),
            Operation::Sec => self.regs.set_flag(FLAG_C, true),
            Operation::Nop => {}
            Operation::Brk => {
                let [lo, hi] = self.regs.pc().wrapping_add(1).to_le_bytes();
                self.push(bus, hi)?;
                self.push(bus, lo)?;
                self.push(bus, self.regs.flags() | FLAG_B | FLAG_UNUSED)?;
                self.regs.set_flag(FLAG_I, true);
                let handler = bus.read_word(BRK_VECTOR)?;
                self.regs.set_pc(handler);
            }
        }

        Ok(cycle_cost(kind))
    }

    fn resolve(
        &self,
        bus: &mut AddressSpace,
        mode: AddressingMode,
        operand_pc: u16,
    ) -> Result<Operand, AccessError> {
        Ok(match mode {
            AddressingMode::Implied => Operand::None,
            AddressingMode::Immediate => Operand::Value(bus.read(operand_pc)?),
            AddressingMode::ZeroPage => Operand::Address(u16::from(bus.read(operand_pc)?)),
            AddressingMode::Absolute => Operand::Address(bus.read_word(operand_pc)?),
            AddressingMode::AbsoluteX => Operand::Address(
                bus.read_word(operand_pc)?
                    .wrapping_add(u16::from(self.regs.x())),
            ),
            AddressingMode::Relative => {
                let offset = i8::from_le_bytes([bus.read(operand_pc)?]);
                Operand::Address(self.regs.pc().wrapping_add_signed(i16::from(offset)))
            }
        })
    }

    const fn branch_taken(&self, operation: Operation) -> bool {
        match operation {
            Operation::Beq => self.regs.flag_is_set(FLAG_Z),
            Operation::Bne => !self.regs.flag_is_set(FLAG_Z),
            Operation::Bcs => self.regs.flag_is_set(FLAG_C),
            Operation::Bcc => !self.regs.flag_is_set(FLAG_C),
            Operation::Bmi => self.regs.flag_is_set(FLAG_N),
            Operation::Bpl => !self.regs.flag_is_set(FLAG_N),
            _ => false,
        }
    }

    fn push(&mut self, bus: &mut AddressSpace, value: u8) -> Result<(), AccessError> {
        let sp = self.regs.sp();
        bus.write(STACK_PAGE | u16::from(sp), value, true)?;
        self.regs.set_sp(sp.wrapping_sub(1));
        Ok(())
    }

    fn pull(&mut self, bus: &mut AddressSpace) -> Result<u8, AccessError> {
        let sp = self.regs.sp().wrapping_add(1);
        let value = bus.read(STACK_PAGE | u16::from(sp))?;
        self.regs.set_sp(sp);
        Ok(value)
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new(crate::memory::ROM_ORIGIN)
    }
}

impl Processor for Cpu {
    fn step(
        &mut self,
        bus: &mut AddressSpace,
        capture_stats: bool,
    ) -> Result<StepOutcome, CpuFault> {
        let snapshot = self.regs;
        let pc = snapshot.pc();
        let opcode = bus
            .read(pc)
            .map_err(|source| CpuFault::Memory { pc, source })?;
        let Some(instruction) = decode(opcode) else {
            return Err(CpuFault::IllegalOpcode { opcode, pc });
        };

        let cycles = match self.execute(bus, instruction) {
            Ok(cycles) => cycles,
            Err(source) => {
                self.regs = snapshot;
                return Err(CpuFault::Memory { pc, source });
            }
        };
        self.cycles += u64::from(cycles);

        if capture_stats {
            log::debug!(
                "{pc:04x} {:?} -> pc={:04x} a={:02x} x={:02x} y={:02x} sp={:02x} p={:08b} cycles={}",
                instruction.operation,
                self.regs.pc(),
                self.regs.a(),
                self.regs.x(),
                self.regs.y(),
                self.regs.sp(),
                self.regs.flags(),
                self.cycles
            );
        }

        Ok(StepOutcome { pc, opcode, cycles })
    }

    fn registers(&self) -> RegisterFile {
        self.regs
    }

    fn cycles(&self) -> u64 {
        self.cycles
    }

    fn reset(&mut self) {
        self.regs = RegisterFile::at_entry(self.entry);
        self.cycles = 0;
    }
}

const fn cost_kind(instruction: Instruction) -> CycleCostKind {
    let store = instruction.operation.is_store();
    match instruction.mode {
        AddressingMode::Immediate => CycleCostKind::Immediate,
        AddressingMode::ZeroPage if store => CycleCostKind::ZeroPageWrite,
        AddressingMode::ZeroPage => CycleCostKind::ZeroPageRead,
        AddressingMode::Absolute => match instruction.operation {
            Operation::Jmp => CycleCostKind::Jump,
            Operation::Jsr => CycleCostKind::Call,
            _ if store => CycleCostKind::AbsoluteWrite,
            _ => CycleCostKind::AbsoluteRead,
        },
        AddressingMode::AbsoluteX if store => CycleCostKind::AbsoluteIndexedWrite,
        AddressingMode::AbsoluteX => CycleCostKind::AbsoluteRead,
        AddressingMode::Relative => CycleCostKind::BranchNotTaken,
        AddressingMode::Implied => match instruction.operation {
            Operation::Rts => CycleCostKind::Ret,
            Operation::Pha => CycleCostKind::Push,
            Operation::Pla => CycleCostKind::Pop,
            Operation::Brk => CycleCostKind::Break,
            _ => CycleCostKind::Implied,
        },
    }
}

fn load(bus: &mut AddressSpace, operand: Operand) -> Result<u8, AccessError> {
    match operand {
        Operand::None => Ok(0),
        Operand::Value(value) => Ok(value),
        Operand::Address(addr) => bus.read(addr),
    }
}

fn store(bus: &mut AddressSpace, operand: Operand, value: u8) -> Result<(), AccessError> {
    match operand {
        Operand::Address(addr) => bus.write(addr, value, true),
        Operand::None | Operand::Value(_) => Ok(()),
    }
}
