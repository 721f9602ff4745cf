use crate::constants::{REGISTER_COUNT, SP, STACK_TOP};
use crate::error::MachineError;
use crate::memory::Memory;

/// A snapshot of the LS-8 internal state
///
/// ## CPU
/// Registers
/// - (reg) 8 8-bit registers (R0..R7)
///     - R0..R6 are general purpose registers
///     - R7 is the stack pointer and starts at `STACK_TOP`
///
/// Counter
/// - (pc) the address of the next instruction to fetch
///
/// Flags
/// - (fl) `00000LGE`, written only by CMP
/// - (ie) interrupts enabled; stored but never acted on
///
/// ## Memory
/// - 256 bytes of addressable memory
///     - programs are loaded at 0x00
///     - the stack grows down from 0xF4 in the same memory
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub reg: [u8; REGISTER_COUNT],
    pub pc: usize,
    pub fl: u8,
    pub ie: bool,
    pub memory: Memory,
}

impl State {
    pub fn new() -> Self {
        let mut reg = [0; REGISTER_COUNT];
        reg[SP as usize] = STACK_TOP;

        State {
            reg,
            pc: 0,
            fl: 0,
            ie: false,
            memory: Memory::new(),
        }
    }

    /// The value held in register `index`
    pub fn reg(&self, index: u8) -> Result<u8, MachineError> {
        self.reg
            .get(index as usize)
            .copied()
            .ok_or(MachineError::RegisterOutOfRange { register: index })
    }

    /// Fails if register `index` does not exist
    pub fn check_reg(&self, index: u8) -> Result<(), MachineError> {
        self.reg(index).map(|_| ())
    }

    /// Overwrite register `index` with `value`
    pub fn set_reg(&mut self, index: u8, value: u8) -> Result<(), MachineError> {
        let register = self
            .reg
            .get_mut(index as usize)
            .ok_or(MachineError::RegisterOutOfRange { register: index })?;
        *register = value;
        Ok(())
    }

    /// The current stack pointer (R7)
    pub fn sp(&self) -> u8 {
        self.reg[SP as usize]
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
