use std::io::{BufRead, Write};
use std::path::Path;

use tracing::{debug, trace};

use crate::constants::{MEMORY_SIZE, REGISTER_COUNT, TRACE_TARGET};
use crate::error::{LoadError, MachineError};
use crate::instruction::{from_op, is_defined};
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::operations::Flow;
use crate::program;
use crate::state::State;

/// Where the machine is in its lifecycle. `Halted` is terminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// Constructed, possibly loaded, never run
    Ready,
    Running,
    Halted,
}

/// # LS-8
/// The LS-8 is an 8-bit computer with 256 bytes of memory and 8 registers.
///
/// Tracks:
///  - current `state`
///  - its `status`
///
/// Supplies interfaces for:
/// - loading programs from bytes, readers or files
/// - stepping or running the CPU with a sink for PRN/PRA output
/// - inspecting registers, flags and memory, including after a fatal error
pub struct Ls8 {
    state: State,
    status: Status,
}

impl Ls8 {
    pub fn new() -> Self {
        Ls8 {
            state: State::new(),
            status: Status::Ready,
        }
    }

    /// Copy a program into memory starting at address 0
    ///
    /// # Arguments
    /// * `program` the raw instruction bytes
    pub fn load(&mut self, program: &[u8]) -> Result<(), LoadError> {
        self.state.memory.load(program)?;
        debug!(bytes = program.len(), "loaded program");
        Ok(())
    }

    /// Load a textual program image
    ///
    /// # Arguments
    /// * `reader` a reader that yields one binary byte per line
    pub fn load_program(&mut self, reader: &mut dyn BufRead) -> Result<(), LoadError> {
        self.load(&program::parse(reader)?)
    }

    /// Load a textual program image from `path`
    pub fn load_file(&mut self, path: &Path) -> Result<(), LoadError> {
        self.load(&program::read(path)?)
    }

    /// Runs until the machine halts or a fatal error is raised.
    ///
    /// A machine that has already halted stays halted and returns immediately.
    pub fn run(&mut self, out: &mut dyn Write) -> Result<(), MachineError> {
        while self.step(out)? != Status::Halted {}
        Ok(())
    }

    /// Advances the CPU by a single instruction
    /// - fetches the opcode at the pc and the operands its width calls for
    /// - executes the decoded instruction
    /// - moves the pc past the instruction unless the instruction moved it
    ///
    /// On error the state is left as it was when the error was raised.
    pub fn step(&mut self, out: &mut dyn Write) -> Result<Status, MachineError> {
        if self.status == Status::Halted {
            return Ok(Status::Halted);
        }
        self.status = Status::Running;

        trace!(target: TRACE_TARGET, "{}", self.trace_line());

        let pc = self.state.pc;
        let op = self.state.memory.read(pc)?;
        if !is_defined(op) {
            return Err(MachineError::UnknownOpcode { opcode: op, pc });
        }

        let mut operands = [0u8; 2];
        for (offset, operand) in operands.iter_mut().enumerate().take(op.operands()) {
            *operand = self.state.memory.read(pc + 1 + offset)?;
        }

        let instruction = from_op(op, operands[0], operands[1])
            .ok_or(MachineError::UnknownOpcode { opcode: op, pc })?;
        let next = pc + op.width();

        match instruction.execute(&mut self.state, out, next)? {
            Flow::Next if next >= MEMORY_SIZE => {
                return Err(MachineError::AddressOutOfRange { address: next });
            }
            Flow::Next => self.state.pc = next,
            Flow::Jump(target) => self.state.pc = target,
            Flow::Halt => {
                debug!(pc, "halted");
                self.status = Status::Halted;
            }
        }
        Ok(self.status)
    }

    /// One line describing the machine as the next instruction is fetched:
    /// `TRACE: pc | fl ram[pc] ram[pc+1] ram[pc+2] | R0 .. R7`
    ///
    /// Bytes past the end of memory are shown as `--`.
    pub fn trace_line(&self) -> String {
        let pc = self.state.pc;
        let mut line = format!("TRACE: {:02X} | {:02X}", pc, self.state.fl);
        for address in pc..pc + 3 {
            match self.state.memory.peek(address) {
                Some(byte) => line.push_str(&format!(" {:02X}", byte)),
                None => line.push_str(" --"),
            }
        }
        line.push_str(" |");
        for register in self.state.reg.iter() {
            line.push_str(&format!(" {:02X}", register));
        }
        line
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn pc(&self) -> usize {
        self.state.pc
    }

    pub fn fl(&self) -> u8 {
        self.state.fl
    }

    /// Interrupts-enabled flag; nothing in the machine changes it
    pub fn ie(&self) -> bool {
        self.state.ie
    }

    pub fn registers(&self) -> [u8; REGISTER_COUNT] {
        self.state.reg
    }

    pub fn register(&self, index: u8) -> Result<u8, MachineError> {
        self.state.reg(index)
    }

    pub fn memory(&self) -> &Memory {
        &self.state.memory
    }
}

impl Default for Ls8 {
    fn default() -> Self {
        Self::new()
    }
}
