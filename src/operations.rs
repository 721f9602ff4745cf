use std::convert::TryFrom;
use std::io::Write;

use tracing::{debug, warn};

use crate::alu::{Alu, Outcome};
use crate::constants::{FLAG_EQUAL, SP};
use crate::error::MachineError;
use crate::state::State;

/// How the dispatcher should continue after an operation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Advance the PC past the instruction
    Next,
    /// The operation chose the next PC itself
    Jump(usize),
    Halt,
}

/// no-op
pub fn nop(_state: &mut State) -> Result<Flow, MachineError> {
    Ok(Flow::Next)
}

/// halt
pub fn hlt(_state: &mut State) -> Result<Flow, MachineError> {
    Ok(Flow::Halt)
}

/// Ra = kk
pub fn ldi(state: &mut State, a: u8, kk: u8) -> Result<Flow, MachineError> {
    state.set_reg(a, kk)?;
    Ok(Flow::Next)
}

/// Ra = MEM[Rb]
pub fn ld(state: &mut State, a: u8, b: u8) -> Result<Flow, MachineError> {
    let value = state.memory.read(state.reg(b)?.into())?;
    state.set_reg(a, value)?;
    Ok(Flow::Next)
}

/// MEM[Ra] = Rb
pub fn st(state: &mut State, a: u8, b: u8) -> Result<Flow, MachineError> {
    let address = state.reg(a)?;
    let value = state.reg(b)?;
    state.memory.write(value, address.into())?;
    Ok(Flow::Next)
}

/// print(Ra) as a decimal number
pub fn prn(state: &mut State, out: &mut dyn Write, a: u8) -> Result<Flow, MachineError> {
    writeln!(out, "{}", state.reg(a)?)?;
    Ok(Flow::Next)
}

/// print(Ra) as a character
pub fn pra(state: &mut State, out: &mut dyn Write, a: u8) -> Result<Flow, MachineError> {
    writeln!(out, "{}", char::from(state.reg(a)?))?;
    Ok(Flow::Next)
}

/// STACK.push(Ra)
///
/// Ra is read after SP moves, so PUSH R7 stores the decremented SP.
pub fn push(state: &mut State, a: u8) -> Result<Flow, MachineError> {
    state.check_reg(a)?;
    Alu::Dec(SP).execute(state)?;
    let value = state.reg(a)?;
    push_value(state, value)?;
    Ok(Flow::Next)
}

/// Ra = STACK.pop()
pub fn pop(state: &mut State, a: u8) -> Result<Flow, MachineError> {
    let value = state.memory.read(state.sp().into())?;
    state.set_reg(a, value)?;
    Alu::Inc(SP).execute(state)?;
    Ok(Flow::Next)
}

/// STACK.push(return address); PC = Ra
///
/// # Arguments
/// * `ret` the address of the instruction after the CALL
pub fn call(state: &mut State, a: u8, ret: usize) -> Result<Flow, MachineError> {
    let target = state.reg(a)?;
    let ret = u8::try_from(ret).map_err(|_| MachineError::AddressOutOfRange { address: ret })?;
    Alu::Dec(SP).execute(state)?;
    push_value(state, ret)?;
    Ok(Flow::Jump(target.into()))
}

/// PC = STACK.pop()
pub fn ret(state: &mut State) -> Result<Flow, MachineError> {
    let target = state.memory.read(state.sp().into())?;
    Alu::Inc(SP).execute(state)?;
    Ok(Flow::Jump(target.into()))
}

/// PC = Ra
pub fn jmp(state: &mut State, a: u8) -> Result<Flow, MachineError> {
    Ok(Flow::Jump(state.reg(a)?.into()))
}

/// if FL & mask then PC = Ra
///
/// JEQ, JGT, JLT, JLE and JGE differ only in which flag bits they accept.
pub fn jump_if(state: &mut State, a: u8, mask: u8) -> Result<Flow, MachineError> {
    let target = state.reg(a)?;
    if state.fl & mask != 0 {
        Ok(Flow::Jump(target.into()))
    } else {
        Ok(Flow::Next)
    }
}

/// if !(FL & E) then PC = Ra
pub fn jne(state: &mut State, a: u8) -> Result<Flow, MachineError> {
    let target = state.reg(a)?;
    if state.fl & FLAG_EQUAL == 0 {
        Ok(Flow::Jump(target.into()))
    } else {
        Ok(Flow::Next)
    }
}

/// Interrupts are never delivered; the request is only logged.
pub fn int(state: &mut State, a: u8) -> Result<Flow, MachineError> {
    let interrupt = state.reg(a)?;
    debug!(interrupt, ie = state.ie, "ignoring INT");
    Ok(Flow::Next)
}

/// Nothing to return from; see `int`.
pub fn iret(_state: &mut State) -> Result<Flow, MachineError> {
    debug!("ignoring IRET");
    Ok(Flow::Next)
}

/// Runs an ALU operation; a zero divisor halts rather than faults
pub fn alu(state: &mut State, op: Alu) -> Result<Flow, MachineError> {
    match op.execute(state)? {
        Outcome::Done => Ok(Flow::Next),
        Outcome::DivideByZero => {
            warn!(?op, pc = state.pc, "division by zero, halting");
            Ok(Flow::Halt)
        }
    }
}

/// MEM[SP] = value; SP has already been decremented
fn push_value(state: &mut State, value: u8) -> Result<(), MachineError> {
    let sp = state.sp();
    state.memory.write(value, sp.into())
}
