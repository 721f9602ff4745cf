use crate::constants::{FLAG_EQUAL, FLAG_GREATER, FLAG_LESS};
use crate::error::MachineError;
use crate::state::State;

/// # ALU
/// Operations over the register file, each naming the registers it works on.
///
/// Binary operations write `a op b` into `a`; unary operations rewrite their one register.
/// CMP writes only the flags. Every result is truncated to 8 bits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Alu {
    Add(u8, u8),
    Sub(u8, u8),
    Mul(u8, u8),
    Div(u8, u8),
    Mod(u8, u8),
    Inc(u8),
    Dec(u8),
    Cmp(u8, u8),
    And(u8, u8),
    Or(u8, u8),
    Xor(u8, u8),
    Not(u8),
    Shl(u8, u8),
    Shr(u8, u8),
}

/// What happened when the ALU ran
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// DIV or MOD with a zero divisor; nothing was written
    DivideByZero,
}

impl Alu {
    /// Runs the operation against `state`.
    ///
    /// Register indices are checked before anything is written, so a failed operation
    /// leaves the state untouched.
    pub(crate) fn execute(self, state: &mut State) -> Result<Outcome, MachineError> {
        match self {
            Alu::Add(a, b) => binary(state, a, b, u8::wrapping_add),
            Alu::Sub(a, b) => binary(state, a, b, u8::wrapping_sub),
            Alu::Mul(a, b) => binary(state, a, b, u8::wrapping_mul),
            Alu::Div(a, b) => divide(state, a, b, |x, y| x / y),
            Alu::Mod(a, b) => divide(state, a, b, |x, y| x % y),
            Alu::Inc(a) => unary(state, a, |x| x.wrapping_add(1)),
            Alu::Dec(a) => unary(state, a, |x| x.wrapping_sub(1)),
            Alu::Cmp(a, b) => {
                state.fl = compare(state.reg(a)?, state.reg(b)?);
                Ok(Outcome::Done)
            }
            Alu::And(a, b) => binary(state, a, b, |x, y| x & y),
            Alu::Or(a, b) => binary(state, a, b, |x, y| x | y),
            Alu::Xor(a, b) => binary(state, a, b, |x, y| x ^ y),
            Alu::Not(a) => unary(state, a, |x| !x),
            Alu::Shl(a, b) => binary(state, a, b, |x, y| x.checked_shl(y.into()).unwrap_or(0)),
            Alu::Shr(a, b) => binary(state, a, b, |x, y| x.checked_shr(y.into()).unwrap_or(0)),
        }
    }
}

/// Flags for CMP: exactly one of equal, less, greater
pub fn compare(a: u8, b: u8) -> u8 {
    use std::cmp::Ordering;

    match a.cmp(&b) {
        Ordering::Equal => FLAG_EQUAL,
        Ordering::Less => FLAG_LESS,
        Ordering::Greater => FLAG_GREATER,
    }
}

fn binary(
    state: &mut State,
    a: u8,
    b: u8,
    f: impl Fn(u8, u8) -> u8,
) -> Result<Outcome, MachineError> {
    let res = f(state.reg(a)?, state.reg(b)?);
    state.set_reg(a, res)?;
    Ok(Outcome::Done)
}

fn unary(state: &mut State, a: u8, f: impl Fn(u8) -> u8) -> Result<Outcome, MachineError> {
    let res = f(state.reg(a)?);
    state.set_reg(a, res)?;
    Ok(Outcome::Done)
}

/// Unsigned operands make floor division and truncating division agree
fn divide(
    state: &mut State,
    a: u8,
    b: u8,
    f: impl Fn(u8, u8) -> u8,
) -> Result<Outcome, MachineError> {
    let (dividend, divisor) = (state.reg(a)?, state.reg(b)?);
    if divisor == 0 {
        return Ok(Outcome::DivideByZero);
    }
    state.set_reg(a, f(dividend, divisor))?;
    Ok(Outcome::Done)
}
