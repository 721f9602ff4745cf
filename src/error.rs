use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning a program image into memory contents.
///
/// These are recoverable at the process boundary: nothing has been executed yet.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("program \"{}\" not found", path.display())]
    ProgramNotFound { path: PathBuf },

    #[error("unable to read program \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {text:?} is not a binary byte literal")]
    MalformedInstruction { line: usize, text: String },

    #[error("program is {len} bytes but memory only holds {max}")]
    ProgramTooLarge { len: usize, max: usize },
}

/// Fatal conditions raised inside the fetch/decode/execute loop.
///
/// The machine keeps whatever state it had when the error was raised.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("memory address {address:#04X} is out of range")]
    AddressOutOfRange { address: usize },

    #[error("register R{register} does not exist")]
    RegisterOutOfRange { register: u8 },

    #[error("unknown opcode {opcode:#010b} at {pc:#04X}")]
    UnknownOpcode { opcode: u8, pc: usize },

    #[error("unable to write output: {0}")]
    Output(#[from] io::Error),
}
