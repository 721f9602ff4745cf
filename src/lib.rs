pub use alu::Alu;
pub use error::{LoadError, MachineError};
pub use ls8::{Ls8, Status};
pub use memory::Memory;

mod alu;
pub mod constants;
mod error;
pub mod instruction;
mod ls8;
mod memory;
mod opcode;
mod operations;
mod program;
mod state;
