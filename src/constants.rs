/// Number of addressable bytes of memory
pub const MEMORY_SIZE: usize = 256;

/// Number of general purpose registers (R0..R7)
pub const REGISTER_COUNT: usize = 8;

/// R7 is reserved as the stack pointer
pub const SP: u8 = 7;

/// The stack grows down from here; 0xF5..0xFF are left free
pub const STACK_TOP: u8 = 0xF4;

/// Flag bits set by CMP, `00000LGE`
pub const FLAG_EQUAL: u8 = 0b0000_0001;
pub const FLAG_GREATER: u8 = 0b0000_0010;
pub const FLAG_LESS: u8 = 0b0000_0100;

/// `tracing` target used for the per-instruction trace line
pub const TRACE_TARGET: &str = "ls8::trace";
