/// # Opcodes
///
/// LS-8 opcodes are a single byte laid out as `AABCDDDD`:
/// - `AA` the number of operand bytes that follow the opcode (0, 1 or 2)
/// - `B` set if the instruction is handled by the ALU
/// - `C` set if the instruction sets the PC itself
/// - `DDDD` identifies the instruction within its group
///
/// Operand bytes usually name a register (R0..R7); LDI's second operand is an immediate.
pub trait Opcode {
    /// Number of operand bytes following the opcode.
    /// `[AA______]`
    fn operands(&self) -> usize;

    /// Total bytes occupied by the instruction, opcode included.
    fn width(&self) -> usize;

    /// Whether the ALU executes this instruction.
    /// `[__B_____]`
    fn is_alu(&self) -> bool;

    /// Whether the instruction may move the PC.
    /// `[___C____]`
    fn sets_pc(&self) -> bool;
}

impl Opcode for u8 {
    fn operands(&self) -> usize {
        (self >> 6) as usize
    }

    fn width(&self) -> usize {
        self.operands() + 1
    }

    fn is_alu(&self) -> bool {
        self & 0b0010_0000 != 0
    }

    fn sets_pc(&self) -> bool {
        self & 0b0001_0000 != 0
    }
}
