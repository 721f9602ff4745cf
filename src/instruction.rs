use std::io::Write;

use crate::alu::Alu;
use crate::constants::{FLAG_EQUAL, FLAG_GREATER, FLAG_LESS};
use crate::error::MachineError;
use crate::opcode::Opcode;
use crate::operations::*;
use crate::state::State;

pub const NOP: u8 = 0b0000_0000;
pub const HLT: u8 = 0b0000_0001;
pub const RET: u8 = 0b0001_0001;
pub const IRET: u8 = 0b0001_0011;
pub const PUSH: u8 = 0b0100_0101;
pub const POP: u8 = 0b0100_0110;
pub const PRN: u8 = 0b0100_0111;
pub const PRA: u8 = 0b0100_1000;
pub const CALL: u8 = 0b0101_0000;
pub const INT: u8 = 0b0101_0010;
pub const JMP: u8 = 0b0101_0100;
pub const JEQ: u8 = 0b0101_0101;
pub const JNE: u8 = 0b0101_0110;
pub const JGT: u8 = 0b0101_0111;
pub const JLT: u8 = 0b0101_1000;
pub const JLE: u8 = 0b0101_1001;
pub const JGE: u8 = 0b0101_1010;
pub const INC: u8 = 0b0110_0101;
pub const DEC: u8 = 0b0110_0110;
pub const NOT: u8 = 0b0110_1001;
pub const LDI: u8 = 0b1000_0010;
pub const LD: u8 = 0b1000_0011;
pub const ST: u8 = 0b1000_0100;
pub const ADD: u8 = 0b1010_0000;
pub const SUB: u8 = 0b1010_0001;
pub const MUL: u8 = 0b1010_0010;
pub const DIV: u8 = 0b1010_0011;
pub const MOD: u8 = 0b1010_0100;
pub const CMP: u8 = 0b1010_0111;
pub const AND: u8 = 0b1010_1000;
pub const OR: u8 = 0b1010_1010;
pub const XOR: u8 = 0b1010_1011;
pub const SHL: u8 = 0b1010_1100;
pub const SHR: u8 = 0b1010_1101;

/// A decoded instruction with its operand bytes.
///
/// Operands are register indices except for LDI's immediate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    Hlt,
    Ldi(u8, u8),
    Ld(u8, u8),
    St(u8, u8),
    Prn(u8),
    Pra(u8),
    Push(u8),
    Pop(u8),
    Call(u8),
    Ret,
    Int(u8),
    Iret,
    Jmp(u8),
    Jeq(u8),
    Jne(u8),
    Jgt(u8),
    Jlt(u8),
    Jle(u8),
    Jge(u8),
    Alu(Alu),
}

/// Selects the Instruction for an opcode and the two bytes that follow it.
///
/// Operand bytes the opcode doesn't use are ignored. Returns `None` for bytes outside
/// the instruction set.
pub fn from_op(op: u8, a: u8, b: u8) -> Option<Instruction> {
    if op.is_alu() {
        return alu_op(op, a, b).map(Instruction::Alu);
    }

    let instruction = match (op.sets_pc(), op) {
        (true, RET) => Instruction::Ret,
        (true, IRET) => Instruction::Iret,
        (true, CALL) => Instruction::Call(a),
        (true, INT) => Instruction::Int(a),
        (true, JMP) => Instruction::Jmp(a),
        (true, JEQ) => Instruction::Jeq(a),
        (true, JNE) => Instruction::Jne(a),
        (true, JGT) => Instruction::Jgt(a),
        (true, JLT) => Instruction::Jlt(a),
        (true, JLE) => Instruction::Jle(a),
        (true, JGE) => Instruction::Jge(a),
        (false, NOP) => Instruction::Nop,
        (false, HLT) => Instruction::Hlt,
        (false, PUSH) => Instruction::Push(a),
        (false, POP) => Instruction::Pop(a),
        (false, PRN) => Instruction::Prn(a),
        (false, PRA) => Instruction::Pra(a),
        (false, LDI) => Instruction::Ldi(a, b),
        (false, LD) => Instruction::Ld(a, b),
        (false, ST) => Instruction::St(a, b),
        _ => return None,
    };
    Some(instruction)
}

/// Whether `op` is part of the instruction set, checked before its operands are read
pub fn is_defined(op: u8) -> bool {
    from_op(op, 0, 0).is_some()
}

fn alu_op(op: u8, a: u8, b: u8) -> Option<Alu> {
    let alu = match op {
        ADD => Alu::Add(a, b),
        SUB => Alu::Sub(a, b),
        MUL => Alu::Mul(a, b),
        DIV => Alu::Div(a, b),
        MOD => Alu::Mod(a, b),
        INC => Alu::Inc(a),
        DEC => Alu::Dec(a),
        CMP => Alu::Cmp(a, b),
        AND => Alu::And(a, b),
        OR => Alu::Or(a, b),
        XOR => Alu::Xor(a, b),
        NOT => Alu::Not(a),
        SHL => Alu::Shl(a, b),
        SHR => Alu::Shr(a, b),
        _ => return None,
    };
    Some(alu)
}

impl Instruction {
    /// Executes the instruction against `state`, writing PRN/PRA output to `out`.
    ///
    /// # Arguments
    /// * `next` the address directly after this instruction, pushed by CALL
    pub(crate) fn execute(
        self,
        state: &mut State,
        out: &mut dyn Write,
        next: usize,
    ) -> Result<Flow, MachineError> {
        match self {
            Instruction::Nop => nop(state),
            Instruction::Hlt => hlt(state),
            Instruction::Ldi(a, kk) => ldi(state, a, kk),
            Instruction::Ld(a, b) => ld(state, a, b),
            Instruction::St(a, b) => st(state, a, b),
            Instruction::Prn(a) => prn(state, out, a),
            Instruction::Pra(a) => pra(state, out, a),
            Instruction::Push(a) => push(state, a),
            Instruction::Pop(a) => pop(state, a),
            Instruction::Call(a) => call(state, a, next),
            Instruction::Ret => ret(state),
            Instruction::Int(a) => int(state, a),
            Instruction::Iret => iret(state),
            Instruction::Jmp(a) => jmp(state, a),
            Instruction::Jeq(a) => jump_if(state, a, FLAG_EQUAL),
            Instruction::Jne(a) => jne(state, a),
            Instruction::Jgt(a) => jump_if(state, a, FLAG_GREATER),
            Instruction::Jlt(a) => jump_if(state, a, FLAG_LESS),
            Instruction::Jle(a) => jump_if(state, a, FLAG_LESS | FLAG_EQUAL),
            Instruction::Jge(a) => jump_if(state, a, FLAG_GREATER | FLAG_EQUAL),
            Instruction::Alu(op) => alu(state, op),
        }
    }
}

#[cfg(test)]
mod test_instruction {
    use super::*;
    use crate::constants::{SP, STACK_TOP};

    fn run(op: u8, a: u8, b: u8, state: &mut State) -> Flow {
        let next = state.pc + op.width();
        from_op(op, a, b)
            .unwrap()
            .execute(state, &mut std::io::sink(), next)
            .unwrap()
    }

    fn printed(op: u8, a: u8, state: &mut State) -> String {
        let mut out = Vec::new();
        from_op(op, a, 0)
            .unwrap()
            .execute(state, &mut out, 0)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_decodes_every_encoding() {
        let defined = [
            NOP, HLT, RET, IRET, PUSH, POP, PRN, PRA, CALL, INT, JMP, JEQ, JNE, JGT, JLT, JLE,
            JGE, INC, DEC, NOT, LDI, LD, ST, ADD, SUB, MUL, DIV, MOD, CMP, AND, OR, XOR, SHL, SHR,
        ];
        for op in 0..=u8::MAX {
            assert_eq!(
                from_op(op, 0, 0).is_some(),
                defined.contains(&op),
                "opcode {:#010b}",
                op
            );
        }
    }

    #[test]
    fn test_is_defined() {
        assert!(is_defined(HLT));
        assert!(is_defined(SHR));
        assert!(!is_defined(0b1111_1111));
        assert!(!is_defined(0b0000_0010));
    }

    #[test]
    fn test_decodes_operands() {
        assert_eq!(from_op(LDI, 0x2, 0x9), Some(Instruction::Ldi(0x2, 0x9)));
        assert_eq!(from_op(ADD, 0x0, 0x1), Some(Instruction::Alu(Alu::Add(0x0, 0x1))));
        assert_eq!(from_op(NOT, 0x3, 0x7), Some(Instruction::Alu(Alu::Not(0x3))));
        assert_eq!(from_op(PRN, 0x4, 0xFF), Some(Instruction::Prn(0x4)));
    }

    #[test]
    fn test_nop() {
        let mut state = State::new();
        assert_eq!(run(NOP, 0, 0, &mut state), Flow::Next);
        assert_eq!(state, State::new());
    }

    #[test]
    fn test_hlt() {
        let mut state = State::new();
        assert_eq!(run(HLT, 0, 0, &mut state), Flow::Halt);
    }

    #[test]
    fn test_ldi() {
        let mut state = State::new();
        assert_eq!(run(LDI, 0x2, 0x22, &mut state), Flow::Next);
        assert_eq!(state.reg[0x2], 0x22);
    }

    #[test]
    fn test_ld() {
        let mut state = State::new();
        state.memory.write(0x99, 0x40).unwrap();
        state.reg[0x1] = 0x40;
        run(LD, 0x0, 0x1, &mut state);
        assert_eq!(state.reg[0x0], 0x99);
    }

    #[test]
    fn test_st() {
        let mut state = State::new();
        state.reg[0x0] = 0x40;
        state.reg[0x1] = 0x99;
        run(ST, 0x0, 0x1, &mut state);
        assert_eq!(state.memory.read(0x40).unwrap(), 0x99);
    }

    #[test]
    fn test_prn() {
        let mut state = State::new();
        state.reg[0x0] = 17;
        assert_eq!(printed(PRN, 0x0, &mut state), "17\n");
    }

    #[test]
    fn test_pra() {
        let mut state = State::new();
        state.reg[0x3] = b'A';
        assert_eq!(printed(PRA, 0x3, &mut state), "A\n");
    }

    #[test]
    fn test_push() {
        let mut state = State::new();
        state.reg[0x0] = 0x42;
        run(PUSH, 0x0, 0, &mut state);
        assert_eq!(state.sp(), STACK_TOP - 1);
        assert_eq!(state.memory.read(usize::from(STACK_TOP - 1)).unwrap(), 0x42);
    }

    #[test]
    fn test_push_then_pop_restores() {
        let mut state = State::new();
        state.reg[0x0] = 0x42;
        run(PUSH, 0x0, 0, &mut state);
        state.reg[0x0] = 0x0;
        run(POP, 0x0, 0, &mut state);
        assert_eq!(state.reg[0x0], 0x42);
        assert_eq!(state.sp(), STACK_TOP);
    }

    #[test]
    fn test_pop_into_other_register() {
        let mut state = State::new();
        state.reg[0x0] = 0x42;
        run(PUSH, 0x0, 0, &mut state);
        run(POP, 0x5, 0, &mut state);
        assert_eq!(state.reg[0x5], 0x42);
    }

    #[test]
    fn test_push_sp_stores_decremented_sp() {
        let mut state = State::new();
        run(PUSH, SP, 0, &mut state);
        assert_eq!(
            state.memory.read(usize::from(STACK_TOP - 1)).unwrap(),
            STACK_TOP - 1
        );
    }

    #[test]
    fn test_push_missing_register_keeps_sp() {
        let mut state = State::new();
        let result = from_op(PUSH, 0x8, 0)
            .unwrap()
            .execute(&mut state, &mut std::io::sink(), 0);
        assert!(matches!(
            result,
            Err(MachineError::RegisterOutOfRange { register: 8 })
        ));
        assert_eq!(state.sp(), STACK_TOP);
    }

    #[test]
    fn test_call() {
        let mut state = State::new();
        state.pc = 0x10;
        state.reg[0x1] = 0x30;
        assert_eq!(run(CALL, 0x1, 0, &mut state), Flow::Jump(0x30));
        assert_eq!(state.sp(), STACK_TOP - 1);
        // return address is just past the 2-byte CALL
        assert_eq!(state.memory.read(usize::from(STACK_TOP - 1)).unwrap(), 0x12);
    }

    #[test]
    fn test_ret() {
        let mut state = State::new();
        state.reg[SP as usize] = STACK_TOP - 1;
        state.memory.write(0x12, usize::from(STACK_TOP - 1)).unwrap();
        assert_eq!(run(RET, 0, 0, &mut state), Flow::Jump(0x12));
        assert_eq!(state.sp(), STACK_TOP);
    }

    #[test]
    fn test_call_rejects_return_past_memory() {
        let mut state = State::new();
        state.pc = 0xFF;
        let result = from_op(CALL, 0x0, 0)
            .unwrap()
            .execute(&mut state, &mut std::io::sink(), 0x101);
        assert!(matches!(
            result,
            Err(MachineError::AddressOutOfRange { address: 0x101 })
        ));
        assert_eq!(state.sp(), STACK_TOP);
    }

    #[test]
    fn test_jmp() {
        let mut state = State::new();
        state.reg[0x2] = 0xAB;
        assert_eq!(run(JMP, 0x2, 0, &mut state), Flow::Jump(0xAB));
    }

    #[test]
    fn test_jeq_jne_follow_equal_flag() {
        let mut state = State::new();
        state.reg[0x2] = 0x20;
        state.fl = FLAG_EQUAL;
        assert_eq!(run(JEQ, 0x2, 0, &mut state), Flow::Jump(0x20));
        assert_eq!(run(JNE, 0x2, 0, &mut state), Flow::Next);

        state.fl = FLAG_LESS;
        assert_eq!(run(JEQ, 0x2, 0, &mut state), Flow::Next);
        assert_eq!(run(JNE, 0x2, 0, &mut state), Flow::Jump(0x20));
    }

    #[test]
    fn test_jne_before_any_cmp() {
        let mut state = State::new();
        state.reg[0x2] = 0x20;
        assert_eq!(run(JNE, 0x2, 0, &mut state), Flow::Jump(0x20));
    }

    #[test]
    fn test_relational_jumps() {
        let mut state = State::new();
        state.reg[0x2] = 0x20;
        let cases = [
            (FLAG_GREATER, [true, false, false, true]),
            (FLAG_LESS, [false, true, true, false]),
            (FLAG_EQUAL, [false, false, true, true]),
        ];
        for &(fl, taken) in cases.iter() {
            state.fl = fl;
            for (&op, &taken) in [JGT, JLT, JLE, JGE].iter().zip(taken.iter()) {
                let expected = if taken { Flow::Jump(0x20) } else { Flow::Next };
                assert_eq!(run(op, 0x2, 0, &mut state), expected, "{:#010b}", op);
            }
        }
    }

    #[test]
    fn test_int_and_iret_are_advisory() {
        let mut state = State::new();
        assert_eq!(run(INT, 0x0, 0, &mut state), Flow::Next);
        assert_eq!(run(IRET, 0, 0, &mut state), Flow::Next);
        assert_eq!(state, State::new());
    }

    #[test]
    fn test_mod_by_zero_halts() {
        let mut state = State::new();
        state.reg[0x0] = 6;
        assert_eq!(run(MOD, 0x0, 0x1, &mut state), Flow::Halt);
        assert_eq!(state.reg[0x0], 6);
    }

    #[test]
    fn test_inc_dec() {
        let mut state = State::new();
        run(INC, 0x0, 0, &mut state);
        run(INC, 0x0, 0, &mut state);
        run(DEC, 0x1, 0, &mut state);
        assert_eq!(state.reg[0x0], 2);
        assert_eq!(state.reg[0x1], 0xFF);
    }
}
