use num_derive::{FromPrimitive, ToPrimitive};
use util::Mnemonic;
use util_derive::Mnemonic;

/// The operand an [`Opcode`] expects, per the ROM blueprint's signals table
/// (spec §4.6): either none, an immediate value (the `D` signal) or a ROM
/// address / relative stack address (the `A` signal).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperandKind {
    None,
    Immediate,
    Address,
}

/// The 27-opcode instruction set of the LFC stack machine.
///
/// Format per spec §6: `(opcode: 1..27, operand: i32)`, 1-based ROM index.
/// `LOAD`/`SAVE` operands are stack addresses relative to the top of stack
/// (negative addresses reach into memory-mapped GPIO, spec §6 "GPIO
/// mapping"); `JUMP`/`JMPIF`/`JMPNIF`/`JSR` operands are 1-based ROM
/// addresses; `CNST` takes a signed 32-bit immediate.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive, Mnemonic)]
pub enum Opcode {
    NOP,
    CNST,
    LOAD,
    SAVE,
    POP,
    ADD,
    SUB,
    MUL,
    DIV,
    REM,
    POW,
    SHL,
    SHR,
    AND,
    OR,
    NOT,
    EQ,
    NE,
    GT,
    LT,
    GTE,
    LTE,
    JUMP,
    JMPIF,
    JMPNIF,
    JSR,
    RET,
}

impl Opcode {
    pub fn operand_kind(self) -> OperandKind {
        use Opcode::*;
        match self {
            CNST => OperandKind::Immediate,
            LOAD | SAVE | JUMP | JMPIF | JMPNIF | JSR => OperandKind::Address,
            NOP | POP | ADD | SUB | MUL | DIV | REM | POW | SHL | SHR | AND | OR | NOT | EQ
            | NE | GT | LT | GTE | LTE | RET => OperandKind::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonic_round_trips_variant_names() {
        assert_eq!(Opcode::CNST.mnemonic(), "CNST");
        assert_eq!(Opcode::JMPNIF.mnemonic(), "JMPNIF");
        assert_eq!(Opcode::RET.mnemonic(), "RET");
    }

    #[test]
    fn opcode_count_is_27() {
        // NOP..=RET, in declaration order.
        let all = [
            Opcode::NOP,
            Opcode::CNST,
            Opcode::LOAD,
            Opcode::SAVE,
            Opcode::POP,
            Opcode::ADD,
            Opcode::SUB,
            Opcode::MUL,
            Opcode::DIV,
            Opcode::REM,
            Opcode::POW,
            Opcode::SHL,
            Opcode::SHR,
            Opcode::AND,
            Opcode::OR,
            Opcode::NOT,
            Opcode::EQ,
            Opcode::NE,
            Opcode::GT,
            Opcode::LT,
            Opcode::GTE,
            Opcode::LTE,
            Opcode::JUMP,
            Opcode::JMPIF,
            Opcode::JMPNIF,
            Opcode::JSR,
            Opcode::RET,
        ];
        assert_eq!(all.len(), 27);
    }
}
