use lfc::{Instruction, OperandKind};
use util::Mnemonic;

/// Renders the final instruction list as `NNNN  MNEMONIC [OPERAND]`, one
/// per line, 1-based ROM index (spec §6 "Assembly listing format").
pub fn render(program: &[Instruction]) -> String {
    let mut out = String::new();
    for (i, instruction) in program.iter().enumerate() {
        let rom_index = lfc::constants::ROM_BASE_INDEX + i as u32;
        match instruction.opcode.operand_kind() {
            OperandKind::None => {
                out.push_str(&format!("{}  {}\n", rom_index, instruction.opcode.mnemonic()));
            }
            OperandKind::Immediate | OperandKind::Address => {
                out.push_str(&format!(
                    "{}  {} {}\n",
                    rom_index,
                    instruction.opcode.mnemonic(),
                    instruction.operand
                ));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lfc::Opcode;

    #[test]
    fn renders_smallest_program() {
        let program = vec![
            Instruction::new(Opcode::JSR, 3),
            Instruction::new(Opcode::JUMP, 0),
            Instruction::new(Opcode::CNST, 42),
            Instruction::new(Opcode::SAVE, -1),
            Instruction::bare(Opcode::RET),
        ];
        let listing = render(&program);
        assert_eq!(
            listing,
            "1  JSR 3\n2  JUMP 0\n3  CNST 42\n4  SAVE -1\n5  RET\n"
        );
    }
}
