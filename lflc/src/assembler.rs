use std::collections::HashMap;

use lfc::Instruction;

use crate::codegen::{Line, Operand};
use crate::error::{LinkError, Result};

/// Two-pass label resolution (spec §4.5). Pass 1 walks the generator's
/// output assigning each `Line::Label` the 1-based ROM index of the
/// instruction that follows it; pass 2 resolves every `Operand::Label` to
/// that index, dropping label markers from the final stream.
pub fn assemble(lines: &[Line]) -> Result<Vec<Instruction>> {
    let mut index: HashMap<&str, u32> = HashMap::new();
    let mut rom_index = lfc::constants::ROM_BASE_INDEX;
    for line in lines {
        match line {
            Line::Label(name) => {
                index.insert(name.as_str(), rom_index);
            }
            Line::Instruction(_) => rom_index += 1,
        }
    }

    let mut program = Vec::new();
    for line in lines {
        let emitted = match line {
            Line::Label(_) => continue,
            Line::Instruction(emitted) => emitted,
        };
        let operand = match &emitted.operand {
            Operand::None => 0,
            Operand::Immediate(v) => *v,
            Operand::Address(addr) => *addr,
            Operand::Label(name) => *index
                .get(name.as_str())
                .ok_or_else(|| LinkError::UndefinedLabel(name.clone()))?
                as i32,
        };
        program.push(Instruction::new(emitted.opcode, operand));
    }
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lfc::Opcode;

    #[test]
    fn resolves_forward_and_backward_labels() {
        let lines = vec![
            Line::Instruction(crate::codegen::Emitted {
                opcode: Opcode::JUMP,
                operand: Operand::Label("end".to_string()),
            }),
            Line::Label("head".to_string()),
            Line::Instruction(crate::codegen::Emitted {
                opcode: Opcode::JUMP,
                operand: Operand::Label("head".to_string()),
            }),
            Line::Label("end".to_string()),
            Line::Instruction(crate::codegen::Emitted {
                opcode: Opcode::RET,
                operand: Operand::None,
            }),
        ];
        let program = assemble(&lines).unwrap();
        assert_eq!(program.len(), 3);
        assert_eq!(program[0].operand, 3);
        assert_eq!(program[1].operand, 2);
    }

    #[test]
    fn undefined_label_is_a_link_error() {
        let lines = vec![Line::Instruction(crate::codegen::Emitted {
            opcode: Opcode::JUMP,
            operand: Operand::Label("nowhere".to_string()),
        })];
        let err = assemble(&lines).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Link(LinkError::UndefinedLabel(_))
        ));
    }

    #[test]
    fn assembling_twice_is_idempotent() {
        let lines = vec![
            Line::Instruction(crate::codegen::Emitted {
                opcode: Opcode::CNST,
                operand: Operand::Immediate(42),
            }),
            Line::Instruction(crate::codegen::Emitted {
                opcode: Opcode::RET,
                operand: Operand::None,
            }),
        ];
        assert_eq!(assemble(&lines).unwrap(), assemble(&lines).unwrap());
    }
}
