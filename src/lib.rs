//! `lfc` is the instruction-set contract for the LFC stack machine that the
//! `lflc` compiler targets: a 27-opcode ISA, a 32-entry signed 32-bit
//! stack, and memory-mapped GPIO at negative stack addresses (spec §1-2).
//!
//! This crate deliberately does not implement the machine itself beyond a
//! test-only reference interpreter ([`interp`]) — the physical computer is
//! an external collaborator (spec §1).

pub mod constants;
mod instruction;
mod opcode;

pub mod interp;

pub use instruction::Instruction;
pub use opcode::{Opcode, OperandKind};
