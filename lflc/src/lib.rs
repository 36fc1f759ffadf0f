//! `lflc` is the compiler for LFL ("Laurie's Factorio Language"), a small
//! C-like imperative language targeting the `lfc` stack machine. The
//! pipeline is lexer → parser → resolver → code generator → assembler →
//! listing/blueprint (spec §2).

pub mod ast;
pub mod error;
pub mod token;

mod assembler;
mod codegen;
mod lexer;
pub mod listing;
mod parser;
mod resolver;

pub use error::{Error, Result};

/// Runs the full pipeline on `source` and returns the assembled
/// instruction list, ready for [`listing::render`] or `blueprint::encode`.
pub fn compile(source: &str) -> Result<Vec<lfc::Instruction>> {
    log::debug!("parsing");
    let program = parser::parse(source)?;
    log::debug!("resolving {} function(s)", program.functions.len());
    let resolved = resolver::resolve(&program)?;
    log::debug!("generating code");
    let lines = codegen::generate(&resolved)?;
    log::debug!("assembling {} line(s)", lines.len());
    let instructions = assembler::assemble(&lines)?;
    log::info!("compiled to {} instruction(s)", instructions.len());
    Ok(instructions)
}

#[cfg(test)]
mod test;
