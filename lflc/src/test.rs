//! End-to-end pipeline tests against spec §8's scenarios, executed through
//! `lfc::interp::Vm` the way `vasm/src/test.rs` runs assembled programs
//! through `vcpu::processor::Core`.

use lfc::interp::{ExitState, Vm};

use crate::{compile, listing};

fn run(source: &str) -> Vm<'static> {
    let program = compile(source).expect("compiles");
    let program: &'static [lfc::Instruction] = Box::leak(program.into_boxed_slice());
    let mut vm = Vm::new(program);
    assert!(matches!(vm.run(), ExitState::Halted));
    vm
}

#[test]
fn smallest_program_matches_expected_listing() {
    let program = compile("void main() { signal_1 = 42; }").unwrap();
    let text = listing::render(&program);
    assert_eq!(
        text,
        "1  JSR 3\n2  JUMP 0\n3  CNST 42\n4  SAVE -1\n5  RET\n"
    );
}

#[test]
fn arithmetic_precedence_multiplication_binds_tighter() {
    let vm = run("void main() { signal_1 = 2 + 3 * 4; }");
    assert_eq!(vm.gpio_write(1), 14);
}

#[test]
fn if_else_without_parens() {
    let source = "void main() { if signal_1 == 0 { signal_1 = 1; } else { signal_1 = 2; } }";
    let program = compile(source).unwrap();

    let mut vm = Vm::new(&program);
    vm.set_gpio_read(1, 0);
    assert!(matches!(vm.run(), ExitState::Halted));
    assert_eq!(vm.gpio_write(1), 1);

    let mut vm = Vm::new(&program);
    vm.set_gpio_read(1, 7);
    assert!(matches!(vm.run(), ExitState::Halted));
    assert_eq!(vm.gpio_write(1), 2);
}

#[test]
fn while_with_break() {
    let source = "void main() { i = 0; while i < 10 { if i == 5 { break; } i += 1; } signal_1 = i; }";
    let vm = run(source);
    assert_eq!(vm.gpio_write(1), 5);
}

#[test]
fn call_and_return_collapses_parameter_slots() {
    let source = "int add(a, b) { return a + b; } void main() { signal_1 = add(3, 4); }";
    let vm = run(source);
    assert_eq!(vm.gpio_write(1), 7);
}

#[test]
fn comparisons_bind_tighter_than_bitwise_and() {
    let source = "\
        void main() {
            i = 0;
            n = 3;
            factors = 0;
            while i < n & factors == 0 {
                i += 1;
            }
            signal_1 = i;
        }";
    let vm = run(source);
    assert_eq!(vm.gpio_write(1), 3);
}

#[test]
fn recursion_is_permitted() {
    let source = "\
        int fact(n) {
            if n <= 1 {
                return 1;
            }
            return n * fact(n - 1);
        }
        void main() { signal_1 = fact(5); }";
    let vm = run(source);
    assert_eq!(vm.gpio_write(1), 120);
}

#[test]
fn missing_main_is_a_link_error() {
    let err = compile("void helper() {}").unwrap_err();
    assert!(matches!(err, crate::Error::Link(crate::error::LinkError::MissingMain)));
}

#[test]
fn undefined_variable_is_a_name_error() {
    let err = compile("void main() { signal_1 = x; }").unwrap_err();
    assert!(matches!(err, crate::Error::Name(_)));
}

#[test]
fn every_jump_target_lies_within_rom_bounds_except_the_terminator() {
    let source = "\
        void main() {
            i = 0;
            while i < 3 {
                i += 1;
            }
            signal_1 = i;
        }";
    let program = compile(source).unwrap();
    let n = program.len() as i32;
    for (idx, instruction) in program.iter().enumerate() {
        use lfc::Opcode::*;
        if matches!(instruction.opcode, JUMP | JMPIF | JMPNIF | JSR) {
            let target = instruction.operand;
            let is_terminator = idx == 1 && target == 0;
            assert!(
                is_terminator || (target >= 1 && target <= n),
                "jump at {} targets out-of-range address {}",
                idx,
                target
            );
        }
    }
}

#[test]
fn assembling_is_idempotent() {
    let source = "void main() { signal_1 = 1; }";
    assert_eq!(compile(source).unwrap(), compile(source).unwrap());
}
