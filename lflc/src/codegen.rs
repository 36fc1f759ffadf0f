use lfc::Opcode;

use crate::error::{LinkError, Result};
use crate::resolver::{ResolvedBlock, ResolvedExpr, ResolvedFunction, ResolvedProgram, Target};
use crate::token::{AssignOp, BinOp, UnaryOp};

/// An instruction operand before label resolution (spec §4.4 "symbolic
/// labels"). `Address` carries an already-known literal (a GPIO address or
/// the terminator's `0`); `Label` is resolved by [`crate::assembler`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    None,
    Immediate(i32),
    Address(i32),
    Label(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Emitted {
    pub opcode: Opcode,
    pub operand: Operand,
}

/// One line of the generator's output: either a real instruction or a
/// label marker that occupies no ROM slot of its own (spec §4.4).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    Instruction(Emitted),
    Label(String),
}

fn instr(opcode: Opcode, operand: Operand) -> Line {
    Line::Instruction(Emitted { opcode, operand })
}

fn bare(opcode: Opcode) -> Line {
    instr(opcode, Operand::None)
}

/// Labels generated by the code generator are prefixed with `$`, a
/// character that can never occur in an LFL identifier, so they can never
/// collide with a user function name used as a `JSR`/`JUMP` target.
struct LabelGen {
    next: u32,
}

impl LabelGen {
    fn new() -> Self {
        LabelGen { next: 0 }
    }

    fn fresh(&mut self, tag: &str) -> String {
        let label = format!("${}{}", tag, self.next);
        self.next += 1;
        label
    }
}

fn binop_opcode(op: BinOp) -> Opcode {
    match op {
        BinOp::Pow => Opcode::POW,
        BinOp::Shl => Opcode::SHL,
        BinOp::Shr => Opcode::SHR,
        BinOp::Mul => Opcode::MUL,
        BinOp::Div => Opcode::DIV,
        BinOp::Rem => Opcode::REM,
        BinOp::Add => Opcode::ADD,
        BinOp::Sub => Opcode::SUB,
        BinOp::Eq => Opcode::EQ,
        BinOp::Ne => Opcode::NE,
        BinOp::Lt => Opcode::LT,
        BinOp::Le => Opcode::LTE,
        BinOp::Gt => Opcode::GT,
        BinOp::Ge => Opcode::GTE,
        BinOp::And => Opcode::AND,
        BinOp::Or => Opcode::OR,
    }
}

fn assign_op_to_binop(op: AssignOp) -> BinOp {
    match op {
        AssignOp::Add => BinOp::Add,
        AssignOp::Sub => BinOp::Sub,
        AssignOp::Mul => BinOp::Mul,
        AssignOp::Div => BinOp::Div,
        AssignOp::And => BinOp::And,
        AssignOp::Or => BinOp::Or,
        AssignOp::Pow => BinOp::Pow,
    }
}

struct FunctionCodegen<'a> {
    local_count: i32,
    labels: &'a mut LabelGen,
    loop_stack: Vec<(String, String)>,
    out: Vec<Line>,
}

impl<'a> FunctionCodegen<'a> {
    fn lower_expr(&mut self, expr: &ResolvedExpr, depth: i32) {
        match expr {
            ResolvedExpr::IntLit(v) => self.out.push(instr(Opcode::CNST, Operand::Immediate(*v))),
            ResolvedExpr::Local(slot) => {
                let addr = self.local_count - *slot as i32 + depth;
                self.out.push(instr(Opcode::LOAD, Operand::Address(addr)));
            }
            ResolvedExpr::GpioRead(k) => {
                let addr = lfc::constants::gpio_read_address(*k);
                self.out.push(instr(Opcode::LOAD, Operand::Address(addr)));
            }
            ResolvedExpr::Unary {
                op: UnaryOp::Not,
                operand,
            } => {
                self.lower_expr(operand, depth);
                self.out.push(bare(Opcode::NOT));
            }
            ResolvedExpr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => {
                self.out.push(instr(Opcode::CNST, Operand::Immediate(0)));
                self.lower_expr(operand, depth + 1);
                self.out.push(bare(Opcode::SUB));
            }
            ResolvedExpr::Binary { op, lhs, rhs } => {
                self.lower_expr(lhs, depth);
                self.lower_expr(rhs, depth + 1);
                self.out.push(bare(binop_opcode(*op)));
            }
            ResolvedExpr::Call { label, args } => self.lower_call(label, args, depth),
        }
    }

    fn lower_call(&mut self, label: &str, args: &[ResolvedExpr], depth: i32) {
        for (i, arg) in args.iter().enumerate() {
            self.lower_expr(arg, depth + i as i32);
        }
        self.out
            .push(instr(Opcode::JSR, Operand::Label(label.to_string())));
    }

    fn lower_return_epilogue(&mut self, expr: &Option<ResolvedExpr>) {
        match expr {
            Some(expr) => {
                self.lower_expr(expr, 0);
                // Value sits on top, above all L locals. Repeatedly fold
                // the local directly below it into the value's slot and
                // drop one stack entry, collapsing the locals out from
                // under the return value (spec §4.4 epilogue).
                for _ in 0..self.local_count {
                    self.out.push(instr(Opcode::SAVE, Operand::Address(2)));
                }
            }
            None => {
                for _ in 0..self.local_count {
                    self.out.push(bare(Opcode::POP));
                }
            }
        }
        self.out.push(bare(Opcode::RET));
    }

    fn lower_assign_target(&mut self, target: Target) {
        match target {
            Target::Local(slot) => {
                let addr = self.local_count - slot as i32 + 1;
                self.out.push(instr(Opcode::SAVE, Operand::Address(addr)));
            }
            Target::GpioWrite(k) => {
                let addr = lfc::constants::gpio_write_address(k);
                self.out.push(instr(Opcode::SAVE, Operand::Address(addr)));
            }
        }
    }

    fn lower_block(&mut self, block: &ResolvedBlock) {
        for stmt in block {
            self.lower_statement(stmt);
        }
    }

    fn lower_statement(&mut self, stmt: &crate::resolver::ResolvedStatement) {
        use crate::resolver::ResolvedStatement as S;
        match stmt {
            S::Assign { target, expr } => {
                self.lower_expr(expr, 0);
                self.lower_assign_target(*target);
            }
            S::CompoundAssign { slot, op, expr } => {
                let addr = self.local_count - *slot as i32;
                self.out.push(instr(Opcode::LOAD, Operand::Address(addr)));
                self.lower_expr(expr, 1);
                self.out.push(bare(binop_opcode(assign_op_to_binop(*op))));
                self.lower_assign_target(Target::Local(*slot));
            }
            S::ExprStmt { call } => {
                if let ResolvedExpr::Call { label, args } = call {
                    self.lower_call(label, args, 0);
                } else {
                    unreachable!("resolver only produces Call expressions for ExprStmt");
                }
            }
            S::If {
                branches,
                else_block,
            } => {
                let end_label = self.labels.fresh("if_end");
                for (cond, body) in branches {
                    let next_label = self.labels.fresh("if_next");
                    self.lower_expr(cond, 0);
                    self.out
                        .push(instr(Opcode::JMPNIF, Operand::Label(next_label.clone())));
                    self.lower_block(body);
                    self.out
                        .push(instr(Opcode::JUMP, Operand::Label(end_label.clone())));
                    self.out.push(Line::Label(next_label));
                }
                if let Some(else_block) = else_block {
                    self.lower_block(else_block);
                }
                self.out.push(Line::Label(end_label));
            }
            S::While { cond, body } => {
                let head_label = self.labels.fresh("while_head");
                let exit_label = self.labels.fresh("while_exit");
                self.out.push(Line::Label(head_label.clone()));
                self.lower_expr(cond, 0);
                self.out
                    .push(instr(Opcode::JMPNIF, Operand::Label(exit_label.clone())));
                self.loop_stack
                    .push((exit_label.clone(), head_label.clone()));
                self.lower_block(body);
                self.loop_stack.pop();
                self.out
                    .push(instr(Opcode::JUMP, Operand::Label(head_label)));
                self.out.push(Line::Label(exit_label));
            }
            S::Return { expr } => self.lower_return_epilogue(expr),
            S::Break => {
                let (exit_label, _) = self
                    .loop_stack
                    .last()
                    .expect("resolver rejects break outside a loop")
                    .clone();
                self.out.push(instr(Opcode::JUMP, Operand::Label(exit_label)));
            }
            S::Continue => {
                let (_, head_label) = self
                    .loop_stack
                    .last()
                    .expect("resolver rejects continue outside a loop")
                    .clone();
                self.out.push(instr(Opcode::JUMP, Operand::Label(head_label)));
            }
        }
    }
}

fn lower_function(function: &ResolvedFunction, labels: &mut LabelGen, out: &mut Vec<Line>) {
    out.push(Line::Label(function.name.clone()));
    for _ in function.param_count..function.local_count {
        out.push(instr(Opcode::CNST, Operand::Immediate(0)));
    }

    let mut gen = FunctionCodegen {
        local_count: function.local_count as i32,
        labels,
        loop_stack: Vec::new(),
        out: Vec::new(),
    };
    gen.lower_block(&function.body);
    let ends_in_return = matches!(
        function.body.last(),
        Some(crate::resolver::ResolvedStatement::Return { .. })
    );
    out.extend(gen.out);

    if !ends_in_return {
        // Void function falling off the end of its body (resolver only
        // requires a terminal `return` for value-returning functions).
        let mut unused_labels = LabelGen::new();
        let mut tail = FunctionCodegen {
            local_count: function.local_count as i32,
            labels: &mut unused_labels,
            loop_stack: Vec::new(),
            out: Vec::new(),
        };
        tail.lower_return_epilogue(&None);
        out.extend(tail.out);
    }
}

/// Lowers a resolved program into a linear, label-addressed instruction
/// stream (spec §4.4). ROM index 1 is reserved for the terminator: a call
/// to `main` followed by a jump to address 0, which halts the machine
/// because it lies outside `1..=N` (spec §4.4 "Halting").
pub fn generate(program: &ResolvedProgram) -> Result<Vec<Line>> {
    if !program.functions.iter().any(|f| f.name == "main") {
        return Err(LinkError::MissingMain.into());
    }

    let mut out = Vec::new();
    out.push(instr(Opcode::JSR, Operand::Label("main".to_string())));
    out.push(instr(Opcode::JUMP, Operand::Address(0)));

    let mut labels = LabelGen::new();
    for function in &program.functions {
        lower_function(function, &mut labels, &mut out);
    }

    Ok(out)
}
