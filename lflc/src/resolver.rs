use std::collections::HashMap;

use crate::ast;
use crate::error::{NameError, Result, SemError, SemErrorKind};
use crate::token::{AssignOp, BinOp, UnaryOp};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Local(usize),
    GpioWrite(u8),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedExpr {
    IntLit(i32),
    Local(usize),
    GpioRead(u8),
    Call {
        label: String,
        args: Vec<ResolvedExpr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<ResolvedExpr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<ResolvedExpr>,
        rhs: Box<ResolvedExpr>,
    },
}

pub type ResolvedBlock = Vec<ResolvedStatement>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedStatement {
    Assign {
        target: Target,
        expr: ResolvedExpr,
    },
    CompoundAssign {
        slot: usize,
        op: AssignOp,
        expr: ResolvedExpr,
    },
    ExprStmt {
        call: ResolvedExpr,
    },
    If {
        branches: Vec<(ResolvedExpr, ResolvedBlock)>,
        else_block: Option<ResolvedBlock>,
    },
    While {
        cond: ResolvedExpr,
        body: ResolvedBlock,
    },
    Return {
        expr: Option<ResolvedExpr>,
    },
    Break,
    Continue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedFunction {
    pub name: String,
    pub param_count: usize,
    pub local_count: usize,
    pub returns_value: bool,
    pub body: ResolvedBlock,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedProgram {
    pub functions: Vec<ResolvedFunction>,
}

#[derive(Clone, Copy, Debug)]
struct Signature {
    arity: usize,
    returns_value: bool,
}

/// `signal_1`..`signal_5` are the only GPIO names the language exposes
/// (spec §6 "GPIO mapping"); anything else is a local or parameter.
fn gpio_signal_number(name: &str) -> Option<u8> {
    let suffix = name.strip_prefix("signal_")?;
    let k: u8 = suffix.parse().ok()?;
    if (1..=lfc::constants::GPIO_SIGNAL_COUNT).contains(&k) {
        Some(k)
    } else {
        None
    }
}

struct FunctionResolver<'g> {
    globals: &'g HashMap<String, Signature>,
    locals: HashMap<String, usize>,
    next_slot: usize,
    loop_depth: u32,
    returns_value: bool,
}

impl<'g> FunctionResolver<'g> {
    fn resolve_expr(&mut self, expr: &ast::Expr) -> Result<ResolvedExpr> {
        match expr {
            ast::Expr::IntLit { value, .. } => Ok(ResolvedExpr::IntLit(*value)),
            ast::Expr::Var { name, location } => {
                if let Some(k) = gpio_signal_number(name) {
                    Ok(ResolvedExpr::GpioRead(k))
                } else if let Some(&slot) = self.locals.get(name) {
                    Ok(ResolvedExpr::Local(slot))
                } else {
                    Err(NameError {
                        location: *location,
                        name: name.clone(),
                    }
                    .into())
                }
            }
            ast::Expr::Call {
                name,
                name_location,
                args,
            } => {
                let resolved = self.resolve_call(name, *name_location, args)?;
                let sig = self.globals[name];
                if !sig.returns_value {
                    return Err(SemError {
                        location: *name_location,
                        kind: SemErrorKind::VoidCallAsExpr,
                    }
                    .into());
                }
                Ok(resolved)
            }
            ast::Expr::Unary {
                op,
                operand,
                location: _,
            } => {
                let operand = self.resolve_expr(operand)?;
                Ok(ResolvedExpr::Unary {
                    op: *op,
                    operand: Box::new(operand),
                })
            }
            ast::Expr::Binary { op, lhs, rhs } => {
                let lhs = self.resolve_expr(lhs)?;
                let rhs = self.resolve_expr(rhs)?;
                Ok(ResolvedExpr::Binary {
                    op: *op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                })
            }
        }
    }

    fn resolve_call(
        &mut self,
        name: &str,
        name_location: crate::error::Location,
        args: &[ast::Expr],
    ) -> Result<ResolvedExpr> {
        let sig = *self.globals.get(name).ok_or_else(|| NameError {
            location: name_location,
            name: name.to_string(),
        })?;
        if args.len() != sig.arity {
            return Err(SemError {
                location: name_location,
                kind: SemErrorKind::ArityMismatch {
                    expected: sig.arity,
                    found: args.len(),
                },
            }
            .into());
        }
        let mut resolved_args = Vec::with_capacity(args.len());
        for arg in args {
            resolved_args.push(self.resolve_expr(arg)?);
        }
        Ok(ResolvedExpr::Call {
            label: name.to_string(),
            args: resolved_args,
        })
    }

    fn resolve_void_call_statement(&mut self, expr: &ast::Expr) -> Result<ResolvedExpr> {
        match expr {
            ast::Expr::Call {
                name,
                name_location,
                args,
            } => {
                let resolved = self.resolve_call(name, *name_location, args)?;
                let sig = self.globals[name];
                if sig.returns_value {
                    return Err(SemError {
                        location: *name_location,
                        kind: SemErrorKind::ValueCallAsStatement,
                    }
                    .into());
                }
                Ok(resolved)
            }
            _ => unreachable!("the parser only builds ExprStmt around a Call"),
        }
    }

    fn assign_target(&mut self, name: &str) -> Target {
        if let Some(k) = gpio_signal_number(name) {
            return Target::GpioWrite(k);
        }
        if let Some(&slot) = self.locals.get(name) {
            return Target::Local(slot);
        }
        let slot = self.next_slot;
        self.next_slot += 1;
        self.locals.insert(name.to_string(), slot);
        Target::Local(slot)
    }

    fn resolve_compound_target(
        &mut self,
        name: &str,
        name_location: crate::error::Location,
    ) -> Result<usize> {
        if gpio_signal_number(name).is_some() {
            return Err(SemError {
                location: name_location,
                kind: SemErrorKind::GpioCompoundAssignWriteOnly(name.to_string()),
            }
            .into());
        }
        self.locals.get(name).copied().ok_or_else(|| {
            NameError {
                location: name_location,
                name: name.to_string(),
            }
            .into()
        })
    }

    fn resolve_block(&mut self, block: &ast::Block) -> Result<ResolvedBlock> {
        block.iter().map(|s| self.resolve_statement(s)).collect()
    }

    fn resolve_statement(&mut self, stmt: &ast::Statement) -> Result<ResolvedStatement> {
        match stmt {
            ast::Statement::Assign { name, expr, .. } => {
                let expr = self.resolve_expr(expr)?;
                let target = self.assign_target(name);
                Ok(ResolvedStatement::Assign { target, expr })
            }
            ast::Statement::CompoundAssign {
                name,
                name_location,
                op,
                expr,
            } => {
                let expr = self.resolve_expr(expr)?;
                let slot = self.resolve_compound_target(name, *name_location)?;
                Ok(ResolvedStatement::CompoundAssign {
                    slot,
                    op: *op,
                    expr,
                })
            }
            ast::Statement::ExprStmt { call } => {
                let call = self.resolve_void_call_statement(call)?;
                Ok(ResolvedStatement::ExprStmt { call })
            }
            ast::Statement::If {
                branches,
                else_block,
            } => {
                let branches = branches
                    .iter()
                    .map(|(cond, body)| {
                        let cond = self.resolve_expr(cond)?;
                        let body = self.resolve_block(body)?;
                        Ok((cond, body))
                    })
                    .collect::<Result<Vec<_>>>()?;
                let else_block = else_block.as_ref().map(|b| self.resolve_block(b)).transpose()?;
                Ok(ResolvedStatement::If {
                    branches,
                    else_block,
                })
            }
            ast::Statement::While { cond, body } => {
                let cond = self.resolve_expr(cond)?;
                self.loop_depth += 1;
                let body = self.resolve_block(body);
                self.loop_depth -= 1;
                Ok(ResolvedStatement::While { cond, body: body? })
            }
            ast::Statement::Return { expr, location } => {
                let resolved = expr.as_ref().map(|e| self.resolve_expr(e)).transpose()?;
                match (self.returns_value, &resolved) {
                    (true, Some(_)) | (false, None) => {}
                    _ => {
                        return Err(SemError {
                            location: *location,
                            kind: SemErrorKind::ReturnKindMismatch,
                        }
                        .into())
                    }
                }
                Ok(ResolvedStatement::Return { expr: resolved })
            }
            ast::Statement::Break { location } => {
                if self.loop_depth == 0 {
                    return Err(SemError {
                        location: *location,
                        kind: SemErrorKind::BreakOutsideLoop,
                    }
                    .into());
                }
                Ok(ResolvedStatement::Break)
            }
            ast::Statement::Continue { location } => {
                if self.loop_depth == 0 {
                    return Err(SemError {
                        location: *location,
                        kind: SemErrorKind::ContinueOutsideLoop,
                    }
                    .into());
                }
                Ok(ResolvedStatement::Continue)
            }
        }
    }
}

fn is_terminal_return(stmt: &ResolvedStatement) -> bool {
    matches!(stmt, ResolvedStatement::Return { expr: Some(_) })
}

pub fn resolve(program: &ast::Program) -> Result<ResolvedProgram> {
    let mut globals = HashMap::new();
    for function in &program.functions {
        let sig = Signature {
            arity: function.params.len(),
            returns_value: function.returns_value,
        };
        if globals.insert(function.name.clone(), sig).is_some() {
            return Err(SemError {
                location: function.name_location,
                kind: SemErrorKind::DuplicateFunction(function.name.clone()),
            }
            .into());
        }
    }

    let mut functions = Vec::with_capacity(program.functions.len());
    for function in &program.functions {
        let mut locals = HashMap::new();
        for (i, param) in function.params.iter().enumerate() {
            locals.insert(param.clone(), i);
        }
        let mut resolver = FunctionResolver {
            globals: &globals,
            next_slot: function.params.len(),
            locals,
            loop_depth: 0,
            returns_value: function.returns_value,
        };
        let body = resolver.resolve_block(&function.body)?;

        if function.returns_value {
            let ok = body.last().map(is_terminal_return).unwrap_or(false);
            if !ok {
                return Err(SemError {
                    location: function.name_location,
                    kind: SemErrorKind::MissingTerminalReturn,
                }
                .into());
            }
        }

        functions.push(ResolvedFunction {
            name: function.name.clone(),
            param_count: function.params.len(),
            local_count: resolver.next_slot,
            returns_value: function.returns_value,
            body,
        });
    }

    Ok(ResolvedProgram { functions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn resolve_src(src: &str) -> Result<ResolvedProgram> {
        resolve(&parse(src).unwrap())
    }

    #[test]
    fn allocates_slots_in_first_assignment_order() {
        let prog = resolve_src("void main() { a = 1; b = 2; a = a + b; }").unwrap();
        assert_eq!(prog.functions[0].local_count, 2);
    }

    #[test]
    fn rejects_use_before_assignment() {
        let err = resolve_src("void main() { a = b; }").unwrap_err();
        assert!(matches!(err, crate::error::Error::Name(_)));
    }

    #[test]
    fn rejects_break_outside_loop() {
        let err = resolve_src("void main() { break; }").unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Sem(SemError {
                kind: SemErrorKind::BreakOutsideLoop,
                ..
            })
        ));
    }

    #[test]
    fn rejects_missing_terminal_return() {
        let err = resolve_src("int f() { a = 1; }").unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Sem(SemError {
                kind: SemErrorKind::MissingTerminalReturn,
                ..
            })
        ));
    }

    #[test]
    fn rejects_arity_mismatch() {
        let err = resolve_src("int f(a) { return a; } void main() { f(1, 2); }").unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Sem(SemError {
                kind: SemErrorKind::ArityMismatch { .. },
                ..
            })
        ));
    }

    #[test]
    fn rejects_value_call_used_as_statement() {
        let err = resolve_src("int f() { return 1; } void main() { f(); }").unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Sem(SemError {
                kind: SemErrorKind::ValueCallAsStatement,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_function_names_rejected() {
        let err = resolve_src("void f() {} void f() {}").unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Sem(SemError {
                kind: SemErrorKind::DuplicateFunction(_),
                ..
            })
        ));
    }
}
