use crate::error::Location;
use crate::token::{AssignOp, BinOp, UnaryOp};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    pub functions: Vec<Function>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub name_location: Location,
    pub params: Vec<String>,
    pub returns_value: bool,
    pub body: Block,
}

pub type Block = Vec<Statement>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    Assign {
        name: String,
        name_location: Location,
        expr: Expr,
    },
    CompoundAssign {
        name: String,
        name_location: Location,
        op: AssignOp,
        expr: Expr,
    },
    ExprStmt {
        call: Expr,
    },
    If {
        branches: Vec<(Expr, Block)>,
        else_block: Option<Block>,
    },
    While {
        cond: Expr,
        body: Block,
    },
    Return {
        expr: Option<Expr>,
        location: Location,
    },
    Break {
        location: Location,
    },
    Continue {
        location: Location,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    IntLit {
        value: i32,
        location: Location,
    },
    Var {
        name: String,
        location: Location,
    },
    Call {
        name: String,
        name_location: Location,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        location: Location,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn location(&self) -> Location {
        match self {
            Expr::IntLit { location, .. } => *location,
            Expr::Var { location, .. } => *location,
            Expr::Call { name_location, .. } => *name_location,
            Expr::Unary { location, .. } => *location,
            Expr::Binary { lhs, .. } => lhs.location(),
        }
    }
}
