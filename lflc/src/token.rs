use crate::error::Location;

/// Reserved words (spec §4.1). Matched as identifiers, then reclassified.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Keyword {
    int,
    void,
    if_,
    else_,
    while_,
    return_,
    break_,
    continue_,
}

impl Keyword {
    /// `if`/`else`/`while`/`return`/`break`/`continue` are Rust keywords
    /// too, so the variants carry a trailing underscore and are matched
    /// against their bare source spelling here instead of deriving a
    /// generic string conversion.
    pub fn from_source(s: &str) -> Option<Keyword> {
        match s {
            "int" => Some(Keyword::int),
            "void" => Some(Keyword::void),
            "if" => Some(Keyword::if_),
            "else" => Some(Keyword::else_),
            "while" => Some(Keyword::while_),
            "return" => Some(Keyword::return_),
            "break" => Some(Keyword::break_),
            "continue" => Some(Keyword::continue_),
            _ => None,
        }
    }
}

/// Compound-assignment operators, spec §3 `CompoundAssign{name, op, expr}`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AssignOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Pow,
}

/// Binary operators, spec §4.2 precedence table.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinOp {
    Pow,
    Shl,
    Shr,
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Identifier(String),
    IntLit(String),
    Keyword(Keyword),

    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,

    Assign,
    CompoundAssign(AssignOp),

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Tilde,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    Ne,
    Shl,
    Shr,
    Amp,
    Pipe,

    Eof,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, location: Location) -> Self {
        Token { kind, location }
    }

    /// Human-readable description used in `ParseError::found`/`expected`.
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Identifier(name) => format!("identifier \"{}\"", name),
            TokenKind::IntLit(lit) => format!("integer literal \"{}\"", lit),
            TokenKind::Keyword(kw) => format!("keyword \"{}\"", keyword_text(*kw)),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("\"{}\"", punctuator_text(other)),
        }
    }
}

pub fn keyword_text(kw: Keyword) -> &'static str {
    match kw {
        Keyword::int => "int",
        Keyword::void => "void",
        Keyword::if_ => "if",
        Keyword::else_ => "else",
        Keyword::while_ => "while",
        Keyword::return_ => "return",
        Keyword::break_ => "break",
        Keyword::continue_ => "continue",
    }
}

fn punctuator_text(kind: &TokenKind) -> &'static str {
    use TokenKind::*;
    match kind {
        LParen => "(",
        RParen => ")",
        LBrace => "{",
        RBrace => "}",
        Comma => ",",
        Semicolon => ";",
        Assign => "=",
        CompoundAssign(AssignOp::Add) => "+=",
        CompoundAssign(AssignOp::Sub) => "-=",
        CompoundAssign(AssignOp::Mul) => "*=",
        CompoundAssign(AssignOp::Div) => "/=",
        CompoundAssign(AssignOp::And) => "&=",
        CompoundAssign(AssignOp::Or) => "|=",
        CompoundAssign(AssignOp::Pow) => "^=",
        Plus => "+",
        Minus => "-",
        Star => "*",
        Slash => "/",
        Percent => "%",
        Caret => "^",
        Tilde => "~",
        Lt => "<",
        Gt => ">",
        Le => "<=",
        Ge => ">=",
        EqEq => "==",
        Ne => "!=",
        Shl => "<<",
        Shr => ">>",
        Amp => "&",
        Pipe => "|",
        Identifier(_) | IntLit(_) | Keyword(_) | Eof => unreachable!(),
    }
}
