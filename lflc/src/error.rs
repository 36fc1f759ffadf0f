use std::fmt;

/// A source position, 1-based in both fields (spec §3 "Token").
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LexError {
    pub location: Location,
    pub message: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParseError {
    pub location: Location,
    pub expected: String,
    pub found: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, found {}",
            self.location, self.expected, self.found
        )
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NameError {
    pub location: Location,
    pub name: String,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: undefined name \"{}\"", self.location, self.name)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SemErrorKind {
    ArityMismatch { expected: usize, found: usize },
    VoidCallAsExpr,
    ValueCallAsStatement,
    BreakOutsideLoop,
    ContinueOutsideLoop,
    ReturnKindMismatch,
    MissingTerminalReturn,
    DuplicateFunction(String),
    IntegerOutOfRange(String),
    GpioCompoundAssignWriteOnly(String),
}

impl fmt::Display for SemErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SemErrorKind::ArityMismatch { expected, found } => write!(
                f,
                "expected {} argument(s), found {}",
                expected, found
            ),
            SemErrorKind::VoidCallAsExpr => {
                write!(f, "void function call used as an expression")
            }
            SemErrorKind::ValueCallAsStatement => write!(
                f,
                "value-returning function call used as a statement"
            ),
            SemErrorKind::BreakOutsideLoop => write!(f, "`break` outside of a loop"),
            SemErrorKind::ContinueOutsideLoop => write!(f, "`continue` outside of a loop"),
            SemErrorKind::ReturnKindMismatch => write!(
                f,
                "`return` does not match the function's value/void kind"
            ),
            SemErrorKind::MissingTerminalReturn => write!(
                f,
                "value-returning function must end with a `return` statement"
            ),
            SemErrorKind::DuplicateFunction(name) => {
                write!(f, "duplicate function \"{}\"", name)
            }
            SemErrorKind::IntegerOutOfRange(lexeme) => {
                write!(f, "integer literal \"{}\" does not fit in i32", lexeme)
            }
            SemErrorKind::GpioCompoundAssignWriteOnly(name) => write!(
                f,
                "\"{}\" is a write-only GPIO signal and cannot be used in a compound assignment",
                name
            ),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SemError {
    pub location: Location,
    pub kind: SemErrorKind,
}

impl fmt::Display for SemError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.kind)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LinkError {
    MissingMain,
    UndefinedLabel(String),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LinkError::MissingMain => write!(f, "no \"main\" function defined"),
            LinkError::UndefinedLabel(label) => write!(f, "undefined label \"{}\"", label),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Error {
    Lex(LexError),
    Parse(ParseError),
    Name(NameError),
    Sem(SemError),
    Link(LinkError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Lex(err) => write!(f, "{}", err),
            Error::Parse(err) => write!(f, "{}", err),
            Error::Name(err) => write!(f, "{}", err),
            Error::Sem(err) => write!(f, "{}", err),
            Error::Link(err) => write!(f, "{}", err),
        }
    }
}

impl Error {
    /// The source location this error refers to, if any. `LinkError`
    /// variants are program-global and carry none.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Lex(err) => Some(err.location),
            Error::Parse(err) => Some(err.location),
            Error::Name(err) => Some(err.location),
            Error::Sem(err) => Some(err.location),
            Error::Link(_) => None,
        }
    }
}

impl std::error::Error for Error {}

impl From<LexError> for Error {
    fn from(err: LexError) -> Error {
        Error::Lex(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<NameError> for Error {
    fn from(err: NameError) -> Error {
        Error::Name(err)
    }
}

impl From<SemError> for Error {
    fn from(err: SemError) -> Error {
        Error::Sem(err)
    }
}

impl From<LinkError> for Error {
    fn from(err: LinkError) -> Error {
        Error::Link(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
