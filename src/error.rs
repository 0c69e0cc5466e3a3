use thiserror::Error;

/// A syntax error raised by the [lexer](crate::lexer) or
/// [parser](crate::parser), carrying the zero-based `char` offset of the
/// offending token when one is available.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub position: Option<usize>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, position: Option<usize>) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    pub fn at(message: impl Into<String>, position: usize) -> Self {
        Self::new(message, Some(position))
    }
}

/// A semantic error raised by the [compiler](crate::compiler) for problems
/// the parser's grammar cannot catch on its own, such as an inverted
/// `{m,n}` bound or a quantifier expansion exceeding the configured cap.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
    pub position: Option<usize>,
}

impl CompileError {
    pub fn new(message: impl Into<String>, position: Option<usize>) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    pub fn at(message: impl Into<String>, position: usize) -> Self {
        Self::new(message, Some(position))
    }
}

/// Top-level error type returned by every fallible operation in this crate.
///
/// Matching itself never fails once a pattern has compiled: `find_all`
/// returns a plain `Vec`, not a `Result`. The compiler's `build` methods do
/// return `Result`, since they accept a caller-constructed [`Expr`](crate::ast::Expr)
/// directly and cannot assume every grammar-level invariant the parser
/// would normally guarantee (e.g. a `Concat` node built by hand with fewer
/// than two parts). Such invariant violations are reported as
/// [`Error::Internal`] rather than panicking.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The source position of the error, if one is known.
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::Syntax(e) => e.position,
            Error::Compile(e) => e.position,
            Error::Internal(_) => None,
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
