use std::error::Error;
use std::fmt;

/// Expression calculation result: either value or error
pub type CalcResult = Result<f64, CalcError>;
pub(crate) type CalcErrorResult = Result<(), CalcError>;

/// The two failure families a caller has to distinguish
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input or an argument outside a function domain
    Syntax,
    /// A value outside the range of `f64`
    Overflow,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CalcError {
    InvalidToken(String),
    MismatchedParenthesis,
    MisplacedSeparator,
    MismatchedOperands,
    NoOperands,
    TooManyOperands,
    AnsUndefined,
    FunctionNoArgs(String),
    FunctionArgCount(String, usize, usize),
    DomainError(String),
    DividedByZero(String),

    Overflow(String),
}

impl CalcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::Overflow(..) => ErrorKind::Overflow,
            _ => ErrorKind::Syntax,
        }
    }

    pub fn is_overflow(&self) -> bool {
        self.kind() == ErrorKind::Overflow
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            CalcError::InvalidToken(s) => write!(f, "Syntax Error: Invalid token(s) '{}'", s),
            CalcError::MismatchedParenthesis => write!(f, "Syntax Error: Mismatched parenthesis"),
            CalcError::MisplacedSeparator => write!(f, "Syntax Error: Mismatched or missing parenthesis"),
            CalcError::MismatchedOperands => write!(f, "Syntax Error: Mismatched operands"),
            CalcError::NoOperands => write!(f, "Syntax Error: No operands given"),
            CalcError::TooManyOperands => write!(f, "Syntax Error: Too many operands"),
            CalcError::AnsUndefined => write!(f, "Syntax Error: Ans never defined"),
            CalcError::FunctionNoArgs(s) => write!(f, "Syntax Error: Function '{}' requires an argument list", s),
            CalcError::FunctionArgCount(s, want, got) => {
                write!(f, "Syntax Error: Function '{}' takes {} argument(s), {} given", s, want, got)
            }
            CalcError::DomainError(s) => write!(f, "Domain Error: invalid argument for '{}'", s),
            CalcError::DividedByZero(s) => write!(f, "Syntax Error: '{}' divided by zero", s),

            CalcError::Overflow(s) => write!(f, "Overflow Error: Operand too large in '{}'", s),
        }
    }
}

impl Error for CalcError {}
