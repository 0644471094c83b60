use std::fmt;
use std::str;

use crate::symbols::{Constant, Function, Operator};

/// Lexical unit of an expression, both in infix and postfix form
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Token {
    Number(f64),
    Operator(Operator),
    Function(Function),
    Constant(Constant),
    LeftParen,
    RightParen,
    ArgSeparator,
}

impl Token {
    pub fn is_operator(&self) -> bool {
        matches!(self, Token::Operator(..))
    }

    pub(crate) fn is_op(&self, op: Operator) -> bool {
        *self == Token::Operator(op)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Token::Number(n) => write!(f, "{}", format_value(*n)),
            Token::Operator(op) => write!(f, "{}", op.symbol()),
            Token::Function(func) => write!(f, "{}", func.name()),
            Token::Constant(c) => write!(f, "{}", c.name()),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::ArgSeparator => write!(f, ","),
        }
    }
}

// longest dtoa output is well below this
const VALUE_BUF_LEN: usize = 32;

/// Text of a value as the REPL prints a solution and as numbers show up in
/// the debug dumps of token lists. It is the shortest decimal that reads
/// back to the same `f64`, and whole numbers keep a trailing `.0`, so the
/// answer to `2+3*4` is printed as `14.0`
pub fn format_value(v: f64) -> String {
    let mut buf = [0u8; VALUE_BUF_LEN];
    dtoa::write(&mut buf[..], v)
        .ok()
        .and_then(|len| str::from_utf8(&buf[..len]).ok().map(str::to_string))
        .unwrap_or_else(|| v.to_string())
}

/// Space separated text form of a token list, used in debug output
pub fn format_tokens(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.to_string()).collect::<Vec<String>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::solve;
    use crate::state::CalcState;
    use crate::symbols::UnaryFn;

    #[test]
    fn test_format() {
        let tokens = [
            Token::Function(Function::Unary(UnaryFn::Sin)),
            Token::LeftParen,
            Token::Number(2.5),
            Token::Operator(Operator::Mul),
            Token::Constant(Constant::Pi),
            Token::ArgSeparator,
            Token::RightParen,
        ];
        assert_eq!(format_tokens(&tokens), "sin ( 2.5 * pi , )");
        assert_eq!(format_tokens(&[]), "");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(14.0), "14.0");
        assert_eq!(format_value(0.5), "0.5");
        assert_eq!(format_value(-0.25), "-0.25");
        assert_eq!(format_value(std::f64::consts::PI), "3.141592653589793");
    }

    #[test]
    fn test_format_solution() {
        let mut state = CalcState::new();
        assert_eq!(format_value(solve("0.1+0.2", &mut state).unwrap()), "0.3");
        assert_eq!(format_value(solve("-7%3", &mut state).unwrap()), "2.0");
        assert_eq!(format_value(solve("-0*1", &mut state).unwrap()), "0.0");
    }
}
