use std::collections::HashMap;
use std::f64::consts;

use lazy_static::lazy_static;

use crate::errors::*;
use crate::state::{CalcState, Mode};

/// Binary infix operators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

/// Functions that take no arguments and work with the angle mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NullaryFn {
    Toggle,
    Mode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryFn {
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Log,
    Ln,
    Deg,
    Rad,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryFn {
    Pow,
}

/// Built-in function. The variant defines how many values the function
/// takes from the stack
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    Nullary(NullaryFn),
    Unary(UnaryFn),
    Binary(BinaryFn),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    E,
    /// result of the last successful evaluation
    Ans,
}

/// Anything a word of an expression may resolve to
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Symbol {
    Operator(Operator),
    Function(Function),
    Constant(Constant),
}

const OPERATORS: [Operator; 6] = [
    Operator::Add,
    Operator::Sub,
    Operator::Mul,
    Operator::Div,
    Operator::Rem,
    Operator::Pow,
];

const FUNCTIONS: [Function; 20] = [
    Function::Nullary(NullaryFn::Toggle),
    Function::Nullary(NullaryFn::Mode),
    Function::Unary(UnaryFn::Sqrt),
    Function::Unary(UnaryFn::Sin),
    Function::Unary(UnaryFn::Cos),
    Function::Unary(UnaryFn::Tan),
    Function::Unary(UnaryFn::Asin),
    Function::Unary(UnaryFn::Acos),
    Function::Unary(UnaryFn::Atan),
    Function::Unary(UnaryFn::Sinh),
    Function::Unary(UnaryFn::Cosh),
    Function::Unary(UnaryFn::Tanh),
    Function::Unary(UnaryFn::Asinh),
    Function::Unary(UnaryFn::Acosh),
    Function::Unary(UnaryFn::Atanh),
    Function::Unary(UnaryFn::Log),
    Function::Unary(UnaryFn::Ln),
    Function::Unary(UnaryFn::Deg),
    Function::Unary(UnaryFn::Rad),
    Function::Binary(BinaryFn::Pow),
];

const CONSTANTS: [Constant; 3] = [Constant::Pi, Constant::E, Constant::Ans];

lazy_static! {
    static ref REGISTRY: HashMap<&'static str, Symbol> = {
        let mut m = HashMap::new();
        for op in OPERATORS.iter() {
            m.insert(op.symbol(), Symbol::Operator(*op));
        }
        for func in FUNCTIONS.iter() {
            m.insert(func.name(), Symbol::Function(*func));
        }
        for c in CONSTANTS.iter() {
            m.insert(c.name(), Symbol::Constant(*c));
        }
        m
    };
}

/// Looks up an operator, function or constant by its lowercase name
pub fn lookup(name: &str) -> Option<Symbol> {
    REGISTRY.get(name).copied()
}

// Turns a non-finite outcome of a math call into a calculator error
fn checked(name: &str, v: f64) -> CalcResult {
    if v.is_nan() {
        return Err(CalcError::DomainError(name.to_string()));
    }
    if v.is_infinite() {
        return Err(CalcError::Overflow(name.to_string()));
    }
    Ok(v)
}

fn power(name: &str, base: f64, exp: f64) -> CalcResult {
    if base == 0.0 && exp < 0.0 {
        return Err(CalcError::DividedByZero(base.to_string()));
    }
    checked(name, base.powf(exp))
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Rem => "%",
            Operator::Pow => "^",
        }
    }

    pub fn precedence(self) -> i32 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::Div | Operator::Rem => 2,
            Operator::Pow => 3,
        }
    }

    pub fn is_right_assoc(self) -> bool {
        self == Operator::Pow
    }

    pub fn apply(self, a: f64, b: f64) -> CalcResult {
        let name = self.symbol();
        match self {
            Operator::Add => checked(name, a + b),
            Operator::Sub => checked(name, a - b),
            Operator::Mul => checked(name, a * b),
            Operator::Div => {
                if b == 0.0 {
                    return Err(CalcError::DividedByZero(a.to_string()));
                }
                checked(name, a / b)
            }
            Operator::Rem => {
                if b == 0.0 {
                    return Err(CalcError::DividedByZero(a.to_string()));
                }
                // floored: the result takes the sign of the divisor
                let r = a % b;
                if r != 0.0 && (r < 0.0) != (b < 0.0) {
                    checked(name, r + b)
                } else {
                    checked(name, r)
                }
            }
            Operator::Pow => power(name, a, b),
        }
    }
}

impl NullaryFn {
    pub fn name(self) -> &'static str {
        match self {
            NullaryFn::Toggle => "tog",
            NullaryFn::Mode => "mode",
        }
    }

    pub fn apply(self, state: &mut CalcState) -> f64 {
        match self {
            NullaryFn::Toggle => state.toggle_mode(),
            NullaryFn::Mode => state.mode().code(),
        }
    }
}

impl UnaryFn {
    pub fn name(self) -> &'static str {
        match self {
            UnaryFn::Sqrt => "sqrt",
            UnaryFn::Sin => "sin",
            UnaryFn::Cos => "cos",
            UnaryFn::Tan => "tan",
            UnaryFn::Asin => "asin",
            UnaryFn::Acos => "acos",
            UnaryFn::Atan => "atan",
            UnaryFn::Sinh => "sinh",
            UnaryFn::Cosh => "cosh",
            UnaryFn::Tanh => "tanh",
            UnaryFn::Asinh => "asinh",
            UnaryFn::Acosh => "acosh",
            UnaryFn::Atanh => "atanh",
            UnaryFn::Log => "log",
            UnaryFn::Ln => "ln",
            UnaryFn::Deg => "deg",
            UnaryFn::Rad => "rad",
        }
    }

    fn domain_error(self) -> CalcError {
        CalcError::DomainError(self.name().to_string())
    }

    /// Applies the function. Trigonometric and hyperbolic functions read
    /// `mode` to interpret their argument (forward) or result (inverse)
    pub fn apply(self, x: f64, mode: Mode) -> CalcResult {
        let v = match self {
            UnaryFn::Sqrt => {
                if x < 0.0 {
                    return Err(self.domain_error());
                }
                x.sqrt()
            }
            UnaryFn::Sin => mode.angle_in(x).sin(),
            UnaryFn::Cos => mode.angle_in(x).cos(),
            UnaryFn::Tan => mode.angle_in(x).tan(),
            UnaryFn::Asin | UnaryFn::Acos => {
                if !(-1.0..=1.0).contains(&x) {
                    return Err(self.domain_error());
                }
                let r = if self == UnaryFn::Asin { x.asin() } else { x.acos() };
                mode.angle_out(r)
            }
            UnaryFn::Atan => mode.angle_out(x.atan()),
            UnaryFn::Sinh => mode.angle_in(x).sinh(),
            UnaryFn::Cosh => mode.angle_in(x).cosh(),
            UnaryFn::Tanh => mode.angle_in(x).tanh(),
            UnaryFn::Asinh => mode.angle_out(x.asinh()),
            UnaryFn::Acosh => {
                if x < 1.0 {
                    return Err(self.domain_error());
                }
                mode.angle_out(x.acosh())
            }
            UnaryFn::Atanh => {
                if x <= -1.0 || x >= 1.0 {
                    return Err(self.domain_error());
                }
                mode.angle_out(x.atanh())
            }
            UnaryFn::Log | UnaryFn::Ln => {
                if x <= 0.0 {
                    return Err(self.domain_error());
                }
                if self == UnaryFn::Log {
                    x.log10()
                } else {
                    x.ln()
                }
            }
            UnaryFn::Deg => x.to_degrees(),
            UnaryFn::Rad => x.to_radians(),
        };
        checked(self.name(), v)
    }
}

impl BinaryFn {
    pub fn name(self) -> &'static str {
        match self {
            BinaryFn::Pow => "pow",
        }
    }

    pub fn apply(self, a: f64, b: f64) -> CalcResult {
        match self {
            BinaryFn::Pow => power(self.name(), a, b),
        }
    }
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::Nullary(f) => f.name(),
            Function::Unary(f) => f.name(),
            Function::Binary(f) => f.name(),
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Function::Nullary(..) => 0,
            Function::Unary(..) => 1,
            Function::Binary(..) => 2,
        }
    }
}

impl Constant {
    pub fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "e",
            Constant::Ans => "ans",
        }
    }

    /// Current value of the constant. `None` only for `ans` before the
    /// first successful evaluation
    pub fn value(self, state: &CalcState) -> Option<f64> {
        match self {
            Constant::Pi => Some(consts::PI),
            Constant::E => Some(consts::E),
            Constant::Ans => state.result(),
        }
    }
}
