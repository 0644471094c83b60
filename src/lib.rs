//! # Infix expression calculator
//!
//! Evaluates a text expression written in usual infix notation into a `f64`.
//! An expression goes through three stages:
//! * tokenizing: the input is split into numbers, operators, functions,
//!   constants, brackets and argument separators. Omitted multiplication
//!   signs are inserted (`2pi`, `3(4+5)`, `(1+2)(3+4)`), every power is
//!   wrapped in brackets, and negative signs become subtractions from zero
//! * conversion to postfix notation with the shunting-yard algorithm
//! * evaluation of the postfix expression on a value stack
//!
//! ```
//! use infix_calc::{solve, CalcState};
//!
//! let mut state = CalcState::new();
//! assert_eq!(solve("2+3*4", &mut state), Ok(14.0));
//! assert_eq!(solve("2^3^2", &mut state), Ok(512.0));
//! assert_eq!(solve("ans/2", &mut state), Ok(256.0));
//! ```
//!
//! Operators (starting from highest priority):
//! * `^` - power, right-associative: `2^3^2` is `2^(3^2)`
//! * `*`, `/`, `%` - multiplication, division, remainder (it has the sign of the divisor)
//! * `+`, `-` - addition, subtraction
//!
//! A power binds tighter than a negative sign: `-2^2` is `-4`, `(-2)^2` is `4`.
//!
//! The list of supported functions:
//! * trigonometric functions (including inverted ones): sin, cos, tan, asin, acos, atan
//! * hyperbolic functions (including inverted ones): sinh, cosh, tanh, asinh, acosh, atanh
//! * square root and power: sqrt, pow(x, y)
//! * logarithms: log (base 10) and ln
//! * angle conversion: deg (radians to degrees) and rad (degrees to radians)
//! * angle mode: tog switches between radians and degrees and returns the
//!   new mode (0 - radians, 1 - degrees), mode returns the current one.
//!   Both can be written without brackets
//!
//! In degree mode the arguments of forward trigonometric and hyperbolic
//! functions are degrees, and inverse functions return degrees: it is the
//! result of an inverse function that is converted, not its argument, so
//! `acos(0)` is `90` in degree mode (converting the argument instead, as some
//! calculators do, would give `1.5708`).
//!
//! Predefined constants:
//! * `PI` - 3.14159...
//! * `E` - 2.71828...
//! * `ANS` - the result of the last successful evaluation
//!
//! Names are case-insensitive. All the state an expression can change, the
//! angle mode and `ans`, lives in [`CalcState`], so independent states do
//! not affect each other. A failed evaluation does not modify the state.

#[macro_use]
extern crate pest_derive;

pub mod errors;
pub mod parse;
pub mod stack;
pub mod state;
pub mod symbols;
pub mod token;

pub use errors::{CalcError, CalcResult, ErrorKind};
pub use parse::{solve, tokenize};
pub use stack::{evaluate, to_postfix};
pub use state::{CalcState, Mode};
pub use token::{format_value, Token};
