use log::debug;

use crate::errors::*;
use crate::state::CalcState;
use crate::symbols::{Constant, Function, Operator};
use crate::token::{format_tokens, Token};

// the solution is rounded to this number of decimal digits
const ROUND_DIGITS: i32 = 15;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Entry {
    Op(Operator),
    Func(Function),
    // number of arguments seen so far inside the bracket
    OpenB(usize),
}

pub(crate) struct Stack {
    pub(crate) queue: Vec<Entry>,
    pub(crate) output: Vec<Token>,
    values: Vec<f64>,
    prev: Option<Token>,
}

/// Converts infix tokens to postfix notation (shunting-yard).
/// `state` is used only to check that `ans` has a value
pub fn to_postfix(tokens: &[Token], state: &CalcState) -> Result<Vec<Token>, CalcError> {
    let mut stk = Stack::new();
    for tok in tokens {
        if *tok == Token::Constant(Constant::Ans) && state.result().is_none() {
            return Err(CalcError::AnsUndefined);
        }
        stk.push(*tok)?;
    }
    stk.finish()?;
    debug!("tokenized postfix: {}", format_tokens(&stk.output));
    Ok(stk.output)
}

/// Calculates a postfix expression. On success the solution becomes the
/// last result of `state`; on failure `state` is left untouched, including
/// the mode switched by `tog`
pub fn evaluate(postfix: &[Token], state: &mut CalcState) -> CalcResult {
    let mut scratch = *state;
    let mut stk = Stack::new();
    let solution = stk.calculate(postfix, &mut scratch)?;
    debug!("solution: {}", solution);

    scratch.set_result(solution);
    *state = scratch;
    Ok(solution)
}

fn round_solution(v: f64) -> f64 {
    let factor = 10f64.powi(ROUND_DIGITS);
    let scaled = v * factor;
    // too big to have anything after the decimal point to round
    let v = if scaled.is_finite() && scaled.abs() < 9.0e15 {
        scaled.round() / factor
    } else {
        v
    };
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

impl Stack {
    pub(crate) fn new() -> Self {
        Stack {
            queue: Vec::new(),
            output: Vec::new(),
            values: Vec::new(),
            prev: None,
        }
    }

    // move operators from the queue to output while the top operator in the
    // queue has greater priority, or equal one for left-associative `op`
    fn pop_while_priority(&mut self, op: Operator) {
        while let Some(Entry::Op(top)) = self.queue.last().copied() {
            let pri = op.precedence();
            if top.precedence() > pri || (top.precedence() == pri && !op.is_right_assoc()) {
                self.output.push(Token::Operator(top));
                self.queue.pop();
            } else {
                return;
            }
        }
    }

    // move operators from the queue to output until the first bracket.
    // Returns the number of arguments collected inside the bracket
    fn pop_until_bracket(&mut self, keep_bracket: bool) -> Result<usize, CalcError> {
        while let Some(e) = self.queue.pop() {
            match e {
                Entry::Op(op) => self.output.push(Token::Operator(op)),
                Entry::Func(f) => self.output.push(Token::Function(f)),
                Entry::OpenB(args) => {
                    if keep_bracket {
                        self.queue.push(Entry::OpenB(args + 1));
                    }
                    return Ok(args);
                }
            }
        }
        if keep_bracket {
            Err(CalcError::MisplacedSeparator)
        } else {
            Err(CalcError::MismatchedParenthesis)
        }
    }

    // a function name that is not followed by a bracket: only functions
    // without arguments can be called this way
    fn close_bare_function(&mut self, f: Function) -> CalcErrorResult {
        if f.arity() != 0 {
            return Err(CalcError::FunctionNoArgs(f.name().to_string()));
        }
        if self.queue.last() == Some(&Entry::Func(f)) {
            self.queue.pop();
        }
        self.output.push(Token::Function(f));
        Ok(())
    }

    fn close_bracket(&mut self) -> CalcErrorResult {
        if self.prev == Some(Token::LeftParen) {
            // empty brackets: no arguments at all
            if let Some(Entry::OpenB(args)) = self.queue.last_mut() {
                *args = 0;
            }
        }
        let args = self.pop_until_bracket(false)?;

        if let Some(Entry::Func(f)) = self.queue.last().copied() {
            if f.arity() != args {
                return Err(CalcError::FunctionArgCount(f.name().to_string(), f.arity(), args));
            }
            self.queue.pop();
            self.output.push(Token::Function(f));
        } else if args > 1 {
            return Err(CalcError::MisplacedSeparator);
        }
        Ok(())
    }

    pub(crate) fn push(&mut self, tok: Token) -> CalcErrorResult {
        if let Some(Token::Function(f)) = self.prev {
            if tok != Token::LeftParen {
                self.close_bare_function(f)?;
            }
        }

        match tok {
            Token::Number(..) | Token::Constant(..) => self.output.push(tok),
            Token::Operator(op) => {
                self.pop_while_priority(op);
                self.queue.push(Entry::Op(op));
            }
            Token::Function(f) => self.queue.push(Entry::Func(f)),
            Token::LeftParen => self.queue.push(Entry::OpenB(1)),
            Token::RightParen => self.close_bracket()?,
            Token::ArgSeparator => {
                self.pop_until_bracket(true)?;
            }
        }
        self.prev = Some(tok);
        Ok(())
    }

    // move all operators from queue to output.
    // Must be called only after the expression ends
    pub(crate) fn finish(&mut self) -> CalcErrorResult {
        if let Some(Token::Function(f)) = self.prev {
            self.close_bare_function(f)?;
        }
        while let Some(e) = self.queue.pop() {
            match e {
                Entry::OpenB(..) => return Err(CalcError::MismatchedParenthesis),
                Entry::Op(op) => self.output.push(Token::Operator(op)),
                Entry::Func(f) => self.output.push(Token::Function(f)),
            }
        }
        Ok(())
    }

    fn pop_value(&mut self) -> CalcResult {
        self.values.pop().ok_or(CalcError::MismatchedOperands)
    }

    fn process_operator(&mut self, op: Operator) -> CalcErrorResult {
        if self.values.len() < 2 {
            return Err(CalcError::MismatchedOperands);
        }
        let v2 = self.pop_value()?;
        let v1 = self.pop_value()?;
        self.values.push(op.apply(v1, v2)?);
        Ok(())
    }

    fn process_function(&mut self, f: Function, state: &mut CalcState) -> CalcErrorResult {
        let v = match f {
            Function::Nullary(nf) => nf.apply(state),
            Function::Unary(uf) => {
                let v = self.pop_value()?;
                uf.apply(v, state.mode())?
            }
            Function::Binary(bf) => {
                if self.values.len() < 2 {
                    return Err(CalcError::FunctionArgCount(f.name().to_string(), 2, self.values.len()));
                }
                let v2 = self.pop_value()?;
                let v1 = self.pop_value()?;
                bf.apply(v1, v2)?
            }
        };
        self.values.push(v);
        Ok(())
    }

    pub(crate) fn calculate(&mut self, postfix: &[Token], state: &mut CalcState) -> CalcResult {
        self.values = Vec::new();

        for tok in postfix {
            match *tok {
                Token::Number(n) => self.values.push(n),
                Token::Constant(c) => match c.value(state) {
                    Some(v) => self.values.push(v),
                    None => return Err(CalcError::AnsUndefined),
                },
                Token::Operator(op) => self.process_operator(op)?,
                Token::Function(f) => self.process_function(f, state)?,
                Token::LeftParen | Token::RightParen | Token::ArgSeparator => {
                    return Err(CalcError::MismatchedParenthesis)
                }
            }
        }

        match self.values.len() {
            0 => Err(CalcError::NoOperands),
            1 => Ok(round_solution(self.values[0])),
            _ => Err(CalcError::TooManyOperands),
        }
    }
}
