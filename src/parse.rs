use log::debug;
use pest::Parser;

use crate::errors::*;
use crate::stack::{evaluate, to_postfix};
use crate::state::CalcState;
use crate::symbols::{lookup, Operator, Symbol};
use crate::token::{format_tokens, Token};

#[derive(Parser)]
#[grammar = "calc.pest"]
pub struct CalcParser;

/// Raw piece of input as the grammar split it, before validation
struct Lexeme<'a> {
    rule: Rule,
    text: &'a str,
}

/// evaluates a given expression and returns either result or error.
/// On success the result is stored in `state` and is available as `ans`
pub fn solve(expr: &str, state: &mut CalcState) -> CalcResult {
    let tokens = tokenize(expr)?;
    let postfix = to_postfix(&tokens, state)?;
    evaluate(&postfix, state)
}

/// Converts an expression to a list of infix tokens. Besides splitting the
/// input, it inserts implicit multiplication signs, wraps every power into
/// brackets and turns negative signs into subtractions from zero
pub fn tokenize(expr: &str) -> Result<Vec<Token>, CalcError> {
    let expr = expr.to_lowercase();
    let lexemes = scan(&expr)?;
    let tokens = validate(&lexemes)?;
    debug!("tokenized infix: {}", format_tokens(&tokens));

    let tokens = insert_implicit_multiplication(tokens);
    debug!("after implicit multiplication: {}", format_tokens(&tokens));

    let tokens = group_powers(tokens);
    let tokens = rewrite_signs(tokens);
    debug!("after handling negatives: {}", format_tokens(&tokens));

    Ok(tokens)
}

fn scan(expr: &str) -> Result<Vec<Lexeme<'_>>, CalcError> {
    let pairs = match CalcParser::parse(Rule::expr, expr) {
        Ok(p) => p,
        Err(..) => return Err(CalcError::InvalidToken(expr.to_string())),
    };

    Ok(pairs
        .filter(|pair| pair.as_rule() != Rule::EOI)
        .map(|pair| Lexeme {
            rule: pair.as_rule(),
            text: pair.as_str(),
        })
        .collect())
}

fn validate(lexemes: &[Lexeme<'_>]) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::with_capacity(lexemes.len());
    for lex in lexemes {
        let tok = match lex.rule {
            Rule::number => number_token(lex.text)?,
            Rule::word | Rule::operator => match lookup(lex.text) {
                Some(Symbol::Operator(op)) => Token::Operator(op),
                Some(Symbol::Function(f)) => Token::Function(f),
                Some(Symbol::Constant(c)) => Token::Constant(c),
                None => return Err(CalcError::InvalidToken(lex.text.to_string())),
            },
            Rule::open_b => Token::LeftParen,
            Rule::close_b => Token::RightParen,
            Rule::arg_sep => Token::ArgSeparator,
            _ => return Err(CalcError::InvalidToken(lex.text.to_string())),
        };
        tokens.push(tok);
    }
    Ok(tokens)
}

fn number_token(s: &str) -> Result<Token, CalcError> {
    let n = match s.parse::<f64>() {
        Ok(n) => n,
        Err(..) => return Err(CalcError::InvalidToken(s.to_string())),
    };
    if n.is_infinite() {
        return Err(CalcError::Overflow(s.to_string()));
    }
    Ok(Token::Number(n))
}

fn needs_multiplication(left: &Token, right: &Token) -> bool {
    if left.is_operator() || right.is_operator() {
        return false;
    }
    !matches!(
        (left, right),
        (Token::Function(..), Token::LeftParen)
            | (_, Token::RightParen)
            | (Token::LeftParen, _)
            | (Token::ArgSeparator, _)
            | (_, Token::ArgSeparator)
    )
}

// 2pi => 2*pi, 3(4+5) => 3*(4+5), (1+2)(3+4) => (1+2)*(3+4)
fn insert_implicit_multiplication(tokens: Vec<Token>) -> Vec<Token> {
    let mut res = Vec::with_capacity(tokens.len() * 2);
    for (i, tok) in tokens.iter().enumerate() {
        if i > 0 && needs_multiplication(&tokens[i - 1], tok) {
            res.push(Token::Operator(Operator::Mul));
        }
        res.push(*tok);
    }
    res
}

fn is_sign(tok: &Token) -> bool {
    tok.is_op(Operator::Sub) || tok.is_op(Operator::Add)
}

// Bracket pairs and runs of signs of a token list, collected in a single
// pass each, so the rewriting passes never rescan the list
struct Layout<'a> {
    tokens: &'a [Token],
    // index of the matching bracket, for both `(` and `)`
    pairs: Vec<Option<usize>>,
    // first index at or after `k` that is not a sign
    unsigned: Vec<usize>,
}

impl<'a> Layout<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        let mut pairs = vec![None; tokens.len()];
        let mut opened = Vec::new();
        for (k, tok) in tokens.iter().enumerate() {
            match tok {
                Token::LeftParen => opened.push(k),
                Token::RightParen => {
                    if let Some(open) = opened.pop() {
                        pairs[open] = Some(k);
                        pairs[k] = Some(open);
                    }
                }
                _ => {}
            }
        }

        let mut unsigned = vec![tokens.len(); tokens.len() + 1];
        for k in (0..tokens.len()).rev() {
            unsigned[k] = if is_sign(&tokens[k]) { unsigned[k + 1] } else { k };
        }

        Layout {
            tokens,
            pairs,
            unsigned,
        }
    }

    // First index of the operand that ends at `last`: a value, or a bracket
    // group together with the function called on it
    fn operand_start(&self, last: usize) -> Option<usize> {
        match self.tokens[last] {
            Token::RightParen => {
                let open = self.pairs[last]?;
                if open > 0 && matches!(self.tokens[open - 1], Token::Function(..)) {
                    Some(open - 1)
                } else {
                    Some(open)
                }
            }
            Token::Number(..) | Token::Constant(..) | Token::Function(..) => Some(last),
            _ => None,
        }
    }

    // Index just past the operand that begins at `start`. Leading signs
    // belong to the operand
    fn operand_end(&self, start: usize) -> Option<usize> {
        let k = *self.unsigned.get(start)?;
        match self.tokens.get(k)? {
            Token::LeftParen => self.pairs[k].map(|close| close + 1),
            Token::Function(..) => match self.tokens.get(k + 1) {
                Some(Token::LeftParen) => self.pairs[k + 1].map(|close| close + 1),
                _ => Some(k + 1),
            },
            Token::Number(..) | Token::Constant(..) => Some(k + 1),
            _ => None,
        }
    }
}

// Copies `tokens` adding `opens[k]` left and `closes[k]` right brackets in
// front of the token `k`. Closing ones go first: they end a group that
// finished before `k`
fn with_brackets(tokens: &[Token], opens: &[usize], closes: &[usize]) -> Vec<Token> {
    let extra: usize = opens.iter().chain(closes.iter()).sum();
    let mut res = Vec::with_capacity(tokens.len() + extra);
    for (k, tok) in tokens.iter().enumerate() {
        res.extend(std::iter::repeat(Token::RightParen).take(closes[k]));
        res.extend(std::iter::repeat(Token::LeftParen).take(opens[k]));
        res.push(*tok);
    }
    res.extend(std::iter::repeat(Token::RightParen).take(closes[tokens.len()]));
    res
}

// a ^ b => ( a ^ b ): binds a power tighter than any sign in front of it,
// so -2^2 is -(2^2). The right side of a power spans the whole chain
// `b ^ c ^ ...`, so the grouping keeps `^` right-associative. Powers are
// visited right to left: the chain end of a `^` is the chain end of the
// next `^` if its exponent stops there
fn group_powers(tokens: Vec<Token>) -> Vec<Token> {
    let layout = Layout::new(&tokens);
    let len = tokens.len();
    let mut opens = vec![0usize; len + 1];
    let mut closes = vec![0usize; len + 1];
    let mut chain_end: Vec<Option<usize>> = vec![None; len];

    for i in (0..len).rev() {
        if !tokens[i].is_op(Operator::Pow) {
            continue;
        }
        chain_end[i] = match layout.operand_end(i + 1) {
            Some(end) if end < len && tokens[end].is_op(Operator::Pow) => chain_end[end],
            end => end,
        };
        if i == 0 {
            continue;
        }
        if let (Some(start), Some(end)) = (layout.operand_start(i - 1), chain_end[i]) {
            opens[start] += 1;
            closes[end] += 1;
        }
    }

    with_brackets(&tokens, &opens, &closes)
}

fn is_sign_position(tokens: &[Token], i: usize) -> bool {
    i == 0
        || matches!(
            tokens[i - 1],
            Token::Operator(..) | Token::LeftParen | Token::ArgSeparator
        )
}

// -x => ( 0 - x ) and +x => x, where x is a value, a bracket group or a
// function call
fn rewrite_signs(tokens: Vec<Token>) -> Vec<Token> {
    let layout = Layout::new(&tokens);
    let len = tokens.len();
    let mut closes = vec![0usize; len + 1];
    let mut res = Vec::with_capacity(len * 2);

    for (i, tok) in tokens.iter().enumerate() {
        res.extend(std::iter::repeat(Token::RightParen).take(closes[i]));
        if is_sign_position(&tokens, i) {
            match tok {
                Token::Operator(Operator::Add) => continue,
                Token::Operator(Operator::Sub) => {
                    if let Some(end) = layout.operand_end(i + 1) {
                        closes[end] += 1;
                        res.push(Token::LeftParen);
                        res.push(Token::Number(0.0));
                    }
                }
                _ => {}
            }
        }
        res.push(*tok);
    }
    res.extend(std::iter::repeat(Token::RightParen).take(closes[len]));
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Mode;

    fn infix(expr: &str) -> String {
        match tokenize(expr) {
            Ok(tokens) => format_tokens(&tokens),
            Err(e) => format!("{}", e),
        }
    }

    fn assert_solves(expr: &str, state: &mut CalcState, expected: f64) {
        match solve(expr, state) {
            Ok(v) => assert!((v - expected).abs() < 1e-12, "{} = {}, expected {}", expr, v, expected),
            Err(e) => panic!("{} failed: {}", expr, e),
        }
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(infix("2+3"), "2.0 + 3.0");
        assert_eq!(infix("  SIN( Pi ) "), "sin ( pi )");
        assert_eq!(infix("2pi"), "2.0 * pi");
        assert_eq!(infix("3(4+5)"), "3.0 * ( 4.0 + 5.0 )");
        assert_eq!(infix("(1+2)(3+4)"), "( 1.0 + 2.0 ) * ( 3.0 + 4.0 )");
        assert_eq!(infix("2sin(1)"), "2.0 * sin ( 1.0 )");
        assert_eq!(infix("1 2"), "1.0 * 2.0");
        assert_eq!(infix("pow(2,3)"), "pow ( 2.0 , 3.0 )");
        assert_eq!(infix("1%2/3*4"), "1.0 % 2.0 / 3.0 * 4.0");
        assert_eq!(infix(""), "");
    }

    #[test]
    fn test_invalid_tokens() {
        assert_eq!(tokenize("@"), Err(CalcError::InvalidToken("@".to_string())));
        assert_eq!(tokenize("2+foo"), Err(CalcError::InvalidToken("foo".to_string())));
        assert_eq!(tokenize("1.2.3"), Err(CalcError::InvalidToken("1.2.3".to_string())));
        assert_eq!(tokenize("."), Err(CalcError::InvalidToken(".".to_string())));
        assert_eq!(tokenize("3 & 4"), Err(CalcError::InvalidToken("&".to_string())));
        let huge = "9".repeat(400);
        assert!(tokenize(&huge).unwrap_err().is_overflow());
    }

    #[test]
    fn test_negatives() {
        assert_eq!(infix("-2"), "( 0.0 - 2.0 )");
        assert_eq!(infix("-2^2"), "( 0.0 - ( 2.0 ^ 2.0 ) )");
        assert_eq!(infix("(-2)^2"), "( ( ( 0.0 - 2.0 ) ) ^ 2.0 )");
        assert_eq!(infix("2^-1"), "( 2.0 ^ ( 0.0 - 1.0 ) )");
        assert_eq!(infix("2*-pi"), "2.0 * ( 0.0 - pi )");
        assert_eq!(infix("-sin(1)"), "( 0.0 - sin ( 1.0 ) )");
        assert_eq!(infix("--2"), "( 0.0 - ( 0.0 - 2.0 ) )");
        assert_eq!(infix("+2"), "2.0");
        assert_eq!(infix("pow(2,-3)"), "pow ( 2.0 , ( 0.0 - 3.0 ) )");
        assert_eq!(infix("5-3"), "5.0 - 3.0");
    }

    #[test]
    fn test_powers() {
        assert_eq!(infix("2^3^2"), "( 2.0 ^ ( 3.0 ^ 2.0 ) )");
        assert_eq!(infix("sin(1)^2"), "( sin ( 1.0 ) ^ 2.0 )");
        assert_eq!(infix("2*3^2"), "2.0 * ( 3.0 ^ 2.0 )");
        assert_eq!(infix("^2"), "^ 2.0");
        assert_eq!(infix("(2^3)^2"), "( ( ( 2.0 ^ 3.0 ) ) ^ 2.0 )");
        assert_eq!(infix("2^(1+1)^3"), "( 2.0 ^ ( ( 1.0 + 1.0 ) ^ 3.0 ) )");
        assert_eq!(infix("-2^-2^2"), "( 0.0 - ( 2.0 ^ ( 0.0 - ( 2.0 ^ 2.0 ) ) ) )");
    }

    #[test]
    fn test_solve() {
        let mut state = CalcState::new();
        assert_solves("2+3*4", &mut state, 14.0);
        assert_solves("2^3^2", &mut state, 512.0);
        assert_solves("(2^3)^2", &mut state, 64.0);
        assert_solves("2(3+4)", &mut state, 14.0);
        assert_solves("2pi", &mut state, 6.283185307179586);
        assert_solves("(1+2)(3+4)", &mut state, 21.0);
        assert_solves("10/4", &mut state, 2.5);
        assert_solves("-7%3", &mut state, 2.0);
        assert_solves("-2^2", &mut state, -4.0);
        assert_solves("(-2)^2", &mut state, 4.0);
        assert_solves("2^-1", &mut state, 0.5);
        assert_solves("--2", &mut state, 2.0);
        assert_solves("3*-2", &mut state, -6.0);
        assert_solves("-(1+2)*3", &mut state, -9.0);
        assert_solves("pow(2,10)", &mut state, 1024.0);
        assert_solves("pow(2,-1)", &mut state, 0.5);
        assert_solves("3sqrt(16)", &mut state, 12.0);
        assert_solves("sqrt(3^2+4^2)", &mut state, 5.0);
        assert_solves("log(1000)+ln(e)", &mut state, 4.0);
        assert_solves("0.1+0.2", &mut state, 0.3);
        assert_solves("1 2", &mut state, 2.0);
    }

    #[test]
    fn test_modes() {
        let mut state = CalcState::new();
        assert_solves("sin(90)", &mut state, 0.893996663600558);
        assert_solves("mode", &mut state, 0.0);
        assert_solves("tog", &mut state, 1.0);
        assert_eq!(state.mode(), Mode::Degree);
        assert_solves("sin(90)", &mut state, 1.0);
        assert_solves("acos(0)", &mut state, 90.0);
        assert_solves("mode()", &mut state, 1.0);
        assert_solves("tog()", &mut state, 0.0);
        assert_eq!(state.mode(), Mode::Radian);

        let mut state = CalcState::with_mode(Mode::Degree);
        assert_solves("cos(180)", &mut state, -1.0);
        // the mode is read when the function runs
        assert_solves("tog+sin(pi/2)", &mut state, 1.0);
    }

    #[test]
    fn test_ans() {
        let mut state = CalcState::new();
        assert_eq!(solve("ans", &mut state), Err(CalcError::AnsUndefined));
        assert_solves("2+3", &mut state, 5.0);
        assert_solves("ans", &mut state, 5.0);
        assert_solves("ans", &mut state, 5.0);
        assert_solves("2ans", &mut state, 10.0);
        assert!(solve("1/0", &mut state).is_err());
        assert_eq!(state.result(), Some(10.0));
        state.reset();
        assert_eq!(solve("ans", &mut state), Err(CalcError::AnsUndefined));
    }

    #[test]
    fn test_errors() {
        let mut state = CalcState::new();
        assert_eq!(solve("(1+2", &mut state), Err(CalcError::MismatchedParenthesis));
        assert_eq!(solve("1+2)", &mut state), Err(CalcError::MismatchedParenthesis));
        assert_eq!(solve("", &mut state), Err(CalcError::NoOperands));
        assert_eq!(solve("   ", &mut state), Err(CalcError::NoOperands));
        assert_eq!(solve("@", &mut state), Err(CalcError::InvalidToken("@".to_string())));
        assert_eq!(solve("2+", &mut state), Err(CalcError::MismatchedOperands));
        assert_eq!(solve("1,2", &mut state), Err(CalcError::MisplacedSeparator));
        assert_eq!(solve("(1,2)", &mut state), Err(CalcError::MisplacedSeparator));
        assert_eq!(
            solve("pow(2)", &mut state),
            Err(CalcError::FunctionArgCount("pow".to_string(), 2, 1))
        );
        assert_eq!(
            solve("sin(1,2)", &mut state),
            Err(CalcError::FunctionArgCount("sin".to_string(), 1, 2))
        );
        assert_eq!(solve("sin 30", &mut state), Err(CalcError::FunctionNoArgs("sin".to_string())));
        assert_eq!(solve("asin(2)", &mut state), Err(CalcError::DomainError("asin".to_string())));
        assert_eq!(solve("sqrt(-1)", &mut state), Err(CalcError::DomainError("sqrt".to_string())));
        assert_eq!(solve("1/0", &mut state), Err(CalcError::DividedByZero("1".to_string())));

        for expr in &["10^400", "9^9^9", "sinh(1000)", "pow(10,400)"] {
            let res = solve(expr, &mut state);
            assert!(res.unwrap_err().is_overflow(), "{} must overflow", expr);
        }
        assert_eq!(state.result(), None);
    }

    #[test]
    fn test_failed_solve_keeps_mode() {
        let mut state = CalcState::new();
        assert_eq!(solve("tog+", &mut state), Err(CalcError::MismatchedOperands));
        assert_eq!(state.mode(), Mode::Radian);
    }

    #[test]
    fn test_long_sign_runs() {
        let mut state = CalcState::new();
        assert_solves(&format!("{}1", "-".repeat(60000)), &mut state, 1.0);
        assert_solves(&format!("{}1", "-".repeat(60001)), &mut state, -1.0);
        assert_solves(&format!("2*{}3", "+".repeat(60000)), &mut state, 6.0);
        assert_solves(&format!("2^{}1", "-".repeat(30001)), &mut state, 0.5);
        assert_eq!(infix("---2"), "( 0.0 - ( 0.0 - ( 0.0 - 2.0 ) ) )");
    }

    #[test]
    fn test_long_power_chains() {
        let mut state = CalcState::new();
        assert_solves(&format!("2{}", "^1".repeat(5000)), &mut state, 2.0);
        assert_solves(&format!("-2{}", "^1".repeat(5000)), &mut state, -2.0);

        let tokens = tokenize(&format!("2{}", "^1".repeat(5000))).unwrap();
        let opens = tokens.iter().filter(|t| **t == Token::LeftParen).count();
        assert_eq!(opens, 5000);
        assert_eq!(tokens.len(), 2 * 5000 + 1 + 2 * 5000);
    }
}
