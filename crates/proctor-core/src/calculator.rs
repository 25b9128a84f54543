//! Scientific calculator for candidates.
//!
//! A small recursive-descent evaluator. Expressions are parsed, never
//! executed as code.
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | '+' unary | primary
//! primary := number | func '(' expr ')' | '(' expr ')'
//! func    := sin | cos | tan | log | sqrt | exp
//! ```

use crate::error::{ProctorError, Result};

/// Longest expression accepted, in characters.
pub const MAX_EXPRESSION_LEN: usize = 256;

/// Deepest nesting of parentheses, function calls and unary signs.
pub const MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ProctorError::Calculator(format!("invalid number '{literal}'")))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => {
                return Err(ProctorError::Calculator(format!(
                    "unexpected character '{other}'"
                )));
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(ProctorError::Calculator(format!(
                "expected {expected:?}, found {token:?}"
            ))),
            None => Err(ProctorError::Calculator(format!(
                "expected {expected:?}, found end of input"
            ))),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ProctorError::Calculator("expression nested too deeply".into()));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expr(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.advance();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    value *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.advance();
                    value /= self.unary()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<f64> {
        let negate = match self.peek() {
            Some(Token::Minus) => true,
            Some(Token::Plus) => false,
            _ => return self.primary(),
        };
        self.advance();
        self.enter()?;
        let value = self.unary()?;
        self.leave();
        Ok(if negate { -value } else { value })
    }

    fn primary(&mut self) -> Result<f64> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::LParen) => {
                self.enter()?;
                let value = self.expr()?;
                self.leave();
                self.expect(Token::RParen)?;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                let func: fn(f64) -> f64 = match name.as_str() {
                    "sin" => f64::sin,
                    "cos" => f64::cos,
                    "tan" => f64::tan,
                    "log" => f64::log10,
                    "sqrt" => f64::sqrt,
                    "exp" => f64::exp,
                    _ => {
                        return Err(ProctorError::Calculator(format!(
                            "unknown function '{name}'"
                        )));
                    }
                };
                self.expect(Token::LParen)?;
                self.enter()?;
                let arg = self.expr()?;
                self.leave();
                self.expect(Token::RParen)?;
                Ok(func(arg))
            }
            Some(token) => Err(ProctorError::Calculator(format!(
                "unexpected token {token:?}"
            ))),
            None => Err(ProctorError::Calculator("unexpected end of input".into())),
        }
    }
}

/// Evaluates an arithmetic expression.
///
/// # Errors
///
/// `Calculator` for syntax errors, unknown functions, non-finite results
/// (division by zero, `sqrt` of a negative number) and expressions longer
/// than [`MAX_EXPRESSION_LEN`] or nested deeper than [`MAX_NESTING_DEPTH`].
pub fn evaluate(input: &str) -> Result<f64> {
    if input.chars().count() > MAX_EXPRESSION_LEN {
        return Err(ProctorError::Calculator(format!(
            "expression longer than {MAX_EXPRESSION_LEN} characters"
        )));
    }
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ProctorError::Calculator("empty expression".into()));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(ProctorError::Calculator(format!(
            "unexpected trailing token {token:?}"
        )));
    }
    if !value.is_finite() {
        return Err(ProctorError::Calculator("result is not a finite number".into()));
    }
    Ok(value)
}
