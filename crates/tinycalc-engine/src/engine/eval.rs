//! Formula evaluation.
//!
//! A recursive-descent parser that evaluates as it parses; no syntax tree is
//! built. Grammar, lowest precedence first:
//!
//! ```text
//! expr     := additive (relop additive)*
//! additive := term (('+' | '-') term)*
//! term     := factor (('*' | '/' | '%') factor)*
//! factor   := ('+' | '-')* primary
//! primary  := number | cellref | string | '(' expr ')'
//!           | scalar '(' expr (',' expr)* ')'
//!           | aggregate '(' range ')'
//! ```
//!
//! Cell references read the referenced cell's cached value through a
//! [`CellSource`]; keeping those values current is the caller's job.

use std::cmp::Ordering;

use super::cell_ref::{CellRange, CellRef};
use super::lexer::{Lexer, RelOp, Token};
use super::value::{ErrorKind, Value};
use crate::builtins::{Accumulator, Aggregate, Function, MAX_FUNC_ARGS, Scalar};

/// Read access to cached cell values.
pub trait CellSource {
    /// Current cached value of the cell, `Null` if the cell does not exist.
    fn cached_value(&self, at: CellRef) -> Value;
}

/// Evaluate formula text (without its leading `=`).
pub fn evaluate<S: CellSource + ?Sized>(formula: &str, cells: &S) -> Value {
    let mut evaluator = Evaluator::new(formula, cells);
    match evaluator.formula() {
        Ok(value) => value,
        Err(kind) => Value::Error(kind),
    }
}

type EvalResult = Result<Value, ErrorKind>;

struct Evaluator<'a, S: ?Sized> {
    lexer: Lexer<'a>,
    token: Token<'a>,
    cells: &'a S,
}

impl<'a, S: CellSource + ?Sized> Evaluator<'a, S> {
    fn new(formula: &'a str, cells: &'a S) -> Self {
        let mut lexer = Lexer::new(formula);
        let token = lexer.next_token();
        Evaluator { lexer, token, cells }
    }

    fn advance(&mut self) {
        self.token = self.lexer.next_token();
    }

    /// Consume `expected` or fail with `error`.
    fn expect(&mut self, expected: Token<'a>, error: ErrorKind) -> Result<(), ErrorKind> {
        if self.token != expected {
            return Err(error);
        }
        self.advance();
        Ok(())
    }

    fn formula(&mut self) -> EvalResult {
        let value = self.expr()?;
        if self.token != Token::End {
            tracing::trace!(token = ?self.token, "trailing input after expression");
            return Err(ErrorKind::InvalidExpression);
        }
        Ok(value)
    }

    fn expr(&mut self) -> EvalResult {
        let mut lhs = self.additive()?;
        while let Token::Rel(op) = self.token {
            self.advance();
            let rhs = self.additive()?;
            lhs = compare(op, &lhs, &rhs);
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> EvalResult {
        let mut lhs = self.term()?;
        loop {
            let plus = match self.token {
                Token::Plus => true,
                Token::Minus => false,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.term()?;
            lhs = if plus && (lhs.is_string_like() || rhs.is_string_like()) {
                concat(&lhs, &rhs)?
            } else if plus {
                Value::Number(lhs.to_number() + rhs.to_number())
            } else {
                Value::Number(lhs.to_number() - rhs.to_number())
            };
        }
    }

    fn term(&mut self) -> EvalResult {
        let mut lhs = self.factor()?;
        loop {
            let op = match self.token {
                Token::Star | Token::Slash | Token::Percent => self.token.clone(),
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.factor()?;
            let (a, b) = (lhs.to_number(), rhs.to_number());
            lhs = match op {
                Token::Star => Value::Number(a * b),
                _ if b == 0.0 => return Err(ErrorKind::DivideByZero),
                Token::Slash => Value::Number(a / b),
                _ => Value::Number(a % b),
            };
        }
    }

    fn factor(&mut self) -> EvalResult {
        let mut negative = false;
        loop {
            match self.token {
                Token::Minus => negative = !negative,
                Token::Plus => {}
                _ => break,
            }
            self.advance();
        }

        let value = self.primary()?;
        Ok(match value {
            Value::Number(n) if negative => Value::Number(-n),
            other => other,
        })
    }

    fn primary(&mut self) -> EvalResult {
        let value = match std::mem::replace(&mut self.token, Token::End) {
            Token::Number(n) => {
                self.advance();
                Value::Number(n)
            }
            Token::Str(s) => {
                self.advance();
                Value::String(owned_string(s)?)
            }
            Token::CellRef(at) => {
                self.advance();
                self.cells.cached_value(at)
            }
            Token::LParen => {
                self.advance();
                let value = self.expr()?;
                self.expect(Token::RParen, ErrorKind::ExpectedRightParen)?;
                value
            }
            Token::Function(Function::Scalar(f)) => {
                self.advance();
                self.scalar_call(f)?
            }
            Token::Function(Function::Aggregate(f)) => {
                self.advance();
                self.aggregate_call(f)?
            }
            Token::Error(err) => {
                tracing::trace!(%err, "lexical error");
                return Err(ErrorKind::InvalidExpression);
            }
            _ => return Err(ErrorKind::InvalidExpression),
        };

        match value {
            Value::Error(kind) => Err(kind),
            value => Ok(value),
        }
    }

    fn scalar_call(&mut self, f: Scalar) -> EvalResult {
        self.expect(Token::LParen, ErrorKind::ExpectedLeftParen)?;
        let mut args = Vec::with_capacity(MAX_FUNC_ARGS);
        while args.len() < MAX_FUNC_ARGS {
            args.push(self.expr()?);
            if self.token != Token::Comma {
                break;
            }
            self.advance();
        }
        if !Function::Scalar(f).accepts(args.len()) {
            return Err(ErrorKind::InvalidArgument);
        }
        let result = f.call(&args);
        self.expect(Token::RParen, ErrorKind::ExpectedRightParen)?;
        Ok(result)
    }

    fn aggregate_call(&mut self, f: Aggregate) -> EvalResult {
        self.expect(Token::LParen, ErrorKind::ExpectedLeftParen)?;
        let range = match self.token {
            Token::Range(a, b) => CellRange::new(a, b),
            Token::CellRef(at) => CellRange::new(at, at),
            _ => return Err(ErrorKind::InvalidExpression),
        };
        self.advance();
        self.expect(Token::RParen, ErrorKind::ExpectedRightParen)?;

        let mut acc = Accumulator::new(f);
        for at in range.cells() {
            acc.accumulate(&self.cells.cached_value(at));
        }
        Ok(acc.finish())
    }
}

/// Relational comparison; always yields `Number` 0 or 1.
fn compare(op: RelOp, lhs: &Value, rhs: &Value) -> Value {
    if matches!((lhs, rhs), (Value::Null, Value::Null)) {
        return Value::Number(1.0);
    }
    let ordering = match (lhs.as_str(), rhs.as_str()) {
        (Some(a), Some(b)) => a.cmp(b),
        _ => lhs
            .to_number()
            .partial_cmp(&rhs.to_number())
            .unwrap_or(Ordering::Equal),
    };
    Value::Number(if op.holds(ordering) { 1.0 } else { 0.0 })
}

fn concat(lhs: &Value, rhs: &Value) -> EvalResult {
    let (a, b) = (lhs.to_concat_text(), rhs.to_concat_text());
    let mut out = String::new();
    out.try_reserve(a.len() + b.len())
        .map_err(|_| ErrorKind::OutOfMemory)?;
    out.push_str(&a);
    out.push_str(&b);
    Ok(Value::String(out))
}

fn owned_string(s: &str) -> Result<String, ErrorKind> {
    let mut out = String::new();
    out.try_reserve(s.len()).map_err(|_| ErrorKind::OutOfMemory)?;
    out.push_str(s);
    Ok(out)
}
