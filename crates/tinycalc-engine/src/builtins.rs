//! Built-in spreadsheet functions and their metadata.
//!
//! Conventions:
//! - Spreadsheet-facing names are ALL CAPS (e.g. `SUM`, `LOG10`); lookup is
//!   case-insensitive.
//! - Scalar functions receive fully evaluated arguments and never re-enter the
//!   evaluator.
//! - Aggregate functions see one cell value at a time through an
//!   [`Accumulator`] and produce their result in [`Accumulator::finish`].
//! - If you add a new built-in, add a row to `BUILTINS`.

use crate::engine::{ErrorKind, Value};

/// Maximum number of arguments a scalar call may pass.
pub const MAX_FUNC_ARGS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scalar {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Abs,
    Ceil,
    Floor,
    Round,
    Trunc,
    Sqrt,
    Exp,
    Ln,
    Log10,
    Log2,
    Dec2Bin,
    Bin2Dec,
    Dec2Hex,
    Hex2Dec,
    If,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Aggregate {
    Sum,
    Avg,
    Count,
    Max,
    Min,
}

/// A builtin function, resolved once by name during lexing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    Scalar(Scalar),
    Aggregate(Aggregate),
}

pub struct Builtin {
    pub name: &'static str,
    pub function: Function,
    pub min_args: usize,
    pub max_args: usize,
    pub description: &'static str,
}

const fn scalar(name: &'static str, f: Scalar, args: usize, description: &'static str) -> Builtin {
    Builtin {
        name,
        function: Function::Scalar(f),
        min_args: args,
        max_args: args,
        description,
    }
}

const fn aggregate(name: &'static str, f: Aggregate, description: &'static str) -> Builtin {
    Builtin {
        name,
        function: Function::Aggregate(f),
        min_args: 1,
        max_args: 1,
        description,
    }
}

pub const BUILTINS: &[Builtin] = &[
    aggregate("SUM", Aggregate::Sum, "Sum of numeric values in a cell range"),
    aggregate("AVG", Aggregate::Avg, "Average of numeric values in a cell range"),
    aggregate("COUNT", Aggregate::Count, "Count of non-empty cells in a cell range"),
    aggregate("MAX", Aggregate::Max, "Maximum numeric value in a cell range"),
    aggregate("MIN", Aggregate::Min, "Minimum numeric value in a cell range"),
    scalar("SIN", Scalar::Sin, 1, "Sine (radians)"),
    scalar("COS", Scalar::Cos, 1, "Cosine (radians)"),
    scalar("TAN", Scalar::Tan, 1, "Tangent (radians)"),
    scalar("ASIN", Scalar::Asin, 1, "Arc sine"),
    scalar("ACOS", Scalar::Acos, 1, "Arc cosine"),
    scalar("ATAN", Scalar::Atan, 1, "Arc tangent"),
    scalar("ABS", Scalar::Abs, 1, "Absolute value"),
    scalar("CEIL", Scalar::Ceil, 1, "Round up to an integer"),
    scalar("FLOOR", Scalar::Floor, 1, "Round down to an integer"),
    scalar("ROUND", Scalar::Round, 1, "Round half up to an integer"),
    scalar("TRUNC", Scalar::Trunc, 1, "Drop the fractional part"),
    scalar("SQRT", Scalar::Sqrt, 1, "Square root"),
    scalar("EXP", Scalar::Exp, 1, "e raised to a power"),
    scalar("LOG", Scalar::Ln, 1, "Natural logarithm"),
    scalar("LOG10", Scalar::Log10, 1, "Base-10 logarithm"),
    scalar("LOG2", Scalar::Log2, 1, "Base-2 logarithm"),
    scalar("DEC2BIN", Scalar::Dec2Bin, 1, "Integer part as binary text"),
    scalar("BIN2DEC", Scalar::Bin2Dec, 1, "Binary text to number"),
    scalar("DEC2HEX", Scalar::Dec2Hex, 1, "Integer part as hexadecimal text"),
    scalar("HEX2DEC", Scalar::Hex2Dec, 1, "Hexadecimal text to number"),
    scalar("IF", Scalar::If, 3, "IF(cond, then, else)"),
];

impl Function {
    /// Resolve a function by exact, case-insensitive name.
    pub fn lookup(name: &str) -> Option<Function> {
        BUILTINS
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
            .map(|b| b.function)
    }

    pub fn builtin(self) -> &'static Builtin {
        BUILTINS
            .iter()
            .find(|b| b.function == self)
            .expect("every function has a BUILTINS entry")
    }

    pub fn name(self) -> &'static str {
        self.builtin().name
    }

    /// Whether `count` arguments are acceptable.
    pub fn accepts(self, count: usize) -> bool {
        let b = self.builtin();
        (b.min_args..=b.max_args).contains(&count)
    }
}

impl Scalar {
    /// Apply the function to already evaluated arguments.
    ///
    /// The caller enforces arity; a short slice yields `Invalid-argument`.
    pub fn call(self, args: &[Value]) -> Value {
        match self {
            Scalar::If => {
                let [cond, then, otherwise] = args else {
                    return Value::Error(ErrorKind::InvalidArgument);
                };
                match cond {
                    Value::Number(n) if *n != 0.0 => then.clone(),
                    Value::Number(_) => otherwise.clone(),
                    _ => Value::Error(ErrorKind::ExpectedNumeric),
                }
            }
            Scalar::Bin2Dec => parse_radix(args, 2),
            Scalar::Hex2Dec => parse_radix(args, 16),
            Scalar::Dec2Bin => with_number(args, |n| Value::String(format!("{:b}", n as i32))),
            Scalar::Dec2Hex => with_number(args, |n| Value::String(format!("{:x}", n as i32))),
            _ => with_number(args, |n| Value::Number(self.apply(n))),
        }
    }

    fn apply(self, n: f64) -> f64 {
        match self {
            Scalar::Sin => n.sin(),
            Scalar::Cos => n.cos(),
            Scalar::Tan => n.tan(),
            Scalar::Asin => n.asin(),
            Scalar::Acos => n.acos(),
            Scalar::Atan => n.atan(),
            Scalar::Abs => n.abs(),
            Scalar::Ceil => n.ceil(),
            Scalar::Floor => n.floor(),
            Scalar::Round => (n + 0.5).trunc(),
            Scalar::Trunc => n.trunc(),
            Scalar::Sqrt => n.sqrt(),
            Scalar::Exp => n.exp(),
            Scalar::Ln => n.ln(),
            Scalar::Log10 => n.log10(),
            Scalar::Log2 => n.log2(),
            Scalar::Dec2Bin | Scalar::Bin2Dec | Scalar::Dec2Hex | Scalar::Hex2Dec | Scalar::If => n,
        }
    }
}

fn with_number(args: &[Value], f: impl FnOnce(f64) -> Value) -> Value {
    match args.first() {
        Some(Value::Number(n)) => f(*n),
        Some(_) => Value::Error(ErrorKind::ExpectedNumeric),
        None => Value::Error(ErrorKind::InvalidArgument),
    }
}

fn parse_radix(args: &[Value], radix: u32) -> Value {
    let Some(text) = args.first().and_then(Value::as_str) else {
        return Value::Error(ErrorKind::InvalidArgument);
    };
    match i64::from_str_radix(text.trim(), radix) {
        Ok(n) => Value::Number(n as f64),
        Err(_) => Value::Error(ErrorKind::InvalidArgument),
    }
}

/// Running state of an aggregate over a block of cells.
#[derive(Clone, Debug)]
pub struct Accumulator {
    function: Aggregate,
    total: f64,
    best: f64,
    count: usize,
}

impl Accumulator {
    pub fn new(function: Aggregate) -> Self {
        Accumulator {
            function,
            total: 0.0,
            best: 0.0,
            count: 0,
        }
    }

    /// Fold one cell's cached value into the state.
    pub fn accumulate(&mut self, value: &Value) {
        match self.function {
            Aggregate::Sum | Aggregate::Avg => {
                if let Value::Number(n) = value {
                    self.total += n;
                    self.count += 1;
                }
            }
            Aggregate::Count => {
                let counted = match value {
                    Value::Number(_) => true,
                    Value::String(_) | Value::Text(_) => {
                        value.as_str().is_some_and(|s| !s.is_empty())
                    }
                    Value::Null | Value::Error(_) => false,
                };
                if counted {
                    self.count += 1;
                }
            }
            Aggregate::Max | Aggregate::Min => {
                if let Value::Number(n) = value {
                    let better = match self.function {
                        Aggregate::Max => *n > self.best,
                        _ => *n < self.best,
                    };
                    if self.count == 0 || better {
                        self.best = *n;
                    }
                    self.count += 1;
                }
            }
        }
    }

    /// Produce the aggregate's result.
    ///
    /// `MAX`/`MIN` of a block without numbers is 0, like `SUM`.
    pub fn finish(&self) -> Value {
        match self.function {
            Aggregate::Sum => Value::Number(self.total),
            Aggregate::Avg => Value::Number(if self.count > 0 {
                self.total / self.count as f64
            } else {
                0.0
            }),
            Aggregate::Count => Value::Number(self.count as f64),
            Aggregate::Max | Aggregate::Min => Value::Number(self.best),
        }
    }
}
