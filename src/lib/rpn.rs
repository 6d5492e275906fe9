//! Compiled reverse-Polish calculator.
//!
//! A program string is compiled once into an operation list, so the same
//! calculation can be run many times (typically once per record or per
//! value). Tokens are whitespace-separated:
//!
//! - numeric literals are pushed on the stack
//! - a single letter pushes the value of that variable
//! - `=x` pops the stack into variable `x`
//! - operators: `+ - * / pow exp exp2 exp10 log log2 log10 sqrt chs exch
//!   pop dup max min step if sto rcl` (`log` is the natural logarithm)
//!
//! `step` maps negative arguments to 0 and everything else to 1. `if` pops a
//! test value and then selects the top of stack when the test is >= 0, the
//! value below it otherwise, consuming both. `sto`/`rcl` address 128 memory
//! locations; letter variables live in the same memory, indexed by their
//! ASCII codes, so mixing the two modes is possible but not advised.
//!
//! # Example
//!
//! ```
//! use seqpool_lib::rpn::Calculator;
//!
//! // y = a + b * exp(x), with a and b set once
//! let mut calc = Calculator::compile("exp b * a +").unwrap();
//! calc.set_var('a', 3.2).unwrap();
//! calc.set_var('b', 1.0).unwrap();
//! let y = calc.run_single(0.0).unwrap();
//! assert!((y - 4.2).abs() < 1e-9);
//! ```

use crate::errors::{Result, SeqpoolError};

/// Maximum stack depth.
const MAX_STACK: usize = 100;

/// Number of memory locations shared by variables and sto/rcl.
const MEMORY_SLOTS: usize = 128;

/// One compiled operation.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Push(f64),
    Load(u8),
    Store(u8),
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Exp,
    Exp2,
    Exp10,
    Ln,
    Log2,
    Log10,
    Sqrt,
    Chs,
    Exch,
    Pop,
    Dup,
    Max,
    Min,
    Step,
    If,
    Sto,
    Rcl,
}

/// A compiled reverse-Polish program with its evaluation stack and memory.
#[derive(Debug)]
pub struct Calculator {
    ops: Vec<Op>,
    stack: Vec<f64>,
    memory: [f64; MEMORY_SLOTS],
}

impl Calculator {
    /// Compile a program string.
    ///
    /// # Errors
    ///
    /// Returns [`SeqpoolError::InvalidExpression`] for any token that is not
    /// a number, a variable, an assignment or a known operator.
    pub fn compile(program: &str) -> Result<Self> {
        let mut ops = Vec::new();
        for token in program.split_whitespace() {
            ops.push(Self::compile_token(token)?);
        }
        Ok(Self { ops, stack: Vec::with_capacity(16), memory: [0.0; MEMORY_SLOTS] })
    }

    fn compile_token(token: &str) -> Result<Op> {
        let op = match token {
            "+" => Op::Add,
            "-" => Op::Sub,
            "*" => Op::Mul,
            "/" => Op::Div,
            "pow" => Op::Pow,
            "exp" => Op::Exp,
            "exp2" => Op::Exp2,
            "exp10" => Op::Exp10,
            "log" => Op::Ln,
            "log2" => Op::Log2,
            "log10" => Op::Log10,
            "sqrt" => Op::Sqrt,
            "chs" => Op::Chs,
            "exch" => Op::Exch,
            "pop" => Op::Pop,
            "dup" => Op::Dup,
            "max" => Op::Max,
            "min" => Op::Min,
            "step" => Op::Step,
            "if" => Op::If,
            "sto" => Op::Sto,
            "rcl" => Op::Rcl,
            _ => return Self::compile_operand(token),
        };
        Ok(op)
    }

    fn compile_operand(token: &str) -> Result<Op> {
        if let Some(name) = token.strip_prefix('=') {
            if let Some(var) = single_letter(name) {
                return Ok(Op::Store(var));
            }
        } else if let Some(var) = single_letter(token) {
            return Ok(Op::Load(var));
        } else if let Ok(value) = token.parse::<f64>() {
            // parse() accepts forms like "inf" and "nan"; restrict literals
            // to ordinary signed decimals.
            if token.bytes().all(|b| b.is_ascii_digit() || b == b'.' || b == b'-') {
                return Ok(Op::Push(value));
            }
        }
        Err(SeqpoolError::InvalidExpression { token: token.to_string() })
    }

    /// Set a single-letter variable before running.
    ///
    /// # Errors
    ///
    /// Returns [`SeqpoolError::InvalidExpression`] if `name` is not an
    /// ASCII letter.
    pub fn set_var(&mut self, name: char, value: f64) -> Result<()> {
        if !name.is_ascii_alphabetic() {
            return Err(SeqpoolError::InvalidExpression { token: name.to_string() });
        }
        self.memory[name as usize] = value;
        Ok(())
    }

    /// Push a value on the stack, e.g. an input to the next run.
    ///
    /// # Errors
    ///
    /// Returns [`SeqpoolError::StackOverflow`] at the depth limit.
    pub fn push(&mut self, value: f64) -> Result<()> {
        if self.stack.len() >= MAX_STACK {
            return Err(SeqpoolError::StackOverflow { limit: MAX_STACK });
        }
        self.stack.push(value);
        Ok(())
    }

    /// Pop the top of the stack.
    ///
    /// # Errors
    ///
    /// Returns [`SeqpoolError::StackUnderflow`] if the stack is empty.
    pub fn pop(&mut self) -> Result<f64> {
        self.pop_for("pop")
    }

    /// Discard everything on the stack.
    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }

    /// Current stack depth.
    #[must_use]
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Execute the compiled program and pop the result.
    ///
    /// The stack is not cleared first, so values pushed beforehand are
    /// visible to the program; anything left below the result stays on the
    /// stack for inspection.
    ///
    /// # Errors
    ///
    /// Propagates stack underflow/overflow and memory range errors.
    pub fn run(&mut self) -> Result<f64> {
        for i in 0..self.ops.len() {
            let op = self.ops[i];
            self.apply(op)?;
        }
        self.pop_for("run")
    }

    /// Push `value`, run the program, clear the stack and return the result.
    ///
    /// # Errors
    ///
    /// As [`run`](Self::run).
    pub fn run_single(&mut self, value: f64) -> Result<f64> {
        self.push(value)?;
        let result = self.run();
        self.clear_stack();
        result
    }

    fn apply(&mut self, op: Op) -> Result<()> {
        match op {
            Op::Push(value) => self.push(value)?,
            Op::Load(var) => {
                let value = self.memory[var as usize];
                self.push(value)?;
            }
            Op::Store(var) => {
                let value = self.pop_for("=")?;
                self.memory[var as usize] = value;
            }
            Op::Add => self.binary("+", |x, y| x + y)?,
            Op::Sub => self.binary("-", |x, y| x - y)?,
            Op::Mul => self.binary("*", |x, y| x * y)?,
            Op::Div => self.binary("/", |x, y| x / y)?,
            Op::Pow => self.binary("pow", f64::powf)?,
            Op::Exp => self.unary("exp", f64::exp)?,
            Op::Exp2 => self.unary("exp2", f64::exp2)?,
            Op::Exp10 => self.unary("exp10", |x| 10f64.powf(x))?,
            Op::Ln => self.unary("log", f64::ln)?,
            Op::Log2 => self.unary("log2", f64::log2)?,
            Op::Log10 => self.unary("log10", f64::log10)?,
            Op::Sqrt => self.unary("sqrt", f64::sqrt)?,
            Op::Chs => self.unary("chs", |x| -x)?,
            Op::Step => self.unary("step", |x| if x < 0.0 { 0.0 } else { 1.0 })?,
            Op::Exch => {
                let y = self.pop_for("exch")?;
                let x = self.pop_for("exch")?;
                self.push(y)?;
                self.push(x)?;
            }
            Op::Pop => {
                self.pop_for("pop")?;
            }
            Op::Dup => {
                let top = *self
                    .stack
                    .last()
                    .ok_or_else(|| SeqpoolError::StackUnderflow { operation: "dup".to_string() })?;
                self.push(top)?;
            }
            Op::Max => self.binary("max", f64::max)?,
            Op::Min => self.binary("min", f64::min)?,
            Op::If => {
                let test = self.pop_for("if")?;
                if test < 0.0 {
                    self.pop_for("if")?;
                } else {
                    let chosen = self.pop_for("if")?;
                    self.pop_for("if")?;
                    self.push(chosen)?;
                }
            }
            Op::Sto => {
                let index = self.memory_index()?;
                let value = self.pop_for("sto")?;
                self.memory[index] = value;
            }
            Op::Rcl => {
                let index = self.memory_index()?;
                let value = self.memory[index];
                self.push(value)?;
            }
        }
        Ok(())
    }

    fn pop_for(&mut self, operation: &str) -> Result<f64> {
        self.stack
            .pop()
            .ok_or_else(|| SeqpoolError::StackUnderflow { operation: operation.to_string() })
    }

    fn unary(&mut self, operation: &str, f: impl Fn(f64) -> f64) -> Result<()> {
        let x = self.pop_for(operation)?;
        self.push(f(x))
    }

    fn binary(&mut self, operation: &str, f: impl Fn(f64, f64) -> f64) -> Result<()> {
        let y = self.pop_for(operation)?;
        let x = self.pop_for(operation)?;
        self.push(f(x, y))
    }

    /// Pop a memory index, tolerating floating-point fuzz around integers.
    fn memory_index(&mut self) -> Result<usize> {
        #[allow(clippy::cast_possible_truncation)]
        let index = (self.pop_for("sto/rcl")? + 0.01).floor() as i64;
        usize::try_from(index)
            .ok()
            .filter(|&slot| slot < MEMORY_SLOTS)
            .ok_or(SeqpoolError::MemoryOutOfRange { index, limit: MEMORY_SLOTS })
    }
}

/// Returns the byte of a one-character ASCII-letter token, if that's what it is.
fn single_letter(token: &str) -> Option<u8> {
    let mut bytes = token.bytes();
    match (bytes.next(), bytes.next()) {
        (Some(b), None) if b.is_ascii_alphabetic() => Some(b),
        _ => None,
    }
}
