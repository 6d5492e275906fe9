//! Compile and run a reverse-Polish program.

use anyhow::Result;
use clap::Parser;
use seqpool_lib::rpn::Calculator;

use crate::commands::command::Command;

/// Evaluate a reverse-Polish expression.
#[derive(Debug, Parser)]
#[command(
    name = "eval",
    about = "Evaluate a reverse-Polish expression",
    long_about = r#"
Compile a reverse-Polish program once and run it.

Operators: + - * / pow exp exp2 exp10 log log2 log10 sqrt chs exch pop dup
max min step if sto rcl. Single letters are variables; "=x" assigns the top
of the stack to x.

EXAMPLES:

  # 2^9 + log10(5) - 10^3
  seqpool eval "9 exp2 5 log10 + 3 exp10 -"

  # y = a + b * exp(x) for several x
  seqpool eval "exp b * a +" -s a=3.2 -s b=1.0 -m 0 -m 1 -m 2
"#
)]
pub struct Eval {
    /// The program, as whitespace-separated tokens.
    pub program: String,

    /// Variable bindings applied before running, e.g. `-s x=1.5`.
    #[arg(short = 's', long = "set", value_parser = parse_binding)]
    pub set: Vec<(char, f64)>,

    /// Values mapped through the program one at a time, one result per line.
    #[arg(short = 'm', long = "map", allow_hyphen_values = true)]
    pub map: Vec<f64>,
}

/// Parse a `name=value` variable binding.
fn parse_binding(s: &str) -> Result<(char, f64), String> {
    let (name, value) = s.split_once('=').ok_or_else(|| format!("'{s}' is not name=value"))?;
    let mut chars = name.chars();
    let name = match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => c,
        _ => return Err(format!("variable name '{name}' must be a single letter")),
    };
    let value: f64 = value.parse().map_err(|e| format!("bad value for '{name}': {e}"))?;
    Ok((name, value))
}

impl Command for Eval {
    fn execute(&self, _command_line: &str) -> Result<()> {
        let mut calc = Calculator::compile(&self.program)?;
        for &(name, value) in &self.set {
            calc.set_var(name, value)?;
        }

        if self.map.is_empty() {
            println!("{}", calc.run()?);
        } else {
            for &x in &self.map {
                println!("{}", calc.run_single(x)?);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binding() {
        assert_eq!(parse_binding("x=1.5"), Ok(('x', 1.5)));
        assert_eq!(parse_binding("A=-2"), Ok(('A', -2.0)));
        assert!(parse_binding("xy=1").is_err());
        assert!(parse_binding("x").is_err());
        assert!(parse_binding("x=abc").is_err());
    }
}
