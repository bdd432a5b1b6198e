//! Exact arithmetic and single-variable equation solving.
//!
//! Text is parsed into a flat sequence of [`Node`]s, which is either
//! evaluated directly (arithmetic and comparisons) or rewritten step by step
//! until the unknown is isolated.
//!
//! ```rust
//! let solution = exact_algebra::solve("2x + 3 = 7").unwrap();
//! assert_eq!(solution.to_string(), "x = 2");
//!
//! let total = exact_algebra::solve("960 + 600 + 700").unwrap();
//! assert_eq!(total.to_string(), "2260");
//! ```

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod algebra;
mod arithmetic;
mod classify;
mod clean;
mod equations;
pub mod rewrite;
mod solution;
mod solve;

pub use algebra::{
    parse, to_text, Fraction, Group, Node, Number, Operator,
    ParenthesizedGroup, ParseError, RelationalOperator, Text, Variable,
};
pub use arithmetic::{evaluate, evaluate_relations};
pub use classify::{classify, ProblemKind};
pub use clean::{clean_equation, divisions_to_fractions};
pub use equations::Equation;
pub use solution::{Binding, Bound, Range, Solution, Value};
pub use solve::{
    solve, solve_nodes, solve_with, Context, Logger, Options, Snapshot,
    SolveError, Trace,
};
