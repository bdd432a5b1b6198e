//! The symbolic data model, its text form, and exact numeric operations.

mod expr;
pub mod lex;
pub mod ops;
mod parse;
mod positions;
mod render;

pub use expr::{
    collect_variables, contains_variable, negate_sequence, starts_summand,
    Fraction, Group, Node, Number, Operator, ParenthesizedGroup,
    RelationalOperator, TermKey, Variable, ZeroDenominator,
};
pub use parse::{parse, parse_with, ParseError};
pub use positions::{analyze, split, Positions};
pub use render::{to_text, Text};
