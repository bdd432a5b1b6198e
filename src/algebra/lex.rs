use crate::algebra::{Operator, RelationalOperator};

/// The lexical category of a single character.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CharKind {
    Digit(u32),
    DecimalPoint,
    /// `-`, which is either negation or subtraction depending on context.
    Sign,
    Operator(Operator),
    OpenParen,
    CloseParen,
    Power,
    Relational(RelationalOperator),
    /// Reserved for factorials.
    Exclamation,
    /// The uppercase `E` in `3E14`.
    Scientific,
    Whitespace,
    Variable(char),
}

/// Classify a character.
///
/// Anything not otherwise recognised is a variable, so the parser is
/// responsible for rejecting non-alphabetic "variables". Lowercase `e` is a
/// variable, not a scientific marker.
pub fn classify(c: char) -> CharKind {
    match c {
        '0'..='9' => CharKind::Digit(c as u32 - '0' as u32),
        '.' => CharKind::DecimalPoint,
        '-' => CharKind::Sign,
        '+' => CharKind::Operator(Operator::Add),
        '*' => CharKind::Operator(Operator::Multiply),
        '/' => CharKind::Operator(Operator::Divide),
        '(' | '[' | '{' => CharKind::OpenParen,
        ')' | ']' | '}' => CharKind::CloseParen,
        '^' => CharKind::Power,
        '=' => CharKind::Relational(RelationalOperator::Equal),
        '≠' => CharKind::Relational(RelationalOperator::NotEqual),
        '<' => CharKind::Relational(RelationalOperator::Less),
        '>' => CharKind::Relational(RelationalOperator::Greater),
        '≤' => CharKind::Relational(RelationalOperator::LessOrEqual),
        '≥' => CharKind::Relational(RelationalOperator::GreaterOrEqual),
        '!' => CharKind::Exclamation,
        'E' => CharKind::Scientific,
        space if space.is_whitespace() => CharKind::Whitespace,
        other => CharKind::Variable(other),
    }
}

/// Rewrite the two-character relational spellings into their single glyphs.
pub fn normalize(src: &str) -> String {
    src.replace(">=", "≥")
        .replace("<=", "≤")
        .replace("!=", "≠")
        .replace("==", "=")
}
