use crate::algebra::{
    lex::{self, CharKind},
    Group, Node, Number, Operator, ParenthesizedGroup, Variable,
};
use std::{collections::BTreeMap, ops::Range};
use thiserror::Error;

/// Parse a sequence of [`Node`]s from some text.
pub fn parse(src: &str) -> Result<Vec<Node>, ParseError> {
    parse_with(src, true)
}

/// Parse text, optionally rejecting relational operators (`=`, `<`, ...).
pub fn parse_with(
    src: &str,
    allow_relational: bool,
) -> Result<Vec<Node>, ParseError> {
    let chars: Vec<char> = lex::normalize(src).chars().collect();
    let pairs = match_parentheses(&chars)?;

    Parser::new(&chars, &pairs, allow_relational).parse(0..chars.len())
}

/// Check that every kind of bracket is balanced, returning the index of the
/// matching closing bracket for each opening one.
fn match_parentheses(
    chars: &[char],
) -> Result<BTreeMap<usize, usize>, ParseError> {
    let mut stack = Vec::new();
    let mut pairs = BTreeMap::new();

    for (index, &c) in chars.iter().enumerate() {
        match c {
            '(' | '[' | '{' => stack.push((index, c)),
            ')' | ']' | '}' => match stack.pop() {
                Some((open, opening)) if closes(opening) == c => {
                    pairs.insert(open, index);
                },
                _ => {
                    return Err(ParseError::UnmatchedParenthesis {
                        index,
                        closing: true,
                    })
                },
            },
            _ => {},
        }
    }

    match stack.first() {
        Some(&(index, _)) => Err(ParseError::UnmatchedParenthesis {
            index,
            closing: false,
        }),
        None => Ok(pairs),
    }
}

fn closes(opening: char) -> char {
    match opening {
        '[' => ']',
        '{' => '}',
        _ => ')',
    }
}

/// A single left-to-right scanner.
///
/// Parenthesis interiors and exponents are handed to a fresh [`Parser`] over
/// the same characters, after which the cursor jumps past the consumed span.
#[derive(Debug)]
struct Parser<'a> {
    chars: &'a [char],
    pairs: &'a BTreeMap<usize, usize>,
    allow_relational: bool,
    nodes: Vec<Node>,
    pending: Pending,
    last: Last,
    scientific: Option<Scientific>,
}

impl<'a> Parser<'a> {
    fn new(
        chars: &'a [char],
        pairs: &'a BTreeMap<usize, usize>,
        allow_relational: bool,
    ) -> Self {
        Parser {
            chars,
            pairs,
            allow_relational,
            nodes: Vec::new(),
            pending: Pending::default(),
            last: Last::Nothing,
            scientific: None,
        }
    }

    fn parse(mut self, span: Range<usize>) -> Result<Vec<Node>, ParseError> {
        let mut cursor = span.start;

        while cursor < span.end {
            cursor = self.step(cursor, span.end)?;
        }

        self.finish_scientific()?;
        self.flush();

        Ok(self.nodes)
    }

    fn sub_parse(&self, span: Range<usize>) -> Result<Vec<Node>, ParseError> {
        Parser::new(self.chars, self.pairs, false).parse(span)
    }

    /// Handle the character at `index`, returning where to continue from.
    fn step(&mut self, index: usize, end: usize) -> Result<usize, ParseError> {
        let c = self.chars[index];

        if self.scientific_step(c, index)? {
            return Ok(index + 1);
        }

        let kind = lex::classify(c);

        match kind {
            CharKind::Digit(_) | CharKind::DecimalPoint => {},
            _ => self.pending.reading_fraction = false,
        }

        match kind {
            CharKind::Whitespace => {},
            CharKind::Digit(digit) => {
                if self.last == Last::Variable {
                    return Err(ParseError::AmbiguousDigit { index });
                }
                if !self.pending.group.power.is_empty() {
                    self.flush();
                }

                self.pending.push_digit(digit);
                self.last = Last::Term;
            },
            CharKind::DecimalPoint => {
                if self.last == Last::Variable {
                    return Err(ParseError::AmbiguousDigit { index });
                }

                self.pending.reading_fraction = true;
                self.pending.places = 0;
                self.pending.touched = true;
                self.last = Last::Term;
            },
            CharKind::Sign => match self.last {
                Last::Nothing
                | Last::Operator
                | Last::Negation
                | Last::Relational => {
                    self.pending.negative = !self.pending.negative;
                    self.last = Last::Negation;
                },
                Last::Term | Last::Variable => {
                    self.flush();
                    self.pending.negative = true;
                    self.last = Last::Negation;
                },
            },
            CharKind::Operator(op) => {
                self.flush();
                self.nodes.push(op.into());
                self.last = Last::Operator;
            },
            CharKind::Relational(op) => {
                if !self.allow_relational {
                    return Err(ParseError::RelationalNotAllowed { index });
                }

                self.flush();
                self.nodes.push(op.into());
                self.last = Last::Relational;
            },
            CharKind::OpenParen => {
                let close = self.closing(index)?;
                let negative = if self.pending.touched {
                    self.flush();
                    false
                } else {
                    std::mem::take(&mut self.pending.negative)
                };

                let groups = self.sub_parse(index + 1..close)?;
                if groups.is_empty() {
                    return Err(ParseError::EmptyParentheses { index });
                }

                self.nodes.push(Node::Parenthesized(ParenthesizedGroup {
                    groups,
                    power: Vec::new(),
                    negative,
                }));
                self.last = Last::Term;

                return Ok(close + 1);
            },
            CharKind::CloseParen => {
                return Err(ParseError::UnmatchedParenthesis {
                    index,
                    closing: true,
                });
            },
            CharKind::Power => {
                let (body, next) = self.exponent_span(index, end)?;
                let power = self.sub_parse(body)?;

                if power.is_empty() {
                    return Err(ParseError::DanglingExponent { index });
                }

                self.attach_power(power, index)?;
                self.last = Last::Term;

                return Ok(next);
            },
            CharKind::Variable(name) => {
                if !name.is_alphabetic() {
                    return Err(ParseError::InvalidCharacter {
                        character: name,
                        index,
                    });
                }

                if self.pending.group.variable.is_some()
                    || !self.pending.group.power.is_empty()
                {
                    self.flush();
                    self.nodes.push(Operator::Multiply.into());
                }

                if !self.pending.has_digits {
                    self.pending.group.number = Number::one();
                }
                self.pending.group.variable = Some(Variable::new(name));
                self.pending.touched = true;
                self.last = Last::Variable;
            },
            CharKind::Scientific => {
                let mantissa = self
                    .take_pending()
                    .ok_or(ParseError::MissingMantissa { index })?;

                self.scientific = Some(Scientific {
                    mantissa,
                    exponent: Number::zero(),
                    negative: false,
                    has_digits: false,
                    index,
                });
                self.last = Last::Term;
            },
            CharKind::Exclamation => {
                return Err(ParseError::Reserved {
                    character: c,
                    index,
                });
            },
        }

        Ok(index + 1)
    }

    /// Feed a character to the pending scientific-notation exponent, if there
    /// is one. Returns `false` when the character belongs to the main scanner.
    fn scientific_step(
        &mut self,
        c: char,
        index: usize,
    ) -> Result<bool, ParseError> {
        let sci = match self.scientific.as_mut() {
            Some(sci) => sci,
            None => return Ok(false),
        };

        let consumed = match lex::classify(c) {
            CharKind::Digit(digit) => {
                sci.exponent.push_digit(digit);
                sci.has_digits = true;
                true
            },
            CharKind::Whitespace => true,
            CharKind::Sign if !sci.has_digits => {
                sci.negative = !sci.negative;
                true
            },
            CharKind::Operator(Operator::Add) if !sci.has_digits => true,
            CharKind::Operator(op) if !sci.has_digits => {
                return Err(ParseError::InvalidScientificOperator {
                    found: op.symbol(),
                    index,
                });
            },
            _ => false,
        };

        if !consumed {
            self.finish_scientific()?;
        }

        Ok(consumed)
    }

    /// Emit `(mantissa * 10^exponent)` for a completed scientific literal.
    fn finish_scientific(&mut self) -> Result<(), ParseError> {
        let sci = match self.scientific.take() {
            Some(sci) => sci,
            None => return Ok(()),
        };

        if !sci.has_digits {
            return Err(ParseError::MissingExponent { index: sci.index });
        }

        let mut exponent = sci.exponent;
        exponent.set_negative(sci.negative);
        let ten = Group::term(Number::from_integer(10), None)
            .with_power(vec![Group::term(exponent, None).into()]);

        self.nodes.push(
            ParenthesizedGroup::new(vec![
                sci.mantissa.into(),
                Operator::Multiply.into(),
                ten.into(),
            ])
            .into(),
        );
        self.last = Last::Term;

        Ok(())
    }

    fn closing(&self, open: usize) -> Result<usize, ParseError> {
        self.pairs
            .get(&open)
            .copied()
            .ok_or(ParseError::UnmatchedParenthesis {
                index: open,
                closing: false,
            })
    }

    /// Find the text making up the exponent after the `^` at `caret`.
    ///
    /// Returns the span to parse and the index to continue scanning from.
    fn exponent_span(
        &self,
        caret: usize,
        end: usize,
    ) -> Result<(Range<usize>, usize), ParseError> {
        let mut start = caret + 1;
        while start < end && self.chars[start].is_whitespace() {
            start += 1;
        }

        if start >= end {
            return Err(ParseError::DanglingExponent { index: caret });
        }

        if lex::classify(self.chars[start]) == CharKind::OpenParen {
            let close = self.closing(start)?;
            return Ok((start + 1..close, close + 1));
        }

        let mut cursor = start;
        let mut after_object = false;

        while cursor < end {
            match lex::classify(self.chars[cursor]) {
                CharKind::Digit(_)
                | CharKind::DecimalPoint
                | CharKind::Variable(_)
                | CharKind::Scientific => after_object = true,
                CharKind::Power => after_object = false,
                CharKind::Sign | CharKind::Whitespace if !after_object => {},
                CharKind::OpenParen if !after_object => {
                    cursor = self.closing(cursor)?;
                    after_object = true;
                },
                _ => break,
            }

            cursor += 1;
        }

        Ok((start..cursor, cursor))
    }

    /// Attach an exponent to the term being built, or to the most recently
    /// emitted one.
    fn attach_power(
        &mut self,
        power: Vec<Node>,
        caret: usize,
    ) -> Result<(), ParseError> {
        if self.pending.touched && self.pending.group.power.is_empty() {
            self.pending.group.power = power;
            return Ok(());
        }

        if !self.pending.touched
            && !self.pending.negative
            && self.last == Last::Term
        {
            match self.nodes.last_mut() {
                Some(Node::Group(group)) if group.power.is_empty() => {
                    group.power = power;
                    return Ok(());
                },
                Some(Node::Parenthesized(parens)) if parens.power.is_empty() => {
                    parens.power = power;
                    return Ok(());
                },
                _ => {},
            }
        }

        Err(ParseError::DanglingExponent { index: caret })
    }

    fn take_pending(&mut self) -> Option<Group> {
        let Pending {
            mut group,
            negative,
            touched,
            ..
        } = std::mem::take(&mut self.pending);

        if touched {
            group.number.set_negative(negative);
            Some(group)
        } else {
            None
        }
    }

    fn flush(&mut self) {
        if let Some(group) = self.take_pending() {
            self.nodes.push(group.into());
        }
    }
}

/// The term currently being accumulated.
#[derive(Debug)]
struct Pending {
    group: Group,
    negative: bool,
    touched: bool,
    has_digits: bool,
    reading_fraction: bool,
    places: u32,
}

impl Pending {
    fn push_digit(&mut self, digit: u32) {
        if self.reading_fraction {
            self.places += 1;
            self.group.number.push_fractional_digit(digit, self.places);
        } else {
            self.group.number.push_digit(digit);
        }

        self.has_digits = true;
        self.touched = true;
    }
}

impl Default for Pending {
    fn default() -> Self {
        Pending {
            group: Group::placeholder(),
            negative: false,
            touched: false,
            has_digits: false,
            reading_fraction: false,
            places: 0,
        }
    }
}

#[derive(Debug)]
struct Scientific {
    mantissa: Group,
    exponent: Number,
    negative: bool,
    has_digits: bool,
    index: usize,
}

/// The last significant thing the scanner saw.
#[derive(Debug, Copy, Clone, PartialEq)]
enum Last {
    Nothing,
    Operator,
    Negation,
    Relational,
    Term,
    Variable,
}

/// Possible errors that may occur while parsing.
///
/// Indices are character offsets into the input after `>=`, `<=`, `==` and
/// `!=` have been collapsed into single characters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unmatched parenthesis at index {index}")]
    UnmatchedParenthesis { index: usize, closing: bool },
    #[error("a digit directly follows a variable at index {index}")]
    AmbiguousDigit { index: usize },
    #[error("\"{found}\" can't follow scientific notation (index {index})")]
    InvalidScientificOperator { found: char, index: usize },
    #[error("scientific notation at index {index} has no exponent")]
    MissingExponent { index: usize },
    #[error("scientific notation at index {index} has nothing to scale")]
    MissingMantissa { index: usize },
    #[error("relational operators aren't allowed here (index {index})")]
    RelationalNotAllowed { index: usize },
    #[error("the exponent at index {index} has nothing to apply to")]
    DanglingExponent { index: usize },
    #[error("empty parentheses at index {index}")]
    EmptyParentheses { index: usize },
    #[error("\"{character}\" is reserved (index {index})")]
    Reserved { character: char, index: usize },
    #[error("invalid character \"{character}\" at index {index}")]
    InvalidCharacter { character: char, index: usize },
}
