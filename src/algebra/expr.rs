use crate::algebra::{ops, render::Text};
use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use smol_str::SmolStr;
use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
};
use thiserror::Error;

/// An exact decimal, split into its whole and fractional magnitudes with the
/// sign kept separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number {
    integer: BigUint,
    fraction: BigRational,
    negative: bool,
}

impl Number {
    pub fn zero() -> Self {
        Number {
            integer: BigUint::zero(),
            fraction: BigRational::zero(),
            negative: false,
        }
    }

    pub fn one() -> Self { Number::from_integer(1) }

    pub fn from_integer(value: i64) -> Self {
        Number::from_value(&BigRational::from_integer(BigInt::from(value)))
    }

    /// Decompose a signed value.
    pub fn from_value(value: &BigRational) -> Self {
        let magnitude = value.abs();
        let whole = magnitude.trunc();

        Number {
            integer: whole.to_integer().magnitude().clone(),
            fraction: magnitude - whole,
            negative: value.is_negative(),
        }
    }

    /// The signed value.
    pub fn value(&self) -> BigRational {
        let magnitude = self.magnitude();

        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }

    pub fn magnitude(&self) -> BigRational {
        BigRational::from_integer(BigInt::from(self.integer.clone()))
            + &self.fraction
    }

    pub fn integer(&self) -> &BigUint { &self.integer }

    pub fn fraction(&self) -> &BigRational { &self.fraction }

    pub fn is_negative(&self) -> bool { self.negative }

    pub fn is_zero(&self) -> bool {
        self.integer.is_zero() && self.fraction.is_zero()
    }

    pub fn is_one(&self) -> bool {
        !self.negative && self.integer.is_one() && self.fraction.is_zero()
    }

    pub fn negated(&self) -> Number {
        Number {
            negative: !self.negative,
            ..self.clone()
        }
    }

    pub(crate) fn set_negative(&mut self, negative: bool) {
        self.negative = negative;
    }

    pub(crate) fn push_digit(&mut self, digit: u32) {
        self.integer = &self.integer * 10u32 + digit;
    }

    /// Append a digit `place` positions after the decimal point.
    pub(crate) fn push_fractional_digit(&mut self, digit: u32, place: u32) {
        self.fraction += BigRational::from_integer(BigInt::from(digit))
            * ops::ten_to_the(-i64::from(place));
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", ops::to_plain(&self.value()))
    }
}

/// A single-letter unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    name: SmolStr,
}

impl Variable {
    pub fn new(name: char) -> Self {
        let mut buffer = [0; 4];
        Variable {
            name: SmolStr::new(name.encode_utf8(&mut buffer)),
        }
    }

    pub fn name(&self) -> &str { &self.name }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A binary operator joining two terms.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }
}

/// A relation between the two sides of an equation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationalOperator {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
}

impl RelationalOperator {
    pub fn symbol(self) -> char {
        match self {
            RelationalOperator::Equal => '=',
            RelationalOperator::NotEqual => '≠',
            RelationalOperator::Less => '<',
            RelationalOperator::Greater => '>',
            RelationalOperator::LessOrEqual => '≤',
            RelationalOperator::GreaterOrEqual => '≥',
        }
    }

    /// Does `left <op> right` hold?
    pub fn holds(self, left: &BigRational, right: &BigRational) -> bool {
        match self {
            RelationalOperator::Equal => left == right,
            RelationalOperator::NotEqual => left != right,
            RelationalOperator::Less => left < right,
            RelationalOperator::Greater => left > right,
            RelationalOperator::LessOrEqual => left <= right,
            RelationalOperator::GreaterOrEqual => left >= right,
        }
    }

    /// The relation that holds after both sides are multiplied by a negative
    /// number.
    pub fn flipped(self) -> Self {
        match self {
            RelationalOperator::Less => RelationalOperator::Greater,
            RelationalOperator::Greater => RelationalOperator::Less,
            RelationalOperator::LessOrEqual => RelationalOperator::GreaterOrEqual,
            RelationalOperator::GreaterOrEqual => RelationalOperator::LessOrEqual,
            other => other,
        }
    }
}

/// The atomic term, `number * variable^power`.
///
/// Without a variable the power applies to the number itself, so `5^2` is a
/// single [`Group`]. An empty power means an exponent of 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Group {
    pub variable: Option<Variable>,
    pub number: Number,
    pub power: Vec<Node>,
}

impl Group {
    /// The "nothing accumulated yet" group.
    pub fn placeholder() -> Self {
        Group {
            variable: None,
            number: Number::zero(),
            power: Vec::new(),
        }
    }

    pub fn constant(value: &BigRational) -> Self {
        Group {
            variable: None,
            number: Number::from_value(value),
            power: Vec::new(),
        }
    }

    pub fn term(number: Number, variable: Option<Variable>) -> Self {
        Group {
            variable,
            number,
            power: Vec::new(),
        }
    }

    pub fn with_power(self, power: Vec<Node>) -> Self { Group { power, ..self } }

    pub fn is_placeholder(&self) -> bool {
        self.variable.is_none() && self.power.is_empty() && self.number.is_zero()
    }

    /// A plain number, with neither variable nor power.
    pub fn is_constant(&self) -> bool {
        self.variable.is_none() && self.power.is_empty()
    }

    pub fn coefficient(&self) -> BigRational { self.number.value() }

    /// The identity used when combining like terms. The coefficient is
    /// ignored, so `5x` and `3x` share a key.
    pub fn key(&self) -> TermKey {
        TermKey {
            variable: self.variable.clone(),
            power: self.power.clone(),
        }
    }

    pub fn negated(&self) -> Group {
        Group {
            number: self.number.negated(),
            ..self.clone()
        }
    }

    pub fn with_coefficient(&self, value: &BigRational) -> Group {
        Group {
            number: Number::from_value(value),
            ..self.clone()
        }
    }
}

/// A [`Group`]'s identity for like-term purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TermKey {
    pub variable: Option<Variable>,
    pub power: Vec<Node>,
}

impl TermKey {
    /// A zero-valued term with this identity.
    pub fn zero_term(&self) -> Group {
        Group {
            variable: self.variable.clone(),
            number: Number::zero(),
            power: self.power.clone(),
        }
    }
}

/// `(...)`, with an optional exponent and leading minus.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParenthesizedGroup {
    pub groups: Vec<Node>,
    pub power: Vec<Node>,
    pub negative: bool,
}

impl ParenthesizedGroup {
    pub fn new(groups: Vec<Node>) -> Self {
        ParenthesizedGroup {
            groups,
            power: Vec::new(),
            negative: false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Error)]
#[error("a fraction's denominator can't be a literal zero")]
pub struct ZeroDenominator;

/// `numerator/denominator`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fraction {
    numerator: Vec<Node>,
    denominator: Vec<Node>,
}

impl Fraction {
    /// Create a new [`Fraction`], rejecting a denominator that is written as
    /// the literal `0`.
    ///
    /// Denominators which only *evaluate* to zero (e.g. `2 - 2`) are accepted.
    pub fn new(
        numerator: Vec<Node>,
        denominator: Vec<Node>,
    ) -> Result<Self, ZeroDenominator> {
        match denominator.as_slice() {
            [Node::Group(group)] if group.is_placeholder() => {
                Err(ZeroDenominator)
            },
            _ => Ok(Fraction {
                numerator,
                denominator,
            }),
        }
    }

    pub fn numerator(&self) -> &[Node] { &self.numerator }

    pub fn denominator(&self) -> &[Node] { &self.denominator }

    pub fn into_parts(self) -> (Vec<Node>, Vec<Node>) {
        (self.numerator, self.denominator)
    }

    /// Swap out the numerator, keeping the (already checked) denominator.
    pub fn with_numerator(&self, numerator: Vec<Node>) -> Fraction {
        Fraction {
            numerator,
            denominator: self.denominator.clone(),
        }
    }
}

/// One element of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Group(Group),
    Operator(Operator),
    Parenthesized(ParenthesizedGroup),
    Fraction(Fraction),
    Relational(RelationalOperator),
}

impl Node {
    /// Is this something with a value (as opposed to an operator)?
    pub fn is_term(&self) -> bool {
        match self {
            Node::Group(_) | Node::Parenthesized(_) | Node::Fraction(_) => true,
            Node::Operator(_) | Node::Relational(_) => false,
        }
    }

    pub fn is_operator(&self, op: Operator) -> bool {
        *self == Node::Operator(op)
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn is_negative_term(&self) -> bool {
        match self {
            Node::Group(group) => group.number.is_negative(),
            Node::Parenthesized(parens) => parens.negative,
            _ => false,
        }
    }

    /// Flip the sign of a term. Operators are returned unchanged.
    pub fn negated(self) -> Node {
        match self {
            Node::Group(group) => Node::Group(group.negated()),
            Node::Parenthesized(parens) => {
                Node::Parenthesized(ParenthesizedGroup {
                    negative: !parens.negative,
                    ..parens
                })
            },
            Node::Fraction(fraction) => Node::Fraction(Fraction {
                numerator: negate_sequence(fraction.numerator),
                denominator: fraction.denominator,
            }),
            other => other,
        }
    }

    /// Every variable mentioned by this node, including those nested inside
    /// powers, parentheses and fractions.
    pub fn collect_variables(&self, variables: &mut BTreeSet<Variable>) {
        match self {
            Node::Group(group) => {
                if let Some(variable) = &group.variable {
                    variables.insert(variable.clone());
                }
                collect_variables(&group.power, variables);
            },
            Node::Parenthesized(parens) => {
                collect_variables(&parens.groups, variables);
                collect_variables(&parens.power, variables);
            },
            Node::Fraction(fraction) => {
                collect_variables(&fraction.numerator, variables);
                collect_variables(&fraction.denominator, variables);
            },
            Node::Operator(_) | Node::Relational(_) => {},
        }
    }
}

pub fn collect_variables(nodes: &[Node], variables: &mut BTreeSet<Variable>) {
    for node in nodes {
        node.collect_variables(variables);
    }
}

/// Does the term at `index` begin a new additive term?
///
/// Besides explicit `+`/`-` operators, two adjacent terms are added unless the
/// second is a non-negative parenthesized group (`2(x + 1)`).
pub fn starts_summand(nodes: &[Node], index: usize) -> bool {
    let node = match nodes.get(index) {
        Some(node) if node.is_term() => node,
        _ => return false,
    };

    match index.checked_sub(1).map(|i| &nodes[i]) {
        None => true,
        Some(Node::Operator(op)) => {
            *op == Operator::Add || *op == Operator::Subtract
        },
        Some(Node::Relational(_)) => true,
        Some(_) => match node {
            Node::Parenthesized(parens) => parens.negative,
            _ => true,
        },
    }
}

/// Negate every additive term in a sequence.
pub fn negate_sequence(nodes: Vec<Node>) -> Vec<Node> {
    let starts: Vec<bool> =
        (0..nodes.len()).map(|i| starts_summand(&nodes, i)).collect();

    nodes
        .into_iter()
        .zip(starts)
        .map(|(node, start)| if start { node.negated() } else { node })
        .collect()
}

pub fn contains_variable(nodes: &[Node]) -> bool {
    let mut variables = BTreeSet::new();
    collect_variables(nodes, &mut variables);
    !variables.is_empty()
}

impl From<Group> for Node {
    fn from(group: Group) -> Node { Node::Group(group) }
}

impl From<Operator> for Node {
    fn from(op: Operator) -> Node { Node::Operator(op) }
}

impl From<ParenthesizedGroup> for Node {
    fn from(parens: ParenthesizedGroup) -> Node { Node::Parenthesized(parens) }
}

impl From<Fraction> for Node {
    fn from(fraction: Fraction) -> Node { Node::Fraction(fraction) }
}

impl From<RelationalOperator> for Node {
    fn from(op: RelationalOperator) -> Node { Node::Relational(op) }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Text(std::slice::from_ref(self)).fmt(f)
    }
}

impl Display for Group {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Node::Group(self.clone()).fmt(f)
    }
}

impl Display for Fraction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Node::Fraction(self.clone()).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_keep_their_sign_separately() {
        let value = BigRational::new(BigInt::from(-13), BigInt::from(4));
        let number = Number::from_value(&value);

        assert!(number.is_negative());
        assert_eq!(number.integer(), &BigUint::from(3_u32));
        assert_eq!(
            number.fraction(),
            &BigRational::new(BigInt::from(1), BigInt::from(4))
        );
        assert_eq!(number.value(), value);
        assert_eq!(number.to_string(), "-3.25");
    }

    #[test]
    fn like_terms_share_a_key() {
        let x = Some(Variable::new('x'));
        let five_x = Group::term(Number::from_integer(5), x.clone());
        let three_x = Group::term(Number::from_integer(3), x);
        let three = Group::term(Number::from_integer(3), None);

        assert_eq!(five_x.key(), three_x.key());
        assert_ne!(three_x.key(), three.key());
        assert_ne!(five_x, three_x);
    }

    #[test]
    fn literal_zero_denominators_are_rejected() {
        let one = vec![Node::Group(Group::constant(&BigRational::one()))];
        let zero = vec![Node::Group(Group::constant(&BigRational::zero()))];
        let two_minus_two = vec![
            Node::Group(Group::constant(&BigRational::from_integer(2.into()))),
            Node::Operator(Operator::Add),
            Node::Group(Group::constant(&BigRational::from_integer(
                (-2).into(),
            ))),
        ];

        assert_eq!(Fraction::new(one.clone(), zero), Err(ZeroDenominator));
        assert!(Fraction::new(one, two_minus_two).is_ok());
    }

    #[test]
    fn relations_flip_when_multiplied_by_a_negative() {
        let one = BigRational::one();
        let two = BigRational::from_integer(2.into());

        assert!(RelationalOperator::Less.holds(&one, &two));
        assert!(RelationalOperator::Less.flipped().holds(&two, &one));
        assert_eq!(
            RelationalOperator::Equal.flipped(),
            RelationalOperator::Equal
        );
    }
}
