use super::{join, sides::positive_integer_power, summands, Sides};
use crate::{
    algebra::{
        ops::{self, Divisors},
        Group, Node, Number, Operator, ParenthesizedGroup,
    },
    arithmetic::group_value,
    solve::Options,
    SolveError,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed};
use std::iter;

/// Divide both sides by the largest integer which divides every term.
pub(crate) fn cancel_common_factor(sides: Sides, options: &Options) -> Sides {
    let limit = options.factor_limit;
    let common = intersect(
        sequence_divisors(&sides.left, limit),
        sequence_divisors(&sides.right, limit),
    );

    let largest = match common {
        Divisors::Known(found) => found.iter().copied().max().unwrap_or(1),
        Divisors::TooLarge => {
            log::debug!(
                "Not looking for common factors, a coefficient is at least {}",
                limit
            );
            return sides;
        },
        Divisors::Unconstrained => return sides,
    };

    if largest <= 1 {
        return sides;
    }

    log::trace!("Cancelling the common factor {}", largest);

    let divisor = BigRational::from_integer(BigInt::from(largest));
    Sides {
        left: divide_all(&sides.left, &divisor),
        op: sides.op,
        right: divide_all(&sides.right, &divisor),
    }
}

/// The integers dividing every summand of a sequence.
pub(crate) fn sequence_divisors(nodes: &[Node], limit: u64) -> Divisors {
    summands(nodes)
        .iter()
        .map(|summand| product_divisors(summand, limit))
        .fold(None, |acc, divisors| match acc {
            None => Some(divisors),
            Some(acc) => Some(intersect(acc, divisors)),
        })
        .unwrap_or_else(Divisors::only_one)
}

/// A product is divisible by anything which divides one of its factors.
fn product_divisors(summand: &[Node], limit: u64) -> Divisors {
    summand
        .iter()
        .filter(|node| node.is_term())
        .map(|node| term_divisors(node, limit))
        .fold(Divisors::only_one(), union)
}

fn term_divisors(node: &Node, limit: u64) -> Divisors {
    match node {
        Node::Group(group)
            if group.variable.is_some() || group.power.is_empty() =>
        {
            ops::divisors(&group.coefficient(), limit)
        },
        Node::Group(group) if positive_integer_power(&group.power).is_some() => {
            ops::divisors(&group.coefficient(), limit)
        },
        Node::Parenthesized(parens)
            if parens.power.is_empty()
                || positive_integer_power(&parens.power).is_some() =>
        {
            sequence_divisors(&parens.groups, limit)
        },
        Node::Fraction(fraction) => {
            sequence_divisors(fraction.numerator(), limit)
        },
        _ => Divisors::only_one(),
    }
}

pub(crate) fn intersect(left: Divisors, right: Divisors) -> Divisors {
    match (left, right) {
        (Divisors::TooLarge, _) | (_, Divisors::TooLarge) => Divisors::TooLarge,
        (Divisors::Unconstrained, other) | (other, Divisors::Unconstrained) => {
            other
        },
        (Divisors::Known(left), Divisors::Known(right)) => {
            Divisors::Known(left.intersection(&right).copied().collect())
        },
    }
}

fn union(left: Divisors, right: Divisors) -> Divisors {
    match (left, right) {
        (Divisors::TooLarge, _) | (_, Divisors::TooLarge) => Divisors::TooLarge,
        (Divisors::Unconstrained, _) | (_, Divisors::Unconstrained) => {
            Divisors::Unconstrained
        },
        (Divisors::Known(mut left), Divisors::Known(right)) => {
            left.extend(right);
            Divisors::Known(left)
        },
    }
}

/// Divide every additive term of a sequence by `divisor`.
///
/// In a product only one factor gets divided, preferring one which divides
/// evenly.
pub fn divide_all(nodes: &[Node], divisor: &BigRational) -> Vec<Node> {
    join(
        summands(nodes)
            .into_iter()
            .map(|summand| divide_summand(summand, divisor)),
    )
}

fn divide_summand(mut summand: Vec<Node>, divisor: &BigRational) -> Vec<Node> {
    let mut terms = summand
        .iter()
        .enumerate()
        .filter(|(_, node)| node.is_term())
        .map(|(index, _)| index);

    let first = match terms.next() {
        Some(first) => first,
        None => return summand,
    };
    let target = iter::once(first)
        .chain(terms)
        .find(|&index| divides_evenly(&summand[index], divisor))
        .unwrap_or(first);

    let divided = divide_term(&summand[target], divisor);
    summand.splice(target..=target, divided);

    summand
}

fn divides_evenly(node: &Node, divisor: &BigRational) -> bool {
    match node {
        Node::Group(group) => (group.coefficient() / divisor).is_integer(),
        Node::Parenthesized(parens) => {
            summands(&parens.groups).iter().all(|summand| {
                summand.iter().any(|node| divides_evenly(node, divisor))
            })
        },
        Node::Fraction(fraction) => summands(fraction.numerator())
            .iter()
            .all(|summand| summand.iter().any(|node| divides_evenly(node, divisor))),
        Node::Operator(_) | Node::Relational(_) => false,
    }
}

fn divide_term(node: &Node, divisor: &BigRational) -> Vec<Node> {
    match node {
        Node::Group(group)
            if group.variable.is_some() || group.power.is_empty() =>
        {
            let coefficient = group.coefficient() / divisor;
            vec![group.with_coefficient(&coefficient).into()]
        },
        Node::Group(group) => divide_powered_constant(group, divisor),
        Node::Parenthesized(parens) => divide_parenthesized(parens, divisor),
        Node::Fraction(fraction) => {
            let numerator = divide_all(fraction.numerator(), divisor);
            vec![fraction.with_numerator(numerator).into()]
        },
        other => vec![other.clone()],
    }
}

/// `b^n / d` becomes `(b / d) * b^(n - 1)`.
fn divide_powered_constant(group: &Group, divisor: &BigRational) -> Vec<Node> {
    let exponent = match positive_integer_power(&group.power) {
        Some(1) => {
            let coefficient = group.coefficient() / divisor;
            return vec![Group::constant(&coefficient).into()];
        },
        Some(exponent) => exponent,
        None => return scaled(Node::Group(group.clone()), divisor),
    };

    let magnitude = group.coefficient().abs();
    let quotient = &magnitude / divisor;
    let remaining = Group::constant(&magnitude).with_power(integer_power(exponent - 1));

    let mut divided: Vec<Node> = if quotient.is_one() {
        vec![remaining.into()]
    } else {
        vec![
            Group::constant(&quotient).into(),
            Operator::Multiply.into(),
            remaining.into(),
        ]
    };

    if group.number.is_negative() {
        divided[0] = divided[0].clone().negated();
    }

    divided
}

/// `(a)^n / d` becomes `(a / d) * (a)^(n - 1)`.
fn divide_parenthesized(
    parens: &ParenthesizedGroup,
    divisor: &BigRational,
) -> Vec<Node> {
    let exponent = if parens.power.is_empty() {
        1
    } else {
        match positive_integer_power(&parens.power) {
            Some(exponent) => exponent,
            None => return scaled(Node::Parenthesized(parens.clone()), divisor),
        }
    };

    let quotient = divide_all(&parens.groups, divisor);

    if exponent == 1 {
        return vec![Node::Parenthesized(ParenthesizedGroup {
            groups: quotient,
            power: Vec::new(),
            negative: parens.negative,
        })];
    }

    let quotient = match quotient.as_slice() {
        [single] => single.clone(),
        _ => ParenthesizedGroup::new(quotient).into(),
    };
    let remaining = match (exponent - 1, parens.groups.as_slice()) {
        (1, [single]) => single.clone(),
        (1, _) => ParenthesizedGroup::new(parens.groups.clone()).into(),
        (n, _) => Node::Parenthesized(ParenthesizedGroup {
            groups: parens.groups.clone(),
            power: integer_power(n),
            negative: false,
        }),
    };

    let quotient = if parens.negative {
        quotient.negated()
    } else {
        quotient
    };

    vec![quotient, Operator::Multiply.into(), remaining]
}

fn scaled(node: Node, divisor: &BigRational) -> Vec<Node> {
    if let Node::Group(group) = &node {
        if let Ok(value) = group_value(group) {
            return vec![Group::constant(&(value / divisor)).into()];
        }
    }

    vec![
        Group::constant(&divisor.recip()).into(),
        Operator::Multiply.into(),
        node,
    ]
}

fn integer_power(exponent: u32) -> Vec<Node> {
    if exponent == 1 {
        Vec::new()
    } else {
        let exponent = BigRational::from_integer(BigInt::from(exponent));
        vec![Group::constant(&exponent).into()]
    }
}

/// Multiply two groups together, if the result is still a single group.
///
/// Powers of the same variable are added, so `x^2 * x^3` is `x^5`.
pub fn multiply(left: &Group, right: &Group) -> Result<Option<Group>, SolveError> {
    let (left, right) = match (resolved(left), resolved(right)) {
        (Some(left), Some(right)) => (left, right),
        _ => return Ok(None),
    };
    let coefficient = left.coefficient() * right.coefficient();

    match (&left.variable, &right.variable) {
        (None, None) => Ok(Some(Group::constant(&coefficient))),
        (Some(_), None) => Ok(Some(left.with_coefficient(&coefficient))),
        (None, Some(_)) => Ok(Some(right.with_coefficient(&coefficient))),
        (Some(a), Some(b)) if a != b => Err(SolveError::MixedVariables),
        (Some(variable), Some(_)) => {
            let exponent = match (exponent(&left), exponent(&right)) {
                (Some(a), Some(b)) => a + b,
                _ => return Ok(None),
            };
            let power = if exponent.is_one() {
                Vec::new()
            } else {
                vec![Group::constant(&exponent).into()]
            };

            Ok(Some(Group {
                variable: Some(variable.clone()),
                number: Number::from_value(&coefficient),
                power,
            }))
        },
    }
}

/// Constants with a power are folded into a plain number first.
fn resolved(group: &Group) -> Option<Group> {
    if group.variable.is_none() && !group.power.is_empty() {
        group_value(group).ok().map(|value| Group::constant(&value))
    } else {
        Some(group.clone())
    }
}

fn exponent(group: &Group) -> Option<BigRational> {
    if group.power.is_empty() {
        return Some(BigRational::one());
    }
    if crate::algebra::contains_variable(&group.power) {
        return None;
    }

    crate::arithmetic::evaluate(&group.power).ok()
}

/// Replace every `group * group` with their product.
pub(crate) fn fold_multiplications(
    mut nodes: Vec<Node>,
) -> Result<Vec<Node>, SolveError> {
    let mut index = 1;

    while index + 1 < nodes.len() {
        if nodes[index].is_operator(Operator::Multiply) {
            let product = match (nodes[index - 1].as_group(), nodes[index + 1].as_group())
            {
                (Some(left), Some(right)) => multiply(left, right)?,
                _ => None,
            };

            if let Some(product) = product {
                nodes.splice(index - 1..=index + 1, iter::once(product.into()));
                continue;
            }
        }

        index += 1;
    }

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algebra::{parse, to_text, Variable},
        clean::clean_equation,
    };

    fn nodes(src: &str) -> Vec<Node> { clean_equation(parse(src).unwrap()).unwrap() }

    fn int(value: i64) -> BigRational { BigRational::from_integer(value.into()) }

    fn group(src: &str) -> Group {
        match nodes(src).as_slice() {
            [Node::Group(group)] => group.clone(),
            other => panic!("Expected a single group, found {:?}", other),
        }
    }

    macro_rules! divide_test {
        ($name:ident, $src:expr, $divisor:expr => $should_be:expr) => {
            #[test]
            fn $name() {
                let got = divide_all(&nodes($src), &int($divisor));

                assert_eq!(to_text(&got), $should_be);
            }
        };
    }

    divide_test!(plain_terms, "15 + 25 - 10", 5 => "3 + 5 - 2");
    divide_test!(one_factor_per_product, "25 * 10 + 25", 5 => "5 * 10 + 5");
    divide_test!(product_prefers_an_even_factor, "3 * 10 + 25", 5 => "3 * 2 + 5");
    divide_test!(powered_constant, "5^2 - 5", 5 => "5 - 1");
    divide_test!(negative_powered_constant, "5^2 - 5^2", 5 => "5 - 5");
    divide_test!(inside_parentheses, "(5^2 - 5^2) - 10", 5 => "(5 - 5) - 2");
    divide_test!(powered_parentheses, "(5x)^3", 5 => "x * (5x)^2");
    divide_test!(
        mixed,
        "(2x)^2 - 4 + (10 - 6x)", 2 => "x * 2x - 2 + (5 - 3x)"
    );

    macro_rules! multiply_test {
        ($name:ident, $left:expr, $right:expr => $should_be:expr) => {
            #[test]
            fn $name() {
                let got = multiply(&group($left), &group($right)).unwrap();

                assert_eq!(got, Some(group($should_be)));
            }
        };
    }

    multiply_test!(like_variables, "5x", "3x" => "15x^2");
    multiply_test!(powers_are_added, "x^2", "x^3" => "x^5");
    multiply_test!(constants, "7", "2" => "14");
    multiply_test!(constant_and_variable, "7", "2x" => "14x");
    multiply_test!(multiply_powered_constant, "2^3", "x" => "8x");

    #[test]
    fn different_variables_cant_be_multiplied() {
        let x = Group::term(Number::one(), Some(Variable::new('x')));
        let y = Group::term(Number::one(), Some(Variable::new('y')));

        assert_eq!(multiply(&x, &y), Err(SolveError::MixedVariables));
    }

    #[test]
    fn inexact_constants_are_left_alone() {
        let got = multiply(&group("2^0.5"), &group("x")).unwrap();

        assert_eq!(got, None);
    }

    #[test]
    fn fold_chained_multiplications() {
        let got = fold_multiplications(nodes("2 * 3x * x + 1")).unwrap();

        assert_eq!(to_text(&got), "6x^2 + 1");
    }

    #[test]
    fn fold_skips_parentheses() {
        let got = fold_multiplications(nodes("2(x + 1)")).unwrap();

        assert_eq!(to_text(&got), "2 * (x + 1)");
    }

    #[test]
    fn cancel_divides_both_sides() {
        let sides = Sides::from_nodes(&nodes("2x + 4 = 8")).unwrap();

        let got = cancel_common_factor(sides, &Options::default());

        assert_eq!(to_text(&got.to_nodes()), "x + 2 = 4");
    }

    #[test]
    fn cancel_respects_the_factor_limit() {
        let sides = Sides::from_nodes(&nodes("200x = 400")).unwrap();
        let options = Options {
            factor_limit: 100,
            ..Options::default()
        };

        let got = cancel_common_factor(sides.clone(), &options);

        assert_eq!(got, sides);
    }

    #[test]
    fn divisors_of_a_sequence() {
        let got = sequence_divisors(&nodes("6x + 9"), 1000);

        assert_eq!(got, Divisors::Known(vec![1, 3].into_iter().collect()));
    }
}
