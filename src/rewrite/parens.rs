use super::{
    factors::{fold_multiplications, multiply},
    join, negate_summand,
    sides::positive_integer_power,
    summands,
    terms::combine_side,
};
use crate::{
    algebra::{
        contains_variable, Fraction, Group, Node, Number, Operator,
        ParenthesizedGroup, Text,
    },
    arithmetic, SolveError,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;

/// Simplify and remove parentheses, one summand at a time.
///
/// Variable-free parentheses are evaluated, parentheses around a single term
/// are dropped, a lone `(...)` is spliced into the side and `a * (b + c)` is
/// distributed.
pub(crate) fn clean_side(side: Vec<Node>) -> Result<Vec<Node>, SolveError> {
    let mut cleaned = Vec::new();

    for summand in summands(&side) {
        let summand = summand
            .into_iter()
            .map(simplify)
            .collect::<Result<Vec<_>, _>>()?;
        cleaned.extend(expand(summand)?);
    }

    Ok(join(cleaned))
}

fn simplify(node: Node) -> Result<Node, SolveError> {
    match node {
        Node::Parenthesized(parens) => simplify_parenthesized(parens),
        Node::Fraction(fraction) => {
            let (numerator, denominator) = fraction.into_parts();
            let fraction = Fraction::new(
                simplify_sequence(numerator)?,
                simplify_sequence(denominator)?,
            )?;
            Ok(fraction.into())
        },
        other => Ok(other),
    }
}

fn simplify_sequence(nodes: Vec<Node>) -> Result<Vec<Node>, SolveError> {
    if contains_variable(&nodes) {
        let nodes = fold_multiplications(nodes)?;
        let nodes = clean_side(nodes)?;
        Ok(combine_side(&nodes))
    } else {
        let value = arithmetic::evaluate(&nodes)?;
        Ok(vec![Group::constant(&value).into()])
    }
}

fn simplify_parenthesized(
    parens: ParenthesizedGroup,
) -> Result<Node, SolveError> {
    let parens = ParenthesizedGroup {
        groups: simplify_sequence(parens.groups)?,
        ..parens
    };

    if !contains_variable(&parens.groups) && !contains_variable(&parens.power) {
        let value = arithmetic::evaluate(&[Node::Parenthesized(parens)])?;
        return Ok(Group::constant(&value).into());
    }

    if parens.power.is_empty() {
        return Ok(match parens.groups.as_slice() {
            [single] if single.is_term() => {
                if parens.negative {
                    single.clone().negated()
                } else {
                    single.clone()
                }
            },
            _ => parens.into(),
        });
    }

    match parens.groups.as_slice() {
        [Node::Group(group)] if group.variable.is_some() => {
            let raised = raise(group, &parens.power)?;
            if parens.negative {
                Ok(raised.negated().into())
            } else {
                Ok(raised.into())
            }
        },
        _ => Err(SolveError::Unsupported(
            "raising a parenthesized sum to a power",
        )),
    }
}

/// `(c·x^e)^n` is `c^n·x^(e·n)`.
fn raise(group: &Group, power: &[Node]) -> Result<Group, SolveError> {
    let unsupported = || SolveError::Unsupported("non-integer powers of a term");

    let n = positive_integer_power(power).ok_or_else(unsupported)?;
    let e = if group.power.is_empty() {
        1
    } else {
        positive_integer_power(&group.power).ok_or_else(unsupported)?
    };

    let coefficient = num_traits::pow(group.coefficient(), n as usize);
    let exponent = BigRational::from_integer(BigInt::from(e) * BigInt::from(n));
    let power = if exponent.is_one() {
        Vec::new()
    } else {
        vec![Group::constant(&exponent).into()]
    };

    Ok(Group {
        variable: group.variable.clone(),
        number: Number::from_value(&coefficient),
        power,
    })
}

/// Remove the parentheses from a summand, if possible.
fn expand(summand: Vec<Node>) -> Result<Vec<Vec<Node>>, SolveError> {
    if let [Node::Parenthesized(parens)] = summand.as_slice() {
        if parens.power.is_empty() {
            let inner = summands(&parens.groups);
            return Ok(if parens.negative {
                inner.into_iter().map(negate_summand).collect()
            } else {
                inner
            });
        }
    }

    let factors: Vec<&[Node]> = summand
        .split(|node| node.is_operator(Operator::Multiply))
        .collect();
    let single = factors.iter().all(|factor| factor.len() == 1);
    let parenthesized: Vec<&ParenthesizedGroup> = factors
        .iter()
        .filter_map(|factor| match factor {
            [Node::Parenthesized(parens)] => Some(parens),
            _ => None,
        })
        .collect();
    let groups: Vec<&Group> = factors
        .iter()
        .filter_map(|factor| factor.first().and_then(Node::as_group))
        .collect();

    let parens = match parenthesized.as_slice() {
        [parens]
            if single
                && parens.power.is_empty()
                && groups.len() + 1 == factors.len() =>
        {
            *parens
        },
        _ => return Ok(vec![summand.clone()]),
    };

    let mut multiplier = Group::constant(&BigRational::one());
    for group in groups {
        multiplier = match multiply(&multiplier, group)? {
            Some(product) => product,
            None => return Ok(vec![summand.clone()]),
        };
    }
    if parens.negative {
        multiplier = multiplier.negated();
    }

    log::trace!("Distributing {} over ({})", multiplier, Text(&parens.groups));

    summands(&parens.groups)
        .into_iter()
        .map(|inner| distribute(&multiplier, inner))
        .collect()
}

fn distribute(
    multiplier: &Group,
    summand: Vec<Node>,
) -> Result<Vec<Node>, SolveError> {
    if let [Node::Group(group)] = summand.as_slice() {
        if let Some(product) = multiply(multiplier, group)? {
            return Ok(vec![product.into()]);
        }
    }

    if multiplier.is_constant() && multiplier.coefficient().is_one() {
        return Ok(summand);
    }

    let mut distributed =
        vec![multiplier.clone().into(), Operator::Multiply.into()];
    distributed.extend(summand);
    Ok(distributed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algebra::{parse, to_text},
        clean::clean_equation,
    };

    fn cleaned(src: &str) -> Result<String, SolveError> {
        let nodes = clean_equation(parse(src).unwrap()).unwrap();

        clean_side(nodes).map(|nodes| to_text(&nodes))
    }

    macro_rules! parens_test {
        ($name:ident, $src:expr => $should_be:expr) => {
            #[test]
            fn $name() {
                assert_eq!(cleaned($src).unwrap(), $should_be);
            }
        };
    }

    parens_test!(no_parentheses, "2x + 1" => "2x + 1");
    parens_test!(lone_parentheses, "3 + (x + 1)" => "3 + x + 1");
    parens_test!(negated_parentheses, "-(x + 1)" => "-x - 1");
    parens_test!(distribute_a_constant, "2(x + 3)" => "2x + 6");
    parens_test!(distribute_a_negative, "-2(x - 1)" => "-2x + 2");
    parens_test!(distribute_a_variable, "x(x + 4)" => "x^2 + 4x");
    parens_test!(multiply_by_one, "1 * (x + 1)" => "x + 1");
    parens_test!(evaluate_constants, "3 + (2 + 4)" => "3 + 6");
    parens_test!(nested, "((x + 1))" => "x + 1");
    parens_test!(powered_term, "(2x)^2" => "4x^2");
    parens_test!(negated_powered_term, "-(x^2)^3" => "-x^6");
    parens_test!(single_terms_in_a_product, "(x)(x)" => "x * x");
    parens_test!(single_term_products, "(2x)(3x)" => "2x * 3x");
    parens_test!(negated_single_term, "-(2x) + 1" => "-2x + 1");

    #[test]
    fn powered_sums_are_unsupported() {
        let got = cleaned("(x + 1)^2").unwrap_err();

        assert!(matches!(got, SolveError::Unsupported(_)));
    }
}
