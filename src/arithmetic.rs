//! Evaluating variable-free sequences.

use crate::{
    algebra::{
        analyze, ops, to_text, Group, Node, Operator, ParenthesizedGroup,
        Positions,
    },
    SolveError,
};
use num_rational::BigRational;
use std::iter;

/// Evaluate a cleaned, variable-free sequence to a single exact value.
///
/// Parentheses and fractions are collapsed first, then powers, then `*` and
/// `/` left to right, then `+` left to right. Anything other than one value
/// left over means the sequence was malformed.
pub fn evaluate(nodes: &[Node]) -> Result<BigRational, SolveError> {
    let mut nodes = nodes.to_vec();

    // collapsing one of these doesn't move the others
    let positions = analyze(&nodes);
    for &index in positions.parentheses.iter().chain(&positions.fractions) {
        let value = match &nodes[index] {
            Node::Parenthesized(parens) => parenthesized_value(parens)?,
            Node::Fraction(fraction) => ops::divide(
                &evaluate(fraction.numerator())?,
                &evaluate(fraction.denominator())?,
            )?,
            _ => continue,
        };
        nodes[index] = Group::constant(&value).into();
    }

    for &index in &analyze(&nodes).powers {
        if let Node::Group(group) = &nodes[index] {
            let value = group_value(group)?;
            nodes[index] = Group::constant(&value).into();
        }
    }

    reduce(&mut nodes, Positions::multiplications_and_divisions)?;
    reduce(&mut nodes, Positions::additions_and_subtractions)?;

    match nodes.as_slice() {
        [node] => constant_value(node),
        _ => Err(SolveError::Malformed(to_text(&nodes))),
    }
}

/// Evaluate a (possibly chained) comparison such as `1 < 2 < 3`.
///
/// Each relation compares the values either side of it and the results are
/// combined with a logical AND.
pub fn evaluate_relations(nodes: &[Node]) -> Result<bool, SolveError> {
    let mut sides = nodes.split(|node| match node {
        Node::Relational(_) => true,
        _ => false,
    });
    let relations = nodes.iter().filter_map(|node| match node {
        Node::Relational(op) => Some(*op),
        _ => None,
    });

    let first = sides.next().unwrap_or_default();
    let mut left = evaluate(first)?;
    let mut holds = true;

    for op in relations {
        let right = evaluate(sides.next().unwrap_or_default())?;
        holds &= op.holds(&left, &right);
        left = right;
    }

    Ok(holds)
}

/// The value of a variable-free [`Group`], applying its power.
pub(crate) fn group_value(group: &Group) -> Result<BigRational, SolveError> {
    if group.variable.is_some() {
        return Err(SolveError::Malformed(group.to_string()));
    }

    if group.power.is_empty() {
        Ok(group.coefficient())
    } else {
        let exponent = evaluate(&group.power)?;
        Ok(ops::signed_pow(&group.coefficient(), &exponent)?)
    }
}

fn parenthesized_value(
    parens: &ParenthesizedGroup,
) -> Result<BigRational, SolveError> {
    let mut value = evaluate(&parens.groups)?;

    if !parens.power.is_empty() {
        value = ops::pow(&value, &evaluate(&parens.power)?)?;
    }

    if parens.negative {
        value = -value;
    }

    Ok(value)
}

fn constant_value(node: &Node) -> Result<BigRational, SolveError> {
    match node {
        Node::Group(group) => group_value(group),
        other => Err(SolveError::Malformed(other.to_string())),
    }
}

/// Repeatedly combine the operands around the first of some operators,
/// re-indexing after every splice.
fn reduce<F>(nodes: &mut Vec<Node>, operators: F) -> Result<(), SolveError>
where
    F: Fn(&Positions) -> Vec<usize>,
{
    loop {
        let index = match operators(&analyze(nodes)).first() {
            Some(&index) => index,
            None => return Ok(()),
        };

        let op = match nodes.get(index) {
            Some(Node::Operator(op)) => *op,
            _ => return Err(SolveError::Malformed(to_text(nodes))),
        };
        if index == 0 || index + 1 >= nodes.len() {
            return Err(SolveError::Malformed(to_text(nodes)));
        }

        let left = constant_value(&nodes[index - 1])?;
        let right = constant_value(&nodes[index + 1])?;

        let value = match op {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
            Operator::Divide => ops::divide(&left, &right)?,
        };

        nodes.splice(
            index - 1..=index + 1,
            iter::once(Group::constant(&value).into()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algebra::parse, clean::clean_equation};
    use num_bigint::BigInt;

    fn ratio(numer: i64, denom: i64) -> BigRational {
        BigRational::new(BigInt::from(numer), BigInt::from(denom))
    }

    macro_rules! evaluate_test {
        ($name:ident, $src:expr => $numer:expr, $denom:expr) => {
            #[test]
            fn $name() {
                let nodes = clean_equation(parse($src).unwrap()).unwrap();

                let got = evaluate(&nodes).unwrap();

                assert_eq!(got, ratio($numer, $denom));
            }
        };
    }

    evaluate_test!(addition, "960 + 600 + 700" => 2260, 1);
    evaluate_test!(subtraction, "10 - 4 - 3" => 3, 1);
    evaluate_test!(multiplication_before_addition, "2 + 3 * 4" => 14, 1);
    evaluate_test!(division_left_to_right, "8 / 4 / 2" => 1, 1);
    evaluate_test!(mixed_left_to_right, "8 / 4 * 2" => 4, 1);
    evaluate_test!(exact_thirds, "1 / 3 + 1 / 3" => 2, 3);
    evaluate_test!(parentheses, "(1 + 2)(3 + 4)" => 21, 1);
    evaluate_test!(negated_parentheses, "10 - (2 + 3)" => 5, 1);
    evaluate_test!(powered_parentheses, "(1 + 2)^2" => 9, 1);
    evaluate_test!(sign_survives_even_powers, "-3^2" => -9, 1);
    evaluate_test!(negative_exponent, "2^-2" => 1, 4);
    evaluate_test!(nested_power, "2^(1 + 2)" => 8, 1);
    evaluate_test!(scientific, "3E2 + 1" => 301, 1);
    evaluate_test!(decimals, "0.1 + 0.2" => 3, 10);

    #[test]
    fn division_by_an_evaluated_zero() {
        let nodes = clean_equation(parse("1 / (2 - 2)").unwrap()).unwrap();

        let got = evaluate(&nodes).unwrap_err();

        assert_eq!(got, SolveError::DivisionByZero);
    }

    #[test]
    fn inexact_powers_are_an_error() {
        let nodes = clean_equation(parse("2^0.5").unwrap()).unwrap();

        let got = evaluate(&nodes).unwrap_err();

        assert!(matches!(got, SolveError::Evaluation(_)));
    }

    #[test]
    fn variables_cant_be_evaluated() {
        let nodes = clean_equation(parse("2x + 1").unwrap()).unwrap();

        assert!(evaluate(&nodes).is_err());
    }

    #[test]
    fn chained_relations() {
        let evaluate = |src| {
            evaluate_relations(&clean_equation(parse(src).unwrap()).unwrap())
                .unwrap()
        };

        assert!(evaluate("1 < 2 < 3"));
        assert!(!evaluate("1 < 3 < 2"));
        assert!(evaluate("2 * 3 = 6"));
        assert!(evaluate("1 ≠ 2"));
        assert!(evaluate("3 ≥ 3 > 2.5"));
    }
}
