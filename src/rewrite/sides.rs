use super::{join, negate_summand, summands, Sides};
use crate::{
    algebra::{
        contains_variable, ops, Fraction, Group, Node, Operator,
        RelationalOperator, Variable,
    },
    arithmetic, Range, Solution, SolveError, Value,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

pub(crate) enum Crossing {
    /// Both sides ended up identical.
    Settled(Value),
    Moved(Sides),
}

/// Move constants to the right and terms containing the variable to the left,
/// negating whatever changes sides.
pub(crate) fn cross(sides: Sides, variable: &Variable) -> Crossing {
    if sides.left == sides.right {
        let zero = BigRational::zero();
        let value = if sides.op.holds(&zero, &zero) {
            Value::TrueForAll(variable.clone())
        } else {
            Value::NoSolution
        };
        return Crossing::Settled(value);
    }

    let (left_keep, left_move): (Vec<_>, Vec<_>) = summands(&sides.left)
        .into_iter()
        .partition(|summand| contains_variable(summand));
    let (right_move, right_keep): (Vec<_>, Vec<_>) = summands(&sides.right)
        .into_iter()
        .partition(|summand| contains_variable(summand));

    if left_move.is_empty() && right_move.is_empty() {
        return Crossing::Moved(sides);
    }

    log::trace!(
        "Moving {} term(s) right and {} term(s) left",
        left_move.len(),
        right_move.len()
    );

    let left = left_keep
        .into_iter()
        .chain(right_move.into_iter().map(negate_summand));
    let right = right_keep
        .into_iter()
        .chain(left_move.into_iter().map(negate_summand));

    Crossing::Moved(Sides {
        left: join(left),
        op: sides.op,
        right: join(right),
    })
}

/// Solve `c·x^n <op> k` directly.
///
/// Returns `None` when the equation isn't in that form yet.
pub(crate) fn closed_form(
    sides: &Sides,
    variable: &Variable,
) -> Result<Option<Solution>, SolveError> {
    let (term, op, other) =
        match (variable_term(&sides.left), variable_term(&sides.right)) {
            (Some(term), None) if !contains_variable(&sides.right) => {
                (term, sides.op, &sides.right)
            },
            (None, Some(term)) if !contains_variable(&sides.left) => {
                (term, sides.op.flipped(), &sides.left)
            },
            _ => return Ok(None),
        };

    let exponent = match exponent(term) {
        Some(exponent) => exponent,
        None => return Ok(None),
    };

    let coefficient = term.coefficient();
    let constant = arithmetic::evaluate(other)?;

    let mut solution = Solution::variables();
    for value in isolate(&coefficient, exponent, op, &constant, variable)? {
        solution.record(variable.clone(), value);
    }

    Ok(Some(solution))
}

fn variable_term(side: &[Node]) -> Option<&Group> {
    match side {
        [Node::Group(group)] if group.variable.is_some() => Some(group),
        _ => None,
    }
}

/// The variable's exponent, when it's a positive integer.
fn exponent(term: &Group) -> Option<u32> {
    if term.power.is_empty() {
        Some(1)
    } else {
        positive_integer_power(&term.power)
    }
}

/// Evaluate a variable-free power, accepting only positive integers.
pub(crate) fn positive_integer_power(power: &[Node]) -> Option<u32> {
    if power.is_empty() || contains_variable(power) {
        return None;
    }

    let value = arithmetic::evaluate(power).ok()?;
    if value.is_integer() && value.is_positive() {
        value.to_integer().to_u32()
    } else {
        None
    }
}

fn isolate(
    coefficient: &BigRational,
    exponent: u32,
    op: RelationalOperator,
    constant: &BigRational,
    variable: &Variable,
) -> Result<Vec<Value>, SolveError> {
    if coefficient.is_zero() {
        let value = if op.holds(&BigRational::zero(), constant) {
            Value::TrueForAll(variable.clone())
        } else {
            Value::NoSolution
        };
        return Ok(vec![value]);
    }

    if op == RelationalOperator::NotEqual {
        return Err(SolveError::Unsupported("\"≠\" with a variable"));
    }

    let op = if coefficient.is_negative() {
        op.flipped()
    } else {
        op
    };
    let quotient = constant / coefficient;

    if exponent == 1 {
        return match Range::from_relation(op, &quotient) {
            Some(range) => Ok(vec![Value::Range(range)]),
            None => Ok(vec![exact_quotient(coefficient, constant)?]),
        };
    }

    if op != RelationalOperator::Equal {
        return Err(SolveError::Unsupported(
            "inequalities on a power of the variable",
        ));
    }
    if exponent > ops::MAX_EXPONENT {
        return Err(ops::EvaluationError::ExponentTooLarge(exponent.to_string())
            .into());
    }

    if quotient.is_zero() {
        return Ok(vec![Value::number(&quotient)]);
    }

    let even = exponent % 2 == 0;
    if even && quotient.is_negative() {
        return Ok(vec![Value::NoSolution]);
    }

    let root = match ops::exact_root(&quotient.abs(), exponent) {
        Some(root) => Value::number(&root),
        None => root_of(&quotient.abs(), exponent),
    };

    let values = if even {
        let negative = negated(&root);
        vec![root, negative]
    } else if quotient.is_negative() {
        vec![negated(&root)]
    } else {
        vec![root]
    };

    Ok(values)
}

/// `constant / coefficient`, kept as a fraction when both are integers and
/// the division isn't exact.
fn exact_quotient(
    coefficient: &BigRational,
    constant: &BigRational,
) -> Result<Value, SolveError> {
    let quotient = constant / coefficient;

    if quotient.is_integer()
        || !coefficient.is_integer()
        || !constant.is_integer()
    {
        return Ok(Value::number(&quotient));
    }

    let numerator = Group::constant(&BigRational::from_integer(
        quotient.numer().clone(),
    ));
    let denominator = Group::constant(&BigRational::from_integer(
        quotient.denom().clone(),
    ));
    let fraction = Fraction::new(vec![numerator.into()], vec![denominator.into()])?;

    Ok(Value::Fraction(fraction))
}

/// `value^(1 / n)`, written as `p^(1 / n) / q^(1 / n)` when `value` is `p/q`
/// so whichever half has an exact root loses its power.
fn root_of(value: &BigRational, n: u32) -> Value {
    let numerator = integer_root(value.numer(), n);

    if value.is_integer() {
        Value::compound(numerator)
    } else {
        Value::compound_quotient(numerator, integer_root(value.denom(), n))
    }
}

fn integer_root(value: &BigInt, n: u32) -> Node {
    let value = BigRational::from_integer(value.clone());
    if let Some(root) = ops::exact_root(&value, n) {
        return Group::constant(&root).into();
    }

    let power = vec![
        Group::constant(&BigRational::one()).into(),
        Operator::Divide.into(),
        Group::constant(&BigRational::from_integer(BigInt::from(n))).into(),
    ];

    Group::constant(&ops::normalize(&value)).with_power(power).into()
}

fn negated(value: &Value) -> Value {
    match value {
        Value::Number(number) => Value::Number(number.negated()),
        Value::Compound(nodes) => {
            let mut nodes = nodes.clone();
            if let Some(first) = nodes.first_mut() {
                *first = first.clone().negated();
            }
            Value::Compound(nodes)
        },
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algebra::parse, clean::clean_equation, Binding};

    fn sides(src: &str) -> Sides {
        Sides::from_nodes(&clean_equation(parse(src).unwrap()).unwrap()).unwrap()
    }

    fn int(value: i64) -> BigRational { BigRational::from_integer(value.into()) }

    fn closed(src: &str) -> Option<Binding> {
        let x = Variable::new('x');

        closed_form(&sides(src), &x)
            .unwrap()
            .and_then(|solution| solution.get("x").cloned())
    }

    #[test]
    fn cross_moves_terms() {
        let x = Variable::new('x');

        let got = match cross(sides("3 + 2x = x - 4"), &x) {
            Crossing::Moved(sides) => crate::algebra::to_text(&sides.to_nodes()),
            Crossing::Settled(value) => panic!("Unexpected {:?}", value),
        };

        assert_eq!(got, "2x - x = -4 - 3");
    }

    #[test]
    fn identical_sides_settle() {
        let x = Variable::new('x');

        match cross(sides("x + 1 = x + 1"), &x) {
            Crossing::Settled(Value::TrueForAll(v)) => assert_eq!(v, x),
            _ => panic!("Should have settled"),
        }
        match cross(sides("x < x"), &x) {
            Crossing::Settled(Value::NoSolution) => {},
            _ => panic!("Should have no solution"),
        }
    }

    #[test]
    fn linear_closed_forms() {
        assert_eq!(closed("2x = 4"), Some(Binding::Single(Value::number(&int(2)))));
        assert_eq!(
            closed("4 = 0.5x"),
            Some(Binding::Single(Value::number(&int(8))))
        );
        assert_eq!(closed("0x = 5"), Some(Binding::Single(Value::NoSolution)));
        assert_eq!(
            closed("0x = 0"),
            Some(Binding::Single(Value::TrueForAll(Variable::new('x'))))
        );
        assert_eq!(closed("2x + 1 = 4"), None);
    }

    #[test]
    fn uneven_integer_division_is_a_fraction() {
        let got = closed("-4x = 6").unwrap();

        match got {
            Binding::Single(Value::Fraction(fraction)) => {
                assert_eq!(fraction.to_string(), "-3/2")
            },
            other => panic!("Unexpected {:?}", other),
        }
    }

    #[test]
    fn even_powers_of_negative_numbers() {
        assert_eq!(closed("x^2 = -4"), Some(Binding::Single(Value::NoSolution)));
        assert_eq!(
            closed("x^3 = -8"),
            Some(Binding::Single(Value::number(&int(-2))))
        );
    }

    #[test]
    fn not_equal_is_unsupported() {
        let x = Variable::new('x');

        let got = closed_form(&sides("x ≠ 2"), &x).unwrap_err();

        assert!(matches!(got, SolveError::Unsupported(_)));
    }

    #[test]
    fn ranges() {
        let got = closed("2x ≤ 3").unwrap();

        let should_be = Range {
            lower: None,
            upper: Some(crate::Bound {
                value: crate::algebra::Number::from_value(&BigRational::new(
                    3.into(),
                    2.into(),
                )),
                inclusive: true,
            }),
        };
        assert_eq!(got, Binding::Single(Value::Range(should_be)));
    }
}
