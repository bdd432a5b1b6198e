use super::{
    factors::{divide_all, intersect, sequence_divisors},
    join, summands, Sides,
};
use crate::{
    algebra::{
        contains_variable, negate_sequence, ops, ops::Divisors, Fraction,
        Group, Node, Operator, ParenthesizedGroup,
    },
    arithmetic,
    solve::Options,
    SolveError,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// Get rid of the first top-level fraction.
///
/// The fraction is reduced by any factor its numerator and denominator share.
/// If the denominator is still there afterwards, both sides are multiplied
/// by it.
pub(crate) fn resolve_fractions(
    sides: Sides,
    options: &Options,
) -> Result<Sides, SolveError> {
    let mut left = summands(&sides.left);
    let mut right = summands(&sides.right);

    let location = first_fraction(&left)
        .map(|location| (true, location))
        .or_else(|| first_fraction(&right).map(|location| (false, location)));
    let (in_left, (summand, index)) = match location {
        Some(location) => location,
        None => return Ok(sides),
    };

    let fraction = {
        let holder = if in_left { &left } else { &right };
        match &holder[summand][index] {
            Node::Fraction(fraction) => fraction.clone(),
            _ => return Ok(sides),
        }
    };

    let (numerator, denominator, reduced) = reduce(&fraction, options)?;

    if denominator.is_one() {
        log::trace!("The denominator of \"{}\" cancelled out", fraction);
        let holder = if in_left { &mut left } else { &mut right };
        holder[summand][index] = as_single_node(numerator);
    } else if reduced {
        let holder = if in_left { &mut left } else { &mut right };
        holder[summand][index] =
            Fraction::new(numerator, vec![Group::constant(&denominator).into()])?
                .into();
    } else {
        log::trace!("Multiplying both sides by {}", denominator);

        for (position, part) in left.iter_mut().enumerate() {
            if in_left && position == summand {
                part[index] = as_single_node(numerator.clone());
            } else {
                scale(part, &denominator);
            }
        }
        for (position, part) in right.iter_mut().enumerate() {
            if !in_left && position == summand {
                part[index] = as_single_node(numerator.clone());
            } else {
                scale(part, &denominator);
            }
        }
    }

    Ok(Sides {
        left: join(left),
        op: sides.op,
        right: join(right),
    })
}

fn first_fraction(side: &[Vec<Node>]) -> Option<(usize, usize)> {
    side.iter().enumerate().find_map(|(summand, nodes)| {
        nodes
            .iter()
            .position(|node| matches!(node, Node::Fraction(_)))
            .map(|index| (summand, index))
    })
}

/// Cancel common factors, giving the new numerator, a positive denominator,
/// and whether anything was cancelled.
fn reduce(
    fraction: &Fraction,
    options: &Options,
) -> Result<(Vec<Node>, BigRational, bool), SolveError> {
    if contains_variable(fraction.denominator()) {
        return Err(SolveError::VariableDenominator);
    }

    let mut numerator = if contains_variable(fraction.numerator()) {
        fraction.numerator().to_vec()
    } else {
        let value = arithmetic::evaluate(fraction.numerator())?;
        vec![Group::constant(&value).into()]
    };

    let mut denominator = arithmetic::evaluate(fraction.denominator())?;
    if denominator.is_zero() {
        return Err(SolveError::DivisionByZero);
    }
    if denominator.is_negative() {
        numerator = negate_sequence(numerator);
        denominator = -denominator;
    }

    let limit = options.factor_limit;
    let common = match intersect(
        sequence_divisors(&numerator, limit),
        ops::divisors(&denominator, limit),
    ) {
        Divisors::Known(found) => found.iter().copied().max().unwrap_or(1),
        Divisors::Unconstrained | Divisors::TooLarge => 1,
    };

    if common > 1 {
        let common = BigRational::from_integer(BigInt::from(common));
        numerator = divide_all(&numerator, &common);
        denominator /= common;
    }

    Ok((numerator, denominator, common > 1))
}

fn as_single_node(nodes: Vec<Node>) -> Node {
    match nodes.as_slice() {
        [single] => single.clone(),
        _ => ParenthesizedGroup::new(nodes).into(),
    }
}

/// Multiply a summand by `factor`.
fn scale(summand: &mut Vec<Node>, factor: &BigRational) {
    match summand.first_mut() {
        Some(Node::Group(group))
            if group.variable.is_some() || group.power.is_empty() =>
        {
            let coefficient = group.coefficient() * factor;
            *group = group.with_coefficient(&coefficient);
        },
        Some(_) => {
            let prefix = vec![
                Group::constant(factor).into(),
                Operator::Multiply.into(),
            ];
            summand.splice(0..0, prefix);
        },
        None => {},
    }
}
