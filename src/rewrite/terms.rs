use super::{join, summands, Sides};
use crate::algebra::{contains_variable, Group, Node, TermKey};
use num_traits::Zero;

/// Add up like terms on each side of an equation.
///
/// Only terms standing on their own are combined, so the `2x` in `2x * 3` is
/// left alone. Afterwards zero-valued terms are dropped, although a `0x` is
/// kept as long as it's the last reference to the variable.
pub fn combine_like_terms(sides: Sides) -> Sides {
    let left = combine_side(&sides.left);
    let right = combine_side(&sides.right);

    let variable_terms = summands(&left)
        .iter()
        .chain(summands(&right).iter())
        .filter(|summand| contains_variable(summand) && zero_term(summand).is_none())
        .count();
    let other_variables = variable_terms > 0;

    Sides {
        left: drop_zeros(&left, other_variables),
        op: sides.op,
        right: drop_zeros(&right, other_variables),
    }
}

pub(crate) fn combine_side(side: &[Node]) -> Vec<Node> {
    let mut combined: Vec<Vec<Node>> = Vec::new();
    let mut seen: Vec<(TermKey, usize)> = Vec::new();

    for summand in summands(side) {
        let group = match lone_term(&summand) {
            Some(group) => group.clone(),
            None => {
                combined.push(summand);
                continue;
            },
        };

        let key = group.key();
        let existing = seen
            .iter()
            .find(|(seen_key, _)| *seen_key == key)
            .map(|(_, index)| *index);

        match existing {
            Some(index) => {
                let total = lone_term(&combined[index])
                    .map(|first| first.coefficient() + group.coefficient());
                if let Some(total) = total {
                    combined[index] = vec![group.with_coefficient(&total).into()];
                }
            },
            None => {
                seen.push((key, combined.len()));
                combined.push(summand);
            },
        }
    }

    join(combined)
}

/// A summand which is a single group that can be combined with others.
fn lone_term(summand: &[Node]) -> Option<&Group> {
    match summand {
        [Node::Group(group)]
            if group.variable.is_some() || group.power.is_empty() =>
        {
            Some(group)
        },
        _ => None,
    }
}

fn zero_term(summand: &[Node]) -> Option<&Group> {
    lone_term(summand).filter(|group| group.coefficient().is_zero())
}

fn drop_zeros(side: &[Node], other_variables: bool) -> Vec<Node> {
    let parts = summands(side);
    let several = parts.len() > 1;

    let kept = parts
        .into_iter()
        .filter(|summand| match zero_term(summand) {
            Some(group) if group.variable.is_none() => !several,
            Some(_) => !other_variables,
            None => true,
        });

    join(kept)
}
