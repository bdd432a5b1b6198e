//! Normalization applied to every sequence before it is classified.

use crate::{
    algebra::{Fraction, Node, Operator, ParenthesizedGroup},
    SolveError,
};

/// Make every operator explicit.
///
/// Relational operators may only appear at the top level. A `-` operator
/// becomes `+` followed by a negated term, and adjacent terms get an implicit
/// operator: `*` when the second is a non-negative parenthesized group
/// (`2(x + 1)`), `+` otherwise (`1 -1`).
pub fn clean_equation(nodes: Vec<Node>) -> Result<Vec<Node>, SolveError> {
    clean(nodes, true)
}

fn clean(nodes: Vec<Node>, top_level: bool) -> Result<Vec<Node>, SolveError> {
    let mut cleaned: Vec<Node> = Vec::with_capacity(nodes.len());
    let mut negate_next = false;

    for node in nodes {
        let node = match node {
            Node::Relational(_) if !top_level => {
                return Err(SolveError::RelationalInGroup)
            },
            Node::Operator(Operator::Subtract) => {
                negate_next = !negate_next;
                cleaned.push(Operator::Add.into());
                continue;
            },
            Node::Group(mut group) => {
                group.power = clean(group.power, false)?;
                Node::Group(group)
            },
            Node::Parenthesized(parens) => {
                Node::Parenthesized(ParenthesizedGroup {
                    groups: clean(parens.groups, false)?,
                    power: clean(parens.power, false)?,
                    negative: parens.negative,
                })
            },
            Node::Fraction(fraction) => {
                let (numerator, denominator) = fraction.into_parts();
                Fraction::new(
                    clean(numerator, false)?,
                    clean(denominator, false)?,
                )?
                .into()
            },
            other => other,
        };

        let node = if negate_next && node.is_term() {
            negate_next = false;
            node.negated()
        } else {
            node
        };

        if node.is_term() && cleaned.last().map_or(false, Node::is_term) {
            cleaned.push(implicit_operator(&node).into());
        }

        cleaned.push(node);
    }

    Ok(cleaned)
}

fn implicit_operator(next: &Node) -> Operator {
    match next {
        Node::Parenthesized(parens) if !parens.negative => Operator::Multiply,
        _ => Operator::Add,
    }
}

/// Turn every `a / b` into a [`Fraction`], at the top level and inside
/// parentheses.
pub fn divisions_to_fractions(nodes: Vec<Node>) -> Result<Vec<Node>, SolveError> {
    let mut output: Vec<Node> = Vec::with_capacity(nodes.len());
    let mut nodes = nodes.into_iter();

    while let Some(node) = nodes.next() {
        let node = match node {
            Node::Parenthesized(parens) => {
                Node::Parenthesized(ParenthesizedGroup {
                    groups: divisions_to_fractions(parens.groups)?,
                    ..parens
                })
            },
            other => other,
        };

        if node != Node::Operator(Operator::Divide) {
            output.push(node);
            continue;
        }

        let numerator = output.pop().filter(Node::is_term);
        let denominator = nodes.next().map(|denominator| match denominator {
            Node::Parenthesized(ParenthesizedGroup {
                groups,
                power,
                negative,
            }) => divisions_to_fractions(groups).map(|groups| {
                Node::Parenthesized(ParenthesizedGroup {
                    groups,
                    power,
                    negative,
                })
            }),
            other => Ok(other),
        });

        match (numerator, denominator) {
            (Some(numerator), Some(denominator)) => {
                let denominator = denominator?;
                if !denominator.is_term() {
                    return Err(missing_operand());
                }

                let fraction = Fraction::new(vec![numerator], vec![denominator])?;
                output.push(fraction.into());
            },
            _ => return Err(missing_operand()),
        }
    }

    Ok(output)
}

fn missing_operand() -> SolveError {
    SolveError::Malformed(String::from("a division is missing an operand"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{parse, to_text, Group, Number, RelationalOperator};

    macro_rules! clean_test {
        ($name:ident, $src:expr => $should_be:expr) => {
            #[test]
            fn $name() {
                let nodes = parse($src).unwrap();

                let got = clean_equation(nodes).unwrap();

                assert_eq!(to_text(&got), $should_be);
            }
        };
    }

    clean_test!(already_clean, "1 + 2 = 3" => "1 + 2 = 3");
    clean_test!(subtraction_gets_an_operator, "1 - 2" => "1 - 2");
    clean_test!(coefficient_times_parens, "2(x + 1)" => "2 * (x + 1)");
    clean_test!(parens_times_parens, "(x - 2)(x - 3)" => "(x - 2) * (x - 3)");

    #[test]
    fn implicit_operators_are_inserted() {
        let nodes = parse("1 - 2(x + 1) - (x)").unwrap();

        let got = clean_equation(nodes).unwrap();

        assert_eq!(got[1], Node::Operator(Operator::Add));
        assert_eq!(got[3], Node::Operator(Operator::Multiply));
        assert_eq!(got[5], Node::Operator(Operator::Add));
        assert_eq!(got.len(), 7);
    }

    #[test]
    fn subtract_operators_negate_the_next_term() {
        let constant = |value: i64| {
            Node::Group(Group::term(Number::from_integer(value), None))
        };
        let nodes =
            vec![constant(3), Node::Operator(Operator::Subtract), constant(2)];

        let got = clean_equation(nodes).unwrap();

        assert_eq!(to_text(&got), "3 - 2");
        assert_eq!(got[1], Node::Operator(Operator::Add));
    }

    #[test]
    fn nested_relations_are_rejected() {
        let mut nodes = parse("(x + 1) = 2").unwrap();
        if let Node::Parenthesized(parens) = &mut nodes[0] {
            parens.groups.push(RelationalOperator::Less.into());
        }

        let got = clean_equation(nodes).unwrap_err();

        assert_eq!(got, SolveError::RelationalInGroup);
    }

    #[test]
    fn divisions_become_fractions() {
        let nodes = clean_equation(parse("x / 2 + (4 / 2) = 3").unwrap()).unwrap();

        let got = divisions_to_fractions(nodes).unwrap();

        assert!(matches!(got[0], Node::Fraction(_)));
        assert_eq!(to_text(&got), "x/2 + (4/2) = 3");
    }

    #[test]
    fn parenthesized_denominators_keep_their_power_and_sign() {
        let nodes = clean_equation(parse("x / (4 / 2)^2 = 1").unwrap()).unwrap();

        let got = divisions_to_fractions(nodes).unwrap();

        assert_eq!(to_text(&got), "x/(4/2)^2 = 1");
        match &got[0] {
            Node::Fraction(fraction) => match fraction.denominator() {
                [Node::Parenthesized(parens)] => {
                    assert!(matches!(parens.groups[0], Node::Fraction(_)));
                    assert_eq!(to_text(&parens.power), "2");
                },
                other => panic!("Unexpected denominator {:?}", other),
            },
            other => panic!("Expected a fraction, found {:?}", other),
        }
    }

    #[test]
    fn literal_zero_denominators_fail() {
        let nodes = parse("x = 1 / 0").unwrap();

        let got = divisions_to_fractions(nodes).unwrap_err();

        assert_eq!(got, SolveError::DivisionByZero);
    }
}
