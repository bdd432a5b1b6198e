use crate::{
    algebra::{collect_variables, Node, TermKey, Variable},
    rewrite::fold_multiplications,
    SolveError,
};
use std::collections::BTreeSet;

/// The strategy used to solve a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum ProblemKind {
    /// Variable-free, evaluates to a number.
    Arithmetic,
    /// Variable-free comparison, evaluates to a boolean.
    ArithmeticRelational,
    /// An equation or inequality in a single unknown.
    SingleVariableAlgebra(Variable),
}

/// Decide how to solve a (cleaned) sequence.
///
/// Variable terms are counted by `(variable, power)` identity, anywhere in the
/// tree, so `x^2 + x = 0` isn't treated as something the rewriter can
/// isolate. Products like `x^2 * x^3` are folded before counting.
pub fn classify(nodes: &[Node]) -> Result<ProblemKind, SolveError> {
    if nodes.is_empty() {
        return Err(SolveError::UnsupportedProblem);
    }

    let has_relation = nodes.iter().any(|node| match node {
        Node::Relational(_) => true,
        _ => false,
    });

    let mut variables = BTreeSet::new();
    collect_variables(nodes, &mut variables);

    let mut variables = variables.into_iter();

    match (variables.next(), variables.next(), has_relation) {
        (None, _, false) => Ok(ProblemKind::Arithmetic),
        (None, _, true) => Ok(ProblemKind::ArithmeticRelational),
        (Some(_), Some(_), _) => Err(SolveError::MixedVariables),
        (Some(variable), None, true) => {
            let folded = fold_multiplications(nodes.to_vec())?;
            let mut identities = Vec::new();
            variable_identities(&folded, &mut identities);

            if identities.len() == 1 {
                Ok(ProblemKind::SingleVariableAlgebra(variable))
            } else {
                Err(SolveError::UnsupportedProblem)
            }
        },
        (Some(_), None, false) => Err(SolveError::UnsupportedProblem),
    }
}

fn variable_identities(nodes: &[Node], identities: &mut Vec<TermKey>) {
    for node in nodes {
        match node {
            Node::Group(group) => {
                if group.variable.is_some() {
                    let key = group.key();
                    if !identities.contains(&key) {
                        identities.push(key);
                    }
                }
                variable_identities(&group.power, identities);
            },
            Node::Parenthesized(parens) => {
                variable_identities(&parens.groups, identities);
                variable_identities(&parens.power, identities);
            },
            Node::Fraction(fraction) => {
                variable_identities(fraction.numerator(), identities);
                variable_identities(fraction.denominator(), identities);
            },
            Node::Operator(_) | Node::Relational(_) => {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algebra::parse, clean::clean_equation};

    macro_rules! classify_test {
        ($name:ident, $src:expr => $should_be:expr) => {
            #[test]
            fn $name() {
                let nodes = clean_equation(parse($src).unwrap()).unwrap();

                let got = classify(&nodes);

                assert_eq!(got, $should_be);
            }
        };
    }

    classify_test!(plain_arithmetic, "1 + 2" => Ok(ProblemKind::Arithmetic));
    classify_test!(
        comparison,
        "1 + 2 < 4" => Ok(ProblemKind::ArithmeticRelational)
    );
    classify_test!(
        linear,
        "2x + 3 = 7" => Ok(ProblemKind::SingleVariableAlgebra(Variable::new('x')))
    );
    classify_test!(
        variable_inside_parentheses,
        "(x - 2)(x - 3) = 0" => Ok(ProblemKind::SingleVariableAlgebra(Variable::new('x')))
    );
    classify_test!(
        variable_inside_a_fraction,
        "1/x = 2" => Ok(ProblemKind::SingleVariableAlgebra(Variable::new('x')))
    );
    classify_test!(two_variables, "x + y = 1" => Err(SolveError::MixedVariables));
    classify_test!(
        different_powers,
        "x^2 + x = 0" => Err(SolveError::UnsupportedProblem)
    );
    classify_test!(
        products_of_powers,
        "x^2 * x^3 = 32" => Ok(ProblemKind::SingleVariableAlgebra(Variable::new('x')))
    );
    classify_test!(
        folded_product_beside_another_power,
        "x^2 * x + x = 0" => Err(SolveError::UnsupportedProblem)
    );
    classify_test!(
        nothing_to_solve_for,
        "2x + 1" => Err(SolveError::UnsupportedProblem)
    );

    #[test]
    fn empty_input_is_unsupported() {
        assert_eq!(classify(&[]), Err(SolveError::UnsupportedProblem));
    }
}
