//! Rewriting single-variable equations until the variable is isolated.
//!
//! Every pass is a function from one equation to the next. Nothing is edited
//! in place, and positions are recomputed with [`analyze()`] whenever a pass
//! needs them.

mod factors;
mod fractions;
mod parens;
mod sides;
mod terms;

pub use factors::{divide_all, multiply};
pub(crate) use factors::fold_multiplications;
pub use terms::combine_like_terms;

use crate::{
    algebra::{
        analyze, contains_variable, split, to_text, Group, Node, Operator,
        RelationalOperator, Variable,
    },
    arithmetic,
    clean::divisions_to_fractions,
    solve::{drive, Context, Options},
    Solution, SolveError, Value,
};
use num_traits::Zero;

/// The outcome of one rewrite step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Solved(Solution),
    Rewritten(Vec<Node>),
}

/// An equation split around its relational operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Sides {
    pub left: Vec<Node>,
    pub op: RelationalOperator,
    pub right: Vec<Node>,
}

impl Sides {
    pub fn from_nodes(nodes: &[Node]) -> Result<Sides, SolveError> {
        match split(nodes) {
            Some((left, op, right)) => Ok(Sides {
                left: left.to_vec(),
                op,
                right: right.to_vec(),
            }),
            None => Err(SolveError::Malformed(to_text(nodes))),
        }
    }

    pub fn to_nodes(&self) -> Vec<Node> {
        let mut nodes = self.left.clone();
        nodes.push(self.op.into());
        nodes.extend(self.right.iter().cloned());
        nodes
    }

    fn map<F>(self, mut f: F) -> Result<Sides, SolveError>
    where
        F: FnMut(Vec<Node>) -> Result<Vec<Node>, SolveError>,
    {
        Ok(Sides {
            left: f(self.left)?,
            op: self.op,
            right: f(self.right)?,
        })
    }
}

/// Split a side into its additive terms.
pub(crate) fn summands(side: &[Node]) -> Vec<Vec<Node>> {
    side.split(|node| node.is_operator(Operator::Add))
        .filter(|summand| !summand.is_empty())
        .map(<[Node]>::to_vec)
        .collect()
}

/// The inverse of [`summands()`]. An empty side is `0`.
pub(crate) fn join<I>(summands: I) -> Vec<Node>
where
    I: IntoIterator<Item = Vec<Node>>,
{
    let mut side = Vec::new();

    for summand in summands {
        if summand.is_empty() {
            continue;
        }
        if !side.is_empty() {
            side.push(Operator::Add.into());
        }
        side.extend(summand);
    }

    if side.is_empty() {
        side.push(Group::constant(&Zero::zero()).into());
    }

    side
}

pub(crate) fn negate_summand(mut summand: Vec<Node>) -> Vec<Node> {
    if let Some(first) = summand.first_mut() {
        let node = std::mem::replace(first, Operator::Add.into());
        *first = node.negated();
    }

    summand
}

/// Apply one round of rewriting to a cleaned single-variable equation.
pub(crate) fn step(
    nodes: Vec<Node>,
    variable: &Variable,
    options: &Options,
    ctx: &mut dyn Context,
) -> Result<Step, SolveError> {
    let nodes = divisions_to_fractions(nodes)?;

    if analyze(&nodes).relations.len() > 1 {
        return Err(SolveError::MultipleRelations);
    }

    let original = Sides::from_nodes(&nodes)?;

    if let Some(solution) = sides::closed_form(&original, variable)? {
        return Ok(Step::Solved(solution));
    }
    if let Some(solution) =
        product_of_factors(&original, variable, options, ctx)?
    {
        return Ok(Step::Solved(solution));
    }

    let current = fractions::resolve_fractions(original.clone(), options)?;
    ctx.stage("fractions", &current.to_nodes());

    let current = factors::cancel_common_factor(current, options);
    ctx.stage("common factor", &current.to_nodes());

    let current = current.map(factors::fold_multiplications)?;
    ctx.stage("multiplication", &current.to_nodes());

    let current = combine_like_terms(current);
    ctx.stage("like terms", &current.to_nodes());

    let current = match sides::cross(current, variable) {
        sides::Crossing::Settled(value) => {
            let mut solution = Solution::variables();
            solution.record(variable.clone(), value);
            return Ok(Step::Solved(solution));
        },
        sides::Crossing::Moved(current) => current,
    };
    ctx.stage("cross sides", &current.to_nodes());

    if current != original {
        return Ok(Step::Rewritten(current.to_nodes()));
    }

    let cleaned = original.clone().map(parens::clean_side)?;
    ctx.stage("parentheses", &cleaned.to_nodes());

    if cleaned != original {
        Ok(Step::Rewritten(cleaned.to_nodes()))
    } else {
        Err(SolveError::NotConverged {
            last: to_text(&nodes),
        })
    }
}

/// `a * b * ... = 0` holds exactly when one of the factors is zero, so each
/// factor is solved on its own and the answers are merged.
fn product_of_factors(
    sides: &Sides,
    variable: &Variable,
    options: &Options,
    ctx: &mut dyn Context,
) -> Result<Option<Solution>, SolveError> {
    if sides.op != RelationalOperator::Equal {
        return Ok(None);
    }

    let product = if is_zero(&sides.right)? {
        &sides.left
    } else if is_zero(&sides.left)? {
        &sides.right
    } else {
        return Ok(None);
    };

    let positions = analyze(product);
    let has_parens = !positions.parentheses.is_empty();
    let factor_count = positions.operator(Operator::Multiply).len() + 1;
    let powered = positions.powers.len() == 1
        && positions.parentheses == positions.powers;

    if !positions.only_multiplication()
        || !has_parens
        || (factor_count < 2 && !powered)
    {
        return Ok(None);
    }

    // (a)^0 and (a)^-1 are never zero
    let factors_vanish_with_their_contents = product
        .split(|node| node.is_operator(Operator::Multiply))
        .all(|factor| match factor {
            [Node::Parenthesized(parens)] => {
                parens.power.is_empty()
                    || sides::positive_integer_power(&parens.power).is_some()
            },
            _ => true,
        });
    if !factors_vanish_with_their_contents {
        return Ok(None);
    }

    let mut solution = Solution::variables();

    for factor in product.split(|node| node.is_operator(Operator::Multiply)) {
        if !contains_variable(factor) {
            continue;
        }

        let mut equation = match factor {
            [Node::Parenthesized(parens)] => parens.groups.clone(),
            other => other.to_vec(),
        };
        equation.push(RelationalOperator::Equal.into());
        equation.push(Group::constant(&Zero::zero()).into());

        log::debug!("Solving the factor \"{}\"", to_text(&equation));

        let got = drive(equation, options, ctx)?;

        for (name, binding) in got.bindings() {
            for value in binding.values() {
                match value {
                    Value::NoSolution => {},
                    Value::TrueForAll(_) => {
                        let mut everything = Solution::variables();
                        everything.record(
                            variable.clone(),
                            Value::TrueForAll(variable.clone()),
                        );
                        return Ok(Some(everything));
                    },
                    other => solution.record(name.clone(), other.clone()),
                }
            }
        }
    }

    if solution.get(variable.name()).is_none() {
        solution.record(variable.clone(), Value::NoSolution);
    }

    Ok(Some(solution))
}

fn is_zero(side: &[Node]) -> Result<bool, SolveError> {
    if contains_variable(side) {
        Ok(false)
    } else {
        Ok(arithmetic::evaluate(side)?.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algebra::parse, clean::clean_equation, solve::Trace};
    use num_rational::BigRational;

    fn equation(src: &str) -> Vec<Node> {
        clean_equation(parse(src).unwrap()).unwrap()
    }

    fn rewrite(src: &str) -> String {
        let x = Variable::new('x');
        let mut trace = Trace::default();

        match step(equation(src), &x, &Options::default(), &mut trace) {
            Ok(Step::Rewritten(nodes)) => to_text(&nodes),
            other => panic!("Expected a rewrite, found {:?}", other),
        }
    }

    #[test]
    fn summands_and_join_are_inverses() {
        let nodes = equation("2x + 3 + (x + 1)");

        let got = join(summands(&nodes));

        assert_eq!(got, nodes);
    }

    #[test]
    fn empty_sides_become_zero() {
        assert_eq!(to_text(&join(Vec::new())), "0");
    }

    #[test]
    fn constants_move_right_and_variables_move_left() {
        assert_eq!(rewrite("2x + 3 = 7"), "2x = 7 - 3");
        assert_eq!(rewrite("5x - 3 = 2x + 9"), "5x - 2x = 9 + 3");
    }

    #[test]
    fn common_factors_are_cancelled() {
        assert_eq!(rewrite("2x + 4 = 8"), "x = 4 - 2");
    }

    #[test]
    fn like_terms_are_combined_before_crossing() {
        assert_eq!(rewrite("5x - 2x = 9 + 3"), "3x = 12");
    }

    #[test]
    fn parentheses_are_cleaned_when_nothing_else_applies() {
        assert_eq!(rewrite("-(x + 1) = 3"), "-x - 1 = 3");
        assert_eq!(rewrite("1 * (x + 1) = 2"), "x + 1 = 2");
    }

    #[test]
    fn factors_of_a_zero_product_are_solved_separately() {
        let x = Variable::new('x');
        let mut trace = Trace::default();

        let got = step(
            equation("x(x + 4) = 0"),
            &x,
            &Options::default(),
            &mut trace,
        )
        .unwrap();

        let should_be = {
            let mut solution = Solution::variables();
            solution.record(x.clone(), Value::number(&Zero::zero()));
            solution.record(x, Value::number(&BigRational::from_integer((-4).into())));
            solution
        };
        assert_eq!(got, Step::Solved(should_be));
    }

    #[test]
    fn only_positive_powers_split_into_factors() {
        let x = Variable::new('x');

        for src in &["(x - 3)^0 = 0", "(x - 3)^-1 = 0", "x * (x - 3)^0 = 0"] {
            let sides = Sides::from_nodes(&equation(src)).unwrap();
            let mut trace = Trace::default();

            let got =
                product_of_factors(&sides, &x, &Options::default(), &mut trace);

            assert_eq!(got, Ok(None), "{}", src);
        }
    }

    #[test]
    fn squared_factor_is_split() {
        let x = Variable::new('x');
        let sides = Sides::from_nodes(&equation("(x - 3)^2 = 0")).unwrap();
        let mut trace = Trace::default();

        let got = product_of_factors(&sides, &x, &Options::default(), &mut trace)
            .unwrap()
            .unwrap();

        assert_eq!(got.to_string(), "x = 3");
    }

    #[test]
    fn stuck_equations_report_where_they_stopped() {
        let x = Variable::new('x');
        let mut trace = Trace::default();

        let got = step(
            equation("(x - 2)(x - 3) = 5"),
            &x,
            &Options::default(),
            &mut trace,
        )
        .unwrap_err();

        assert_eq!(
            got,
            SolveError::NotConverged {
                last: String::from("(x - 2) * (x - 3) = 5")
            }
        );
    }
}
