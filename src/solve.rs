use crate::{
    algebra::{
        ops::EvaluationError, parse, to_text, Node, ParseError, Text,
        ZeroDenominator,
    },
    arithmetic,
    classify::{classify, ProblemKind},
    clean::clean_equation,
    rewrite::{self, Step},
    Solution,
};
use thiserror::Error;

/// Knobs for a single solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// How many rewrite steps to attempt before giving up.
    pub max_steps: usize,
    /// Coefficients at or above this magnitude aren't searched for common
    /// factors.
    pub factor_limit: u64,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_steps: 256,
            factor_limit: 10_000_000_000,
        }
    }
}

/// Contextual information passed around while solving.
///
/// Every rewrite stage reports the sequence it produced, which makes it
/// possible to follow a solve without any global logging state.
pub trait Context {
    fn stage(&mut self, stage: &'static str, nodes: &[Node]);
}

/// A [`Context`] which forwards stages to the [`log`] crate.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Logger;

impl Context for Logger {
    fn stage(&mut self, stage: &'static str, nodes: &[Node]) {
        log::debug!("{}: {}", stage, Text(nodes));
    }
}

/// A [`Context`] which records a [`Snapshot`] of every stage.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Trace {
    pub stages: Vec<Snapshot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub stage: &'static str,
    pub text: String,
}

impl Context for Trace {
    fn stage(&mut self, stage: &'static str, nodes: &[Node]) {
        let text = to_text(nodes);
        log::debug!("{}: {}", stage, text);

        self.stages.push(Snapshot { stage, text });
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("unable to parse the input")]
    Parse(#[from] ParseError),
    #[error("evaluation failed")]
    Evaluation(#[source] EvaluationError),
    #[error("division by zero")]
    DivisionByZero,
    #[error("relational operators can't appear inside powers or parentheses")]
    RelationalInGroup,
    #[error("this kind of problem isn't supported")]
    UnsupportedProblem,
    #[error("an equation with a variable may only contain one relational operator")]
    MultipleRelations,
    #[error("terms with different variables can't be combined")]
    MixedVariables,
    #[error("a variable can't appear in a denominator")]
    VariableDenominator,
    #[error("not supported: {0}")]
    Unsupported(&'static str),
    #[error("malformed expression \"{0}\"")]
    Malformed(String),
    #[error("no solution found, gave up at \"{last}\"")]
    NotConverged { last: String },
}

impl From<EvaluationError> for SolveError {
    fn from(e: EvaluationError) -> Self {
        match e {
            EvaluationError::DivisionByZero => SolveError::DivisionByZero,
            other => SolveError::Evaluation(other),
        }
    }
}

impl From<ZeroDenominator> for SolveError {
    fn from(_: ZeroDenominator) -> Self { SolveError::DivisionByZero }
}

/// Parse and solve some text.
pub fn solve(text: &str) -> Result<Solution, SolveError> {
    solve_nodes(parse(text)?)
}

/// Solve an already parsed sequence using the default [`Options`], logging
/// each stage.
pub fn solve_nodes(nodes: Vec<Node>) -> Result<Solution, SolveError> {
    solve_with(nodes, &Options::default(), &mut Logger)
}

pub fn solve_with<C>(
    nodes: Vec<Node>,
    options: &Options,
    ctx: &mut C,
) -> Result<Solution, SolveError>
where
    C: Context,
{
    log::info!("Solving \"{}\"", Text(&nodes));

    let got = drive(nodes, options, ctx);

    match &got {
        Ok(solution) => log::info!("Solved: {}", solution),
        Err(e) => log::info!("Unable to solve: {}", e),
    }

    got
}

/// Keep classifying and rewriting until something produces a [`Solution`].
pub(crate) fn drive(
    nodes: Vec<Node>,
    options: &Options,
    ctx: &mut dyn Context,
) -> Result<Solution, SolveError> {
    let mut nodes = clean_equation(nodes)?;
    ctx.stage("clean", &nodes);

    for _ in 0..options.max_steps {
        match classify(&nodes)? {
            ProblemKind::Arithmetic => {
                let value = arithmetic::evaluate(&nodes)?;
                return Ok(Solution::number(&value));
            },
            ProblemKind::ArithmeticRelational => {
                let holds = arithmetic::evaluate_relations(&nodes)?;
                return Ok(Solution::Bool(holds));
            },
            ProblemKind::SingleVariableAlgebra(variable) => {
                match rewrite::step(nodes, &variable, options, ctx)? {
                    Step::Solved(solution) => return Ok(solution),
                    Step::Rewritten(next) => nodes = next,
                }
            },
        }
    }

    Err(SolveError::NotConverged {
        last: to_text(&nodes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Binding, Value};
    use num_bigint::BigInt;
    use num_rational::BigRational;

    fn int(value: i64) -> BigRational { BigRational::from_integer(BigInt::from(value)) }

    fn numbers(solution: &Solution, name: &str) -> Vec<BigRational> {
        solution
            .get(name)
            .unwrap()
            .values()
            .iter()
            .map(|value| value.as_number().unwrap())
            .collect()
    }

    macro_rules! solve_test {
        ($name:ident, $src:expr => $should_be:expr) => {
            #[test]
            fn $name() {
                let got = solve($src).unwrap();

                assert_eq!(got.to_string(), $should_be);
            }
        };
    }

    solve_test!(add_three_numbers, "960 + 600 + 700" => "2260");
    solve_test!(large_scientific, "3E14 + 6E14 + 7E14" => "1.6E+15");
    solve_test!(small_scientific, "3E-14 + 6E-14 + 7E-14" => "1.6E-13");
    solve_test!(precedence, "1 + 2 * 3 - 4 / 2" => "5");
    solve_test!(parentheses_first, "(1 + 2) * 3" => "9");
    solve_test!(implicit_multiplication, "2(3 + 4)" => "14");
    solve_test!(negative_base_power, "-2^2" => "-4");
    solve_test!(exact_root, "4^0.5" => "2");
    solve_test!(repeating_decimal, "1 / 3" => "0.333333333333");
    solve_test!(chained_comparison, "1 < 2 < 3" => "true");
    solve_test!(broken_chain, "1 < 3 < 2" => "false");
    solve_test!(equal_sides, "2 * 3 = 6" => "true");
    solve_test!(two_character_relation, "2 >= 3" => "false");

    #[test]
    fn arithmetic_value() {
        let got = solve("960 + 600 + 700").unwrap();

        assert_eq!(got.value(), Some(int(2260)));
    }

    #[test]
    fn linear_equation() {
        let got = solve("2x + 3 = 7").unwrap();

        assert_eq!(numbers(&got, "x"), vec![int(2)]);
    }

    #[test]
    fn zero_coefficient_has_no_solution() {
        let got = solve("0x = 5").unwrap();

        assert_eq!(got.get("x"), Some(&Binding::Single(Value::NoSolution)));
    }

    #[test]
    fn identity_is_true_for_all() {
        let got = solve("x + 1 = x + 1").unwrap();

        let x = crate::algebra::Variable::new('x');
        assert_eq!(got.get("x"), Some(&Binding::Single(Value::TrueForAll(x))));
    }

    #[test]
    fn product_equals_zero() {
        let got = solve("(x - 2)(x - 3) = 0").unwrap();

        assert_eq!(numbers(&got, "x"), vec![int(2), int(3)]);
    }

    #[test]
    fn variable_on_both_sides() {
        let got = solve("5x - 3 = 2x + 9").unwrap();

        assert_eq!(numbers(&got, "x"), vec![int(4)]);
    }

    #[test]
    fn distribute_over_parentheses() {
        let got = solve("2(x + 1) = 10").unwrap();

        assert_eq!(numbers(&got, "x"), vec![int(4)]);
    }

    #[test]
    fn clear_a_denominator() {
        let got = solve("x/2 + 1 = 4").unwrap();

        assert_eq!(numbers(&got, "x"), vec![int(6)]);
    }

    #[test]
    fn uneven_division_gives_a_fraction() {
        let got = solve("3x = 1").unwrap();

        assert_eq!(got.to_string(), "x = 1/3");
    }

    #[test]
    fn square_has_two_roots() {
        let got = solve("x^2 = 9").unwrap();

        assert_eq!(numbers(&got, "x"), vec![int(3), int(-3)]);
    }

    #[test]
    fn inexact_root_is_compound() {
        let got = solve("x^2 = 2").unwrap();

        assert_eq!(got.to_string(), "x = {2^(1 / 2), -2^(1 / 2)}");
    }

    #[test]
    fn inexact_root_of_a_fraction_is_a_quotient() {
        let got = solve("2x^2 = 9").unwrap();

        assert_eq!(got.to_string(), "x = {3 / 2^(1 / 2), -3 / 2^(1 / 2)}");
    }

    #[test]
    fn squared_single_term_group() {
        let got = solve("(2x)^2 = 16").unwrap();

        assert_eq!(numbers(&got, "x"), vec![int(2), int(-2)]);
    }

    #[test]
    fn products_of_single_terms() {
        let got = solve("(2x)(3x) = 24").unwrap();
        assert_eq!(numbers(&got, "x"), vec![int(2), int(-2)]);

        let got = solve("(x)(x) = 4").unwrap();
        assert_eq!(numbers(&got, "x"), vec![int(2), int(-2)]);
    }

    #[test]
    fn powers_of_the_variable_are_multiplied() {
        let got = solve("x^2 * x^3 = 32").unwrap();
        assert_eq!(numbers(&got, "x"), vec![int(2)]);

        let got = solve("x^2 * x = 8").unwrap();
        assert_eq!(numbers(&got, "x"), vec![int(2)]);
    }

    #[test]
    fn factors_with_zero_or_negative_powers_are_not_roots() {
        for src in &["(x - 3)^0 = 0", "(x - 3)^-1 = 0"] {
            let got = solve(src).unwrap_err();

            assert!(matches!(got, SolveError::Unsupported(_)), "{}: {:?}", src, got);
        }
    }

    #[test]
    fn inequality_flips_for_negative_coefficients() {
        let got = solve("-2x < 4").unwrap();

        assert_eq!(got.to_string(), "x > -2");
    }

    #[test]
    fn inclusive_inequality() {
        let got = solve("3x - 4 >= 2").unwrap();

        assert_eq!(got.to_string(), "x ≥ 2");
    }

    #[test]
    fn literal_zero_denominator() {
        let got = solve("x = 1/0").unwrap_err();

        assert_eq!(got, SolveError::DivisionByZero);
    }

    #[test]
    fn evaluated_zero_denominator() {
        let got = solve("1/(2 - 2)").unwrap_err();

        assert_eq!(got, SolveError::DivisionByZero);
    }

    #[test]
    fn two_variables_are_unsupported() {
        let got = solve("x + y = 2").unwrap_err();

        assert_eq!(got, SolveError::MixedVariables);
    }

    #[test]
    fn multiple_relations_with_a_variable() {
        let got = solve("1 < x < 3").unwrap_err();

        assert_eq!(got, SolveError::MultipleRelations);
    }

    #[test]
    fn variable_denominator() {
        let got = solve("1/x = 2").unwrap_err();

        assert_eq!(got, SolveError::VariableDenominator);
    }

    #[test]
    fn squared_sum_is_unsupported() {
        let got = solve("(x + 1)^2 = 4").unwrap_err();

        assert!(matches!(got, SolveError::Unsupported(_)));
    }

    #[test]
    fn step_budget_is_respected() {
        let options = Options {
            max_steps: 1,
            ..Options::default()
        };
        let nodes = parse("x + 1 = 3").unwrap();

        let got = solve_with(nodes, &options, &mut Logger).unwrap_err();

        assert_eq!(
            got,
            SolveError::NotConverged {
                last: String::from("x = 3 - 1")
            }
        );
    }

    #[test]
    fn trace_records_every_stage() {
        let mut trace = Trace::default();
        let nodes = parse("2x + 3 = 7").unwrap();

        solve_with(nodes, &Options::default(), &mut trace).unwrap();

        assert_eq!(trace.stages[0].stage, "clean");
        assert_eq!(trace.stages[0].text, "2x + 3 = 7");
        assert!(trace.stages.iter().any(|s| s.text == "2x = 7 - 3"));
    }
}
