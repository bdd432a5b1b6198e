use crate::algebra::{
    ops::{self, SIGNIFICANT_DIGITS},
    Fraction, Node, Number, Operator, RelationalOperator, Text, Variable,
};
use arrayvec::ArrayVec;
use num_rational::BigRational;
use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
};

/// The outcome of solving something.
#[derive(Debug, Clone, PartialEq)]
pub enum Solution {
    /// The result of evaluating a comparison.
    Bool(bool),
    /// The value of an arithmetic expression.
    Number(Number),
    Variables(BTreeMap<Variable, Binding>),
}

impl Solution {
    /// A normalized numeric solution.
    pub fn number(value: &BigRational) -> Self {
        Solution::Number(Number::from_value(&ops::normalize(value)))
    }

    pub fn variables() -> Self { Solution::Variables(BTreeMap::new()) }

    /// The numeric value, for arithmetic.
    pub fn value(&self) -> Option<BigRational> {
        match self {
            Solution::Number(number) => Some(number.value()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Solution::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Look up what was found for a variable.
    pub fn get(&self, name: &str) -> Option<&Binding> {
        match self {
            Solution::Variables(bindings) => bindings
                .iter()
                .find(|(variable, _)| variable.name() == name)
                .map(|(_, binding)| binding),
            _ => None,
        }
    }

    /// Record a value for a variable.
    ///
    /// A variable which already has a value ends up with a set of values
    /// instead. Numbers are normalized here, so two equal values reached
    /// along different paths always compare equal.
    pub fn record(&mut self, variable: Variable, value: Value) {
        if let Solution::Bool(_) | Solution::Number(_) = self {
            *self = Solution::variables();
        }

        if let Solution::Variables(bindings) = self {
            let value = value.normalized();

            match bindings.remove(&variable) {
                Some(binding) => {
                    bindings.insert(variable, binding.with(value));
                },
                None => {
                    bindings.insert(variable, Binding::Single(value));
                },
            }
        }
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&Variable, &Binding)> {
        let bindings = match self {
            Solution::Variables(bindings) => Some(bindings.iter()),
            _ => None,
        };

        bindings.into_iter().flatten()
    }
}

/// Whatever was recorded for one variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Single(Value),
    Set(Vec<Value>),
}

impl Binding {
    pub fn values(&self) -> &[Value] {
        match self {
            Binding::Single(value) => std::slice::from_ref(value),
            Binding::Set(values) => values,
        }
    }

    fn with(self, value: Value) -> Binding {
        let mut values = match self {
            Binding::Single(existing) => vec![existing],
            Binding::Set(values) => values,
        };

        if !values.contains(&value) {
            values.push(value);
        }

        if values.len() == 1 {
            Binding::Single(values.remove(0))
        } else {
            Binding::Set(values)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(Number),
    Fraction(Fraction),
    /// A value with no exact decimal form, either a single root like
    /// `2^(1 / 2)` or a quotient like `3 / 2^(1 / 2)`.
    Compound(ArrayVec<[Node; 3]>),
    NoSolution,
    TrueForAll(Variable),
    Range(Range),
}

impl Value {
    pub fn number(value: &BigRational) -> Value {
        Value::Number(Number::from_value(value)).normalized()
    }

    pub fn compound(root: Node) -> Value {
        let mut nodes = ArrayVec::new();
        nodes.push(root);
        Value::Compound(nodes)
    }

    /// `numerator / denominator`, where either side may be a root.
    pub fn compound_quotient(numerator: Node, denominator: Node) -> Value {
        let mut nodes = ArrayVec::new();
        nodes.push(numerator);
        nodes.push(Operator::Divide.into());
        nodes.push(denominator);
        Value::Compound(nodes)
    }

    pub fn as_number(&self) -> Option<BigRational> {
        match self {
            Value::Number(number) => Some(number.value()),
            _ => None,
        }
    }

    fn normalized(self) -> Value {
        match self {
            Value::Number(number) => Value::Number(normalize(&number)),
            Value::Range(Range { lower, upper }) => Value::Range(Range {
                lower: lower.map(Bound::normalized),
                upper: upper.map(Bound::normalized),
            }),
            other => other,
        }
    }
}

fn normalize(number: &Number) -> Number {
    Number::from_value(&ops::normalize(&number.value()))
}

/// The values satisfying an inequality.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

impl Range {
    /// The values `x` for which `x <op> bound` holds, for the four ordering
    /// relations.
    pub fn from_relation(
        op: RelationalOperator,
        bound: &BigRational,
    ) -> Option<Range> {
        let bound = |inclusive| {
            Some(Bound {
                value: Number::from_value(bound),
                inclusive,
            })
        };

        match op {
            RelationalOperator::Less => Some(Range {
                lower: None,
                upper: bound(false),
            }),
            RelationalOperator::LessOrEqual => Some(Range {
                lower: None,
                upper: bound(true),
            }),
            RelationalOperator::Greater => Some(Range {
                lower: bound(false),
                upper: None,
            }),
            RelationalOperator::GreaterOrEqual => Some(Range {
                lower: bound(true),
                upper: None,
            }),
            RelationalOperator::Equal | RelationalOperator::NotEqual => None,
        }
    }

    pub fn contains(&self, value: &BigRational) -> bool {
        let above = self.lower.as_ref().map_or(true, |lower| {
            let bound = lower.value.value();
            *value > bound || (lower.inclusive && *value == bound)
        });
        let below = self.upper.as_ref().map_or(true, |upper| {
            let bound = upper.value.value();
            *value < bound || (upper.inclusive && *value == bound)
        });

        above && below
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub value: Number,
    pub inclusive: bool,
}

impl Bound {
    fn normalized(self) -> Bound {
        Bound {
            value: normalize(&self.value),
            ..self
        }
    }
}

fn scientific(number: &Number) -> String {
    ops::to_scientific(&number.value(), SIGNIFICANT_DIGITS)
}

impl Display for Solution {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Solution::Bool(b) => write!(f, "{}", b),
            Solution::Number(number) => write!(f, "{}", scientific(number)),
            Solution::Variables(bindings) => {
                for (i, (variable, binding)) in bindings.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }

                    match binding {
                        Binding::Single(Value::Range(range)) => {
                            write_range(f, variable, range)?
                        },
                        Binding::Single(value) => {
                            write!(f, "{} = {}", variable, value)?
                        },
                        Binding::Set(values) => {
                            write!(f, "{} = {{", variable)?;
                            for (j, value) in values.iter().enumerate() {
                                if j > 0 {
                                    write!(f, ", ")?;
                                }
                                write!(f, "{}", value)?;
                            }
                            write!(f, "}}")?;
                        },
                    }
                }

                Ok(())
            },
        }
    }
}

fn write_range(
    f: &mut Formatter<'_>,
    variable: &Variable,
    range: &Range,
) -> fmt::Result {
    let symbol = |inclusive: bool, strict: char, loose: char| {
        if inclusive {
            loose
        } else {
            strict
        }
    };

    match (&range.lower, &range.upper) {
        (Some(lower), Some(upper)) => write!(
            f,
            "{} {} {} {} {}",
            scientific(&lower.value),
            symbol(lower.inclusive, '<', '≤'),
            variable,
            symbol(upper.inclusive, '<', '≤'),
            scientific(&upper.value),
        ),
        (Some(lower), None) => write!(
            f,
            "{} {} {}",
            variable,
            symbol(lower.inclusive, '>', '≥'),
            scientific(&lower.value),
        ),
        (None, Some(upper)) => write!(
            f,
            "{} {} {}",
            variable,
            symbol(upper.inclusive, '<', '≤'),
            scientific(&upper.value),
        ),
        (None, None) => write!(f, "{} is unbounded", variable),
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(number) => write!(f, "{}", scientific(number)),
            Value::Fraction(fraction) => write!(f, "{}", fraction),
            Value::Compound(nodes) => write!(f, "{}", Text(nodes)),
            Value::NoSolution => write!(f, "no solution"),
            Value::TrueForAll(variable) => write!(f, "true for all {}", variable),
            Value::Range(range) => write_interval(f, range),
        }
    }
}

/// Interval notation, e.g. `[2, ∞)`.
fn write_interval(f: &mut Formatter<'_>, range: &Range) -> fmt::Result {
    match &range.lower {
        Some(lower) if lower.inclusive => write!(f, "[{}", scientific(&lower.value))?,
        Some(lower) => write!(f, "({}", scientific(&lower.value))?,
        None => write!(f, "(-∞")?,
    }

    match &range.upper {
        Some(upper) if upper.inclusive => write!(f, ", {}]", scientific(&upper.value)),
        Some(upper) => write!(f, ", {})", scientific(&upper.value)),
        None => write!(f, ", ∞)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn x() -> Variable { Variable::new('x') }

    fn ratio(numer: i64, denom: i64) -> BigRational {
        BigRational::new(BigInt::from(numer), BigInt::from(denom))
    }

    #[test]
    fn recording_twice_makes_a_set() {
        let mut solution = Solution::variables();

        solution.record(x(), Value::number(&ratio(2, 1)));
        solution.record(x(), Value::number(&ratio(3, 1)));

        let got = solution.get("x").unwrap();
        assert_eq!(
            got,
            &Binding::Set(vec![
                Value::number(&ratio(2, 1)),
                Value::number(&ratio(3, 1))
            ])
        );
        assert_eq!(solution.to_string(), "x = {2, 3}");
    }

    #[test]
    fn duplicate_values_are_merged() {
        let mut solution = Solution::variables();

        solution.record(x(), Value::number(&ratio(0, 1)));
        solution.record(x(), Value::number(&ratio(0, 1)));

        assert_eq!(
            solution.get("x"),
            Some(&Binding::Single(Value::number(&ratio(0, 1))))
        );
    }

    #[test]
    fn numbers_are_normalized_when_written() {
        let mut solution = Solution::variables();

        solution.record(x(), Value::Number(Number::from_value(&ratio(2, 3))));

        let got = solution.get("x").unwrap().values()[0].as_number().unwrap();
        assert_eq!(got, ratio(666_666_666_667, 1_000_000_000_000));
    }

    #[test]
    fn ranges_know_their_members() {
        let range =
            Range::from_relation(RelationalOperator::GreaterOrEqual, &ratio(2, 1))
                .unwrap();

        assert!(range.contains(&ratio(2, 1)));
        assert!(range.contains(&ratio(5, 2)));
        assert!(!range.contains(&ratio(3, 2)));
    }

    #[test]
    fn display_sentinels() {
        let mut solution = Solution::variables();
        solution.record(x(), Value::NoSolution);
        assert_eq!(solution.to_string(), "x = no solution");

        let mut solution = Solution::variables();
        solution.record(x(), Value::TrueForAll(x()));
        assert_eq!(solution.to_string(), "x = true for all x");
    }

    #[test]
    fn arithmetic_solutions_use_scientific_notation() {
        let solution = Solution::number(&ratio(1_600_000_000_000_000, 1));

        assert_eq!(solution.to_string(), "1.6E+15");
        assert_eq!(solution.as_bool(), None);
    }
}
