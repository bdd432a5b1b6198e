use crate::{
    algebra::{collect_variables, parse, Node, ParseError, Text, Variable},
    solve::{self, Context, Logger, Options, SolveError},
    Solution,
};
use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// A parsed problem, either an expression or an equation.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub(crate) nodes: Vec<Node>,
}

impl Equation {
    pub fn new(nodes: Vec<Node>) -> Self { Equation { nodes } }

    pub fn nodes(&self) -> &[Node] { &self.nodes }

    /// Every variable mentioned anywhere in the problem.
    pub fn unknowns(&self) -> BTreeSet<Variable> {
        let mut unknowns = BTreeSet::new();
        collect_variables(&self.nodes, &mut unknowns);
        unknowns
    }

    pub fn solve(&self) -> Result<Solution, SolveError> {
        self.solve_with(&Options::default(), &mut Logger)
    }

    pub fn solve_with<C>(
        &self,
        options: &Options,
        ctx: &mut C,
    ) -> Result<Solution, SolveError>
    where
        C: Context,
    {
        solve::solve_with(self.nodes.clone(), options, ctx)
    }
}

impl FromStr for Equation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { parse(s).map(Equation::new) }
}

impl From<Vec<Node>> for Equation {
    fn from(nodes: Vec<Node>) -> Self { Equation::new(nodes) }
}

impl Display for Equation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Text(&self.nodes))
    }
}
