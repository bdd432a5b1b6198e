use crate::algebra::{Node, Operator, RelationalOperator, TermKey};
use std::collections::BTreeMap;

/// Where interesting things are in a node sequence.
///
/// Indices go stale as soon as the sequence is edited, so passes re-run
/// [`analyze()`] after every structural change instead of patching them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Positions {
    pub parentheses: Vec<usize>,
    pub operators: BTreeMap<Operator, Vec<usize>>,
    /// Groups and parenthesized groups carrying an exponent.
    pub powers: Vec<usize>,
    pub fractions: Vec<usize>,
    pub relations: Vec<(RelationalOperator, usize)>,
    /// Groups which can be combined with each other, keyed by identity in
    /// order of first appearance.
    pub terms: Vec<(TermKey, Vec<usize>)>,
}

/// Index a node sequence in a single pass.
pub fn analyze(nodes: &[Node]) -> Positions {
    let mut positions = Positions::default();

    for (index, node) in nodes.iter().enumerate() {
        match node {
            Node::Group(group) => {
                if !group.power.is_empty() {
                    positions.powers.push(index);
                }

                // a powered constant's exponent applies to the number itself
                if group.variable.is_some() || group.power.is_empty() {
                    positions.push_term(group.key(), index);
                }
            },
            Node::Parenthesized(parens) => {
                positions.parentheses.push(index);
                if !parens.power.is_empty() {
                    positions.powers.push(index);
                }
            },
            Node::Fraction(_) => positions.fractions.push(index),
            Node::Operator(op) => {
                positions.operators.entry(*op).or_default().push(index)
            },
            Node::Relational(op) => positions.relations.push((*op, index)),
        }
    }

    positions
}

impl Positions {
    fn push_term(&mut self, key: TermKey, index: usize) {
        match self.terms.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, indices)) => indices.push(index),
            None => self.terms.push((key, vec![index])),
        }
    }

    pub fn operator(&self, op: Operator) -> &[usize] {
        self.operators.get(&op).map(Vec::as_slice).unwrap_or_default()
    }

    /// `*` and `/` share a precedence, so they're applied in textual order.
    pub fn multiplications_and_divisions(&self) -> Vec<usize> {
        self.merged(Operator::Multiply, Operator::Divide)
    }

    pub fn additions_and_subtractions(&self) -> Vec<usize> {
        self.merged(Operator::Add, Operator::Subtract)
    }

    fn merged(&self, first: Operator, second: Operator) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .operator(first)
            .iter()
            .chain(self.operator(second))
            .copied()
            .collect();
        indices.sort_unstable();
        indices
    }

    pub fn term_positions(&self, key: &TermKey) -> &[usize] {
        self.terms
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, indices)| indices.as_slice())
            .unwrap_or_default()
    }

    /// Only `*` operators appear at this level.
    pub fn only_multiplication(&self) -> bool {
        self.operators.keys().all(|op| *op == Operator::Multiply)
    }
}

/// Split an equation around its first relational operator.
pub fn split(nodes: &[Node]) -> Option<(&[Node], RelationalOperator, &[Node])> {
    let (op, index) = analyze(nodes).relations.first().copied()?;

    Some((&nodes[..index], op, &nodes[index + 1..]))
}
