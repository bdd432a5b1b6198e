use crate::algebra::{ops, Group, Node, Operator};
use num_traits::One;
use std::fmt::{self, Display, Formatter};

/// Render a sequence of [`Node`]s back into the text the parser accepts.
pub fn to_text(nodes: &[Node]) -> String { Text(nodes).to_string() }

/// A [`Display`] adapter for a node sequence.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Text<'a>(pub &'a [Node]);

impl<'a> Display for Text<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let nodes = self.0;
        let mut previous: Option<&Node> = None;

        for (i, node) in nodes.iter().enumerate() {
            match node {
                // the next term's sign stands in for the "+"
                Node::Operator(Operator::Add)
                    if nodes.get(i + 1).map_or(false, Node::is_negative_term) => {},
                Node::Operator(op) => write!(f, " {} ", op.symbol())?,
                Node::Relational(op) => write!(f, " {} ", op.symbol())?,
                term => {
                    write_separator(f, previous, term)?;
                    write_term(f, term)?;
                },
            }

            previous = Some(node);
        }

        Ok(())
    }
}

fn write_separator(
    f: &mut Formatter<'_>,
    previous: Option<&Node>,
    term: &Node,
) -> fmt::Result {
    let after_term = previous.map_or(false, Node::is_term);
    let after_skipped_add = previous == Some(&Node::Operator(Operator::Add));

    if term.is_negative_term() {
        if after_term || after_skipped_add {
            write!(f, " - ")
        } else {
            write!(f, "-")
        }
    } else if after_term {
        match term {
            Node::Parenthesized(_) => Ok(()),
            _ => write!(f, " + "),
        }
    } else {
        Ok(())
    }
}

/// Write a term without its leading sign.
fn write_term(f: &mut Formatter<'_>, term: &Node) -> fmt::Result {
    match term {
        Node::Group(group) => write_group(f, group),
        Node::Parenthesized(parens) => {
            write!(f, "({})", Text(&parens.groups))?;
            write_power(f, &parens.power)
        },
        Node::Fraction(fraction) => {
            write_operand(f, fraction.numerator())?;
            write!(f, "/")?;
            write_operand(f, fraction.denominator())
        },
        Node::Operator(_) | Node::Relational(_) => Ok(()),
    }
}

fn write_group(f: &mut Formatter<'_>, group: &Group) -> fmt::Result {
    let magnitude = group.number.magnitude();

    match &group.variable {
        Some(variable) if magnitude.is_one() => write!(f, "{}", variable)?,
        Some(variable) => {
            write!(f, "{}{}", ops::to_plain(&magnitude), variable)?
        },
        None => write!(f, "{}", ops::to_plain(&magnitude))?,
    }

    write_power(f, &group.power)
}

fn write_power(f: &mut Formatter<'_>, power: &[Node]) -> fmt::Result {
    match power {
        [] => Ok(()),
        [Node::Group(unit)]
            if unit.is_constant() && unit.coefficient().is_one() =>
        {
            Ok(())
        },
        [single] => write!(f, "^{}", single),
        _ => write!(f, "^({})", Text(power)),
    }
}

fn write_operand(f: &mut Formatter<'_>, operand: &[Node]) -> fmt::Result {
    if operand.len() > 1 {
        write!(f, "({})", Text(operand))
    } else {
        write!(f, "{}", Text(operand))
    }
}
