use std::fmt::{self, Display, Formatter};

/// A single comparison operator usable on a [`Node::Comparison`] or
/// [`Node::CaseInsensitiveComparison`] leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Contains,
    StartsWith,
    EndsWith,
    Matches,
    IsNull,
    IsNotNull,
}

impl CmpOp {
    /// True iff this operator is one of the four inequality comparisons that
    /// the range algebra (`range` module) understands.
    #[inline]
    pub const fn is_range_op(self) -> bool {
        matches!(
            self,
            Self::GreaterThan | Self::LessThan | Self::GreaterThanOrEqual | Self::LessThanOrEqual
        )
    }
}

impl Display for CmpOp {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThanOrEqual => "<=",
            Self::Contains => "contains",
            Self::StartsWith => "starts with",
            Self::EndsWith => "ends with",
            Self::Matches => "matches",
            Self::IsNull => "is null",
            Self::IsNotNull => "is not null",
        };
        write!(formatter, "{symbol}")
    }
}

/// The connective of a [`Node::Composite`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    And,
    Or,
}

impl Display for Operator {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(formatter, "AND"),
            Self::Or => write!(formatter, "OR"),
        }
    }
}

/// A node of the predicate-expression AST.
///
/// Every variant is immutable once constructed; rewrites build new nodes
/// rather than mutating in place. Structural equality (`PartialEq`/`Eq`) and
/// `Hash` are derived field-by-field, which is what redundancy elimination
/// (P3) and absorption (P6) depend on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Constant(bool),
    Comparison(String, CmpOp, String),
    CaseInsensitiveComparison(String, CmpOp, String),
    Between(String, String, String, bool, bool),
    InList(String, Vec<String>),
    DateBetween(String, String, String, String),
    Not(Box<Node>),
    Composite(Operator, Vec<Node>),
}

impl Node {
    /// The canonical `TRUE` singleton. `Node::Constant(true)` always compares
    /// structurally equal to this value.
    pub const TRUE: Node = Node::Constant(true);
    /// The canonical `FALSE` singleton.
    pub const FALSE: Node = Node::Constant(false);

    #[inline]
    pub fn comparison(field: impl Into<String>, op: CmpOp, value: impl Into<String>) -> Self {
        Self::Comparison(field.into(), op, value.into())
    }

    #[inline]
    pub fn case_insensitive_comparison(
        field: impl Into<String>,
        op: CmpOp,
        value: impl Into<String>,
    ) -> Self {
        Self::CaseInsensitiveComparison(field.into(), op, value.into())
    }

    /// Build a `Between` node. `lower_inclusive`/`upper_inclusive` default to
    /// `true` when the caller has no opinion.
    #[inline]
    pub fn between(
        field: impl Into<String>,
        lower: impl Into<String>,
        upper: impl Into<String>,
        lower_inclusive: Option<bool>,
        upper_inclusive: Option<bool>,
    ) -> Self {
        Self::Between(
            field.into(),
            lower.into(),
            upper.into(),
            lower_inclusive.unwrap_or(true),
            upper_inclusive.unwrap_or(true),
        )
    }

    #[inline]
    pub fn in_list(field: impl Into<String>, values: Vec<String>) -> Self {
        Self::InList(field.into(), values)
    }

    #[inline]
    pub fn date_between(
        field: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        formatter_id: impl Into<String>,
    ) -> Self {
        Self::DateBetween(field.into(), start.into(), end.into(), formatter_id.into())
    }

    #[inline]
    pub fn not(child: Node) -> Self {
        Self::Not(Box::new(child))
    }

    #[inline]
    pub fn and(children: Vec<Node>) -> Self {
        Self::Composite(Operator::And, children)
    }

    #[inline]
    pub fn or(children: Vec<Node>) -> Self {
        Self::Composite(Operator::Or, children)
    }

    /// Number of nodes in the tree rooted at `self`, used only for debug
    /// logging around the optimizer pipeline.
    pub fn node_count(&self) -> usize {
        match self {
            Self::Not(child) => 1 + child.node_count(),
            Self::Composite(_, children) => {
                1 + children.iter().map(Node::node_count).sum::<usize>()
            }
            _ => 1,
        }
    }
}

impl Display for Node {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => write!(formatter, "{value}"),
            Self::Comparison(field, op, value) => write!(formatter, "Cmp({field}, {op}, {value})"),
            Self::CaseInsensitiveComparison(field, op, value) => {
                write!(formatter, "CiCmp({field}, {op}, {value})")
            }
            Self::Between(field, lower, upper, lower_inc, upper_inc) => {
                let left = if *lower_inc { "[" } else { "(" };
                let right = if *upper_inc { "]" } else { ")" };
                write!(formatter, "Between({field}, {left}{lower}, {upper}{right})")
            }
            Self::InList(field, values) => write!(formatter, "InList({field}, {values:?})"),
            Self::DateBetween(field, start, end, formatter_id) => {
                write!(formatter, "DateBetween({field}, {start}, {end}, {formatter_id})")
            }
            Self::Not(child) => write!(formatter, "Not({child})"),
            Self::Composite(op, children) => {
                write!(formatter, "{op}[")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(formatter, ", ")?;
                    }
                    write!(formatter, "{child}")?;
                }
                write!(formatter, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn true_and_false_are_canonical() {
        assert_eq!(Node::TRUE, Node::Constant(true));
        assert_eq!(Node::FALSE, Node::Constant(false));
        assert_ne!(Node::TRUE, Node::FALSE);
    }

    #[test]
    fn between_defaults_both_bounds_to_inclusive() {
        let node = Node::between("n", "1", "2", None, None);
        assert_eq!(node, Node::Between("n".into(), "1".into(), "2".into(), true, true));
    }

    #[test]
    fn not_not_is_a_legal_literal_tree() {
        let inner = Node::comparison("a", CmpOp::Equals, "1");
        let node = Node::not(Node::not(inner.clone()));
        assert_eq!(node, Node::Not(Box::new(Node::Not(Box::new(inner)))));
    }

    #[test]
    fn structural_equality_is_field_by_field() {
        let a = Node::comparison("field", CmpOp::Equals, "1");
        let b = Node::comparison("field", CmpOp::Equals, "1");
        let c = Node::comparison("field", CmpOp::Equals, "2");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn comparison_and_case_insensitive_comparison_never_compare_equal() {
        let a = Node::comparison("field", CmpOp::Equals, "1");
        let b = Node::case_insensitive_comparison("field", CmpOp::Equals, "1");
        assert_ne!(a, b);
    }

    #[test]
    fn node_count_counts_every_node_in_the_tree() {
        let tree = Node::and(vec![
            Node::comparison("a", CmpOp::Equals, "1"),
            Node::not(Node::comparison("b", CmpOp::Equals, "2")),
        ]);
        assert_eq!(tree.node_count(), 4);
    }
}
