use crate::ast::{CmpOp, Node, Operator};

/// Integer heuristic cost of evaluating `node`, used to order children for
/// cheapest-first short-circuiting.
///
/// `AND` costs the max of its children (it short-circuits on the first
/// `false`); `OR` costs the sum (it may have to touch every child). `Not`
/// inherits its child's cost. Everything not explicitly classified defaults
/// to `1`.
pub fn estimate_cost(node: &Node) -> u64 {
    match node {
        Node::Comparison(_, op, _) | Node::CaseInsensitiveComparison(_, op, _) => comparison_cost(*op),
        Node::Composite(Operator::And, children) => {
            children.iter().map(estimate_cost).max().unwrap_or(1)
        }
        Node::Composite(Operator::Or, children) => children.iter().map(estimate_cost).sum(),
        Node::Not(child) => estimate_cost(child),
        Node::Constant(_) | Node::Between(..) | Node::InList(..) | Node::DateBetween(..) => 1,
    }
}

fn comparison_cost(op: CmpOp) -> u64 {
    match op {
        CmpOp::Equals | CmpOp::NotEquals => 1,
        CmpOp::GreaterThan | CmpOp::LessThan | CmpOp::GreaterThanOrEqual | CmpOp::LessThanOrEqual => 2,
        CmpOp::Contains | CmpOp::StartsWith | CmpOp::EndsWith => 5,
        CmpOp::Matches => 10,
        CmpOp::IsNull | CmpOp::IsNotNull => 3,
    }
}
