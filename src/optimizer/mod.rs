//! The rewrite pipeline: `P1 ∘ P2 ∘ P3 ∘ P4 ∘ P5 ∘ P6 ∘ P7 ∘ P8`, run exactly
//! once in that order (no fixed-point loop).

mod passes;

use crate::ast::{Node, Operator};

/// Optimize `node` into an equivalent, smaller, cheaper-to-evaluate tree.
///
/// Total and pure: never fails, never panics on a well-formed tree. Emits a
/// `tracing` debug event for every pass whose output differs from its input.
pub fn optimize(node: Node) -> Node {
    let span = tracing::debug_span!("optimize", nodes_in = node.node_count());
    let _entered = span.enter();

    let node = run_pass("algebraic_simplification", node, passes::algebraic_simplification);
    let node = run_pass("constant_folding", node, passes::constant_folding);
    let node = run_pass("redundancy_elimination", node, passes::redundancy_elimination);
    let node = run_pass("same_field_coalescing", node, passes::same_field_coalescing);
    let node = run_pass("ranges", node, passes::ranges);
    let node = run_pass("absorption", node, passes::absorption);
    let node = run_pass("flattening", node, passes::flattening);
    let node = run_pass("cost_based_reordering", node, passes::cost_based_reordering);

    tracing::debug!(nodes_out = node.node_count(), "optimize finished");
    node
}

fn run_pass(name: &'static str, node: Node, pass: impl Fn(Node) -> Node) -> Node {
    let before_count = node.node_count();
    let result = pass(node);
    if result.node_count() != before_count {
        tracing::debug!(pass = name, before = before_count, after = result.node_count(), "rewrote tree");
    }
    result
}

/// Recompute `estimate_cost` for `node`. Re-exported at the crate root as the
/// optimizer's second public entry point.
pub use crate::cost::estimate_cost;

/// Rebuild a `Composite(op, children)`, enforcing two invariants every pass
/// relies on: no `Composite` ever has zero or exactly one child (collapses to
/// that child, or to the operator's identity if the list is empty), and no
/// `Composite` ever carries a `Constant` among its children (folds away
/// identities, short-circuits on an annihilator).
///
/// P3, P4, P6, P7 and P8 can each produce a fresh `Constant` child as a
/// side effect of collapsing one of their own children (e.g. P3 collapsing a
/// nested complementary pair) even though constant folding proper is P2's
/// job and P2 has already run. Routing every rebuild through this helper is
/// what keeps "constants only ever appear as the tree root" true after the
/// full pipeline, not just after P2.
pub(crate) fn finish_composite(op: Operator, children: Vec<Node>) -> Node {
    let identity = matches!(op, Operator::And);
    let annihilator = !identity;

    if children
        .iter()
        .any(|c| matches!(c, Node::Constant(b) if *b == annihilator))
    {
        return Node::Constant(annihilator);
    }

    let mut filtered: Vec<Node> = children
        .into_iter()
        .filter(|c| !matches!(c, Node::Constant(b) if *b == identity))
        .collect();

    if filtered.is_empty() {
        Node::Constant(identity)
    } else if filtered.len() == 1 {
        filtered.pop().unwrap()
    } else {
        Node::Composite(op, filtered)
    }
}

#[cfg(test)]
mod scenario_tests {
    use super::*;
    use crate::ast::CmpOp;

    #[test]
    fn and_with_a_false_child_collapses_to_false() {
        let tree = Node::and(vec![
            Node::comparison("a", CmpOp::Equals, "1"),
            Node::FALSE,
            Node::comparison("b", CmpOp::Equals, "2"),
        ]);
        assert_eq!(optimize(tree), Node::FALSE);
    }

    /// Both children cost 1, so the stable sort in P8 preserves their order.
    #[test]
    fn de_morgan_pushes_not_through_and_then_reorders_by_equal_cost() {
        let tree = Node::not(Node::and(vec![
            Node::comparison("a", CmpOp::Equals, "1"),
            Node::not(Node::comparison("b", CmpOp::Equals, "2")),
        ]));
        let expected = Node::or(vec![
            Node::not(Node::comparison("a", CmpOp::Equals, "1")),
            Node::comparison("b", CmpOp::Equals, "2"),
        ]);
        assert_eq!(optimize(tree), expected);
    }

    #[test]
    fn contradictory_equalities_under_and_collapse_to_false() {
        let tree = Node::and(vec![
            Node::comparison("x", CmpOp::Equals, "1"),
            Node::comparison("x", CmpOp::Equals, "2"),
        ]);
        assert_eq!(optimize(tree), Node::FALSE);
    }

    #[test]
    fn or_of_equalities_on_one_field_coalesces_to_in_list() {
        let tree = Node::or(vec![
            Node::comparison("x", CmpOp::Equals, "a"),
            Node::comparison("x", CmpOp::Equals, "b"),
            Node::comparison("x", CmpOp::Equals, "c"),
        ]);
        assert_eq!(
            optimize(tree),
            Node::in_list("x", vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn range_intersection_under_and_folds_to_between() {
        let tree = Node::and(vec![
            Node::comparison("n", CmpOp::GreaterThanOrEqual, "10"),
            Node::comparison("n", CmpOp::LessThan, "20"),
            Node::comparison("n", CmpOp::LessThanOrEqual, "15"),
        ]);
        assert_eq!(
            optimize(tree),
            Node::between("n", "10", "15", Some(true), Some(true))
        );
    }

    #[test]
    fn nested_and_flattens_then_reorders_by_cost() {
        let tree = Node::and(vec![
            Node::comparison("a", CmpOp::Contains, "z"),
            Node::and(vec![
                Node::comparison("b", CmpOp::Equals, "1"),
                Node::comparison("c", CmpOp::Matches, ".*"),
            ]),
        ]);
        let expected = Node::and(vec![
            Node::comparison("b", CmpOp::Equals, "1"),
            Node::comparison("a", CmpOp::Contains, "z"),
            Node::comparison("c", CmpOp::Matches, ".*"),
        ]);
        assert_eq!(optimize(tree), expected);
    }

    #[test]
    fn absorption_collapses_and_or_of_a_shared_child() {
        let tree = Node::and(vec![
            Node::comparison("a", CmpOp::Equals, "1"),
            Node::or(vec![
                Node::comparison("a", CmpOp::Equals, "1"),
                Node::comparison("b", CmpOp::Equals, "2"),
            ]),
        ]);
        assert_eq!(optimize(tree), Node::comparison("a", CmpOp::Equals, "1"));
    }

    #[test]
    fn absorption_does_not_drop_a_sibling_conjunct_outside_the_absorbed_pair() {
        use crate::evaluator::evaluate;
        use crate::row::Row;

        let tree = Node::and(vec![
            Node::comparison("a", CmpOp::Equals, "1"),
            Node::or(vec![
                Node::comparison("a", CmpOp::Equals, "1"),
                Node::comparison("b", CmpOp::Equals, "2"),
            ]),
            Node::comparison("c", CmpOp::Equals, "9"),
        ]);
        let optimized = optimize(tree.clone());
        let row = Row::from([("a", "1"), ("c", "no")]);
        assert_eq!(evaluate(&tree, &row), evaluate(&optimized, &row));
        assert!(!evaluate(&optimized, &row));
    }

    #[test]
    fn optimize_is_idempotent_on_a_representative_tree() {
        let tree = Node::not(Node::and(vec![
            Node::comparison("a", CmpOp::Equals, "1"),
            Node::or(vec![
                Node::comparison("b", CmpOp::Equals, "x"),
                Node::comparison("b", CmpOp::Equals, "y"),
            ]),
        ]));
        let once = optimize(tree);
        let twice = optimize(once.clone());
        assert_eq!(once, twice);
    }
}
