use std::collections::HashMap;

use itertools::Itertools;

use crate::ast::{CmpOp, Node, Operator};
use crate::range::Range;

/// Coalesce all `Comparison` children of one `Composite(op, children)` that
/// share a field. Non-`Comparison` children (including
/// `CaseInsensitiveComparison`, which is never coalesced with `Comparison`)
/// pass through untouched. Returns the rebuilt child list; the caller is
/// responsible for collapsing a resulting single/empty list (that's P2/P7's
/// job, not this function's).
pub fn coalesce_children(op: Operator, children: Vec<Node>) -> Vec<Node> {
    let mut by_field: HashMap<String, Vec<(CmpOp, String)>> = HashMap::new();
    let mut field_order: Vec<String> = Vec::new();
    let mut others: Vec<Node> = Vec::new();

    for child in children {
        match child {
            Node::Comparison(field, cmp_op, value) => {
                if !by_field.contains_key(&field) {
                    field_order.push(field.clone());
                }
                by_field.entry(field).or_default().push((cmp_op, value));
            }
            other => others.push(other),
        }
    }

    let mut result = Vec::new();
    for field in field_order {
        let comparisons = by_field.remove(&field).unwrap_or_default();
        if comparisons.len() == 1 {
            let (cmp_op, value) = comparisons.into_iter().next().unwrap();
            result.push(Node::comparison(field, cmp_op, value));
            continue;
        }
        result.extend(coalesce_field_group(op, &field, comparisons));
    }
    result.extend(others);
    result
}

/// Coalesce one field's group of 2+ comparisons under connective `op`.
fn coalesce_field_group(op: Operator, field: &str, comparisons: Vec<(CmpOp, String)>) -> Vec<Node> {
    let (equalities, rest): (Vec<_>, Vec<_>) =
        comparisons.into_iter().partition(|(cmp_op, _)| *cmp_op == CmpOp::Equals);

    if !equalities.is_empty() {
        return coalesce_equalities(op, field, equalities, rest);
    }

    coalesce_non_equalities(op, field, rest)
}

fn coalesce_equalities(
    op: Operator,
    field: &str,
    equalities: Vec<(CmpOp, String)>,
    rest: Vec<(CmpOp, String)>,
) -> Vec<Node> {
    match op {
        Operator::And => {
            let distinct_values = equalities.iter().map(|(_, v)| v.as_str()).unique().collect_vec();
            if distinct_values.len() == 1 {
                let mut nodes = vec![Node::comparison(field, CmpOp::Equals, distinct_values[0])];
                nodes.extend(coalesce_non_equalities(op, field, rest));
                nodes
            } else {
                // Contradictory equalities under AND short-circuit the whole
                // group; the non-equality comparisons are discarded because
                // FALSE short-circuits the enclosing AND anyway.
                vec![Node::FALSE]
            }
        }
        Operator::Or => {
            let values = equalities
                .into_iter()
                .map(|(_, v)| v)
                .unique()
                .collect_vec();
            let mut nodes = vec![Node::in_list(field, values)];
            nodes.extend(
                rest.into_iter()
                    .map(|(cmp_op, value)| Node::comparison(field, cmp_op, value)),
            );
            nodes
        }
    }
}

fn coalesce_non_equalities(op: Operator, field: &str, rest: Vec<(CmpOp, String)>) -> Vec<Node> {
    let (range_ops, other_ops): (Vec<_>, Vec<_>) =
        rest.into_iter().partition(|(cmp_op, _)| cmp_op.is_range_op());

    let mut parsed = Vec::new();
    let mut opaque_leaves = Vec::new();
    for (cmp_op, value) in range_ops {
        match Range::from_comparison(field, cmp_op, &value) {
            Ok(range) => parsed.push((range, cmp_op, value)),
            Err(_) => opaque_leaves.push(Node::comparison(field, cmp_op, value)),
        }
    }

    let mut result = fold_parsed_ranges(op, field, parsed);
    result.extend(opaque_leaves);
    result.extend(
        other_ops
            .into_iter()
            .map(|(cmp_op, value)| Node::comparison(field, cmp_op, value)),
    );
    result
}

/// Fold same-field ranges that already parsed cleanly. `AND` always folds:
/// intersection of two ranges is always exactly their set intersection.
/// `OR` only folds when every pair touches or overlaps, since `Range::union`
/// produces the convex hull of its inputs — across a real gap that hull
/// covers values neither original comparison matched. When a gap shows up,
/// every member is kept as its own comparison instead.
fn fold_parsed_ranges(op: Operator, field: &str, parsed: Vec<(Range, CmpOp, String)>) -> Vec<Node> {
    if parsed.is_empty() {
        return Vec::new();
    }

    match op {
        Operator::And => {
            let folded = parsed
                .into_iter()
                .map(|(range, _, _)| range)
                .reduce(Range::intersect)
                .unwrap();
            vec![folded.to_node(field)]
        }
        Operator::Or => {
            let mut acc = parsed[0].0;
            for (range, _, _) in &parsed[1..] {
                if Range::has_gap(acc, *range) {
                    return parsed
                        .into_iter()
                        .map(|(_, cmp_op, value)| Node::comparison(field, cmp_op, value))
                        .collect();
                }
                acc = Range::union(acc, *range);
            }
            vec![acc.to_node(field)]
        }
    }
}
