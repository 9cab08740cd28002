use crate::ast::{Node, Operator};
use crate::coalesce::coalesce_children;
use crate::cost::estimate_cost;
use crate::optimizer::finish_composite;

/// P1. `Not(Not(x)) → x`, De Morgan pushdown of `Not(AND)`/`Not(OR)`.
/// Comparison-level negation (flipping a leaf's op) is deliberately not
/// performed here; a `Not` over a leaf stays a `Not`.
pub fn algebraic_simplification(node: Node) -> Node {
    match node {
        Node::Not(child) => match *child {
            Node::Not(inner) => algebraic_simplification(*inner),
            Node::Composite(Operator::And, children) => {
                let negated = children
                    .into_iter()
                    .map(|c| algebraic_simplification(Node::not(c)))
                    .collect();
                Node::Composite(Operator::Or, negated)
            }
            Node::Composite(Operator::Or, children) => {
                let negated = children
                    .into_iter()
                    .map(|c| algebraic_simplification(Node::not(c)))
                    .collect();
                Node::Composite(Operator::And, negated)
            }
            other => Node::not(algebraic_simplification(other)),
        },
        Node::Composite(op, children) => {
            Node::Composite(op, children.into_iter().map(algebraic_simplification).collect())
        }
        leaf => leaf,
    }
}

/// P2. Recursive constant folding: drop identities, collapse on annihilators,
/// unwrap singleton/empty child lists, fold `Not(Constant(b))`.
pub fn constant_folding(node: Node) -> Node {
    match node {
        Node::Composite(op, children) => {
            let children: Vec<Node> = children.into_iter().map(constant_folding).collect();
            finish_composite(op, children)
        }
        Node::Not(child) => {
            let child = constant_folding(*child);
            match child {
                Node::Constant(b) => Node::Constant(!b),
                other => Node::not(other),
            }
        }
        leaf => leaf,
    }
}

/// P3. Bottom-up duplicate elimination and complementary-pair detection
/// within one `Composite`. Not a SAT check: nested connectives are not
/// reasoned across.
pub fn redundancy_elimination(node: Node) -> Node {
    match node {
        Node::Composite(op, children) => {
            let children: Vec<Node> = children.into_iter().map(redundancy_elimination).collect();
            redundancy_for_composite(op, children)
        }
        Node::Not(child) => Node::not(redundancy_elimination(*child)),
        leaf => leaf,
    }
}

fn redundancy_for_composite(op: Operator, children: Vec<Node>) -> Node {
    let mut positives: Vec<Node> = Vec::new();
    let mut negated_contents: Vec<Node> = Vec::new();

    for child in children {
        match child {
            Node::Not(inner) => {
                if !negated_contents.contains(&*inner) {
                    negated_contents.push(*inner);
                }
            }
            other => {
                if !positives.contains(&other) {
                    positives.push(other);
                }
            }
        }
    }

    let annihilator = matches!(op, Operator::Or);
    if positives.iter().any(|p| negated_contents.contains(p)) {
        return Node::Constant(annihilator);
    }

    let mut result = positives;
    result.extend(negated_contents.into_iter().map(Node::not));
    finish_composite(op, result)
}

/// P4. Apply the per-field coalescer (see `coalesce` module) to each
/// `Composite`, bottom-up.
pub fn same_field_coalescing(node: Node) -> Node {
    match node {
        Node::Composite(op, children) => {
            let children: Vec<Node> = children.into_iter().map(same_field_coalescing).collect();
            let coalesced = coalesce_children(op, children);
            finish_composite(op, coalesced)
        }
        Node::Not(child) => Node::not(same_field_coalescing(*child)),
        leaf => leaf,
    }
}

/// P5. Identity hook reserved for future range-merging extensions; range
/// merging itself is performed by P4.
pub fn ranges(node: Node) -> Node {
    node
}

/// P6. `A AND (A OR B) → A`. Only the AND/OR direction is implemented; the
/// dual `A OR (A AND B) → A` is not required.
pub fn absorption(node: Node) -> Node {
    match node {
        Node::Composite(op, children) => {
            let children: Vec<Node> = children.into_iter().map(absorption).collect();
            let children = if matches!(op, Operator::And) {
                drop_absorbed_or_children(children)
            } else {
                children
            };
            finish_composite(op, children)
        }
        Node::Not(child) => Node::not(absorption(*child)),
        leaf => leaf,
    }
}

/// Drop any `OR` child whose disjuncts already include one of its AND
/// siblings (`A AND (A OR B) -> A`): the shared sibling is kept as its own
/// conjunct, so the `OR` child adds nothing and can simply be removed.
/// Siblings unrelated to the absorbed pair are left untouched.
fn drop_absorbed_or_children(children: Vec<Node>) -> Vec<Node> {
    children
        .iter()
        .enumerate()
        .filter(|(i, child)| {
            let Node::Composite(Operator::Or, or_children) = child else {
                return true;
            };
            !children
                .iter()
                .enumerate()
                .any(|(j, other)| j != *i && or_children.contains(other))
        })
        .map(|(_, child)| child.clone())
        .collect()
}

/// P7. Associative flattening of same-operator nesting. `Not` does not
/// associate and is carried through as-is.
pub fn flattening(node: Node) -> Node {
    match node {
        Node::Composite(op, children) => {
            let children: Vec<Node> = children.into_iter().map(flattening).collect();
            let mut flat = Vec::with_capacity(children.len());
            for child in children {
                match child {
                    Node::Composite(child_op, grandchildren) if child_op == op => {
                        flat.extend(grandchildren);
                    }
                    other => flat.push(other),
                }
            }
            finish_composite(op, flat)
        }
        Node::Not(child) => Node::not(flattening(*child)),
        leaf => leaf,
    }
}

/// P8. Stable sort of each `Composite`'s children by non-decreasing cost.
pub fn cost_based_reordering(node: Node) -> Node {
    match node {
        Node::Composite(op, children) => {
            let mut children: Vec<Node> = children.into_iter().map(cost_based_reordering).collect();
            children.sort_by_key(estimate_cost);
            finish_composite(op, children)
        }
        Node::Not(child) => Node::not(cost_based_reordering(*child)),
        leaf => leaf,
    }
}
