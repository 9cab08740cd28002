use crate::ast::{CmpOp, Node};

/// A canonical numeric interval: `lower == None` means unbounded below,
/// `upper == None` means unbounded above. The distinguished [`Range::EMPTY`]
/// represents the contradictory range (matches nothing).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub lower: Option<f64>,
    pub lower_inclusive: bool,
    pub upper: Option<f64>,
    pub upper_inclusive: bool,
}

/// Why a `Comparison` could not be folded into a [`Range`]. Both variants are
/// handled locally by the coalescer: the offending comparison is left as an
/// opaque leaf, never propagated to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    UnsupportedRangeOp,
    NumericParseFailure,
}

impl Range {
    /// The unbounded-both-ways range: matches every number.
    pub const UNBOUNDED: Range = Range {
        lower: None,
        lower_inclusive: true,
        upper: None,
        upper_inclusive: true,
    };

    /// The empty range: matches no number.
    pub const EMPTY: Range = Range {
        lower: Some(0.0),
        lower_inclusive: false,
        upper: Some(0.0),
        upper_inclusive: false,
    };

    /// Map a single numeric `Comparison` node to a `Range`. Fails with
    /// `UnsupportedRangeOp` for an op the algebra does not cover, or with
    /// `NumericParseFailure` if `value` does not parse as an `f64`.
    pub fn from_comparison(field: &str, op: CmpOp, value: &str) -> Result<Self, RangeError> {
        let _ = field;
        let v: f64 = value.parse().map_err(|_| RangeError::NumericParseFailure)?;
        Ok(match op {
            CmpOp::GreaterThan => Range {
                lower: Some(v),
                lower_inclusive: false,
                upper: None,
                upper_inclusive: true,
            },
            CmpOp::GreaterThanOrEqual => Range {
                lower: Some(v),
                lower_inclusive: true,
                upper: None,
                upper_inclusive: true,
            },
            CmpOp::LessThan => Range {
                lower: None,
                lower_inclusive: true,
                upper: Some(v),
                upper_inclusive: false,
            },
            CmpOp::LessThanOrEqual => Range {
                lower: None,
                lower_inclusive: true,
                upper: Some(v),
                upper_inclusive: true,
            },
            CmpOp::Equals => Range {
                lower: Some(v),
                lower_inclusive: true,
                upper: Some(v),
                upper_inclusive: true,
            },
            _ => return Err(RangeError::UnsupportedRangeOp),
        })
    }

    /// Intersect two ranges: the tighter lower bound and the tighter upper
    /// bound, AND-ing inclusivity on a tie.
    pub fn intersect(a: Range, b: Range) -> Range {
        let (lower, lower_inclusive) = tighter_lower(a, b);
        let (upper, upper_inclusive) = tighter_upper(a, b);
        let candidate = Range {
            lower,
            lower_inclusive,
            upper,
            upper_inclusive,
        };
        if candidate.is_empty() {
            Range::EMPTY
        } else {
            candidate
        }
    }

    /// Union two ranges: the looser lower bound and the looser upper bound,
    /// OR-ing inclusivity on a tie. Never produces `EMPTY` from two
    /// non-empty inputs.
    pub fn union(a: Range, b: Range) -> Range {
        let (lower, lower_inclusive) = looser_lower(a, b);
        let (upper, upper_inclusive) = looser_upper(a, b);
        Range {
            lower,
            lower_inclusive,
            upper,
            upper_inclusive,
        }
    }

    /// True if `a` and `b` leave a real gap between them: a value covered by
    /// neither. `union` always returns the convex hull of its two inputs,
    /// which only equals the true set union when the inputs overlap or
    /// touch — the caller must check this before folding two ranges under
    /// `OR`, or the hull will match values neither original range matched.
    pub fn has_gap(a: Range, b: Range) -> bool {
        fn below_with_gap(lower_side: Range, upper_side: Range) -> bool {
            match (lower_side.upper, upper_side.lower) {
                (Some(u), Some(l)) => {
                    u < l || (u == l && !(lower_side.upper_inclusive && upper_side.lower_inclusive))
                }
                _ => false,
            }
        }
        below_with_gap(a, b) || below_with_gap(b, a)
    }

    /// True iff both bounds are finite and `lower > upper`, or the bounds are
    /// equal but at least one side is exclusive.
    pub fn is_empty(self) -> bool {
        match (self.lower, self.upper) {
            (Some(lower), Some(upper)) => {
                lower > upper || (lower == upper && !(self.lower_inclusive && self.upper_inclusive))
            }
            _ => false,
        }
    }

    /// Lower a `Range` back to an AST node for the given field.
    pub fn to_node(self, field: &str) -> Node {
        if self.is_empty() {
            return Node::FALSE;
        }
        match (self.lower, self.upper) {
            (None, None) => Node::TRUE,
            (Some(lower), Some(upper))
                if lower == upper && self.lower_inclusive && self.upper_inclusive =>
            {
                Node::comparison(field, CmpOp::Equals, format_bound(lower))
            }
            (Some(lower), Some(upper)) => Node::between(
                field,
                format_bound(lower),
                format_bound(upper),
                Some(self.lower_inclusive),
                Some(self.upper_inclusive),
            ),
            (Some(lower), None) => {
                let op = if self.lower_inclusive {
                    CmpOp::GreaterThanOrEqual
                } else {
                    CmpOp::GreaterThan
                };
                Node::comparison(field, op, format_bound(lower))
            }
            (None, Some(upper)) => {
                let op = if self.upper_inclusive {
                    CmpOp::LessThanOrEqual
                } else {
                    CmpOp::LessThan
                };
                Node::comparison(field, op, format_bound(upper))
            }
        }
    }
}

/// Canonical re-stringification of a range bound: plain `f64` `Display`,
/// e.g. `10.0`, not `10`.
fn format_bound(value: f64) -> String {
    format!("{value}")
}

fn tighter_lower(a: Range, b: Range) -> (Option<f64>, bool) {
    match (a.lower, b.lower) {
        (None, None) => (None, true),
        (None, Some(_)) => (b.lower, b.lower_inclusive),
        (Some(_), None) => (a.lower, a.lower_inclusive),
        (Some(x), Some(y)) if x > y => (a.lower, a.lower_inclusive),
        (Some(x), Some(y)) if y > x => (b.lower, b.lower_inclusive),
        _ => (a.lower, a.lower_inclusive && b.lower_inclusive),
    }
}

fn tighter_upper(a: Range, b: Range) -> (Option<f64>, bool) {
    match (a.upper, b.upper) {
        (None, None) => (None, true),
        (None, Some(_)) => (b.upper, b.upper_inclusive),
        (Some(_), None) => (a.upper, a.upper_inclusive),
        (Some(x), Some(y)) if x < y => (a.upper, a.upper_inclusive),
        (Some(x), Some(y)) if y < x => (b.upper, b.upper_inclusive),
        _ => (a.upper, a.upper_inclusive && b.upper_inclusive),
    }
}

fn looser_lower(a: Range, b: Range) -> (Option<f64>, bool) {
    match (a.lower, b.lower) {
        (None, _) | (_, None) => (None, true),
        (Some(x), Some(y)) if x < y => (a.lower, a.lower_inclusive),
        (Some(x), Some(y)) if y < x => (b.lower, b.lower_inclusive),
        _ => (a.lower, a.lower_inclusive || b.lower_inclusive),
    }
}

fn looser_upper(a: Range, b: Range) -> (Option<f64>, bool) {
    match (a.upper, b.upper) {
        (None, _) | (_, None) => (None, true),
        (Some(x), Some(y)) if x > y => (a.upper, a.upper_inclusive),
        (Some(x), Some(y)) if y > x => (b.upper, b.upper_inclusive),
        _ => (a.upper, a.upper_inclusive || b.upper_inclusive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(lower: Option<f64>, lower_inc: bool, upper: Option<f64>, upper_inc: bool) -> Range {
        Range {
            lower,
            lower_inclusive: lower_inc,
            upper,
            upper_inclusive: upper_inc,
        }
    }

    #[test]
    fn from_comparison_maps_each_range_operator() {
        assert_eq!(
            Range::from_comparison("n", CmpOp::GreaterThan, "10").unwrap(),
            range(Some(10.0), false, None, true)
        );
        assert_eq!(
            Range::from_comparison("n", CmpOp::GreaterThanOrEqual, "10").unwrap(),
            range(Some(10.0), true, None, true)
        );
        assert_eq!(
            Range::from_comparison("n", CmpOp::LessThan, "10").unwrap(),
            range(None, true, Some(10.0), false)
        );
        assert_eq!(
            Range::from_comparison("n", CmpOp::LessThanOrEqual, "10").unwrap(),
            range(None, true, Some(10.0), true)
        );
        assert_eq!(
            Range::from_comparison("n", CmpOp::Equals, "10").unwrap(),
            range(Some(10.0), true, Some(10.0), true)
        );
    }

    #[test]
    fn from_comparison_rejects_non_range_ops() {
        assert_eq!(
            Range::from_comparison("n", CmpOp::Contains, "10").unwrap_err(),
            RangeError::UnsupportedRangeOp
        );
    }

    #[test]
    fn from_comparison_rejects_unparseable_values() {
        assert_eq!(
            Range::from_comparison("n", CmpOp::GreaterThan, "not-a-number").unwrap_err(),
            RangeError::NumericParseFailure
        );
    }

    #[test]
    fn intersect_tightens_to_the_narrower_bound_on_each_side() {
        let a = range(Some(10.0), true, Some(20.0), true);
        let b = range(Some(5.0), true, Some(15.0), true);
        assert_eq!(Range::intersect(a, b), range(Some(10.0), true, Some(15.0), true));
    }

    #[test]
    fn intersect_ands_inclusivity_on_a_tie() {
        let a = range(Some(10.0), true, None, true);
        let b = range(Some(10.0), false, None, true);
        assert_eq!(Range::intersect(a, b).lower_inclusive, false);
    }

    #[test]
    fn intersect_returns_empty_when_lower_exceeds_upper() {
        let a = range(Some(20.0), true, None, true);
        let b = range(None, true, Some(10.0), true);
        assert!(Range::intersect(a, b).is_empty());
    }

    #[test]
    fn intersect_returns_empty_on_touching_exclusive_bounds() {
        let a = range(Some(10.0), true, Some(10.0), false);
        let b = Range::UNBOUNDED;
        assert!(Range::intersect(a, b).is_empty());
    }

    #[test]
    fn union_loosens_to_the_wider_bound_on_each_side() {
        let a = range(Some(10.0), true, Some(20.0), true);
        let b = range(Some(5.0), true, Some(15.0), true);
        assert_eq!(Range::union(a, b), range(Some(5.0), true, Some(20.0), true));
    }

    #[test]
    fn union_ors_inclusivity_on_a_tie() {
        let a = range(Some(10.0), true, None, true);
        let b = range(Some(10.0), false, None, true);
        assert_eq!(Range::union(a, b).lower_inclusive, true);
    }

    #[test]
    fn union_of_finite_ranges_never_reports_empty() {
        let a = range(Some(10.0), true, Some(20.0), true);
        let b = range(Some(100.0), true, Some(200.0), true);
        assert!(!Range::union(a, b).is_empty());
    }

    #[test]
    fn to_node_lowers_empty_to_false() {
        assert_eq!(Range::EMPTY.to_node("n"), Node::FALSE);
    }

    #[test]
    fn to_node_lowers_unbounded_to_true() {
        assert_eq!(Range::UNBOUNDED.to_node("n"), Node::TRUE);
    }

    #[test]
    fn to_node_lowers_a_point_range_to_equals() {
        let point = range(Some(10.0), true, Some(10.0), true);
        assert_eq!(point.to_node("n"), Node::comparison("n", CmpOp::Equals, "10"));
    }

    #[test]
    fn to_node_lowers_a_two_sided_range_to_between() {
        let bounded = range(Some(10.0), true, Some(15.0), true);
        assert_eq!(
            bounded.to_node("n"),
            Node::between("n", "10", "15", Some(true), Some(true))
        );
    }

    #[test]
    fn to_node_lowers_a_one_sided_range_to_a_comparison() {
        let lower_only = range(Some(10.0), false, None, true);
        assert_eq!(lower_only.to_node("n"), Node::comparison("n", CmpOp::GreaterThan, "10"));

        let upper_only = range(None, true, Some(15.0), false);
        assert_eq!(upper_only.to_node("n"), Node::comparison("n", CmpOp::LessThan, "15"));
    }

    #[test]
    fn has_gap_detects_disjoint_unbounded_rays() {
        let above_ten = range(Some(10.0), false, None, true);
        let below_five = range(None, true, Some(5.0), false);
        assert!(Range::has_gap(above_ten, below_five));
    }

    #[test]
    fn has_gap_is_false_when_rays_overlap() {
        let above_five = range(Some(5.0), false, None, true);
        let below_ten = range(None, true, Some(10.0), false);
        assert!(!Range::has_gap(above_five, below_ten));
    }

    #[test]
    fn has_gap_is_false_when_bounds_touch_inclusively() {
        let up_to_ten = range(None, true, Some(10.0), true);
        let from_ten = range(Some(10.0), true, None, true);
        assert!(!Range::has_gap(up_to_ten, from_ten));
    }

    #[test]
    fn has_gap_is_true_when_bounds_touch_but_both_exclude_the_point() {
        let up_to_ten = range(None, true, Some(10.0), false);
        let from_ten = range(Some(10.0), false, None, true);
        assert!(Range::has_gap(up_to_ten, from_ten));
    }

    #[test]
    fn has_gap_detects_disjoint_bounded_ranges() {
        let low = range(Some(10.0), true, Some(20.0), true);
        let high = range(Some(100.0), true, Some(200.0), true);
        assert!(Range::has_gap(low, high));
    }
}
