use chrono::NaiveDate;
use regex::Regex;

use crate::ast::{CmpOp, Node, Operator};
use crate::row::Row;

/// Apply `node` to `row`. Correct on both optimized and un-optimized trees,
/// since `optimize` never changes meaning.
///
/// A missing field behaves as SQL NULL: every comparison is `false` except
/// `IS_NULL` (`true`) and `NOT_EQUALS` (`true`, since NULL is never equal to
/// a literal).
pub fn evaluate(node: &Node, row: &Row) -> bool {
    match node {
        Node::Constant(value) => *value,
        Node::Comparison(field, op, value) => eval_comparison(row.get(field), *op, value, false),
        Node::CaseInsensitiveComparison(field, op, value) => {
            eval_comparison(row.get(field), *op, value, true)
        }
        Node::Between(field, lower, upper, lower_inclusive, upper_inclusive) => {
            eval_between(row.get(field), lower, upper, *lower_inclusive, *upper_inclusive)
        }
        Node::InList(field, values) => match row.get(field) {
            Some(value) => values.iter().any(|candidate| candidate == value),
            None => false,
        },
        Node::DateBetween(field, start, end, formatter_id) => {
            eval_date_between(row.get(field), start, end, formatter_id)
        }
        Node::Not(child) => !evaluate(child, row),
        Node::Composite(Operator::And, children) => children.iter().all(|child| evaluate(child, row)),
        Node::Composite(Operator::Or, children) => children.iter().any(|child| evaluate(child, row)),
    }
}

fn eval_comparison(field_value: Option<&str>, op: CmpOp, value: &str, case_insensitive: bool) -> bool {
    if op == CmpOp::IsNull {
        return field_value.is_none();
    }
    if op == CmpOp::IsNotNull {
        return field_value.is_some();
    }

    let Some(raw) = field_value else {
        return op == CmpOp::NotEquals;
    };

    let folded_field;
    let folded_value;
    let (field, value) = if case_insensitive {
        folded_field = raw.to_lowercase();
        folded_value = value.to_lowercase();
        (folded_field.as_str(), folded_value.as_str())
    } else {
        (raw, value)
    };

    match op {
        CmpOp::Equals => field == value,
        CmpOp::NotEquals => field != value,
        CmpOp::Contains => field.contains(value),
        CmpOp::StartsWith => field.starts_with(value),
        CmpOp::EndsWith => field.ends_with(value),
        CmpOp::Matches => Regex::new(value).is_ok_and(|re| re.is_match(field)),
        CmpOp::GreaterThan | CmpOp::LessThan | CmpOp::GreaterThanOrEqual | CmpOp::LessThanOrEqual => {
            match (field.parse::<f64>(), value.parse::<f64>()) {
                (Ok(field), Ok(value)) => match op {
                    CmpOp::GreaterThan => field > value,
                    CmpOp::LessThan => field < value,
                    CmpOp::GreaterThanOrEqual => field >= value,
                    CmpOp::LessThanOrEqual => field <= value,
                    _ => unreachable!(),
                },
                _ => false,
            }
        }
        CmpOp::IsNull | CmpOp::IsNotNull => unreachable!("handled above"),
    }
}

fn eval_between(field_value: Option<&str>, lower: &str, upper: &str, lower_inclusive: bool, upper_inclusive: bool) -> bool {
    let Some(field_value) = field_value else {
        return false;
    };
    let (Ok(value), Ok(lower), Ok(upper)) = (field_value.parse::<f64>(), lower.parse::<f64>(), upper.parse::<f64>())
    else {
        return false;
    };
    let above_lower = if lower_inclusive { value >= lower } else { value > lower };
    let below_upper = if upper_inclusive { value <= upper } else { value < upper };
    above_lower && below_upper
}

fn eval_date_between(field_value: Option<&str>, start: &str, end: &str, formatter_id: &str) -> bool {
    let Some(field_value) = field_value else {
        return false;
    };
    let (Ok(value), Ok(start), Ok(end)) = (
        NaiveDate::parse_from_str(field_value, formatter_id),
        NaiveDate::parse_from_str(start, formatter_id),
        NaiveDate::parse_from_str(end, formatter_id),
    ) else {
        return false;
    };
    start <= value && value <= end
}
