use chrono::NaiveDate;
use regex::Regex;

use crate::ast::{CmpOp, Node};
use crate::error::FilterError;
use crate::optimizer::optimize;

/// Entry point of the fluent builder. Every method that produces a root
/// expression finishes by calling `optimize`.
pub struct Filter;

impl Filter {
    pub fn field(name: impl Into<String>) -> FieldFilter {
        FieldFilter { field: name.into() }
    }

    pub fn all_of(children: impl IntoIterator<Item = Node>) -> Node {
        optimize(Node::and(children.into_iter().collect()))
    }

    pub fn any_of(children: impl IntoIterator<Item = Node>) -> Node {
        optimize(Node::or(children.into_iter().collect()))
    }

    pub fn not(child: Node) -> Node {
        optimize(Node::not(child))
    }
}

/// A field name awaiting a comparison. Each terminal method builds the
/// corresponding leaf and optimizes it before returning.
pub struct FieldFilter {
    field: String,
}

macro_rules! leaf_method {
    ($name:ident, $op:expr) => {
        pub fn $name(self, value: impl Into<String>) -> Node {
            optimize(Node::comparison(self.field, $op, value))
        }
    };
}

impl FieldFilter {
    leaf_method!(eq, CmpOp::Equals);
    leaf_method!(ne, CmpOp::NotEquals);
    leaf_method!(gt, CmpOp::GreaterThan);
    leaf_method!(lt, CmpOp::LessThan);
    leaf_method!(ge, CmpOp::GreaterThanOrEqual);
    leaf_method!(le, CmpOp::LessThanOrEqual);
    leaf_method!(contains, CmpOp::Contains);
    leaf_method!(starts_with, CmpOp::StartsWith);
    leaf_method!(ends_with, CmpOp::EndsWith);

    pub fn is_null(self) -> Node {
        optimize(Node::comparison(self.field, CmpOp::IsNull, ""))
    }

    pub fn is_not_null(self) -> Node {
        optimize(Node::comparison(self.field, CmpOp::IsNotNull, ""))
    }

    pub fn eq_ignore_case(self, value: impl Into<String>) -> Node {
        optimize(Node::case_insensitive_comparison(self.field, CmpOp::Equals, value))
    }

    pub fn matches(self, pattern: impl Into<String>) -> Result<Node, FilterError> {
        let pattern = pattern.into();
        Regex::new(&pattern).map_err(|_| FilterError::InvalidPattern(pattern.clone()))?;
        Ok(optimize(Node::comparison(self.field, CmpOp::Matches, pattern)))
    }

    pub fn in_list(self, values: Vec<impl Into<String>>) -> Result<Node, FilterError> {
        if values.is_empty() {
            return Err(FilterError::EmptyInList);
        }
        let values = values.into_iter().map(Into::into).collect();
        Ok(optimize(Node::in_list(self.field, values)))
    }

    pub fn between(self, lower: impl Into<String>, upper: impl Into<String>) -> BetweenFilter {
        BetweenFilter {
            field: self.field,
            lower: lower.into(),
            upper: upper.into(),
            lower_inclusive: true,
            upper_inclusive: true,
        }
    }

    pub fn date_between(
        self,
        start: impl Into<String>,
        end: impl Into<String>,
        format: impl Into<String>,
    ) -> Result<Node, FilterError> {
        let (start, end, format) = (start.into(), end.into(), format.into());
        NaiveDate::parse_from_str(&start, &format)
            .map_err(|_| FilterError::InvalidDateFormat { format: format.clone(), value: start.clone() })?;
        NaiveDate::parse_from_str(&end, &format)
            .map_err(|_| FilterError::InvalidDateFormat { format: format.clone(), value: end.clone() })?;
        Ok(optimize(Node::date_between(self.field, start, end, format)))
    }
}

/// Intermediate builder returned by `FieldFilter::between`, letting either
/// bound be marked exclusive before the node is finalized.
pub struct BetweenFilter {
    field: String,
    lower: String,
    upper: String,
    lower_inclusive: bool,
    upper_inclusive: bool,
}

impl BetweenFilter {
    pub fn exclusive_lower(mut self) -> Self {
        self.lower_inclusive = false;
        self
    }

    pub fn exclusive_upper(mut self) -> Self {
        self.upper_inclusive = false;
        self
    }

    pub fn build(self) -> Node {
        optimize(Node::between(
            self.field,
            self.lower,
            self.upper,
            Some(self.lower_inclusive),
            Some(self.upper_inclusive),
        ))
    }
}
