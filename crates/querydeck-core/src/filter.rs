// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document filters.
//!
//! Filters arrive as JSON objects in the usual document-store shape
//! (`{"name": "Q1", "tags": {"$in": ["a", "b"]}}`) and are parsed into a
//! typed [`Filter`] tree. Stores either push parts of a filter down to their
//! engine or evaluate it in process with [`Filter::matches`].

use std::cmp::Ordering;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::QuerydeckError;
use crate::types::{Document, ID_KEY, get_path};

/// Errors raised while parsing filter or update expressions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("expression must be a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("unknown operator `{0}`")]
    UnknownOperator(String),

    #[error("field `{0}` mixes operators and plain keys")]
    MixedOperators(String),

    #[error("operator `{operator}` expects {expected}")]
    InvalidOperand {
        operator: String,
        expected: &'static str,
    },

    #[error("the `_id` field cannot be modified")]
    ImmutableId,
}

impl From<ExpressionError> for QuerydeckError {
    fn from(err: ExpressionError) -> Self {
        QuerydeckError::storage(err)
    }
}

/// A condition applied to the value found at a field path.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Value),
    Ne(Value),
    In(Vec<Value>),
    Nin(Vec<Value>),
    Exists(bool),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
}

/// A parsed document filter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum Filter {
    /// Condition on a (possibly dotted) field path.
    Field { path: String, condition: Condition },
    /// Every sub-filter must match. An empty conjunction matches everything.
    And(Vec<Filter>),
    /// At least one sub-filter must match.
    Or(Vec<Filter>),
    /// The sub-filter must not match.
    Not(Box<Filter>),
}

impl Filter {
    /// The filter that matches every document (`{}`).
    pub fn all() -> Self {
        Filter::And(Vec::new())
    }

    /// Equality on the document identifier.
    pub fn by_id(id: impl Into<String>) -> Self {
        Filter::eq(ID_KEY, Value::String(id.into()))
    }

    /// Equality on a field path.
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Field {
            path: path.into(),
            condition: Condition::Eq(value.into()),
        }
    }

    /// Parses a JSON filter expression.
    pub fn parse(value: &Value) -> Result<Self, ExpressionError> {
        let object = value
            .as_object()
            .ok_or_else(|| ExpressionError::NotAnObject(type_name(value)))?;

        let mut clauses = Vec::with_capacity(object.len());
        for (key, operand) in object {
            match key.as_str() {
                "$and" => clauses.push(Filter::And(parse_list("$and", operand)?)),
                "$or" => clauses.push(Filter::Or(parse_list("$or", operand)?)),
                "$not" => clauses.push(Filter::Not(Box::new(Filter::parse(operand)?))),
                op if op.starts_with('$') => {
                    return Err(ExpressionError::UnknownOperator(op.to_string()));
                }
                path => clauses.extend(parse_field(path, operand)?),
            }
        }

        if clauses.len() == 1 {
            Ok(clauses.remove(0))
        } else {
            Ok(Filter::And(clauses))
        }
    }

    /// Returns true if the document satisfies this filter.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::Field { path, condition } => condition.evaluate(get_path(document, path)),
            Filter::And(filters) => filters.iter().all(|f| f.matches(document)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(document)),
            Filter::Not(filter) => !filter.matches(document),
        }
    }

    /// Returns the identifier if this filter requires `_id` to equal a string.
    ///
    /// Only top-level conjuncts are inspected, so a returned id is a necessary
    /// condition: a store may narrow its candidates to that id and still
    /// evaluate the full filter.
    pub fn id_equality(&self) -> Option<&str> {
        match self {
            Filter::Field {
                path,
                condition: Condition::Eq(Value::String(id)),
            } if path == ID_KEY => Some(id),
            Filter::And(filters) => filters.iter().find_map(Filter::id_equality),
            _ => None,
        }
    }
}

impl TryFrom<Value> for Filter {
    type Error = ExpressionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Filter::parse(&value)
    }
}

impl Default for Filter {
    fn default() -> Self {
        Filter::all()
    }
}

fn parse_list(operator: &str, operand: &Value) -> Result<Vec<Filter>, ExpressionError> {
    operand
        .as_array()
        .ok_or_else(|| ExpressionError::InvalidOperand {
            operator: operator.to_string(),
            expected: "an array of filters",
        })?
        .iter()
        .map(Filter::parse)
        .collect()
}

fn parse_field(path: &str, operand: &Value) -> Result<Vec<Filter>, ExpressionError> {
    let operators = match operand.as_object() {
        Some(object) if !object.is_empty() && object.keys().any(|k| k.starts_with('$')) => {
            if !object.keys().all(|k| k.starts_with('$')) {
                return Err(ExpressionError::MixedOperators(path.to_string()));
            }
            object
        }
        _ => return Ok(vec![Filter::eq(path, operand.clone())]),
    };

    operators
        .iter()
        .map(|(op, arg)| {
            let condition = match op.as_str() {
                "$eq" => Condition::Eq(arg.clone()),
                "$ne" => Condition::Ne(arg.clone()),
                "$in" => Condition::In(array_operand(op, arg)?),
                "$nin" => Condition::Nin(array_operand(op, arg)?),
                "$exists" => Condition::Exists(arg.as_bool().ok_or_else(|| {
                    ExpressionError::InvalidOperand {
                        operator: op.clone(),
                        expected: "a boolean",
                    }
                })?),
                "$gt" => Condition::Gt(arg.clone()),
                "$gte" => Condition::Gte(arg.clone()),
                "$lt" => Condition::Lt(arg.clone()),
                "$lte" => Condition::Lte(arg.clone()),
                other => return Err(ExpressionError::UnknownOperator(other.to_string())),
            };
            Ok(Filter::Field {
                path: path.to_string(),
                condition,
            })
        })
        .collect()
}

fn array_operand(operator: &str, arg: &Value) -> Result<Vec<Value>, ExpressionError> {
    arg.as_array()
        .cloned()
        .ok_or_else(|| ExpressionError::InvalidOperand {
            operator: operator.to_string(),
            expected: "an array",
        })
}

impl Condition {
    fn evaluate(&self, value: Option<&Value>) -> bool {
        match self {
            Condition::Eq(target) => equals_or_contains(value, target),
            Condition::Ne(target) => !equals_or_contains(value, target),
            Condition::In(targets) => targets.iter().any(|t| equals_or_contains(value, t)),
            Condition::Nin(targets) => !targets.iter().any(|t| equals_or_contains(value, t)),
            Condition::Exists(expected) => value.is_some() == *expected,
            Condition::Gt(target) => ordered(value, target, |o| o == Ordering::Greater),
            Condition::Gte(target) => ordered(value, target, |o| o != Ordering::Less),
            Condition::Lt(target) => ordered(value, target, |o| o == Ordering::Less),
            Condition::Lte(target) => ordered(value, target, |o| o != Ordering::Greater),
        }
    }
}

/// Equality with array-membership semantics: a field holding an array
/// matches when the array itself or any element equals the target.
fn equals_or_contains(value: Option<&Value>, target: &Value) -> bool {
    match value {
        None => target.is_null(),
        Some(v) => {
            values_equal(v, target)
                || v.as_array()
                    .is_some_and(|items| items.iter().any(|item| values_equal(item, target)))
        }
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn ordered(value: Option<&Value>, target: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    let Some(value) = value else {
        return false;
    };
    let check = |candidate: &Value| compare(candidate, target).is_some_and(&accept);
    match value {
        Value::Array(items) => items.iter().any(check),
        other => check(other),
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn query() -> Document {
        doc(json!({
            "_id": "q1",
            "name": "Monthly packages",
            "tags": ["npm", "growth"],
            "rowLimit": 500,
            "chartConfiguration": {"chartType": "line", "fields": {"x": "created_month"}}
        }))
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = Filter::parse(&json!({})).unwrap();
        assert_eq!(filter, Filter::all());
        assert!(filter.matches(&query()));
        assert!(filter.matches(&Document::new()));
    }

    #[test]
    fn plain_equality_and_array_membership() {
        assert!(Filter::parse(&json!({"name": "Monthly packages"})).unwrap().matches(&query()));
        assert!(Filter::parse(&json!({"tags": "npm"})).unwrap().matches(&query()));
        assert!(!Filter::parse(&json!({"tags": "python"})).unwrap().matches(&query()));
        assert!(
            Filter::parse(&json!({"tags": ["npm", "growth"]}))
                .unwrap()
                .matches(&query())
        );
    }

    #[test]
    fn dotted_paths_reach_nested_fields() {
        let filter = Filter::parse(&json!({"chartConfiguration.chartType": "line"})).unwrap();
        assert!(filter.matches(&query()));
        let filter = Filter::parse(&json!({"chartConfiguration.fields.y": {"$exists": true}})).unwrap();
        assert!(!filter.matches(&query()));
    }

    #[test]
    fn comparison_operators() {
        let q = query();
        assert!(Filter::parse(&json!({"rowLimit": {"$gt": 100}})).unwrap().matches(&q));
        assert!(Filter::parse(&json!({"rowLimit": {"$gte": 500.0}})).unwrap().matches(&q));
        assert!(!Filter::parse(&json!({"rowLimit": {"$lt": 500}})).unwrap().matches(&q));
        assert!(Filter::parse(&json!({"name": {"$lte": "N"}})).unwrap().matches(&q));
        // Mismatched types never order.
        assert!(!Filter::parse(&json!({"name": {"$gt": 1}})).unwrap().matches(&q));
        assert!(!Filter::parse(&json!({"missing": {"$lt": 1}})).unwrap().matches(&q));
    }

    #[test]
    fn set_membership_operators() {
        let q = query();
        assert!(Filter::parse(&json!({"tags": {"$in": ["python", "growth"]}})).unwrap().matches(&q));
        assert!(!Filter::parse(&json!({"tags": {"$nin": ["npm"]}})).unwrap().matches(&q));
        assert!(Filter::parse(&json!({"name": {"$ne": "Other"}})).unwrap().matches(&q));
    }

    #[test]
    fn missing_fields_equal_null() {
        let q = query();
        assert!(Filter::parse(&json!({"queryText": null})).unwrap().matches(&q));
        assert!(Filter::parse(&json!({"queryText": {"$exists": false}})).unwrap().matches(&q));
    }

    #[test]
    fn logical_combinators() {
        let q = query();
        let filter = Filter::parse(&json!({
            "$or": [{"name": "nope"}, {"tags": "npm"}],
            "$not": {"_id": "other"}
        }))
        .unwrap();
        assert!(filter.matches(&q));

        let filter = Filter::parse(&json!({"$and": [{"_id": "q1"}, {"tags": "python"}]})).unwrap();
        assert!(!filter.matches(&q));
    }

    #[test]
    fn id_equality_is_found_in_top_level_conjuncts() {
        assert_eq!(Filter::by_id("abc").id_equality(), Some("abc"));
        let filter = Filter::parse(&json!({"_id": "abc", "name": "x"})).unwrap();
        assert_eq!(filter.id_equality(), Some("abc"));
        let filter = Filter::parse(&json!({"$or": [{"_id": "abc"}]})).unwrap();
        assert_eq!(filter.id_equality(), None);
        assert_eq!(Filter::all().id_equality(), None);
    }

    #[test]
    fn malformed_expressions_are_rejected() {
        assert_eq!(
            Filter::parse(&json!([1, 2])),
            Err(ExpressionError::NotAnObject("an array"))
        );
        assert_eq!(
            Filter::parse(&json!({"$where": "1"})),
            Err(ExpressionError::UnknownOperator("$where".into()))
        );
        assert_eq!(
            Filter::parse(&json!({"name": {"$regex": "x"}})),
            Err(ExpressionError::UnknownOperator("$regex".into()))
        );
        assert_eq!(
            Filter::parse(&json!({"name": {"$eq": "x", "plain": 1}})),
            Err(ExpressionError::MixedOperators("name".into()))
        );
        assert!(matches!(
            Filter::parse(&json!({"tags": {"$in": "npm"}})),
            Err(ExpressionError::InvalidOperand { .. })
        ));
    }

    #[test]
    fn filters_deserialize_from_json() {
        let filter: Filter = serde_json::from_value(json!({"name": "Monthly packages"})).unwrap();
        assert!(filter.matches(&query()));
        let err = serde_json::from_value::<Filter>(json!({"$bogus": 1})).unwrap_err();
        assert!(err.to_string().contains("$bogus"));
    }

    proptest! {
        #[test]
        fn ne_is_the_negation_of_eq(field in "[a-z]{1,8}", stored in ".*", probe in ".*") {
            let document = doc(json!({ field.clone(): stored }));
            let eq = Filter::parse(&json!({ field.clone(): {"$eq": probe.clone()} })).unwrap();
            let ne = Filter::parse(&json!({ field: {"$ne": probe} })).unwrap();
            prop_assert_ne!(eq.matches(&document), ne.matches(&document));
        }
    }
}
