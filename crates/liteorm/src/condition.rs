//! Query condition types for dynamic queries.
//!
//! This module provides [`Op`] (operator with its operand), [`Condition`] (one
//! predicate over a column) and [`Filter`] (an AND-joined sequence of conditions).
//! All statement builders share these types, so the rendering rules live here only.

use crate::error::OrmResult;
use crate::ident::validate_ident;
use crate::qb::param::ParamList;
use crate::value::Value;

/// Comparison operator tag of a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    In,
    NotIn,
}

impl Operator {
    /// SQL symbol of the operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
        }
    }

    /// Whether the operator takes a list operand.
    pub fn is_list(self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

/// Query operator together with its operand.
///
/// `In`/`NotIn` carry a list, every other operator carries one scalar.
///
/// # Example
/// ```
/// use liteorm::Op;
///
/// let _ = Op::eq("value");
/// let _ = Op::gt(100);
/// let _ = Op::in_list(vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone)]
pub enum Op<T> {
    /// Equal: column = value
    Eq(T),
    /// Not equal: column != value
    Ne(T),
    /// Greater than: column > value
    Gt(T),
    /// Less than: column < value
    Lt(T),
    /// IN (list)
    In(Vec<T>),
    /// NOT IN (list)
    NotIn(Vec<T>),
}

impl<T> Op<T> {
    pub fn eq(val: T) -> Self {
        Op::Eq(val)
    }

    pub fn ne(val: T) -> Self {
        Op::Ne(val)
    }

    pub fn gt(val: T) -> Self {
        Op::Gt(val)
    }

    pub fn lt(val: T) -> Self {
        Op::Lt(val)
    }

    pub fn in_list(vals: Vec<T>) -> Self {
        Op::In(vals)
    }

    pub fn not_in(vals: Vec<T>) -> Self {
        Op::NotIn(vals)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ConditionValue {
    Single(Value),
    List(Vec<Value>),
}

/// A single predicate: column, operator and operand(s).
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    column: String,
    operator: Operator,
    value: ConditionValue,
}

impl Condition {
    /// Create a condition from a column name and an operator.
    pub fn new<T: Into<Value>>(column: impl Into<String>, op: Op<T>) -> Self {
        let (operator, value) = match op {
            Op::Eq(v) => (Operator::Eq, ConditionValue::Single(v.into())),
            Op::Ne(v) => (Operator::Ne, ConditionValue::Single(v.into())),
            Op::Gt(v) => (Operator::Gt, ConditionValue::Single(v.into())),
            Op::Lt(v) => (Operator::Lt, ConditionValue::Single(v.into())),
            Op::In(vals) => (
                Operator::In,
                ConditionValue::List(vals.into_iter().map(Into::into).collect()),
            ),
            Op::NotIn(vals) => (
                Operator::NotIn,
                ConditionValue::List(vals.into_iter().map(Into::into).collect()),
            ),
        };

        Condition {
            column: column.into(),
            operator,
            value,
        }
    }

    /// column = value
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Eq(value.into()))
    }

    /// column != value
    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Ne(value.into()))
    }

    /// column > value
    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Gt(value.into()))
    }

    /// column < value
    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Lt(value.into()))
    }

    /// column IN (values...)
    pub fn in_list<T: Into<Value>>(column: impl Into<String>, values: Vec<T>) -> Self {
        Self::new(column, Op::In(values))
    }

    /// column NOT IN (values...)
    pub fn not_in<T: Into<Value>>(column: impl Into<String>, values: Vec<T>) -> Self {
        Self::new(column, Op::NotIn(values))
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Number of parameters this condition binds.
    pub fn param_count(&self) -> usize {
        match &self.value {
            ConditionValue::Single(_) => 1,
            ConditionValue::List(vals) => vals.len(),
        }
    }

    /// Render the SQL fragment, pushing its values onto `params`.
    ///
    /// An empty `IN` list renders `1=0` and an empty `NOT IN` list renders `1=1`;
    /// neither binds a parameter.
    pub fn build(&self, params: &mut ParamList) -> String {
        let op = self.operator.as_sql();
        match &self.value {
            ConditionValue::Single(v) => {
                let idx = params.push(v.clone());
                format!("{} {} ?{}", self.column, op, idx)
            }
            ConditionValue::List(vals) if vals.is_empty() => {
                if self.operator == Operator::In {
                    "1=0".to_string()
                } else {
                    "1=1".to_string()
                }
            }
            ConditionValue::List(vals) => {
                let placeholders: Vec<String> = vals
                    .iter()
                    .map(|v| format!("?{}", params.push(v.clone())))
                    .collect();
                format!("{} {} ({})", self.column, op, placeholders.join(", "))
            }
        }
    }
}

/// An ordered conjunction of conditions.
///
/// Conditions render in insertion order, which is also the parameter order.
///
/// # Example
/// ```
/// use liteorm::Filter;
///
/// let filter = Filter::new().eq("name", "John Doe").gt("id", 0);
/// assert_eq!(filter.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Append a condition.
    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    /// Append a condition (chaining form).
    pub fn and(mut self, condition: Condition) -> Self {
        self.push(condition);
        self
    }

    pub fn add_condition<T: Into<Value>>(self, column: &str, op: Op<T>) -> Self {
        self.and(Condition::new(column, op))
    }

    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.and(Condition::eq(column, value))
    }

    pub fn ne(self, column: &str, value: impl Into<Value>) -> Self {
        self.and(Condition::ne(column, value))
    }

    pub fn gt(self, column: &str, value: impl Into<Value>) -> Self {
        self.and(Condition::gt(column, value))
    }

    pub fn lt(self, column: &str, value: impl Into<Value>) -> Self {
        self.and(Condition::lt(column, value))
    }

    pub fn in_list<T: Into<Value>>(self, column: &str, values: Vec<T>) -> Self {
        self.and(Condition::in_list(column, values))
    }

    pub fn not_in<T: Into<Value>>(self, column: &str, values: Vec<T>) -> Self {
        self.and(Condition::not_in(column, values))
    }

    /// Fail unless every condition column is a plain identifier.
    pub fn validate(&self) -> OrmResult<()> {
        self.conditions
            .iter()
            .try_for_each(|c| validate_ident(c.column()))
    }

    /// Render `cond AND cond ...` (empty string when there are no conditions).
    pub fn build(&self, params: &mut ParamList) -> String {
        self.conditions
            .iter()
            .map(|c| c.build(params))
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

impl FromIterator<Condition> for Filter {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        Self {
            conditions: iter.into_iter().collect(),
        }
    }
}
