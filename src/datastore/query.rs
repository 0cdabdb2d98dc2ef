//! Structured and GQL queries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyFilterOperator {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    In,
    NotEqual,
    HasAncestor,
    NotIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompositeOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// `property op value`.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFilter {
    pub property: String,
    pub op: PropertyFilterOperator,
    pub value: Value,
}

impl PropertyFilter {
    pub fn new(property: impl Into<String>, op: PropertyFilterOperator, value: impl Into<Value>) -> Self {
        Self {
            property: property.into(),
            op,
            value: value.into(),
        }
    }
}

/// Filters combined with AND / OR.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeFilter {
    pub op: CompositeOperator,
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Property(PropertyFilter),
    Composite(CompositeFilter),
}

impl Filter {
    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::Composite(CompositeFilter {
            op: CompositeOperator::And,
            filters,
        })
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Composite(CompositeFilter {
            op: CompositeOperator::Or,
            filters,
        })
    }
}

impl From<PropertyFilter> for Filter {
    fn from(f: PropertyFilter) -> Self {
        Filter::Property(f)
    }
}

impl From<CompositeFilter> for Filter {
    fn from(f: CompositeFilter) -> Self {
        Filter::Composite(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyOrder {
    pub property: String,
    pub direction: Direction,
}

impl PropertyOrder {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Descending,
        }
    }
}

/// A projected property. `Projection::key()` projects `__key__` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection(pub String);

impl Projection {
    pub fn new(property: impl Into<String>) -> Self {
        Self(property.into())
    }

    pub fn key() -> Self {
        Self("__key__".to_string())
    }
}

/// A structured query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub kind: Option<String>,
    pub filter: Option<Filter>,
    pub order: Vec<PropertyOrder>,
    pub projection: Vec<Projection>,
    pub distinct_on: Vec<String>,
    pub offset: Option<i32>,
    pub limit: Option<i32>,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

impl Query {
    pub fn kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn order(mut self, order: PropertyOrder) -> Self {
        self.order.push(order);
        self
    }

    pub fn projection(mut self, projection: Vec<Projection>) -> Self {
        self.projection = projection;
        self
    }

    pub fn distinct_on(mut self, properties: Vec<String>) -> Self {
        self.distinct_on = properties;
        self
    }

    pub fn offset(mut self, offset: i32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.start_cursor = Some(cursor.into());
        self
    }

    pub fn end_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.end_cursor = Some(cursor.into());
        self
    }
}

/// A GQL binding: a value or a query cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum GqlParameter {
    Value(Value),
    Cursor(String),
}

impl From<Value> for GqlParameter {
    fn from(v: Value) -> Self {
        GqlParameter::Value(v)
    }
}

/// A GQL query string with bindings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GqlQuery {
    pub query_string: String,
    pub allow_literals: bool,
    pub named_bindings: BTreeMap<String, GqlParameter>,
    pub positional_bindings: Vec<GqlParameter>,
}

impl GqlQuery {
    pub fn new(query_string: impl Into<String>) -> Self {
        Self {
            query_string: query_string.into(),
            ..Self::default()
        }
    }

    pub fn allow_literals(mut self, allow: bool) -> Self {
        self.allow_literals = allow;
        self
    }

    /// Bind `@name` to a value.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named_bindings
            .insert(name.into(), GqlParameter::Value(value.into()));
        self
    }

    /// Bind `@name` to a query cursor.
    pub fn bind_cursor(mut self, name: impl Into<String>, cursor: impl Into<String>) -> Self {
        self.named_bindings
            .insert(name.into(), GqlParameter::Cursor(cursor.into()));
        self
    }

    /// Bind the next `@N` placeholder.
    pub fn bind_positional(mut self, param: impl Into<GqlParameter>) -> Self {
        self.positional_bindings.push(param.into());
        self
    }
}

/// Either kind of query accepted by `run_query`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryInput {
    Structured(Query),
    Gql(GqlQuery),
}

impl From<Query> for QueryInput {
    fn from(q: Query) -> Self {
        QueryInput::Structured(q)
    }
}

impl From<GqlQuery> for QueryInput {
    fn from(q: GqlQuery) -> Self {
        QueryInput::Gql(q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let q = Query::kind("Animal")
            .filter(PropertyFilter::new("value", PropertyFilterOperator::Equal, 30i64))
            .order(PropertyOrder::desc("value"))
            .projection(vec![Projection::key()])
            .limit(1);
        assert_eq!(q.kind.as_deref(), Some("Animal"));
        assert_eq!(q.limit, Some(1));
        assert_eq!(q.projection, vec![Projection("__key__".into())]);
        assert!(matches!(q.filter, Some(Filter::Property(_))));
    }

    #[test]
    fn test_gql_bindings() {
        let q = GqlQuery::new("SELECT * FROM Animal WHERE value = @value")
            .bind("value", 42i64)
            .bind_positional(GqlParameter::Cursor("abc".into()))
            .bind_positional(Value::from(true));
        assert_eq!(q.named_bindings.get("value"), Some(&GqlParameter::Value(Value::Integer(42))));
        assert_eq!(q.positional_bindings.len(), 2);
    }
}
