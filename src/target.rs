//! Target (Prisma-style) query shapes produced by the translators.
//!
//! Every type serializes to the exact JSON the target engine expects; fields
//! that were never set are omitted rather than emitted as empty values.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A fully translated query descriptor.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PrismaFilter {
    #[serde(flatten)]
    pub projection: Option<Projection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<u64>,
    #[serde(rename = "orderBy", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<BTreeMap<String, SortOrder>>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<WhereInput>,
}

impl PrismaFilter {
    pub fn select(&self) -> Option<&BTreeMap<String, bool>> {
        match &self.projection {
            Some(Projection::Select(select)) => Some(select),
            _ => None,
        }
    }

    pub fn include(&self) -> Option<&BTreeMap<String, RelationInclude>> {
        match &self.projection {
            Some(Projection::Include(include)) => Some(include),
            _ => None,
        }
    }
}

/// `select` and `include` never co-occur on one descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    Select(BTreeMap<String, bool>),
    Include(BTreeMap<String, RelationInclude>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelationInclude {
    /// Serialized as `true`.
    All,
    Scoped(Box<PrismaFilter>),
}

impl Serialize for RelationInclude {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RelationInclude::All => serializer.serialize_bool(true),
            RelationInclude::Scoped(scope) => scope.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Target predicate tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereInput {
    And(Vec<WhereInput>),
    Or(Vec<WhereInput>),
    Field { field: String, filter: FieldFilter },
}

impl Serialize for WhereInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            WhereInput::And(nodes) => map.serialize_entry("AND", nodes)?,
            WhereInput::Or(nodes) => map.serialize_entry("OR", nodes)?,
            WhereInput::Field { field, filter } => map.serialize_entry(field, filter)?,
        }
        map.end()
    }
}

/// Condition on a single field in the target vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    /// Implicit equality, emitted as the bare literal.
    Shorthand(Value),
    Equals(Value),
    Not(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Value),
    Match(Value),
}

impl FieldFilter {
    /// Target operator keyword, `None` for the shorthand form.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            FieldFilter::Shorthand(_) => None,
            FieldFilter::Equals(_) => Some("equals"),
            FieldFilter::Not(_) => Some("not"),
            FieldFilter::Gt(_) => Some("gt"),
            FieldFilter::Gte(_) => Some("gte"),
            FieldFilter::Lt(_) => Some("lt"),
            FieldFilter::Lte(_) => Some("lte"),
            FieldFilter::In(_) => Some("in"),
            FieldFilter::Match(_) => Some("match"),
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            FieldFilter::Shorthand(v)
            | FieldFilter::Equals(v)
            | FieldFilter::Not(v)
            | FieldFilter::Gt(v)
            | FieldFilter::Gte(v)
            | FieldFilter::Lt(v)
            | FieldFilter::Lte(v)
            | FieldFilter::In(v)
            | FieldFilter::Match(v) => v,
        }
    }
}

impl Serialize for FieldFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.keyword() {
            None => self.value().serialize(serializer),
            Some(keyword) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(keyword, self.value())?;
                map.end()
            }
        }
    }
}
