//! Filter translator: rewrites a whole source query descriptor into the target shape.

use crate::ast::{Fields, Filter, Inclusion};
use crate::config::TranslateOptions;
use crate::error::{Result, TranslationError};
use crate::predicate::PredicateTranslator;
use crate::target::{PrismaFilter, Projection, RelationInclude, SortOrder};
use std::collections::BTreeMap;

const ROOT: &str = "$";

/// Translates filter descriptors, delegating `where` to a [`PredicateTranslator`].
#[derive(Debug, Clone, Default)]
pub struct FilterTranslator {
    options: TranslateOptions,
    predicates: PredicateTranslator,
}

impl FilterTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TranslateOptions) -> Self {
        Self {
            predicates: PredicateTranslator::with_options(options.clone()),
            options,
        }
    }

    /// Translate a filter descriptor.
    ///
    /// Without `assume_exclusive_ownership` the whole descriptor is deep-cloned
    /// up front and the caller's value is never modified. With it, the contents
    /// are moved out and `filter` is left as `Filter::default()`.
    pub fn translate(&self, filter: &mut Filter) -> Result<PrismaFilter> {
        let owned = if self.options.assume_exclusive_ownership {
            std::mem::take(filter)
        } else {
            // Clone recurses without a bound, so reject deep input before copying
            if filter.exceeds_depth(self.options.max_depth) {
                return Err(self.depth_exceeded());
            }
            filter.clone()
        };
        tracing::debug!(
            exclusive = self.options.assume_exclusive_ownership,
            "translating filter"
        );
        self.translate_owned(owned, ROOT, 0)
    }

    fn depth_exceeded(&self) -> TranslationError {
        TranslationError::DepthLimitExceeded {
            limit: self.options.max_depth,
        }
    }

    /// Translate an already-owned descriptor `depth` inclusion scopes deep.
    /// `path` locates it for error reports, e.g. `$.include[0].scope`.
    fn translate_owned(&self, filter: Filter, path: &str, depth: usize) -> Result<PrismaFilter> {
        if depth > self.options.max_depth {
            return Err(self.depth_exceeded());
        }

        let Filter {
            fields,
            include,
            offset,
            skip,
            limit,
            order,
            where_clause,
        } = filter;

        let projection = match (fields, include) {
            (Some(_), Some(_)) => return Err(TranslationError::ConflictingProjection),
            (Some(fields), None) => Some(Projection::Select(select_of(fields))),
            (None, Some(include)) => {
                Some(Projection::Include(self.include_of(include, path, depth)?))
            }
            (None, None) => None,
        };

        // presence, not value: a zero offset or limit is kept
        let skip = offset.or(skip);

        let order_by = order.map(|order| order_by_of(order, path)).transpose()?;

        let where_clause = where_clause
            .map(|tree| self.predicates.translate_owned(tree, depth))
            .transpose()?;

        Ok(PrismaFilter {
            projection,
            skip,
            take: limit,
            order_by,
            where_clause,
        })
    }

    fn include_of(
        &self,
        include: Vec<Inclusion>,
        path: &str,
        depth: usize,
    ) -> Result<BTreeMap<String, RelationInclude>> {
        let mut relations = BTreeMap::new();
        for (i, inclusion) in include.into_iter().enumerate() {
            // duplicate relations: last one wins
            match inclusion {
                Inclusion::Relation(relation) => {
                    relations.insert(relation, RelationInclude::All);
                }
                Inclusion::Scoped { relation, scope } => {
                    tracing::trace!(relation = %relation, depth = depth + 1, "translating inclusion scope");
                    let scope_path = format!("{path}.include[{i}].scope");
                    let scope = self.translate_owned(*scope, &scope_path, depth + 1)?;
                    relations.insert(relation, RelationInclude::Scoped(Box::new(scope)));
                }
            }
        }
        Ok(relations)
    }
}

fn select_of(fields: Fields) -> BTreeMap<String, bool> {
    match fields {
        Fields::List(names) => names.into_iter().map(|name| (name, true)).collect(),
        Fields::Flags(flags) => flags.into_iter().collect(),
    }
}

fn order_by_of(order: Vec<String>, path: &str) -> Result<BTreeMap<String, SortOrder>> {
    let mut order_by = BTreeMap::new();
    for (i, entry) in order.iter().enumerate() {
        let (field, raw_direction) = match entry.split_once(' ') {
            Some((field, direction)) => (field, direction.trim()),
            None => (entry.as_str(), ""),
        };

        if field.is_empty() {
            return Err(TranslationError::malformed(
                format!("{path}.order[{i}]"),
                "missing field name",
            ));
        }

        let direction = match raw_direction.to_lowercase().as_str() {
            "" | "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            _ => {
                return Err(TranslationError::InvalidOrderDirection {
                    field: field.to_string(),
                    direction: raw_direction.to_string(),
                })
            }
        };

        order_by.insert(field.to_string(), direction);
    }
    Ok(order_by)
}
