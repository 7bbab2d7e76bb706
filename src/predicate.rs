//! Predicate translator: rewrites a source `where` tree into the target vocabulary.

use crate::ast::{Condition, OperatorKind, Where};
use crate::config::TranslateOptions;
use crate::error::{Result, TranslationError};
use crate::target::{FieldFilter, WhereInput};
use serde_json::Value;

/// Rewrites predicate trees. Stateless apart from its options.
#[derive(Debug, Clone, Default)]
pub struct PredicateTranslator {
    options: TranslateOptions,
}

impl PredicateTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TranslateOptions) -> Self {
        Self { options }
    }

    /// Translate a predicate tree.
    ///
    /// Unless `assume_exclusive_ownership` is set the tree is cloned first and
    /// left untouched. With it set, the caller's tree is drained (left as an
    /// empty `and` list) whether or not translation succeeds.
    pub fn translate(&self, tree: &mut Where) -> Result<WhereInput> {
        let owned = if self.options.assume_exclusive_ownership {
            std::mem::replace(tree, Where::And(Vec::new()))
        } else {
            // Clone recurses without a bound, so reject deep input before copying
            if tree.exceeds_depth(self.options.max_depth) {
                return Err(self.depth_exceeded());
            }
            tree.clone()
        };
        self.translate_owned(owned, 0)
    }

    /// Translate a tree whose ownership is already established, at `depth`
    /// levels below the outermost filter.
    pub(crate) fn translate_owned(&self, tree: Where, depth: usize) -> Result<WhereInput> {
        if depth > self.options.max_depth {
            return Err(self.depth_exceeded());
        }

        match tree {
            Where::And(children) => Ok(WhereInput::And(self.translate_children(children, depth)?)),
            Where::Or(children) => Ok(WhereInput::Or(self.translate_children(children, depth)?)),
            Where::Field { field, condition } => {
                let filter = translate_condition(&field, condition)?;
                Ok(WhereInput::Field { field, filter })
            }
        }
    }

    fn depth_exceeded(&self) -> TranslationError {
        TranslationError::DepthLimitExceeded {
            limit: self.options.max_depth,
        }
    }

    fn translate_children(&self, children: Vec<Where>, depth: usize) -> Result<Vec<WhereInput>> {
        children
            .into_iter()
            .map(|child| self.translate_owned(child, depth + 1))
            .collect()
    }
}

fn translate_condition(field: &str, condition: Condition) -> Result<FieldFilter> {
    let (kind, value) = match condition {
        Condition::Literal(value) => return Ok(FieldFilter::Shorthand(value)),
        Condition::Operator { kind, value } => (kind, value),
    };

    map_operator(kind, value).ok_or_else(|| {
        tracing::debug!(field, operator = %kind, "rejecting operator without a target equivalent");
        TranslationError::UnsupportedOperator {
            field: field.to_string(),
            operator: kind,
        }
    })
}

/// `None` for operators the target dialect cannot express without changing semantics.
fn map_operator(kind: OperatorKind, value: Value) -> Option<FieldFilter> {
    let filter = match kind {
        OperatorKind::Eq => FieldFilter::Equals(value),
        OperatorKind::Neq => FieldFilter::Not(value),
        OperatorKind::Gt => FieldFilter::Gt(value),
        OperatorKind::Gte => FieldFilter::Gte(value),
        OperatorKind::Lt => FieldFilter::Lt(value),
        OperatorKind::Lte => FieldFilter::Lte(value),
        OperatorKind::Inq => FieldFilter::In(value),
        OperatorKind::Match => FieldFilter::Match(value),
        // between is exclusive in the source; gt+lt rewrites would shift bounds
        OperatorKind::Between
        | OperatorKind::Nin
        | OperatorKind::Near
        | OperatorKind::Like
        | OperatorKind::Ilike
        | OperatorKind::Regexp => return None,
    };
    Some(filter)
}
