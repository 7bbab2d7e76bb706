//! Translates LoopBack-style object-query filters into the Prisma-style dialect.
//!
//! ```text
//! JSON ──Parser──▶ ast::Filter ──FilterTranslator──▶ target::PrismaFilter ──serde──▶ JSON
//!                                   └─ where ──PredicateTranslator──▶ WhereInput
//! ```
//!
//! The translators are pure: no I/O, no shared state, safe to call from any
//! number of threads on independent inputs.

pub mod ast;
pub mod config;
pub mod error;
pub mod filter;
pub mod parser;
pub mod predicate;
pub mod target;

pub use ast::{Condition, Fields, Filter, Inclusion, OperatorKind, Where};
pub use config::TranslateOptions;
pub use error::{Result, TranslationError};
pub use filter::FilterTranslator;
pub use parser::Parser;
pub use predicate::PredicateTranslator;
pub use target::{FieldFilter, PrismaFilter, Projection, RelationInclude, SortOrder, WhereInput};

use serde_json::Value;

/// Translate a whole filter descriptor. See [`FilterTranslator::translate`]
/// for the ownership contract.
pub fn translate_filter(filter: &mut Filter, options: &TranslateOptions) -> Result<PrismaFilter> {
    FilterTranslator::with_options(options.clone()).translate(filter)
}

/// Translate a bare predicate tree.
pub fn translate_predicate(tree: &mut Where, options: &TranslateOptions) -> Result<WhereInput> {
    PredicateTranslator::with_options(options.clone()).translate(tree)
}

/// Decode, translate and re-encode a JSON filter. The input is only read.
pub fn translate_filter_json(source: &Value, options: &TranslateOptions) -> Result<Value> {
    let mut filter = Parser::with_max_depth(options.max_depth).parse_filter(source)?;
    // the decoded AST is a private copy, so it can be consumed
    let translated = FilterTranslator::with_options(TranslateOptions {
        assume_exclusive_ownership: true,
        ..options.clone()
    })
    .translate(&mut filter)?;
    Ok(serde_json::to_value(translated)?)
}

/// Decode, translate and re-encode a JSON predicate tree.
pub fn translate_predicate_json(source: &Value, options: &TranslateOptions) -> Result<Value> {
    let mut tree = Parser::with_max_depth(options.max_depth).parse_where(source)?;
    let translated = PredicateTranslator::with_options(TranslateOptions {
        assume_exclusive_ownership: true,
        ..options.clone()
    })
    .translate(&mut tree)?;
    Ok(serde_json::to_value(translated)?)
}
