//! 源方言过滤器的JSON解析器
//!
//! ## 解析流程图
//!
//! ```text
//! parse_filter()
//!   └─ filter()                  (对象, 深度+0)
//!        ├─ "fields"  → fields()   数组 → List / 布尔对象 → Flags
//!        ├─ "include" → include()  字符串 | {relation, scope?} | 数组
//!        │                └─ scope → filter()  (深度+1, 递归)
//!        ├─ "offset" / "skip" / "limit" → 非负整数
//!        ├─ "order"   → 字符串 或 字符串数组
//!        └─ "where"   → where_node()
//!                          ├─ "and" / "or" → 子节点数组 (深度+1, 递归)
//!                          └─ 单字段叶子  → condition()
//!                                             ├─ 非对象 → 隐式相等
//!                                             └─ 对象   → 按优先级匹配运算符键
//! ```
//!
//! 错误路径使用 `$.where.and[1]`、`$.include[0].scope` 形式，便于定位。
//! 未知的顶层键会被忽略；运算符对象中的未知键 (如 `options`) 也会被忽略，
//! 但只要没有任何已知运算符键就会报 `UnrecognizedOperator`。

use crate::ast::{Condition, Fields, Filter, Inclusion, OperatorKind, Where};
use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{Result, TranslationError};
use serde_json::{Map, Value};

const ROOT: &str = "$";

pub struct Parser {
    max_depth: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// 解析完整的过滤器描述
    pub fn parse_filter(&self, value: &Value) -> Result<Filter> {
        tracing::trace!("decoding filter");
        self.filter(value, ROOT, 0)
    }

    /// 解析单独的谓词树
    pub fn parse_where(&self, value: &Value) -> Result<Where> {
        tracing::trace!("decoding predicate");
        self.where_node(value, ROOT, 0)
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(TranslationError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn filter(&self, value: &Value, path: &str, depth: usize) -> Result<Filter> {
        self.check_depth(depth)?;
        let object = expect_object(value, path)?;

        let fields = match present(object, "fields") {
            Some(v) => Some(self.fields(v, &child(path, "fields"))?),
            None => None,
        };
        let include = match present(object, "include") {
            Some(v) => Some(self.include(v, &child(path, "include"), depth)?),
            None => None,
        };
        let order = match present(object, "order") {
            Some(v) => Some(order(v, &child(path, "order"))?),
            None => None,
        };
        let where_clause = match present(object, "where") {
            Some(v) => Some(self.where_node(v, &child(path, "where"), depth)?),
            None => None,
        };

        Ok(Filter {
            fields,
            include,
            offset: non_negative(object, "offset", path)?,
            skip: non_negative(object, "skip", path)?,
            limit: non_negative(object, "limit", path)?,
            order,
            where_clause,
        })
    }

    fn fields(&self, value: &Value, path: &str) -> Result<Fields> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| TranslationError::malformed(index(path, i), "expected a field name"))
                })
                .collect::<Result<Vec<_>>>()
                .map(Fields::List),
            Value::Object(flags) => flags
                .iter()
                .map(|(name, flag)| {
                    flag.as_bool()
                        .map(|flag| (name.clone(), flag))
                        .ok_or_else(|| TranslationError::malformed(child(path, name), "expected a boolean"))
                })
                .collect::<Result<Vec<_>>>()
                .map(Fields::Flags),
            _ => Err(TranslationError::malformed(
                path,
                "expected an array of field names or an object of booleans",
            )),
        }
    }

    fn include(&self, value: &Value, path: &str, depth: usize) -> Result<Vec<Inclusion>> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.inclusion(item, &index(path, i), depth))
                .collect(),
            // 单个包含项等价于只有一个元素的列表
            _ => Ok(vec![self.inclusion(value, path, depth)?]),
        }
    }

    fn inclusion(&self, value: &Value, path: &str, depth: usize) -> Result<Inclusion> {
        match value {
            Value::String(name) => Ok(Inclusion::Relation(name.clone())),
            Value::Object(object) => {
                let relation = present(object, "relation")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        TranslationError::malformed(child(path, "relation"), "expected a relation name")
                    })?
                    .to_string();

                match present(object, "scope") {
                    Some(scope) => {
                        let scope = self.filter(scope, &child(path, "scope"), depth + 1)?;
                        Ok(Inclusion::Scoped {
                            relation,
                            scope: Box::new(scope),
                        })
                    }
                    None => Ok(Inclusion::Relation(relation)),
                }
            }
            _ => Err(TranslationError::malformed(
                path,
                "expected a relation name or a {relation, scope} object",
            )),
        }
    }

    fn where_node(&self, value: &Value, path: &str, depth: usize) -> Result<Where> {
        self.check_depth(depth)?;
        let object = expect_object(value, path)?;

        if let Some(children) = object.get("and") {
            let path = child(path, "and");
            return Ok(Where::And(self.where_list(children, &path, depth)?));
        }
        if let Some(children) = object.get("or") {
            let path = child(path, "or");
            return Ok(Where::Or(self.where_list(children, &path, depth)?));
        }

        let mut entries = object.iter();
        let (field, condition) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            (None, _) => return Err(TranslationError::malformed(path, "empty predicate")),
            (Some(_), Some(_)) => {
                return Err(TranslationError::malformed(
                    path,
                    format!(
                        "a predicate leaf must name exactly one field, found {}",
                        object.len()
                    ),
                ))
            }
        };

        Ok(Where::Field {
            field: field.clone(),
            condition: condition_of(field, condition)?,
        })
    }

    fn where_list(&self, value: &Value, path: &str, depth: usize) -> Result<Vec<Where>> {
        let items = value
            .as_array()
            .ok_or_else(|| TranslationError::malformed(path, "expected an array of predicates"))?;

        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.where_node(item, &index(path, i), depth + 1))
            .collect()
    }
}

fn condition_of(field: &str, value: &Value) -> Result<Condition> {
    let Value::Object(operators) = value else {
        return Ok(Condition::Literal(value.clone()));
    };

    OperatorKind::PRIORITY
        .into_iter()
        .find_map(|kind| {
            operators.get(kind.as_str()).map(|operand| Condition::Operator {
                kind,
                value: operand.clone(),
            })
        })
        .ok_or_else(|| TranslationError::UnrecognizedOperator {
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn order(value: &Value, path: &str) -> Result<Vec<String>> {
    match value {
        Value::String(entry) => Ok(vec![entry.clone()]),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| TranslationError::malformed(index(path, i), "expected an order string"))
            })
            .collect(),
        _ => Err(TranslationError::malformed(
            path,
            "expected an order string or an array of order strings",
        )),
    }
}

fn non_negative(object: &Map<String, Value>, key: &str, path: &str) -> Result<Option<u64>> {
    match present(object, key) {
        // 0 是有效值, 只有缺失或 null 才视为未设置
        Some(v) => v
            .as_u64()
            .map(Some)
            .ok_or_else(|| TranslationError::malformed(child(path, key), "expected a non-negative integer")),
        None => Ok(None),
    }
}

/// `null` 与缺失等价
fn present<'v>(object: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    object.get(key).filter(|v| !v.is_null())
}

fn expect_object<'v>(value: &'v Value, path: &str) -> Result<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| TranslationError::malformed(path, "expected an object"))
}

fn child(path: &str, key: &str) -> String {
    format!("{path}.{key}")
}

fn index(path: &str, i: usize) -> String {
    format!("{path}[{i}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<Filter> {
        Parser::new().parse_filter(&value)
    }

    #[test]
    fn test_full_filter() {
        let filter = parse(json!({
            "fields": ["id", "name"],
            "offset": 0,
            "limit": 10,
            "order": ["age DESC", "name"],
            "where": {"age": {"gt": 18}}
        }))
        .unwrap();

        assert_eq!(
            filter.fields,
            Some(Fields::List(vec!["id".to_string(), "name".to_string()]))
        );
        assert_eq!(filter.offset, Some(0));
        assert_eq!(filter.skip, None);
        assert_eq!(filter.limit, Some(10));
        assert_eq!(
            filter.order,
            Some(vec!["age DESC".to_string(), "name".to_string()])
        );
        assert_eq!(
            filter.where_clause,
            Some(Where::Field {
                field: "age".to_string(),
                condition: Condition::Operator {
                    kind: OperatorKind::Gt,
                    value: json!(18),
                },
            })
        );
    }

    #[test]
    fn test_field_flags_keep_false() {
        let filter = parse(json!({"fields": {"id": true, "secret": false}})).unwrap();
        match filter.fields {
            Some(Fields::Flags(flags)) => {
                assert!(flags.contains(&("secret".to_string(), false)));
                assert!(flags.contains(&("id".to_string(), true)));
            }
            other => panic!("Expected field flags, got {:?}", other),
        }
    }

    #[test]
    fn test_include_forms() {
        let filter = parse(json!({
            "include": [
                "owner",
                {"relation": "tags"},
                {"relation": "orders", "scope": {"fields": ["id"]}}
            ]
        }))
        .unwrap();

        let include = filter.include.unwrap();
        assert_eq!(include[0], Inclusion::Relation("owner".to_string()));
        assert_eq!(include[1], Inclusion::Relation("tags".to_string()));
        match &include[2] {
            Inclusion::Scoped { relation, scope } => {
                assert_eq!(relation, "orders");
                assert_eq!(scope.fields, Some(Fields::List(vec!["id".to_string()])));
            }
            other => panic!("Expected scoped inclusion, got {:?}", other),
        }
    }

    #[test]
    fn test_single_include_and_single_order_string() {
        let filter = parse(json!({"include": "owner", "order": "name DESC"})).unwrap();
        assert_eq!(filter.include, Some(vec![Inclusion::Relation("owner".to_string())]));
        assert_eq!(filter.order, Some(vec!["name DESC".to_string()]));
    }

    #[test]
    fn test_null_is_absent() {
        let filter = parse(json!({"limit": null, "where": null, "fields": null})).unwrap();
        assert_eq!(filter, Filter::default());
    }

    #[test]
    fn test_negative_limit_rejected() {
        let err = parse(json!({"limit": -1})).unwrap_err();
        match err {
            TranslationError::MalformedFilter { path, .. } => assert_eq!(path, "$.limit"),
            other => panic!("Expected malformed filter, got {:?}", other),
        }
    }

    #[test]
    fn test_combinators() {
        let filter = parse(json!({
            "where": {"and": [{"age": {"gt": 18}}, {"or": [{"name": "Al"}, {"name": "Bo"}]}]}
        }))
        .unwrap();

        match filter.where_clause.unwrap() {
            Where::And(children) => {
                assert_eq!(children.len(), 2);
                assert!(matches!(&children[1], Where::Or(inner) if inner.len() == 2));
            }
            other => panic!("Expected AND, got {:?}", other),
        }
    }

    #[test]
    fn test_literal_values_of_any_type() {
        let parser = Parser::new();
        for literal in [json!("Al"), json!(5), json!(true), json!(null), json!([1, 2])] {
            let node = parser.parse_where(&json!({"x": literal.clone()})).unwrap();
            assert_eq!(
                node,
                Where::Field {
                    field: "x".to_string(),
                    condition: Condition::Literal(literal),
                }
            );
        }
    }

    #[test]
    fn test_operator_priority_and_ignored_extra_keys() {
        let parser = Parser::new();
        let node = parser
            .parse_where(&json!({"name": {"like": "A%", "options": "i"}}))
            .unwrap();
        assert!(matches!(
            node,
            Where::Field { condition: Condition::Operator { kind: OperatorKind::Like, .. }, .. }
        ));

        let node = parser.parse_where(&json!({"age": {"lt": 9, "gt": 1}})).unwrap();
        assert!(matches!(
            node,
            Where::Field { condition: Condition::Operator { kind: OperatorKind::Gt, .. }, .. }
        ));
    }

    #[test]
    fn test_unrecognized_operator() {
        let err = Parser::new()
            .parse_where(&json!({"age": {"within": 3}}))
            .unwrap_err();
        match err {
            TranslationError::UnrecognizedOperator { field, value } => {
                assert_eq!(field, "age");
                assert!(value.contains("within"));
            }
            other => panic!("Expected unrecognized operator, got {:?}", other),
        }
    }

    #[test]
    fn test_multi_field_leaf_rejected_with_path() {
        let err = parse(json!({"where": {"and": [{"a": 1}, {"a": 1, "b": 2}]}})).unwrap_err();
        match err {
            TranslationError::MalformedFilter { path, .. } => assert_eq!(path, "$.where.and[1]"),
            other => panic!("Expected malformed filter, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_predicate_rejected() {
        let err = parse(json!({"where": {}})).unwrap_err();
        assert!(matches!(err, TranslationError::MalformedFilter { .. }));
    }

    #[test]
    fn test_depth_limit() {
        let parser = Parser::with_max_depth(2);
        let shallow = json!({"and": [{"or": [{"a": 1}]}]});
        assert!(parser.parse_where(&shallow).is_ok());

        let deep = json!({"and": [{"or": [{"and": [{"a": 1}]}]}]});
        assert!(matches!(
            parser.parse_where(&deep),
            Err(TranslationError::DepthLimitExceeded { limit: 2 })
        ));
    }

    #[test]
    fn test_depth_limit_on_include_scopes() {
        let parser = Parser::with_max_depth(2);
        let two_levels = json!({
            "include": [{"relation": "a", "scope": {
                "include": [{"relation": "b", "scope": {"limit": 1}}]
            }}]
        });
        assert!(parser.parse_filter(&two_levels).is_ok());

        let three_levels = json!({
            "include": [{"relation": "a", "scope": {
                "include": [{"relation": "b", "scope": {
                    "include": [{"relation": "c", "scope": {}}]
                }}]
            }}]
        });
        assert!(matches!(
            parser.parse_filter(&three_levels),
            Err(TranslationError::DepthLimitExceeded { limit: 2 })
        ));

        // combinators inside a scope count on top of the scope depth
        let scope_then_and = json!({
            "include": [{"relation": "a", "scope": {
                "include": [{"relation": "b", "scope": {"where": {"and": [{"x": 1}]}}}]
            }}]
        });
        assert!(matches!(
            parser.parse_filter(&scope_then_and),
            Err(TranslationError::DepthLimitExceeded { limit: 2 })
        ));
    }
}
