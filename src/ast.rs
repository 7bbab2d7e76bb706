//! 源方言（LoopBack 风格）的过滤器 AST

use serde_json::Value;
use std::fmt;

/// AST 的根节点, 代表一个完整的查询描述
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    /// 字段投影, 与 `include` 互斥
    pub fields: Option<Fields>,
    /// 关联实体的包含列表, 与 `fields` 互斥
    pub include: Option<Vec<Inclusion>>,
    pub offset: Option<u64>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    /// 排序条目, 例如：`"age DESC"`
    pub order: Option<Vec<String>>,
    pub where_clause: Option<Where>,
}

/// 字段投影的两种写法
#[derive(Debug, Clone, PartialEq)]
pub enum Fields {
    /// `["id", "name"]`
    List(Vec<String>),
    /// `{"id": true, "secret": false}`，保持书写顺序
    Flags(Vec<(String, bool)>),
}

/// 单个关联包含项, 例如：`"orders"` 或 `{relation: "orders", scope: {...}}`
#[derive(Debug, Clone, PartialEq)]
pub enum Inclusion {
    Relation(String),
    Scoped { relation: String, scope: Box<Filter> },
}

/// 谓词树节点
#[derive(Debug, Clone, PartialEq)]
pub enum Where {
    /// 逻辑与运算 (and)
    And(Vec<Where>),
    /// 逻辑或运算 (or)
    Or(Vec<Where>),
    /// 叶子节点, 单个字段上的条件
    Field { field: String, condition: Condition },
}

impl Filter {
    /// include scope 或 and/or 组合的层数是否超过 `limit`, 计数方式与翻译器一致
    pub fn exceeds_depth(&self, limit: usize) -> bool {
        exceeds_depth(Node::Filter(self), limit)
    }
}

impl Where {
    pub fn exceeds_depth(&self, limit: usize) -> bool {
        exceeds_depth(Node::Where(self), limit)
    }
}

enum Node<'a> {
    Filter(&'a Filter),
    Where(&'a Where),
}

/// 使用显式栈遍历, 不受输入嵌套深度影响
fn exceeds_depth(root: Node<'_>, limit: usize) -> bool {
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        if depth > limit {
            return true;
        }
        match node {
            Node::Filter(filter) => {
                for inclusion in filter.include.iter().flatten() {
                    if let Inclusion::Scoped { scope, .. } = inclusion {
                        stack.push((Node::Filter(scope), depth + 1));
                    }
                }
                if let Some(tree) = &filter.where_clause {
                    stack.push((Node::Where(tree), depth));
                }
            }
            Node::Where(Where::And(children) | Where::Or(children)) => {
                stack.extend(children.iter().map(|child| (Node::Where(child), depth + 1)));
            }
            Node::Where(Where::Field { .. }) => {}
        }
    }
    false
}

/// 叶子节点上的条件
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// 隐式相等, 例如：`{name: "Al"}`
    Literal(Value),
    /// 运算符对象, 例如：`{age: {gt: 18}}`
    Operator { kind: OperatorKind, value: Value },
}

/// 源方言的全部运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
    Inq,
    Nin,
    Match,
    Near,
    Like,
    Ilike,
    Regexp,
}

impl OperatorKind {
    /// 按优先级排列; 畸形输入中出现多个运算符键时, 第一个命中者生效
    pub const PRIORITY: [OperatorKind; 14] = [
        OperatorKind::Eq,
        OperatorKind::Neq,
        OperatorKind::Gt,
        OperatorKind::Gte,
        OperatorKind::Lt,
        OperatorKind::Lte,
        OperatorKind::Between,
        OperatorKind::Inq,
        OperatorKind::Nin,
        OperatorKind::Match,
        OperatorKind::Near,
        OperatorKind::Like,
        OperatorKind::Ilike,
        OperatorKind::Regexp,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|op| op.as_str() == key)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorKind::Eq => "eq",
            OperatorKind::Neq => "neq",
            OperatorKind::Gt => "gt",
            OperatorKind::Gte => "gte",
            OperatorKind::Lt => "lt",
            OperatorKind::Lte => "lte",
            OperatorKind::Between => "between",
            OperatorKind::Inq => "inq",
            OperatorKind::Nin => "nin",
            OperatorKind::Match => "match",
            OperatorKind::Near => "near",
            OperatorKind::Like => "like",
            OperatorKind::Ilike => "ilike",
            OperatorKind::Regexp => "regexp",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
