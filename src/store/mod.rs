use crate::core::error::{TileError, TileResult};
use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;
use std::cmp::Ordering;

pub mod json_lines;
pub mod memory;

pub use json_lines::JsonLinesDocumentStore;
pub use memory::MemoryDocumentStore;

/// ストアに保存される1件のドキュメント
pub type Document = serde_json::Map<String, Value>;

/// フィールドに対する条件
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// 値が等しい
    Eq(Value),
    /// 値が大きい（`$gt`）
    Gt(Value),
    /// 値がいずれかに等しい（`$in`）
    In(Vec<Value>),
}

impl Condition {
    fn matches(&self, value: Option<&Value>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            Condition::Eq(expected) => values_equal(value, expected),
            Condition::Gt(bound) => compare_values(value, bound) == Some(Ordering::Greater),
            Condition::In(candidates) => candidates.iter().any(|c| values_equal(value, c)),
        }
    }
}

/// 検索条件（全ての条件をANDで結合）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Condition)>,
}

impl Filter {
    /// 全件にマッチするフィルタ
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), Condition::Eq(value.into())));
        self
    }

    pub fn gt(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), Condition::Gt(value.into())));
        self
    }

    pub fn is_in<V: Into<Value>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.clauses.push((field.into(), Condition::In(values)));
        self
    }

    /// ドキュメントが条件を満たすかどうか
    pub fn matches(&self, document: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, condition)| condition.matches(document.get(field)))
    }
}

/// 更新操作
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOp {
    /// フィールドを置き換える（`$set`）
    Set(String, Value),
    /// 数値フィールドに加算する（`$inc`）
    Inc(String, i64),
}

/// 更新内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    ops: Vec<PatchOp>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.push(PatchOp::Set(field.into(), value.into()));
        self
    }

    pub fn inc(mut self, field: impl Into<String>, amount: i64) -> Self {
        self.ops.push(PatchOp::Inc(field.into(), amount));
        self
    }

    /// ドキュメントに更新を適用
    pub fn apply(&self, document: &mut Document) -> TileResult<()> {
        for op in &self.ops {
            match op {
                PatchOp::Set(field, value) => {
                    document.insert(field.clone(), value.clone());
                }
                PatchOp::Inc(field, amount) => {
                    let next = match document.get(field) {
                        None => Value::from(*amount),
                        Some(current) => increment(current, *amount).ok_or_else(|| {
                            TileError::store(format!("数値以外のフィールドに$incできません: {field}"))
                        })?,
                    };
                    document.insert(field.clone(), next);
                }
            }
        }
        Ok(())
    }
}

/// 更新オプション
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// 複数件を更新するか（falseなら最初の1件のみ）
    pub multi: bool,
}

impl UpdateOptions {
    pub fn single() -> Self {
        Self { multi: false }
    }

    pub fn multi() -> Self {
        Self { multi: true }
    }
}

/// 削除オプション
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOptions {
    /// 複数件を削除するか（falseなら最初の1件のみ）
    pub multi: bool,
}

impl RemoveOptions {
    pub fn single() -> Self {
        Self { multi: false }
    }

    pub fn multi() -> Self {
        Self { multi: true }
    }
}

/// ドキュメントストアのトレイト
///
/// キー/値ドキュメントの集合に対して、フィールド条件での検索・更新・削除を行う。
#[automock]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 条件に一致する全ドキュメントを取得（挿入順）
    async fn find(&self, filter: &Filter) -> TileResult<Vec<Document>>;

    /// 条件に一致する最初のドキュメントを取得
    async fn find_one(&self, filter: &Filter) -> TileResult<Option<Document>>;

    /// ドキュメントを追加
    async fn insert(&self, document: Document) -> TileResult<()>;

    /// 条件に一致するドキュメントを更新し、更新件数を返す
    async fn update(
        &self,
        filter: &Filter,
        patch: &Patch,
        options: UpdateOptions,
    ) -> TileResult<usize>;

    /// 条件に一致するドキュメントを削除し、削除件数を返す
    async fn remove(&self, filter: &Filter, options: RemoveOptions) -> TileResult<usize>;

    /// 条件に一致するドキュメント数
    async fn count(&self, filter: &Filter) -> TileResult<usize> {
        Ok(self.find(filter).await?.len())
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        _ => left == right,
    }
}

fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn increment(current: &Value, amount: i64) -> Option<Value> {
    let Value::Number(number) = current else {
        return None;
    };
    if let Some(value) = number.as_i64() {
        return Some(Value::from(value + amount));
    }
    number.as_f64().map(|value| Value::from(value + amount as f64))
}
