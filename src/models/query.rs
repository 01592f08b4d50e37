//! 远程分类结果模型

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use super::ResultFormat;
use crate::error::{AppError, AppResult};

/// 分类树中参与合成 `taxonomy` 字段的四个层级
pub const TAXONOMY_RANKS: [&str; 4] = ["kingdom", "superclass", "class", "subclass"];

/// 任务分类状态
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ClassificationStatus {
    /// 已完成
    Done,
    /// 其它所有状态（排队、处理中等）
    Pending(String),
}

impl From<String> for ClassificationStatus {
    fn from(value: String) -> Self {
        if value == "Done" {
            ClassificationStatus::Done
        } else {
            ClassificationStatus::Pending(value)
        }
    }
}

impl ClassificationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ClassificationStatus::Done => "Done",
            ClassificationStatus::Pending(s) => s,
        }
    }
}

/// `GET /queries/{id}.json` 的响应
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub label: Option<String>,
    pub classification_status: ClassificationStatus,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl QueryResult {
    pub fn is_done(&self) -> bool {
        self.classification_status == ClassificationStatus::Done
    }
}

/// 单个化合物的分类结果
///
/// 字段集合由远程服务决定，这里保留原始 JSON 对象，按需取值。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Entity(Map<String, JsonValue>);

impl Entity {
    /// 取字段原始值；字段不存在时返回 None（字段存在但为 null 时返回 Some(Null)）
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }

    /// 用于日志/错误信息的标识
    pub fn identifier(&self) -> String {
        ["identifier", "inchikey", "smiles"]
            .iter()
            .find_map(|key| self.0.get(*key).and_then(|v| v.as_str()))
            .unwrap_or("<unknown>")
            .to_string()
    }

    /// 读取某一分类层级；缺失或为 null 时返回 None
    ///
    /// 层级存在但结构不符（缺少 `name`/`chemont_id` 或不是对象）时报响应格式错误
    pub fn rank(&self, rank: &str) -> AppResult<Option<TaxonomyRank>> {
        match self.0.get(rank) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                AppError::malformed(
                    format!("entity {}", self.identifier()),
                    format!("分类层级 {} 无法解析: {}", rank, e),
                )
            }),
        }
    }
}

/// 分类层级
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxonomyRank {
    pub name: String,
    pub chemont_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// 按格式返回的结果：json 解码为具体类型，其余格式保留原文
#[derive(Debug, Clone)]
pub enum Fetched<T> {
    Json(T),
    Text { format: ResultFormat, body: String },
}
