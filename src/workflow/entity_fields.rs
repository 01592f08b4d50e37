//! 实体字段提取
//!
//! 把一个分类实体转换为追加到输出行的字段值

use serde_json::Value as JsonValue;

use crate::error::{AppResult, ConfigError};
use crate::models::query::TAXONOMY_RANKS;
use crate::models::Entity;

/// 合成字段名：由四个分类层级拼接而成
pub const TAXONOMY_FIELD: &str = "taxonomy";

const JOIN_SEPARATOR: &str = ";";

/// 按请求顺序提取所有输出字段
pub fn extract_fields(entity: &Entity, outfields: &[String]) -> AppResult<Vec<String>> {
    outfields
        .iter()
        .map(|field| extract_field(entity, field))
        .collect()
}

/// 提取单个输出字段
///
/// - `taxonomy`: `name:chemont_id` 以 `;` 连接，跳过缺失的层级
/// - 列表字段: 元素以 `;` 连接
/// - 其它字段: 原值
/// - 实体中不存在的字段: `ConfigError::UnknownOutField`
/// - 分类层级结构不符: `ApiError::MalformedResponse`
pub fn extract_field(entity: &Entity, field: &str) -> AppResult<String> {
    if field == TAXONOMY_FIELD {
        return synthesize_taxonomy(entity);
    }

    let value = entity.get(field).ok_or_else(|| ConfigError::UnknownOutField {
        field: field.to_string(),
        identifier: entity.identifier(),
    })?;

    Ok(match value {
        JsonValue::Array(items) => items
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(JOIN_SEPARATOR),
        other => scalar_text(other),
    })
}

/// 合成 taxonomy 字段
pub fn synthesize_taxonomy(entity: &Entity) -> AppResult<String> {
    let mut parts = Vec::with_capacity(TAXONOMY_RANKS.len());
    for rank in TAXONOMY_RANKS {
        if let Some(rank) = entity.rank(rank)? {
            parts.push(format!("{}:{}", rank.name, rank.chemont_id));
        }
    }
    Ok(parts.join(JOIN_SEPARATOR))
}

fn scalar_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
