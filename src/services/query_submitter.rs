//! 提交服务 - 业务能力层
//!
//! 只负责"把一组化合物提交为一个任务"能力，不负责分块

use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::Transport;
use crate::models::{JobId, StructureRecord};

const SUBMIT_ENDPOINT: &str = "/queries.json";
const QUERY_TYPE: &str = "STRUCTURE";

/// 提交服务
///
/// 职责：
/// - 把化合物按换行拼接成一个载荷
/// - 发送一次提交请求
/// - 从响应中取出任务标识
pub struct QuerySubmitter {
    transport: Arc<dyn Transport>,
}

impl QuerySubmitter {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// 提交化合物，返回任务标识
    ///
    /// # 参数
    /// - `structures`: 本次提交的化合物（顺序即结果顺序）
    /// - `label`: 任务标签
    pub async fn submit_structures(
        &self,
        structures: &[StructureRecord],
        label: &str,
    ) -> AppResult<JobId> {
        let payload = build_payload(structures, label);
        debug!("提交 {} 个化合物, 标签: {}", structures.len(), label);

        let body = self.transport.submit(&payload).await?;
        extract_job_id(&body)
    }
}

/// 构建提交请求体
pub fn build_payload(structures: &[StructureRecord], label: &str) -> JsonValue {
    let query_input = structures
        .iter()
        .map(StructureRecord::query_line)
        .collect::<Vec<_>>()
        .join("\n");

    json!({
        "label": label,
        "query_input": query_input,
        "query_type": QUERY_TYPE,
    })
}

/// 从提交响应中取出 `id`
fn extract_job_id(body: &str) -> AppResult<JobId> {
    let value: JsonValue = serde_json::from_str(body)
        .map_err(|e| AppError::malformed(SUBMIT_ENDPOINT, format!("无法解析 JSON: {}", e)))?;

    match value.get("id") {
        Some(JsonValue::Number(n)) => Ok(JobId::new(n.to_string())),
        Some(JsonValue::String(s)) if !s.is_empty() => Ok(JobId::new(s.clone())),
        _ => Err(AppError::malformed(SUBMIT_ENDPOINT, "响应缺少 id 字段")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResultFormat;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingTransport {
        response: String,
        payloads: Mutex<Vec<JsonValue>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn submit(&self, body: &JsonValue) -> AppResult<String> {
            self.payloads.lock().unwrap().push(body.clone());
            Ok(self.response.clone())
        }

        async fn fetch(&self, _job_id: &str, _format: ResultFormat) -> AppResult<String> {
            unreachable!()
        }

        async fn fetch_by_key(&self, _key: &str, _format: ResultFormat) -> AppResult<String> {
            unreachable!()
        }
    }

    fn submitter_with(response: &str) -> (QuerySubmitter, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport {
            response: response.to_string(),
            payloads: Mutex::new(Vec::new()),
        });
        (QuerySubmitter::new(transport.clone()), transport)
    }

    #[tokio::test]
    async fn test_submit_joins_with_newlines() {
        let (submitter, transport) = submitter_with(r#"{"id": 4521, "label": "batch"}"#);
        let structures = vec![
            StructureRecord::new("CCO"),
            StructureRecord::with_id("c2", "CC(=O)C"),
            StructureRecord::new("BSYNRYMUTXBXSQ-UHFFFAOYSA-N"),
        ];

        let job_id = submitter.submit_structures(&structures, "batch").await.unwrap();
        assert_eq!(job_id.as_str(), "4521");

        let payloads = transport.payloads.lock().unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(
            payloads[0],
            json!({
                "label": "batch",
                "query_input": "CCO\nc2\tCC(=O)C\nBSYNRYMUTXBXSQ-UHFFFAOYSA-N",
                "query_type": "STRUCTURE",
            })
        );
    }

    #[tokio::test]
    async fn test_submit_missing_id_is_malformed() {
        let (submitter, _) = submitter_with(r#"{"label": "batch"}"#);
        let err = submitter
            .submit_structures(&[StructureRecord::new("CCO")], "batch")
            .await
            .unwrap_err();
        assert!(err.is_malformed_response());
    }

    #[tokio::test]
    async fn test_submit_non_json_is_malformed() {
        let (submitter, _) = submitter_with("<html>oops</html>");
        let err = submitter
            .submit_structures(&[StructureRecord::new("CCO")], "batch")
            .await
            .unwrap_err();
        assert!(err.is_malformed_response());
    }
}
