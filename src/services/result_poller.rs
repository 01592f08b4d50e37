//! 结果查询服务 - 业务能力层
//!
//! 只负责"查一次结果"能力，不循环、不等待

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::Transport;
use crate::models::{Entity, Fetched, JobId, QueryResult, ResultFormat};

/// 结果查询服务
pub struct ResultPoller {
    transport: Arc<dyn Transport>,
}

impl ResultPoller {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// 按指定格式获取任务当前状态/结果
    pub async fn fetch_job_result(
        &self,
        job_id: &JobId,
        format: ResultFormat,
    ) -> AppResult<Fetched<QueryResult>> {
        let body = self.transport.fetch(job_id.as_str(), format).await?;
        let endpoint = format!("/queries/{}.{}", job_id, format);
        decode(&endpoint, format, body)
    }

    /// 获取任务的 json 结果
    pub async fn fetch_job_json(&self, job_id: &JobId) -> AppResult<QueryResult> {
        let body = self.transport.fetch(job_id.as_str(), ResultFormat::Json).await?;
        let endpoint = format!("/queries/{}.json", job_id);
        let result: QueryResult = decode_json(&endpoint, &body)?;

        debug!(
            "任务 {} 状态: {} ({} 个实体)",
            job_id,
            result.classification_status.as_str(),
            result.entities.len()
        );
        Ok(result)
    }

    /// 按化学标识直接查询已有的分类结果（不经过任务）
    pub async fn fetch_entity(
        &self,
        structure_key: &str,
        format: ResultFormat,
    ) -> AppResult<Fetched<Entity>> {
        let body = self.transport.fetch_by_key(structure_key, format).await?;
        let endpoint = format!("/entities/{}.{}", structure_key, format);
        decode(&endpoint, format, body)
    }
}

fn decode<T: DeserializeOwned>(
    endpoint: &str,
    format: ResultFormat,
    body: String,
) -> AppResult<Fetched<T>> {
    match format {
        ResultFormat::Json => decode_json(endpoint, &body).map(Fetched::Json),
        ResultFormat::Csv | ResultFormat::Sdf => Ok(Fetched::Text { format, body }),
    }
}

fn decode_json<T: DeserializeOwned>(endpoint: &str, body: &str) -> AppResult<T> {
    serde_json::from_str(body)
        .map_err(|e| AppError::malformed(endpoint, format!("无法解析 JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use async_trait::async_trait;
    use serde_json::Value as JsonValue;

    struct FixedTransport {
        status: u16,
        body: &'static str,
    }

    impl FixedTransport {
        fn reply(&self, endpoint: String) -> AppResult<String> {
            if self.status >= 300 {
                return Err(ApiError::RemoteService {
                    endpoint,
                    status: self.status,
                    body: self.body.to_string(),
                }
                .into());
            }
            Ok(self.body.to_string())
        }
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn submit(&self, _body: &JsonValue) -> AppResult<String> {
            unreachable!()
        }

        async fn fetch(&self, job_id: &str, format: ResultFormat) -> AppResult<String> {
            self.reply(format!("/queries/{}.{}", job_id, format))
        }

        async fn fetch_by_key(&self, key: &str, format: ResultFormat) -> AppResult<String> {
            self.reply(format!("/entities/{}.{}", key, format))
        }
    }

    fn poller(status: u16, body: &'static str) -> ResultPoller {
        ResultPoller::new(Arc::new(FixedTransport { status, body }))
    }

    #[tokio::test]
    async fn test_fetch_job_json_done() {
        let poller = poller(
            200,
            r#"{"classification_status": "Done", "entities": [{"identifier": "Q1-1", "description": "x"}]}"#,
        );
        let result = poller.fetch_job_json(&JobId::new("1")).await.unwrap();
        assert!(result.is_done());
        assert_eq!(result.entities.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_csv_is_raw_text() {
        let poller = poller(200, "CompoundID,Kingdom\nQ1-1,Organic compounds\n");
        let fetched = poller
            .fetch_job_result(&JobId::new("1"), ResultFormat::Csv)
            .await
            .unwrap();
        match fetched {
            Fetched::Text { format, body } => {
                assert_eq!(format, ResultFormat::Csv);
                assert!(body.starts_with("CompoundID"));
            }
            Fetched::Json(_) => panic!("csv 不应被解码"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_json_is_malformed() {
        let poller = poller(200, "not json");
        let err = poller.fetch_job_json(&JobId::new("1")).await.unwrap_err();
        assert!(err.is_malformed_response());
    }

    #[tokio::test]
    async fn test_remote_error_propagates() {
        let poller = poller(404, "not found");
        let err = poller
            .fetch_entity("BSYNRYMUTXBXSQ-UHFFFAOYSA-N", ResultFormat::Json)
            .await
            .unwrap_err();
        assert!(err.is_remote_service());
    }
}
