//! HTTP 传输 - 基础设施层
//!
//! 持有唯一的 HTTP client，只暴露"请求远程服务"的能力

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

use crate::error::{ApiError, AppError, AppResult, ConfigError};
use crate::models::ResultFormat;
use crate::utils::logging::truncate_text;

/// 远程分类服务传输接口
///
/// 职责：
/// - 每次调用只做一次 HTTP 往返
/// - 非 2xx 状态码一律返回 `ApiError::RemoteService`
/// - 不重试，由调用方决定
/// - 不解析业务字段，只返回响应原文
#[async_trait]
pub trait Transport: Send + Sync {
    /// `POST /queries.json`，返回响应原文
    async fn submit(&self, body: &JsonValue) -> AppResult<String>;

    /// `GET /queries/{id}.{format}`
    async fn fetch(&self, job_id: &str, format: ResultFormat) -> AppResult<String>;

    /// `GET /entities/{key}.{format}`
    async fn fetch_by_key(&self, key: &str, format: ResultFormat) -> AppResult<String>;
}

/// 基于 reqwest 的传输实现
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// 创建新的传输对象
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let raw = base_url.into();
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ConfigError::InvalidValue {
                name: "base_url".to_string(),
                value: raw.clone(),
                expected: "http(s) 地址".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::request_failed("client", e))?;

        Ok(Self { client, base_url })
    }

    /// 在服务地址后追加路径段，每段单独做百分号编码
    ///
    /// SMILES 中的 `#`、`/`、`?` 等字符不会改变请求的资源
    fn url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::malformed(self.base_url.as_str(), "服务地址不能追加路径"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// 发送请求并检查状态码
    async fn send(&self, endpoint: &str, request: reqwest::RequestBuilder) -> AppResult<String> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::request_failed(endpoint, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::request_failed(endpoint, e))?;

        debug!("{} -> HTTP {} ({} 字节)", endpoint, status.as_u16(), body.len());

        if !status.is_success() {
            return Err(ApiError::RemoteService {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: truncate_text(&body, 500),
            }
            .into());
        }

        Ok(body)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(&self, body: &JsonValue) -> AppResult<String> {
        let endpoint = "/queries.json";
        let request = self
            .client
            .post(self.url(&["queries.json"])?)
            .header("Content-Type", "application/json")
            .json(body);

        self.send(endpoint, request).await
    }

    async fn fetch(&self, job_id: &str, format: ResultFormat) -> AppResult<String> {
        let resource = format!("{}.{}", job_id, format.extension());
        let endpoint = format!("/queries/{}", resource);
        let request = self.client.get(self.url(&["queries", &resource])?);

        self.send(&endpoint, request).await
    }

    async fn fetch_by_key(&self, key: &str, format: ResultFormat) -> AppResult<String> {
        let resource = format!("{}.{}", key, format.extension());
        let endpoint = format!("/entities/{}", resource);
        let request = self.client.get(self.url(&["entities", &resource])?);

        self.send(&endpoint, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base_url: &str) -> HttpTransport {
        HttpTransport::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let url = transport("http://classyfire.example/")
            .url(&["queries.json"])
            .unwrap();
        assert_eq!(url.as_str(), "http://classyfire.example/queries.json");

        let url = transport("http://classyfire.example/api/")
            .url(&["queries", "42.csv"])
            .unwrap();
        assert_eq!(url.as_str(), "http://classyfire.example/api/queries/42.csv");
    }

    #[test]
    fn test_smiles_key_is_single_path_segment() {
        let transport = transport("http://classyfire.example");

        let url = transport.url(&["entities", "C#N.json"]).unwrap();
        assert_eq!(url.path(), "/entities/C%23N.json");
        assert_eq!(url.fragment(), None);

        let url = transport.url(&["entities", "C/C=C/C.json"]).unwrap();
        assert_eq!(url.path(), "/entities/C%2FC=C%2FC.json");
        assert_eq!(url.path_segments().unwrap().count(), 2);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = HttpTransport::new("not a url", Duration::from_secs(5)).err().unwrap();
        assert!(matches!(err, AppError::Config(ConfigError::InvalidValue { .. })));
    }
}
