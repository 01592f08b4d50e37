//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：校验配置、创建 HTTP 传输
//! 2. **命令分发**：表格注释、单次提交、结果查询、实体查询
//! 3. **全局统计**：输出最终处理结果
//!
//! 本模块是唯一持有 `HttpTransport` 的地方，下层只依赖 `Transport` 接口。

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::infrastructure::{HttpTransport, Transport};
use crate::models::{Fetched, JobId, ResultFormat, StructureRecord};
use crate::orchestrator::tabular_annotator::{AnnotationSummary, TabularAnnotator, TabularQuery};
use crate::services::{QuerySubmitter, ResultPoller};
use crate::utils::logging;
use crate::workflow::extract_fields;

/// 应用主结构
pub struct App {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        config.validate().context("配置校验失败")?;

        let transport = HttpTransport::new(config.base_url.clone(), config.request_timeout())
            .context("无法创建 HTTP 客户端")?;

        logging::log_startup(&config);

        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// 使用自定义传输创建应用
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// 表格注释
    pub async fn annotate(
        &self,
        query: TabularQuery,
        cancel: CancellationToken,
    ) -> Result<AnnotationSummary> {
        let annotator = TabularAnnotator::new(self.config.clone(), self.transport.clone())?
            .with_cancellation(cancel);

        let summary = annotator
            .run(&query)
            .await
            .with_context(|| format!("注释失败: {}", query.inpath.display()))?;

        logging::print_final_stats(&summary);
        Ok(summary)
    }

    /// 提交一组化合物，返回任务标识
    pub async fn submit(&self, structures: &[StructureRecord], label: &str) -> Result<JobId> {
        anyhow::ensure!(!structures.is_empty(), "没有可提交的化合物");

        let submitter = QuerySubmitter::new(self.transport.clone());
        let job_id = submitter
            .submit_structures(structures, label)
            .await
            .context("提交失败")?;

        info!("✓ 已提交 {} 个化合物，任务 ID: {}", structures.len(), job_id);
        Ok(job_id)
    }

    /// 查询任务结果，返回可直接输出的文本
    pub async fn results(&self, job_id: &JobId, format: ResultFormat) -> Result<String> {
        let poller = ResultPoller::new(self.transport.clone());
        let fetched = poller
            .fetch_job_result(job_id, format)
            .await
            .with_context(|| format!("查询任务 {} 失败", job_id))?;

        match fetched {
            Fetched::Text { body, .. } => Ok(body),
            Fetched::Json(result) if !result.is_done() => Ok(format!(
                "任务 {} 状态: {}",
                job_id,
                result.classification_status.as_str()
            )),
            Fetched::Json(result) => {
                let mut lines = vec![self.config.outfields.join("\t")];
                for entity in &result.entities {
                    lines.push(extract_fields(entity, &self.config.outfields)?.join("\t"));
                }
                Ok(lines.join("\n"))
            }
        }
    }

    /// 按化学标识直接查询
    pub async fn entity(&self, key: &str, format: ResultFormat) -> Result<String> {
        let poller = ResultPoller::new(self.transport.clone());
        let fetched = poller
            .fetch_entity(key, format)
            .await
            .with_context(|| format!("查询实体 {} 失败", key))?;

        match fetched {
            Fetched::Text { body, .. } => Ok(body),
            Fetched::Json(entity) => {
                let values = extract_fields(&entity, &self.config.outfields)?;
                Ok(self
                    .config
                    .outfields
                    .iter()
                    .zip(values)
                    .map(|(field, value)| format!("{}: {}", field, value))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
        }
    }
}
