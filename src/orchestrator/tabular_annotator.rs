//! 表格注释器 - 编排层
//!
//! ## 职责
//!
//! 驱动完整的表格注释流程：读取输入 → 分块提交 → 按序轮询 → 合并写出。
//!
//! ## 流程
//!
//! 1. **读取**：第一遍只读取结构列，保持行顺序
//! 2. **提交**：按 `chunk_size` 分块，每块一个任务，全部提交后才开始轮询
//! 3. **轮询合并**：游标 `i` 指向当前任务
//!    - 完成：把实体与下一段输入行逐一对齐写出，游标前进，立即轮询下一个任务
//!    - 未完成：等待 `sleep_interval` 后重新轮询同一个任务
//! 4. **结束**：游标到达任务列表末尾
//!
//! 任务严格按提交顺序处理，即使后面的任务先完成也不会提前写出。

use csv::StringRecord;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};
use crate::infrastructure::Transport;
use crate::models::{JobId, StructureRecord};
use crate::orchestrator::progress::{LogProgress, ProgressEvent, ProgressObserver};
use crate::services::{derive_nonclashing_path, QuerySubmitter, ResultPoller};
use crate::workflow::{JobCtx, MergeFlow};

const DEFAULT_LABEL: &str = "classyfire";

/// 一次表格注释请求
#[derive(Debug, Clone)]
pub struct TabularQuery {
    /// 输入表格
    pub inpath: PathBuf,
    /// 结构列（InChIKey 或 SMILES）
    pub structure_key: String,
    /// 标识列（可选），其值作为前缀随结构一起提交
    pub id_key: Option<String>,
    /// 输出路径（可选），缺省时由输入路径推导
    pub outpath: Option<PathBuf>,
    /// 任务标签（可选），缺省时使用输入文件名
    pub label: Option<String>,
}

impl TabularQuery {
    pub fn new(inpath: impl Into<PathBuf>, structure_key: impl Into<String>) -> Self {
        Self {
            inpath: inpath.into(),
            structure_key: structure_key.into(),
            id_key: None,
            outpath: None,
            label: None,
        }
    }

    pub fn with_id_key(mut self, id_key: impl Into<String>) -> Self {
        self.id_key = Some(id_key.into());
        self
    }

    pub fn with_outpath(mut self, outpath: impl Into<PathBuf>) -> Self {
        self.outpath = Some(outpath.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| {
            self.inpath
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| DEFAULT_LABEL.to_string())
        })
    }
}

/// 注释结果汇总
#[derive(Debug, Clone)]
pub struct AnnotationSummary {
    pub outpath: PathBuf,
    pub jobs: Vec<JobId>,
    pub rows_written: usize,
}

/// 表格注释器
pub struct TabularAnnotator {
    config: Config,
    submitter: QuerySubmitter,
    poller: ResultPoller,
    merge_flow: MergeFlow,
    observer: Arc<dyn ProgressObserver>,
    cancel: CancellationToken,
}

impl TabularAnnotator {
    /// 创建注释器（配置在此校验）
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> AppResult<Self> {
        config.validate()?;

        Ok(Self {
            submitter: QuerySubmitter::new(transport.clone()),
            poller: ResultPoller::new(transport),
            merge_flow: MergeFlow::new(config.outfields.clone()),
            observer: Arc::new(LogProgress),
            cancel: CancellationToken::new(),
            config,
        })
    }

    /// 替换进度观察者
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// 使用外部取消令牌
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 执行表格注释
    pub async fn run(&self, query: &TabularQuery) -> AppResult<AnnotationSummary> {
        let dialect = self.config.dialect;

        // ========== 读取结构列 ==========
        let (headers, structures) = read_structures(query, &self.config)?;
        info!(
            "📁 读取 {} 个化合物 ({})",
            structures.len(),
            query.inpath.display()
        );

        // ========== 准备输出 ==========
        let candidate = query.outpath.as_ref().unwrap_or(&query.inpath);
        let outpath = derive_nonclashing_path(candidate, &self.config.output_suffix);
        let mut writer = create_output(&outpath, &self.config)?;
        writer
            .write_record(&self.merge_flow.output_headers(&headers))
            .map_err(|e| AppError::table_failed(outpath.display().to_string(), e))?;
        writer
            .flush()
            .map_err(|e| AppError::file_write_failed(outpath.display().to_string(), e))?;
        debug!("输出文件: {} ({})", outpath.display(), dialect);

        // ========== 分块提交 ==========
        let jobs = self.submit_chunks(&structures, &query.label()).await?;
        drop(structures);

        // ========== 按序轮询并合并 ==========
        let rows_written = self.poll_and_merge(&jobs, query, &mut writer).await?;

        self.observer.on_event(&ProgressEvent::Finished {
            outpath: outpath.clone(),
            rows_written,
        });

        Ok(AnnotationSummary {
            outpath,
            jobs: jobs.into_iter().map(|ctx| ctx.job_id).collect(),
            rows_written,
        })
    }

    /// 分块提交，全部提交完成后返回按提交顺序排列的任务
    async fn submit_chunks(
        &self,
        structures: &[StructureRecord],
        label: &str,
    ) -> AppResult<Vec<JobCtx>> {
        let chunk_size = self.config.chunk_size;
        let total_jobs = structures.len().div_ceil(chunk_size);
        let mut submitted = Vec::with_capacity(total_jobs);

        for (job_index, chunk) in structures.chunks(chunk_size).enumerate() {
            if self.cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }

            let job_id = self.submitter.submit_structures(chunk, label).await?;
            let start = job_index * chunk_size;

            self.observer.on_event(&ProgressEvent::Submitted {
                job_index,
                job_id: job_id.clone(),
                structures: chunk.len(),
            });

            submitted.push(JobCtx::new(
                job_id,
                job_index,
                total_jobs,
                start..start + chunk.len(),
            ));
        }

        Ok(submitted)
    }

    /// 轮询任务并写出结果
    async fn poll_and_merge(
        &self,
        jobs: &[JobCtx],
        query: &TabularQuery,
        writer: &mut csv::Writer<File>,
    ) -> AppResult<usize> {
        // 第二遍读取：回放完整的输入行
        let mut reader = self
            .config
            .dialect
            .reader_builder()
            .from_path(&query.inpath)
            .map_err(|e| AppError::table_failed(query.inpath.display().to_string(), e))?;
        let mut rows = reader.records();

        let mut cursor = 0;
        let mut rows_written = 0;

        while cursor < jobs.len() {
            if self.cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }

            let ctx = &jobs[cursor];
            let result = self.poller.fetch_job_json(&ctx.job_id).await?;

            if result.is_done() {
                let written = self
                    .merge_flow
                    .merge(ctx, &result.entities, &mut rows, writer)?;
                rows_written += written;
                cursor += 1;

                self.observer.on_event(&ProgressEvent::JobMerged {
                    job_index: ctx.job_index,
                    total_jobs: ctx.total_jobs,
                    rows_written: written,
                });
                continue;
            }

            self.observer.on_event(&ProgressEvent::Waiting {
                job_index: ctx.job_index,
                total_jobs: ctx.total_jobs,
                percent: ctx.percent(),
                status: result.classification_status.as_str().to_string(),
            });

            tokio::select! {
                _ = self.cancel.cancelled() => return Err(AppError::Cancelled),
                _ = tokio::time::sleep(self.config.sleep_interval()) => {}
            }
        }

        Ok(rows_written)
    }
}

/// 第一遍读取：表头与结构列
fn read_structures(
    query: &TabularQuery,
    config: &Config,
) -> AppResult<(StringRecord, Vec<StructureRecord>)> {
    let path = query.inpath.display().to_string();
    let mut reader = config
        .dialect
        .reader_builder()
        .from_path(&query.inpath)
        .map_err(|e| AppError::table_failed(path.clone(), e))?;

    let headers = reader
        .headers()
        .map_err(|e| AppError::table_failed(path.clone(), e))?
        .clone();

    let structure_idx = column_index(&headers, &query.structure_key, &path)?;
    let id_idx = query
        .id_key
        .as_deref()
        .map(|key| column_index(&headers, key, &path))
        .transpose()?;

    let mut structures = Vec::new();
    for (row_index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| AppError::table_failed(path.clone(), e))?;
        let structure = record.get(structure_idx).unwrap_or("").trim();

        if structure.is_empty() || breaks_line(structure) {
            return Err(invalid_cell(
                &query.structure_key,
                row_index,
                structure,
                "非空且不含换行的 InChIKey 或 SMILES",
            ));
        }

        let id = id_idx
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty());

        // 提交时一行一个化合物，换行会拆出多余的行
        if let (Some(id), Some(key)) = (id, query.id_key.as_deref()) {
            if breaks_line(id) {
                return Err(invalid_cell(key, row_index, id, "不含换行的标识"));
            }
        }

        structures.push(match id {
            Some(id) => StructureRecord::with_id(id, structure),
            None => StructureRecord::new(structure),
        });
    }

    Ok((headers, structures))
}

fn breaks_line(cell: &str) -> bool {
    cell.contains(['\n', '\r'])
}

fn invalid_cell(column: &str, row_index: usize, value: &str, expected: &str) -> AppError {
    ConfigError::InvalidValue {
        name: format!("{} (第 {} 行)", column, row_index + 1),
        value: value.to_string(),
        expected: expected.to_string(),
    }
    .into()
}

fn column_index(headers: &StringRecord, column: &str, path: &str) -> AppResult<usize> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| {
            ConfigError::MissingColumn {
                path: path.to_string(),
                column: column.to_string(),
            }
            .into()
        })
}

/// 以"仅新建"方式打开输出文件，绝不覆盖已有文件
fn create_output(outpath: &Path, config: &Config) -> AppResult<csv::Writer<File>> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(outpath)
        .map_err(|e| AppError::file_write_failed(outpath.display().to_string(), e))?;

    Ok(config.dialect.writer_builder().from_writer(file))
}
