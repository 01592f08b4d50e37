//! 进度通知
//!
//! 编排器只发出事件，不直接打印；调用方决定如何展示

use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use crate::models::JobId;

/// 进度事件
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// 一个分块已提交
    Submitted {
        job_index: usize,
        job_id: JobId,
        structures: usize,
    },
    /// 任务未完成，即将等待后重试
    Waiting {
        job_index: usize,
        total_jobs: usize,
        percent: f64,
        status: String,
    },
    /// 任务已完成并写出
    JobMerged {
        job_index: usize,
        total_jobs: usize,
        rows_written: usize,
    },
    /// 全部完成
    Finished {
        outpath: PathBuf,
        rows_written: usize,
    },
}

/// 进度观察者
pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_event(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// 通过通道转发事件；接收端关闭后静默丢弃
impl ProgressObserver for UnboundedSender<ProgressEvent> {
    fn on_event(&self, event: &ProgressEvent) {
        let _ = self.send(event.clone());
    }
}

/// 默认观察者：写入日志
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Submitted {
                job_index,
                job_id,
                structures,
            } => {
                info!("📤 任务 {} 已提交 (ID: {}, {} 个化合物)", job_index + 1, job_id, structures);
            }
            ProgressEvent::Waiting {
                job_index,
                total_jobs,
                percent,
                status,
            } => {
                info!(
                    "⏳ 任务 {}/{} 状态: {}，总进度 {:.1}%",
                    job_index + 1,
                    total_jobs,
                    status,
                    percent
                );
            }
            ProgressEvent::JobMerged {
                job_index,
                total_jobs,
                rows_written,
            } => {
                info!("✓ 任务 {}/{} 完成，写出 {} 行", job_index + 1, total_jobs, rows_written);
            }
            ProgressEvent::Finished {
                outpath,
                rows_written,
            } => {
                info!("✅ 全部完成，共写出 {} 行 -> {}", rows_written, outpath.display());
            }
        }
    }
}
