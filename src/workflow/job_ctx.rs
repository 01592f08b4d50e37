//! 任务处理上下文
//!
//! 封装"我正在处理第几个任务、它对应哪些输入行"这一信息

use std::fmt::Display;
use std::ops::Range;

use crate::models::JobId;

/// 任务处理上下文
#[derive(Debug, Clone)]
pub struct JobCtx {
    /// 远程任务标识
    pub job_id: JobId,

    /// 任务在提交顺序中的索引（从0开始）
    pub job_index: usize,

    /// 任务总数
    pub total_jobs: usize,

    /// 本任务对应的输入行范围（数据行，从0开始）
    pub rows: Range<usize>,
}

impl JobCtx {
    pub fn new(job_id: JobId, job_index: usize, total_jobs: usize, rows: Range<usize>) -> Self {
        Self {
            job_id,
            job_index,
            total_jobs,
            rows,
        }
    }

    /// 本任务包含的化合物数量
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// 进度百分比：已完成任务数 / 任务总数
    pub fn percent(&self) -> f64 {
        if self.total_jobs == 0 {
            return 100.0;
        }
        self.job_index as f64 / self.total_jobs as f64 * 100.0
    }
}

impl Display for JobCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[任务 {}/{} ID#{} 行 {}-{}]",
            self.job_index + 1,
            self.total_jobs,
            self.job_id,
            self.rows.start + 1,
            self.rows.end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_and_display() {
        let ctx = JobCtx::new(JobId::new("77"), 1, 4, 1000..2000);
        assert_eq!(ctx.size(), 1000);
        assert_eq!(ctx.percent(), 25.0);
        assert_eq!(ctx.to_string(), "[任务 2/4 ID#77 行 1001-2000]");
    }
}
