//! 合并流程 - 流程层
//!
//! 核心职责：把"一个已完成任务"的实体逐一对齐到对应的输入行并写出
//!
//! 对齐规则：实体顺序 == 提交顺序 == 输入行顺序

use csv::StringRecord;
use std::io::{self, Write};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::Entity;
use crate::workflow::entity_fields::extract_fields;
use crate::workflow::job_ctx::JobCtx;

/// 合并流程
///
/// - 不持有任何文件句柄
/// - 不关心任务轮询
/// - 只做"实体 + 输入行 → 输出行"
pub struct MergeFlow {
    outfields: Vec<String>,
}

impl MergeFlow {
    pub fn new(outfields: Vec<String>) -> Self {
        Self { outfields }
    }

    /// 输出表头 = 输入表头 + 请求的字段
    pub fn output_headers(&self, input_headers: &StringRecord) -> StringRecord {
        let mut headers = input_headers.clone();
        for field in &self.outfields {
            headers.push_field(field);
        }
        headers
    }

    /// 合并一个已完成任务的结果
    ///
    /// # 参数
    /// - `ctx`: 任务上下文（决定消费多少输入行）
    /// - `entities`: 任务结果中的实体列表
    /// - `rows`: 输入表格的第二遍读取，游标停在本任务的第一行
    /// - `writer`: 输出表格
    ///
    /// # 返回
    /// 返回写出的行数
    pub fn merge<R, W>(
        &self,
        ctx: &JobCtx,
        entities: &[Entity],
        rows: &mut R,
        writer: &mut csv::Writer<W>,
    ) -> AppResult<usize>
    where
        R: Iterator<Item = csv::Result<StringRecord>>,
        W: Write,
    {
        if entities.len() != ctx.size() {
            return Err(AppError::malformed(
                format!("/queries/{}.json", ctx.job_id),
                format!(
                    "实体数量 {} 与提交的化合物数量 {} 不一致",
                    entities.len(),
                    ctx.size()
                ),
            ));
        }

        let mut written = 0;
        for (offset, entity) in entities.iter().enumerate() {
            let row_number = ctx.rows.start + offset + 1;
            let row = rows
                .next()
                .ok_or_else(|| input_changed(row_number))?
                .map_err(|e| AppError::table_failed(format!("输入第 {} 行", row_number), e))?;

            let mut record = row;
            for value in extract_fields(entity, &self.outfields)? {
                record.push_field(&value);
            }

            writer
                .write_record(&record)
                .map_err(|e| AppError::table_failed(format!("输出第 {} 行", row_number), e))?;
            written += 1;
        }

        writer
            .flush()
            .map_err(|e| AppError::file_write_failed(ctx.to_string(), e))?;

        debug!("{} 写出 {} 行", ctx, written);
        Ok(written)
    }
}

fn input_changed(row_number: usize) -> AppError {
    AppError::file_read_failed(
        format!("输入第 {} 行", row_number),
        io::Error::new(io::ErrorKind::UnexpectedEof, "输入表格在两次读取之间被修改"),
    )
}
