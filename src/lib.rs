//! # ClassyFire Client
//!
//! 一个用于向 ClassyFire 分类服务提交化合物、轮询结果并回写表格的 Rust 客户端
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（HTTP client），只暴露能力
//! - `Transport` - 一次调用一次 HTTP 往返，非 2xx 即报错
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `QuerySubmitter` - 把一组化合物提交为一个任务
//! - `ResultPoller` - 查一次任务状态 / 按标识查实体
//! - `path_guard` - 生成不覆盖已有文件的输出路径
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个已完成任务"的合并流程
//! - `JobCtx` - 上下文封装（任务索引 + 对应的输入行范围）
//! - `MergeFlow` - 实体与输入行逐一对齐并写出
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/tabular_annotator` - 分块提交、按序轮询、合并写出
//! - `orchestrator/app` - 命令入口，持有 HTTP 传输
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{HttpTransport, Transport};
pub use models::{Entity, JobId, QueryResult, ResultFormat, StructureRecord, TableDialect};
pub use orchestrator::{
    AnnotationSummary, App, ProgressEvent, ProgressObserver, TabularAnnotator, TabularQuery,
};
pub use services::derive_nonclashing_path;
pub use workflow::{JobCtx, MergeFlow};
