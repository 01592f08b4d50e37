//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 校验配置、持有 HTTP 传输
//! - 分发命令，输出全局统计
//!
//! ### `tabular_annotator` - 表格注释器
//! - 读取输入表格、分块提交
//! - 按提交顺序轮询任务
//! - 委托 `MergeFlow` 写出已完成任务的行
//!
//! ### `progress` - 进度通知
//! - 编排器只发事件，展示方式由观察者决定
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! tabular_annotator (处理 Vec<Job>)
//!     ↓
//! workflow::MergeFlow (处理单个已完成任务)
//!     ↓
//! services (能力层：submit / poll / path guard)
//!     ↓
//! infrastructure (基础设施：Transport)
//! ```

pub mod app;
pub mod progress;
pub mod tabular_annotator;

pub use app::App;
pub use progress::{LogProgress, ProgressEvent, ProgressObserver};
pub use tabular_annotator::{AnnotationSummary, TabularAnnotator, TabularQuery};
