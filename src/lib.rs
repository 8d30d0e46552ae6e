//! # Claim Dialogue
//!
//! 读取 CSV 中的信息条目，调用生成式模型判断正误并构造两轮问答对话，
//! 把回答写回 CSV；另附一个把对话转录文本整理成四列表格的独立工具。
//!
//! ## 架构设计
//!
//! ### ① 传输层（Api）
//! - `api/` - 两种远端传输（Gemini REST / OpenAI 兼容 Chat），统一为 `AnswerProvider`
//! - 响应归一化为 `ModelReply`（有效回答 / 空回答 / 结构缺失）
//!
//! ### ② 核心层（Pipeline）
//! - `pipeline` - 批量问答流水线：分批、渲染、退避重试、限速、对账
//! - 唯一的硬性保证：输出回答列表与输入条目列表等长且同序
//!
//! ### ③ 数据层（Dataset / Convert）
//! - `dataset` - CSV 读取（GBK/GB18030 编码回退）与带 BOM 的 UTF-8 写出
//! - `convert` - 对话转录文本 → 四列 CSV
//!
//! ### ④ 编排层（App）
//! - `app` - 读取 → 处理 → 写出 → 统计

pub mod api;
pub mod app;
pub mod config;
pub mod convert;
pub mod dataset;
pub mod error;
pub mod logger;
pub mod pipeline;
pub mod prompt;

// 重新导出常用类型
pub use api::{AnswerProvider, ChatProvider, GeminiProvider, ModelReply};
pub use app::App;
pub use config::Config;
pub use dataset::ClaimTable;
pub use error::{ApiError, AppError, AppResult, SinkError, SourceError};
pub use pipeline::{AttemptOutcome, Pipeline, PipelineOptions, RetryPolicy};
