//! 应用程序错误类型
//!
//! 错误分为三类：
//! - `SourceError`：条目来源（输入 CSV）不可用，整个运行终止
//! - `SinkError`：结果无法落盘，整个运行终止
//! - `ApiError`：远端调用失败，属于瞬时错误，由流水线内部消化，不会向外传播

use thiserror::Error;

/// 应用程序错误
#[derive(Debug, Error)]
pub enum AppError {
    /// 条目来源错误
    #[error("数据源错误: {0}")]
    Source(#[from] SourceError),
    /// 结果落盘错误
    #[error("结果写入错误: {0}")]
    Sink(#[from] SinkError),
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
}

/// 条目来源错误（致命，不进行任何处理）
#[derive(Debug, Error)]
pub enum SourceError {
    /// 文件不存在
    #[error("文件未找到: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },
    /// 编码回退失败
    #[error("无法以 GBK 或 GB18030 编码读取文件: {path}")]
    DecodeFailed { path: String },
    /// 缺少必需的列
    #[error("CSV 文件中缺少 '{column}' 列，请检查文件格式")]
    MissingColumn { column: String },
    /// CSV 解析失败
    #[error("CSV 解析失败 ({path}): {source}")]
    CsvParseFailed { path: String, source: csv::Error },
}

/// 结果落盘错误（致命，已计算的回答随之丢失）
#[derive(Debug, Error)]
pub enum SinkError {
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        source: std::io::Error,
    },
    /// CSV 序列化失败
    #[error("CSV 序列化失败: {0}")]
    CsvWriteFailed(#[from] csv::Error),
}

/// API 调用错误（瞬时，按退避策略重试）
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败（连接错误、超时等）
    #[error("网络请求失败: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// API 返回非 2xx 状态
    #[error("API 返回错误状态 {status}: {body}")]
    BadStatus { status: u16, body: String },
    /// Chat API 调用失败
    #[error("Chat API 调用失败: {0}")]
    ChatFailed(#[from] async_openai::error::OpenAIError),
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
