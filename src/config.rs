use std::time::Duration;

use crate::pipeline::{PipelineOptions, RetryPolicy};
use crate::prompt;

/// 程序配置
///
/// 所有选项都有内置默认值，可通过同名环境变量覆盖
#[derive(Clone, Debug)]
pub struct Config {
    /// 输入 CSV 文件路径
    pub input_csv: String,
    /// 输出 CSV 文件路径
    pub output_csv: String,
    /// 问题所在的列名
    pub content_column: String,
    /// 追加的回答列名
    pub answer_column: String,
    /// 每批处理的条目数量
    pub batch_size: usize,
    /// 每个条目的最大尝试次数
    pub retries: u32,
    /// 指数退避倍率
    pub backoff_factor: f64,
    /// 条目之间的限速延迟（毫秒）
    pub inter_item_delay_ms: u64,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 输出日志文件
    pub output_log_file: String,
    // --- Gemini API 配置 ---
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub gemini_model: String,
    // --- OpenAI 兼容 API 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 对话转录转换 ---
    pub transcript_txt: String,
    pub transcript_csv: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_csv: "1.csv".to_string(),
            output_csv: "5.csv".to_string(),
            content_column: "content".to_string(),
            answer_column: "answer".to_string(),
            batch_size: 5,
            retries: 3,
            backoff_factor: 2.0,
            inter_item_delay_ms: 1000,
            request_timeout_secs: 30,
            output_log_file: "answer.log".to_string(),
            gemini_api_key: String::new(),
            gemini_api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.deepseek.com/v1".to_string(),
            llm_model_name: "deepseek-chat".to_string(),
            transcript_txt: "conversation.md".to_string(),
            transcript_csv: "conversation.csv".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            input_csv: std::env::var("INPUT_CSV").unwrap_or(default.input_csv),
            output_csv: std::env::var("OUTPUT_CSV").unwrap_or(default.output_csv),
            content_column: std::env::var("CONTENT_COLUMN").unwrap_or(default.content_column),
            answer_column: std::env::var("ANSWER_COLUMN").unwrap_or(default.answer_column),
            batch_size: std::env::var("BATCH_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.batch_size),
            retries: std::env::var("RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retries),
            backoff_factor: std::env::var("BACKOFF_FACTOR").ok().and_then(|v| v.parse().ok()).unwrap_or(default.backoff_factor),
            inter_item_delay_ms: std::env::var("INTER_ITEM_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.inter_item_delay_ms),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            gemini_api_key: std::env::var("GEMINI_API_KEY").unwrap_or(default.gemini_api_key),
            gemini_api_base: std::env::var("GEMINI_API_BASE").unwrap_or(default.gemini_api_base),
            gemini_model: std::env::var("GEMINI_MODEL").unwrap_or(default.gemini_model),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            transcript_txt: std::env::var("TRANSCRIPT_TXT").unwrap_or(default.transcript_txt),
            transcript_csv: std::env::var("TRANSCRIPT_CSV").unwrap_or(default.transcript_csv),
        }
    }

    /// 由配置构造流水线选项
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            template: prompt::TEMPLATE.to_string(),
            batch_size: self.batch_size,
            retry: RetryPolicy {
                retries: self.retries,
                backoff_factor: self.backoff_factor,
                backoff_unit: Duration::from_secs(1),
            },
            inter_item_delay: Duration::from_millis(self.inter_item_delay_ms),
        }
    }
}
