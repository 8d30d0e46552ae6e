//! 远端文本生成 API 模块
//!
//! 两种传输方式实现同一个 `AnswerProvider` 接口：
//! - `gemini` - Gemini generateContent REST 接口（reqwest）
//! - `chat` - OpenAI 兼容的 Chat Completions 接口（async-openai）
//!
//! 所有传输都把远端响应归一化为 `ModelReply`，由流水线统一处理。

pub mod chat;
pub mod gemini;

pub use chat::ChatProvider;
pub use gemini::GeminiProvider;

use async_trait::async_trait;

use crate::error::ApiError;

/// 远端模型响应的归一化表示
///
/// 调用方对三种情况穷尽匹配，不做嵌套的存在性判断
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    /// 提取到非空回答文本（已去除首尾空白）
    Answer(String),
    /// 结构完整但回答文本为空
    EmptyAnswer,
    /// 响应结构缺失，未找到有效的回答内容
    Malformed,
}

/// 文本生成能力的统一接口
///
/// 接收一条渲染好的提示词，返回归一化后的模型响应。
/// `Err` 表示瞬时失败（网络、超时、非 2xx），由调用方决定是否重试；
/// 结构性问题（空回答、格式缺失）通过 `ModelReply` 表达，不算错误。
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<ModelReply, ApiError>;
}

#[async_trait]
impl<'a, P: AnswerProvider + ?Sized> AnswerProvider for &'a P {
    async fn generate(&self, prompt: &str) -> Result<ModelReply, ApiError> {
        (**self).generate(prompt).await
    }
}
