//! OpenAI 兼容的 Chat Completions 传输
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 DeepSeek、Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::api::{AnswerProvider, ModelReply};
use crate::config::Config;
use crate::error::ApiError;

/// OpenAI 兼容客户端
pub struct ChatProvider {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl ChatProvider {
    /// 创建新的客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }
}

#[async_trait]
impl AnswerProvider for ChatProvider {
    async fn generate(&self, prompt: &str) -> Result<ModelReply, ApiError> {
        debug!("调用 Chat API，模型: {}", self.model_name);

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(0.3)
            .max_tokens(1024u32)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("Chat API 调用失败: {}", e);
            ApiError::ChatFailed(e)
        })?;

        debug!("Chat API 调用成功");

        // choices 或 content 缺失属于结构问题，不再重试
        let Some(choice) = response.choices.into_iter().next() else {
            warn!("Chat API 返回结果为空");
            return Ok(ModelReply::Malformed);
        };

        match choice.message.content {
            Some(content) => {
                let content = content.trim();
                if content.is_empty() {
                    Ok(ModelReply::EmptyAnswer)
                } else {
                    Ok(ModelReply::Answer(content.to_string()))
                }
            }
            None => Ok(ModelReply::Malformed),
        }
    }
}
