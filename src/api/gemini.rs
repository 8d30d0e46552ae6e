//! Gemini generateContent REST 传输
//!
//! 请求体固定为 `{"contents":[{"parts":[{"text": ...}]}]}`，
//! 回答文本位于 `candidates[0].content.parts[0].text`。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{AnswerProvider, ModelReply};
use crate::config::Config;
use crate::error::ApiError;
use crate::logger::truncate_text;

/// Gemini REST 客户端
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl GeminiProvider {
    /// 创建新的 Gemini 客户端
    ///
    /// 连接/读取超时配置在底层 HTTP 客户端上，超时与其他网络错误同样按瞬时失败处理
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            api_base: config.gemini_api_base.clone(),
            model: config.gemini_model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base.trim_end_matches('/'),
            self.model,
            self.api_key
        )
    }
}

#[async_trait]
impl AnswerProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<ModelReply, ApiError> {
        debug!("调用 Gemini API，模型: {}", self.model);

        let payload = GenerateContentRequest {
            contents: vec![ContentPayload {
                parts: vec![TextPart { text: prompt }],
            }],
        };

        let response = self.client.post(self.endpoint()).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("HTTP 错误: {}, 响应内容: {}", status, truncate_text(&body, 200));
            return Err(ApiError::BadStatus {
                status: status.as_u16(),
                body: truncate_text(&body, 200),
            });
        }

        // 2xx 之后的结构问题不再重试，归一化为 Malformed
        match response.json::<GenerateContentResponse>().await {
            Ok(data) => Ok(classify(data)),
            Err(e) => {
                warn!("响应 JSON 解析失败: {}", e);
                Ok(ModelReply::Malformed)
            }
        }
    }
}

// ========== 请求/响应结构 ==========

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<ContentPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct ContentPayload<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// 将响应结构归一化为 `ModelReply`
///
/// - 缺少 candidates / content / parts → `Malformed`
/// - text 缺失或去除空白后为空 → `EmptyAnswer`
/// - 其余 → `Answer`（已 trim）
fn classify(response: GenerateContentResponse) -> ModelReply {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return ModelReply::Malformed;
    };
    let Some(content) = candidate.content else {
        return ModelReply::Malformed;
    };
    let Some(part) = content.parts.into_iter().next() else {
        return ModelReply::Malformed;
    };
    let text = part.text.unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        ModelReply::EmptyAnswer
    } else {
        ModelReply::Answer(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(json).expect("响应应能反序列化")
    }

    #[test]
    fn test_classify_valid_answer() {
        let response = parse(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "  正确。秦始皇于公元前221年统一六国。  " }] }
            }]
        }));
        assert_eq!(
            classify(response),
            ModelReply::Answer("正确。秦始皇于公元前221年统一六国。".to_string())
        );
    }

    #[test]
    fn test_classify_empty_text() {
        let response = parse(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "   " }] } }]
        }));
        assert_eq!(classify(response), ModelReply::EmptyAnswer);
    }

    #[test]
    fn test_classify_missing_text_field() {
        let response = parse(serde_json::json!({
            "candidates": [{ "content": { "parts": [{}] } }]
        }));
        assert_eq!(classify(response), ModelReply::EmptyAnswer);
    }

    #[test]
    fn test_classify_no_candidates() {
        let response = parse(serde_json::json!({ "candidates": [] }));
        assert_eq!(classify(response), ModelReply::Malformed);

        let response = parse(serde_json::json!({}));
        assert_eq!(classify(response), ModelReply::Malformed);
    }

    #[test]
    fn test_classify_missing_content_or_parts() {
        let response = parse(serde_json::json!({ "candidates": [{}] }));
        assert_eq!(classify(response), ModelReply::Malformed);

        let response = parse(serde_json::json!({ "candidates": [{ "content": {} }] }));
        assert_eq!(classify(response), ModelReply::Malformed);
    }

    #[test]
    fn test_endpoint_format() {
        let config = Config {
            gemini_api_key: "test-key".to_string(),
            gemini_api_base: "https://generativelanguage.googleapis.com/v1beta/".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            ..Config::default()
        };
        let provider = GeminiProvider::new(&config).expect("客户端创建失败");
        assert_eq!(
            provider.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent?key=test-key"
        );
    }
}
