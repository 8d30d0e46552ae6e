//! 批量问答流水线 - 核心编排
//!
//! ## 职责
//!
//! 把有序的条目列表变成等长的有序回答列表：
//!
//! 1. **分批**：按 `batch_size` 划分批次，仅用于进度展示，远端仍按条目逐个调用
//! 2. **渲染**：把条目内容代入提示词模板的替换点
//! 3. **重试**：瞬时失败按指数退避重试，结构性空回答立即记空值不重试
//! 4. **限速**：每个条目结束后等待固定延迟
//! 5. **对账**：完成后若回答数少于条目数，用空值补齐
//!
//! ## 保证
//!
//! `process` 不会向外抛出任何错误：单个条目的所有失败都退化为该条目的
//! 空字符串回答，绝不影响后续条目。下游表格输出因此永远不会出现错行。

use std::time::Duration;

use tracing::{info, warn};

use crate::api::{AnswerProvider, ModelReply};
use crate::logger::truncate_text;
use crate::prompt;

/// 重试策略
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 每个条目的最大尝试次数
    pub retries: u32,
    /// 指数退避倍率
    pub backoff_factor: f64,
    /// 退避时间单位（第 n 次失败后等待 backoff_factor^n 个单位）
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff_factor: 2.0,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// 第 `attempt_index` 次失败后的等待时长（attempt_index 从 0 开始）
    pub fn delay_before_retry(&self, attempt_index: u32) -> Duration {
        self.backoff_unit
            .mul_f64(self.backoff_factor.powi(attempt_index as i32))
    }
}

/// 单个条目重试循环的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// 获取到非空回答
    Success(String),
    /// 响应结构空缺或回答为空，不消耗剩余重试次数
    EmptyContent,
    /// 重试次数用尽
    ExhaustedRetries,
}

/// 流水线配置
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// 提示词模板，含一个 `{content}` 替换点
    pub template: String,
    /// 每批条目数量
    pub batch_size: usize,
    /// 重试策略
    pub retry: RetryPolicy,
    /// 条目之间的限速延迟
    pub inter_item_delay: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            template: prompt::TEMPLATE.to_string(),
            batch_size: 5,
            retry: RetryPolicy::default(),
            inter_item_delay: Duration::from_secs(1),
        }
    }
}

/// 批量问答流水线
pub struct Pipeline<P> {
    provider: P,
    options: PipelineOptions,
}

impl<P: AnswerProvider> Pipeline<P> {
    pub fn new(provider: P, options: PipelineOptions) -> Self {
        Self { provider, options }
    }

    /// 处理全部条目，返回与输入等长、同序的回答列表
    ///
    /// 每个条目恰好产生一个回答；彻底失败的条目记为空字符串。
    pub async fn process(&self, items: &[String]) -> Vec<String> {
        let mut answers: Vec<String> = Vec::with_capacity(items.len());
        if items.is_empty() {
            return answers;
        }

        let batch_size = self.options.batch_size.max(1);
        let total_batches = (items.len() + batch_size - 1) / batch_size;

        for (batch_index, batch) in items.chunks(batch_size).enumerate() {
            info!(
                "📦 处理第 {}/{} 批，共 {} 个问题",
                batch_index + 1,
                total_batches,
                batch.len()
            );

            for (idx, item) in batch.iter().enumerate() {
                let item_number = batch_index * batch_size + idx + 1;
                info!(
                    "[问题 {}/{}] {}",
                    item_number,
                    items.len(),
                    truncate_text(item, 80)
                );

                let answer = match self.answer_one(item).await {
                    AttemptOutcome::Success(text) => {
                        info!(
                            "[问题 {}] ✓ 成功获取回答: {}",
                            item_number,
                            truncate_text(&text, 80)
                        );
                        text
                    }
                    AttemptOutcome::EmptyContent => {
                        warn!("[问题 {}] ⚠️ 回答内容为空，添加空值", item_number);
                        String::new()
                    }
                    AttemptOutcome::ExhaustedRetries => {
                        warn!("[问题 {}] ⚠️ 达到最大重试次数，添加空值", item_number);
                        String::new()
                    }
                };
                answers.push(answer);

                // 限速延迟，与单个条目的成败无关
                tokio::time::sleep(self.options.inter_item_delay).await;
            }
        }

        // 防御性对账：正常情况下每个条目恰好追加了一个回答
        if answers.len() != items.len() {
            warn!(
                "⚠️ 回答数量 ({}) 与问题数量 ({}) 不匹配，用空值补齐",
                answers.len(),
                items.len()
            );
            while answers.len() < items.len() {
                answers.push(String::new());
            }
        }

        answers
    }

    /// 对单个条目执行"渲染 → 调用 → 重试"循环
    async fn answer_one(&self, item: &str) -> AttemptOutcome {
        let prompt = prompt::render(&self.options.template, item);
        let retries = self.options.retry.retries.max(1);

        for attempt in 0..retries {
            match self.provider.generate(&prompt).await {
                Ok(ModelReply::Answer(text)) => return AttemptOutcome::Success(text),
                Ok(ModelReply::EmptyAnswer) => {
                    warn!("回答内容为空");
                    return AttemptOutcome::EmptyContent;
                }
                Ok(ModelReply::Malformed) => {
                    warn!("未找到有效的回答内容");
                    return AttemptOutcome::EmptyContent;
                }
                Err(e) => {
                    warn!("请求失败 (第 {}/{} 次): {}", attempt + 1, retries, e);
                }
            }

            if attempt + 1 < retries {
                let wait = self.options.retry.delay_before_retry(attempt);
                info!("等待 {:?} 后重试...", wait);
                tokio::time::sleep(wait).await;
            }
        }

        AttemptOutcome::ExhaustedRetries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_schedule_follows_backoff_factor() {
        let policy = RetryPolicy {
            retries: 4,
            backoff_factor: 2.0,
            backoff_unit: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_before_retry(0), Duration::from_millis(100));
        assert_eq!(policy.delay_before_retry(1), Duration::from_millis(200));
        assert_eq!(policy.delay_before_retry(2), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_schedule_non_integer_factor() {
        let policy = RetryPolicy {
            retries: 3,
            backoff_factor: 1.5,
            backoff_unit: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_before_retry(1), Duration::from_millis(150));
        assert_eq!(policy.delay_before_retry(2), Duration::from_millis(225));
    }
}
