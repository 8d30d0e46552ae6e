//! 应用编排 - 顶层流程
//!
//! 读取输入表格 → 运行批量问答流水线 → 追加回答列写出 → 输出统计。
//! 只有数据源和落盘失败会终止运行，单个条目的远端失败全部在流水线内消化。

use std::fs;

use tracing::{info, warn};

use crate::api::AnswerProvider;
use crate::config::Config;
use crate::dataset::ClaimTable;
use crate::error::{AppResult, SinkError};
use crate::pipeline::Pipeline;

/// 应用主结构
pub struct App<P> {
    config: Config,
    provider: P,
}

impl<P: AnswerProvider> App<P> {
    pub fn new(config: Config, provider: P) -> Self {
        Self { config, provider }
    }

    /// 运行应用主逻辑
    ///
    /// 只有数据源和落盘错误会让整个运行失败
    pub async fn run(&self) -> AppResult<()> {
        init_log_file(&self.config)?;
        log_startup(&self.config);

        // 读取输入表格
        let table = ClaimTable::load(&self.config.input_csv, &self.config.content_column)?;
        let claims = table.claims();
        info!("总共读取到 {} 个问题", claims.len());

        if claims.is_empty() {
            warn!("⚠️ 没有找到任何问题，程序结束");
            return Ok(());
        }

        // 逐条处理
        let pipeline = Pipeline::new(&self.provider, self.config.pipeline_options());
        let answers = pipeline.process(&claims).await;
        info!("总共收集到 {} 个答案", answers.len());

        // 追加回答列写出
        table.write_with_answers(
            &self.config.output_csv,
            &self.config.answer_column,
            &answers,
        )?;

        print_final_stats(&answers, &self.config);

        Ok(())
    }
}

// ========== 日志辅助函数 ==========

fn init_log_file(config: &Config) -> Result<(), SinkError> {
    let log_header = format!(
        "{}\n问答处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(&config.output_log_file, log_header).map_err(|source| SinkError::WriteFailed {
        path: config.output_log_file.clone(),
        source,
    })?;
    Ok(())
}

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量问答处理模式");
    info!("📄 输入文件: {}", config.input_csv);
    info!("📊 批次大小: {}，最大重试次数: {}", config.batch_size, config.retries);
    info!("{}", "=".repeat(60));
}

fn print_final_stats(answers: &[String], config: &Config) {
    let answered = answers.iter().filter(|a| !a.is_empty()).count();
    let failed = answers.len() - answered;

    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", answered, answers.len());
    info!("❌ 空值: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", config.output_csv);
}
