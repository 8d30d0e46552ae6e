use anyhow::Result;
use claim_dialogue::{App, Config, GeminiProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    claim_dialogue::logger::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用（Gemini REST 传输）
    let provider = GeminiProvider::new(&config)?;
    App::new(config, provider).run().await?;

    Ok(())
}
