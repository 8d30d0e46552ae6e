use anyhow::Result;
use claim_dialogue::{convert, Config};

fn main() -> Result<()> {
    // 初始化日志
    claim_dialogue::logger::init();

    // 加载配置
    let config = Config::from_env();

    // 转录文本 → 四列 CSV
    convert::convert_file(&config.transcript_txt, &config.transcript_csv)?;

    Ok(())
}
