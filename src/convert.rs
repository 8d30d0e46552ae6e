//! 对话转录转换 - 独立工具
//!
//! 把手工导出的对话转录文本（`用户：` / `回答：` 开头的行）按行分类，
//! 组装成（用户，回答）对，每两对合并为一行四列的 CSV 输出。

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{info, warn};

use crate::dataset::write_bytes_with_bom;
use crate::logger::truncate_text;

/// 两轮对话构成的一行输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogueRow {
    pub user1: String,
    pub answer1: String,
    pub user2: String,
    pub answer2: String,
}

/// 行分类用的正则
///
/// 兼容角色标记后带中文引号或英文引号包裹的内容
struct LinePatterns {
    user: Regex,
    answer: Regex,
}

impl LinePatterns {
    fn new() -> Result<Self> {
        Ok(Self {
            user: Regex::new(r#"^用户：\s*[“"]?(.*?)[”"]?$"#)?,
            answer: Regex::new(r#"^回答：\s*[“"]?(.*?)[”"]?$"#)?,
        })
    }
}

/// 把转录文本解析为（用户，回答）对
///
/// - `用户：` 行开启新的一组（先保存上一组完整的对）
/// - 没有对应用户提问的 `回答：` 行告警后跳过
/// - 空行与 `---` 分隔行跳过，其他无法识别的行告警后跳过，都不致命
pub fn parse_pairs(text: &str) -> Result<Vec<(String, String)>> {
    let patterns = LinePatterns::new()?;

    let mut pairs = Vec::new();
    let mut current_user: Option<String> = None;
    let mut current_answer: Option<String> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with("---") {
            continue;
        }

        if let Some(caps) = patterns.user.captures(line) {
            if let (Some(user), Some(answer)) = (current_user.take(), current_answer.take()) {
                pairs.push((user, answer));
            }
            current_user = non_empty(caps[1].trim());
            current_answer = None;
            continue;
        }

        if let Some(caps) = patterns.answer.captures(line) {
            if current_user.is_none() {
                warn!("第 {} 行发现回答但没有对应的用户问题，跳过", line_number);
                continue;
            }
            current_answer = non_empty(caps[1].trim());
            continue;
        }

        warn!(
            "第 {} 行格式无法识别，跳过: {}",
            line_number,
            truncate_text(line, 60)
        );
    }

    // 保存最后一组完整的对
    if let (Some(user), Some(answer)) = (current_user, current_answer) {
        pairs.push((user, answer));
    }

    Ok(pairs)
}

/// 每两对对话合并为一行，第二对缺失时留空
pub fn group_rows(pairs: &[(String, String)]) -> Vec<DialogueRow> {
    pairs
        .chunks(2)
        .map(|chunk| {
            let mut row = DialogueRow {
                user1: chunk[0].0.clone(),
                answer1: chunk[0].1.clone(),
                ..Default::default()
            };
            if let Some(second) = chunk.get(1) {
                row.user2 = second.0.clone();
                row.answer2 = second.1.clone();
            }
            row
        })
        .collect()
}

/// 转换入口：转录文本文件 → 四列 CSV 文件
pub fn convert_file(txt_path: &str, csv_path: &str) -> Result<()> {
    if !Path::new(txt_path).exists() {
        anyhow::bail!("输入文件不存在: {}", txt_path);
    }

    let text = fs::read_to_string(txt_path)
        .with_context(|| format!("无法读取文件: {}", txt_path))?;

    let pairs = parse_pairs(&text)?;
    if pairs.is_empty() {
        warn!("⚠️ 未找到任何有效的用户和回答对");
        return Ok(());
    }

    let rows = group_rows(&pairs);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["User1", "Answer1", "User2", "Answer2"])?;
    for row in &rows {
        writer.write_record([&row.user1, &row.answer1, &row.user2, &row.answer2])?;
    }
    let body = writer.into_inner().map_err(|e| e.into_error())?;

    write_bytes_with_bom(csv_path, &body)
        .with_context(|| format!("无法写入 CSV 文件: {}", csv_path))?;

    info!(
        "✓ 转换完成，共 {} 组对话，{} 行已写入 {}",
        pairs.len(),
        rows.len(),
        csv_path
    );
    Ok(())
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_pairs_make_one_row() {
        let text = "用户：A\n回答：B\n用户：C\n回答：D\n";
        let pairs = parse_pairs(text).expect("解析失败");
        let rows = group_rows(&pairs);

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            DialogueRow {
                user1: "A".to_string(),
                answer1: "B".to_string(),
                user2: "C".to_string(),
                answer2: "D".to_string(),
            }
        );
    }

    #[test]
    fn test_single_pair_leaves_second_half_empty() {
        let text = "用户：A\n回答：B\n";
        let rows = group_rows(&parse_pairs(text).expect("解析失败"));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user1, "A");
        assert_eq!(rows[0].answer1, "B");
        assert_eq!(rows[0].user2, "");
        assert_eq!(rows[0].answer2, "");
    }

    #[test]
    fn test_orphan_answer_is_skipped() {
        // 没有前置用户提问的回答行被跳过，不产生任何对
        let text = "回答：B\n用户：C\n回答：D\n";
        let pairs = parse_pairs(text).expect("解析失败");

        assert_eq!(pairs, vec![("C".to_string(), "D".to_string())]);
    }

    #[test]
    fn test_quotes_and_separators_are_stripped() {
        let text = "用户：“秦始皇是谁？”\n回答：\"中国第一位皇帝。\"\n---\n";
        let pairs = parse_pairs(text).expect("解析失败");

        assert_eq!(
            pairs,
            vec![("秦始皇是谁？".to_string(), "中国第一位皇帝。".to_string())]
        );
    }

    #[test]
    fn test_unrecognized_lines_do_not_abort() {
        let text = "# 标题行\n用户：A\n随便写点什么\n回答：B\n";
        let pairs = parse_pairs(text).expect("解析失败");

        assert_eq!(pairs, vec![("A".to_string(), "B".to_string())]);
    }

    #[test]
    fn test_new_user_line_discards_unanswered_question() {
        // 第一个用户提问没有等到回答，被后续提问覆盖
        let text = "用户：A\n用户：C\n回答：D\n";
        let pairs = parse_pairs(text).expect("解析失败");

        assert_eq!(pairs, vec![("C".to_string(), "D".to_string())]);
    }

    #[test]
    fn test_three_pairs_make_two_rows() {
        let text = "用户：A\n回答：B\n用户：C\n回答：D\n用户：E\n回答：F\n";
        let rows = group_rows(&parse_pairs(text).expect("解析失败"));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].user1, "E");
        assert_eq!(rows[1].answer1, "F");
        assert_eq!(rows[1].user2, "");
    }

    #[test]
    fn test_convert_file_writes_four_column_csv() {
        let dir = std::env::temp_dir();
        let txt = dir.join(format!("claim_dialogue_{}_conv.md", std::process::id()));
        let csv = dir.join(format!("claim_dialogue_{}_conv.csv", std::process::id()));
        std::fs::write(&txt, "用户：A\n回答：B\n用户：C\n回答：D\n").expect("写入失败");

        convert_file(&txt.to_string_lossy(), &csv.to_string_lossy()).expect("转换失败");

        let bytes = std::fs::read(&csv).expect("读取输出失败");
        assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
        let text = String::from_utf8(bytes[3..].to_vec()).expect("应为 UTF-8");
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("User1,Answer1,User2,Answer2"));
        assert_eq!(lines.next(), Some("A,B,C,D"));

        let _ = std::fs::remove_file(&txt);
        let _ = std::fs::remove_file(&csv);
    }
}
