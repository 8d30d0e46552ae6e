//! CSV 条目来源与结果落盘
//!
//! 读取侧按 GBK → GB18030 的顺序尝试解码（国内导出的表格常见编码）；
//! 写出侧统一使用带 BOM 的 UTF-8，保证中文在表格软件中正常打开。

use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, GB18030, GBK};
use tracing::info;

use crate::error::{SinkError, SourceError};

/// 从输入 CSV 读入的表格
///
/// 保留全部原始行，输出时在末尾追加一列回答，保证行与回答一一对应
#[derive(Debug, Clone)]
pub struct ClaimTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    content_index: usize,
}

impl ClaimTable {
    /// 读取输入 CSV 并定位问题列
    ///
    /// 文件缺失、解码失败、缺少问题列都是致命错误，不做任何部分处理
    pub fn load(path: &str, content_column: &str) -> Result<Self, SourceError> {
        if !Path::new(path).exists() {
            return Err(SourceError::NotFound {
                path: path.to_string(),
            });
        }

        let bytes = fs::read(path).map_err(|source| SourceError::ReadFailed {
            path: path.to_string(),
            source,
        })?;

        let text = decode_with_fallback(&bytes).ok_or_else(|| SourceError::DecodeFailed {
            path: path.to_string(),
        })?;

        let mut reader = csv::Reader::from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|source| SourceError::CsvParseFailed {
                path: path.to_string(),
                source,
            })?
            .iter()
            .map(str::to_string)
            .collect();

        let content_index = headers
            .iter()
            .position(|h| h == content_column)
            .ok_or_else(|| SourceError::MissingColumn {
                column: content_column.to_string(),
            })?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| SourceError::CsvParseFailed {
                path: path.to_string(),
                source,
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        info!("✓ CSV 文件成功读取，共 {} 行", rows.len());

        Ok(Self {
            headers,
            rows,
            content_index,
        })
    }

    /// 问题列的值，按行序
    pub fn claims(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get(self.content_index).cloned().unwrap_or_default())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 在原表末尾追加一列回答并写出
    pub fn write_with_answers(
        &self,
        path: &str,
        answer_column: &str,
        answers: &[String],
    ) -> Result<(), SinkError> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut headers = self.headers.clone();
        headers.push(answer_column.to_string());
        writer.write_record(&headers)?;

        for (row, answer) in self.rows.iter().zip(answers) {
            let mut record = row.clone();
            record.push(answer.clone());
            writer.write_record(&record)?;
        }

        let body = writer
            .into_inner()
            .map_err(|e| SinkError::WriteFailed {
                path: path.to_string(),
                source: e.into_error(),
            })?;

        write_bytes_with_bom(path, &body)?;

        info!("✓ 处理完成，结果已保存到 {}", path);
        Ok(())
    }
}

/// 以带 BOM 的 UTF-8 写出文件内容
pub(crate) fn write_bytes_with_bom(path: &str, body: &[u8]) -> Result<(), SinkError> {
    let mut out = Vec::with_capacity(body.len() + 3);
    out.extend_from_slice(b"\xEF\xBB\xBF");
    out.extend_from_slice(body);
    fs::write(path, out).map_err(|source| SinkError::WriteFailed {
        path: path.to_string(),
        source,
    })
}

/// 按 GBK → GB18030 的顺序尝试解码
fn decode_with_fallback(bytes: &[u8]) -> Option<String> {
    let candidates: [&'static Encoding; 2] = [GBK, GB18030];
    for encoding in candidates {
        let (text, _, had_errors) = encoding.decode(bytes);
        if !had_errors {
            info!("CSV 文件以 '{}' 编码成功读取", encoding.name());
            return Some(text.into_owned());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("claim_dialogue_{}_{}", std::process::id(), name))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_load_gbk_encoded_csv() {
        let path = temp_path("gbk_in.csv");
        let csv_text = "id,content\n1,秦始皇统一六国于公元前221年\n2,长城修建于明朝\n";
        let (encoded, _, _) = GBK.encode(csv_text);
        fs::write(&path, &encoded).expect("写入测试文件失败");

        let table = ClaimTable::load(&path, "content").expect("应能以 GBK 读取");
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.claims(),
            vec![
                "秦始皇统一六国于公元前221年".to_string(),
                "长城修建于明朝".to_string()
            ]
        );

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ClaimTable::load("/nonexistent/claims.csv", "content");
        assert!(matches!(result, Err(SourceError::NotFound { .. })));
    }

    #[test]
    fn test_load_missing_content_column() {
        let path = temp_path("no_column.csv");
        let (encoded, _, _) = GBK.encode("id,text\n1,内容\n");
        fs::write(&path, &encoded).expect("写入测试文件失败");

        let result = ClaimTable::load(&path, "content");
        assert!(matches!(result, Err(SourceError::MissingColumn { .. })));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_write_with_answers_appends_column_and_bom() {
        let in_path = temp_path("answers_in.csv");
        let out_path = temp_path("answers_out.csv");
        let (encoded, _, _) = GBK.encode("content\n问题一\n问题二\n");
        fs::write(&in_path, &encoded).expect("写入测试文件失败");

        let table = ClaimTable::load(&in_path, "content").expect("读取失败");
        let answers = vec!["回答一".to_string(), String::new()];
        table
            .write_with_answers(&out_path, "answer", &answers)
            .expect("写出失败");

        let bytes = fs::read(&out_path).expect("读取输出失败");
        assert!(bytes.starts_with(b"\xEF\xBB\xBF"), "输出应带 UTF-8 BOM");

        let text = String::from_utf8(bytes[3..].to_vec()).expect("输出应为 UTF-8");
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("content,answer"));
        assert_eq!(lines.next(), Some("问题一,回答一"));
        assert_eq!(lines.next(), Some("问题二,"));

        let _ = fs::remove_file(&in_path);
        let _ = fs::remove_file(&out_path);
    }
}
