//! 提示词模板
//!
//! 模板要求模型判断信息正误，并构造两轮问答对话。
//! 模板是固定的配置常量，唯一的替换点是 `{content}`。

/// 固定提示词模板
pub const TEMPLATE: &str = r#"
判断下列信息是否正确：
"{content}"
请你为我构造一个多轮问答数据，第一轮是用户提供的信息和你认为的标准答案；第二轮是用户提问为什么和你对信息的分析。格式为：
1用户：[]。
2回答：[]。
3用户：
4回答：
请你的回答中去除格式前的数字，并且要空行
"#;

/// 将条目内容代入模板的替换点
pub fn render(template: &str, content: &str) -> String {
    template.replace("{content}", content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_content() {
        let rendered = render(TEMPLATE, "秦始皇统一六国于公元前221年");
        assert!(rendered.contains("秦始皇统一六国于公元前221年"));
        assert!(!rendered.contains("{content}"));
    }

    #[test]
    fn test_render_keeps_layout_instructions() {
        let rendered = render(TEMPLATE, "测试");
        assert!(rendered.contains("判断下列信息是否正确"));
        assert!(rendered.contains("1用户：[]。"));
        assert!(rendered.contains("4回答："));
    }
}
