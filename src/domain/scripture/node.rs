//! Scripture Context - 结构节点
//!
//! USJ 在边界处一次性转换为带标签的节点类型，
//! 之后的分解逻辑只面对这几种节点。

use super::usj::{UsjContent, UsjDocument, UsjElement};
use super::ScriptureError;

/// 不计入经文正文的字符标记（备用编号）
const ALTERNATE_NUMBER_MARKERS: &[&str] = &["va", "vp", "ca"];

/// 顶层结构节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralNode {
    /// 书卷标记，文档中只出现一次
    Book { code: String },
    /// 章节开始，直到下一个 Chapter 或文档结束
    Chapter { number: u32 },
    /// 段落容器
    Paragraph {
        marker: String,
        content: Vec<ParagraphItem>,
    },
}

/// 段落内容项
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphItem {
    /// 经节标记，原始编号可能是 "7"、"23-24" 或 "5,7"
    VerseMarker { number: String },
    /// 文本片段
    TextRun(String),
}

impl StructuralNode {
    /// 将 USJ 文档转换为结构节点序列
    ///
    /// 未识别的顶层元素被忽略。章节号无法解析时返回错误。
    pub fn from_usj(document: &UsjDocument) -> Result<Vec<StructuralNode>, ScriptureError> {
        let mut nodes = Vec::new();

        for element in document.elements() {
            match element.kind.as_str() {
                "book" => {
                    let code = element
                        .code
                        .as_deref()
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .ok_or(ScriptureError::MissingBookCode)?;
                    nodes.push(StructuralNode::Book {
                        code: code.to_uppercase(),
                    });
                }
                "chapter" => {
                    let raw = element.number.as_deref().unwrap_or_default();
                    let number = raw
                        .trim()
                        .parse::<u32>()
                        .map_err(|_| ScriptureError::InvalidChapterNumber(raw.to_string()))?;
                    nodes.push(StructuralNode::Chapter { number });
                }
                "para" => {
                    let mut content = Vec::new();
                    flatten_into(&element.content, &mut content);
                    nodes.push(StructuralNode::Paragraph {
                        marker: element.marker().to_string(),
                        content,
                    });
                }
                other => {
                    tracing::trace!(kind = other, "Skipping top-level USJ element");
                }
            }
        }

        Ok(nodes)
    }
}

/// 展平段落内容：字符样式保留文字，注释和图片丢弃
fn flatten_into(items: &[UsjContent], out: &mut Vec<ParagraphItem>) {
    for item in items {
        match item {
            UsjContent::Text(text) => out.push(ParagraphItem::TextRun(text.clone())),
            UsjContent::Element(element) => flatten_element(element, out),
        }
    }
}

fn flatten_element(element: &UsjElement, out: &mut Vec<ParagraphItem>) {
    match element.kind.as_str() {
        "verse" => out.push(ParagraphItem::VerseMarker {
            number: element.number.clone().unwrap_or_default(),
        }),
        "note" | "figure" | "optbreak" | "ms" => {}
        "char" if ALTERNATE_NUMBER_MARKERS.contains(&element.marker()) => {}
        _ => flatten_into(&element.content, out),
    }
}

/// 文档中的书卷代码（第一个 Book 节点）
pub fn book_code(nodes: &[StructuralNode]) -> Option<&str> {
    nodes.iter().find_map(|node| match node {
        StructuralNode::Book { code } => Some(code.as_str()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(content: serde_json::Value) -> UsjDocument {
        UsjDocument::from_value(json!({"type": "USJ", "version": "3.0", "content": content}))
            .unwrap()
    }

    #[test]
    fn test_converts_book_chapter_and_paragraph() {
        let document = doc(json!([
            {"type": "book", "marker": "id", "code": "gen"},
            {"type": "chapter", "marker": "c", "number": "3"},
            {"type": "para", "marker": "p", "content": [
                {"type": "verse", "marker": "v", "number": "1"},
                "Now the serpent"
            ]}
        ]));

        let nodes = StructuralNode::from_usj(&document).unwrap();
        assert_eq!(
            nodes,
            vec![
                StructuralNode::Book { code: "GEN".into() },
                StructuralNode::Chapter { number: 3 },
                StructuralNode::Paragraph {
                    marker: "p".into(),
                    content: vec![
                        ParagraphItem::VerseMarker { number: "1".into() },
                        ParagraphItem::TextRun("Now the serpent".into()),
                    ],
                },
            ]
        );
        assert_eq!(book_code(&nodes), Some("GEN"));
    }

    #[test]
    fn test_char_is_flattened_and_notes_dropped() {
        let document = doc(json!([
            {"type": "para", "marker": "p", "content": [
                {"type": "verse", "marker": "v", "number": "2"},
                "The earth was ",
                {"type": "char", "marker": "add", "content": ["without form"]},
                {"type": "note", "marker": "f", "caller": "+", "content": ["Or: empty"]},
                {"type": "char", "marker": "vp", "content": ["2b"]}
            ]}
        ]));

        let nodes = StructuralNode::from_usj(&document).unwrap();
        let StructuralNode::Paragraph { content, .. } = &nodes[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(
            content,
            &vec![
                ParagraphItem::VerseMarker { number: "2".into() },
                ParagraphItem::TextRun("The earth was ".into()),
                ParagraphItem::TextRun("without form".into()),
            ]
        );
    }

    #[test]
    fn test_invalid_chapter_number() {
        let document = doc(json!([{"type": "chapter", "marker": "c", "number": "x"}]));
        assert_eq!(
            StructuralNode::from_usj(&document),
            Err(ScriptureError::InvalidChapterNumber("x".into()))
        );
    }

    #[test]
    fn test_book_without_code() {
        let document = doc(json!([{"type": "book", "marker": "id"}]));
        assert_eq!(
            StructuralNode::from_usj(&document),
            Err(ScriptureError::MissingBookCode)
        );
    }
}
