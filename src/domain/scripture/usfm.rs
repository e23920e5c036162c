//! USFM 解析器
//!
//! 把 USFM 文本转换为 USJ 文档。只覆盖分解经文所需的标记：
//! - `\id` 书卷、`\c` 章节、`\v` 经节
//! - 段落类标记（`\p`、`\q1`、`\s1`、`\mt1` 等，未识别的标记也按段落处理）
//! - 字符样式（`\w`、`\add`、`\nd`、嵌套 `\+w` 等），`|` 之后的属性被丢弃
//! - 脚注/交叉引用（`\f`、`\fe`、`\x`），内部标记被展平
//! - 里程碑标记（`\qt-s\*`）被跳过

use super::usj::{UsjContent, UsjDocument, UsjElement};
use super::ScriptureError;

const NOTE_MARKERS: &[&str] = &["f", "fe", "ef", "x", "ex"];

const CHAR_MARKERS: &[&str] = &[
    "add", "addpn", "bd", "bdit", "bk", "ca", "dc", "em", "ior", "iqt", "it", "jmp", "k", "nd",
    "ndx", "no", "ord", "pn", "png", "pro", "qac", "qs", "qt", "rb", "rq", "sc", "sig", "sls",
    "sup", "tl", "va", "vp", "w", "wa", "wg", "wh", "wj", "xt",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Marker {
        name: &'a str,
        closing: bool,
        line: usize,
    },
    Text {
        text: &'a str,
        line: usize,
    },
}

/// 解析 USFM 文本
///
/// # 错误
/// - 缺少 `\id` 时返回 `MissingBookCode`
/// - `\c` / `\v` 后缺少编号时返回 `Usfm { line, .. }`
pub fn parse_usfm(source: &str) -> Result<UsjDocument, ScriptureError> {
    let mut tokens = tokenize(source);
    let mut builder = UsjBuilder::default();

    for index in 0..tokens.len() {
        let token = tokens[index];
        match token {
            Token::Text { text, .. } => builder.push_text(text),
            Token::Marker {
                name,
                closing: true,
                ..
            } => builder.close_marker(name),
            Token::Marker {
                name,
                closing: false,
                line,
            } => {
                let marker = name.trim_start_matches('+');
                match marker {
                    "id" => {
                        let code =
                            take_word(&mut tokens, index).ok_or(ScriptureError::MissingBookCode)?;
                        let rest = take_text(&mut tokens, index);
                        builder.open_book(code, rest);
                    }
                    "c" => {
                        let number = take_word(&mut tokens, index).ok_or_else(|| {
                            ScriptureError::Usfm {
                                line,
                                message: "\\c marker without a chapter number".to_string(),
                            }
                        })?;
                        builder.open_chapter(number);
                    }
                    "v" => {
                        let number = take_word(&mut tokens, index).ok_or_else(|| {
                            ScriptureError::Usfm {
                                line,
                                message: "\\v marker without a verse number".to_string(),
                            }
                        })?;
                        builder.open_verse(number);
                    }
                    "" => {}
                    m if m.ends_with("-s") || m.ends_with("-e") => {
                        // 里程碑属性 `|who="..."` 不属于正文
                        if let Some(Token::Text { text, .. }) = tokens.get(index + 1).copied() {
                            if text.trim_start().starts_with('|') {
                                take_text(&mut tokens, index);
                            }
                        }
                    }
                    m if builder.in_note() && (m.starts_with('f') || m.starts_with('x')) => {}
                    m if NOTE_MARKERS.contains(&m) => {
                        let caller = take_word(&mut tokens, index);
                        builder.open_note(m, caller);
                    }
                    "fig" => builder.open_inline(UsjElement::new("figure", "fig")),
                    m if CHAR_MARKERS.contains(&m) => {
                        builder.open_inline(UsjElement::new("char", m));
                    }
                    m => builder.open_para(m),
                }
            }
        }
    }

    builder.finish()
}

fn is_marker_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'-'
}

/// 词法切分：标记与文本交替出现
///
/// 开始标记后紧跟的一个空白字符属于标记本身。
fn tokenize(source: &str) -> Vec<Token<'_>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut text_start = 0;
    let mut text_line = 1;
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => {
                if text_start < pos {
                    tokens.push(Token::Text {
                        text: &source[text_start..pos],
                        line: text_line,
                    });
                }

                let marker_line = line;
                let name_start = pos + 1;
                let mut end = name_start;
                while end < bytes.len() && is_marker_byte(bytes[end]) {
                    end += 1;
                }
                let name = &source[name_start..end];

                let closing = end < bytes.len() && bytes[end] == b'*';
                if closing {
                    end += 1;
                } else if end < bytes.len() && bytes[end].is_ascii_whitespace() {
                    if bytes[end] == b'\n' {
                        line += 1;
                    }
                    end += 1;
                }

                tokens.push(Token::Marker {
                    name,
                    closing,
                    line: marker_line,
                });
                pos = end;
                text_start = end;
                text_line = line;
            }
            b'\n' => {
                line += 1;
                pos += 1;
            }
            _ => pos += 1,
        }
    }

    if text_start < bytes.len() {
        tokens.push(Token::Text {
            text: &source[text_start..],
            line: text_line,
        });
    }

    tokens
}

/// 取出标记后的第一个词，剩余文本留在原位置
fn take_word<'a>(tokens: &mut [Token<'a>], index: usize) -> Option<&'a str> {
    let Some(Token::Text { text, line }) = tokens.get(index + 1).copied() else {
        return None;
    };

    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return None;
    }

    let split = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let (word, rest) = trimmed.split_at(split);
    let rest = rest.strip_prefix(char::is_whitespace).unwrap_or(rest);
    tokens[index + 1] = Token::Text { text: rest, line };

    Some(word)
}

/// 取出标记后的整段文本
fn take_text<'a>(tokens: &mut [Token<'a>], index: usize) -> &'a str {
    match tokens.get(index + 1).copied() {
        Some(Token::Text { text, line }) => {
            tokens[index + 1] = Token::Text { text: "", line };
            text
        }
        _ => "",
    }
}

/// 连续空白折叠为单个空格
fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(ch);
            last_space = false;
        }
    }

    out
}

#[derive(Default)]
struct UsjBuilder {
    content: Vec<UsjContent>,
    book_code: Option<String>,
    chapter: Option<String>,
    para: Option<UsjElement>,
    /// 未闭合的字符样式/脚注，栈顶为最内层
    inline: Vec<UsjElement>,
}

impl UsjBuilder {
    fn in_note(&self) -> bool {
        self.inline.iter().any(|e| e.kind == "note")
    }

    fn container(&mut self) -> Option<&mut UsjElement> {
        match self.inline.last_mut() {
            Some(top) => Some(top),
            None => self.para.as_mut(),
        }
    }

    fn attach(&mut self, element: UsjElement) {
        match self.container() {
            Some(parent) => parent.push_element(element),
            None => self.content.push(UsjContent::Element(element)),
        }
    }

    fn push_text(&mut self, text: &str) {
        let normalized = normalize_whitespace(text);
        if normalized.is_empty() {
            return;
        }

        let whitespace_only = normalized.trim().is_empty();
        match self.container() {
            Some(parent) if whitespace_only && parent.content.is_empty() => {}
            Some(parent) => parent.push_text(normalized),
            None if whitespace_only => {}
            None => tracing::debug!(text = %normalized, "Dropping text outside any paragraph"),
        }
    }

    fn close_inline(&mut self) {
        while let Some(element) = self.inline.pop() {
            let element = finish_inline(element);
            self.attach(element);
        }
    }

    fn close_marker(&mut self, name: &str) {
        let marker = name.trim_start_matches('+');
        if marker.is_empty() {
            return;
        }

        if let Some(position) = self.inline.iter().rposition(|e| e.marker() == marker) {
            while self.inline.len() > position {
                if let Some(element) = self.inline.pop() {
                    let element = finish_inline(element);
                    self.attach(element);
                }
            }
        }
    }

    fn close_para(&mut self) {
        self.close_inline();
        if let Some(mut para) = self.para.take() {
            trim_trailing_text(&mut para);
            self.content.push(UsjContent::Element(para));
        }
    }

    fn open_para(&mut self, marker: &str) {
        self.close_para();
        self.para = Some(UsjElement::new("para", marker));
    }

    fn open_inline(&mut self, element: UsjElement) {
        self.inline.push(element);
    }

    fn open_note(&mut self, marker: &str, caller: Option<&str>) {
        let mut note = UsjElement::new("note", marker);
        note.caller = caller.map(str::to_string);
        self.inline.push(note);
    }

    fn open_book(&mut self, code: &str, rest: &str) {
        self.close_para();
        let code = code.to_uppercase();

        let mut book = UsjElement::new("book", "id");
        book.code = Some(code.clone());
        let title = normalize_whitespace(rest.trim());
        if !title.is_empty() {
            book.push_text(title);
        }

        self.book_code = Some(code);
        self.content.push(UsjContent::Element(book));
    }

    fn open_chapter(&mut self, number: &str) {
        self.close_para();

        let mut chapter = UsjElement::new("chapter", "c");
        chapter.number = Some(number.to_string());
        chapter.sid = self
            .book_code
            .as_ref()
            .map(|code| format!("{} {}", code, number));

        self.chapter = Some(number.to_string());
        self.content.push(UsjContent::Element(chapter));
    }

    fn open_verse(&mut self, number: &str) {
        self.close_inline();

        let mut verse = UsjElement::new("verse", "v");
        verse.number = Some(number.to_string());
        verse.sid = match (&self.book_code, &self.chapter) {
            (Some(code), Some(chapter)) => Some(format!("{} {}:{}", code, chapter, number)),
            _ => None,
        };

        self.para
            .get_or_insert_with(|| UsjElement::new("para", "p"))
            .push_element(verse);
    }

    fn finish(mut self) -> Result<UsjDocument, ScriptureError> {
        self.close_para();
        if self.book_code.is_none() {
            return Err(ScriptureError::MissingBookCode);
        }
        Ok(UsjDocument::new(self.content))
    }
}

/// 字符样式闭合时去掉 `|` 之后的属性
fn finish_inline(mut element: UsjElement) -> UsjElement {
    if element.kind == "char" {
        if let Some(UsjContent::Text(text)) = element.content.last_mut() {
            if let Some(bar) = text.find('|') {
                text.truncate(bar);
            }
        }
    }
    element
}

fn trim_trailing_text(para: &mut UsjElement) {
    if let Some(UsjContent::Text(text)) = para.content.last_mut() {
        let len = text.trim_end().len();
        text.truncate(len);
        if text.is_empty() {
            para.content.pop();
        }
    }
}
