//! 书卷导入的公共步骤
//!
//! 上传与更新共用：文件检查 -> USFM 解析 -> 结构转换 -> 经节分解。

use crate::application::error::ApplicationError;
use crate::domain::scripture::{
    book_code, count_chapters, decompose, parse_usfm, ScriptureError, StructuralNode, UsjDocument,
    Verse,
};

/// 上传文件限制
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_size_bytes: usize,
    /// 小写，不带点
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size_bytes: 10 * 1024 * 1024,
            allowed_extensions: vec!["usfm".to_string(), "sfm".to_string()],
        }
    }
}

impl UploadPolicy {
    /// 检查上传文件并解码为文本
    pub fn validate(&self, filename: &str, content: &[u8]) -> Result<String, ApplicationError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !self.allowed_extensions.iter().any(|e| *e == extension) {
            return Err(ApplicationError::validation(format!(
                "Unsupported file type '{}', allowed: {}",
                filename,
                self.allowed_extensions.join(", ")
            )));
        }

        if content.is_empty() {
            return Err(ApplicationError::validation("Uploaded file is empty"));
        }

        if content.len() > self.max_size_bytes {
            return Err(ApplicationError::validation(format!(
                "File too large: {} bytes (max {})",
                content.len(),
                self.max_size_bytes
            )));
        }

        let text = std::str::from_utf8(content)
            .map_err(|e| ApplicationError::validation(format!("File is not valid UTF-8: {}", e)))?;
        let text = text.trim_start_matches('\u{feff}');

        if text.contains('\0') {
            return Err(ApplicationError::validation("File contains NUL bytes"));
        }

        if text.trim().is_empty() {
            return Err(ApplicationError::validation("Uploaded file is empty"));
        }

        if !text.contains("\\id") {
            return Err(ApplicationError::validation("Missing \\id marker in USFM file"));
        }

        Ok(text.to_string())
    }
}

/// 解析并分解完毕、等待写入的书卷
#[derive(Debug, Clone)]
pub(crate) struct PreparedBook {
    pub code: String,
    pub usj: UsjDocument,
    pub chapters: u32,
    pub verses: Vec<Verse>,
}

pub(crate) fn prepare_book(usfm: &str) -> Result<PreparedBook, ApplicationError> {
    let usj = parse_usfm(usfm)?;
    let nodes = StructuralNode::from_usj(&usj)?;

    let code = book_code(&nodes)
        .ok_or(ScriptureError::MissingBookCode)?
        .to_string();

    let chapters = count_chapters(&nodes) as u32;
    if chapters == 0 {
        return Err(ScriptureError::NoChapters.into());
    }

    let verses = decompose(&nodes)?;

    Ok(PreparedBook {
        code,
        usj,
        chapters,
        verses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\\id RUT\n\\c 1\n\\p\n\\v 1 In the days\n\\v 2 The name\n\\c 2\n\\p\n\\v 1 Now Naomi\n";

    #[test]
    fn test_validate_accepts_usfm() {
        let policy = UploadPolicy::default();
        let text = policy.validate("ruth.USFM", SAMPLE.as_bytes()).unwrap();
        assert_eq!(text, SAMPLE);
    }

    #[test]
    fn test_validate_strips_bom() {
        let policy = UploadPolicy::default();
        let with_bom = format!("\u{feff}{}", SAMPLE);
        let text = policy.validate("ruth.sfm", with_bom.as_bytes()).unwrap();
        assert!(text.starts_with("\\id"));
    }

    #[test]
    fn test_validate_rejections() {
        let policy = UploadPolicy {
            max_size_bytes: 64,
            ..UploadPolicy::default()
        };

        let too_big = vec![b'a'; 65];
        let cases: Vec<(&str, &[u8])> = vec![
            ("ruth.txt", SAMPLE.as_bytes()),
            ("ruth", SAMPLE.as_bytes()),
            ("ruth.usfm", &b""[..]),
            ("ruth.usfm", &[0xff, 0xfe, 0x00][..]),
            ("ruth.usfm", &b"\\id RUT\0"[..]),
            ("ruth.usfm", &b"\\c 1 no id here"[..]),
            ("ruth.usfm", &too_big[..]),
        ];

        for (name, bytes) in cases {
            let result = policy.validate(name, bytes);
            assert!(
                matches!(result, Err(ApplicationError::ValidationError(_))),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_prepare_book() {
        let prepared = prepare_book(SAMPLE).unwrap();
        assert_eq!(prepared.code, "RUT");
        assert_eq!(prepared.chapters, 2);
        assert_eq!(prepared.verses.len(), 3);
        assert_eq!(prepared.verses[2], Verse::new(2, 1, "Now Naomi"));
    }

    #[test]
    fn test_prepare_book_without_chapters() {
        let err = prepare_book("\\id RUT\n\\p intro only\n").unwrap_err();
        assert!(matches!(err, ApplicationError::Unprocessable(_)));
    }

    #[test]
    fn test_prepare_book_verse_before_chapter() {
        let err = prepare_book("\\id RUT\n\\p\n\\v 1 orphan\n\\c 1\n").unwrap_err();
        assert!(matches!(err, ApplicationError::Unprocessable(_)));
    }
}
