//! Scripture Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptureError {
    /// 文档结构不一致（例如在任何章节之前出现经节标记）
    #[error("结构不一致: {0}")]
    StructuralInconsistency(String),

    #[error("无效的章节号: {0}")]
    InvalidChapterNumber(String),

    #[error("无效的经节号: {0}")]
    InvalidVerseNumber(String),

    #[error("缺少书卷代码 (\\id)")]
    MissingBookCode,

    #[error("文档中没有任何章节 (\\c)")]
    NoChapters,

    #[error("无效的 USJ 文档: {0}")]
    InvalidUsj(String),

    #[error("USFM 语法错误 (第 {line} 行): {message}")]
    Usfm { line: usize, message: String },
}
