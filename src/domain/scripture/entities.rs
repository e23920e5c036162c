//! Scripture Context - Entities

use serde::{Deserialize, Serialize};

/// 分解后的单个经节
///
/// 区间标记展开后的多个经节共享同一段文本。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    chapter: u32,
    verse: u32,
    text: String,
}

impl Verse {
    pub fn new(chapter: u32, verse: u32, text: impl Into<String>) -> Self {
        Self {
            chapter,
            verse,
            text: text.into(),
        }
    }

    pub fn chapter(&self) -> u32 {
        self.chapter
    }

    pub fn verse(&self) -> u32 {
        self.verse
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
