//! Scripture Context - 经文限界上下文
//!
//! 职责:
//! - USFM 解析为 USJ 文档
//! - USJ 转换为结构节点
//! - 结构节点分解为扁平经节
//! - 正典书卷表

mod canon;
mod decomposer;
mod entities;
mod errors;
mod node;
mod usfm;
mod usj;

pub use canon::CANON;
pub use decomposer::{count_chapters, decompose, expand_verse_numbers};
pub use entities::Verse;
pub use errors::ScriptureError;
pub use node::{book_code, ParagraphItem, StructuralNode};
pub use usfm::parse_usfm;
pub use usj::{UsjContent, UsjDocument, UsjElement, USJ_VERSION};
