//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作

mod bible_commands;
mod resource_commands;

pub mod handlers;

pub use bible_commands::*;
pub use resource_commands::*;
