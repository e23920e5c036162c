//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作

mod bible_queries;
mod resource_queries;

pub mod handlers;

pub use bible_queries::*;
pub use resource_queries::*;
