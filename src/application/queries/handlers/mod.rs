//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod bible_handlers;
mod resource_handlers;

pub use bible_handlers::*;
pub use resource_handlers::*;
