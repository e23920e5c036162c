//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod bible_handlers;
mod ingestion;
mod resource_handlers;

pub use bible_handlers::*;
pub use ingestion::UploadPolicy;
pub use resource_handlers::*;
