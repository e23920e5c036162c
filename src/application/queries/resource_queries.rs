//! Resource Queries

/// 列出所有资源
#[derive(Debug, Clone)]
pub struct ListResources;
