//! Resource Commands

/// 创建内容容器
#[derive(Debug, Clone)]
pub struct CreateResource {
    pub name: String,
    pub content_type: String,
}
