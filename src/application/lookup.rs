//! 命令与查询共用的查找步骤

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    BookLookupPort, BookRecord, ContentType, ResourceRecord, ResourceRepositoryPort,
};

/// 资源必须存在且类型为 bible
pub(crate) async fn ensure_bible_resource(
    resources: &Arc<dyn ResourceRepositoryPort>,
    resource_id: i64,
) -> Result<ResourceRecord, ApplicationError> {
    let resource = resources
        .find_by_id(resource_id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Resource", resource_id))?;

    if resource.content_type != ContentType::Bible {
        return Err(ApplicationError::validation(format!(
            "Resource {} is not of type 'bible' (found '{}')",
            resource_id,
            resource.content_type.as_str()
        )));
    }

    Ok(resource)
}

/// 按代码查找书卷，不存在时返回 NotFound
pub(crate) async fn resolve_book(
    books: &Arc<dyn BookLookupPort>,
    code: &str,
) -> Result<BookRecord, ApplicationError> {
    books
        .resolve(code)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Book", code))
}
