//! Resource Command Handlers

use std::sync::Arc;

use crate::application::commands::CreateResource;
use crate::application::error::ApplicationError;
use crate::application::ports::{ContentType, ResourceRecord, ResourceRepositoryPort};

/// CreateResource Handler
pub struct CreateResourceHandler {
    resources: Arc<dyn ResourceRepositoryPort>,
}

impl CreateResourceHandler {
    pub fn new(resources: Arc<dyn ResourceRepositoryPort>) -> Self {
        Self { resources }
    }

    pub async fn handle(&self, command: CreateResource) -> Result<ResourceRecord, ApplicationError> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(ApplicationError::validation("Resource name cannot be empty"));
        }

        let content_type = ContentType::from_str(command.content_type.trim()).ok_or_else(|| {
            ApplicationError::validation(format!(
                "Unsupported content type: {}",
                command.content_type
            ))
        })?;

        let resource = self.resources.create(name, content_type).await?;

        tracing::info!(
            resource_id = resource.resource_id,
            name = %resource.name,
            content_type = content_type.as_str(),
            "Resource created"
        );

        Ok(resource)
    }
}
