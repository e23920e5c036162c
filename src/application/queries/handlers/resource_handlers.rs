//! Resource Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{ResourceRecord, ResourceRepositoryPort};
use crate::application::queries::ListResources;

/// ListResources Handler
pub struct ListResourcesHandler {
    resources: Arc<dyn ResourceRepositoryPort>,
}

impl ListResourcesHandler {
    pub fn new(resources: Arc<dyn ResourceRepositoryPort>) -> Self {
        Self { resources }
    }

    pub async fn handle(&self, _query: ListResources) -> Result<Vec<ResourceRecord>, ApplicationError> {
        Ok(self.resources.find_all().await?)
    }
}
