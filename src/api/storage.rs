//! Storage operations

use tracing::instrument;

use super::BackendApi;
use crate::errors::Result;
use crate::occi::{Attributes, Collection, Entity, Link, Mixins, Resource, Resources};

impl BackendApi {
    /// Identifiers of all storage instances, no duplicates
    #[instrument(skip(self))]
    pub async fn storage_list_ids(&self, mixins: Option<&Mixins>) -> Result<Vec<String>> {
        self.list_ids_of(&*self.instances.storage, mixins).await
    }

    #[instrument(skip(self))]
    pub async fn storage_list(&self, mixins: Option<&Mixins>) -> Result<Resources> {
        self.list_of(&*self.instances.storage, mixins).await
    }

    #[instrument(skip(self))]
    pub async fn storage_get(&self, storage_id: Option<&str>) -> Result<Option<Resource>> {
        self.get_of(&*self.instances.storage, storage_id).await
    }

    /// Instantiate a storage device; `occi.storage.size` is required
    #[instrument(skip(self))]
    pub async fn storage_create(&self, storage: Option<Entity>) -> Result<String> {
        self.create_in(&*self.instances.storage, storage).await
    }

    #[instrument(skip(self))]
    pub async fn storage_update(&self, storage: Option<Entity>) -> Result<bool> {
        self.update_in(&*self.instances.storage, storage).await
    }

    #[instrument(skip(self))]
    pub async fn storage_partial_update(
        &self,
        storage_id: Option<&str>,
        attributes: Option<Attributes>,
        mixins: Option<Mixins>,
        links: Option<Vec<Link>>,
    ) -> Result<bool> {
        self.partial_update_in(&*self.instances.storage, storage_id, attributes, mixins, links)
            .await
    }

    #[instrument(skip(self))]
    pub async fn storage_delete(&self, storage_id: Option<&str>) -> Result<bool> {
        self.delete_in(&*self.instances.storage, storage_id).await
    }

    #[instrument(skip(self))]
    pub async fn storage_delete_all(&self, mixins: Option<&Mixins>) -> Result<bool> {
        self.delete_all_in(&*self.instances.storage, mixins).await
    }

    #[instrument(skip(self))]
    pub async fn storage_trigger_action(
        &self,
        storage_id: Option<&str>,
        action_instance: Option<Entity>,
    ) -> Result<bool> {
        self.trigger_action_in(&*self.instances.storage, storage_id, action_instance)
            .await
    }

    #[instrument(skip(self))]
    pub async fn storage_trigger_action_on_all(
        &self,
        action_instance: Option<Entity>,
        mixins: Option<&Mixins>,
    ) -> Result<bool> {
        self.trigger_action_on_all_in(&*self.instances.storage, action_instance, mixins)
            .await
    }

    #[instrument(skip(self))]
    pub async fn storage_get_extensions(&self) -> Result<Collection> {
        self.extensions_of(&*self.instances.storage).await
    }
}
