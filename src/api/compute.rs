//! Compute operations, including network interface and storage link
//! management

use tracing::instrument;

use super::{expect_link, required_link_id, BackendApi};
use crate::errors::Result;
use crate::occi::{Attributes, Collection, Entity, Link, LinkKind, Mixins, Resource, Resources};

impl BackendApi {
    /// Identifiers of all compute instances, no duplicates
    #[instrument(skip(self))]
    pub async fn compute_list_ids(&self, mixins: Option<&Mixins>) -> Result<Vec<String>> {
        self.list_ids_of(&*self.instances.compute, mixins).await
    }

    #[instrument(skip(self))]
    pub async fn compute_list(&self, mixins: Option<&Mixins>) -> Result<Resources> {
        self.list_of(&*self.instances.compute, mixins).await
    }

    /// A compute instance, `None` when the identifier is unknown
    #[instrument(skip(self))]
    pub async fn compute_get(&self, compute_id: Option<&str>) -> Result<Option<Resource>> {
        self.get_of(&*self.instances.compute, compute_id).await
    }

    /// Instantiate a compute resource; the id it carries may be replaced
    #[instrument(skip(self))]
    pub async fn compute_create(&self, compute: Option<Entity>) -> Result<String> {
        self.create_in(&*self.instances.compute, compute).await
    }

    #[instrument(skip(self))]
    pub async fn compute_update(&self, compute: Option<Entity>) -> Result<bool> {
        self.update_in(&*self.instances.compute, compute).await
    }

    /// Merge attributes, add mixins and links to an existing instance
    #[instrument(skip(self))]
    pub async fn compute_partial_update(
        &self,
        compute_id: Option<&str>,
        attributes: Option<Attributes>,
        mixins: Option<Mixins>,
        links: Option<Vec<Link>>,
    ) -> Result<bool> {
        self.partial_update_in(&*self.instances.compute, compute_id, attributes, mixins, links)
            .await
    }

    #[instrument(skip(self))]
    pub async fn compute_delete(&self, compute_id: Option<&str>) -> Result<bool> {
        self.delete_in(&*self.instances.compute, compute_id).await
    }

    #[instrument(skip(self))]
    pub async fn compute_delete_all(&self, mixins: Option<&Mixins>) -> Result<bool> {
        self.delete_all_in(&*self.instances.compute, mixins).await
    }

    #[instrument(skip(self))]
    pub async fn compute_trigger_action(
        &self,
        compute_id: Option<&str>,
        action_instance: Option<Entity>,
    ) -> Result<bool> {
        self.trigger_action_in(&*self.instances.compute, compute_id, action_instance)
            .await
    }

    #[instrument(skip(self))]
    pub async fn compute_trigger_action_on_all(
        &self,
        action_instance: Option<Entity>,
        mixins: Option<&Mixins>,
    ) -> Result<bool> {
        self.trigger_action_on_all_in(&*self.instances.compute, action_instance, mixins)
            .await
    }

    #[instrument(skip(self))]
    pub async fn compute_get_extensions(&self) -> Result<Collection> {
        self.extensions_of(&*self.instances.compute).await
    }

    /// Connect a compute instance to a network, returns the interface id
    #[instrument(skip(self))]
    pub async fn compute_attach_network(&self, networkinterface: Option<Entity>) -> Result<String> {
        let result = async {
            let link = expect_link(LinkKind::NetworkInterface, networkinterface)?;
            self.instances.compute.attach_network(link).await
        }
        .await;
        self.record("compute", "attach_network", result)
    }

    /// Attach a storage device to a compute instance, returns the link id
    #[instrument(skip(self))]
    pub async fn compute_attach_storage(&self, storagelink: Option<Entity>) -> Result<String> {
        let result = async {
            let link = expect_link(LinkKind::StorageLink, storagelink)?;
            self.instances.compute.attach_storage(link).await
        }
        .await;
        self.record("compute", "attach_storage", result)
    }

    #[instrument(skip(self))]
    pub async fn compute_detach_network(&self, networkinterface_id: Option<&str>) -> Result<bool> {
        let result = async {
            let id = required_link_id(networkinterface_id)?;
            self.instances.compute.detach_network(id).await
        }
        .await;
        self.record("compute", "detach_network", result)
    }

    #[instrument(skip(self))]
    pub async fn compute_detach_storage(&self, storagelink_id: Option<&str>) -> Result<bool> {
        let result = async {
            let id = required_link_id(storagelink_id)?;
            self.instances.compute.detach_storage(id).await
        }
        .await;
        self.record("compute", "detach_storage", result)
    }
}
