//! Network operations

use tracing::instrument;

use super::BackendApi;
use crate::errors::Result;
use crate::occi::{Attributes, Collection, Entity, Link, Mixins, Resource, Resources};

impl BackendApi {
    /// Identifiers of all network instances, no duplicates
    #[instrument(skip(self))]
    pub async fn network_list_ids(&self, mixins: Option<&Mixins>) -> Result<Vec<String>> {
        self.list_ids_of(&*self.instances.network, mixins).await
    }

    #[instrument(skip(self))]
    pub async fn network_list(&self, mixins: Option<&Mixins>) -> Result<Resources> {
        self.list_of(&*self.instances.network, mixins).await
    }

    #[instrument(skip(self))]
    pub async fn network_get(&self, network_id: Option<&str>) -> Result<Option<Resource>> {
        self.get_of(&*self.instances.network, network_id).await
    }

    #[instrument(skip(self))]
    pub async fn network_create(&self, network: Option<Entity>) -> Result<String> {
        self.create_in(&*self.instances.network, network).await
    }

    #[instrument(skip(self))]
    pub async fn network_update(&self, network: Option<Entity>) -> Result<bool> {
        self.update_in(&*self.instances.network, network).await
    }

    /// Links are rejected: networks do not own any
    #[instrument(skip(self))]
    pub async fn network_partial_update(
        &self,
        network_id: Option<&str>,
        attributes: Option<Attributes>,
        mixins: Option<Mixins>,
        links: Option<Vec<Link>>,
    ) -> Result<bool> {
        self.partial_update_in(&*self.instances.network, network_id, attributes, mixins, links)
            .await
    }

    #[instrument(skip(self))]
    pub async fn network_delete(&self, network_id: Option<&str>) -> Result<bool> {
        self.delete_in(&*self.instances.network, network_id).await
    }

    #[instrument(skip(self))]
    pub async fn network_delete_all(&self, mixins: Option<&Mixins>) -> Result<bool> {
        self.delete_all_in(&*self.instances.network, mixins).await
    }

    #[instrument(skip(self))]
    pub async fn network_trigger_action(
        &self,
        network_id: Option<&str>,
        action_instance: Option<Entity>,
    ) -> Result<bool> {
        self.trigger_action_in(&*self.instances.network, network_id, action_instance)
            .await
    }

    #[instrument(skip(self))]
    pub async fn network_trigger_action_on_all(
        &self,
        action_instance: Option<Entity>,
        mixins: Option<&Mixins>,
    ) -> Result<bool> {
        self.trigger_action_on_all_in(&*self.instances.network, action_instance, mixins)
            .await
    }

    #[instrument(skip(self))]
    pub async fn network_get_extensions(&self) -> Result<Collection> {
        self.extensions_of(&*self.instances.network).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{calls, counting_api};
    use super::*;
    use crate::errors::BackendError;
    use crate::occi::{ActionInstance, Kind, LinkKind};

    #[tokio::test]
    async fn test_partial_update_rejects_links() {
        let (api, [_, network, _]) = counting_api();
        let links = vec![Link::new(LinkKind::NetworkInterface, "vm-1", "net-1")];

        assert!(matches!(
            api.network_partial_update(Some("net-1"), None, None, Some(links)).await,
            Err(BackendError::TypeMismatch(_))
        ));
        assert_eq!(calls(&network), 0);

        assert!(api
            .network_partial_update(Some("net-1"), None, None, Some(Vec::new()))
            .await
            .unwrap());
        assert_eq!(calls(&network), 1);
    }

    #[tokio::test]
    async fn test_mandatory_arguments() {
        let (api, [_, network, _]) = counting_api();
        let action = Entity::Action(ActionInstance::infrastructure(Kind::Network, "up"));

        assert!(matches!(api.network_get(Some("")).await, Err(BackendError::Argument(_))));
        assert!(matches!(
            api.network_trigger_action(None, Some(action)).await,
            Err(BackendError::Argument(_))
        ));
        assert!(matches!(
            api.network_trigger_action_on_all(None, None).await,
            Err(BackendError::Argument(_))
        ));
        assert!(matches!(
            api.network_create(Some(Entity::Resource(Resource::new(Kind::Storage)))).await,
            Err(BackendError::TypeMismatch(_))
        ));
        assert_eq!(calls(&network), 0);
    }

    #[tokio::test]
    async fn test_reads_pass_through() {
        let (api, [_, network, _]) = counting_api();

        assert!(api.network_list_ids(None).await.unwrap().is_empty());
        assert!(api.network_list(None).await.unwrap().is_empty());
        assert!(api.network_get(Some("net-1")).await.unwrap().is_none());
        assert!(api.network_get_extensions().await.unwrap().is_empty());
        assert_eq!(calls(&network), 4);
    }
}
