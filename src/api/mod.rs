//! Backend façade
//!
//! Entry points for the request layer. Arguments arrive as already parsed
//! OCCI entities and are checked before anything is dispatched: absent or
//! blank arguments fail with `Argument`, entities of the wrong kind with
//! `TypeMismatch`. Adapter results and errors are passed through unchanged.

mod compute;
mod network;
mod storage;
mod templates;

use tracing::{debug, warn};

use crate::backends::{BackendInstances, ResourceBackend};
use crate::config::ProviderType;
use crate::errors::{BackendError, Result};
use crate::metrics::BACKEND_OPERATIONS;
use crate::occi::{ActionInstance, Attributes, Collection, Entity, Kind, Link, LinkKind, Mixins, Resource, Resources};

/// Dispatches validated calls to the active adapter set
#[derive(Clone)]
pub struct BackendApi {
    instances: BackendInstances,
}

impl BackendApi {
    pub fn new(instances: BackendInstances) -> Self {
        Self { instances }
    }

    pub fn provider(&self) -> ProviderType {
        self.instances.provider
    }

    /// Count and log the outcome of one dispatched operation
    fn record<T>(&self, kind: &str, operation: &str, result: Result<T>) -> Result<T> {
        let provider = self.instances.provider.name();
        let status = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        BACKEND_OPERATIONS
            .with_label_values(&[provider, kind, operation, status])
            .inc();

        match &result {
            Ok(_) => debug!(provider, kind, operation, "Backend operation completed"),
            Err(e) => warn!(provider, kind, operation, error = %e, "Backend operation failed"),
        }
        result
    }

    async fn list_ids_of<B: ResourceBackend + ?Sized>(
        &self,
        backend: &B,
        mixins: Option<&Mixins>,
    ) -> Result<Vec<String>> {
        let result = backend.list_ids(mixins).await;
        self.record(backend.kind().term(), "list_ids", result)
    }

    async fn list_of<B: ResourceBackend + ?Sized>(
        &self,
        backend: &B,
        mixins: Option<&Mixins>,
    ) -> Result<Resources> {
        let result = backend.list(mixins).await;
        self.record(backend.kind().term(), "list", result)
    }

    async fn get_of<B: ResourceBackend + ?Sized>(
        &self,
        backend: &B,
        id: Option<&str>,
    ) -> Result<Option<Resource>> {
        let result = async {
            let id = required_id(backend.kind(), id)?;
            backend.get(id).await
        }
        .await;
        self.record(backend.kind().term(), "get", result)
    }

    async fn create_in<B: ResourceBackend + ?Sized>(
        &self,
        backend: &B,
        entity: Option<Entity>,
    ) -> Result<String> {
        let result = async {
            let resource = expect_resource(backend.kind(), entity)?;
            backend.create(resource).await
        }
        .await;
        self.record(backend.kind().term(), "create", result)
    }

    async fn update_in<B: ResourceBackend + ?Sized>(
        &self,
        backend: &B,
        entity: Option<Entity>,
    ) -> Result<bool> {
        let result = async {
            let resource = expect_resource(backend.kind(), entity)?;
            required_id(backend.kind(), Some(&resource.id))?;
            backend.update(resource).await
        }
        .await;
        self.record(backend.kind().term(), "update", result)
    }

    async fn partial_update_in<B: ResourceBackend + ?Sized>(
        &self,
        backend: &B,
        id: Option<&str>,
        attributes: Option<Attributes>,
        mixins: Option<Mixins>,
        links: Option<Vec<Link>>,
    ) -> Result<bool> {
        let kind = backend.kind();
        let result = async {
            let id = required_id(kind, id)?;
            let links = links.unwrap_or_default();
            if kind != Kind::Compute && !links.is_empty() {
                return Err(BackendError::TypeMismatch(format!(
                    "Links cannot be added to a {} instance!",
                    kind
                )));
            }
            backend
                .partial_update(
                    id,
                    attributes.unwrap_or_default(),
                    mixins.unwrap_or_default(),
                    links,
                )
                .await
        }
        .await;
        self.record(kind.term(), "partial_update", result)
    }

    async fn delete_in<B: ResourceBackend + ?Sized>(
        &self,
        backend: &B,
        id: Option<&str>,
    ) -> Result<bool> {
        let result = async {
            let id = required_id(backend.kind(), id)?;
            backend.delete(id).await
        }
        .await;
        self.record(backend.kind().term(), "delete", result)
    }

    async fn delete_all_in<B: ResourceBackend + ?Sized>(
        &self,
        backend: &B,
        mixins: Option<&Mixins>,
    ) -> Result<bool> {
        let result = backend.delete_all(mixins).await;
        self.record(backend.kind().term(), "delete_all", result)
    }

    async fn trigger_action_in<B: ResourceBackend + ?Sized>(
        &self,
        backend: &B,
        id: Option<&str>,
        action: Option<Entity>,
    ) -> Result<bool> {
        let result = async {
            let id = required_id(backend.kind(), id)?;
            let action = expect_action(action)?;
            backend.trigger_action(id, &action).await
        }
        .await;
        self.record(backend.kind().term(), "trigger_action", result)
    }

    async fn trigger_action_on_all_in<B: ResourceBackend + ?Sized>(
        &self,
        backend: &B,
        action: Option<Entity>,
        mixins: Option<&Mixins>,
    ) -> Result<bool> {
        let result = async {
            let action = expect_action(action)?;
            backend.trigger_action_on_all(&action, mixins).await
        }
        .await;
        self.record(backend.kind().term(), "trigger_action_on_all", result)
    }

    async fn extensions_of<B: ResourceBackend + ?Sized>(&self, backend: &B) -> Result<Collection> {
        let result = backend.get_extensions().await;
        self.record(backend.kind().term(), "get_extensions", result)
    }
}

fn mandatory(name: &str) -> BackendError {
    BackendError::Argument(format!("'{}' is a mandatory argument", name))
}

/// Present and non-blank identifier of a `kind` instance
fn required_id(kind: Kind, id: Option<&str>) -> Result<&str> {
    id.filter(|id| !id.trim().is_empty())
        .ok_or_else(|| mandatory(&format!("{}_id", kind)))
}

fn required_link_id(id: Option<&str>) -> Result<&str> {
    id.filter(|id| !id.trim().is_empty())
        .ok_or_else(|| mandatory("link_id"))
}

fn expect_resource(kind: Kind, entity: Option<Entity>) -> Result<Resource> {
    match entity.ok_or_else(|| mandatory(kind.term()))? {
        Entity::Resource(resource) if resource.kind == kind => Ok(resource),
        other => Err(BackendError::TypeMismatch(format!(
            "Action requires a {} instance, got a {}!",
            kind,
            other.describe()
        ))),
    }
}

fn expect_link(kind: LinkKind, entity: Option<Entity>) -> Result<Link> {
    match entity.ok_or_else(|| mandatory(kind.term()))? {
        Entity::Link(link) if link.kind == kind => Ok(link),
        other => Err(BackendError::TypeMismatch(format!(
            "Action requires a {} link, got a {}!",
            kind.term(),
            other.describe()
        ))),
    }
}

fn expect_action(entity: Option<Entity>) -> Result<ActionInstance> {
    match entity.ok_or_else(|| mandatory("action_instance"))? {
        Entity::Action(action) => Ok(action),
        other => Err(BackendError::TypeMismatch(format!(
            "Action requires an action instance, got a {}!",
            other.describe()
        ))),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::backends::{ComputeBackend, TemplateBackend};
    use crate::occi::Mixin;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Adapter that accepts everything and counts how often it was called
    pub(crate) struct CountingBackend {
        kind: Kind,
        pub(crate) calls: AtomicUsize,
    }

    impl CountingBackend {
        pub(crate) fn new(kind: Kind) -> Self {
            Self {
                kind,
                calls: AtomicUsize::new(0),
            }
        }

        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ResourceBackend for CountingBackend {
        fn kind(&self) -> Kind {
            self.kind
        }

        async fn list_ids(&self, _mixins: Option<&Mixins>) -> Result<Vec<String>> {
            self.hit();
            Ok(Vec::new())
        }

        async fn list(&self, _mixins: Option<&Mixins>) -> Result<Resources> {
            self.hit();
            Ok(Resources::new())
        }

        async fn get(&self, _id: &str) -> Result<Option<Resource>> {
            self.hit();
            Ok(None)
        }

        async fn create(&self, _resource: Resource) -> Result<String> {
            self.hit();
            Ok("created".to_string())
        }

        async fn update(&self, _resource: Resource) -> Result<bool> {
            self.hit();
            Ok(true)
        }

        async fn partial_update(
            &self,
            _id: &str,
            _attributes: Attributes,
            _mixins: Mixins,
            _links: Vec<Link>,
        ) -> Result<bool> {
            self.hit();
            Ok(true)
        }

        async fn delete(&self, _id: &str) -> Result<bool> {
            self.hit();
            Ok(true)
        }

        async fn delete_all(&self, _mixins: Option<&Mixins>) -> Result<bool> {
            self.hit();
            Ok(true)
        }

        async fn trigger_action(&self, _id: &str, _action: &ActionInstance) -> Result<bool> {
            self.hit();
            Ok(true)
        }

        async fn trigger_action_on_all(
            &self,
            _action: &ActionInstance,
            _mixins: Option<&Mixins>,
        ) -> Result<bool> {
            self.hit();
            Ok(true)
        }

        async fn get_extensions(&self) -> Result<Collection> {
            self.hit();
            Ok(Collection::default())
        }
    }

    #[async_trait]
    impl ComputeBackend for CountingBackend {
        async fn attach_network(&self, _link: Link) -> Result<String> {
            self.hit();
            Ok("link".to_string())
        }

        async fn attach_storage(&self, _link: Link) -> Result<String> {
            self.hit();
            Ok("link".to_string())
        }

        async fn detach_network(&self, _link_id: &str) -> Result<bool> {
            self.hit();
            Ok(true)
        }

        async fn detach_storage(&self, _link_id: &str) -> Result<bool> {
            self.hit();
            Ok(true)
        }
    }

    pub(crate) struct NoTemplates;

    #[async_trait]
    impl TemplateBackend for NoTemplates {
        async fn os_tpl_list(&self) -> Result<Mixins> {
            Ok(Mixins::new())
        }

        async fn os_tpl_get(&self, _term: &str) -> Result<Option<Mixin>> {
            Ok(None)
        }

        async fn resource_tpl_list(&self) -> Result<Mixins> {
            Ok(Mixins::new())
        }

        async fn resource_tpl_get(&self, _term: &str) -> Result<Option<Mixin>> {
            Ok(None)
        }
    }

    /// Façade over counting adapters; the handles report dispatched calls
    pub(crate) fn counting_api() -> (BackendApi, [Arc<CountingBackend>; 3]) {
        let compute = Arc::new(CountingBackend::new(Kind::Compute));
        let network = Arc::new(CountingBackend::new(Kind::Network));
        let storage = Arc::new(CountingBackend::new(Kind::Storage));
        let api = BackendApi::new(BackendInstances {
            provider: ProviderType::Opennebula,
            compute: compute.clone(),
            network: network.clone(),
            storage: storage.clone(),
            templates: Arc::new(NoTemplates),
        });
        (api, [compute, network, storage])
    }

    pub(crate) fn calls(backend: &CountingBackend) -> usize {
        backend.calls.load(Ordering::SeqCst)
    }

    #[test]
    fn test_required_id_rejects_blank() {
        assert!(matches!(required_id(Kind::Network, None), Err(BackendError::Argument(_))));
        assert!(matches!(required_id(Kind::Network, Some("  ")), Err(BackendError::Argument(_))));
        assert_eq!(required_id(Kind::Network, Some("net-1")).unwrap(), "net-1");

        match required_id(Kind::Storage, Some("")) {
            Err(e) => assert_eq!(e.to_string(), "Argument error: 'storage_id' is a mandatory argument"),
            Ok(_) => panic!("blank id accepted"),
        }
    }

    #[test]
    fn test_expect_resource_checks_kind() {
        let network = Entity::Resource(Resource::new(Kind::Network));
        assert!(matches!(
            expect_resource(Kind::Compute, Some(network.clone())),
            Err(BackendError::TypeMismatch(_))
        ));
        assert!(expect_resource(Kind::Network, Some(network)).is_ok());
        assert!(matches!(
            expect_resource(Kind::Network, None),
            Err(BackendError::Argument(_))
        ));
    }

    #[test]
    fn test_expect_action_rejects_resources() {
        let resource = Entity::Resource(Resource::new(Kind::Storage));
        assert!(matches!(expect_action(Some(resource)), Err(BackendError::TypeMismatch(_))));
        let action = Entity::Action(ActionInstance::infrastructure(Kind::Storage, "online"));
        assert_eq!(expect_action(Some(action)).unwrap().term(), "online");
    }

    #[tokio::test]
    async fn test_dispatch_is_counted() {
        let (api, [_, network, _]) = counting_api();
        let counter = BACKEND_OPERATIONS.with_label_values(&["opennebula", "network", "delete", "argument"]);
        let before = counter.get();

        assert!(api.network_delete(None).await.is_err());
        assert_eq!(counter.get(), before + 1);
        assert_eq!(calls(&network), 0);

        assert!(api.network_delete(Some("net-1")).await.unwrap());
        assert_eq!(calls(&network), 1);
    }
}
