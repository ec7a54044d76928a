//! OpenNebula backend
//!
//! The operation contract is wired up but none of the OpenNebula mappings
//! (attributes, state and action derivation, link parsing) exist yet, so
//! every operation reports `NotImplemented` and callers can detect the
//! partial provider support.

use async_trait::async_trait;
use std::sync::Arc;

use crate::backends::{BackendInstances, ComputeBackend, ResourceBackend, TemplateBackend};
use crate::config::ProviderType;
use crate::errors::{BackendError, Result};
use crate::occi::{ActionInstance, Attributes, Collection, Kind, Link, Mixin, Mixins, Resource, Resources};

const PROVIDER: &str = "opennebula";

/// Adapter set for OpenNebula
pub fn instances() -> BackendInstances {
    BackendInstances {
        provider: ProviderType::Opennebula,
        compute: Arc::new(OpennebulaBackend::new(Kind::Compute)),
        network: Arc::new(OpennebulaBackend::new(Kind::Network)),
        storage: Arc::new(OpennebulaBackend::new(Kind::Storage)),
        templates: Arc::new(OpennebulaTemplates),
    }
}

/// OpenNebula adapter for one resource kind
pub struct OpennebulaBackend {
    kind: Kind,
}

impl OpennebulaBackend {
    pub fn new(kind: Kind) -> Self {
        Self { kind }
    }

    fn stub<T>(&self, operation: &str) -> Result<T> {
        Err(BackendError::not_implemented(
            PROVIDER,
            &format!("{}_{}", self.kind, operation),
        ))
    }
}

#[async_trait]
impl ResourceBackend for OpennebulaBackend {
    fn kind(&self) -> Kind {
        self.kind
    }

    async fn list_ids(&self, _mixins: Option<&Mixins>) -> Result<Vec<String>> {
        self.stub("list_ids")
    }

    async fn list(&self, _mixins: Option<&Mixins>) -> Result<Resources> {
        self.stub("list")
    }

    async fn get(&self, _id: &str) -> Result<Option<Resource>> {
        self.stub("get")
    }

    async fn create(&self, _resource: Resource) -> Result<String> {
        self.stub("create")
    }

    async fn update(&self, _resource: Resource) -> Result<bool> {
        self.stub("update")
    }

    async fn partial_update(
        &self,
        _id: &str,
        _attributes: Attributes,
        _mixins: Mixins,
        _links: Vec<Link>,
    ) -> Result<bool> {
        self.stub("partial_update")
    }

    async fn delete(&self, _id: &str) -> Result<bool> {
        self.stub("delete")
    }

    async fn delete_all(&self, _mixins: Option<&Mixins>) -> Result<bool> {
        self.stub("delete_all")
    }

    async fn trigger_action(&self, _id: &str, _action: &ActionInstance) -> Result<bool> {
        self.stub("trigger_action")
    }

    async fn trigger_action_on_all(
        &self,
        _action: &ActionInstance,
        _mixins: Option<&Mixins>,
    ) -> Result<bool> {
        self.stub("trigger_action_on_all")
    }

    async fn get_extensions(&self) -> Result<Collection> {
        self.stub("get_extensions")
    }
}

#[async_trait]
impl ComputeBackend for OpennebulaBackend {
    async fn attach_network(&self, _link: Link) -> Result<String> {
        self.stub("attach_network")
    }

    async fn attach_storage(&self, _link: Link) -> Result<String> {
        self.stub("attach_storage")
    }

    async fn detach_network(&self, _link_id: &str) -> Result<bool> {
        self.stub("detach_network")
    }

    async fn detach_storage(&self, _link_id: &str) -> Result<bool> {
        self.stub("detach_storage")
    }
}

/// OpenNebula template listings
pub struct OpennebulaTemplates;

#[async_trait]
impl TemplateBackend for OpennebulaTemplates {
    async fn os_tpl_list(&self) -> Result<Mixins> {
        Err(BackendError::not_implemented(PROVIDER, "os_tpl_list"))
    }

    async fn os_tpl_get(&self, _term: &str) -> Result<Option<Mixin>> {
        Err(BackendError::not_implemented(PROVIDER, "os_tpl_get"))
    }

    async fn resource_tpl_list(&self) -> Result<Mixins> {
        Err(BackendError::not_implemented(PROVIDER, "resource_tpl_list"))
    }

    async fn resource_tpl_get(&self, _term: &str) -> Result<Option<Mixin>> {
        Err(BackendError::not_implemented(PROVIDER, "resource_tpl_get"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occi::LinkKind;

    fn assert_stub<T: std::fmt::Debug>(result: Result<T>, operation: &str) {
        match result {
            Err(BackendError::NotImplemented(msg)) => assert!(msg.contains(operation), "{msg}"),
            other => panic!("expected NotImplemented for {operation}, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_compute_operations_are_unimplemented() {
        let compute = OpennebulaBackend::new(Kind::Compute);
        let action = ActionInstance::infrastructure(Kind::Compute, "start");

        assert_stub(compute.list_ids(None).await, "compute_list_ids");
        assert_stub(compute.list(None).await, "compute_list");
        assert_stub(compute.get("1").await, "compute_get");
        assert_stub(compute.create(Resource::new(Kind::Compute)).await, "compute_create");
        assert_stub(compute.update(Resource::new(Kind::Compute)).await, "compute_update");
        assert_stub(compute.delete("1").await, "compute_delete");
        assert_stub(compute.delete_all(None).await, "compute_delete_all");
        assert_stub(compute.trigger_action("1", &action).await, "compute_trigger_action");
        assert_stub(
            compute.attach_network(Link::new(LinkKind::NetworkInterface, "1", "2")).await,
            "compute_attach_network",
        );
        assert_stub(compute.detach_storage("l").await, "compute_detach_storage");
    }

    #[tokio::test]
    async fn test_templates_are_unimplemented() {
        assert_stub(OpennebulaTemplates.os_tpl_list().await, "os_tpl_list");
        assert_stub(OpennebulaTemplates.resource_tpl_get("small").await, "resource_tpl_get");
    }
}
