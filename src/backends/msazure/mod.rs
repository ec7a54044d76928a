//! Azure Resource Manager backend
//!
//! Reads go to the live subscription through the management clients and
//! are translated by the parser. Nothing is written back to Azure, so every
//! mutation, action and link operation reports `NotImplemented`.

mod client;
mod models;
mod parse;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::backends::{BackendContext, BackendInstances, ComputeBackend, ResourceBackend, TemplateBackend};
use crate::config::ProviderType;
use crate::errors::{BackendError, Result};
use crate::fixtures::{FixtureKind, FixtureStore};
use crate::occi::{ActionInstance, Attributes, Collection, Kind, Link, Mixin, Mixins, Resource, Resources};

pub use client::{ArmClient, ManagementClients};

const PROVIDER: &str = "msazure";

/// Adapter set for ARM, backed by already authenticated clients
pub async fn instances(
    ctx: &BackendContext,
    clients: Arc<dyn ManagementClients>,
) -> Result<BackendInstances> {
    let store = ctx.fixture_store();
    store.read_all().await?;

    let templates = Arc::new(MsazureTemplates {
        clients: clients.clone(),
        store,
        scheme: ctx.backend_scheme(),
        location: ctx.options.location.clone(),
    });

    Ok(BackendInstances {
        provider: ProviderType::Msazure,
        compute: Arc::new(MsazureBackend::new(Kind::Compute, clients.clone(), templates.clone())),
        network: Arc::new(MsazureBackend::new(Kind::Network, clients.clone(), templates.clone())),
        storage: Arc::new(MsazureBackend::new(Kind::Storage, clients, templates.clone())),
        templates,
    })
}

/// ARM adapter for one resource kind
pub struct MsazureBackend {
    kind: Kind,
    clients: Arc<dyn ManagementClients>,
    templates: Arc<MsazureTemplates>,
}

impl MsazureBackend {
    pub fn new(kind: Kind, clients: Arc<dyn ManagementClients>, templates: Arc<MsazureTemplates>) -> Self {
        Self {
            kind,
            clients,
            templates,
        }
    }

    fn stub<T>(&self, operation: &str) -> Result<T> {
        Err(BackendError::not_implemented(
            PROVIDER,
            &format!("{}_{}", self.kind, operation),
        ))
    }

    async fn fetch(&self) -> Result<Resources> {
        let resources: Resources = match self.kind {
            Kind::Compute => {
                let resource_tpl = self.templates.resource_tpl_list().await?;
                self.clients
                    .list_virtual_machines()
                    .await?
                    .iter()
                    .map(|vm| parse::parse_compute(vm, &resource_tpl))
                    .collect()
            }
            Kind::Network => self
                .clients
                .list_virtual_networks()
                .await?
                .iter()
                .map(parse::parse_network)
                .collect(),
            Kind::Storage => self
                .clients
                .list_storage_accounts()
                .await?
                .iter()
                .map(parse::parse_storage)
                .collect(),
        };
        debug!(kind = %self.kind, count = resources.len(), "Fetched ARM resources");
        Ok(resources)
    }
}

#[async_trait]
impl ResourceBackend for MsazureBackend {
    fn kind(&self) -> Kind {
        self.kind
    }

    async fn list_ids(&self, mixins: Option<&Mixins>) -> Result<Vec<String>> {
        Ok(self.list(mixins).await?.ids())
    }

    async fn list(&self, mixins: Option<&Mixins>) -> Result<Resources> {
        Ok(self.fetch().await?.filter(mixins))
    }

    async fn get(&self, id: &str) -> Result<Option<Resource>> {
        let id = parse::strip_leading_separators(id);
        if id.is_empty() {
            return Err(BackendError::Retrieval(format!(
                "Malformed {} identifier!",
                self.kind
            )));
        }
        Ok(self.fetch().await?.get(&id).cloned())
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
        Ok(Collection::default())
    }
}

#[async_trait]
impl ComputeBackend for MsazureBackend {
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

/// OS templates from fixtures, resource templates from the VM sizes
/// offered in the configured location
pub struct MsazureTemplates {
    clients: Arc<dyn ManagementClients>,
    store: FixtureStore,
    scheme: String,
    location: String,
}

#[async_trait]
impl TemplateBackend for MsazureTemplates {
    async fn os_tpl_list(&self) -> Result<Mixins> {
        self.store.read_mixins(FixtureKind::OsTpl).await
    }

    async fn os_tpl_get(&self, term: &str) -> Result<Option<Mixin>> {
        Ok(self.os_tpl_list().await?.get_by_term(term).cloned())
    }

    async fn resource_tpl_list(&self) -> Result<Mixins> {
        let sizes = self.clients.list_vm_sizes(&self.location).await?;
        Ok(sizes
            .iter()
            .map(|size| parse::parse_template(size, &self.scheme))
            .collect())
    }

    async fn resource_tpl_get(&self, term: &str) -> Result<Option<Mixin>> {
        Ok(self.resource_tpl_list().await?.get_by_term(term).cloned())
    }
}
