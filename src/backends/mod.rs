//! Backend adapter layer
//!
//! Every provider implements the same operation contract for compute,
//! network and storage resources, plus the template listings. The façade
//! only ever talks to these traits, so providers can be swapped by
//! configuration:
//! - OpenNebula: contract defined, no operation implemented yet
//! - Azure classic: served entirely from the fixture store
//! - Azure Resource Manager: live reads through the management clients

pub mod azure;
pub mod msazure;
pub mod opennebula;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::cache::FixtureCache;
use crate::config::{BackendConfig, Config, ProviderType, ServerProperties};
use crate::errors::Result;
use crate::fixtures::FixtureStore;
use crate::occi::{ActionInstance, Attributes, Collection, Kind, Link, Mixin, Mixins, Resource, Resources};

/// Identity the backend acts on behalf of
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DelegatedUser {
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default)]
    pub auth_method: Option<String>,
}

/// Everything an adapter is constructed from
#[derive(Clone)]
pub struct BackendContext {
    pub delegated_user: DelegatedUser,
    pub options: BackendConfig,
    pub server_properties: ServerProperties,
    pub cache: Arc<dyn FixtureCache>,
}

impl BackendContext {
    pub fn new(config: &Config, delegated_user: DelegatedUser, cache: Arc<dyn FixtureCache>) -> Self {
        Self {
            delegated_user,
            options: config.backend.clone(),
            server_properties: config.server.clone(),
            cache,
        }
    }

    /// Fixture store keyed by this context's provider
    pub fn fixture_store(&self) -> FixtureStore {
        FixtureStore::new(
            self.options.provider.name(),
            self.options.fixtures_dir.clone(),
            self.cache.clone(),
        )
    }

    pub fn backend_scheme(&self) -> String {
        self.options.backend_scheme(&self.server_properties)
    }
}

/// Operations every provider implements for one resource kind
///
/// Mutations that cannot be satisfied return an error, never `Ok(false)`.
#[async_trait]
pub trait ResourceBackend: Send + Sync {
    /// Kind served by this instance
    fn kind(&self) -> Kind;

    /// Identifiers of all instances matching the filter, no duplicates
    async fn list_ids(&self, mixins: Option<&Mixins>) -> Result<Vec<String>>;

    /// All instances matching the filter
    async fn list(&self, mixins: Option<&Mixins>) -> Result<Resources>;

    /// A single instance, `None` if it does not exist
    async fn get(&self, id: &str) -> Result<Option<Resource>>;

    /// Instantiate a resource, returns its final identifier
    async fn create(&self, resource: Resource) -> Result<String>;

    /// Replace the instance identified by `resource.id`
    async fn update(&self, resource: Resource) -> Result<bool>;

    /// Merge attributes, add mixins and links
    async fn partial_update(
        &self,
        id: &str,
        attributes: Attributes,
        mixins: Mixins,
        links: Vec<Link>,
    ) -> Result<bool>;

    async fn delete(&self, id: &str) -> Result<bool>;

    async fn delete_all(&self, mixins: Option<&Mixins>) -> Result<bool>;

    async fn trigger_action(&self, id: &str, action: &ActionInstance) -> Result<bool>;

    async fn trigger_action_on_all(
        &self,
        action: &ActionInstance,
        mixins: Option<&Mixins>,
    ) -> Result<bool>;

    /// Provider-specific mixins and actions
    async fn get_extensions(&self) -> Result<Collection>;
}

/// Link operations, compute only
#[async_trait]
pub trait ComputeBackend: ResourceBackend {
    /// Returns the final identifier of the network interface
    async fn attach_network(&self, link: Link) -> Result<String>;

    /// Returns the final identifier of the storage link
    async fn attach_storage(&self, link: Link) -> Result<String>;

    async fn detach_network(&self, link_id: &str) -> Result<bool>;

    async fn detach_storage(&self, link_id: &str) -> Result<bool>;
}

/// OS and resource template listings
#[async_trait]
pub trait TemplateBackend: Send + Sync {
    async fn os_tpl_list(&self) -> Result<Mixins>;

    async fn os_tpl_get(&self, term: &str) -> Result<Option<Mixin>>;

    async fn resource_tpl_list(&self) -> Result<Mixins>;

    async fn resource_tpl_get(&self, term: &str) -> Result<Option<Mixin>>;
}

/// Adapter set of the active provider
#[derive(Clone)]
pub struct BackendInstances {
    pub provider: ProviderType,
    pub compute: Arc<dyn ComputeBackend>,
    pub network: Arc<dyn ResourceBackend>,
    pub storage: Arc<dyn ResourceBackend>,
    pub templates: Arc<dyn TemplateBackend>,
}

/// Create the adapter set for the configured provider
///
/// Fixture-backed providers read every fixture kind up front, so a missing
/// fixtures directory fails here rather than on the first request.
pub async fn create_backends(ctx: BackendContext) -> Result<BackendInstances> {
    info!(
        provider = ctx.options.provider.name(),
        user = ?ctx.delegated_user.identity,
        "Initializing backend adapters"
    );
    match ctx.options.provider {
        ProviderType::Opennebula => Ok(opennebula::instances()),
        ProviderType::Azure => azure::instances(&ctx).await,
        ProviderType::Msazure => {
            let clients = msazure::ArmClient::connect(&ctx.options).await?;
            msazure::instances(&ctx, Arc::new(clients)).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::errors::BackendError;

    fn context(provider: ProviderType, fixtures_dir: Option<std::path::PathBuf>) -> BackendContext {
        let mut config = Config::default();
        config.backend.provider = provider;
        config.backend.fixtures_dir = fixtures_dir;
        BackendContext::new(&config, DelegatedUser::default(), Arc::new(MemoryCache::new()))
    }

    #[tokio::test]
    async fn test_azure_requires_fixtures_dir() {
        let result = create_backends(context(ProviderType::Azure, None)).await;
        assert!(matches!(result, Err(BackendError::Retrieval(_))));
    }

    #[tokio::test]
    async fn test_azure_with_fixtures_dir() {
        let dir = tempfile::tempdir().unwrap();
        let instances = create_backends(context(ProviderType::Azure, Some(dir.path().to_path_buf())))
            .await
            .unwrap();
        assert_eq!(instances.provider, ProviderType::Azure);
        assert_eq!(instances.network.kind(), Kind::Network);
    }

    #[tokio::test]
    async fn test_msazure_without_credentials_fails_authentication() {
        let dir = tempfile::tempdir().unwrap();
        let result = create_backends(context(ProviderType::Msazure, Some(dir.path().to_path_buf()))).await;
        assert!(matches!(result, Err(BackendError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_opennebula_needs_no_fixtures() {
        let instances = create_backends(context(ProviderType::Opennebula, None)).await.unwrap();
        assert_eq!(instances.compute.kind(), Kind::Compute);
    }
}
