//! Azure classic backend
//!
//! Serves every resource kind from the fixture store: reads come from the
//! cached fixture sets and mutations are written back into the cache. The
//! fixture files themselves are never modified.

mod actions;
mod links;
mod templates;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::backends::{BackendContext, BackendInstances, ResourceBackend};
use crate::config::ProviderType;
use crate::errors::{BackendError, Result};
use crate::fixtures::{FixtureKind, FixtureStore};
use crate::occi::{ActionInstance, Attributes, Collection, Kind, Link, Mixins, Resource, Resources};

pub use templates::AzureTemplates;

/// Adapter set for Azure classic; reads every fixture kind up front
pub async fn instances(ctx: &BackendContext) -> Result<BackendInstances> {
    let store = ctx.fixture_store();
    store.read_all().await?;

    Ok(BackendInstances {
        provider: ProviderType::Azure,
        compute: Arc::new(AzureBackend::new(Kind::Compute, store.clone())),
        network: Arc::new(AzureBackend::new(Kind::Network, store.clone())),
        storage: Arc::new(AzureBackend::new(Kind::Storage, store.clone())),
        templates: Arc::new(AzureTemplates::new(store)),
    })
}

/// Fixture-backed adapter for one resource kind
pub struct AzureBackend {
    kind: Kind,
    store: FixtureStore,
}

impl AzureBackend {
    pub fn new(kind: Kind, store: FixtureStore) -> Self {
        Self { kind, store }
    }

    async fn resources(&self) -> Result<Resources> {
        self.store.read_resources(self.kind).await
    }

    async fn save(&self, resources: Resources) -> Result<()> {
        self.store.write_resources(self.kind, resources).await
    }

    fn ensure_kind(&self, resource: &Resource) -> Result<()> {
        if resource.kind != self.kind {
            return Err(BackendError::TypeMismatch(format!(
                "Expected a {} instance, got {}!",
                self.kind, resource.kind
            )));
        }
        Ok(())
    }

    fn not_found(&self, id: &str) -> BackendError {
        BackendError::NotFound(format!("Instance of {} with ID {:?} does not exist!", self.kind, id))
    }

    /// Copy resource template defaults the resource does not set itself
    async fn apply_template_defaults(&self, resource: &mut Resource) -> Result<()> {
        let templates = self.store.read_mixins(FixtureKind::ResourceTpl).await?;
        let applied: Vec<_> = templates
            .iter()
            .filter(|t| resource.mixins.contains(t))
            .collect();
        for template in applied {
            for (name, value) in &template.attributes {
                resource
                    .attributes
                    .entry(name.clone())
                    .or_insert_with(|| value.clone());
            }
        }
        Ok(())
    }
}

fn required_attributes(kind: Kind) -> &'static [&'static str] {
    match kind {
        Kind::Storage => &["occi.storage.size"],
        Kind::Compute | Kind::Network => &[],
    }
}

fn initial_state(kind: Kind) -> &'static str {
    match kind {
        Kind::Compute | Kind::Network => "active",
        Kind::Storage => "online",
    }
}

fn validate_required(resource: &Resource) -> Result<()> {
    if resource.title.trim().is_empty() {
        return Err(BackendError::Validation(format!(
            "Instance of {} requires a title!",
            resource.kind
        )));
    }
    for name in required_attributes(resource.kind) {
        if resource.attribute(name).is_none() {
            return Err(BackendError::Validation(format!(
                "Instance of {} requires attribute {}!",
                resource.kind, name
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl ResourceBackend for AzureBackend {
    fn kind(&self) -> Kind {
        self.kind
    }

    async fn list_ids(&self, mixins: Option<&Mixins>) -> Result<Vec<String>> {
        Ok(self.list(mixins).await?.ids())
    }

    async fn list(&self, mixins: Option<&Mixins>) -> Result<Resources> {
        Ok(self.resources().await?.filter(mixins))
    }

    async fn get(&self, id: &str) -> Result<Option<Resource>> {
        Ok(self.resources().await?.get(id).cloned())
    }

    async fn create(&self, mut resource: Resource) -> Result<String> {
        self.ensure_kind(&resource)?;
        validate_required(&resource)?;

        let mut resources = self.resources().await?;
        if resource.id.is_empty() {
            resource.id = Uuid::new_v4().to_string();
        } else if resources.get(&resource.id).is_some() {
            return Err(BackendError::Validation(format!(
                "Instance with ID {:?} already exists!",
                resource.id
            )));
        }

        if self.kind == Kind::Compute {
            self.apply_template_defaults(&mut resource).await?;
        }
        resource
            .attributes
            .entry(self.kind.state_attribute().to_string())
            .or_insert_with(|| initial_state(self.kind).into());

        let id = resource.id.clone();
        resources.insert(resource);
        self.save(resources).await?;

        debug!(kind = %self.kind, id = %id, "Created instance");
        Ok(id)
    }

    async fn update(&self, resource: Resource) -> Result<bool> {
        self.ensure_kind(&resource)?;
        validate_required(&resource)?;

        let mut resources = self.resources().await?;
        let existing = resources
            .get_mut(&resource.id)
            .ok_or_else(|| self.not_found(&resource.id))?;
        *existing = resource;
        self.save(resources).await?;
        Ok(true)
    }

    async fn partial_update(
        &self,
        id: &str,
        attributes: Attributes,
        mixins: Mixins,
        links: Vec<Link>,
    ) -> Result<bool> {
        let mut resources = self.resources().await?;
        if resources.get(id).is_none() {
            return Err(self.not_found(id));
        }
        if self.kind != Kind::Compute && !links.is_empty() {
            return Err(BackendError::TypeMismatch(format!(
                "Links cannot be added to a {} instance!",
                self.kind
            )));
        }

        for mut link in links {
            link.source = id.to_string();
            self.prepare_link(&resources, &mut link).await?;
            if let Some(resource) = resources.get_mut(id) {
                resource.links.push(link);
            }
        }

        let resource = resources.get_mut(id).ok_or_else(|| self.not_found(id))?;
        resource.attributes.extend(attributes);
        for mixin in mixins.iter() {
            resource.mixins.insert(mixin.clone());
        }

        self.save(resources).await?;
        Ok(true)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut resources = self.resources().await?;
        resources.remove(id).ok_or_else(|| self.not_found(id))?;
        self.save(resources).await?;
        self.drop_links_to(&[id.to_string()]).await?;
        Ok(true)
    }

    async fn delete_all(&self, mixins: Option<&Mixins>) -> Result<bool> {
        let removed = match mixins {
            Some(filter) if !filter.is_empty() => {
                let mut resources = self.resources().await?;
                let removed = resources.filter(Some(filter)).ids();
                resources.retain(|r| !r.matches(Some(filter)));
                self.save(resources).await?;
                removed
            }
            _ => {
                let removed = self.resources().await?.ids();
                self.store.drop(self.kind.into(), true).await?;
                removed
            }
        };
        self.drop_links_to(&removed).await?;
        Ok(true)
    }

    async fn trigger_action(&self, id: &str, action: &ActionInstance) -> Result<bool> {
        let mut resources = self.resources().await?;
        let resource = resources.get_mut(id).ok_or_else(|| self.not_found(id))?;
        actions::apply(resource, action)?;
        self.save(resources).await?;
        Ok(true)
    }

    async fn trigger_action_on_all(
        &self,
        action: &ActionInstance,
        mixins: Option<&Mixins>,
    ) -> Result<bool> {
        actions::ensure_supported(self.kind, action)?;

        let mut resources = self.resources().await?;
        for resource in resources.iter_mut().filter(|r| r.matches(mixins)) {
            actions::apply(resource, action)?;
        }
        self.save(resources).await?;
        Ok(true)
    }

    async fn get_extensions(&self) -> Result<Collection> {
        Ok(Collection::default())
    }
}
