//! OS and resource templates from fixtures

use async_trait::async_trait;

use crate::backends::TemplateBackend;
use crate::errors::Result;
use crate::fixtures::{FixtureKind, FixtureStore};
use crate::occi::{Mixin, Mixins};

pub struct AzureTemplates {
    store: FixtureStore,
}

impl AzureTemplates {
    pub fn new(store: FixtureStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TemplateBackend for AzureTemplates {
    async fn os_tpl_list(&self) -> Result<Mixins> {
        self.store.read_mixins(FixtureKind::OsTpl).await
    }

    async fn os_tpl_get(&self, term: &str) -> Result<Option<Mixin>> {
        Ok(self.os_tpl_list().await?.get_by_term(term).cloned())
    }

    async fn resource_tpl_list(&self) -> Result<Mixins> {
        self.store.read_mixins(FixtureKind::ResourceTpl).await
    }

    async fn resource_tpl_get(&self, term: &str) -> Result<Option<Mixin>> {
        Ok(self.resource_tpl_list().await?.get_by_term(term).cloned())
    }
}
