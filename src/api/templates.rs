//! OS and resource template operations

use tracing::instrument;

use super::BackendApi;
use crate::errors::{BackendError, Result};
use crate::occi::{Mixin, Mixins};

const KIND: &str = "templates";

fn required_term(term: Option<&str>) -> Result<&str> {
    term.filter(|t| !t.trim().is_empty())
        .ok_or_else(|| BackendError::Argument("'term' is a mandatory argument".to_string()))
}

impl BackendApi {
    #[instrument(skip(self))]
    pub async fn os_tpl_list(&self) -> Result<Mixins> {
        let result = self.instances.templates.os_tpl_list().await;
        self.record(KIND, "os_tpl_list", result)
    }

    #[instrument(skip(self))]
    pub async fn os_tpl_get(&self, term: Option<&str>) -> Result<Option<Mixin>> {
        let result = async {
            let term = required_term(term)?;
            self.instances.templates.os_tpl_get(term).await
        }
        .await;
        self.record(KIND, "os_tpl_get", result)
    }

    #[instrument(skip(self))]
    pub async fn resource_tpl_list(&self) -> Result<Mixins> {
        let result = self.instances.templates.resource_tpl_list().await;
        self.record(KIND, "resource_tpl_list", result)
    }

    #[instrument(skip(self))]
    pub async fn resource_tpl_get(&self, term: Option<&str>) -> Result<Option<Mixin>> {
        let result = async {
            let term = required_term(term)?;
            self.instances.templates.resource_tpl_get(term).await
        }
        .await;
        self.record(KIND, "resource_tpl_get", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::azure;
    use crate::backends::azure::tests::write_fixtures;
    use crate::backends::{BackendContext, DelegatedUser};
    use crate::cache::MemoryCache;
    use crate::config::{Config, ProviderType};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_templates_from_fixtures() {
        let dir = tempfile::tempdir().unwrap();
        write_fixtures(dir.path());
        std::fs::write(
            dir.path().join("os_tpl.json"),
            r#"{"mixins": [{"scheme": "http://occi.localhost/occi/infrastructure/os_tpl#", "term": "debian"}]}"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.backend.provider = ProviderType::Azure;
        config.backend.fixtures_dir = Some(dir.path().to_path_buf());
        let ctx = BackendContext::new(&config, DelegatedUser::default(), Arc::new(MemoryCache::new()));
        let api = BackendApi::new(azure::instances(&ctx).await.unwrap());

        assert_eq!(api.os_tpl_list().await.unwrap().len(), 1);
        assert!(api.os_tpl_get(Some("debian")).await.unwrap().is_some());
        assert!(api.resource_tpl_get(Some("small")).await.unwrap().is_some());
        assert!(api.resource_tpl_get(Some("large")).await.unwrap().is_none());
        assert!(matches!(
            api.resource_tpl_get(None).await,
            Err(BackendError::Argument(_))
        ));
    }
}
