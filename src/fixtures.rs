//! Fixture store
//!
//! Each adapter keeps five fixture sets: seed resources for compute,
//! network and storage, plus the OS and resource template mixins. A set
//! lives in the shared cache under `<provider>_<kind>` and is loaded from
//! `<fixtures_dir>/<kind>.json` the first time it is missing there.
//!
//! A fixture file that is absent or unreadable yields an empty set. A
//! missing fixtures directory is a configuration problem and fails.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::cache::FixtureCache;
use crate::errors::{BackendError, Result};
use crate::metrics::{FIXTURE_CACHE_LOOKUPS, FIXTURE_LOAD_DURATION};
use crate::occi::{Collection, Kind, Mixins, Resources};

const FIXTURE_EXTENSION: &str = "json";

/// Fixture set identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureKind {
    Compute,
    Network,
    Storage,
    OsTpl,
    ResourceTpl,
}

impl FixtureKind {
    pub const ALL: [FixtureKind; 5] = [
        FixtureKind::Compute,
        FixtureKind::Network,
        FixtureKind::Storage,
        FixtureKind::OsTpl,
        FixtureKind::ResourceTpl,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FixtureKind::Compute => "compute",
            FixtureKind::Network => "network",
            FixtureKind::Storage => "storage",
            FixtureKind::OsTpl => "os_tpl",
            FixtureKind::ResourceTpl => "resource_tpl",
        }
    }

    /// Template kinds hold mixins, the others hold resources
    pub fn is_template(&self) -> bool {
        matches!(self, FixtureKind::OsTpl | FixtureKind::ResourceTpl)
    }

    fn empty(&self) -> FixtureSet {
        if self.is_template() {
            FixtureSet::Mixins(Mixins::new())
        } else {
            FixtureSet::Resources(Resources::new())
        }
    }
}

impl From<Kind> for FixtureKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Compute => FixtureKind::Compute,
            Kind::Network => FixtureKind::Network,
            Kind::Storage => FixtureKind::Storage,
        }
    }
}

impl FromStr for FixtureKind {
    type Err = BackendError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        FixtureKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| BackendError::Retrieval(format!("Unable to read fixtures for {:?}!", s)))
    }
}

impl fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Content of a fixture cache entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureSet {
    Resources(Resources),
    Mixins(Mixins),
}

impl FixtureSet {
    pub fn len(&self) -> usize {
        match self {
            FixtureSet::Resources(r) => r.len(),
            FixtureSet::Mixins(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cached fixture sets of one provider
#[derive(Clone)]
pub struct FixtureStore {
    provider: &'static str,
    fixtures_dir: Option<PathBuf>,
    cache: Arc<dyn FixtureCache>,
}

impl FixtureStore {
    pub fn new(
        provider: &'static str,
        fixtures_dir: Option<PathBuf>,
        cache: Arc<dyn FixtureCache>,
    ) -> Self {
        Self {
            provider,
            fixtures_dir,
            cache,
        }
    }

    /// Cache key, `<provider>_<kind>`
    pub fn cache_key(&self, kind: FixtureKind) -> String {
        format!("{}_{}", self.provider, kind)
    }

    /// Read a fixture set, loading it from the configured directory on a miss
    pub async fn read(&self, kind: FixtureKind) -> Result<FixtureSet> {
        self.read_from(kind, None).await
    }

    /// Read a fixture set; on a miss `path` overrides the configured
    /// location, either as a `.json` file or as a directory
    pub async fn read_from(&self, kind: FixtureKind, path: Option<&Path>) -> Result<FixtureSet> {
        let key = self.cache_key(kind);

        if let Some(bytes) = self.cache.get(&key).await? {
            FIXTURE_CACHE_LOOKUPS
                .with_label_values(&[self.provider, kind.name(), "hit"])
                .inc();
            return Ok(serde_json::from_slice(&bytes)?);
        }
        FIXTURE_CACHE_LOOKUPS
            .with_label_values(&[self.provider, kind.name(), "miss"])
            .inc();

        let path = self.path_for_fixture_file(path, kind)?;
        debug!(provider = self.provider, kind = %kind, path = %path.display(), "Reloading fixtures");

        let timer = FIXTURE_LOAD_DURATION.start_timer();
        let set = load_fixture_file(&path, kind).await?;
        timer.observe_duration();

        self.write(kind, &set).await?;
        Ok(set)
    }

    /// Resource fixtures of `kind`
    pub async fn read_resources(&self, kind: Kind) -> Result<Resources> {
        match self.read(kind.into()).await? {
            FixtureSet::Resources(resources) => Ok(resources),
            FixtureSet::Mixins(_) => Err(BackendError::Retrieval(format!(
                "Cached {} fixtures hold mixins instead of resources!",
                kind
            ))),
        }
    }

    /// Template fixtures of `kind`
    pub async fn read_mixins(&self, kind: FixtureKind) -> Result<Mixins> {
        match self.read(kind).await? {
            FixtureSet::Mixins(mixins) => Ok(mixins),
            FixtureSet::Resources(_) => Err(BackendError::Retrieval(format!(
                "Cached {} fixtures hold resources instead of mixins!",
                kind
            ))),
        }
    }

    /// Read every fixture kind, populating the cache
    pub async fn read_all(&self) -> Result<()> {
        debug!(
            provider = self.provider,
            dir = ?self.fixtures_dir,
            "Reading fixtures"
        );
        for kind in FixtureKind::ALL {
            self.read(kind).await?;
        }
        Ok(())
    }

    /// Replace the cached set for `kind`; the value's shape is not checked
    pub async fn write(&self, kind: FixtureKind, value: &FixtureSet) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.cache.set(&self.cache_key(kind), bytes).await
    }

    pub async fn write_resources(&self, kind: Kind, resources: Resources) -> Result<()> {
        self.write(kind.into(), &FixtureSet::Resources(resources)).await
    }

    /// Lite drop empties the set; a full drop evicts the key so the next
    /// read goes back to the fixture file
    pub async fn drop(&self, kind: FixtureKind, lite: bool) -> Result<()> {
        if lite {
            self.write(kind, &kind.empty()).await
        } else {
            self.cache.delete(&self.cache_key(kind)).await
        }
    }

    fn path_for_fixture_file(&self, path: Option<&Path>, kind: FixtureKind) -> Result<PathBuf> {
        if let Some(path) = path {
            if path.extension().is_some_and(|ext| ext == FIXTURE_EXTENSION) {
                return Ok(path.to_path_buf());
            }
        }

        let dir = path
            .filter(|p| !p.as_os_str().is_empty())
            .or(self.fixtures_dir.as_deref())
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| {
                BackendError::Retrieval(
                    "Unable to read fixtures from an unspecified directory!".to_string(),
                )
            })?;

        Ok(dir.join(format!("{}.{}", kind, FIXTURE_EXTENSION)))
    }
}

async fn load_fixture_file(path: &Path, kind: FixtureKind) -> Result<FixtureSet> {
    let content = match tokio::fs::read(path).await {
        Ok(content) => content,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Fixture file unreadable, using empty set");
            return Ok(kind.empty());
        }
    };

    let collection: Collection = serde_json::from_slice(&content)?;
    Ok(if kind.is_template() {
        FixtureSet::Mixins(collection.mixins)
    } else {
        FixtureSet::Resources(collection.resources)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::occi::Resource;

    const COMPUTE_JSON: &str = r#"{
        "resources": [
            {"kind": "http://schemas.ogf.org/occi/infrastructure#compute", "id": "vm-1", "title": "one"},
            {"kind": "http://schemas.ogf.org/occi/infrastructure#compute", "id": "vm-2", "title": "two"}
        ]
    }"#;

    const OS_TPL_JSON: &str = r#"{
        "mixins": [
            {"scheme": "http://occi.localhost/occi/infrastructure/os_tpl#", "term": "ubuntu", "title": "Ubuntu"}
        ]
    }"#;

    fn store(dir: Option<&Path>) -> FixtureStore {
        FixtureStore::new("azure", dir.map(Path::to_path_buf), Arc::new(MemoryCache::new()))
    }

    fn fixtures_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("compute.json"), COMPUTE_JSON).unwrap();
        std::fs::write(dir.path().join("os_tpl.json"), OS_TPL_JSON).unwrap();
        dir
    }

    #[test]
    fn test_fixture_kind_parsing() {
        assert_eq!("os_tpl".parse::<FixtureKind>().unwrap(), FixtureKind::OsTpl);
        assert!(matches!(
            "compute_tpl".parse::<FixtureKind>(),
            Err(BackendError::Retrieval(_))
        ));
    }

    #[test]
    fn test_cache_key_includes_provider() {
        let azure = store(None);
        let msazure = FixtureStore::new("msazure", None, Arc::new(MemoryCache::new()));
        assert_eq!(azure.cache_key(FixtureKind::Compute), "azure_compute");
        assert_eq!(msazure.cache_key(FixtureKind::Network), "msazure_network");
    }

    #[tokio::test]
    async fn test_read_without_directory_fails() {
        let store = store(None);
        let err = store.read(FixtureKind::Compute).await.unwrap_err();
        assert!(matches!(err, BackendError::Retrieval(ref msg) if msg.contains("unspecified directory")));
    }

    #[tokio::test]
    async fn test_missing_file_yields_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(Some(dir.path()));

        let resources = store.read_resources(Kind::Compute).await.unwrap();
        assert!(resources.is_empty());
        let mixins = store.read_mixins(FixtureKind::ResourceTpl).await.unwrap();
        assert!(mixins.is_empty());
    }

    #[tokio::test]
    async fn test_reads_resources_and_mixins() {
        let dir = fixtures_dir();
        let store = store(Some(dir.path()));

        let resources = store.read_resources(Kind::Compute).await.unwrap();
        assert_eq!(resources.ids(), vec!["vm-1".to_string(), "vm-2".to_string()]);

        let mixins = store.read_mixins(FixtureKind::OsTpl).await.unwrap();
        assert_eq!(mixins.get_by_term("ubuntu").unwrap().title.as_deref(), Some("Ubuntu"));
    }

    #[tokio::test]
    async fn test_explicit_json_path_overrides_directory() {
        let dir = fixtures_dir();
        let other = tempfile::tempdir().unwrap();
        let store = store(Some(other.path()));

        let set = store
            .read_from(FixtureKind::Compute, Some(&dir.path().join("compute.json")))
            .await
            .unwrap();
        assert_eq!(set.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("network.json"), "{ not json").unwrap();
        let store = store(Some(dir.path()));

        assert!(matches!(
            store.read(FixtureKind::Network).await,
            Err(BackendError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_write_then_read_skips_file() {
        let dir = fixtures_dir();
        let store = store(Some(dir.path()));

        let written: Resources = vec![Resource::new(Kind::Compute).with_id("vm-9").with_title("nine")].into();
        store.write_resources(Kind::Compute, written.clone()).await.unwrap();
        std::fs::remove_file(dir.path().join("compute.json")).unwrap();

        assert_eq!(store.read_resources(Kind::Compute).await.unwrap(), written);
    }

    #[tokio::test]
    async fn test_lite_drop_keeps_empty_set() {
        let dir = fixtures_dir();
        let store = store(Some(dir.path()));
        assert_eq!(store.read(FixtureKind::Compute).await.unwrap().len(), 2);

        store.drop(FixtureKind::Compute, true).await.unwrap();
        assert!(store.read(FixtureKind::Compute).await.unwrap().is_empty());

        store.drop(FixtureKind::OsTpl, true).await.unwrap();
        assert_eq!(
            store.read(FixtureKind::OsTpl).await.unwrap(),
            FixtureSet::Mixins(Mixins::new())
        );
    }

    #[tokio::test]
    async fn test_full_drop_reloads_from_file() {
        let dir = fixtures_dir();
        let store = store(Some(dir.path()));
        store.drop(FixtureKind::Compute, true).await.unwrap();
        assert!(store.read(FixtureKind::Compute).await.unwrap().is_empty());

        store.drop(FixtureKind::Compute, false).await.unwrap();
        assert_eq!(store.read(FixtureKind::Compute).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_wrong_shape_in_cache_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(Some(dir.path()));
        store
            .write(FixtureKind::Compute, &FixtureSet::Mixins(Mixins::new()))
            .await
            .unwrap();

        assert!(matches!(
            store.read_resources(Kind::Compute).await,
            Err(BackendError::Retrieval(_))
        ));
    }

    #[tokio::test]
    async fn test_read_all_populates_cache() {
        let dir = fixtures_dir();
        let cache = Arc::new(MemoryCache::new());
        let store = FixtureStore::new("azure", Some(dir.path().to_path_buf()), cache.clone());

        store.read_all().await.unwrap();
        for kind in FixtureKind::ALL {
            assert!(cache.get(&format!("azure_{}", kind)).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_shipped_azure_fixtures_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("etc/backends/azure/fixtures");
        let store = store(Some(dir.as_path()));
        store.read_all().await.unwrap();

        let computes = store.read_resources(Kind::Compute).await.unwrap();
        assert_eq!(computes.len(), 2);
        assert!(computes.iter().any(|c| !c.links.is_empty()));
        assert_eq!(store.read_mixins(FixtureKind::ResourceTpl).await.unwrap().len(), 2);
    }
}
