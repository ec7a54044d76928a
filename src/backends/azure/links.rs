//! Network interfaces and storage links on fixture compute resources
//!
//! Links are stored on their source compute resource; the target must
//! exist in the network or storage fixture set.

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::AzureBackend;
use crate::backends::ComputeBackend;
use crate::errors::{BackendError, Result};
use crate::occi::{Kind, Link, LinkKind, Resources};

impl AzureBackend {
    /// Give `link` an id if it has none and check it against the stored
    /// links and its target
    pub(super) async fn prepare_link(&self, computes: &Resources, link: &mut Link) -> Result<()> {
        let target_kind = link.kind.target_kind();
        let targets = self.store.read_resources(target_kind).await?;
        if targets.get(&link.target).is_none() {
            return Err(BackendError::NotFound(format!(
                "Instance of {} with ID {:?} does not exist!",
                target_kind, link.target
            )));
        }

        if link.id.is_empty() {
            link.id = Uuid::new_v4().to_string();
        } else if computes.iter().any(|c| c.links.iter().any(|l| l.id == link.id)) {
            return Err(BackendError::Validation(format!(
                "Link with ID {:?} already exists!",
                link.id
            )));
        }
        Ok(())
    }

    async fn attach(&self, mut link: Link, kind: LinkKind) -> Result<String> {
        if link.kind != kind {
            return Err(BackendError::TypeMismatch(format!(
                "Expected a {} link, got {}!",
                kind.term(),
                link.kind.term()
            )));
        }

        let mut computes = self.store.read_resources(Kind::Compute).await?;
        self.prepare_link(&computes, &mut link).await?;

        let compute = computes.get_mut(&link.source).ok_or_else(|| {
            BackendError::NotFound(format!(
                "Instance of compute with ID {:?} does not exist!",
                link.source
            ))
        })?;
        let id = link.id.clone();
        compute.links.push(link);

        self.store.write_resources(Kind::Compute, computes).await?;
        Ok(id)
    }

    /// Remove links pointing at `targets` of this backend's kind
    pub(super) async fn drop_links_to(&self, targets: &[String]) -> Result<()> {
        if self.kind == Kind::Compute || targets.is_empty() {
            return Ok(());
        }

        let mut computes = self.store.read_resources(Kind::Compute).await?;
        let mut removed = 0;
        for compute in computes.iter_mut() {
            let before = compute.links.len();
            compute.links.retain(|l| {
                l.kind.target_kind() != self.kind || !targets.contains(&l.target)
            });
            removed += before - compute.links.len();
        }

        if removed > 0 {
            debug!(kind = %self.kind, removed, "Removed links to deleted instances");
            self.store.write_resources(Kind::Compute, computes).await?;
        }
        Ok(())
    }

    async fn detach(&self, link_id: &str, kind: LinkKind) -> Result<bool> {
        let mut computes = self.store.read_resources(Kind::Compute).await?;
        let owner = computes.iter_mut().find_map(|compute| {
            let index = compute
                .links
                .iter()
                .position(|l| l.id == link_id && l.kind == kind)?;
            Some((compute, index))
        });

        match owner {
            Some((compute, index)) => {
                compute.links.remove(index);
            }
            None => {
                return Err(BackendError::NotFound(format!(
                    "Link {} with ID {:?} does not exist!",
                    kind.term(),
                    link_id
                )))
            }
        }

        self.store.write_resources(Kind::Compute, computes).await?;
        Ok(true)
    }
}

#[async_trait]
impl ComputeBackend for AzureBackend {
    async fn attach_network(&self, link: Link) -> Result<String> {
        self.attach(link, LinkKind::NetworkInterface).await
    }

    async fn attach_storage(&self, link: Link) -> Result<String> {
        self.attach(link, LinkKind::StorageLink).await
    }

    async fn detach_network(&self, link_id: &str) -> Result<bool> {
        self.detach(link_id, LinkKind::NetworkInterface).await
    }

    async fn detach_storage(&self, link_id: &str) -> Result<bool> {
        self.detach(link_id, LinkKind::StorageLink).await
    }
}
