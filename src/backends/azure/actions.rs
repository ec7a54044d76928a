//! Infrastructure actions on fixture resources
//!
//! An action only moves the resource's state attribute; `resize` also
//! records the requested size.

use crate::errors::{BackendError, Result};
use crate::occi::{ActionInstance, Kind, Resource};

const STORAGE_SIZE: &str = "occi.storage.size";

/// State a resource of `kind` ends up in after action `term`
fn resulting_state(kind: Kind, term: &str) -> Option<&'static str> {
    match (kind, term) {
        (Kind::Compute, "start" | "restart") => Some("active"),
        (Kind::Compute, "stop") => Some("inactive"),
        (Kind::Compute, "suspend") => Some("suspended"),
        (Kind::Network, "up") => Some("active"),
        (Kind::Network, "down") => Some("inactive"),
        (Kind::Storage, "online" | "backup" | "snapshot" | "resize") => Some("online"),
        (Kind::Storage, "offline") => Some("offline"),
        _ => None,
    }
}

fn action_scheme(kind: Kind) -> String {
    format!("http://schemas.ogf.org/occi/infrastructure/{}/action#", kind)
}

/// Fails with `NotFound` unless `action` is defined for `kind`
pub(super) fn ensure_supported(kind: Kind, action: &ActionInstance) -> Result<&'static str> {
    if action.action.scheme != action_scheme(kind) {
        return Err(unsupported(kind, action));
    }
    resulting_state(kind, action.term()).ok_or_else(|| unsupported(kind, action))
}

fn unsupported(kind: Kind, action: &ActionInstance) -> BackendError {
    BackendError::NotFound(format!(
        "Action {}{} is not supported on {}!",
        action.action.scheme,
        action.term(),
        kind
    ))
}

pub(super) fn apply(resource: &mut Resource, action: &ActionInstance) -> Result<()> {
    let state = ensure_supported(resource.kind, action)?;

    if resource.kind == Kind::Storage && action.term() == "resize" {
        let size = action.attributes.get(STORAGE_SIZE).cloned().ok_or_else(|| {
            BackendError::Validation(format!("Action resize requires {}!", STORAGE_SIZE))
        })?;
        resource.attributes.insert(STORAGE_SIZE.to_string(), size);
    }

    resource
        .attributes
        .insert(resource.kind.state_attribute().to_string(), state.into());
    Ok(())
}
