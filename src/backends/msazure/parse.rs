//! ARM objects to OCCI resources
//!
//! Only attributes the native object actually carries are set; nothing is
//! defaulted. Identifiers lose their leading `/` so they can be used as
//! OCCI ids, titles are kept verbatim.

use lazy_static::lazy_static;
use regex::Regex;

use super::models::{StorageAccount, VirtualMachine, VirtualMachineSize, VirtualNetwork};
use crate::occi::{Kind, Mixin, Mixins, Resource, INFRASTRUCTURE_SCHEME};

const LOCATION: &str = "com.microsoft.azure.location";
const MB_PER_GB: i64 = 1024;

lazy_static! {
    static ref LEADING_SEPARATORS: Regex = Regex::new(r"^/+").expect("valid separator regex");
}

pub fn strip_leading_separators(id: &str) -> String {
    LEADING_SEPARATORS.replace(id, "").into_owned()
}

fn with_location(resource: Resource, location: Option<&str>) -> Resource {
    match location {
        Some(location) => resource.with_attribute(LOCATION, location),
        None => resource,
    }
}

/// Resource template scheme under the backend's own scheme
pub fn resource_tpl_scheme(backend_scheme: &str) -> String {
    format!("{}/occi/infrastructure/resource_tpl#", backend_scheme)
}

/// Virtual machine; cores and memory come from the matching size template
pub fn parse_compute(vm: &VirtualMachine, resource_tpl: &Mixins) -> Resource {
    let mut compute = with_location(
        Resource::new(Kind::Compute)
            .with_id(strip_leading_separators(&vm.id))
            .with_title(vm.name.clone()),
        vm.location.as_deref(),
    );

    let template = vm
        .vm_size()
        .and_then(|size| resource_tpl.get_by_term(&size.to_lowercase()));
    if let Some(template) = template {
        for name in ["occi.compute.cores", "occi.compute.memory"] {
            if let Some(value) = template.attributes.get(name) {
                compute.attributes.insert(name.to_string(), value.clone());
            }
        }
        compute.mixins.insert(template.clone());
    }

    compute
}

pub fn parse_network(vnet: &VirtualNetwork) -> Resource {
    let network = with_location(
        Resource::new(Kind::Network)
            .with_id(strip_leading_separators(&vnet.id))
            .with_title(vnet.name.clone()),
        vnet.location.as_deref(),
    );
    match vnet.first_address_prefix() {
        Some(prefix) => network.with_attribute("occi.network.address", prefix),
        None => network,
    }
}

pub fn parse_storage(account: &StorageAccount) -> Resource {
    with_location(
        Resource::new(Kind::Storage)
            .with_id(strip_leading_separators(&account.id))
            .with_title(account.name.clone()),
        account.location.as_deref(),
    )
}

/// VM size as a resource template, sizes converted from MB to GB
pub fn parse_template(size: &VirtualMachineSize, backend_scheme: &str) -> Mixin {
    let mut mixin = Mixin::new(resource_tpl_scheme(backend_scheme), size.name.to_lowercase())
        .with_title(size.name.clone())
        .with_depends(format!("{}resource_tpl", INFRASTRUCTURE_SCHEME))
        .with_attribute("occi.compute.cores", size.number_of_cores)
        .with_attribute("occi.compute.memory", size.memory_in_mb / MB_PER_GB);

    if let Some(disk) = size.resource_disk_size_in_mb {
        mixin = mixin.with_attribute("occi.compute.ephemeral_storage.size", disk / MB_PER_GB);
    }
    mixin
}
