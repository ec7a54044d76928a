//! Azure Resource Manager response types

use serde::Deserialize;

/// One page of an ARM list response
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub value: Vec<T>,
    #[serde(rename = "nextLink", default)]
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VirtualMachine {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub properties: Option<VirtualMachineProperties>,
}

impl VirtualMachine {
    pub fn vm_size(&self) -> Option<&str> {
        self.properties
            .as_ref()?
            .hardware_profile
            .as_ref()?
            .vm_size
            .as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineProperties {
    #[serde(default)]
    pub hardware_profile: Option<HardwareProfile>,
    #[serde(default)]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareProfile {
    #[serde(default)]
    pub vm_size: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VirtualNetwork {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub properties: Option<VirtualNetworkProperties>,
}

impl VirtualNetwork {
    pub fn first_address_prefix(&self) -> Option<&str> {
        self.properties
            .as_ref()?
            .address_space
            .as_ref()?
            .address_prefixes
            .first()
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkProperties {
    #[serde(default)]
    pub address_space: Option<AddressSpace>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSpace {
    #[serde(default)]
    pub address_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageAccount {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VirtualMachineSize {
    pub name: String,
    #[serde(rename = "numberOfCores")]
    pub number_of_cores: i64,
    #[serde(rename = "memoryInMB")]
    pub memory_in_mb: i64,
    #[serde(rename = "osDiskSizeInMB", default)]
    pub os_disk_size_in_mb: Option<i64>,
    #[serde(rename = "resourceDiskSizeInMB", default)]
    pub resource_disk_size_in_mb: Option<i64>,
    #[serde(rename = "maxDataDiskCount", default)]
    pub max_data_disk_count: Option<i64>,
}
