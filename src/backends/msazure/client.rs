//! Azure Resource Manager management clients
//!
//! One bearer token, obtained with the service principal's
//! tenant/client/secret triple, serves the compute, network and storage
//! management APIs of a single subscription. Calls inherit the HTTP
//! client's timeout and are not retried here.

use async_trait::async_trait;
use azure_core::auth::TokenCredential;
use azure_identity::{ClientSecretCredential, TokenCredentialOptions};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::models::{Page, StorageAccount, VirtualMachine, VirtualMachineSize, VirtualNetwork};
use crate::config::BackendConfig;
use crate::errors::{BackendError, Result};

const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";
const COMPUTE_API_VERSION: &str = "2023-03-01";
const NETWORK_API_VERSION: &str = "2023-05-01";
const STORAGE_API_VERSION: &str = "2023-01-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-service management calls the adapter needs
#[async_trait]
pub trait ManagementClients: Send + Sync {
    async fn list_virtual_machines(&self) -> Result<Vec<VirtualMachine>>;

    async fn list_virtual_networks(&self) -> Result<Vec<VirtualNetwork>>;

    async fn list_storage_accounts(&self) -> Result<Vec<StorageAccount>>;

    async fn list_vm_sizes(&self, location: &str) -> Result<Vec<VirtualMachineSize>>;
}

/// ARM REST client bound to one subscription
pub struct ArmClient {
    http: reqwest::Client,
    endpoint: String,
    subscription_id: String,
    token: String,
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            BackendError::Authentication(format!(
                "Could not get a MsAzure client for the current user, {} is not configured!",
                name
            ))
        })
}

/// Service principal credential and subscription for `config`
fn credential(config: &BackendConfig) -> Result<(ClientSecretCredential, &str)> {
    let tenant_id = required(&config.tenant_id, "tenant_id")?;
    let client_id = required(&config.client_id, "client_id")?;
    let client_secret = required(&config.client_secret, "client_secret")?;
    let subscription_id = required(&config.subscription_id, "subscription_id")?;

    let credential = ClientSecretCredential::new(
        azure_core::new_http_client(),
        tenant_id.to_string(),
        client_id.to_string(),
        client_secret.to_string(),
        TokenCredentialOptions::default(),
    );
    Ok((credential, subscription_id))
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| BackendError::Config(format!("Invalid ARM URL {}: {}", url, e)))
}

impl ArmClient {
    /// Authenticate the service principal and bind to the subscription
    pub async fn connect(config: &BackendConfig) -> Result<Self> {
        let (credential, subscription_id) = credential(config)?;
        let token = credential
            .get_token(&[MANAGEMENT_SCOPE])
            .await
            .map_err(|e| {
                BackendError::Authentication(format!(
                    "Could not get a MsAzure client for the current user: {}",
                    e
                ))
            })?;

        info!(subscription = subscription_id, "Authenticated against Azure Resource Manager");
        Self::with_token(
            &config.management_endpoint,
            subscription_id,
            token.token.secret(),
        )
    }

    /// Client using an already obtained bearer token
    pub fn with_token(
        endpoint: &str,
        subscription_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        parse_url(endpoint)?;
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            subscription_id: subscription_id.into(),
            token: token.into(),
        })
    }

    fn subscription_url(&self, path: &str, api_version: &str) -> Result<Url> {
        let mut url = parse_url(&format!(
            "{}/subscriptions/{}/{}",
            self.endpoint, self.subscription_id, path
        ))?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    /// GET `url` and follow `nextLink` until exhausted
    async fn list_paged<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(url);

        while let Some(url) = next {
            debug!(url = %url, "ARM list request");
            let page: Page<T> = self
                .http
                .get(url)
                .bearer_auth(&self.token)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            items.extend(page.value);
            next = page.next_link.as_deref().map(parse_url).transpose()?;
        }

        Ok(items)
    }
}

#[async_trait]
impl ManagementClients for ArmClient {
    async fn list_virtual_machines(&self) -> Result<Vec<VirtualMachine>> {
        let url = self.subscription_url(
            "providers/Microsoft.Compute/virtualMachines",
            COMPUTE_API_VERSION,
        )?;
        self.list_paged(url).await
    }

    async fn list_virtual_networks(&self) -> Result<Vec<VirtualNetwork>> {
        let url = self.subscription_url(
            "providers/Microsoft.Network/virtualNetworks",
            NETWORK_API_VERSION,
        )?;
        self.list_paged(url).await
    }

    async fn list_storage_accounts(&self) -> Result<Vec<StorageAccount>> {
        let url = self.subscription_url(
            "providers/Microsoft.Storage/storageAccounts",
            STORAGE_API_VERSION,
        )?;
        self.list_paged(url).await
    }

    async fn list_vm_sizes(&self, location: &str) -> Result<Vec<VirtualMachineSize>> {
        let url = self.subscription_url(
            &format!("providers/Microsoft.Compute/locations/{}/vmSizes", location),
            COMPUTE_API_VERSION,
        )?;
        self.list_paged(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const VMS_PATH: &str = "/subscriptions/sub-1/providers/Microsoft.Compute/virtualMachines";

    #[tokio::test]
    async fn test_lists_virtual_machines_across_pages() {
        let mut server = mockito::Server::new_async().await;
        let next_link = format!("{}/page-2", server.url());
        let first = server
            .mock("GET", VMS_PATH)
            .match_query(Matcher::UrlEncoded("api-version".into(), COMPUTE_API_VERSION.into()))
            .match_header("authorization", "Bearer token-1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "value": [{"id": "/subscriptions/sub-1/vm-a", "name": "vm-a"}],
                    "nextLink": next_link
                })
                .to_string(),
            )
            .create_async()
            .await;
        let second = server
            .mock("GET", "/page-2")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"value": [{"id": "/subscriptions/sub-1/vm-b", "name": "vm-b"}]}"#)
            .create_async()
            .await;

        let client = ArmClient::with_token(&server.url(), "sub-1", "token-1").unwrap();
        let vms = client.list_virtual_machines().await.unwrap();

        assert_eq!(
            vms.iter().map(|vm| vm.name.as_str()).collect::<Vec<_>>(),
            vec!["vm-a", "vm-b"]
        );
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_vm_sizes_for_location() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/subscriptions/sub-1/providers/Microsoft.Compute/locations/westeurope/vmSizes",
            )
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"value": [{"name": "Standard_A2", "numberOfCores": 2, "memoryInMB": 3584,
                    "osDiskSizeInMB": 1047552, "resourceDiskSizeInMB": 138240, "maxDataDiskCount": 4}]}"#,
            )
            .create_async()
            .await;

        let client = ArmClient::with_token(&server.url(), "sub-1", "token-1").unwrap();
        let sizes = client.list_vm_sizes("westeurope").await.unwrap();

        assert_eq!(sizes.len(), 1);
        assert_eq!(sizes[0].memory_in_mb, 3584);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_failure_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/subscriptions/sub-1/providers/Microsoft.Storage/storageAccounts")
            .match_query(Matcher::Any)
            .with_status(403)
            .create_async()
            .await;

        let client = ArmClient::with_token(&server.url(), "sub-1", "token-1").unwrap();
        assert!(matches!(
            client.list_storage_accounts().await,
            Err(BackendError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_requires_credentials() {
        let mut config = crate::config::Config::default().backend;
        config.tenant_id = Some("tenant".to_string());
        config.client_id = Some("client".to_string());

        match ArmClient::connect(&config).await {
            Err(BackendError::Authentication(msg)) => assert!(msg.contains("client_secret")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("connected without a client secret"),
        }
    }

    #[test]
    fn test_credential_from_complete_config() {
        let mut config = crate::config::Config::default().backend;
        config.tenant_id = Some("tenant".to_string());
        config.client_id = Some("client".to_string());
        config.client_secret = Some("secret".to_string());
        assert!(matches!(
            credential(&config),
            Err(BackendError::Authentication(msg)) if msg.contains("subscription_id")
        ));

        config.subscription_id = Some("sub-1".to_string());
        let (_, subscription_id) = credential(&config).unwrap();
        assert_eq!(subscription_id, "sub-1");
    }

    #[test]
    fn test_rejects_malformed_endpoint() {
        assert!(matches!(
            ArmClient::with_token("not a url", "sub-1", "token"),
            Err(BackendError::Config(_))
        ));
    }
}
