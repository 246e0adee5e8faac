//! `reqwest` implementation of the remote-call traits.

use std::time::Duration;

use async_trait::async_trait;
use crossroads_core::client::{DomainClient, HubClient};
use crossroads_core::error::DomainError;
use crossroads_core::item::LocationTag;
use crossroads_core::protocol::{
    ArriveRequest, ArriveResponse, DepartRequest, DroppedRequest, RegisterRequest,
    RegisterResponse, TransferRequest,
};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ClientError;

/// Default timeout for every cross-server call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// HTTP client for hub ↔ domain calls.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    client: Client,
}

impl RemoteClient {
    /// Create a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    fn url(base: &str, path: &str) -> String {
        format!("{}{path}", base.trim_end_matches('/'))
    }

    /// Passes successful responses through, converting the rest.
    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::from_body(status, &body))
        }
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        base: &str,
        path: &str,
        body: &B,
    ) -> Result<Response, ClientError> {
        let url = Self::url(base, path);
        debug!(%url, "remote call");
        let response = self.client.post(&url).json(body).send().await?;
        Self::check(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        base: &str,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        Ok(self.post(base, path, body).await?.json().await?)
    }
}

#[async_trait]
impl HubClient for RemoteClient {
    async fn register(
        &self,
        hub_url: &str,
        request: &RegisterRequest,
    ) -> Result<RegisterResponse, DomainError> {
        Ok(self.post_json(hub_url, "/register", request).await?)
    }

    async fn transfer(&self, hub_url: &str, request: &TransferRequest) -> Result<(), DomainError> {
        self.post(hub_url, "/transfer", request).await?;
        Ok(())
    }
}

#[async_trait]
impl DomainClient for RemoteClient {
    async fn connect_hub(&self, domain_url: &str, hub_url: &str) -> Result<String, DomainError> {
        let url = Self::url(domain_url, "/newhub");
        debug!(%url, "remote call");
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(hub_url.to_owned())
            .send()
            .await
            .map_err(ClientError::from)?;
        let response = Self::check(response).await?;
        Ok(response.text().await.map_err(ClientError::from)?)
    }

    async fn arrive(
        &self,
        domain_url: &str,
        request: &ArriveRequest,
    ) -> Result<ArriveResponse, DomainError> {
        Ok(self.post_json(domain_url, "/arrive", request).await?)
    }

    async fn depart(&self, domain_url: &str, request: &DepartRequest) -> Result<(), DomainError> {
        self.post(domain_url, "/depart", request).await?;
        Ok(())
    }

    async fn dropped(
        &self,
        domain_url: &str,
        request: &DroppedRequest,
    ) -> Result<LocationTag, DomainError> {
        Ok(self.post_json(domain_url, "/dropped", request).await?)
    }
}
