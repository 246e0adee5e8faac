//! Test clients — mock `HubClient` and `DomainClient` implementations.

use std::sync::Mutex;

use async_trait::async_trait;
use crossroads_core::client::{DomainClient, HubClient};
use crossroads_core::error::DomainError;
use crossroads_core::item::LocationTag;
use crossroads_core::protocol::{
    ArriveRequest, ArriveResponse, DepartRequest, DroppedRequest, RegisterRequest,
    RegisterResponse, TransferRequest,
};

/// A domain client that records every call and always succeeds. `dropped`
/// answers with the configured tag.
#[derive(Debug)]
pub struct RecordingDomainClient {
    drop_tag: LocationTag,
    connections: Mutex<Vec<(String, String)>>,
    arrivals: Mutex<Vec<(String, ArriveRequest)>>,
    departures: Mutex<Vec<(String, DepartRequest)>>,
    drops: Mutex<Vec<(String, DroppedRequest)>>,
}

impl RecordingDomainClient {
    /// Create a recording client whose `dropped` calls return `drop_tag`.
    #[must_use]
    pub fn new(drop_tag: LocationTag) -> Self {
        Self {
            drop_tag,
            connections: Mutex::new(Vec::new()),
            arrivals: Mutex::new(Vec::new()),
            departures: Mutex::new(Vec::new()),
            drops: Mutex::new(Vec::new()),
        }
    }

    /// `(domain_url, hub_url)` of every `connect_hub` call.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn connections(&self) -> Vec<(String, String)> {
        self.connections.lock().unwrap().clone()
    }

    /// Every arrival handshake sent.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn arrivals(&self) -> Vec<(String, ArriveRequest)> {
        self.arrivals.lock().unwrap().clone()
    }

    /// Every departure sent.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn departures(&self) -> Vec<(String, DepartRequest)> {
        self.departures.lock().unwrap().clone()
    }

    /// Every drop request sent.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn drops(&self) -> Vec<(String, DroppedRequest)> {
        self.drops.lock().unwrap().clone()
    }
}

#[async_trait]
impl DomainClient for RecordingDomainClient {
    async fn connect_hub(&self, domain_url: &str, hub_url: &str) -> Result<String, DomainError> {
        self.connections
            .lock()
            .unwrap()
            .push((domain_url.to_owned(), hub_url.to_owned()));
        Ok("Domain registered.".to_owned())
    }

    async fn arrive(
        &self,
        domain_url: &str,
        request: &ArriveRequest,
    ) -> Result<ArriveResponse, DomainError> {
        self.arrivals
            .lock()
            .unwrap()
            .push((domain_url.to_owned(), request.clone()));
        Ok(ArriveResponse::default())
    }

    async fn depart(&self, domain_url: &str, request: &DepartRequest) -> Result<(), DomainError> {
        self.departures
            .lock()
            .unwrap()
            .push((domain_url.to_owned(), request.clone()));
        Ok(())
    }

    async fn dropped(
        &self,
        domain_url: &str,
        request: &DroppedRequest,
    ) -> Result<LocationTag, DomainError> {
        self.drops
            .lock()
            .unwrap()
            .push((domain_url.to_owned(), request.clone()));
        Ok(self.drop_tag.clone())
    }
}

/// A domain client whose every call fails as if the server were down.
#[derive(Debug)]
pub struct FailingDomainClient;

#[async_trait]
impl DomainClient for FailingDomainClient {
    async fn connect_hub(&self, _domain_url: &str, _hub_url: &str) -> Result<String, DomainError> {
        Err(DomainError::Remote("connection refused".into()))
    }

    async fn arrive(
        &self,
        _domain_url: &str,
        _request: &ArriveRequest,
    ) -> Result<ArriveResponse, DomainError> {
        Err(DomainError::Remote("connection refused".into()))
    }

    async fn depart(&self, _domain_url: &str, _request: &DepartRequest) -> Result<(), DomainError> {
        Err(DomainError::Remote("connection refused".into()))
    }

    async fn dropped(
        &self,
        _domain_url: &str,
        _request: &DroppedRequest,
    ) -> Result<LocationTag, DomainError> {
        Err(DomainError::Remote("connection refused".into()))
    }
}

/// A hub client that answers `register` with a fixed response and records
/// every transfer, always accepting it.
#[derive(Debug)]
pub struct RecordingHubClient {
    registration: RegisterResponse,
    registrations: Mutex<Vec<(String, RegisterRequest)>>,
    transfers: Mutex<Vec<TransferRequest>>,
}

impl RecordingHubClient {
    /// Create a recording client that answers `register` with `registration`.
    #[must_use]
    pub fn new(registration: RegisterResponse) -> Self {
        Self {
            registration,
            registrations: Mutex::new(Vec::new()),
            transfers: Mutex::new(Vec::new()),
        }
    }

    /// `(hub_url, request)` of every registration sent.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn registrations(&self) -> Vec<(String, RegisterRequest)> {
        self.registrations.lock().unwrap().clone()
    }

    /// Every transfer sent.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn transfers(&self) -> Vec<TransferRequest> {
        self.transfers.lock().unwrap().clone()
    }
}

#[async_trait]
impl HubClient for RecordingHubClient {
    async fn register(
        &self,
        hub_url: &str,
        request: &RegisterRequest,
    ) -> Result<RegisterResponse, DomainError> {
        self.registrations
            .lock()
            .unwrap()
            .push((hub_url.to_owned(), request.clone()));
        Ok(self.registration.clone())
    }

    async fn transfer(&self, _hub_url: &str, request: &TransferRequest) -> Result<(), DomainError> {
        self.transfers.lock().unwrap().push(request.clone());
        Ok(())
    }
}

/// A hub client whose every call is refused.
#[derive(Debug)]
pub struct FailingHubClient;

#[async_trait]
impl HubClient for FailingHubClient {
    async fn register(
        &self,
        _hub_url: &str,
        _request: &RegisterRequest,
    ) -> Result<RegisterResponse, DomainError> {
        Err(DomainError::Remote("connection refused".into()))
    }

    async fn transfer(&self, _hub_url: &str, _request: &TransferRequest) -> Result<(), DomainError> {
        Err(DomainError::Remote("hub refused transfer".into()))
    }
}
