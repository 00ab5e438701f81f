//! This crate provides two major things:
//!
//! 1. The types served by the beacon node's pool endpoints.
//! 2. A wrapper around `reqwest` that forms a HTTP client able to consume those endpoints.
//!
//! Eventually it would be ideal to publish this crate on crates.io, however we have some local
//! dependencies preventing this presently.

pub mod types;

use self::types::*;
use reqwest::{IntoUrl, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

pub use reqwest;

#[derive(Debug)]
pub enum Error {
    /// The `reqwest` client raised an error.
    HttpClient(reqwest::Error),
    /// The server returned an error message where the body was able to be parsed.
    ServerMessage(ErrorMessage),
    /// The server returned an error message where the body was unable to be parsed.
    StatusCode(StatusCode),
    /// The supplied URL is badly formatted. It should look something like `http://127.0.0.1:5052`.
    InvalidUrl(Url),
}

impl Error {
    /// If the error has a HTTP status code, return it.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::HttpClient(error) => error.status(),
            Error::ServerMessage(msg) => StatusCode::try_from(msg.code).ok(),
            Error::StatusCode(status) => Some(*status),
            Error::InvalidUrl(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The default timeout for requests to the beacon node.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(12);

/// A wrapper around `reqwest::Client` which provides convenience methods for interfacing with a
/// beacon node's pool endpoints.
#[derive(Clone)]
pub struct BeaconNodeHttpClient {
    client: reqwest::Client,
    server: Url,
    timeout: Duration,
}

impl fmt::Display for BeaconNodeHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.server)
    }
}

impl AsRef<str> for BeaconNodeHttpClient {
    fn as_ref(&self) -> &str {
        self.server.as_ref()
    }
}

impl BeaconNodeHttpClient {
    pub fn new(server: Url, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            server,
            timeout,
        }
    }

    pub fn from_components(server: Url, client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            client,
            server,
            timeout,
        }
    }

    /// Return the path with the standard `/eth/v1` prefix applied.
    fn eth_path(&self) -> Result<Url, Error> {
        let mut path = self.server.clone();

        path.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(self.server.clone()))?
            .push("eth")
            .push("v1");

        Ok(path)
    }

    /// `/eth/v1/beacon/pool/{pool}`
    fn pool_path(&self, pool: &str) -> Result<Url, Error> {
        let mut path = self.eth_path()?;

        path.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(self.server.clone()))?
            .push("beacon")
            .push("pool")
            .push(pool);

        Ok(path)
    }

    /// Perform a HTTP GET request, returning an `Error` on a non-200 status.
    async fn get<T: DeserializeOwned, U: IntoUrl>(&self, url: U) -> Result<T, Error> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(Error::HttpClient)?;
        ok_or_error(response)
            .await?
            .json()
            .await
            .map_err(Error::HttpClient)
    }

    /// Perform a HTTP POST request with a JSON body, discarding the response body.
    async fn post<T: Serialize, U: IntoUrl>(&self, url: U, body: &T) -> Result<(), Error> {
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(Error::HttpClient)?;
        ok_or_error(response).await?;
        Ok(())
    }

    /// `GET beacon/pool/attester_slashings`
    pub async fn get_beacon_pool_attester_slashings(
        &self,
    ) -> Result<GenericResponse<Vec<AttesterSlashing>>, Error> {
        self.get(self.pool_path("attester_slashings")?).await
    }

    /// `POST beacon/pool/attester_slashings`
    pub async fn post_beacon_pool_attester_slashings(
        &self,
        slashing: &AttesterSlashing,
    ) -> Result<(), Error> {
        self.post(self.pool_path("attester_slashings")?, slashing)
            .await
    }

    /// `GET beacon/pool/proposer_slashings`
    pub async fn get_beacon_pool_proposer_slashings(
        &self,
    ) -> Result<GenericResponse<Vec<ProposerSlashing>>, Error> {
        self.get(self.pool_path("proposer_slashings")?).await
    }

    /// `POST beacon/pool/proposer_slashings`
    pub async fn post_beacon_pool_proposer_slashings(
        &self,
        slashing: &ProposerSlashing,
    ) -> Result<(), Error> {
        self.post(self.pool_path("proposer_slashings")?, slashing)
            .await
    }

    /// `GET beacon/pool/voluntary_exits`
    pub async fn get_beacon_pool_voluntary_exits(
        &self,
    ) -> Result<GenericResponse<Vec<SignedVoluntaryExit>>, Error> {
        self.get(self.pool_path("voluntary_exits")?).await
    }

    /// `POST beacon/pool/voluntary_exits`
    pub async fn post_beacon_pool_voluntary_exits(
        &self,
        exit: &SignedVoluntaryExit,
    ) -> Result<(), Error> {
        self.post(self.pool_path("voluntary_exits")?, exit).await
    }
}

/// Returns `Ok(response)` if the response is a `200 OK` response. Otherwise, creates an
/// appropriate error message.
pub async fn ok_or_error(response: Response) -> Result<Response, Error> {
    let status = response.status();

    if status == StatusCode::OK {
        Ok(response)
    } else if let Ok(message) = response.json().await {
        Err(Error::ServerMessage(message))
    } else {
        Err(Error::StatusCode(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_paths() {
        let client = BeaconNodeHttpClient::new(
            Url::parse("http://127.0.0.1:5052").unwrap(),
            DEFAULT_TIMEOUT,
        );
        assert_eq!(
            client.pool_path("voluntary_exits").unwrap().as_str(),
            "http://127.0.0.1:5052/eth/v1/beacon/pool/voluntary_exits"
        );

        let client = BeaconNodeHttpClient::new(
            Url::parse("http://localhost:5052/prefix").unwrap(),
            DEFAULT_TIMEOUT,
        );
        assert_eq!(
            client.pool_path("attester_slashings").unwrap().as_str(),
            "http://localhost:5052/prefix/eth/v1/beacon/pool/attester_slashings"
        );
    }

    #[test]
    fn rejects_cannot_be_a_base_url() {
        let client =
            BeaconNodeHttpClient::new(Url::parse("mailto:node@example.com").unwrap(), DEFAULT_TIMEOUT);
        assert!(matches!(
            client.pool_path("voluntary_exits"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn server_message_status() {
        let error = Error::ServerMessage(ErrorMessage {
            code: 400,
            message: "BAD_REQUEST: invalid object".to_string(),
            stacktraces: vec![],
        });
        assert_eq!(error.status(), Some(StatusCode::BAD_REQUEST));
    }
}
