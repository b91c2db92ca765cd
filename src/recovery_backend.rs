//! Client for the service that tracks migration bundles after they are
//! signed.
use std::time::Duration;

use itertools::Itertools;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

pub const DEFAULT_BACKEND_URL: &str = "https://backend-ng.iota.org";

/// Most bundle hashes one status request may carry.
pub const MAX_BUNDLE_HASHES: usize = 25;

const AGENT: &str = concat!("seed-migration/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend refused request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("backend returned {actual} states for {expected} bundles")]
    StateCountMismatch { expected: usize, actual: usize },
}

/// Where a submitted bundle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BundleState {
    Submitted,
    Pending,
    Confirmed,

    /// Held until the owner completes identity verification.
    Kyc,
}

#[derive(Debug, Serialize)]
struct SaveBundleRequest<'a> {
    raw_trytes: &'a [String],
    agent: &'a str,
}

#[derive(Debug, Serialize)]
struct BundleStatesRequest<'a> {
    bundle_hashes: &'a [String],
}

#[derive(Debug, Deserialize)]
struct BundleStatesResponse {
    states: Vec<BundleState>,
}

#[derive(Debug, Clone)]
pub struct RecoveryBackend {
    url: String,
    client: Client,
}

impl RecoveryBackend {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        let url: String = url.into();
        Ok(Self {
            url: url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, BackendError> {
        let url = format!("{}/bundle/{}", self.url, path);
        debug!("POST {}", url);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message: message.trim().to_owned(),
            });
        }
        Ok(response)
    }

    /// Hands the signed trytes of a bundle to the backend for tracking.
    pub async fn save_bundle(
        &self,
        bundle_hash: &str,
        trytes: &[String],
    ) -> Result<(), BackendError> {
        self.post(
            &format!("save/{}", bundle_hash),
            &SaveBundleRequest {
                raw_trytes: trytes,
                agent: AGENT,
            },
        )
        .await?;
        info!("bundle {} saved with the recovery backend", bundle_hash);
        Ok(())
    }

    /// Current state of each bundle, in the order asked. Large requests are
    /// split into chunks of [`MAX_BUNDLE_HASHES`].
    pub async fn bundle_states(
        &self,
        bundle_hashes: &[String],
    ) -> Result<Vec<(String, BundleState)>, BackendError> {
        let mut states = Vec::with_capacity(bundle_hashes.len());
        for chunk in bundle_hashes.chunks(MAX_BUNDLE_HASHES) {
            let response: BundleStatesResponse = self
                .post(
                    "states",
                    &BundleStatesRequest {
                        bundle_hashes: chunk,
                    },
                )
                .await?
                .json()
                .await?;
            states.extend(pair_states(chunk, response.states)?);
        }
        Ok(states)
    }
}

fn pair_states(
    bundle_hashes: &[String],
    states: Vec<BundleState>,
) -> Result<Vec<(String, BundleState)>, BackendError> {
    if states.len() != bundle_hashes.len() {
        return Err(BackendError::StateCountMismatch {
            expected: bundle_hashes.len(),
            actual: states.len(),
        });
    }
    Ok(bundle_hashes.iter().cloned().zip_eq(states).collect())
}
