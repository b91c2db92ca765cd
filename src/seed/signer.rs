use std::time::Duration;

use crate::models::address::Address;
use crate::models::address::KeyIndex;
use crate::models::security_level::SecurityLevel;
use crate::models::transfer::Input;
use crate::models::transfer::Transfer;

use super::SeedSecret;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SignerError {
    #[error("could not run signer: {0}")]
    Io(#[from] std::io::Error),

    #[error("signer job `{job}` timed out after {}", humantime::format_duration(*.timeout))]
    Timeout { job: &'static str, timeout: Duration },

    #[error("signer job `{job}` failed ({status}): {stderr}")]
    Failed {
        job: &'static str,
        status: String,
        stderr: String,
    },

    #[error("signer returned malformed output: {0}")]
    MalformedOutput(#[from] serde_json::Error),

    #[error("signer returned {actual} addresses, {expected} were requested")]
    AddressCountMismatch { expected: usize, actual: usize },
}

/// The out-of-process capability that holds a seed's key material.
///
/// Implementations derive addresses and produce signed transaction trytes.
/// They are the only code that ever reads a [`SeedSecret`].
#[async_trait::async_trait]
pub trait SeedSigner: Send + Sync + std::fmt::Debug {
    /// Addresses at key indexes `index..index + count`, in order.
    async fn generate_addresses(
        &self,
        seed: &SeedSecret,
        index: KeyIndex,
        count: usize,
        security: SecurityLevel,
    ) -> Result<Vec<Address>, SignerError>;

    /// Signs a bundle paying `transfers` from exactly `inputs`. The signer
    /// must not pick inputs of its own.
    async fn sign_transfers(
        &self,
        seed: &SeedSecret,
        transfers: &[Transfer],
        inputs: &[Input],
    ) -> Result<Vec<String>, SignerError>;
}
