use crate::models::address::Address;
use crate::seed::SeedHandleError;

/// Failure of a single request to a single node.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum NodeError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("node rejected `{command}` with status {status}: {message}")]
    Rejected {
        command: &'static str,
        status: u16,
        message: String,
    },

    #[error("malformed `{command}` response: {reason}")]
    MalformedResponse {
        command: &'static str,
        reason: String,
    },

    #[error("`{command}` answered for {actual} addresses, {expected} were asked")]
    LengthMismatch {
        command: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("node unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LedgerError {
    /// The primary endpoint failed and so did the fallback, if any. `source`
    /// is the last error seen.
    #[error("`{operation}` failed, last attempt against {endpoint}")]
    EndpointUnavailable {
        operation: &'static str,
        endpoint: String,
        #[source]
        source: NodeError,
    },

    #[error("input {address} declares a balance of {declared} but the ledger holds {ledger}")]
    InputBalanceMismatch {
        address: Address,
        declared: u64,
        ledger: u64,
    },

    #[error(transparent)]
    Seed(#[from] SeedHandleError),
}
