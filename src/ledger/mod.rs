//! Access to the ledger through remote nodes.
//!
//! A [`LedgerNode`] speaks to one endpoint. A [`LedgerClient`] combines a
//! primary node with an optional fallback node and is what the rest of the
//! crate talks to.
pub mod error;
pub mod http_node;
pub mod ledger_client;

use crate::models::address::Address;

pub use error::LedgerError;
pub use error::NodeError;
pub use http_node::HttpNode;
pub use ledger_client::LedgerClient;

/// The read surface of a single ledger node.
///
/// Every method answers for the addresses in the given order. Implementations
/// do not retry; that is the job of [`LedgerClient`].
#[async_trait::async_trait]
pub trait LedgerNode: Send + Sync + std::fmt::Debug {
    /// Where this node lives, for logs and error messages.
    fn endpoint(&self) -> &str;

    /// Hashes of all transactions touching any of `addresses`.
    async fn find_transactions(&self, addresses: &[Address]) -> Result<Vec<String>, NodeError>;

    /// Confirmed balance of each address, counting only milestones the node
    /// is at least `threshold` percent confident in.
    async fn get_balances(
        &self,
        addresses: &[Address],
        threshold: u8,
    ) -> Result<Vec<u64>, NodeError>;

    /// Whether each address has ever been spent from.
    async fn were_addresses_spent_from(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<bool>, NodeError>;
}
