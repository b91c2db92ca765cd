use serde::Deserialize;
use serde::Serialize;

use super::address::Address;
use super::address::Checksum;
use super::address::KeyIndex;

/// Everything the migration knows about one address of a seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRecord {
    pub address: Address,
    pub key_index: KeyIndex,
    pub balance: u64,
    pub spent: bool,
    pub checksum: Checksum,
}

/// Ledger state of one address as reported by a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressQueryResult {
    pub address: Address,
    pub balance: u64,
    pub spent: bool,
}

impl AddressQueryResult {
    /// An address the ledger has never seen.
    pub fn unused(address: Address) -> Self {
        Self {
            address,
            balance: 0,
            spent: false,
        }
    }
}

/// Combined ledger state of a batch of addresses.
///
/// Transaction existence is reported for the batch as a whole: the node
/// returns the hashes of all transactions touching any address in the batch,
/// not one entry per address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBatchStatus {
    pub has_activity: bool,
    pub results: Vec<AddressQueryResult>,
}

impl AddressBatchStatus {
    /// True if any address in the batch has a transaction, a balance, or has
    /// been spent from.
    pub fn is_active(&self) -> bool {
        self.has_activity
            || self
                .results
                .iter()
                .any(|result| result.balance > 0 || result.spent)
    }

    /// True only when all three checks come back clean.
    pub fn is_unused(&self) -> bool {
        !self.is_active()
    }
}
