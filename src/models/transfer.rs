use serde::Deserialize;
use serde::Serialize;

use super::address::Address;
use super::address::KeyIndex;
use super::security_level::SecurityLevel;

/// A single payment to one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    #[serde(rename = "address")]
    pub destination: Address,
    pub value: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Transfer {
    pub fn new(destination: Address, value: u64) -> Self {
        Self {
            destination,
            value,
            message: None,
            tag: None,
        }
    }
}

/// Authorization to spend the whole balance of one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    pub address: Address,
    pub key_index: KeyIndex,
    pub balance: u64,
    pub security: SecurityLevel,
}
