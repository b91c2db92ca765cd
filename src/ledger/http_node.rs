use std::time::Duration;

use reqwest::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::LedgerNode;
use super::NodeError;
use crate::models::address::Address;

pub const DEFAULT_NODE: &str = "https://nodes-ng.iota.org";

pub const FALLBACK_NODE: &str = "https://nodes.iota.org";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const API_VERSION_HEADER: &str = "X-IOTA-API-Version";

const API_VERSION: &str = "1";

#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
enum NodeCommand<'a> {
    FindTransactions {
        addresses: &'a [Address],
    },
    GetBalances {
        addresses: &'a [Address],
        threshold: u8,
    },
    WereAddressesSpentFrom {
        addresses: &'a [Address],
    },
}

impl NodeCommand<'_> {
    fn name(&self) -> &'static str {
        match self {
            Self::FindTransactions { .. } => "findTransactions",
            Self::GetBalances { .. } => "getBalances",
            Self::WereAddressesSpentFrom { .. } => "wereAddressesSpentFrom",
        }
    }
}

#[derive(Debug, Deserialize)]
struct FindTransactionsResponse {
    hashes: Vec<String>,
}

/// Nodes report balances as decimal strings; some report plain numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Balance {
    Text(String),
    Number(u64),
}

#[derive(Debug, Deserialize)]
struct GetBalancesResponse {
    balances: Vec<Balance>,
}

#[derive(Debug, Deserialize)]
struct WereAddressesSpentFromResponse {
    states: Vec<bool>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// A ledger node reached over its JSON-over-HTTP API.
#[derive(Debug, Clone)]
pub struct HttpNode {
    url: String,
    client: Client,
}

impl HttpNode {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NodeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    async fn call<R: DeserializeOwned>(&self, command: &NodeCommand<'_>) -> Result<R, NodeError> {
        let name = command.name();
        debug!("sending `{}` to {}", name, self.url);

        let response = self
            .client
            .post(&self.url)
            .header(API_VERSION_HEADER, API_VERSION)
            .json(command)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        decode_response(name, status, &body)
    }
}

fn decode_response<R: DeserializeOwned>(
    command: &'static str,
    status: StatusCode,
    body: &[u8],
) -> Result<R, NodeError> {
    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorResponse>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| String::from_utf8_lossy(body).trim().to_owned());
        return Err(NodeError::Rejected {
            command,
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(body).map_err(|e| NodeError::MalformedResponse {
        command,
        reason: e.to_string(),
    })
}

fn parse_balances(response: GetBalancesResponse) -> Result<Vec<u64>, NodeError> {
    response
        .balances
        .into_iter()
        .map(|balance| match balance {
            Balance::Number(n) => Ok(n),
            Balance::Text(text) => text.parse().map_err(|_| NodeError::MalformedResponse {
                command: "getBalances",
                reason: format!("balance {:?} is not a non-negative integer", text),
            }),
        })
        .collect()
}

#[async_trait::async_trait]
impl LedgerNode for HttpNode {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn find_transactions(&self, addresses: &[Address]) -> Result<Vec<String>, NodeError> {
        let response: FindTransactionsResponse = self
            .call(&NodeCommand::FindTransactions { addresses })
            .await?;
        Ok(response.hashes)
    }

    async fn get_balances(
        &self,
        addresses: &[Address],
        threshold: u8,
    ) -> Result<Vec<u64>, NodeError> {
        let response: GetBalancesResponse = self
            .call(&NodeCommand::GetBalances {
                addresses,
                threshold,
            })
            .await?;
        parse_balances(response)
    }

    async fn were_addresses_spent_from(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<bool>, NodeError> {
        let response: WereAddressesSpentFromResponse = self
            .call(&NodeCommand::WereAddressesSpentFrom { addresses })
            .await?;
        Ok(response.states)
    }
}
