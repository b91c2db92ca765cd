use std::future::Future;

use itertools::Itertools;
use tracing::debug;
use tracing::warn;

use super::LedgerError;
use super::LedgerNode;
use super::NodeError;
use crate::models::address::Address;
use crate::models::address_record::AddressBatchStatus;
use crate::models::address_record::AddressQueryResult;
use crate::models::transfer::Input;
use crate::models::transfer::Transfer;
use crate::seed::SeedLease;

/// Confirmation threshold, in percent, for balance queries.
pub const BALANCE_THRESHOLD: u8 = 100;

/// Ledger access with a single fallback.
///
/// Every query goes to the primary node first. If that fails, the same query
/// is sent once to the fallback node. There is no backoff and no further
/// retry.
#[derive(Debug, Clone)]
pub struct LedgerClient<N> {
    primary: N,
    fallback: Option<N>,
}

impl<N: LedgerNode> LedgerClient<N> {
    pub fn new(primary: N) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    /// A fallback pointing at the primary's own endpoint is ignored.
    pub fn with_fallback(primary: N, fallback: N) -> Self {
        let fallback = (fallback.endpoint() != primary.endpoint()).then_some(fallback);
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &N {
        &self.primary
    }

    pub fn fallback(&self) -> Option<&N> {
        self.fallback.as_ref()
    }

    async fn with_retry<'a, T, F, Fut>(
        &'a self,
        operation: &'static str,
        call: F,
    ) -> Result<T, LedgerError>
    where
        F: Fn(&'a N) -> Fut,
        Fut: Future<Output = Result<T, NodeError>>,
    {
        let primary_error = match call(&self.primary).await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            return Err(LedgerError::EndpointUnavailable {
                operation,
                endpoint: self.primary.endpoint().to_owned(),
                source: primary_error,
            });
        };

        warn!(
            "`{}` failed on {}: {}. Retrying on {}",
            operation,
            self.primary.endpoint(),
            primary_error,
            fallback.endpoint()
        );
        call(fallback)
            .await
            .map_err(|source| LedgerError::EndpointUnavailable {
                operation,
                endpoint: fallback.endpoint().to_owned(),
                source,
            })
    }

    /// True if any transaction touches any of `addresses`.
    pub async fn has_activity(&self, addresses: &[Address]) -> Result<bool, LedgerError> {
        let hashes = self
            .with_retry("findTransactions", |node| node.find_transactions(addresses))
            .await?;
        Ok(!hashes.is_empty())
    }

    pub async fn balances_of(&self, addresses: &[Address]) -> Result<Vec<u64>, LedgerError> {
        self.with_retry("getBalances", |node| async move {
            let balances = node.get_balances(addresses, BALANCE_THRESHOLD).await?;
            ensure_one_per_address("getBalances", addresses, &balances)?;
            Ok(balances)
        })
        .await
    }

    pub async fn spent_status_of(&self, addresses: &[Address]) -> Result<Vec<bool>, LedgerError> {
        self.with_retry("wereAddressesSpentFrom", |node| async move {
            let states = node.were_addresses_spent_from(addresses).await?;
            ensure_one_per_address("wereAddressesSpentFrom", addresses, &states)?;
            Ok(states)
        })
        .await
    }

    /// Activity, balances and spent status of a batch, queried concurrently.
    /// Fails as soon as any of the three fails.
    pub async fn query_addresses(
        &self,
        addresses: &[Address],
    ) -> Result<AddressBatchStatus, LedgerError> {
        let (has_activity, balances, spent) = tokio::try_join!(
            self.has_activity(addresses),
            self.balances_of(addresses),
            self.spent_status_of(addresses),
        )?;

        let results = addresses
            .iter()
            .zip_eq(balances.into_iter().zip_eq(spent))
            .map(|(address, (balance, spent))| AddressQueryResult {
                address: address.clone(),
                balance,
                spent,
            })
            .collect_vec();

        debug!(
            "batch of {} addresses: activity {}, balance {}",
            results.len(),
            has_activity,
            results.iter().map(|r| r.balance).sum::<u64>()
        );
        Ok(AddressBatchStatus {
            has_activity,
            results,
        })
    }

    /// Checks every declared input balance against the ledger, then has the
    /// seed sign `transfers` from exactly `inputs`.
    ///
    /// The signing itself is never retried.
    pub async fn sign_transfer(
        &self,
        seed: &SeedLease<'_>,
        transfers: &[Transfer],
        inputs: &[Input],
    ) -> Result<Vec<String>, LedgerError> {
        let addresses = inputs.iter().map(|input| input.address.clone()).collect_vec();
        let ledger_balances = self.balances_of(&addresses).await?;

        if let Some((input, ledger)) = inputs
            .iter()
            .zip(ledger_balances)
            .find(|(input, ledger)| input.balance != *ledger)
        {
            return Err(LedgerError::InputBalanceMismatch {
                address: input.address.clone(),
                declared: input.balance,
                ledger,
            });
        }

        debug!(
            "signing {} transfer(s) from {} input(s)",
            transfers.len(),
            inputs.len()
        );
        Ok(seed.sign(transfers, inputs).await?)
    }
}

fn ensure_one_per_address<T>(
    command: &'static str,
    addresses: &[Address],
    answers: &[T],
) -> Result<(), NodeError> {
    if answers.len() != addresses.len() {
        return Err(NodeError::LengthMismatch {
            command,
            expected: addresses.len(),
            actual: answers.len(),
        });
    }
    Ok(())
}
