use itertools::Itertools;
use tracing::debug;
use tracing::info;

use super::record_builder;
use super::MigrationError;
use crate::ledger::LedgerClient;
use crate::ledger::LedgerNode;
use crate::models::address::Address;
use crate::models::address::KeyIndex;
use crate::models::address_record::AddressQueryResult;
use crate::models::address_record::AddressRecord;
use crate::models::security_level::SecurityLevel;
use crate::seed::signer::SignerError;
use crate::seed::SeedHandleError;
use crate::seed::SeedLease;

pub const DEFAULT_BATCH_SIZE: usize = 10;

pub const DEFAULT_SEARCH_BATCH_SIZE: usize = 20;

/// How a seed's addresses are scanned.
///
/// ```notest
/// let configuration = ScanConfiguration::scan().in_batches_of(5).at_security(SecurityLevel::High);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfiguration {
    batch_size: usize,
    search_batch_size: usize,
    security: SecurityLevel,
}

impl Default for ScanConfiguration {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            search_batch_size: DEFAULT_SEARCH_BATCH_SIZE,
            security: SecurityLevel::default(),
        }
    }
}

impl ScanConfiguration {
    pub fn scan() -> Self {
        Default::default()
    }

    /// Addresses generated and queried per step of the forward scan. At
    /// least one.
    pub fn in_batches_of(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Addresses generated by one call to [`AddressScanner::search_more`]. At
    /// least one.
    pub fn searching_ahead(mut self, search_batch_size: usize) -> Self {
        self.search_batch_size = search_batch_size.max(1);
        self
    }

    pub fn at_security(mut self, security: SecurityLevel) -> Self {
        self.security = security;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn search_batch_size(&self) -> usize {
        self.search_batch_size
    }

    pub fn security(&self) -> SecurityLevel {
        self.security
    }
}

/// Discovers which addresses of a seed the ledger knows about.
#[derive(Debug)]
pub struct AddressScanner<'a, N> {
    ledger: &'a LedgerClient<N>,
    configuration: ScanConfiguration,
}

impl<'a, N: LedgerNode> AddressScanner<'a, N> {
    pub fn new(ledger: &'a LedgerClient<N>, configuration: ScanConfiguration) -> Self {
        Self {
            ledger,
            configuration,
        }
    }

    /// Every address of the seed with any history, from index 0 and without
    /// gaps, followed by exactly one unused address.
    ///
    /// The scan walks forward in batches until a batch shows no sign of use at
    /// all. Because a batch is judged as a whole, the last active batch may
    /// end in unused addresses; those are then trimmed one by one from the
    /// back. The first unused address is the one the seed would hand out
    /// next.
    pub async fn full_address_history(
        &self,
        seed: &SeedLease<'_>,
    ) -> Result<Vec<AddressQueryResult>, MigrationError> {
        let batch_size = self.configuration.batch_size;
        let security = self.configuration.security;

        let mut history: Vec<AddressQueryResult> = vec![];
        let mut index: KeyIndex = 0;
        let mut next_unused = loop {
            let addresses = seed.generate_addresses(index, batch_size, security).await?;
            let batch = self.ledger.query_addresses(&addresses).await?;
            debug!(
                "batch at key index {}: {}",
                index,
                if batch.is_active() { "active" } else { "unused" }
            );

            if batch.is_unused() {
                let first = addresses.into_iter().next();
                break first.ok_or(SeedHandleError::Signer(
                    SignerError::AddressCountMismatch {
                        expected: batch_size,
                        actual: 0,
                    },
                ))?;
            }
            history.extend(batch.results);
            index += batch_size as KeyIndex;
        };
        info!(
            "forward scan stopped at key index {} with {} addresses",
            index,
            history.len()
        );

        while let Some(last) = history.last() {
            if self.is_used(&last.address).await? {
                break;
            }
            if let Some(unused) = history.pop() {
                debug!("trimmed unused address at key index {}", history.len());
                next_unused = unused.address;
            }
        }

        info!(
            "{} used addresses, next unused address at key index {}",
            history.len(),
            history.len()
        );
        history.push(AddressQueryResult::unused(next_unused));
        Ok(history)
    }

    /// [`Self::full_address_history`] as address records.
    pub async fn sync_account(
        &self,
        seed: &SeedLease<'_>,
    ) -> Result<Vec<AddressRecord>, MigrationError> {
        let history = self.full_address_history(seed).await?;
        record_builder::assemble(history, None)
    }

    /// The batch of addresses following the highest known key index, for
    /// when a seed's funds sit past the first gap.
    pub async fn search_more(
        &self,
        seed: &SeedLease<'_>,
        known: &[AddressRecord],
    ) -> Result<Vec<AddressRecord>, MigrationError> {
        let start = known
            .iter()
            .map(|record| record.key_index)
            .max()
            .map_or(0, |highest| highest + 1);
        let count = self.configuration.search_batch_size;
        let key_indexes = (start..start + count as KeyIndex).collect_vec();
        info!("searching key indexes {}..{}", start, start + count as KeyIndex);

        let addresses = seed
            .generate_addresses(start, count, self.configuration.security)
            .await?;
        let batch = self.ledger.query_addresses(&addresses).await?;
        record_builder::assemble(batch.results, Some(&key_indexes))
    }

    async fn is_used(&self, address: &Address) -> Result<bool, MigrationError> {
        let status = self
            .ledger
            .query_addresses(std::slice::from_ref(address))
            .await?;
        Ok(status.is_active())
    }
}

/// Address data for a seed that has never been used, such as a freshly
/// generated destination seed: its first address, unfunded.
pub async fn export_seed_address_data(
    seed: &SeedLease<'_>,
    security: SecurityLevel,
) -> Result<Vec<AddressRecord>, MigrationError> {
    let addresses = seed.generate_addresses(0, 1, security).await?;
    let results = addresses
        .into_iter()
        .map(AddressQueryResult::unused)
        .collect();
    record_builder::assemble(results, Some(&[0]))
}
