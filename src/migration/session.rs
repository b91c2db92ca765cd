use tracing::info;

use super::balance;
use super::scanner;
use super::AddressScanner;
use super::BundleComposer;
use super::MigrationError;
use super::ScanConfiguration;
use crate::ledger::LedgerClient;
use crate::ledger::LedgerNode;
use crate::models::address_record::AddressRecord;
use crate::models::iotas::Iotas;
use crate::models::transaction::SignedBundle;
use crate::seed::SeedHandle;
use crate::seed::SeedLease;

/// One migration from a source seed to a destination seed.
///
/// Holds exclusive leases on both seeds for as long as it lives, so neither
/// seed can take part in another migration at the same time. The steps are
/// run in order by the caller: sync both seeds, optionally search further on
/// the source, then prepare the bundle.
#[derive(Debug)]
pub struct MigrationSession<'a, N> {
    ledger: &'a LedgerClient<N>,
    configuration: ScanConfiguration,
    source_handle: &'a SeedHandle,
    destination_handle: &'a SeedHandle,
    source: SeedLease<'a>,
    destination: SeedLease<'a>,
    source_records: Vec<AddressRecord>,
    destination_records: Vec<AddressRecord>,
}

impl<'a, N: LedgerNode> MigrationSession<'a, N> {
    pub fn start(
        ledger: &'a LedgerClient<N>,
        configuration: ScanConfiguration,
        source_handle: &'a SeedHandle,
        destination_handle: &'a SeedHandle,
    ) -> Result<Self, MigrationError> {
        let source = source_handle.lease()?;
        let destination = destination_handle.lease()?;
        info!(
            "migration session started for seed {} to seed {}",
            source.checksum(),
            destination.checksum()
        );
        Ok(Self {
            ledger,
            configuration,
            source_handle,
            destination_handle,
            source,
            destination,
            source_records: vec![],
            destination_records: vec![],
        })
    }

    fn scanner(&self) -> AddressScanner<'a, N> {
        AddressScanner::new(self.ledger, self.configuration)
    }

    /// Scans the source seed from scratch and keeps its records.
    pub async fn sync_source(&mut self) -> Result<&[AddressRecord], MigrationError> {
        self.source_records = self.scanner().sync_account(&self.source).await?;
        info!(
            "source seed: {} addresses holding {}",
            self.source_records.len(),
            Iotas(balance::total_balance(&self.source_records)?)
        );
        Ok(&self.source_records)
    }

    /// Scans the destination seed from scratch and keeps its records.
    pub async fn sync_destination(&mut self) -> Result<&[AddressRecord], MigrationError> {
        self.destination_records = self.scanner().sync_account(&self.destination).await?;
        info!(
            "destination seed: {} addresses",
            self.destination_records.len()
        );
        Ok(&self.destination_records)
    }

    /// Uses the first address of the destination seed without scanning, for
    /// a destination seed that was just created.
    pub async fn use_fresh_destination(&mut self) -> Result<&[AddressRecord], MigrationError> {
        self.destination_records =
            scanner::export_seed_address_data(&self.destination, self.configuration.security())
                .await?;
        Ok(&self.destination_records)
    }

    /// Looks one batch beyond the known source addresses and adds what it
    /// finds. Returns the new records only.
    pub async fn search_more_source(&mut self) -> Result<&[AddressRecord], MigrationError> {
        let found = self
            .scanner()
            .search_more(&self.source, &self.source_records)
            .await?;
        info!(
            "search found {} more in {} addresses",
            Iotas(balance::total_balance(&found)?),
            found.len()
        );
        let known = self.source_records.len();
        self.source_records.extend(found);
        Ok(&self.source_records[known..])
    }

    pub fn source_records(&self) -> &[AddressRecord] {
        &self.source_records
    }

    pub fn destination_records(&self) -> &[AddressRecord] {
        &self.destination_records
    }

    pub fn source_balance(&self) -> Result<u64, MigrationError> {
        balance::total_balance(&self.source_records)
    }

    /// Signs the bundle moving everything from the source records to the
    /// destination records.
    pub async fn prepare_bundle(&self) -> Result<SignedBundle, MigrationError> {
        BundleComposer::new(self.ledger, self.configuration.security())
            .compose_migration(
                &self.source,
                &self.source_records,
                &self.destination_records,
            )
            .await
    }

    /// Ends the session. Both seed handles are closed for good.
    pub fn finish(self) {
        self.source_handle.close();
        self.destination_handle.close();
        info!("migration session finished");
    }
}
