use tracing::info;

use super::balance;
use super::MigrationError;
use crate::ledger::LedgerClient;
use crate::ledger::LedgerNode;
use crate::models::address_record::AddressRecord;
use crate::models::iotas::Iotas;
use crate::models::security_level::SecurityLevel;
use crate::models::transaction::SignedBundle;
use crate::models::transfer::Transfer;
use crate::seed::SeedLease;

/// Builds the one bundle that empties a seed into another.
#[derive(Debug)]
pub struct BundleComposer<'a, N> {
    ledger: &'a LedgerClient<N>,
    security: SecurityLevel,
}

impl<'a, N: LedgerNode> BundleComposer<'a, N> {
    pub fn new(ledger: &'a LedgerClient<N>, security: SecurityLevel) -> Self {
        Self { ledger, security }
    }

    /// Moves the whole balance of `source_records` to the highest-indexed
    /// address among `destination_records`, signed by `source`.
    ///
    /// The returned bundle has been parsed back and checked to pay exactly
    /// that one transfer.
    pub async fn compose_migration(
        &self,
        source: &SeedLease<'_>,
        source_records: &[AddressRecord],
        destination_records: &[AddressRecord],
    ) -> Result<SignedBundle, MigrationError> {
        let total = balance::total_balance(source_records)?;
        if total == 0 {
            return Err(MigrationError::NothingToMigrate);
        }

        let inputs = balance::spendable_inputs(source_records, self.security);
        let destination = balance::highest_key_index_record(destination_records)
            .ok_or(MigrationError::NoDestinationAddress)?;
        let transfer = Transfer::new(destination.address.clone(), total);

        info!(
            "moving {} from {} input(s) to {} (key index {})",
            Iotas(total),
            inputs.len(),
            destination.address.with_checksum(),
            destination.key_index
        );

        let trytes = self
            .ledger
            .sign_transfer(source, std::slice::from_ref(&transfer), &inputs)
            .await?;
        let bundle = SignedBundle::from_trytes(trytes)?;

        if !bundle.reconstructs(std::slice::from_ref(&transfer)) {
            return Err(MigrationError::BundleMismatch {
                destination: transfer.destination.to_string(),
                value: total,
            });
        }

        info!(
            "prepared bundle {} with {} transactions",
            bundle.bundle_hash().unwrap_or("(inconsistent)"),
            bundle.transactions().len()
        );
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use assert2::assert;
    use assert2::let_assert;

    use super::*;
    use crate::ledger::LedgerError;
    use crate::migration::record_builder;
    use crate::migration::RecoveryAction;
    use crate::models::address::KeyIndex;
    use crate::models::address_record::AddressQueryResult;
    use crate::models::transaction::Transaction;
    use crate::seed::SeedHandleError;
    use crate::tests::shared::mock_node::MockNode;
    use crate::tests::shared::mock_seed_handle;
    use crate::tests::shared::mock_signer::MockSigner;

    fn records_of(seed: char, balances: &[u64]) -> Vec<AddressRecord> {
        let results = balances
            .iter()
            .enumerate()
            .map(|(index, balance)| AddressQueryResult {
                address: MockSigner::address_at(
                    &seed.to_string().repeat(81),
                    index as KeyIndex,
                    SecurityLevel::Medium,
                ),
                balance: *balance,
                spent: false,
            })
            .collect();
        record_builder::assemble(results, None).unwrap()
    }

    fn funded_ledger(records: &[AddressRecord]) -> LedgerClient<MockNode> {
        let ledger = LedgerClient::new(MockNode::new("http://node"));
        for record in records.iter().filter(|r| r.balance > 0) {
            ledger.primary().fund(&record.address, record.balance);
        }
        ledger
    }

    #[tokio::test]
    async fn whole_balance_goes_to_the_highest_destination_address() {
        let source_records = records_of('S', &[500, 0, 1000, 320]);
        let destination_records = records_of('D', &[0, 0, 0]);
        let ledger = funded_ledger(&source_records);
        let (handle, signer) = mock_seed_handle('S');
        let lease = handle.lease().unwrap();

        let composer = BundleComposer::new(&ledger, SecurityLevel::Medium);
        let bundle = composer
            .compose_migration(&lease, &source_records, &destination_records)
            .await
            .unwrap();

        assert!(signer.sign_calls() == 1);
        assert!(bundle.value_sum() == 0);
        let outputs = bundle.transfers();
        assert!(outputs.len() == 1);
        assert!(outputs[0].value == 1820);
        assert!(outputs[0].destination == destination_records[2].address);

        // inputs are the funded addresses only, in order
        let spent_from: Vec<_> = bundle
            .transactions()
            .iter()
            .filter(|tx| tx.value < 0)
            .map(|tx| (tx.address.clone(), tx.value))
            .collect();
        assert!(
            spent_from
                == vec![
                    (source_records[0].address.clone(), -500),
                    (source_records[2].address.clone(), -1000),
                    (source_records[3].address.clone(), -320),
                ]
        );

        // raw and parsed forms agree
        let reparsed: Vec<Transaction> = bundle
            .trytes()
            .iter()
            .map(|raw| Transaction::from_trytes(raw).unwrap())
            .collect();
        assert!(reparsed == bundle.transactions());
        assert!(bundle.bundle_hash().is_some());
    }

    #[tokio::test]
    async fn empty_seed_has_nothing_to_migrate() {
        let source_records = records_of('S', &[0, 0]);
        let ledger = funded_ledger(&source_records);
        let (handle, signer) = mock_seed_handle('S');
        let lease = handle.lease().unwrap();

        let result = BundleComposer::new(&ledger, SecurityLevel::Medium)
            .compose_migration(&lease, &source_records, &records_of('D', &[0]))
            .await;

        let_assert!(Err(MigrationError::NothingToMigrate) = result);
        assert!(signer.sign_calls() == 0);
    }

    #[tokio::test]
    async fn destination_is_required() {
        let source_records = records_of('S', &[10]);
        let ledger = funded_ledger(&source_records);
        let (handle, _signer) = mock_seed_handle('S');
        let lease = handle.lease().unwrap();

        let result = BundleComposer::new(&ledger, SecurityLevel::Medium)
            .compose_migration(&lease, &source_records, &[])
            .await;

        let_assert!(Err(MigrationError::NoDestinationAddress) = result);
    }

    #[tokio::test]
    async fn tampered_bundle_is_refused() {
        let source_records = records_of('S', &[10, 20]);
        let ledger = funded_ledger(&source_records);
        let (handle, signer) = mock_seed_handle('S');
        signer.skim(5);
        let lease = handle.lease().unwrap();

        let result = BundleComposer::new(&ledger, SecurityLevel::Medium)
            .compose_migration(&lease, &source_records, &records_of('D', &[0]))
            .await;

        let_assert!(Err(MigrationError::BundleMismatch { value: 30, .. }) = result);
    }

    #[tokio::test]
    async fn crashed_signer_asks_for_a_retry() {
        let source_records = records_of('S', &[10, 20]);
        let ledger = funded_ledger(&source_records);
        let (handle, signer) = mock_seed_handle('S');
        signer.fail();
        let lease = handle.lease().unwrap();

        let result = BundleComposer::new(&ledger, SecurityLevel::Medium)
            .compose_migration(&lease, &source_records, &records_of('D', &[0]))
            .await;

        let_assert!(Err(error) = result);
        let_assert!(MigrationError::Ledger(LedgerError::Seed(SeedHandleError::Signer(_))) = &error);
        assert!(error.recovery_action() == RecoveryAction::RetryLater);
        assert!(signer.sign_calls() == 0);
    }

    #[tokio::test]
    async fn ledger_disagreeing_with_records_stops_signing() {
        let source_records = records_of('S', &[10, 20]);
        let ledger = funded_ledger(&source_records);
        ledger.primary().spend(&source_records[1].address);
        let (handle, signer) = mock_seed_handle('S');
        let lease = handle.lease().unwrap();

        let result = BundleComposer::new(&ledger, SecurityLevel::Medium)
            .compose_migration(&lease, &source_records, &records_of('D', &[0]))
            .await;

        let_assert!(Err(error) = result);
        assert!(error.recovery_action() == RecoveryAction::EscalateToSupport);
        assert!(signer.sign_calls() == 0);
    }
}
