use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

use itertools::Itertools;

use crate::crypto::kerl::HASH_LENGTH_TRITS;
use crate::crypto::Kerl;
use crate::models::address::Address;
use crate::models::address::KeyIndex;
use crate::models::security_level::SecurityLevel;
use crate::models::transaction::Transaction;
use crate::models::transaction::HASH_LENGTH;
use crate::models::transaction::SIGNATURE_FRAGMENT_LENGTH;
use crate::models::transaction::TAG_LENGTH;
use crate::models::transfer::Input;
use crate::models::transfer::Transfer;
use crate::models::trytes;
use crate::seed::signer::SeedSigner;
use crate::seed::signer::SignerError;
use crate::seed::SeedSecret;

/// Deterministic in-process signer.
///
/// Addresses are Kerl hashes of the seed and key index, so distinct seeds and
/// indexes give distinct addresses. Signing builds a structurally valid,
/// balanced bundle with empty signature fragments.
#[derive(Debug, Default)]
pub(crate) struct MockSigner {
    generated: Mutex<Vec<KeyIndex>>,
    sign_calls: AtomicUsize,
    failing: AtomicBool,
    skim: Mutex<Option<u64>>,
}

impl MockSigner {
    pub(crate) fn address_at(seed: &str, index: KeyIndex, security: SecurityLevel) -> Address {
        let mut trits = trytes::trytes_to_trits(seed).unwrap();
        let position = i64::try_from(index).unwrap() * 4 + i64::from(security.as_u8());
        trits.extend(trytes::int_to_trits(position, HASH_LENGTH_TRITS));
        let hash = Kerl::hash(&trits).unwrap();
        trytes::trits_to_trytes(&hash).unwrap().parse().unwrap()
    }

    /// Every key index an address was generated for, in request order.
    pub(crate) fn generated_indexes(&self) -> Vec<KeyIndex> {
        self.generated.lock().unwrap().clone()
    }

    pub(crate) fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    /// Makes every following job fail the way a crashed signer process does.
    pub(crate) fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Diverts `amount` of the first output to an address nobody asked for.
    pub(crate) fn skim(&self, amount: u64) {
        *self.skim.lock().unwrap() = Some(amount);
    }

    fn check_failing(&self, job: &'static str) -> Result<(), SignerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SignerError::Failed {
                job,
                status: "exit status: 1".to_owned(),
                stderr: "mock failure".to_owned(),
            });
        }
        Ok(())
    }

    fn bundle(&self, transfers: &[Transfer], inputs: &[Input]) -> Vec<String> {
        let mut outputs = transfers
            .iter()
            .map(|transfer| (transfer.destination.clone(), transfer.value))
            .collect_vec();
        if let (Some(amount), Some(first)) = (*self.skim.lock().unwrap(), outputs.first_mut()) {
            first.1 -= amount;
            outputs.push(("Z".repeat(HASH_LENGTH).parse().unwrap(), amount));
        }

        let mut entries: Vec<(Address, i64)> = outputs
            .into_iter()
            .map(|(address, value)| (address, i64::try_from(value).unwrap()))
            .collect();
        for input in inputs {
            entries.push((input.address.clone(), -i64::try_from(input.balance).unwrap()));
            for _ in 1..input.security.signature_fragments() {
                entries.push((input.address.clone(), 0));
            }
        }

        let last_index = entries.len() as u64 - 1;
        let mut transactions = entries
            .into_iter()
            .enumerate()
            .map(|(index, (address, value))| Transaction {
                hash: String::new(),
                signature_message_fragment: "9".repeat(SIGNATURE_FRAGMENT_LENGTH),
                address,
                value,
                obsolete_tag: "9".repeat(TAG_LENGTH),
                timestamp: 1_585_000_000,
                current_index: index as u64,
                last_index,
                bundle: "9".repeat(HASH_LENGTH),
                trunk_transaction: "9".repeat(HASH_LENGTH),
                branch_transaction: "9".repeat(HASH_LENGTH),
                tag: "9".repeat(TAG_LENGTH),
                attachment_timestamp: 0,
                attachment_timestamp_lower_bound: 0,
                attachment_timestamp_upper_bound: 0,
                nonce: "9".repeat(TAG_LENGTH),
            })
            .collect_vec();

        let essence = transactions
            .iter()
            .flat_map(|tx| tx.essence_trits().unwrap())
            .collect_vec();
        let bundle_hash = trytes::trits_to_trytes(&Kerl::hash(&essence).unwrap()).unwrap();
        for tx in &mut transactions {
            tx.bundle = bundle_hash.clone();
        }

        transactions
            .iter()
            .map(|tx| tx.to_trytes().unwrap())
            .collect()
    }
}

#[async_trait::async_trait]
impl SeedSigner for MockSigner {
    async fn generate_addresses(
        &self,
        seed: &SeedSecret,
        index: KeyIndex,
        count: usize,
        security: SecurityLevel,
    ) -> Result<Vec<Address>, SignerError> {
        self.check_failing("gen")?;
        let indexes = (index..index + u64::try_from(count).unwrap()).collect_vec();
        self.generated.lock().unwrap().extend(&indexes);
        Ok(indexes
            .into_iter()
            .map(|i| Self::address_at(seed.expose_trytes(), i, security))
            .collect())
    }

    async fn sign_transfers(
        &self,
        _seed: &SeedSecret,
        transfers: &[Transfer],
        inputs: &[Input],
    ) -> Result<Vec<String>, SignerError> {
        self.check_failing("sign")?;
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.bundle(transfers, inputs))
    }
}
