#![allow(dead_code)]

pub mod logging;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use seed_migration::crypto::kerl::HASH_LENGTH_TRITS;
use seed_migration::crypto::Kerl;
use seed_migration::ledger::LedgerNode;
use seed_migration::ledger::NodeError;
use seed_migration::models::address::Address;
use seed_migration::models::address::KeyIndex;
use seed_migration::models::security_level::SecurityLevel;
use seed_migration::models::transaction::Transaction;
use seed_migration::models::transaction::HASH_LENGTH;
use seed_migration::models::transaction::SIGNATURE_FRAGMENT_LENGTH;
use seed_migration::models::transaction::TAG_LENGTH;
use seed_migration::models::transfer::Input;
use seed_migration::models::transfer::Transfer;
use seed_migration::models::trytes;
use seed_migration::seed::signer::SeedSigner;
use seed_migration::seed::signer::SignerError;
use seed_migration::seed::SeedHandle;
use seed_migration::seed::SeedSecret;
use seed_migration::seed::SEED_LENGTH;

#[derive(Debug, Clone, Default)]
struct Entry {
    transactions: usize,
    balance: u64,
    spent: bool,
}

/// A ledger node answering from memory.
#[derive(Debug, Default)]
pub struct MemoryNode {
    endpoint: String,
    entries: Mutex<HashMap<Address, Entry>>,
    down: bool,
}

impl MemoryNode {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_owned(),
            ..Default::default()
        }
    }

    /// A node that refuses every request.
    pub fn unreachable(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_owned(),
            down: true,
            ..Default::default()
        }
    }

    pub fn fund(&self, address: &Address, balance: u64) {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.entry(address.clone()).or_default();
        entry.transactions += 1;
        entry.balance += balance;
    }

    pub fn touch(&self, address: &Address) {
        self.fund(address, 0);
    }

    fn answer<T>(
        &self,
        addresses: &[Address],
        per_address: impl Fn(&Entry) -> T,
    ) -> Result<Vec<T>, NodeError> {
        if self.down {
            return Err(NodeError::Unavailable(self.endpoint.clone()));
        }
        let entries = self.entries.lock().unwrap();
        let empty = Entry::default();
        Ok(addresses
            .iter()
            .map(|address| per_address(entries.get(address).unwrap_or(&empty)))
            .collect())
    }
}

#[async_trait::async_trait]
impl LedgerNode for MemoryNode {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn find_transactions(&self, addresses: &[Address]) -> Result<Vec<String>, NodeError> {
        let counts = self.answer(addresses, |entry| entry.transactions)?;
        Ok(counts
            .into_iter()
            .flat_map(|count| std::iter::repeat("9".repeat(HASH_LENGTH)).take(count))
            .collect())
    }

    async fn get_balances(
        &self,
        addresses: &[Address],
        _threshold: u8,
    ) -> Result<Vec<u64>, NodeError> {
        self.answer(addresses, |entry| entry.balance)
    }

    async fn were_addresses_spent_from(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<bool>, NodeError> {
        self.answer(addresses, |entry| entry.spent)
    }
}

/// Signer deriving addresses as Kerl hashes of seed and key index. Bundles
/// are balanced and carry a real bundle hash, but no signatures.
#[derive(Debug, Default)]
pub struct HashingSigner;

impl HashingSigner {
    pub fn address_at(seed: &str, index: KeyIndex, security: SecurityLevel) -> Address {
        let mut trits = trytes::trytes_to_trits(seed).unwrap();
        let position = i64::try_from(index).unwrap() * 4 + i64::from(security.as_u8());
        trits.extend(trytes::int_to_trits(position, HASH_LENGTH_TRITS));
        let hash = Kerl::hash(&trits).unwrap();
        trytes::trits_to_trytes(&hash).unwrap().parse().unwrap()
    }
}

fn unsigned_transaction(address: Address, value: i64, current_index: u64) -> Transaction {
    Transaction {
        hash: String::new(),
        signature_message_fragment: "9".repeat(SIGNATURE_FRAGMENT_LENGTH),
        address,
        value,
        obsolete_tag: "9".repeat(TAG_LENGTH),
        timestamp: 1_585_000_000,
        current_index,
        last_index: 0,
        bundle: "9".repeat(HASH_LENGTH),
        trunk_transaction: "9".repeat(HASH_LENGTH),
        branch_transaction: "9".repeat(HASH_LENGTH),
        tag: "9".repeat(TAG_LENGTH),
        attachment_timestamp: 0,
        attachment_timestamp_lower_bound: 0,
        attachment_timestamp_upper_bound: 0,
        nonce: "9".repeat(TAG_LENGTH),
    }
}

#[async_trait::async_trait]
impl SeedSigner for HashingSigner {
    async fn generate_addresses(
        &self,
        seed: &SeedSecret,
        index: KeyIndex,
        count: usize,
        security: SecurityLevel,
    ) -> Result<Vec<Address>, SignerError> {
        Ok((index..index + u64::try_from(count).unwrap())
            .map(|i| Self::address_at(seed.expose_trytes(), i, security))
            .collect())
    }

    async fn sign_transfers(
        &self,
        _seed: &SeedSecret,
        transfers: &[Transfer],
        inputs: &[Input],
    ) -> Result<Vec<String>, SignerError> {
        let mut entries: Vec<(Address, i64)> = transfers
            .iter()
            .map(|transfer| {
                (
                    transfer.destination.clone(),
                    i64::try_from(transfer.value).unwrap(),
                )
            })
            .collect();
        for input in inputs {
            entries.push((input.address.clone(), -i64::try_from(input.balance).unwrap()));
            for _ in 1..input.security.signature_fragments() {
                entries.push((input.address.clone(), 0));
            }
        }

        let last_index = entries.len() as u64 - 1;
        let mut transactions: Vec<Transaction> = entries
            .into_iter()
            .enumerate()
            .map(|(index, (address, value))| Transaction {
                last_index,
                ..unsigned_transaction(address, value, index as u64)
            })
            .collect();

        let essence: Vec<_> = transactions
            .iter()
            .flat_map(|tx| tx.essence_trits().unwrap())
            .collect();
        let bundle_hash = trytes::trits_to_trytes(&Kerl::hash(&essence).unwrap()).unwrap();
        for tx in &mut transactions {
            tx.bundle = bundle_hash.clone();
        }
        Ok(transactions
            .iter()
            .map(|tx| tx.to_trytes().unwrap())
            .collect())
    }
}

pub fn seed(symbol: char) -> String {
    symbol.to_string().repeat(SEED_LENGTH)
}

pub fn seed_handle(symbol: char) -> SeedHandle {
    let secret = SeedSecret::from_trytes(&seed(symbol)).unwrap();
    SeedHandle::new(secret, Arc::new(HashingSigner))
}

pub fn address(symbol: char, index: KeyIndex) -> Address {
    HashingSigner::address_at(&seed(symbol), index, SecurityLevel::Medium)
}
