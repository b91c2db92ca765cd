use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use crate::ledger::LedgerNode;
use crate::ledger::NodeError;
use crate::models::address::Address;

#[derive(Debug, Clone, Default)]
pub(crate) struct AddressState {
    pub(crate) transactions: Vec<String>,
    pub(crate) balance: u64,
    pub(crate) spent: bool,
}

/// How a [`MockNode`] answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Behaviour {
    #[default]
    Healthy,

    /// Every request fails.
    Down,

    /// Answers for one address fewer than asked.
    Truncating,
}

/// In-memory ledger node.
///
/// Nodes created with [`MockNode::mirror`] share the ledger, so a primary
/// and a fallback can disagree only in how they behave.
#[derive(Debug, Default)]
pub(crate) struct MockNode {
    endpoint: String,
    ledger: Arc<Mutex<HashMap<Address, AddressState>>>,
    behaviour: Mutex<Behaviour>,
    calls: AtomicUsize,
    queried: Mutex<Vec<Vec<Address>>>,
}

impl MockNode {
    pub(crate) fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_owned(),
            ..Default::default()
        }
    }

    pub(crate) fn mirror(&self, endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_owned(),
            ledger: self.ledger.clone(),
            ..Default::default()
        }
    }

    pub(crate) fn set_behaviour(&self, behaviour: Behaviour) {
        *self.behaviour.lock().unwrap() = behaviour;
    }

    /// Credits `balance` to `address` with a transaction to show for it.
    pub(crate) fn fund(&self, address: &Address, balance: u64) {
        let mut ledger = self.ledger.lock().unwrap();
        let state = ledger.entry(address.clone()).or_default();
        state.balance += balance;
        state.transactions.push(format!("{:9<81}", "FUND"));
    }

    /// Adds a zero-value transaction to `address`.
    pub(crate) fn touch(&self, address: &Address) {
        let mut ledger = self.ledger.lock().unwrap();
        let state = ledger.entry(address.clone()).or_default();
        state.transactions.push(format!("{:9<81}", "TOUCH"));
    }

    /// Marks `address` spent and drains it.
    pub(crate) fn spend(&self, address: &Address) {
        let mut ledger = self.ledger.lock().unwrap();
        let state = ledger.entry(address.clone()).or_default();
        state.spent = true;
        state.balance = 0;
    }

    /// Overrides the balance without leaving a transaction behind, which
    /// real nodes never do but snapshots can.
    pub(crate) fn set_balance(&self, address: &Address, balance: u64) {
        self.ledger
            .lock()
            .unwrap()
            .entry(address.clone())
            .or_default()
            .balance = balance;
    }

    /// Requests answered or refused so far, all commands together.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The address lists sent with `findTransactions`, in order.
    pub(crate) fn activity_queries(&self) -> Vec<Vec<Address>> {
        self.queried.lock().unwrap().clone()
    }

    fn answer<T>(
        &self,
        addresses: &[Address],
        per_address: impl Fn(&AddressState) -> T,
    ) -> Result<Vec<T>, NodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behaviour = *self.behaviour.lock().unwrap();
        if behaviour == Behaviour::Down {
            return Err(NodeError::Unavailable(self.endpoint.clone()));
        }

        let ledger = self.ledger.lock().unwrap();
        let empty = AddressState::default();
        let mut answers: Vec<T> = addresses
            .iter()
            .map(|address| per_address(ledger.get(address).unwrap_or(&empty)))
            .collect();
        if behaviour == Behaviour::Truncating {
            answers.pop();
        }
        Ok(answers)
    }
}

#[async_trait::async_trait]
impl LedgerNode for MockNode {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn find_transactions(&self, addresses: &[Address]) -> Result<Vec<String>, NodeError> {
        self.queried.lock().unwrap().push(addresses.to_vec());
        let per_address = self.answer(addresses, |state| state.transactions.clone())?;
        Ok(per_address.into_iter().flatten().collect())
    }

    async fn get_balances(
        &self,
        addresses: &[Address],
        _threshold: u8,
    ) -> Result<Vec<u64>, NodeError> {
        self.answer(addresses, |state| state.balance)
    }

    async fn were_addresses_spent_from(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<bool>, NodeError> {
        self.answer(addresses, |state| state.spent)
    }
}
