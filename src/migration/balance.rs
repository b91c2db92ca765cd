use super::MigrationError;
use crate::models::address_record::AddressRecord;
use crate::models::security_level::SecurityLevel;
use crate::models::transfer::Input;

/// Sum of all balances.
pub fn total_balance(records: &[AddressRecord]) -> Result<u64, MigrationError> {
    records.iter().try_fold(0u64, |total, record| {
        total
            .checked_add(record.balance)
            .ok_or(MigrationError::BalanceOverflow)
    })
}

/// One input per funded address, in record order.
pub fn spendable_inputs(records: &[AddressRecord], security: SecurityLevel) -> Vec<Input> {
    records
        .iter()
        .filter(|record| record.balance > 0)
        .map(|record| Input {
            address: record.address.clone(),
            key_index: record.key_index,
            balance: record.balance,
            security,
        })
        .collect()
}

/// The record with the highest key index. Among equal indexes the last one
/// wins.
pub fn highest_key_index_record(records: &[AddressRecord]) -> Option<&AddressRecord> {
    records.iter().max_by_key(|record| record.key_index)
}
