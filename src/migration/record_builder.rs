use super::MigrationError;
use crate::models::address::KeyIndex;
use crate::models::address_record::AddressQueryResult;
use crate::models::address_record::AddressRecord;

/// Turns query results into address records.
///
/// Without `key_indexes`, a result's key index is its position in `results`,
/// which holds for any list that starts at index 0 and has no gaps. Otherwise
/// `key_indexes` supplies one index per result.
pub fn assemble(
    results: Vec<AddressQueryResult>,
    key_indexes: Option<&[KeyIndex]>,
) -> Result<Vec<AddressRecord>, MigrationError> {
    let key_indexes: Vec<KeyIndex> = match key_indexes {
        Some(indexes) if indexes.len() != results.len() => {
            return Err(MigrationError::KeyIndexMismatch {
                indexes: indexes.len(),
                results: results.len(),
            })
        }
        Some(indexes) => indexes.to_vec(),
        None => (0..results.len() as KeyIndex).collect(),
    };

    Ok(results
        .into_iter()
        .zip(key_indexes)
        .map(|(result, key_index)| AddressRecord {
            checksum: result.address.checksum(),
            address: result.address,
            key_index,
            balance: result.balance,
            spent: result.spent,
        })
        .collect())
}
