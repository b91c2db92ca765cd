use std::ops::Range;

use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;

use super::address::Address;
use super::transfer::Transfer;
use super::trytes;
use super::trytes::TrytesError;
use crate::crypto::kerl::HASH_LENGTH_TRITS;
use crate::crypto::Curl;

/// Trytes in one serialized transaction.
pub const TRANSACTION_LENGTH: usize = 2673;

/// Trytes in a hash (transaction, bundle, trunk, branch).
pub const HASH_LENGTH: usize = 81;

pub const SIGNATURE_FRAGMENT_LENGTH: usize = 2187;

pub const TAG_LENGTH: usize = 27;

// tryte offsets of the fixed transaction layout
const SIGNATURE: Range<usize> = 0..2187;
const ADDRESS: Range<usize> = 2187..2268;
const VALUE: Range<usize> = 2268..2295;
const OBSOLETE_TAG: Range<usize> = 2295..2322;
const TIMESTAMP: Range<usize> = 2322..2331;
const CURRENT_INDEX: Range<usize> = 2331..2340;
const LAST_INDEX: Range<usize> = 2340..2349;
const BUNDLE: Range<usize> = 2349..2430;
const TRUNK: Range<usize> = 2430..2511;
const BRANCH: Range<usize> = 2511..2592;
const TAG: Range<usize> = 2592..2619;
const ATTACHMENT_TIMESTAMP: Range<usize> = 2619..2628;
const ATTACHMENT_LOWER_BOUND: Range<usize> = 2628..2637;
const ATTACHMENT_UPPER_BOUND: Range<usize> = 2637..2646;
const NONCE: Range<usize> = 2646..2673;

/// Only the low 33 trits of the value field are significant.
const VALUE_TRITS: usize = 33;

/// Largest magnitude `trits` balanced trits can hold.
fn balanced_limit(trits: usize) -> i128 {
    let trits = u32::try_from(trits).unwrap_or(u32::MAX);
    3i128.checked_pow(trits).map_or(i128::MAX, |power| (power - 1) / 2)
}

/// One transaction of a bundle, in parsed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub signature_message_fragment: String,
    pub address: Address,
    pub value: i64,
    pub obsolete_tag: String,
    pub timestamp: u64,
    pub current_index: u64,
    pub last_index: u64,
    pub bundle: String,
    pub trunk_transaction: String,
    pub branch_transaction: String,
    pub tag: String,
    pub attachment_timestamp: u64,
    pub attachment_timestamp_lower_bound: u64,
    pub attachment_timestamp_upper_bound: u64,
    pub nonce: String,
}

impl Transaction {
    pub fn from_trytes(raw: &str) -> Result<Self, TrytesError> {
        trytes::validate_exact(raw, TRANSACTION_LENGTH)?;

        let trits = trytes::trytes_to_trits(raw)?;
        let field_value = |range: &Range<usize>, significant: usize| {
            let start = range.start * trytes::TRITS_PER_TRYTE;
            trytes::trits_to_int(&trits[start..start + significant])
        };
        let unsigned = |field: &'static str, range: Range<usize>| {
            let value = field_value(&range, range.len() * trytes::TRITS_PER_TRYTE);
            u64::try_from(value).map_err(|_| TrytesError::NegativeField { field, value })
        };

        let mut curl = Curl::default();
        curl.absorb(&trits);
        let hash = trytes::trits_to_trytes(&curl.squeeze(HASH_LENGTH_TRITS))?;

        Ok(Self {
            hash,
            signature_message_fragment: raw[SIGNATURE].to_owned(),
            address: raw[ADDRESS].parse()?,
            value: field_value(&VALUE, VALUE_TRITS),
            obsolete_tag: raw[OBSOLETE_TAG].to_owned(),
            timestamp: unsigned("timestamp", TIMESTAMP)?,
            current_index: unsigned("currentIndex", CURRENT_INDEX)?,
            last_index: unsigned("lastIndex", LAST_INDEX)?,
            bundle: raw[BUNDLE].to_owned(),
            trunk_transaction: raw[TRUNK].to_owned(),
            branch_transaction: raw[BRANCH].to_owned(),
            tag: raw[TAG].to_owned(),
            attachment_timestamp: unsigned("attachmentTimestamp", ATTACHMENT_TIMESTAMP)?,
            attachment_timestamp_lower_bound: unsigned(
                "attachmentTimestampLowerBound",
                ATTACHMENT_LOWER_BOUND,
            )?,
            attachment_timestamp_upper_bound: unsigned(
                "attachmentTimestampUpperBound",
                ATTACHMENT_UPPER_BOUND,
            )?,
            nonce: raw[NONCE].to_owned(),
        })
    }

    /// Serializes back into the fixed 2673-tryte layout. The `hash` field is
    /// derived, so it is not part of the output.
    pub fn to_trytes(&self) -> Result<String, TrytesError> {
        let number = |field: &'static str,
                      value: i128,
                      range: &Range<usize>,
                      significant: usize|
         -> Result<String, TrytesError> {
            let out_of_range = || TrytesError::FieldOutOfRange { field, value };
            if value.abs() > balanced_limit(significant) {
                return Err(out_of_range());
            }
            let value = i64::try_from(value).map_err(|_| out_of_range())?;
            trytes::trits_to_trytes(&trytes::int_to_trits(
                value,
                range.len() * trytes::TRITS_PER_TRYTE,
            ))
        };
        let unsigned = |field: &'static str, value: u64, range: &Range<usize>| {
            number(
                field,
                i128::from(value),
                range,
                range.len() * trytes::TRITS_PER_TRYTE,
            )
        };
        let text = |value: &str, range: &Range<usize>| -> Result<String, TrytesError> {
            trytes::validate(value)?;
            if value.len() > range.len() {
                return Err(TrytesError::InvalidLength {
                    expected: range.len(),
                    actual: value.len(),
                });
            }
            Ok(trytes::pad_trytes(value, range.len()))
        };

        let serialized = [
            text(&self.signature_message_fragment, &SIGNATURE)?,
            self.address.as_str().to_owned(),
            number("value", i128::from(self.value), &VALUE, VALUE_TRITS)?,
            text(&self.obsolete_tag, &OBSOLETE_TAG)?,
            unsigned("timestamp", self.timestamp, &TIMESTAMP)?,
            unsigned("currentIndex", self.current_index, &CURRENT_INDEX)?,
            unsigned("lastIndex", self.last_index, &LAST_INDEX)?,
            text(&self.bundle, &BUNDLE)?,
            text(&self.trunk_transaction, &TRUNK)?,
            text(&self.branch_transaction, &BRANCH)?,
            text(&self.tag, &TAG)?,
            unsigned(
                "attachmentTimestamp",
                self.attachment_timestamp,
                &ATTACHMENT_TIMESTAMP,
            )?,
            unsigned(
                "attachmentTimestampLowerBound",
                self.attachment_timestamp_lower_bound,
                &ATTACHMENT_LOWER_BOUND,
            )?,
            unsigned(
                "attachmentTimestampUpperBound",
                self.attachment_timestamp_upper_bound,
                &ATTACHMENT_UPPER_BOUND,
            )?,
            text(&self.nonce, &NONCE)?,
        ]
        .concat();
        debug_assert_eq!(TRANSACTION_LENGTH, serialized.len());
        Ok(serialized)
    }

    /// The trits a bundle hash is computed over: address, value, obsolete
    /// tag, timestamp, current index and last index.
    pub fn essence_trits(&self) -> Result<Vec<trytes::Trit>, TrytesError> {
        let serialized = self.to_trytes()?;
        trytes::trytes_to_trits(&serialized[ADDRESS.start..BUNDLE.start])
    }
}

/// A signed bundle, in both the raw form handed to the ledger and the parsed
/// form used for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBundle {
    trytes: Vec<String>,
    transactions: Vec<Transaction>,
}

impl SignedBundle {
    pub fn from_trytes(trytes: Vec<String>) -> Result<Self, TrytesError> {
        let transactions = trytes
            .iter()
            .map(|raw| Transaction::from_trytes(raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            trytes,
            transactions,
        })
    }

    pub fn trytes(&self) -> &[String] {
        &self.trytes
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The bundle hash shared by every transaction, if they agree.
    pub fn bundle_hash(&self) -> Option<&str> {
        let first = self.transactions.first()?.bundle.as_str();
        self.transactions
            .iter()
            .all(|tx| tx.bundle == first)
            .then_some(first)
    }

    /// Sum of all transaction values. Zero for a balanced bundle.
    pub fn value_sum(&self) -> i128 {
        self.transactions
            .iter()
            .map(|tx| i128::from(tx.value))
            .sum()
    }

    /// Positive-value transactions, read back as transfers.
    pub fn transfers(&self) -> Vec<Transfer> {
        self.transactions
            .iter()
            .filter(|tx| tx.value > 0)
            .map(|tx| Transfer::new(tx.address.clone(), tx.value.unsigned_abs()))
            .collect()
    }

    /// True if the bundle is balanced and its outputs are exactly `requested`,
    /// in any order.
    pub fn reconstructs(&self, requested: &[Transfer]) -> bool {
        let key = |transfer: &Transfer| (transfer.destination.clone(), transfer.value);
        let outputs = self.transfers().iter().map(key).sorted().collect_vec();
        let expected = requested
            .iter()
            .filter(|transfer| transfer.value > 0)
            .map(key)
            .sorted()
            .collect_vec();
        self.value_sum() == 0 && outputs == expected
    }
}
