use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use super::trytes;
use super::trytes::TrytesError;
use crate::crypto::Kerl;

/// Trytes in an address, without checksum.
pub const ADDRESS_LENGTH: usize = 81;

/// Trytes in an address checksum.
pub const CHECKSUM_LENGTH: usize = 9;

/// Deterministic derivation position of an address under one seed and
/// security level.
pub type KeyIndex = u64;

/// A ledger address: 81 trytes.
///
/// Parsing also accepts the 90-tryte form carrying a checksum, in which case
/// the checksum is verified and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn checksum(&self) -> Checksum {
        Checksum::of(self)
    }

    /// The 90-tryte display form.
    pub fn with_checksum(&self) -> String {
        format!("{}{}", self.0, self.checksum())
    }
}

impl FromStr for Address {
    type Err = TrytesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        trytes::validate(s)?;
        match s.len() {
            ADDRESS_LENGTH => Ok(Self(s.to_owned())),
            l if l == ADDRESS_LENGTH + CHECKSUM_LENGTH => {
                let (body, given) = s.split_at(ADDRESS_LENGTH);
                let address = Self(body.to_owned());
                if address.checksum().as_str() != given {
                    return Err(TrytesError::InvalidChecksum {
                        address: body.to_owned(),
                        checksum: given.to_owned(),
                    });
                }
                Ok(address)
            }
            actual => Err(TrytesError::InvalidLength {
                expected: ADDRESS_LENGTH,
                actual,
            }),
        }
    }
}

impl TryFrom<String> for Address {
    type Error = TrytesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The last nine trytes of the Kerl hash of an address.
///
/// Only ever used for display and input validation, never for identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
    pub fn of(address: &Address) -> Self {
        Self::of_trytes(address.as_str())
    }

    /// Checksum of validated trytes whose length is a multiple of 81, such as
    /// an address or a seed.
    pub(crate) fn of_trytes(valid_trytes: &str) -> Self {
        let hash_trytes = trytes::trytes_to_trits(valid_trytes)
            .and_then(|trits| Kerl::hash(&trits))
            .and_then(|hash| trytes::trits_to_trytes(&hash))
            .unwrap_or_else(|_| "9".repeat(ADDRESS_LENGTH));
        Self(hash_trytes[hash_trytes.len() - CHECKSUM_LENGTH..].to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
