//! Seed ownership.
//!
//! A [`SeedHandle`] owns the secret of one seed for the duration of a
//! migration. The rest of the crate never sees the secret; it asks the handle
//! for addresses and signatures through a [`SeedLease`], which grants
//! exclusive use of the handle until it is dropped.
pub mod process_signer;
pub mod signer;

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::sync::MutexGuard;
use tracing::debug;
use zeroize::Zeroize;
use zeroize::ZeroizeOnDrop;

use crate::models::address::Address;
use crate::models::address::Checksum;
use crate::models::address::KeyIndex;
use crate::models::security_level::SecurityLevel;
use crate::models::transfer::Input;
use crate::models::transfer::Transfer;
use crate::models::trytes;
use crate::models::trytes::TrytesError;
use crate::models::trytes::TRYTE_ALPHABET;
use signer::SeedSigner;
use signer::SignerError;

/// Trytes in a seed.
pub const SEED_LENGTH: usize = 81;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SeedHandleError {
    #[error("seed is already in use by another migration")]
    InUse,

    #[error("seed handle was used after its session ended")]
    Closed,

    #[error(transparent)]
    Signer(#[from] SignerError),
}

/// Secret key material of one seed: 81 trytes.
///
/// Wiped from memory on drop; `Debug` never prints it.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SeedSecret(String);

impl SeedSecret {
    pub fn from_trytes(seed: &str) -> Result<Self, TrytesError> {
        let mut normalized = seed.trim().to_ascii_uppercase();
        let validated = trytes::validate_exact(&normalized, SEED_LENGTH);
        if let Err(e) = validated {
            normalized.zeroize();
            return Err(e);
        }
        Ok(Self(normalized))
    }

    /// Builds a seed from tryte positions in the alphabet (`0` is `9`,
    /// `1` is `A`, ...), the form in which seed containers store it.
    pub fn from_tryte_positions(positions: &[u8]) -> Result<Self, TrytesError> {
        let alphabet = TRYTE_ALPHABET.as_bytes();
        let mut seed: String = positions
            .iter()
            .map(|p| alphabet[usize::from(*p) % alphabet.len()] as char)
            .collect();
        let secret = Self::from_trytes(&seed);
        seed.zeroize();
        secret
    }

    /// Raw trytes, for [`SeedSigner`] implementations only.
    pub fn expose_trytes(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SeedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeedSecret(..)")
    }
}

/// Owns one seed for the lifetime of a migration.
#[derive(Debug)]
pub struct SeedHandle {
    secret: SeedSecret,
    signer: Arc<dyn SeedSigner>,
    lease: Mutex<()>,
    closed: AtomicBool,
}

impl SeedHandle {
    pub fn new(secret: SeedSecret, signer: Arc<dyn SeedSigner>) -> Self {
        Self {
            secret,
            signer,
            lease: Mutex::new(()),
            closed: AtomicBool::new(false),
        }
    }

    /// Grants exclusive use of the seed.
    ///
    /// Fails with [`SeedHandleError::InUse`] while another lease is alive and
    /// with [`SeedHandleError::Closed`] after [`Self::close`].
    pub fn lease(&self) -> Result<SeedLease<'_>, SeedHandleError> {
        self.ensure_open()?;
        let guard = self.lease.try_lock().map_err(|_| SeedHandleError::InUse)?;
        Ok(SeedLease {
            handle: self,
            _guard: guard,
        })
    }

    /// Ends the session. Every later use, through an existing lease or a new
    /// one, fails.
    pub fn close(&self) {
        debug!("closing seed handle");
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Nine-tryte fingerprint of the seed, for display next to it.
    pub fn checksum(&self) -> Checksum {
        Checksum::of_trytes(self.secret.expose_trytes())
    }

    fn ensure_open(&self) -> Result<(), SeedHandleError> {
        if self.is_closed() {
            return Err(SeedHandleError::Closed);
        }
        Ok(())
    }
}

/// Exclusive access to a [`SeedHandle`].
#[derive(Debug)]
pub struct SeedLease<'a> {
    handle: &'a SeedHandle,
    _guard: MutexGuard<'a, ()>,
}

impl SeedLease<'_> {
    /// Addresses at `index..index + count`.
    pub async fn generate_addresses(
        &self,
        index: KeyIndex,
        count: usize,
        security: SecurityLevel,
    ) -> Result<Vec<Address>, SeedHandleError> {
        self.handle.ensure_open()?;
        let addresses = self
            .handle
            .signer
            .generate_addresses(&self.handle.secret, index, count, security)
            .await?;
        if addresses.len() != count {
            return Err(SignerError::AddressCountMismatch {
                expected: count,
                actual: addresses.len(),
            }
            .into());
        }
        Ok(addresses)
    }

    /// Signed transaction trytes paying `transfers` from exactly `inputs`.
    pub async fn sign(
        &self,
        transfers: &[Transfer],
        inputs: &[Input],
    ) -> Result<Vec<String>, SeedHandleError> {
        self.handle.ensure_open()?;
        Ok(self
            .handle
            .signer
            .sign_transfers(&self.handle.secret, transfers, inputs)
            .await?)
    }

    pub fn checksum(&self) -> Checksum {
        self.handle.checksum()
    }
}
