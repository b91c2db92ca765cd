use num_bigint::BigInt;
use num_bigint::BigUint;
use num_traits::Signed;
use num_traits::ToPrimitive;
use num_traits::Zero;
use sha3::Digest;
use sha3::Keccak384;

use crate::models::trytes::Trit;
use crate::models::trytes::TrytesError;

/// Trits absorbed or squeezed per Keccak block.
pub const HASH_LENGTH_TRITS: usize = 243;

const HASH_LENGTH_BYTES: usize = 48;

/// Keccak-384 sponge over trits.
///
/// Each 243-trit chunk is read as a balanced-ternary integer (its last trit
/// forced to zero) and fed to Keccak-384 as a 48-byte big-endian two's
/// complement number. Squeezing runs the conversion backwards and re-seeds the
/// sponge with the bitwise complement of the digest.
#[derive(Clone, Default)]
pub struct Kerl {
    keccak: Keccak384,
}

impl std::fmt::Debug for Kerl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kerl").finish_non_exhaustive()
    }
}

impl Kerl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, trits: &[Trit]) -> Result<(), TrytesError> {
        if trits.is_empty() || trits.len() % HASH_LENGTH_TRITS != 0 {
            return Err(TrytesError::UnalignedHashInput(trits.len()));
        }
        for chunk in trits.chunks(HASH_LENGTH_TRITS) {
            self.keccak.update(trits_to_bytes(chunk));
        }
        Ok(())
    }

    pub fn squeeze(&mut self, length: usize) -> Result<Vec<Trit>, TrytesError> {
        if length == 0 || length % HASH_LENGTH_TRITS != 0 {
            return Err(TrytesError::UnalignedHashInput(length));
        }
        let mut squeezed = Vec::with_capacity(length);
        while squeezed.len() < length {
            let digest = self.keccak.finalize_reset();
            squeezed.extend(bytes_to_trits(&digest));

            let flipped: Vec<u8> = digest.iter().map(|byte| !byte).collect();
            self.keccak.update(flipped);
        }
        Ok(squeezed)
    }

    /// One-shot hash of a single 243-trit chunk.
    pub fn hash(trits: &[Trit]) -> Result<Vec<Trit>, TrytesError> {
        let mut kerl = Self::new();
        kerl.absorb(trits)?;
        kerl.squeeze(HASH_LENGTH_TRITS)
    }
}

fn trits_to_bytes(chunk: &[Trit]) -> [u8; HASH_LENGTH_BYTES] {
    // the most significant trit never reaches the hash
    let value = chunk[..HASH_LENGTH_TRITS - 1]
        .iter()
        .rev()
        .fold(BigInt::zero(), |acc, &trit| acc * 3 + trit);

    let fill = if value.is_negative() { 0xff } else { 0x00 };
    let mut bytes = [fill; HASH_LENGTH_BYTES];
    let minimal = value.to_signed_bytes_be();
    bytes[HASH_LENGTH_BYTES - minimal.len()..].copy_from_slice(&minimal);
    bytes
}

fn bytes_to_trits(bytes: &[u8]) -> Vec<Trit> {
    let value = BigInt::from_signed_bytes_be(bytes);
    let negative = value.is_negative();
    let mut magnitude: BigUint = value.magnitude().clone();

    let mut trits = Vec::with_capacity(HASH_LENGTH_TRITS);
    for _ in 0..HASH_LENGTH_TRITS {
        let mut remainder = (&magnitude % 3u32).to_i8().unwrap_or_default();
        magnitude /= 3u32;
        if remainder == 2 {
            remainder = -1;
            magnitude += 1u32;
        }
        trits.push(if negative { -remainder } else { remainder });
    }
    trits[HASH_LENGTH_TRITS - 1] = 0;
    trits
}
