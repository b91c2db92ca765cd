//! Balanced-ternary encoding used by the ledger.
//!
//! A tryte is one of the 27 symbols in [`TRYTE_ALPHABET`] and carries three
//! trits, each of which is `-1`, `0` or `1`. Trits are stored least
//! significant first, so the tryte `B` (value 2) is `[-1, 1, 0]`.

/// The 27-symbol alphabet. `9` is the zero tryte and doubles as padding.
pub const TRYTE_ALPHABET: &str = "9ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const TRITS_PER_TRYTE: usize = 3;

/// A single balanced-ternary digit.
pub type Trit = i8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TrytesError {
    #[error("invalid tryte {character:?} at position {position}")]
    InvalidTryte { character: char, position: usize },

    #[error("expected {expected} trytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("address checksum {checksum} does not match address {address}")]
    InvalidChecksum { address: String, checksum: String },

    #[error("trit sequence of length {0} does not fill whole trytes")]
    UnalignedTrits(usize),

    #[error("trit sequence of length {0} does not fill whole hash chunks")]
    UnalignedHashInput(usize),

    #[error("field {field} holds negative value {value}")]
    NegativeField { field: &'static str, value: i64 },

    #[error("field {field} cannot hold value {value}")]
    FieldOutOfRange { field: &'static str, value: i128 },
}

/// Numeric value of a tryte symbol, in `-13..=13`.
pub fn tryte_value(character: char) -> Option<i8> {
    let position = TRYTE_ALPHABET.find(character)?;
    let position = position as i8;
    Some(if position > 13 { position - 27 } else { position })
}

/// Symbol for a tryte value in `-13..=13`.
fn tryte_symbol(value: i8) -> char {
    let position = if value < 0 { value + 27 } else { value };
    TRYTE_ALPHABET.as_bytes()[position as usize] as char
}

/// Fails on the first character outside the alphabet.
pub fn validate(trytes: &str) -> Result<(), TrytesError> {
    match trytes
        .chars()
        .enumerate()
        .find(|(_, c)| tryte_value(*c).is_none())
    {
        Some((position, character)) => Err(TrytesError::InvalidTryte {
            character,
            position,
        }),
        None => Ok(()),
    }
}

/// Fails unless `trytes` is valid and exactly `expected` symbols long.
pub fn validate_exact(trytes: &str, expected: usize) -> Result<(), TrytesError> {
    validate(trytes)?;
    let actual = trytes.len();
    if actual != expected {
        return Err(TrytesError::InvalidLength { expected, actual });
    }
    Ok(())
}

pub fn trytes_to_trits(trytes: &str) -> Result<Vec<Trit>, TrytesError> {
    let mut trits = Vec::with_capacity(trytes.len() * TRITS_PER_TRYTE);
    for (position, character) in trytes.chars().enumerate() {
        let value = tryte_value(character).ok_or(TrytesError::InvalidTryte {
            character,
            position,
        })?;
        trits.extend(int_to_trits(i64::from(value), TRITS_PER_TRYTE));
    }
    Ok(trits)
}

pub fn trits_to_trytes(trits: &[Trit]) -> Result<String, TrytesError> {
    if trits.len() % TRITS_PER_TRYTE != 0 {
        return Err(TrytesError::UnalignedTrits(trits.len()));
    }
    Ok(trits
        .chunks(TRITS_PER_TRYTE)
        .map(|t| tryte_symbol(t[0] + 3 * t[1] + 9 * t[2]))
        .collect())
}

/// Integer value of a little-endian balanced-ternary trit sequence.
pub fn trits_to_int(trits: &[Trit]) -> i64 {
    trits
        .iter()
        .rev()
        .fold(0i64, |acc, &trit| acc * 3 + i64::from(trit))
}

/// Balanced-ternary expansion of `value`, truncated or zero-padded to
/// `length` trits.
pub fn int_to_trits(value: i64, length: usize) -> Vec<Trit> {
    let negative = value < 0;
    let mut magnitude = value.unsigned_abs();
    let mut trits = Vec::with_capacity(length);
    for _ in 0..length {
        let mut remainder = (magnitude % 3) as i8;
        magnitude /= 3;
        if remainder == 2 {
            remainder = -1;
            magnitude += 1;
        }
        trits.push(if negative { -remainder } else { remainder });
    }
    trits
}

/// Right-pads `trytes` with `9` up to `length` symbols.
pub fn pad_trytes(trytes: &str, length: usize) -> String {
    let mut padded = trytes.to_owned();
    while padded.len() < length {
        padded.push('9');
    }
    padded
}
