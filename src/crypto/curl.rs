use crate::models::trytes::Trit;

use super::kerl::HASH_LENGTH_TRITS;

const STATE_LENGTH: usize = 3 * HASH_LENGTH_TRITS;

/// Rounds used for transaction hashes.
pub const CURL_P_81: usize = 81;

const TRUTH_TABLE: [Trit; 11] = [1, 0, -1, 2, 1, -1, 0, 2, -1, 1, 0];

/// The ternary Curl-P sponge, used here only to derive transaction hashes.
#[derive(Debug, Clone)]
pub struct Curl {
    state: Vec<Trit>,
}

impl Default for Curl {
    fn default() -> Self {
        Self {
            state: vec![0; STATE_LENGTH],
        }
    }
}

impl Curl {
    pub fn absorb(&mut self, trits: &[Trit]) {
        for chunk in trits.chunks(HASH_LENGTH_TRITS) {
            self.state[..chunk.len()].copy_from_slice(chunk);
            self.transform();
        }
    }

    pub fn squeeze(&mut self, length: usize) -> Vec<Trit> {
        let mut squeezed = Vec::with_capacity(length);
        while squeezed.len() < length {
            let take = HASH_LENGTH_TRITS.min(length - squeezed.len());
            squeezed.extend_from_slice(&self.state[..take]);
            self.transform();
        }
        squeezed
    }

    fn transform(&mut self) {
        let mut index = 0usize;
        for _ in 0..CURL_P_81 {
            let copy = self.state.clone();
            for trit in self.state.iter_mut() {
                let previous = index;
                index = if index < 365 { index + 364 } else { index - 365 };
                let lookup = copy[previous] + copy[index] * 4 + 5;
                *trit = TRUTH_TABLE[lookup as usize];
            }
        }
    }
}
