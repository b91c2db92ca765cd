use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// An amount of the ledger's base unit.
///
/// `Display` picks the largest unit below the amount, e.g. `1820` shows as
/// `1.82Ki`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iotas(pub u64);

const UNITS: [(u64, &str); 4] = [
    (1_000_000_000_000, "Ti"),
    (1_000_000_000, "Gi"),
    (1_000_000, "Mi"),
    (1_000, "Ki"),
];

impl fmt::Display for Iotas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match UNITS.iter().find(|(scale, _)| self.0 >= *scale) {
            Some((scale, unit)) => write!(f, "{}{}", self.0 as f64 / *scale as f64, unit),
            None => write!(f, "{}i", self.0),
        }
    }
}
