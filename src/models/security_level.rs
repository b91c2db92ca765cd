use serde::Deserialize;
use serde::Serialize;

/// Signature strength of an address. Every address in one migration session
/// is generated at the same level.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    clap::ValueEnum,
)]
#[serde(into = "u8", try_from = "u8")]
#[strum(serialize_all = "lowercase")]
pub enum SecurityLevel {
    Low,

    /// The level used by the wallets whose seeds this tool migrates.
    #[default]
    Medium,

    High,
}

impl SecurityLevel {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    /// Number of signature fragments, and thus transactions, an input at this
    /// level occupies in a bundle.
    pub fn signature_fragments(self) -> usize {
        usize::from(self.as_u8())
    }
}

impl From<SecurityLevel> for u8 {
    fn from(level: SecurityLevel) -> Self {
        level.as_u8()
    }
}

impl TryFrom<u8> for SecurityLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            other => Err(format!("security level must be 1, 2 or 3, got {}", other)),
        }
    }
}
