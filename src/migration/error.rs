use crate::ledger::LedgerError;
use crate::models::trytes::TrytesError;
use crate::seed::SeedHandleError;

/// What an operator should do about a failed migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum RecoveryAction {
    /// A node or the signer was unavailable. Nothing was sent; try again.
    #[strum(to_string = "retry later")]
    RetryLater,

    /// The seed holds no balance on the ledger.
    #[strum(to_string = "no funds found")]
    NoFundsFound,

    /// Something is inconsistent and retrying will not help.
    #[strum(to_string = "contact support")]
    EscalateToSupport,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MigrationError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Seed(#[from] SeedHandleError),

    #[error("invalid trytes: {0}")]
    InvalidTrytes(#[from] TrytesError),

    #[error("got {indexes} key indexes for {results} query results")]
    KeyIndexMismatch { indexes: usize, results: usize },

    #[error("seed holds no balance to migrate")]
    NothingToMigrate,

    #[error("destination seed has no address to receive funds")]
    NoDestinationAddress,

    #[error("signed bundle does not pay exactly {value} to {destination}")]
    BundleMismatch { destination: String, value: u64 },

    #[error("total balance does not fit in 64 bits")]
    BalanceOverflow,
}

impl MigrationError {
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::Ledger(LedgerError::EndpointUnavailable { .. }) => RecoveryAction::RetryLater,
            Self::Ledger(LedgerError::Seed(e)) | Self::Seed(e) => seed_recovery_action(e),
            Self::NothingToMigrate => RecoveryAction::NoFundsFound,
            Self::Ledger(LedgerError::InputBalanceMismatch { .. })
            | Self::InvalidTrytes(_)
            | Self::KeyIndexMismatch { .. }
            | Self::NoDestinationAddress
            | Self::BundleMismatch { .. }
            | Self::BalanceOverflow => RecoveryAction::EscalateToSupport,
        }
    }
}

fn seed_recovery_action(error: &SeedHandleError) -> RecoveryAction {
    match error {
        SeedHandleError::Signer(_) => RecoveryAction::RetryLater,
        SeedHandleError::InUse | SeedHandleError::Closed => RecoveryAction::EscalateToSupport,
    }
}
