//! Moving the funds of one seed to another.
//!
//! [`AddressScanner`] finds every address of a seed the ledger knows,
//! [`balance`] works out what can be spent, and [`BundleComposer`] has the
//! source seed sign a single transfer of everything to the destination seed.
//! [`MigrationSession`] runs those steps for one pair of seeds.
pub mod balance;
pub mod composer;
pub mod error;
pub mod record_builder;
pub mod scanner;
pub mod session;

pub use composer::BundleComposer;
pub use error::MigrationError;
pub use error::RecoveryAction;
pub use scanner::AddressScanner;
pub use scanner::ScanConfiguration;
pub use session::MigrationSession;
