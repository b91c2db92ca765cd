//! Value types shared by the ledger client, the seed handle and the migration
//! algorithms.
pub mod address;
pub mod address_record;
pub mod iotas;
pub mod security_level;
pub mod transaction;
pub mod transfer;
pub mod trytes;
