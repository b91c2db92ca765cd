//! Ternary sponge functions: Kerl for checksums, Curl-P for transaction hashes.
pub mod curl;
pub mod kerl;

pub use curl::Curl;
pub use kerl::Kerl;
