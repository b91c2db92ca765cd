use std::path::PathBuf;
use std::time::Duration;

use clap::builder::TypedValueParser;
use clap::Parser;

use crate::ledger::http_node::DEFAULT_NODE;
use crate::ledger::http_node::FALLBACK_NODE;
use crate::models::security_level::SecurityLevel;
use crate::recovery_backend::DEFAULT_BACKEND_URL;

/// Moves the entire balance of a seed to the next unused address of another
/// seed.
///
/// Both seeds are read from standard input, one per line: first the seed to
/// migrate from, then the seed to migrate to. Seeds never appear on the
/// command line.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about)]
pub struct Args {
    /// Ledger node to query.
    #[clap(long, default_value = DEFAULT_NODE, value_name = "URL")]
    pub node: String,

    /// Node to retry a failed query against, once. Ignored if equal to
    /// `--node`.
    #[clap(long, default_value = FALLBACK_NODE, value_name = "URL")]
    pub fallback_node: String,

    /// Security level the addresses of both seeds were generated with.
    #[clap(long, value_enum, default_value_t = SecurityLevel::Medium)]
    pub security_level: SecurityLevel,

    /// Addresses generated and queried per step when scanning a seed.
    #[clap(long, default_value = "10", value_parser = clap::value_parser!(u16).range(1..).map(usize::from))]
    pub batch_size: usize,

    /// Addresses looked at per extra search beyond the scanned history.
    #[clap(long, default_value = "20", value_parser = clap::value_parser!(u16).range(1..).map(usize::from))]
    pub search_batch_size: usize,

    /// Extra searches to run on the source seed before preparing the bundle.
    ///
    /// Funds sitting on addresses past a long run of unused ones are only
    /// found this way.
    #[clap(long, default_value = "0")]
    pub search_rounds: usize,

    /// Timeout for each request to a ledger node or the recovery backend,
    /// e.g. `30s` or `1m 30s`.
    #[clap(long, default_value = "30s", value_parser = humantime::parse_duration)]
    pub request_timeout: Duration,

    /// Program that derives addresses and signs bundles.
    ///
    /// Run once per job; it reads a JSON job on standard input and writes the
    /// JSON result to standard output.
    #[clap(long, default_value = "seed-signer", value_name = "PATH")]
    pub signer: PathBuf,

    /// Time after which a signer process is killed.
    #[clap(long, default_value = "30s", value_parser = humantime::parse_duration)]
    pub signer_timeout: Duration,

    /// Send the first address of the destination seed instead of scanning
    /// it. Use this for a destination seed that was just created.
    #[clap(long)]
    pub fresh_destination: bool,

    /// Recovery backend that tracks submitted bundles.
    #[clap(long, default_value = DEFAULT_BACKEND_URL, value_name = "URL")]
    pub backend_url: String,

    /// Hand the signed bundle to the recovery backend. Without this flag the
    /// bundle is only printed.
    #[clap(long)]
    pub submit: bool,

    /// Enable tokio tracing for consumption by the tokio-console application
    /// note: this will attempt to connect to localhost:6669
    #[clap(long)]
    pub tokio_console: bool,
}

impl Default for Args {
    fn default() -> Self {
        let empty: Vec<String> = vec![];
        Self::parse_from(empty)
    }
}
