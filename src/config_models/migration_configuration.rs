use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use super::cli_args;
use crate::ledger::http_node::DEFAULT_NODE;
use crate::ledger::http_node::DEFAULT_REQUEST_TIMEOUT;
use crate::ledger::http_node::FALLBACK_NODE;
use crate::migration::ScanConfiguration;
use crate::recovery_backend::DEFAULT_BACKEND_URL;
use crate::seed::process_signer::DEFAULT_SIGNER_TIMEOUT;

/// Everything a migration run needs to know besides the two seeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfiguration {
    pub node: String,

    /// `None` when no distinct fallback node is configured.
    pub fallback_node: Option<String>,
    pub scan: ScanConfiguration,
    pub search_rounds: usize,
    pub request_timeout: Duration,
    pub signer: PathBuf,
    pub signer_timeout: Duration,
    pub fresh_destination: bool,
    pub backend_url: String,

    /// Whether the signed bundle goes to the recovery backend.
    pub submit: bool,
}

impl Default for MigrationConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationConfiguration {
    /// Built-in defaults. Usually followed by [`Self::absorb_options`].
    pub fn new() -> Self {
        Self {
            node: DEFAULT_NODE.to_owned(),
            fallback_node: Some(FALLBACK_NODE.to_owned()),
            scan: ScanConfiguration::scan(),
            search_rounds: 0,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            signer: PathBuf::from("seed-signer"),
            signer_timeout: DEFAULT_SIGNER_TIMEOUT,
            fresh_destination: false,
            backend_url: DEFAULT_BACKEND_URL.to_owned(),
            submit: false,
        }
    }

    /// Self-consuming constructor-helper taking over the command-line
    /// options.
    pub fn absorb_options(mut self, cli_args: &cli_args::Args) -> Self {
        self.node = cli_args.node.clone();
        self.fallback_node = if cli_args.fallback_node == cli_args.node {
            info!("Fallback node equals primary node; running without fallback.");
            None
        } else {
            Some(cli_args.fallback_node.clone())
        };

        self.scan = ScanConfiguration::scan()
            .in_batches_of(cli_args.batch_size)
            .searching_ahead(cli_args.search_batch_size)
            .at_security(cli_args.security_level);
        self.search_rounds = cli_args.search_rounds;

        self.request_timeout = cli_args.request_timeout;
        self.signer = cli_args.signer.clone();
        self.signer_timeout = cli_args.signer_timeout;
        self.fresh_destination = cli_args.fresh_destination;
        self.backend_url = cli_args.backend_url.clone();
        self.submit = cli_args.submit;
        self
    }
}
