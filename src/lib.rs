pub mod config_models;
pub mod crypto;
pub mod ledger;
pub mod migration;
pub mod models;
pub mod recovery_backend;
pub mod seed;


use std::sync::Arc;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tracing::error;
use tracing::info;
use tracing::warn;
use zeroize::Zeroize;

use crate::config_models::cli_args;
use crate::config_models::migration_configuration::MigrationConfiguration;
use crate::ledger::HttpNode;
use crate::ledger::LedgerClient;
use crate::ledger::LedgerNode;
use crate::migration::MigrationError;
use crate::migration::MigrationSession;
use crate::models::iotas::Iotas;
use crate::models::transaction::SignedBundle;
use crate::recovery_backend::RecoveryBackend;
use crate::seed::process_signer::ProcessSigner;
use crate::seed::signer::SeedSigner;
use crate::seed::SeedHandle;
use crate::seed::SeedSecret;

/// Runs one migration as configured by `cli_args`, reading both seeds from
/// standard input.
pub async fn initialize(cli_args: cli_args::Args) -> Result<()> {
    let configuration = MigrationConfiguration::new().absorb_options(&cli_args);
    info!("Starting seed migration against {}", configuration.node);

    let (source_seed, destination_seed) = read_seed_pair(BufReader::new(tokio::io::stdin()))
        .await
        .context("could not read seeds from standard input")?;

    let signer: Arc<dyn SeedSigner> = Arc::new(
        ProcessSigner::new(&configuration.signer).with_timeout(configuration.signer_timeout),
    );
    let source = SeedHandle::new(source_seed, signer.clone());
    let destination = SeedHandle::new(destination_seed, signer);

    let primary = HttpNode::new(&configuration.node, configuration.request_timeout)?;
    let ledger = match &configuration.fallback_node {
        Some(fallback) => LedgerClient::with_fallback(
            primary,
            HttpNode::new(fallback, configuration.request_timeout)?,
        ),
        None => LedgerClient::new(primary),
    };

    let bundle = match migrate(&ledger, &configuration, &source, &destination).await {
        Ok(bundle) => bundle,
        Err(e) => {
            error!("Migration failed, {}: {}", e.recovery_action(), e);
            return Err(e.into());
        }
    };

    println!("{}", serde_json::to_string_pretty(bundle.trytes())?);

    if configuration.submit {
        submit(&configuration, &bundle).await?;
    }
    Ok(())
}

async fn migrate<N: LedgerNode>(
    ledger: &LedgerClient<N>,
    configuration: &MigrationConfiguration,
    source: &SeedHandle,
    destination: &SeedHandle,
) -> Result<SignedBundle, MigrationError> {
    let mut session = MigrationSession::start(ledger, configuration.scan, source, destination)?;

    session.sync_source().await?;
    for round in 1..=configuration.search_rounds {
        let found = session.search_more_source().await?;
        info!("Search round {}: {} more addresses", round, found.len());
    }
    info!("Balance to migrate: {}", Iotas(session.source_balance()?));

    if configuration.fresh_destination {
        session.use_fresh_destination().await?;
    } else {
        session.sync_destination().await?;
    }

    let bundle = session.prepare_bundle().await?;
    session.finish();
    Ok(bundle)
}

async fn submit(configuration: &MigrationConfiguration, bundle: &SignedBundle) -> Result<()> {
    let Some(bundle_hash) = bundle.bundle_hash() else {
        bail!("refusing to submit a bundle whose transactions disagree on the bundle hash");
    };

    let backend = RecoveryBackend::new(&configuration.backend_url, configuration.request_timeout)?;
    backend.save_bundle(bundle_hash, bundle.trytes()).await?;

    match backend.bundle_states(&[bundle_hash.to_owned()]).await {
        Ok(states) => {
            for (hash, state) in states {
                info!("Bundle {} is {}", hash, state);
            }
        }
        Err(e) => warn!("Bundle saved, but its state could not be read back: {}", e),
    }
    Ok(())
}

/// Reads the source seed, then the destination seed, one per line.
async fn read_seed_pair<R: AsyncBufRead + Unpin>(
    mut reader: R,
) -> Result<(SeedSecret, SeedSecret)> {
    let source = read_seed(&mut reader, "source").await?;
    let destination = read_seed(&mut reader, "destination").await?;
    if source.expose_trytes() == destination.expose_trytes() {
        bail!("source and destination seed are the same");
    }
    Ok((source, destination))
}

async fn read_seed<R: AsyncBufRead + Unpin>(reader: &mut R, role: &str) -> Result<SeedSecret> {
    let mut line = String::new();
    let read = reader.read_line(&mut line).await;
    let seed = match read {
        Ok(0) => Err(anyhow::anyhow!("missing {} seed", role)),
        Ok(_) => SeedSecret::from_trytes(&line).with_context(|| format!("invalid {} seed", role)),
        Err(e) => Err(e.into()),
    };
    line.zeroize();
    seed
}
