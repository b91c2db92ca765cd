use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;
use zeroize::Zeroizing;

use super::signer::SeedSigner;
use super::signer::SignerError;
use super::SeedSecret;
use crate::models::address::Address;
use crate::models::address::KeyIndex;
use crate::models::security_level::SecurityLevel;
use crate::models::transfer::Input;
use crate::models::transfer::Transfer;

pub const DEFAULT_SIGNER_TIMEOUT: Duration = Duration::from_secs(30);

/// Request written to the signer's stdin, one per process.
#[derive(Debug, Serialize)]
#[serde(tag = "job", rename_all = "lowercase")]
enum SignerJob<'a> {
    Gen {
        seed: &'a str,
        index: KeyIndex,
        security: SecurityLevel,
        total: usize,
    },
    Sign {
        seed: &'a str,
        transfers: &'a [Transfer],
        inputs: &'a [Input],
    },
}

impl SignerJob<'_> {
    fn name(&self) -> &'static str {
        match self {
            Self::Gen { .. } => "gen",
            Self::Sign { .. } => "sign",
        }
    }

    /// The JSON sent to the signer. It carries the seed, so it is wiped when
    /// dropped.
    fn payload(&self) -> Result<Zeroizing<Vec<u8>>, SignerError> {
        Ok(Zeroizing::new(serde_json::to_vec(self)?))
    }
}

/// Runs an external program for every job.
///
/// The program reads one JSON job from stdin and writes its JSON result to
/// stdout: an array of addresses for `gen`, an array of transaction trytes for
/// `sign`. A process that has not exited after `timeout` is killed.
#[derive(Debug, Clone)]
pub struct ProcessSigner {
    program: PathBuf,
    timeout: Duration,
}

impl ProcessSigner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_SIGNER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run<R: DeserializeOwned>(&self, job: &SignerJob<'_>) -> Result<R, SignerError> {
        let name = job.name();
        debug!("spawning signer {} for job `{}`", self.program.display(), name);

        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let payload = job.payload()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload).await?;
            stdin.shutdown().await?;
        }

        // dropping the child on timeout kills it
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| SignerError::Timeout {
                job: name,
                timeout: self.timeout,
            })??;

        if !output.status.success() {
            return Err(SignerError::Failed {
                job: name,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[async_trait::async_trait]
impl SeedSigner for ProcessSigner {
    async fn generate_addresses(
        &self,
        seed: &SeedSecret,
        index: KeyIndex,
        count: usize,
        security: SecurityLevel,
    ) -> Result<Vec<Address>, SignerError> {
        let job = SignerJob::Gen {
            seed: seed.expose_trytes(),
            index,
            security,
            total: count,
        };
        let addresses: Vec<Address> = self.run(&job).await?;
        if addresses.len() != count {
            return Err(SignerError::AddressCountMismatch {
                expected: count,
                actual: addresses.len(),
            });
        }
        Ok(addresses)
    }

    async fn sign_transfers(
        &self,
        seed: &SeedSecret,
        transfers: &[Transfer],
        inputs: &[Input],
    ) -> Result<Vec<String>, SignerError> {
        let job = SignerJob::Sign {
            seed: seed.expose_trytes(),
            transfers,
            inputs,
        };
        self.run(&job).await
    }
}
