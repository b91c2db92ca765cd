use tracing_subscriber::EnvFilter;
use tracing_subscriber::FmtSubscriber;

/// `#[traced_test]` filters out events from seed_migration when used in an
/// integration test, since each test file is its own crate.
///
/// Call this at the start of each test instead. There can be only one global
/// default subscriber, so the two cannot be mixed.
pub fn tracing_logger() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("self=trace,seed_migration=trace"));
    let subscriber = FmtSubscriber::builder()
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_env_filter(env_filter)
        .with_thread_ids(true)
        .finish();

    // fails once another test in this process set it first
    let _result = tracing::subscriber::set_global_default(subscriber);
}
