use e2e_harness::api::bootstrap;
use e2e_harness::config::{load_env_file, ProcessEnv};
use e2e_harness::logging;

/// Global setup for a test run: load the environment file and persist a
/// fresh bearer token for the API suites.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let root = std::env::current_dir()?;
    if let Err(e) = load_env_file(&root) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    tracing::info!("Bootstrapping API session...");
    if let Err(e) = bootstrap(&ProcessEnv).await {
        tracing::error!("API bootstrap failed: {}", e);
        tracing::error!("Please verify:");
        tracing::error!("  - API_AUTH_URL points at the token endpoint");
        tracing::error!("  - CLIENT_ID and CLIENT_SECRET are valid");
        std::process::exit(1);
    }

    tracing::info!("API session ready");
    Ok(())
}
