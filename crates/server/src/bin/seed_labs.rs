//! Writes the demo lab catalog into a hosted PostgREST/Supabase project.
//!
//! Labs are inserted first, then tests, then prices, so the foreign keys on
//! `lab_test_prices` resolve. Ids are derived from names, so running this
//! twice against the same project fails on the second run with a conflict
//! rather than duplicating rows.
//!
//! ```bash
//! LABWISE_BACKEND_URL=https://abc.supabase.co \
//! LABWISE_BACKEND_API_KEY=... \
//! seed-labs
//! ```

use clap::Parser;
use labwise_persistence::seed::jaipur_catalog;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "seed-labs")]
#[command(about = "Insert the demo lab catalog into a hosted store")]
struct SeedArgs {
    /// Base URL of the hosted store.
    #[arg(long, env = "LABWISE_BACKEND_URL")]
    backend_url: String,

    /// API key for the hosted store.
    #[arg(long, env = "LABWISE_BACKEND_API_KEY", hide_env_values = true)]
    backend_api_key: Option<String>,

    /// Backend request timeout in seconds.
    #[arg(long, env = "LABWISE_BACKEND_TIMEOUT", default_value = "10")]
    backend_timeout: u64,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "LABWISE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Print what would be inserted without contacting the store.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = SeedArgs::parse();
    labwise_rest::init_logging(&args.log_level);

    let catalog = jaipur_catalog();
    info!(
        labs = catalog.labs.len(),
        tests = catalog.tests.len(),
        prices = catalog.prices.len(),
        "Prepared catalog"
    );

    if args.dry_run {
        for lab in &catalog.labs {
            println!("{}\t{}\t{}", lab.id, lab.name, lab.city);
        }
        return Ok(());
    }

    seed(&args, &catalog).await
}

#[cfg(feature = "postgrest")]
async fn seed(
    args: &SeedArgs,
    catalog: &labwise_persistence::seed::SeedCatalog,
) -> anyhow::Result<()> {
    use labwise_persistence::backends::postgrest::{PostgrestBackend, PostgrestConfig};
    use labwise_persistence::gateway::Gateway;

    let backend = PostgrestBackend::new(PostgrestConfig {
        base_url: args.backend_url.clone(),
        api_key: args.backend_api_key.clone(),
        timeout: std::time::Duration::from_secs(args.backend_timeout),
        ..Default::default()
    })?;
    let gateway = Gateway::new(backend);

    let report = catalog.apply(&gateway).await?;
    info!(
        labs = report.labs,
        tests = report.tests,
        prices = report.prices,
        "Seeding complete"
    );

    Ok(())
}

#[cfg(not(feature = "postgrest"))]
async fn seed(
    _args: &SeedArgs,
    _catalog: &labwise_persistence::seed::SeedCatalog,
) -> anyhow::Result<()> {
    anyhow::bail!(
        "seed-labs requires the 'postgrest' feature. \
         Build with: cargo build -p labwise-server --features postgrest"
    )
}
