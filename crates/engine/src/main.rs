//! ItemFlow Engine - replays a scenario file.
//!
//! ```text
//! itemflow-engine <scenario.json>
//! ```
//!
//! Prints the final actors, the mutation log and the macro calls as JSON.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use itemflow_engine::infrastructure::config::EngineConfig;
use itemflow_engine::scenario::Scenario;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary is usually run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging (stderr, so stdout stays valid JSON)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "itemflow_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: itemflow-engine <scenario.json>")?;

    let config = EngineConfig::from_env()?;
    tracing::info!(
        scenario = %path,
        max_chain_depth = config.dispatch.max_chain_depth,
        notify_errors = config.dispatch.notify_errors,
        "Starting ItemFlow Engine"
    );

    let scenario = Scenario::load(&path)
        .await
        .with_context(|| format!("loading {}", path))?;
    let steps = scenario.steps.len();
    let outcome = scenario.run(config).await?;

    tracing::info!(
        steps,
        mutations = outcome.mutations.len(),
        macro_calls = outcome.macro_calls.len(),
        "Scenario complete"
    );
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
