//! Resets the configured store to the demo dataset.

use rand::rngs::StdRng;
use rand::SeedableRng;
use santry::{seed, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let state = AppState::init().await?;
    let mut rng = StdRng::from_entropy();
    let summary = seed::populate(state.store.as_ref(), &mut rng).await?;

    println!("\nSummary of created data:\n{}", summary);
    Ok(())
}
