use tilestream_sim::{run_simulation, SimConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tilestream_core=info,tilestream_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SimConfig::from_env()?;
    let report = run_simulation(&config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
