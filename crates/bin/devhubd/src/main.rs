use std::time::Instant;

use devhub_app::services::hub_service::HubService;
use devhubd::config::Config;
use devhubd::scenario;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    let start = Instant::now();

    let hub = HubService::default();
    let household = scenario::register_household(&hub, &config.devices).await?;
    tracing::info!(
        light = %household.light_id,
        speaker = %household.speaker_id,
        toilet = %household.toilet_id,
        "household registered"
    );

    let reports = scenario::run(&hub, &household).await?;
    tracing::info!(programs = reports.len(), "scenario complete");

    println!("Elapsed: {:.3}s", start.elapsed().as_secs_f64());
    Ok(())
}
