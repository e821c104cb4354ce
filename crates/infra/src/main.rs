use shopkeep_infra::{AppContext, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shopkeep_observability::init();

    let config = Config::from_env();
    let context = AppContext::start(config).await?;

    tracing::info!("shopkeep ready; press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    context.shutdown().await?;
    Ok(())
}
