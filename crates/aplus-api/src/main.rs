use aplus_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    // Validate, start telemetry, build the analyzer and routes
    let (_state, router) = aplus_api::setup::initialize_app(config.clone()).await?;

    aplus_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
