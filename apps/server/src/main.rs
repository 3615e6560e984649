use cointrail_server::{api::app_router, build_state, config::Config, init_tracing, poller};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);
    let state = build_state(&config).await?;

    if config.poll_enabled {
        poller::start_price_poller(state.poller.clone(), config.poll_interval);
    } else {
        tracing::info!("Price poller disabled (CT_POLL_ENABLED=false)");
    }

    let router = app_router(state, &config);
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
