use std::sync::Arc;

use cointrail_core::prices::{PriceService, PriceServiceTrait};
use cointrail_market_data::{CoinGeckoProvider, MarketDataProvider};
use cointrail_storage_json::JsonPriceRepository;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    config::{Config, LogFormat},
    dashboard::DashboardState,
    poller::PricePoller,
};

pub struct AppState {
    pub price_service: Arc<dyn PriceServiceTrait>,
    pub dashboard: Arc<DashboardState>,
    pub poller: Arc<PricePoller>,
}

pub fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format == LogFormat::Json {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Wires the JSON store and the CoinGecko provider. Must run inside a Tokio
/// runtime; the store spawns its writer task here.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let provider = CoinGeckoProvider::new(&config.market_data_url, config.upstream_timeout)?;
    tracing::info!("Market data provider: {}", config.market_data_url);
    build_state_with_provider(config, Arc::new(provider))
}

/// Same as [`build_state`] with an injected market data provider.
pub fn build_state_with_provider(
    config: &Config,
    provider: Arc<dyn MarketDataProvider>,
) -> anyhow::Result<Arc<AppState>> {
    tracing::info!("Price file in use: {}", config.data_file.display());
    let repository = Arc::new(JsonPriceRepository::new(&config.data_file));
    let price_service: Arc<dyn PriceServiceTrait> = Arc::new(PriceService::new(repository));
    let dashboard = Arc::new(DashboardState::new());
    let poller = Arc::new(PricePoller::new(
        provider,
        price_service.clone(),
        dashboard.clone(),
        config.tracked_assets.clone(),
    ));

    Ok(Arc::new(AppState {
        price_service,
        dashboard,
        poller,
    }))
}
