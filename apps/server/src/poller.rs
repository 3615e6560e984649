//! Background price poller.
//!
//! Each cycle fetches one market snapshot for the tracked assets, hands every
//! price to the history policy on its own task, and refreshes the dashboard.

use std::sync::Arc;

use chrono::Utc;
use cointrail_core::prices::PriceServiceTrait;
use cointrail_market_data::{MarketDataError, MarketDataProvider};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::dashboard::DashboardState;

/// Result of one successful cycle.
pub struct PollReport {
    /// Rows returned by the provider.
    pub fetched: usize,
    /// One task per dispatched price update. Dropping these does not cancel
    /// the updates.
    pub updates: Vec<JoinHandle<()>>,
}

pub struct PricePoller {
    provider: Arc<dyn MarketDataProvider>,
    price_service: Arc<dyn PriceServiceTrait>,
    dashboard: Arc<DashboardState>,
    tracked_assets: Vec<String>,
}

impl PricePoller {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        price_service: Arc<dyn PriceServiceTrait>,
        dashboard: Arc<DashboardState>,
        tracked_assets: Vec<String>,
    ) -> Self {
        Self {
            provider,
            price_service,
            dashboard,
            tracked_assets,
        }
    }

    pub fn tracked_assets(&self) -> &[String] {
        &self.tracked_assets
    }

    /// Runs a single poll cycle.
    ///
    /// A fetch failure is recorded on the dashboard and returned; the previous
    /// rows stay visible. Price updates are fire-and-forget and never fail the
    /// cycle. Dropping the future mid-fetch leaves the dashboard rows as they
    /// were and clears the refreshing flag.
    pub async fn run_cycle(&self) -> Result<PollReport, MarketDataError> {
        let _refresh = self.dashboard.begin_refresh();

        let tickers = match self
            .provider
            .get_market_snapshot(&self.tracked_assets)
            .await
        {
            Ok(tickers) => tickers,
            Err(e) => {
                if e.is_transient() {
                    warn!("Market snapshot from {} failed: {}", self.provider.id(), e);
                } else {
                    error!("Market snapshot from {} failed: {}", self.provider.id(), e);
                }
                self.dashboard.record_failure(e.to_string());
                return Err(e);
            }
        };

        let mut updates = Vec::with_capacity(tickers.len());
        for ticker in &tickers {
            let Some(price) = ticker.usable_price() else {
                debug!("No usable price for {}, skipping history update", ticker.id);
                continue;
            };
            updates.push(self.dispatch_update(ticker.id.clone(), price));
        }

        let fetched = tickers.len();
        self.dashboard.apply_snapshot(tickers, Utc::now());
        debug!(
            "Poll cycle fetched {} rows, dispatched {} updates",
            fetched,
            updates.len()
        );

        Ok(PollReport { fetched, updates })
    }

    fn dispatch_update(&self, asset_id: String, price: f64) -> JoinHandle<()> {
        let service = self.price_service.clone();
        tokio::spawn(async move {
            match service.record_price(&asset_id, price).await {
                Ok(outcome) if outcome.is_applied() => {
                    debug!("History updated for {} at {}", asset_id, price)
                }
                Ok(_) => {}
                Err(e) if e.is_client_error() => {
                    info!("History update for {} rejected: {}", asset_id, e)
                }
                Err(e) => warn!("History update for {} failed: {}", asset_id, e),
            }
        })
    }
}

/// Starts the background poller. The first cycle runs immediately.
pub fn start_price_poller(poller: Arc<PricePoller>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Price poller started ({}s interval, {} assets)",
            every.as_secs(),
            poller.tracked_assets().len()
        );

        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            // Failures are already logged and recorded on the dashboard.
            let _ = poller.run_cycle().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cointrail_core::errors::{Error, Result as CoreResult, StoreError};
    use cointrail_core::prices::{AssetRecord, PriceDocument, PricePoint, UpdateOutcome};
    use cointrail_market_data::MarketTicker;
    use std::sync::Mutex;

    struct FakeProvider {
        response: Mutex<Option<Result<Vec<MarketTicker>, MarketDataError>>>,
        requested: Mutex<Vec<Vec<String>>>,
    }

    impl FakeProvider {
        fn returning(result: Result<Vec<MarketTicker>, MarketDataError>) -> Self {
            Self {
                response: Mutex::new(Some(result)),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for FakeProvider {
        fn id(&self) -> &'static str {
            "FAKE"
        }

        async fn get_market_snapshot(
            &self,
            asset_ids: &[String],
        ) -> Result<Vec<MarketTicker>, MarketDataError> {
            self.requested.lock().unwrap().push(asset_ids.to_vec());
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    #[derive(Default)]
    struct RecordingPriceService {
        calls: Mutex<Vec<(String, f64)>>,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl PriceServiceTrait for RecordingPriceService {
        fn get_all(&self) -> CoreResult<PriceDocument> {
            Ok(PriceDocument::new())
        }

        fn get_one(&self, asset_id: &str) -> CoreResult<AssetRecord> {
            Err(Error::NotFound(asset_id.to_string()))
        }

        async fn record_price(&self, asset_id: &str, price: f64) -> CoreResult<UpdateOutcome> {
            self.calls
                .lock()
                .unwrap()
                .push((asset_id.to_string(), price));
            if self.fail_for.as_deref() == Some(asset_id) {
                return Err(StoreError::WriteFailed("disk full".into()).into());
            }
            Ok(UpdateOutcome::Applied(PricePoint::new(Utc::now(), price)))
        }
    }

    fn poller_with(
        provider: FakeProvider,
        service: Arc<RecordingPriceService>,
    ) -> (PricePoller, Arc<DashboardState>) {
        let dashboard = Arc::new(DashboardState::new());
        let poller = PricePoller::new(
            Arc::new(provider),
            service,
            dashboard.clone(),
            vec!["bitcoin".to_string(), "ethereum".to_string()],
        );
        (poller, dashboard)
    }

    #[tokio::test]
    async fn test_cycle_dispatches_one_update_per_priced_ticker() {
        let service = Arc::new(RecordingPriceService::default());
        let provider = FakeProvider::returning(Ok(vec![
            MarketTicker::new("bitcoin", "btc", "Bitcoin", Some(50000.4)),
            MarketTicker::new("ethereum", "eth", "Ethereum", None),
        ]));
        let (poller, dashboard) = poller_with(provider, service.clone());

        let report = poller.run_cycle().await.unwrap();
        assert_eq!(report.fetched, 2);
        assert_eq!(report.updates.len(), 1);
        for handle in report.updates {
            handle.await.unwrap();
        }

        assert_eq!(
            *service.calls.lock().unwrap(),
            vec![("bitcoin".to_string(), 50000.4)]
        );
        assert_eq!(dashboard.tickers().len(), 2);
        assert!(dashboard.view(None).error.is_none());
    }

    #[tokio::test]
    async fn test_failed_update_does_not_fail_cycle() {
        let service = Arc::new(RecordingPriceService {
            fail_for: Some("bitcoin".to_string()),
            ..Default::default()
        });
        let provider = FakeProvider::returning(Ok(vec![
            MarketTicker::new("bitcoin", "btc", "Bitcoin", Some(50000.4)),
            MarketTicker::new("ethereum", "eth", "Ethereum", Some(3100.0)),
        ]));
        let (poller, _) = poller_with(provider, service.clone());

        let report = poller.run_cycle().await.unwrap();
        for handle in report.updates {
            handle.await.unwrap();
        }
        assert_eq!(service.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_rows_and_sets_error() {
        let service = Arc::new(RecordingPriceService::default());
        let (poller, dashboard) = poller_with(
            FakeProvider::returning(Err(MarketDataError::RateLimited {
                provider: "FAKE".into(),
            })),
            service.clone(),
        );
        dashboard.apply_snapshot(
            vec![MarketTicker::new("bitcoin", "btc", "Bitcoin", Some(1.0))],
            Utc::now(),
        );

        let err = poller.run_cycle().await.err().unwrap();
        assert!(matches!(err, MarketDataError::RateLimited { .. }));

        let view = dashboard.view(None);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.error.as_deref(), Some("Rate limited: FAKE"));
        assert!(!view.is_refreshing);
        assert!(service.calls.lock().unwrap().is_empty());
    }

    struct StalledProvider;

    #[async_trait]
    impl MarketDataProvider for StalledProvider {
        fn id(&self) -> &'static str {
            "STALLED"
        }

        async fn get_market_snapshot(
            &self,
            _asset_ids: &[String],
        ) -> Result<Vec<MarketTicker>, MarketDataError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_cancelled_cycle_clears_refreshing_flag() {
        let dashboard = Arc::new(DashboardState::new());
        dashboard.apply_snapshot(
            vec![MarketTicker::new("bitcoin", "btc", "Bitcoin", Some(1.0))],
            Utc::now(),
        );
        let poller = PricePoller::new(
            Arc::new(StalledProvider),
            Arc::new(RecordingPriceService::default()),
            dashboard.clone(),
            vec!["bitcoin".to_string()],
        );

        let cycle = tokio::time::timeout(Duration::from_millis(50), poller.run_cycle()).await;
        assert!(cycle.is_err());

        let view = dashboard.view(None);
        assert!(!view.is_refreshing);
        assert_eq!(view.rows.len(), 1);
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn test_requests_tracked_assets() {
        let provider = Arc::new(FakeProvider::returning(Ok(Vec::new())));
        let dashboard = Arc::new(DashboardState::new());
        let poller = PricePoller::new(
            provider.clone(),
            Arc::new(RecordingPriceService::default()),
            dashboard,
            vec!["solana".to_string()],
        );

        poller.run_cycle().await.unwrap();
        assert_eq!(
            *provider.requested.lock().unwrap(),
            vec![vec!["solana".to_string()]]
        );
    }
}
