use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crypto_dashboard::error::FetchError;
use crypto_dashboard::models::selection::Selection;
use crypto_dashboard::services::cache::{CacheSettings, ManualClock};
use crypto_dashboard::services::coingecko::CoinGeckoService;
use crypto_dashboard::services::dashboard::DashboardService;
use crypto_dashboard::services::transport::{Transport, UpstreamResponse};
use crypto_dashboard::{build_router, AppState};

/// Canned CoinGecko: answers by path, records "path?query" for every call.
#[derive(Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<String, (u16, String)>>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl StubTransport {
    pub fn respond(&self, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .insert(path.to_string(), (status, body.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<UpstreamResponse, FetchError> {
        let rendered: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        self.calls
            .lock()
            .push(format!("{}?{}", path, rendered.join("&")));

        let (status, body) = self
            .routes
            .lock()
            .get(path)
            .cloned()
            .unwrap_or((404, r#"{"error":"coin not found"}"#.to_string()));

        Ok(UpstreamResponse { status, body })
    }
}

pub fn market_chart_path(coin_id: &str) -> String {
    format!("/coins/{}/market_chart", coin_id)
}

pub const SIMPLE_PRICE_PATH: &str = "/simple/price";

pub struct TestApp {
    pub router: Router,
    pub transport: Arc<StubTransport>,
    pub clock: Arc<ManualClock>,
}

/// Router wired to a stub upstream and a manual clock
pub fn build_test_app(defaults: Selection) -> TestApp {
    let transport = Arc::new(StubTransport::default());
    let clock = Arc::new(ManualClock::new(Utc::now()));

    let coingecko = CoinGeckoService::new(
        transport.clone(),
        CacheSettings::default(),
        clock.clone(),
    );

    let state = AppState {
        dashboard: DashboardService::new(coingecko, defaults),
        refresh_interval_secs: 0,
    };

    TestApp {
        router: build_router(state),
        transport,
        clock,
    }
}
