//! Builds the dashboard view (price tile, chart, summary table) from the
//! CoinGecko fetchers and keeps the most recent one around for readers.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::dashboard::{
    ChartSeries, DashboardView, HistoryResponse, Notice, Notices, PriceResponse,
    SummaryResponse, NO_HISTORY_MESSAGE, PRICE_UNAVAILABLE_MESSAGE,
};
use crate::models::history::HistorySeries;
use crate::models::price::{PriceSnapshot, PriceTile};
use crate::models::selection::{Currency, Days, Selection};
use crate::models::summary::SummaryRow;
use crate::services::coingecko::CoinGeckoService;
use crate::services::summary::summarize;

#[derive(Clone)]
pub struct DashboardService {
    coingecko: CoinGeckoService,
    defaults: Selection,
    latest: Arc<RwLock<Option<DashboardView>>>,
}

impl DashboardService {
    pub fn new(coingecko: CoinGeckoService, defaults: Selection) -> Self {
        Self {
            coingecko,
            defaults,
            latest: Arc::new(RwLock::new(None)),
        }
    }

    pub fn defaults(&self) -> &Selection {
        &self.defaults
    }

    pub async fn price(&self, coin_id: &str, currency: Currency) -> PriceResponse {
        let mut notices = Notices::default();
        let snapshot = self.load_price(coin_id, currency, &mut notices).await;

        PriceResponse {
            tile: snapshot.as_ref().map(PriceTile::from),
            cache_expires_in_secs: self.coingecko.price_expires_in_secs(coin_id, currency).await,
            snapshot,
            notices: notices.into_vec(),
        }
    }

    pub async fn history(&self, selection: &Selection) -> HistoryResponse {
        let mut notices = Notices::default();
        let series = self.load_histories(selection, &mut notices).await;
        let chart = chart_series(&series, &mut notices);

        HistoryResponse {
            currency: selection.currency,
            days: selection.days,
            series: chart,
            notices: notices.into_vec(),
        }
    }

    pub async fn summary(&self, selection: &Selection) -> SummaryResponse {
        let mut notices = Notices::default();
        let series = self.load_histories(selection, &mut notices).await;

        SummaryResponse {
            rows: summary_rows(&series),
            notices: notices.into_vec(),
        }
    }

    /// Build the full view for `selection`.
    pub async fn build(&self, selection: &Selection) -> DashboardView {
        let mut notices = Notices::default();

        let snapshot = match selection.primary_coin() {
            Some(coin_id) => {
                self.load_price(coin_id, selection.currency, &mut notices)
                    .await
            }
            None => None,
        };

        let series = self.load_histories(selection, &mut notices).await;
        let chart = chart_series(&series, &mut notices);
        let summary = summary_rows(&series);

        DashboardView {
            selection: selection.clone(),
            tile: snapshot.as_ref().map(PriceTile::from),
            snapshot,
            chart,
            summary,
            notices: notices.into_vec(),
            built_at: Utc::now(),
        }
    }

    /// Rebuild the default view and publish it as the latest one.
    pub async fn refresh(&self) -> DashboardView {
        let view = self.build(&self.defaults).await;

        tracing::info!(
            "Dashboard refreshed: {} chart series, {} summary rows, {} notices",
            view.chart.len(),
            view.summary.len(),
            view.notices.len()
        );

        *self.latest.write().await = Some(view.clone());
        view
    }

    /// Latest published view, building one first if none exists yet.
    pub async fn latest(&self) -> DashboardView {
        if let Some(view) = self.latest.read().await.as_ref() {
            return view.clone();
        }

        self.refresh().await
    }

    async fn load_price(
        &self,
        coin_id: &str,
        currency: Currency,
        notices: &mut Notices,
    ) -> Option<PriceSnapshot> {
        match self.coingecko.fetch_price(coin_id, currency).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::debug!("No current price for {}: {}", coin_id, e);
                notices.record(&e, "current price");
                notices.push(Notice::warning(PRICE_UNAVAILABLE_MESSAGE));
                None
            }
        }
    }

    /// One fetch per selected coin, in selection order. Failed fetches yield
    /// an empty series.
    async fn load_histories(
        &self,
        selection: &Selection,
        notices: &mut Notices,
    ) -> Vec<(String, HistorySeries)> {
        let mut all = Vec::with_capacity(selection.coins.len());

        for coin_id in &selection.coins {
            let series = self
                .load_history(coin_id, selection.currency, selection.days, notices)
                .await;
            all.push((coin_id.clone(), series));
        }

        all
    }

    async fn load_history(
        &self,
        coin_id: &str,
        currency: Currency,
        days: Days,
        notices: &mut Notices,
    ) -> HistorySeries {
        self.coingecko
            .fetch_history(coin_id, currency, days)
            .await
            .unwrap_or_else(|e| {
                tracing::debug!("No history for {}: {}", coin_id, e);
                notices.record(&e, "historical data");
                HistorySeries::default()
            })
    }
}

fn chart_series(series: &[(String, HistorySeries)], notices: &mut Notices) -> Vec<ChartSeries> {
    let chart: Vec<ChartSeries> = series
        .iter()
        .filter(|(_, s)| !s.is_empty())
        .map(|(coin, s)| ChartSeries {
            coin: coin.clone(),
            points: s.points().to_vec(),
        })
        .collect();

    if chart.is_empty() {
        notices.push(Notice::warning(NO_HISTORY_MESSAGE));
    }

    chart
}

fn summary_rows(series: &[(String, HistorySeries)]) -> Vec<SummaryRow> {
    series
        .iter()
        .filter_map(|(coin, s)| summarize(coin, s))
        .collect()
}
