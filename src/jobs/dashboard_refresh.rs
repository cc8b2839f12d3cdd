use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::services::dashboard::DashboardService;

/// Extra delay added to every auto-refresh period to stay clear of rate limits
pub const RATE_LIMIT_PADDING_SECS: u64 = 10;

/// Effective period between automatic rebuilds; `None` when auto-refresh is off.
pub fn refresh_period(refresh_interval_secs: u64) -> Option<Duration> {
    (refresh_interval_secs > 0)
        .then(|| Duration::from_secs(refresh_interval_secs + RATE_LIMIT_PADDING_SECS))
}

pub async fn start_dashboard_refresh_job(dashboard: DashboardService, refresh_interval_secs: u64) {
    let Some(period) = refresh_period(refresh_interval_secs) else {
        tracing::info!("Dashboard auto-refresh disabled");
        return;
    };

    tokio::spawn(async move {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Refreshing dashboard every {} seconds",
            period.as_secs()
        );

        // First tick completes immediately
        loop {
            interval.tick().await;
            dashboard.refresh().await;
        }
    });
}
