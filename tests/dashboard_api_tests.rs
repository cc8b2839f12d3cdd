mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Duration as ChronoDuration;
use serde_json::Value;
use tower::ServiceExt;

use crypto_dashboard::models::selection::Selection;

use crate::common::{build_test_app, market_chart_path, SIMPLE_PRICE_PATH};

const TWO_DAY_CHART: &str = r#"{"prices": [[0, 100], [86400000, 110]]}"#;

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);

    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri).await
}

fn two_coins() -> Selection {
    Selection {
        coins: vec!["bitcoin".to_string(), "ethereum".to_string()],
        ..Selection::default()
    }
}

#[tokio::test]
async fn test_history_returns_chart_series() {
    let app = build_test_app(Selection::default());
    app.transport
        .respond(&market_chart_path("bitcoin"), 200, TWO_DAY_CHART);

    let (status, json) = get(&app.router, "/api/history?coins=bitcoin&currency=usd&days=7").await;

    assert_eq!(status, StatusCode::OK);
    let series = json["series"].as_array().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0]["coin"], "bitcoin");

    let points = series[0]["points"].as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["date"], "1970-01-01T00:00:00Z");
    assert_eq!(points[0]["price"], 100.0);
    assert_eq!(points[1]["date"], "1970-01-02T00:00:00Z");
    assert_eq!(points[1]["price"], 110.0);
    assert!(json["notices"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_summary_rows() {
    let app = build_test_app(Selection::default());
    app.transport
        .respond(&market_chart_path("bitcoin"), 200, TWO_DAY_CHART);

    let (status, json) = get(&app.router, "/api/summary?coins=bitcoin,ethereum").await;

    assert_eq!(status, StatusCode::OK);
    // ethereum has no canned response, so only bitcoin gets a row
    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["coin"], "Bitcoin");
    assert_eq!(rows[0]["max_price"], 110.0);
    assert_eq!(rows[0]["min_price"], 100.0);
    assert_eq!(rows[0]["avg_price"], 105.0);
    assert_eq!(rows[0]["change_percent"], 10.0);

    let notices = json["notices"].as_array().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["level"], "error");
    assert_eq!(notices[0]["message"], "Error fetching historical data: 404");
}

#[tokio::test]
async fn test_empty_history_body_has_no_summary() {
    let app = build_test_app(Selection::default());
    app.transport.respond(&market_chart_path("bitcoin"), 200, "{}");

    let (_, history) = get(&app.router, "/api/history?coins=bitcoin").await;
    assert!(history["series"].as_array().unwrap().is_empty());
    let notices = history["notices"].as_array().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["message"], "No historical price data available.");

    let (_, summary) = get(&app.router, "/api/summary?coins=bitcoin").await;
    assert!(summary["rows"].as_array().unwrap().is_empty());
    assert!(summary["notices"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_rate_limited_price_is_a_warning() {
    let app = build_test_app(Selection::default());
    app.transport.respond(SIMPLE_PRICE_PATH, 429, "");

    let (status, json) = get(&app.router, "/api/price?coin=bitcoin&currency=usd").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["tile"].is_null());
    assert!(json["snapshot"].is_null());

    let notices = json["notices"].as_array().unwrap();
    assert!(!notices.is_empty());
    assert!(notices.iter().all(|n| n["level"] == "warning"));
    assert_eq!(notices[0]["message"], "Rate limit exceeded. Please try again later.");
}

#[tokio::test]
async fn test_upstream_error_price_is_an_error_notice() {
    let app = build_test_app(Selection::default());
    app.transport.respond(SIMPLE_PRICE_PATH, 503, "maintenance");

    let (status, json) = get(&app.router, "/api/price?coin=bitcoin").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["tile"].is_null());
    let notices = json["notices"].as_array().unwrap();
    assert_eq!(notices[0]["level"], "error");
    assert_eq!(notices[0]["message"], "Error fetching current price: 503");
    assert_eq!(notices[1]["message"], "Unable to fetch current price.");
}

#[tokio::test]
async fn test_price_tile_is_cached() {
    let app = build_test_app(Selection::default());
    app.transport.respond(
        SIMPLE_PRICE_PATH,
        200,
        r#"{"bitcoin": {"eur": 61234.5, "eur_market_cap": 1200000000000, "eur_24h_change": 1.234}}"#,
    );

    let (status, first) = get(&app.router, "/api/price?coin=bitcoin&currency=EUR").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["tile"]["title"], "Current Bitcoin Price (EUR)");
    assert_eq!(first["tile"]["price"], "61,234.50");
    assert_eq!(first["tile"]["market_cap"], "1,200,000,000,000.00");
    assert_eq!(first["tile"]["change_24h"], "1.23%");
    assert_eq!(first["cache_expires_in_secs"], 600);

    app.clock.advance(ChronoDuration::seconds(300));
    let (_, second) = get(&app.router, "/api/price?coin=bitcoin&currency=eur").await;

    assert_eq!(first["snapshot"], second["snapshot"]);
    assert_eq!(second["cache_expires_in_secs"], 300);
    assert_eq!(app.transport.call_count(), 1);
}

#[tokio::test]
async fn test_history_cached_per_currency() {
    let app = build_test_app(Selection::default());
    app.transport
        .respond(&market_chart_path("bitcoin"), 200, TWO_DAY_CHART);

    for uri in [
        "/api/history?coins=bitcoin&currency=usd&days=7",
        "/api/history?coins=bitcoin&currency=eur&days=7",
        "/api/summary?coins=bitcoin&currency=usd&days=7",
        "/api/summary?coins=bitcoin&currency=eur&days=7",
    ] {
        let (status, _) = get(&app.router, uri).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(
        app.transport.calls(),
        vec![
            "/coins/bitcoin/market_chart?vs_currency=usd&days=7",
            "/coins/bitcoin/market_chart?vs_currency=eur&days=7",
        ]
    );
}

#[tokio::test]
async fn test_invalid_selection_is_rejected() {
    let app = build_test_app(Selection::default());

    for uri in [
        "/api/history?currency=jpy",
        "/api/history?days=31",
        "/api/history?days=0",
        "/api/history?days=abc",
        "/api/history?days=-5",
        "/api/summary?days=99999999999",
        "/api/summary?coins=,,",
        "/api/price?coin=bit%2Fcoin",
    ] {
        let (status, json) = get(&app.router, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(json["error"].is_string());
    }

    assert_eq!(app.transport.call_count(), 0);
}

#[tokio::test]
async fn test_dashboard_view_and_manual_refresh() {
    let app = build_test_app(two_coins());
    app.transport.respond(
        SIMPLE_PRICE_PATH,
        200,
        r#"{"bitcoin": {"usd": 100.0, "usd_market_cap": 2000.0, "usd_24h_change": -0.5}}"#,
    );
    app.transport
        .respond(&market_chart_path("bitcoin"), 200, TWO_DAY_CHART);
    app.transport.respond(
        &market_chart_path("ethereum"),
        200,
        r#"{"prices": [[0, 0], [86400000, 5]]}"#,
    );

    let (status, view) = get(&app.router, "/api/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["selection"]["coins"], serde_json::json!(["bitcoin", "ethereum"]));
    assert_eq!(view["selection"]["currency"], "usd");
    assert_eq!(view["selection"]["days"], 7);
    assert_eq!(view["tile"]["price"], "100.00");
    assert_eq!(view["chart"].as_array().unwrap().len(), 2);

    let summary = view["summary"].as_array().unwrap();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[1]["coin"], "Ethereum");
    // first price is zero: change is left empty
    assert!(summary[1]["change_percent"].is_null());
    assert!(view["notices"].as_array().unwrap().is_empty());

    let calls_after_build = app.transport.call_count();
    assert_eq!(calls_after_build, 3);

    // Manual refresh inside the TTL reuses cached upstream data
    let (status, refreshed) = send(&app.router, "POST", "/api/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refreshed["summary"], view["summary"]);
    assert_eq!(app.transport.call_count(), calls_after_build);

    // After the TTL the next refresh goes back upstream
    app.clock.advance(ChronoDuration::seconds(600));
    send(&app.router, "POST", "/api/refresh").await;
    assert_eq!(app.transport.call_count(), calls_after_build * 2);
}

#[tokio::test]
async fn test_options() {
    let app = build_test_app(Selection::default());

    let (status, json) = get(&app.router, "/api/options").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["coins"],
        serde_json::json!(["bitcoin", "ethereum", "cardano", "dogecoin"])
    );
    assert_eq!(json["currencies"], serde_json::json!(["usd", "eur", "cad", "gbp"]));
    assert_eq!(json["min_days"], 1);
    assert_eq!(json["max_days"], 30);
    assert_eq!(json["refresh_intervals"], serde_json::json!([0, 10, 30, 60]));
}
