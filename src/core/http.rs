//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::config::{AppConfig, MarketDataConfig};
use crate::error::AnalysisError;
use crate::inference::SequenceModel;
use crate::metrics::Metrics;
use crate::models::credentials::{AdvisoryCredentials, Credentials, MarketDataCredentials};
use crate::models::symbol::normalize_symbol;
use crate::services::market_data::{
    is_supported_interval, BinanceMarketDataProvider, MarketDataProvider, Provenance,
    SUPPORTED_INTERVALS,
};
use crate::signals::engine::{AnalysisEngine, AnalysisRequest};

pub const SERVICE_NAME: &str = "fusetrade-signal-engine";

pub const MARKET_DATA_KEY_HEADER: &str = "x-market-data-key";
pub const MARKET_DATA_SECRET_HEADER: &str = "x-market-data-secret";
pub const ADVISORY_KEY_HEADER: &str = "x-advisory-key";

const MAX_KLINES: usize = 1000;
const MAX_TOP_COINS: usize = 500;
const DEFAULT_TOP_COINS: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub engine: Arc<AnalysisEngine>,
    pub market_data: Arc<dyn MarketDataProvider>,
    pub market_config: MarketDataConfig,
}

impl AppState {
    pub fn new(
        engine: Arc<AnalysisEngine>,
        market_data: Arc<dyn MarketDataProvider>,
        market_config: MarketDataConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            metrics,
            start_time: Arc::new(Instant::now()),
            engine,
            market_data,
            market_config,
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "service": SERVICE_NAME,
        "model_version": state.engine.model().model_version()
    }))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();

    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();

    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

/// Credentials forwarded by the identity layer. Blank headers count as absent.
pub fn credentials_from_headers(headers: &HeaderMap) -> Credentials {
    let header = |name: &str| -> Option<String> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let market_data = header(MARKET_DATA_KEY_HEADER).map(|key| {
        MarketDataCredentials::new(key, header(MARKET_DATA_SECRET_HEADER).unwrap_or_default())
    });
    let advisory = header(ADVISORY_KEY_HEADER).map(AdvisoryCredentials::new);

    Credentials::new(market_data, advisory)
}

fn error_status(err: &AnalysisError) -> StatusCode {
    match err {
        AnalysisError::InvalidSymbol(_) => StatusCode::BAD_REQUEST,
        AnalysisError::InsufficientData { .. }
        | AnalysisError::MalformedCandles(_)
        | AnalysisError::FeatureAssembly(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AnalysisError::ModelInference(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Failed analyses still answer HOLD with a diagnostic.
fn analysis_error_response(symbol: &str, err: &AnalysisError) -> Response {
    (
        error_status(err),
        Json(json!({
            "success": false,
            "symbol": symbol,
            "final_signal": "HOLD",
            "error": {
                "kind": err.kind(),
                "message": err.to_string()
            }
        })),
    )
        .into_response()
}

fn bad_request(symbol: Option<&str>, kind: &str, message: String) -> Response {
    let mut body = json!({
        "success": false,
        "error": { "kind": kind, "message": message }
    });
    if let Some(symbol) = symbol {
        body["symbol"] = json!(symbol);
    }
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn mode_for(provenance: Provenance) -> &'static str {
    if provenance == Provenance::Authenticated {
        "live"
    } else {
        "simulated"
    }
}

/// Run the full analysis for one symbol
async fn analyze_symbol(
    State(state): State<AppState>,
    Path(raw_symbol): Path<String>,
    headers: HeaderMap,
) -> Response {
    let symbol = match normalize_symbol(&raw_symbol) {
        Ok(symbol) => symbol,
        Err(e) => {
            state
                .metrics
                .analysis_failures_total
                .with_label_values(&[e.kind()])
                .inc();
            return analysis_error_response(&raw_symbol, &e);
        }
    };
    let credentials = credentials_from_headers(&headers);

    let feed = state
        .market_data
        .fetch_candles(
            &symbol,
            &state.market_config.interval,
            state.market_config.limit,
            credentials.market_data.as_ref(),
        )
        .await;

    let request = AnalysisRequest {
        symbol: feed.symbol,
        candles: feed.candles,
        provenance: feed.provenance,
        advisory_credentials: credentials.advisory,
    };

    match state.engine.analyze(request).await {
        Ok(result) => Json(json!({ "success": true, "data": result })).into_response(),
        Err(e) => analysis_error_response(&symbol, &e),
    }
}

#[derive(Debug, Deserialize)]
struct KlinesQuery {
    interval: Option<String>,
    limit: Option<usize>,
}

/// Chart-ready candles, time in epoch seconds
async fn get_klines(
    State(state): State<AppState>,
    Path(raw_symbol): Path<String>,
    Query(params): Query<KlinesQuery>,
    headers: HeaderMap,
) -> Response {
    let symbol = match normalize_symbol(&raw_symbol) {
        Ok(symbol) => symbol,
        Err(e) => return analysis_error_response(&raw_symbol, &e),
    };

    let limit = params.limit.unwrap_or(state.market_config.limit);
    if limit == 0 || limit > MAX_KLINES {
        return bad_request(
            Some(&symbol),
            "invalid_limit",
            format!("limit must be within 1..={}, got {}", MAX_KLINES, limit),
        );
    }
    let interval = params
        .interval
        .unwrap_or_else(|| state.market_config.interval.clone());
    if !is_supported_interval(&interval) {
        return bad_request(
            Some(&symbol),
            "invalid_interval",
            format!(
                "interval must be one of {}, got '{}'",
                SUPPORTED_INTERVALS.join(", "),
                interval
            ),
        );
    }
    let credentials = credentials_from_headers(&headers);

    let feed = state
        .market_data
        .fetch_candles(&symbol, &interval, limit, credentials.market_data.as_ref())
        .await;

    let data: Vec<Value> = feed
        .candles
        .iter()
        .map(|c| {
            json!({
                "time": c.open_time.timestamp(),
                "open": c.open,
                "high": c.high,
                "low": c.low,
                "close": c.close,
                "volume": c.volume
            })
        })
        .collect();
    Json(json!({
        "success": true,
        "symbol": feed.symbol,
        "mode": mode_for(feed.provenance),
        "provenance": feed.provenance,
        "data": data
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
struct TopCoinsQuery {
    limit: Option<usize>,
}

/// USDT pairs ranked by 24h quote volume
async fn get_top_coins(
    State(state): State<AppState>,
    Query(params): Query<TopCoinsQuery>,
    headers: HeaderMap,
) -> Response {
    let limit = params.limit.unwrap_or(DEFAULT_TOP_COINS);
    if limit == 0 || limit > MAX_TOP_COINS {
        return bad_request(
            None,
            "invalid_limit",
            format!("limit must be within 1..={}, got {}", MAX_TOP_COINS, limit),
        );
    }
    let credentials = credentials_from_headers(&headers);

    let feed = state
        .market_data
        .top_coins(limit, credentials.market_data.as_ref())
        .await;

    Json(json!({
        "success": true,
        "mode": mode_for(feed.provenance),
        "provenance": feed.provenance,
        "data": feed.coins
    }))
    .into_response()
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/market/top-coins", get(get_top_coins))
        .route("/api/market/analyze/{symbol}", get(analyze_symbol))
        .route("/api/market/klines/{symbol}", get(get_klines))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(
    config: AppConfig,
    model: Arc<SequenceModel>,
) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let client = reqwest::Client::builder().build()?;

    let engine = Arc::new(
        AnalysisEngine::new(model, &config, client.clone()).with_metrics(metrics.clone()),
    );
    let market_data: Arc<dyn MarketDataProvider> = Arc::new(BinanceMarketDataProvider::new(
        client,
        config.market_data.clone(),
    ));

    let state = AppState::new(engine, market_data, config.market_data.clone(), metrics);
    let app = create_router(state);
    let port = config.server.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
