// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  Every handler that can fail returns
// `(StatusCode, Json<{ "error": ... }>)`; the status tells the caller whose
// fault it was:
//
//   400  body could not be read as a CSV table or a calculator input
//   422  the table is readable but unusable (schema, history gate)
//   502  the quote feed or the completion endpoint failed
//   503  no completion API key is configured
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::advisor::prompt::{share_prompt, strategy_prompt};
use crate::advisor::share::{share_text, share_url, DISCLAIMER_EN, DISCLAIMER_JA};
use crate::advisor::{prepare_analysis, AnalysisError, AnalysisSnapshot};
use crate::app_state::AppState;
use crate::indicators::engine::INDICATOR_COLUMNS;
use crate::indicators::{calculate_indicators, IndicatorRow, IndicatorSeries};
use crate::market_data::{PriceTable, SchemaError};
use crate::position_size::{calculate_position_size, PositionSizeInput, PositionSizeResult};
use crate::runtime_config::RuntimeConfig;
use crate::types::PromptLanguage;

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (
        status,
        Json(serde_json::json!({ "error": message.to_string() })),
    )
}

/// 422 with the offending column named in a `field` key.
fn schema_error(e: SchemaError) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(serde_json::json!({
            "error": e.to_string(),
            "field": e.field(),
        })),
    )
}

fn analysis_error(e: AnalysisError) -> ApiError {
    match e {
        AnalysisError::Schema(e) => schema_error(e),
        other => api_error(StatusCode::UNPROCESSABLE_ENTITY, other),
    }
}

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Public ──────────────────────────────────────────────────
        .route("/api/v1/health", get(health))
        // ── Indicators ──────────────────────────────────────────────
        .route("/api/v1/indicators", post(indicators_json))
        .route("/api/v1/indicators/csv", post(indicators_csv))
        .route("/api/v1/quotes/:symbol/indicators", get(quote_indicators))
        // ── Advisor ─────────────────────────────────────────────────
        .route("/api/v1/analyze", post(analyze))
        .route("/api/v1/share", post(share))
        // ── Tools & settings ────────────────────────────────────────
        .route("/api/v1/position-size", post(position_size))
        .route("/api/v1/settings", get(get_settings).post(update_settings))
        // ── Middleware & State ──────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health (public)
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    analyses_served: u64,
    analyses_rejected: u64,
    llm_configured: bool,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    use std::sync::atomic::Ordering;

    let resp = HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_secs(),
        analyses_served: state.analyses_served.load(Ordering::Relaxed),
        analyses_rejected: state.analyses_rejected.load(Ordering::Relaxed),
        llm_configured: state.llm.is_configured(),
        server_time: chrono::Utc::now().timestamp_millis(),
    };
    Json(resp)
}

// =============================================================================
// Indicators
// =============================================================================

#[derive(Deserialize)]
struct CsvRequest {
    csv: String,
}

#[derive(Serialize)]
struct IndicatorsResponse {
    rows: usize,
    complete_rows: usize,
    columns: &'static [&'static str],
    extra_columns: Vec<String>,
    data: Vec<IndicatorRow>,
}

impl From<&IndicatorSeries> for IndicatorsResponse {
    fn from(series: &IndicatorSeries) -> Self {
        let data = series.rows();
        Self {
            rows: data.len(),
            complete_rows: data.iter().filter(|r| r.is_complete()).count(),
            columns: &INDICATOR_COLUMNS,
            extra_columns: series.prices.extra_columns.clone(),
            data,
        }
    }
}

fn parse_table(csv: &str) -> Result<PriceTable, ApiError> {
    PriceTable::from_csv_str(csv).map_err(|e| api_error(StatusCode::BAD_REQUEST, e))
}

async fn indicators_json(Json(req): Json<CsvRequest>) -> Result<impl IntoResponse, ApiError> {
    let table = parse_table(&req.csv)?;
    let series = calculate_indicators(&table).map_err(schema_error)?;
    Ok(Json(IndicatorsResponse::from(&series)))
}

async fn indicators_csv(Json(req): Json<CsvRequest>) -> Result<impl IntoResponse, ApiError> {
    let table = parse_table(&req.csv)?;
    let series = calculate_indicators(&table).map_err(schema_error)?;
    let body = series
        .to_csv()
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body))
}

async fn quote_indicators(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let table = state.quote_feed.fetch_daily(&symbol).await.map_err(|e| {
        warn!(symbol = %symbol, error = %e, "quote feed request failed");
        api_error(StatusCode::BAD_GATEWAY, format!("{e:#}"))
    })?;
    let series = calculate_indicators(&table).map_err(schema_error)?;
    info!(symbol = %symbol, rows = series.len(), "indicators computed from quote feed");
    Ok(Json(IndicatorsResponse::from(&series)))
}

// =============================================================================
// Analyze
// =============================================================================

#[derive(Deserialize)]
struct AnalyzeRequest {
    symbol: String,
    /// Daily CSV; when absent the quote feed is queried for `symbol`.
    #[serde(default)]
    csv: Option<String>,
    #[serde(default)]
    language: Option<PromptLanguage>,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    request_id: String,
    symbol: String,
    language: PromptLanguage,
    analysis: AnalysisSnapshot,
    strategy: String,
    disclaimer: &'static str,
}

fn disclaimer(lang: PromptLanguage) -> &'static str {
    match lang {
        PromptLanguage::Japanese => DISCLAIMER_JA,
        PromptLanguage::English => DISCLAIMER_EN,
    }
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("analyze", request_id = %request_id, symbol = %req.symbol);
    run_analysis(state, req, request_id).instrument(span).await
}

async fn run_analysis(
    state: Arc<AppState>,
    req: AnalyzeRequest,
    request_id: Uuid,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let symbol = req.symbol.trim().to_string();
    if symbol.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "symbol must not be empty"));
    }

    let config = state.config();
    let lang = req.language.unwrap_or(config.language);

    let loaded = match req.csv.as_deref() {
        Some(csv) => parse_table(csv),
        None => state.quote_feed.fetch_daily(&symbol).await.map_err(|e| {
            warn!(error = %e, "quote feed request failed");
            api_error(StatusCode::BAD_GATEWAY, format!("{e:#}"))
        }),
    };
    let prepared = loaded.and_then(|table| {
        prepare_analysis(&table, config.min_rows, lang).map_err(|e| {
            info!(reason = %e, "analysis rejected");
            analysis_error(e)
        })
    });
    let prepared = match prepared {
        Ok(p) => p,
        Err(e) => {
            state.record_rejected();
            return Err(e);
        }
    };

    if !state.llm.is_configured() {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "completion API key is not configured",
        ));
    }

    let prompt = strategy_prompt(&symbol, &prepared.summary, lang);
    let strategy = state
        .llm
        .complete(&config.llm.completion_settings(), &prompt)
        .await
        .map_err(|e| {
            warn!(error = %e, "strategy completion failed");
            api_error(StatusCode::BAD_GATEWAY, format!("{e:#}"))
        })?;

    state.record_served();
    info!(latest = %prepared.latest.date, "strategy generated");

    Ok(Json(AnalyzeResponse {
        request_id: request_id.to_string(),
        symbol,
        language: lang,
        analysis: prepared.snapshot(),
        strategy,
        disclaimer: disclaimer(lang),
    }))
}

// =============================================================================
// Share
// =============================================================================

#[derive(Deserialize)]
struct ShareRequest {
    strategy: String,
    #[serde(default)]
    language: Option<PromptLanguage>,
}

#[derive(Serialize)]
struct ShareResponse {
    summary: String,
    text: String,
    url: String,
}

async fn share(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ShareRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.strategy.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "strategy must not be empty"));
    }
    if !state.llm.is_configured() {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "completion API key is not configured",
        ));
    }

    let config = state.config();
    let lang = req.language.unwrap_or(config.language);

    let summary = state
        .llm
        .complete(&config.llm.completion_settings(), &share_prompt(&req.strategy, lang))
        .await
        .map_err(|e| {
            warn!(error = %e, "share summary completion failed");
            api_error(StatusCode::BAD_GATEWAY, format!("{e:#}"))
        })?;

    let url = share_url(&config.share_intent_url, &summary, &config.share_hashtags)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;

    Ok(Json(ShareResponse {
        text: share_text(&summary, &config.share_hashtags),
        summary: summary.trim().to_string(),
        url: url.to_string(),
    }))
}

// =============================================================================
// Position size calculator
// =============================================================================

async fn position_size(
    Json(input): Json<PositionSizeInput>,
) -> Result<Json<PositionSizeResult>, ApiError> {
    calculate_position_size(&input)
        .map(Json)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))
}

// =============================================================================
// Settings
// =============================================================================

async fn get_settings(State(state): State<Arc<AppState>>) -> Json<RuntimeConfig> {
    Json(state.config())
}

#[derive(Deserialize)]
struct SettingsUpdate {
    #[serde(default)]
    min_rows: Option<usize>,
    #[serde(default)]
    language: Option<PromptLanguage>,
    #[serde(default)]
    llm_model: Option<String>,
    #[serde(default)]
    llm_temperature: Option<f64>,
    #[serde(default)]
    llm_max_tokens: Option<u32>,
    #[serde(default)]
    share_hashtags: Option<String>,
}

impl SettingsUpdate {
    fn validate(&self) -> Result<(), String> {
        if self.min_rows == Some(0) {
            return Err("min_rows must be at least 1".into());
        }
        if let Some(t) = self.llm_temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(format!("llm_temperature must be within [0, 2], got {t}"));
            }
        }
        if matches!(self.llm_model.as_deref(), Some(m) if m.trim().is_empty()) {
            return Err("llm_model must not be empty".into());
        }
        Ok(())
    }
}

async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<RuntimeConfig>, ApiError> {
    update
        .validate()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;

    let updated = {
        let mut config = state.runtime_config.write();
        if let Some(v) = update.min_rows {
            config.min_rows = v;
        }
        if let Some(v) = update.language {
            config.language = v;
        }
        if let Some(v) = update.llm_model {
            config.llm.model = v.trim().to_string();
        }
        if let Some(v) = update.llm_temperature {
            config.llm.temperature = v;
        }
        if let Some(v) = update.llm_max_tokens {
            config.llm.max_tokens = Some(v);
        }
        if let Some(v) = update.share_hashtags {
            config.share_hashtags = v;
        }
        config.clone()
    };

    info!(
        min_rows = updated.min_rows,
        language = %updated.language,
        model = %updated.llm.model,
        "settings updated via API"
    );
    Ok(Json(updated))
}
