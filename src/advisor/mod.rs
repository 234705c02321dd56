// =============================================================================
// Advisor — the caller side of the indicator engine
// =============================================================================
//
// Enforces the minimum-history gate, runs the engine, drops rows with any
// undefined value and renders the latest complete row into the summary that
// feeds the completion prompt.

pub mod llm_client;
pub mod prompt;
pub mod share;
pub mod summary;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::indicators::rsi::rsi_label;
use crate::indicators::{calculate_indicators, IndicatorRow, IndicatorSeries};
use crate::market_data::{PriceTable, SchemaError};
use crate::types::PromptLanguage;

pub use llm_client::{CompletionSettings, LlmClient};
pub use summary::IndicatorSummary;

/// Reasons an analysis cannot produce a summary.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("at least {required} daily rows are required, got {got}")]
    InsufficientRows { required: usize, got: usize },

    #[error("not enough data to compute every indicator: no fully defined rows remain")]
    NoCompleteRows,

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Engine output plus the latest complete row and its summary.
#[derive(Debug, Clone)]
pub struct PreparedAnalysis {
    pub series: IndicatorSeries,
    pub latest: IndicatorRow,
    pub summary: IndicatorSummary,
}

/// Response-facing view of a prepared analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSnapshot {
    pub rows: usize,
    pub complete_rows: usize,
    pub latest: IndicatorRow,
    /// `OVERBOUGHT`, `OVERSOLD` or `NEUTRAL` for the latest RSI.
    pub rsi_zone: &'static str,
    pub summary: IndicatorSummary,
}

impl PreparedAnalysis {
    pub fn snapshot(&self) -> AnalysisSnapshot {
        AnalysisSnapshot {
            rows: self.series.len(),
            complete_rows: self.series.complete_rows().len(),
            latest: self.latest.clone(),
            rsi_zone: self.latest.rsi_14.map(rsi_label).unwrap_or("NEUTRAL"),
            summary: self.summary.clone(),
        }
    }
}

/// Gate → engine → drop undefined rows → summarise the latest.
pub fn prepare_analysis(
    table: &PriceTable,
    min_rows: usize,
    lang: PromptLanguage,
) -> Result<PreparedAnalysis, AnalysisError> {
    if table.len() < min_rows {
        return Err(AnalysisError::InsufficientRows {
            required: min_rows,
            got: table.len(),
        });
    }

    let series = calculate_indicators(table)?;
    let latest = series.latest_complete().ok_or(AnalysisError::NoCompleteRows)?;
    let summary = IndicatorSummary::from_row(&latest, lang).ok_or(AnalysisError::NoCompleteRows)?;

    info!(
        rows = series.len(),
        latest = %latest.date,
        "analysis prepared"
    );

    Ok(PreparedAnalysis {
        series,
        latest,
        summary,
    })
}
