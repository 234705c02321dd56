// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicator families used by
// the advisor.  Every function returns a column aligned 1:1 with its input,
// with `None` wherever the trailing window lacks history or holds an
// undefined value, so callers are forced to handle warm-up rows explicitly.

pub mod bollinger;
pub mod ema;
pub mod engine;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod window;

pub use engine::{calculate_indicators, IndicatorRow, IndicatorSeries};
