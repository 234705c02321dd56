// =============================================================================
// Position Size Calculator — fixed-fractional risk sizing
// =============================================================================
//
//   risk_amount     = equity * risk_pct / 100
//   position_size   = risk_amount / (stop_loss_pips * pip_value)      [lots]
//   notional_value  = position_size * contract_size
//   required_margin = notional_value / leverage
//
// Input floors match the form limits of the trading desk UI; anything outside
// them is rejected rather than clamped.
// =============================================================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MIN_EQUITY: f64 = 10_000.0;
const MIN_RISK_PCT: f64 = 0.5;
const MAX_RISK_PCT: f64 = 10.0;
const MIN_STOP_LOSS_PIPS: f64 = 1.0;
const MIN_LEVERAGE: f64 = 1.0;
const MIN_CONTRACT_SIZE: f64 = 100.0;
const MIN_PIP_VALUE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PositionSizeError {
    #[error("invalid parameter: {name} - {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn default_risk_pct() -> f64 {
    2.0
}

fn default_stop_loss_pips() -> f64 {
    50.0
}

fn default_leverage() -> f64 {
    10.0
}

fn default_contract_size() -> f64 {
    10_000.0
}

fn default_pip_value() -> f64 {
    1.0
}

/// Calculator inputs.  Everything except `equity` has a sensible default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSizeInput {
    /// Optional label echoed back in the result.
    #[serde(default)]
    pub symbol: Option<String>,

    /// Account equity in account currency.
    pub equity: f64,

    /// Percentage of equity put at risk on the trade.
    #[serde(default = "default_risk_pct")]
    pub risk_pct: f64,

    /// Stop distance in pips.
    #[serde(default = "default_stop_loss_pips")]
    pub stop_loss_pips: f64,

    #[serde(default = "default_leverage")]
    pub leverage: f64,

    /// Units per lot.
    #[serde(default = "default_contract_size")]
    pub contract_size: f64,

    /// Account-currency value of one pip per lot.
    #[serde(default = "default_pip_value")]
    pub pip_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionSizeResult {
    pub symbol: Option<String>,
    pub risk_amount: f64,
    pub position_size: f64,
    /// `position_size` rounded to two decimals for display.
    pub lots: f64,
    pub notional_value: f64,
    pub required_margin: f64,
    /// `required_margin` rounded to a whole currency unit for display.
    pub required_margin_rounded: f64,
}

fn check(name: &'static str, value: f64, min: f64, max: Option<f64>) -> Result<(), PositionSizeError> {
    if !value.is_finite() {
        return Err(PositionSizeError::InvalidParameter {
            name,
            reason: "must be a finite number".to_string(),
        });
    }
    if value < min {
        return Err(PositionSizeError::InvalidParameter {
            name,
            reason: format!("must be at least {min}, got {value}"),
        });
    }
    if let Some(max) = max {
        if value > max {
            return Err(PositionSizeError::InvalidParameter {
                name,
                reason: format!("must be at most {max}, got {value}"),
            });
        }
    }
    Ok(())
}

impl PositionSizeInput {
    pub fn validate(&self) -> Result<(), PositionSizeError> {
        check("equity", self.equity, MIN_EQUITY, None)?;
        check("risk_pct", self.risk_pct, MIN_RISK_PCT, Some(MAX_RISK_PCT))?;
        check("stop_loss_pips", self.stop_loss_pips, MIN_STOP_LOSS_PIPS, None)?;
        check("leverage", self.leverage, MIN_LEVERAGE, None)?;
        check("contract_size", self.contract_size, MIN_CONTRACT_SIZE, None)?;
        check("pip_value", self.pip_value, MIN_PIP_VALUE, None)?;
        Ok(())
    }
}

/// Size a position for the given inputs.
pub fn calculate_position_size(
    input: &PositionSizeInput,
) -> Result<PositionSizeResult, PositionSizeError> {
    input.validate()?;

    let risk_amount = input.equity * (input.risk_pct / 100.0);
    let position_size = risk_amount / (input.stop_loss_pips * input.pip_value);
    let notional_value = position_size * input.contract_size;
    let required_margin = notional_value / input.leverage;

    Ok(PositionSizeResult {
        symbol: input.symbol.clone(),
        risk_amount,
        position_size,
        lots: (position_size * 100.0).round() / 100.0,
        notional_value,
        required_margin,
        required_margin_rounded: required_margin.round(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> PositionSizeInput {
        PositionSizeInput {
            symbol: Some("S&P500".into()),
            equity: 100_000.0,
            risk_pct: 2.0,
            stop_loss_pips: 50.0,
            leverage: 10.0,
            contract_size: 10_000.0,
            pip_value: 1.0,
        }
    }

    #[test]
    fn form_defaults() {
        let r = calculate_position_size(&input()).unwrap();
        assert_eq!(r.risk_amount, 2_000.0);
        assert_eq!(r.position_size, 40.0);
        assert_eq!(r.lots, 40.0);
        assert_eq!(r.notional_value, 400_000.0);
        assert_eq!(r.required_margin, 40_000.0);
        assert_eq!(r.required_margin_rounded, 40_000.0);
        assert_eq!(r.symbol.as_deref(), Some("S&P500"));
    }

    #[test]
    fn lots_are_rounded_for_display() {
        let r = calculate_position_size(&PositionSizeInput {
            stop_loss_pips: 30.0,
            ..input()
        })
        .unwrap();
        assert!((r.position_size - 66.666_666).abs() < 1e-4);
        assert_eq!(r.lots, 66.67);
    }

    #[test]
    fn risk_pct_out_of_range() {
        let err = calculate_position_size(&PositionSizeInput {
            risk_pct: 12.0,
            ..input()
        })
        .unwrap_err();
        let PositionSizeError::InvalidParameter { name, .. } = err;
        assert_eq!(name, "risk_pct");
    }

    #[test]
    fn equity_below_floor() {
        let err = calculate_position_size(&PositionSizeInput {
            equity: 5_000.0,
            ..input()
        })
        .unwrap_err();
        assert!(err.to_string().contains("equity"));
    }

    #[test]
    fn non_finite_rejected() {
        assert!(calculate_position_size(&PositionSizeInput {
            pip_value: f64::NAN,
            ..input()
        })
        .is_err());
    }

    #[test]
    fn json_defaults() {
        let parsed: PositionSizeInput = serde_json::from_str(r#"{ "equity": 100000 }"#).unwrap();
        assert_eq!(parsed.risk_pct, 2.0);
        assert_eq!(parsed.stop_loss_pips, 50.0);
        assert_eq!(parsed.contract_size, 10_000.0);
        assert_eq!(parsed.symbol, None);
    }
}
