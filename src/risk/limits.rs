use crate::errors::{QuantError, QuantResult};
use crate::risk::var::validate_confidence;

/// Risk limit check result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskCheck {
    /// Trading allowed
    Allowed,
    /// Blocked with reason
    Blocked(&'static str),
}

impl RiskCheck {
    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, RiskCheck::Allowed)
    }
}

/// Configured limits. Loaded once, read-only for the life of a RiskManager.
/// Percentages are plain numbers (20.0 = 20%); the confidence level is a fraction.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RiskLimits {
    pub max_portfolio_drawdown_percent: f64,
    pub var_confidence_level: f64,
    pub max_trade_risk_percent: f64,
}

impl RiskLimits {
    pub fn new(
        max_portfolio_drawdown_percent: f64,
        var_confidence_level: f64,
        max_trade_risk_percent: f64,
    ) -> QuantResult<Self> {
        let limits = Self {
            max_portfolio_drawdown_percent,
            var_confidence_level,
            max_trade_risk_percent,
        };
        limits.validate()?;
        Ok(limits)
    }

    pub fn validate(&self) -> QuantResult<()> {
        ensure_non_negative("max_portfolio_drawdown_percent", self.max_portfolio_drawdown_percent)?;
        ensure_non_negative("max_trade_risk_percent", self.max_trade_risk_percent)?;
        validate_confidence(self.var_confidence_level)
    }
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_portfolio_drawdown_percent: 20.0,
            var_confidence_level: 0.95,
            max_trade_risk_percent: 2.0,
        }
    }
}

/// Drawdown gate. Equality passes.
#[inline]
pub fn check_drawdown(current_drawdown_percent: f64, limits: &RiskLimits) -> RiskCheck {
    if current_drawdown_percent > limits.max_portfolio_drawdown_percent {
        RiskCheck::Blocked("max portfolio drawdown exceeded")
    } else {
        RiskCheck::Allowed
    }
}

/// Per-trade loss budget in account currency.
#[inline]
pub fn max_allowed_loss(total_value: f64, limits: &RiskLimits) -> f64 {
    total_value * (limits.max_trade_risk_percent / 100.0)
}

/// Per-trade gate. A loss exactly at the budget passes.
#[inline]
pub fn check_trade(potential_loss: f64, total_value: f64, limits: &RiskLimits) -> RiskCheck {
    if potential_loss > max_allowed_loss(total_value, limits) {
        RiskCheck::Blocked("potential loss exceeds per-trade risk")
    } else {
        RiskCheck::Allowed
    }
}

fn ensure_non_negative(name: &str, value: f64) -> QuantResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(QuantError::InvalidArgument(format!("{name} must be finite and >= 0, got {value}")))
    }
}
