use crate::errors::QuantResult;
use crate::portfolio::PortfolioView;
use crate::risk::limits::{self, RiskCheck, RiskLimits};
use crate::risk::var;

/// Fewer observations than this and historical VaR is not estimated.
pub const MIN_VAR_OBSERVATIONS: usize = 50;

/// Stateful gatekeeper over a borrowed portfolio.
///
/// Every check reads the portfolio at call time and nothing is cached.
/// Checks are advisory: a `false` means the caller must not open the trade,
/// the manager itself never touches positions.
pub struct RiskManager<'a, P: PortfolioView + ?Sized> {
    limits: RiskLimits,
    portfolio: &'a P,
}

impl<'a, P: PortfolioView + ?Sized> RiskManager<'a, P> {
    pub fn new(limits: RiskLimits, portfolio: &'a P) -> Self {
        Self { limits, portfolio }
    }

    #[inline]
    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    pub fn evaluate_drawdown(&self) -> RiskCheck {
        let current = self.portfolio.current_drawdown_percent();
        let check = limits::check_drawdown(current, &self.limits);
        if !check.is_allowed() {
            tracing::error!(
                limit = self.limits.max_portfolio_drawdown_percent,
                current,
                "CRITICAL: max drawdown limit exceeded, halting all new trades"
            );
        }
        check
    }

    /// `false` halts new entries. Drawdown exactly at the limit passes.
    pub fn check_max_drawdown(&self) -> bool {
        self.evaluate_drawdown().is_allowed()
    }

    /// Historical-simulation VaR as a positive percentage.
    ///
    /// Uses the configured confidence level when `confidence_level` is None.
    /// With fewer than 50 returns it logs a warning and returns 0.0 before the
    /// confidence is looked at.
    pub fn calculate_var(&self, historical_returns: &[f64], confidence_level: Option<f64>) -> QuantResult<f64> {
        if historical_returns.len() < MIN_VAR_OBSERVATIONS {
            tracing::warn!(
                observations = historical_returns.len(),
                required = MIN_VAR_OBSERVATIONS,
                "not enough historical data to calculate VaR accurately"
            );
            return Ok(0.0);
        }

        let confidence = confidence_level.unwrap_or(self.limits.var_confidence_level);
        var::validate_confidence(confidence)?;
        let value = var::historical_var(historical_returns, confidence)?;
        tracing::debug!(
            confidence = confidence * 100.0,
            var = value,
            "calculated historical VaR"
        );
        Ok(value)
    }

    /// Mean loss beyond VaR, same sample rules as `calculate_var`.
    pub fn calculate_expected_shortfall(
        &self,
        historical_returns: &[f64],
        confidence_level: Option<f64>,
    ) -> QuantResult<f64> {
        if historical_returns.len() < MIN_VAR_OBSERVATIONS {
            tracing::warn!(
                observations = historical_returns.len(),
                required = MIN_VAR_OBSERVATIONS,
                "not enough historical data to calculate expected shortfall"
            );
            return Ok(0.0);
        }

        let confidence = confidence_level.unwrap_or(self.limits.var_confidence_level);
        var::validate_confidence(confidence)?;
        var::historical_expected_shortfall(historical_returns, confidence)
    }

    pub fn evaluate_trade_risk(&self, potential_loss: f64) -> RiskCheck {
        let capital = self.portfolio.total_value();
        let check = limits::check_trade(potential_loss, capital, &self.limits);
        if !check.is_allowed() {
            tracing::warn!(
                potential_loss,
                max_allowed = limits::max_allowed_loss(capital, &self.limits),
                "trade rejected: potential loss exceeds max allowed risk per trade"
            );
        }
        check
    }

    /// `false` rejects the trade. A loss exactly at the budget passes.
    pub fn check_trade_risk(&self, potential_loss: f64) -> bool {
        self.evaluate_trade_risk(potential_loss).is_allowed()
    }
}
