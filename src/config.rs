use crate::errors::{QuantError, QuantResult};
use crate::models::ensure_positive;
use crate::models::implied_vol::{IvMethod, IvSolverConfig};
use crate::risk::limits::RiskLimits;

/// Strike ladder the snapshot binary prices.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotConfig {
    pub spot: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
    pub expiry_days: f64,
    pub strike_step: f64,
    pub strikes_each_side: u32,
    /// Paper account the ladder is risk-checked against.
    pub capital: f64,
    /// Units of underlying per contract.
    pub contract_size: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct AppConfig {
    pub risk_limits: RiskLimits,
    pub iv_solver: IvSolverConfig,
    pub snapshot: SnapshotConfig,
}

impl AppConfig {
    pub fn from_env() -> QuantResult<Self> {
        dotenvy::dotenv().ok();

        let risk_limits = RiskLimits {
            max_portfolio_drawdown_percent: parse_env("MAX_PORTFOLIO_DRAWDOWN_PERCENT", "20.0")?,
            var_confidence_level: parse_env("VAR_CONFIDENCE_LEVEL", "0.95")?,
            max_trade_risk_percent: parse_env("MAX_TRADE_RISK_PERCENT", "2.0")?,
        };
        risk_limits
            .validate()
            .map_err(|e| QuantError::Config(format!("risk limits: {e}")))?;

        let iv_solver = IvSolverConfig {
            max_iterations: parse_env("IV_MAX_ITERATIONS", "100")?,
            tolerance: parse_env("IV_TOLERANCE", "1e-5")?,
            method: parse_env::<IvMethod>("IV_METHOD", "newton")?,
        };

        let snapshot = SnapshotConfig {
            spot: parse_env("SNAPSHOT_SPOT", "100.0")?,
            risk_free_rate: parse_env("SNAPSHOT_RATE", "0.05")?,
            volatility: parse_env("SNAPSHOT_VOL", "0.20")?,
            expiry_days: parse_env("SNAPSHOT_EXPIRY_DAYS", "30")?,
            strike_step: parse_env("SNAPSHOT_STRIKE_STEP", "5.0")?,
            strikes_each_side: parse_env("SNAPSHOT_STRIKES", "5")?,
            capital: parse_env("SNAPSHOT_CAPITAL", "100000.0")?,
            contract_size: parse_env("SNAPSHOT_CONTRACT_SIZE", "100")?,
        };

        snapshot.validate()?;

        Ok(Self { risk_limits, iv_solver, snapshot })
    }
}

impl SnapshotConfig {
    /// Expiry days may be zero or negative (an expired ladder) but must be finite.
    pub fn validate(&self) -> QuantResult<()> {
        if !self.expiry_days.is_finite() {
            return Err(QuantError::Config(format!(
                "SNAPSHOT_EXPIRY_DAYS must be finite, got {}",
                self.expiry_days
            )));
        }
        ensure_positive("SNAPSHOT_SPOT", self.spot)
            .and_then(|_| ensure_positive("SNAPSHOT_STRIKE_STEP", self.strike_step))
            .and_then(|_| ensure_positive("SNAPSHOT_CAPITAL", self.capital))
            .and_then(|_| ensure_positive("SNAPSHOT_CONTRACT_SIZE", self.contract_size))
            .map_err(|e| QuantError::Config(e.to_string()))
    }
}

fn parse_env<T>(key: &str, default: &str) -> QuantResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_var_or(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| QuantError::Config(format!("{key}: {e}")))
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
