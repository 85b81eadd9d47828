pub mod black_scholes;
pub mod implied_vol;

use crate::errors::{QuantError, QuantResult};
use chrono::{DateTime, Utc};
use std::str::FromStr;

/// Seconds in a 365-day year. Expiry is measured in calendar time.
const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0;

/// All pricing models implement this trait.
/// price_and_greeks() must be a pure function: deterministic output from inputs only.
/// Send + Sync so one pricer can be shared by any number of worker threads.
pub trait PricingModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fair value and sensitivities for a European option.
    /// Rejects structurally invalid parameters; never panics.
    fn price_and_greeks(&self, params: &OptionParameters) -> QuantResult<GreeksResult>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

impl FromStr for OptionKind {
    type Err = QuantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(Self::Call),
            "put" => Ok(Self::Put),
            other => Err(QuantError::InvalidArgument(format!(
                "unknown option kind {other:?}, expected \"call\" or \"put\""
            ))),
        }
    }
}

/// Inputs to a single pricing call. Stack-allocated, Copy.
///
/// Units: rate and volatility are annualized decimals (0.05 = 5%),
/// time_to_expiry is in years. T <= 0 or sigma <= 0 is accepted and
/// priced at intrinsic value.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OptionParameters {
    pub underlying_price: f64,
    pub strike: f64,
    pub time_to_expiry: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
    pub option_kind: OptionKind,
}

impl OptionParameters {
    pub fn new(
        underlying_price: f64,
        strike: f64,
        time_to_expiry: f64,
        risk_free_rate: f64,
        volatility: f64,
        option_kind: OptionKind,
    ) -> QuantResult<Self> {
        let params = Self {
            underlying_price,
            strike,
            time_to_expiry,
            risk_free_rate,
            volatility,
            option_kind,
        };
        params.validate()?;
        Ok(params)
    }

    /// Build parameters from an expiry instant rather than a year fraction.
    pub fn with_expiry(
        underlying_price: f64,
        strike: f64,
        expiry: DateTime<Utc>,
        now: DateTime<Utc>,
        risk_free_rate: f64,
        volatility: f64,
        option_kind: OptionKind,
    ) -> QuantResult<Self> {
        Self::new(
            underlying_price,
            strike,
            years_to_expiry(expiry, now),
            risk_free_rate,
            volatility,
            option_kind,
        )
    }

    /// Same contract, different volatility. Used by the IV solver each iteration.
    #[inline]
    pub fn with_volatility(&self, volatility: f64) -> Self {
        Self { volatility, ..*self }
    }

    /// Contract check: S and K must be finite and positive, T, r and sigma finite.
    /// Non-positive T or sigma passes and takes the intrinsic-value path.
    pub fn validate(&self) -> QuantResult<()> {
        ensure_positive("underlying_price", self.underlying_price)?;
        ensure_positive("strike", self.strike)?;
        ensure_finite("time_to_expiry", self.time_to_expiry)?;
        ensure_finite("risk_free_rate", self.risk_free_rate)?;
        ensure_finite("volatility", self.volatility)
    }

    /// Expired or zero-vol contracts are priced at intrinsic value.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.time_to_expiry <= 0.0 || self.volatility <= 0.0
    }
}

/// Price and sensitivities. theta is per calendar day, vega per 1 vol point.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct GreeksResult {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

/// Year fraction between now and expiry, floored at zero.
pub fn years_to_expiry(expiry: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let secs = (expiry - now).num_milliseconds() as f64 / 1000.0;
    (secs / SECONDS_PER_YEAR).max(0.0)
}

pub(crate) fn ensure_positive(name: &str, value: f64) -> QuantResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(QuantError::InvalidArgument(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

fn ensure_finite(name: &str, value: f64) -> QuantResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(QuantError::InvalidArgument(format!("{name} must be finite, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("call".parse::<OptionKind>().unwrap(), OptionKind::Call);
        assert_eq!(" PUT ".parse::<OptionKind>().unwrap(), OptionKind::Put);
        let err = "straddle".parse::<OptionKind>().unwrap_err();
        assert!(matches!(err, QuantError::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_non_positive_spot_and_strike() {
        assert!(OptionParameters::new(0.0, 100.0, 1.0, 0.05, 0.2, OptionKind::Call).is_err());
        assert!(OptionParameters::new(100.0, -5.0, 1.0, 0.05, 0.2, OptionKind::Put).is_err());
        assert!(OptionParameters::new(f64::NAN, 100.0, 1.0, 0.05, 0.2, OptionKind::Call).is_err());
    }

    #[test]
    fn test_rejects_infinite_time_and_vol() {
        for t in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let err = OptionParameters::new(100.0, 100.0, t, 0.05, 0.2, OptionKind::Call).unwrap_err();
            assert!(matches!(err, QuantError::InvalidArgument(_)), "t={t}");
        }
        for vol in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let err = OptionParameters::new(100.0, 100.0, 1.0, 0.05, vol, OptionKind::Put).unwrap_err();
            assert!(matches!(err, QuantError::InvalidArgument(_)), "vol={vol}");
        }

        // Struct literals bypass new(); the pricer still refuses them
        let p = OptionParameters {
            underlying_price: 100.0,
            strike: 100.0,
            time_to_expiry: f64::INFINITY,
            risk_free_rate: 0.05,
            volatility: 0.2,
            option_kind: OptionKind::Call,
        };
        assert!(black_scholes::price_and_greeks(&p).is_err());
    }

    #[test]
    fn test_degenerate_inputs_accepted() {
        let p = OptionParameters::new(100.0, 100.0, -0.5, -0.01, 0.0, OptionKind::Call).unwrap();
        assert!(p.is_degenerate());
    }

    #[test]
    fn test_years_to_expiry() {
        let now = Utc::now();
        let t = years_to_expiry(now + Duration::days(365), now);
        assert!((t - 1.0).abs() < 1e-9, "one calendar year, got {t}");
        assert_eq!(years_to_expiry(now - Duration::days(3), now), 0.0);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&OptionKind::Put).unwrap();
        assert_eq!(json, "\"put\"");
    }
}
