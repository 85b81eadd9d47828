//! Implied volatility from an observed option price.
//!
//! - Newton: plain Newton-Raphson on sigma seeded at 20%, no clamping.
//!   Deep out-of-the-money or mispriced inputs can diverge and come back
//!   as NotConverged.
//! - Bracketed: Newton-Raphson kept inside [MIN_VOL, MAX_VOL] with a
//!   bisection fallback whenever a step leaves the bracket or vega underflows.

use crate::errors::{QuantError, QuantResult};
use crate::models::black_scholes::{BlackScholes, VEGA_SCALE};
use crate::models::{OptionKind, OptionParameters, PricingModel};

/// Newton seed.
pub const INITIAL_VOL_GUESS: f64 = 0.20;

/// Below this raw vega the Newton step is unusable.
const MIN_RAW_VEGA: f64 = 1e-6;

/// Search range of the bracketed solver.
pub const MIN_VOL: f64 = 0.001;
pub const MAX_VOL: f64 = 5.0;

pub const DEFAULT_MAX_ITERATIONS: u32 = 100;
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IvMethod {
    #[default]
    Newton,
    Bracketed,
}

impl std::str::FromStr for IvMethod {
    type Err = QuantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newton" => Ok(Self::Newton),
            "bracketed" => Ok(Self::Bracketed),
            other => Err(QuantError::InvalidArgument(format!(
                "unknown IV method {other:?}, expected \"newton\" or \"bracketed\""
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IvSolverConfig {
    pub max_iterations: u32,
    /// Absolute price error accepted as converged.
    pub tolerance: f64,
    pub method: IvMethod,
}

impl Default for IvSolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            method: IvMethod::Newton,
        }
    }
}

/// Implied volatility solver over a pricing model.
pub struct ImpliedVolSolver<M: PricingModel = BlackScholes> {
    model: M,
    config: IvSolverConfig,
}

impl ImpliedVolSolver<BlackScholes> {
    pub fn new(config: IvSolverConfig) -> Self {
        Self::with_model(BlackScholes::new(), config)
    }
}

impl Default for ImpliedVolSolver<BlackScholes> {
    fn default() -> Self {
        Self::new(IvSolverConfig::default())
    }
}

impl<M: PricingModel> ImpliedVolSolver<M> {
    pub fn with_model(model: M, config: IvSolverConfig) -> Self {
        Self { model, config }
    }

    pub fn config(&self) -> &IvSolverConfig {
        &self.config
    }

    /// Volatility that reproduces `market_price`, or `NotConverged`.
    pub fn solve(
        &self,
        market_price: f64,
        s: f64,
        k: f64,
        t: f64,
        r: f64,
        kind: OptionKind,
    ) -> QuantResult<f64> {
        if !market_price.is_finite() {
            return Err(QuantError::InvalidArgument(format!(
                "market_price must be finite, got {market_price}"
            )));
        }
        let base = OptionParameters::new(s, k, t, r, INITIAL_VOL_GUESS, kind)?;

        match self.config.method {
            IvMethod::Newton => self.newton(market_price, &base),
            IvMethod::Bracketed => self.bracketed(market_price, &base),
        }
    }

    fn newton(&self, market_price: f64, base: &OptionParameters) -> QuantResult<f64> {
        let mut sigma = INITIAL_VOL_GUESS;
        let mut last_error = f64::NAN;

        for i in 0..self.config.max_iterations {
            if !sigma.is_finite() {
                return Err(QuantError::NotConverged { iterations: i, last_error });
            }

            let greeks = self.model.price_and_greeks(&base.with_volatility(sigma))?;
            let raw_vega = greeks.vega * VEGA_SCALE;
            let diff = greeks.price - market_price;

            if raw_vega.is_nan() || raw_vega < MIN_RAW_VEGA {
                return Err(QuantError::NotConverged { iterations: i + 1, last_error: diff });
            }

            if diff.abs() < self.config.tolerance {
                return Ok(sigma);
            }

            sigma -= diff / raw_vega;
            last_error = diff;
        }

        Err(QuantError::NotConverged {
            iterations: self.config.max_iterations,
            last_error,
        })
    }

    fn bracketed(&self, market_price: f64, base: &OptionParameters) -> QuantResult<f64> {
        if base.time_to_expiry <= 0.0 {
            return Err(QuantError::NotConverged { iterations: 0, last_error: f64::NAN });
        }

        let (floor, cap) = no_arbitrage_bounds(base);
        if market_price < floor - self.config.tolerance || market_price > cap + self.config.tolerance {
            return Err(QuantError::NotConverged {
                iterations: 0,
                last_error: if market_price < floor { market_price - floor } else { market_price - cap },
            });
        }

        let mut low = MIN_VOL;
        let mut high = MAX_VOL;
        let mut sigma = INITIAL_VOL_GUESS;
        let mut last_error = f64::NAN;

        for _ in 0..self.config.max_iterations {
            let greeks = self.model.price_and_greeks(&base.with_volatility(sigma))?;
            let diff = greeks.price - market_price;
            last_error = diff;

            if diff.abs() < self.config.tolerance {
                return Ok(sigma);
            }

            // Price is increasing in sigma
            if diff > 0.0 {
                high = sigma;
            } else {
                low = sigma;
            }

            if high - low < 1e-12 {
                break;
            }

            let raw_vega = greeks.vega * VEGA_SCALE;
            let step = sigma - diff / raw_vega;
            sigma = if raw_vega >= MIN_RAW_VEGA && step > low && step < high {
                step
            } else {
                0.5 * (low + high)
            };
        }

        Err(QuantError::NotConverged {
            iterations: self.config.max_iterations,
            last_error,
        })
    }
}

/// Model-free price range: [discounted intrinsic, S] for calls, [discounted intrinsic, K*e^(-rT)] for puts.
pub fn no_arbitrage_bounds(params: &OptionParameters) -> (f64, f64) {
    let discounted_strike = params.strike * (-params.risk_free_rate * params.time_to_expiry.max(0.0)).exp();
    match params.option_kind {
        OptionKind::Call => (
            (params.underlying_price - discounted_strike).max(0.0),
            params.underlying_price,
        ),
        OptionKind::Put => (
            (discounted_strike - params.underlying_price).max(0.0),
            discounted_strike,
        ),
    }
}

/// Strict Newton-Raphson implied volatility with optional overrides
/// (defaults: 100 iterations, 1e-5 price tolerance).
#[allow(clippy::too_many_arguments)]
pub fn implied_volatility(
    market_price: f64,
    s: f64,
    k: f64,
    t: f64,
    r: f64,
    kind: OptionKind,
    max_iterations: Option<u32>,
    tolerance: Option<f64>,
) -> QuantResult<f64> {
    let config = IvSolverConfig {
        max_iterations: max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
        tolerance: tolerance.unwrap_or(DEFAULT_TOLERANCE),
        method: IvMethod::Newton,
    };
    ImpliedVolSolver::new(config).solve(market_price, s, k, t, r, kind)
}
