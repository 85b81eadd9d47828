use crate::errors::QuantResult;
use crate::models::{GreeksResult, OptionKind, OptionParameters, PricingModel};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Calendar days per year used to quote theta per day.
const DAYS_PER_YEAR: f64 = 365.0;

/// Vega is quoted per 1 percentage point of volatility.
pub const VEGA_SCALE: f64 = 100.0;

/// Black-Scholes European option pricing with closed-form Greeks.
///
/// d1 = (ln(S/K) + (r + sigma^2/2)*T) / (sigma * sqrt(T))
/// d2 = d1 - sigma * sqrt(T)
///
/// Call = S*Phi(d1) - K*e^(-rT)*Phi(d2)
/// Put  = K*e^(-rT)*Phi(-d2) - S*Phi(-d1)
///
/// Expired (T <= 0) or zero-vol contracts are priced at intrinsic value
/// with zero gamma, theta, vega and rho.
pub struct BlackScholes {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl BlackScholes {
    pub fn new() -> Self {
        Self { normal: Normal::standard() }
    }

    fn intrinsic(params: &OptionParameters) -> GreeksResult {
        let s = params.underlying_price;
        let k = params.strike;
        let (price, delta) = match params.option_kind {
            OptionKind::Call => ((s - k).max(0.0), if s > k { 1.0 } else { 0.0 }),
            OptionKind::Put => ((k - s).max(0.0), if s < k { -1.0 } else { 0.0 }),
        };
        GreeksResult { price, delta, ..GreeksResult::default() }
    }
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingModel for BlackScholes {
    #[inline]
    fn name(&self) -> &'static str {
        "Black-Scholes"
    }

    fn price_and_greeks(&self, params: &OptionParameters) -> QuantResult<GreeksResult> {
        params.validate()?;

        if params.is_degenerate() {
            return Ok(Self::intrinsic(params));
        }

        let s = params.underlying_price;
        let k = params.strike;
        let t = params.time_to_expiry;
        let r = params.risk_free_rate;
        let sigma = params.volatility;

        let sqrt_t = t.sqrt();
        let sigma_sqrt_t = sigma * sqrt_t;
        let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / sigma_sqrt_t;
        let d2 = d1 - sigma_sqrt_t;

        let discount = (-r * t).exp();
        let pdf_d1 = self.normal.pdf(d1);

        // Rate-sensitive leg: Phi(d2) for calls, Phi(-d2) for puts
        let (price, delta, rate_leg) = match params.option_kind {
            OptionKind::Call => {
                let nd2 = self.normal.cdf(d2);
                (s * self.normal.cdf(d1) - k * discount * nd2, self.normal.cdf(d1), nd2)
            }
            OptionKind::Put => {
                let nd2 = self.normal.cdf(-d2);
                (k * discount * nd2 - s * self.normal.cdf(-d1), -self.normal.cdf(-d1), nd2)
            }
        };

        let rho = match params.option_kind {
            OptionKind::Call => k * t * discount * rate_leg,
            OptionKind::Put => -k * t * discount * rate_leg,
        };

        let gamma = pdf_d1 / (s * sigma_sqrt_t);
        let vega = s * pdf_d1 * sqrt_t / VEGA_SCALE;
        let theta = (-(s * pdf_d1 * sigma) / (2.0 * sqrt_t) - r * k * discount * rate_leg) / DAYS_PER_YEAR;

        Ok(GreeksResult { price, delta, gamma, theta, vega, rho })
    }
}

/// Price with a default Black-Scholes model.
pub fn price_and_greeks(params: &OptionParameters) -> QuantResult<GreeksResult> {
    BlackScholes::new().price_and_greeks(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::QuantError;

    fn atm(kind: OptionKind) -> OptionParameters {
        OptionParameters::new(100.0, 100.0, 1.0, 0.05, 0.2, kind).unwrap()
    }

    #[test]
    fn test_atm_call_reference_values() {
        let g = price_and_greeks(&atm(OptionKind::Call)).unwrap();
        assert!((g.price - 10.45).abs() < 0.01, "price={}", g.price);
        assert!((g.delta - 0.636).abs() < 0.001, "delta={}", g.delta);
        assert!((g.gamma - 0.018).abs() < 0.001, "gamma={}", g.gamma);
        assert!((g.vega - 0.38).abs() < 0.01, "vega={}", g.vega);
        assert!((g.theta - (-0.017)).abs() < 0.001, "theta={}", g.theta);
        assert!((g.rho - 53.23).abs() < 0.01, "rho={}", g.rho);
    }

    #[test]
    fn test_atm_put_reference_values() {
        let g = price_and_greeks(&atm(OptionKind::Put)).unwrap();
        assert!((g.price - 5.57).abs() < 0.01, "price={}", g.price);
        assert!((g.delta - (-0.363)).abs() < 0.001, "delta={}", g.delta);
        assert!(g.rho < 0.0, "put rho should be negative: {}", g.rho);
    }

    #[test]
    fn test_put_call_parity() {
        let model = BlackScholes::new();
        for &(s, k, t, r, sigma) in &[
            (100.0, 100.0, 1.0, 0.05, 0.2),
            (120.0, 90.0, 0.25, 0.01, 0.45),
            (80.0, 110.0, 2.0, -0.005, 0.15),
            (50.0, 50.5, 0.02, 0.0, 0.9),
        ] {
            let call = model
                .price_and_greeks(&OptionParameters::new(s, k, t, r, sigma, OptionKind::Call).unwrap())
                .unwrap();
            let put = model
                .price_and_greeks(&OptionParameters::new(s, k, t, r, sigma, OptionKind::Put).unwrap())
                .unwrap();
            let parity = s - k * (-r * t).exp();
            assert!(
                (call.price - put.price - parity).abs() < 1e-9,
                "parity broken for S={s} K={k}: {} vs {parity}",
                call.price - put.price
            );
        }
    }

    #[test]
    fn test_delta_bounds_and_shared_greeks() {
        let model = BlackScholes::new();
        for &s in &[40.0, 80.0, 100.0, 125.0, 300.0] {
            let call = model
                .price_and_greeks(&OptionParameters::new(s, 100.0, 0.5, 0.03, 0.3, OptionKind::Call).unwrap())
                .unwrap();
            let put = model
                .price_and_greeks(&OptionParameters::new(s, 100.0, 0.5, 0.03, 0.3, OptionKind::Put).unwrap())
                .unwrap();
            assert!((0.0..=1.0).contains(&call.delta), "call delta={}", call.delta);
            assert!((-1.0..=0.0).contains(&put.delta), "put delta={}", put.delta);
            assert!((call.gamma - put.gamma).abs() < 1e-12);
            assert!((call.vega - put.vega).abs() < 1e-12);
        }
    }

    #[test]
    fn test_expired_itm_call_is_intrinsic() {
        let p = OptionParameters::new(110.0, 100.0, 0.0, 0.05, 0.2, OptionKind::Call).unwrap();
        let g = price_and_greeks(&p).unwrap();
        assert_eq!(g.price, 10.0);
        assert_eq!(g.delta, 1.0);
        assert_eq!(g.gamma, 0.0);
        assert_eq!(g.theta, 0.0);
        assert_eq!(g.vega, 0.0);
        assert_eq!(g.rho, 0.0);
    }

    #[test]
    fn test_zero_vol_put_is_intrinsic() {
        let itm = OptionParameters::new(90.0, 100.0, 1.0, 0.05, 0.0, OptionKind::Put).unwrap();
        let g = price_and_greeks(&itm).unwrap();
        assert_eq!(g.price, 10.0);
        assert_eq!(g.delta, -1.0);

        let otm = OptionParameters::new(110.0, 100.0, 1.0, 0.05, -0.1, OptionKind::Put).unwrap();
        let g = price_and_greeks(&otm).unwrap();
        assert_eq!(g.price, 0.0);
        assert_eq!(g.delta, 0.0);
    }

    #[test]
    fn test_invalid_fields_rejected() {
        let mut p = atm(OptionKind::Call);
        p.strike = 0.0;
        let err = price_and_greeks(&p).unwrap_err();
        assert!(matches!(err, QuantError::InvalidArgument(_)));
    }
}
