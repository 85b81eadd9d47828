//! Strike-ladder snapshot: Greeks for both sides of every strike around spot,
//! an implied-vol round trip on the call, and the risk gates for opening one
//! contract of each.

use crate::config::SnapshotConfig;
use crate::errors::{QuantError, QuantResult};
use crate::models::black_scholes::BlackScholes;
use crate::models::implied_vol::ImpliedVolSolver;
use crate::models::{GreeksResult, OptionKind, OptionParameters, PricingModel};
use crate::portfolio::tracker::EquityCurve;
use crate::risk::limits::RiskLimits;
use crate::risk::manager::RiskManager;
use chrono::{DateTime, TimeDelta, Utc};

#[derive(Debug, Clone, serde::Serialize)]
pub struct StrikeRow {
    pub strike: f64,
    pub call: GreeksResult,
    pub put: GreeksResult,
    /// Vol recovered from the call price. None when the solver gave up.
    pub call_implied_vol: Option<f64>,
    pub call_within_trade_risk: bool,
    pub put_within_trade_risk: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
    pub time_to_expiry: f64,
    pub spot: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
    pub capital: f64,
    pub risk_limits: RiskLimits,
    pub drawdown_ok: bool,
    pub rows: Vec<StrikeRow>,
}

pub fn build_snapshot(
    cfg: &SnapshotConfig,
    limits: RiskLimits,
    solver: &ImpliedVolSolver,
    now: DateTime<Utc>,
) -> QuantResult<Snapshot> {
    cfg.validate()?;

    let model = BlackScholes::new();
    let account = EquityCurve::with_initial(cfg.capital);
    let risk = RiskManager::new(limits, &account);

    let expiry = expiry_after_days(now, cfg.expiry_days)?;
    let n = cfg.strikes_each_side as i64;

    let mut rows = Vec::with_capacity((2 * n + 1) as usize);
    let mut time_to_expiry = 0.0;

    for i in -n..=n {
        let strike = cfg.spot + i as f64 * cfg.strike_step;
        if strike <= 0.0 {
            continue;
        }

        let call_params = OptionParameters::with_expiry(
            cfg.spot,
            strike,
            expiry,
            now,
            cfg.risk_free_rate,
            cfg.volatility,
            OptionKind::Call,
        )?;
        let put_params = OptionParameters { option_kind: OptionKind::Put, ..call_params };
        time_to_expiry = call_params.time_to_expiry;

        let call = model.price_and_greeks(&call_params)?;
        let put = model.price_and_greeks(&put_params)?;

        let call_implied_vol = match solver.solve(
            call.price,
            cfg.spot,
            strike,
            call_params.time_to_expiry,
            cfg.risk_free_rate,
            OptionKind::Call,
        ) {
            Ok(v) => Some(v),
            Err(e) if e.is_not_converged() => {
                tracing::debug!(strike, error = %e, "implied vol round trip failed");
                None
            }
            Err(e) => return Err(e),
        };

        rows.push(StrikeRow {
            strike,
            call,
            put,
            call_implied_vol,
            call_within_trade_risk: risk.check_trade_risk(call.price * cfg.contract_size),
            put_within_trade_risk: risk.check_trade_risk(put.price * cfg.contract_size),
        });
    }

    Ok(Snapshot {
        generated_at: now,
        expiry,
        time_to_expiry,
        spot: cfg.spot,
        risk_free_rate: cfg.risk_free_rate,
        volatility: cfg.volatility,
        capital: cfg.capital,
        risk_limits: limits,
        drawdown_ok: risk.check_max_drawdown(),
        rows,
    })
}

fn expiry_after_days(now: DateTime<Utc>, days: f64) -> QuantResult<DateTime<Utc>> {
    TimeDelta::try_milliseconds((days * 86_400_000.0) as i64)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| QuantError::Config(format!("SNAPSHOT_EXPIRY_DAYS out of range: {days}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(capital: f64) -> SnapshotConfig {
        SnapshotConfig {
            spot: 100.0,
            risk_free_rate: 0.05,
            volatility: 0.2,
            expiry_days: 30.0,
            strike_step: 5.0,
            strikes_each_side: 5,
            capital,
            contract_size: 100.0,
        }
    }

    #[test]
    fn test_ladder_shape_and_parity() {
        let snap = build_snapshot(&cfg(100_000.0), RiskLimits::default(), &ImpliedVolSolver::default(), Utc::now())
            .unwrap();
        assert_eq!(snap.rows.len(), 11);
        assert!((snap.time_to_expiry - 30.0 / 365.0).abs() < 1e-9);
        assert!(snap.drawdown_ok);

        for row in &snap.rows {
            let parity = 100.0 - row.strike * (-0.05 * snap.time_to_expiry).exp();
            assert!((row.call.price - row.put.price - parity).abs() < 1e-9, "strike {}", row.strike);
            let iv = row.call_implied_vol.expect("round trip at the pricing vol");
            assert!((iv - 0.2).abs() < 1e-4, "strike {} iv={iv}", row.strike);
        }
    }

    #[test]
    fn test_small_account_blocks_atm_contract() {
        // 2% of 10k = 200; one ATM call costs ~250
        let snap = build_snapshot(&cfg(10_000.0), RiskLimits::default(), &ImpliedVolSolver::default(), Utc::now())
            .unwrap();
        let atm = snap.rows.iter().find(|r| r.strike == 100.0).unwrap();
        assert!(!atm.call_within_trade_risk, "call premium={}", atm.call.price);

        let far_otm = snap.rows.last().unwrap();
        assert_eq!(far_otm.strike, 125.0);
        assert!(far_otm.call_within_trade_risk);
    }

    #[test]
    fn test_skips_non_positive_strikes() {
        let mut c = cfg(100_000.0);
        c.spot = 10.0;
        let snap = build_snapshot(&c, RiskLimits::default(), &ImpliedVolSolver::default(), Utc::now()).unwrap();
        assert!(snap.rows.iter().all(|r| r.strike > 0.0));
        assert_eq!(snap.rows.len(), 7);
    }

    #[test]
    fn test_serializes_to_json() {
        let snap = build_snapshot(&cfg(100_000.0), RiskLimits::default(), &ImpliedVolSolver::default(), Utc::now())
            .unwrap();
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["rows"].as_array().map(|r| r.len()), Some(11));
        assert!(json["rows"][0]["call"]["vega"].is_number());
    }

    #[test]
    fn test_rejects_unrepresentable_expiry() {
        for days in [1e9, -1e9, f64::NAN, f64::INFINITY] {
            let mut c = cfg(100_000.0);
            c.expiry_days = days;
            let err = build_snapshot(&c, RiskLimits::default(), &ImpliedVolSolver::default(), Utc::now()).unwrap_err();
            assert!(matches!(err, QuantError::Config(_)), "days={days} err={err}");
        }
    }
}
