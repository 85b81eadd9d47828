use options_quant::config::AppConfig;
use options_quant::models::implied_vol::ImpliedVolSolver;
use options_quant::snapshot;
use options_quant::QuantResult;

fn main() {
    // Structured logging to stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("options_quant snapshot starting");

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        spot = cfg.snapshot.spot,
        vol = cfg.snapshot.volatility,
        expiry_days = cfg.snapshot.expiry_days,
        iv_method = ?cfg.iv_solver.method,
        "config loaded"
    );

    if let Err(e) = run(&cfg) {
        tracing::error!("snapshot failed: {e}");
        std::process::exit(1);
    }
}

fn run(cfg: &AppConfig) -> QuantResult<()> {
    let solver = ImpliedVolSolver::new(cfg.iv_solver);
    let snap = snapshot::build_snapshot(&cfg.snapshot, cfg.risk_limits, &solver, chrono::Utc::now())?;

    let unsolved = snap.rows.iter().filter(|r| r.call_implied_vol.is_none()).count();
    if unsolved > 0 {
        tracing::warn!(unsolved, "implied vol did not converge for some strikes");
    }
    if !snap.drawdown_ok {
        tracing::warn!("drawdown gate closed, no new entries");
    }

    println!("{}", serde_json::to_string_pretty(&snap)?);
    tracing::info!(strikes = snap.rows.len(), "snapshot complete");
    Ok(())
}
