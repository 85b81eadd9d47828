//! Options analytics and risk core: Black-Scholes pricing with Greeks,
//! implied volatility, and portfolio risk-limit checks.

pub mod config;
pub mod errors;
pub mod models;
pub mod portfolio;
pub mod risk;
pub mod snapshot;

pub use errors::{QuantError, QuantResult};
pub use models::black_scholes::{price_and_greeks, BlackScholes};
pub use models::implied_vol::{implied_volatility, ImpliedVolSolver, IvMethod, IvSolverConfig};
pub use models::{GreeksResult, OptionKind, OptionParameters, PricingModel};
pub use portfolio::PortfolioView;
pub use risk::limits::{RiskCheck, RiskLimits};
pub use risk::manager::RiskManager;
