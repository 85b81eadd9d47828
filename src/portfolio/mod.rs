pub mod tracker;

/// Read-only window onto portfolio state owned elsewhere.
/// Implementations must return a consistent snapshot per call.
/// Percentages are plain numbers (12.5 = 12.5%).
pub trait PortfolioView {
    /// Decline from the running peak, in percent of the peak.
    fn current_drawdown_percent(&self) -> f64;

    /// Current portfolio value in account currency.
    fn total_value(&self) -> f64;
}

