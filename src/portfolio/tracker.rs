//! In-memory equity curve. Tracks the running peak so drawdown is O(1) per query.

use crate::portfolio::PortfolioView;

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct EquityCurve {
    values: Vec<f64>,
    peak: f64,
    max_drawdown_percent: f64,
}

impl EquityCurve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(value: f64) -> Self {
        let mut curve = Self::new();
        curve.record(value);
        curve
    }

    /// Append a portfolio valuation. Non-finite values are ignored.
    pub fn record(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.values.push(value);
        if value > self.peak {
            self.peak = value;
        }
        let dd = self.current_drawdown_percent();
        if dd > self.max_drawdown_percent {
            self.max_drawdown_percent = dd;
        }
    }

    #[inline]
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Worst peak-to-trough decline seen so far, in percent.
    #[inline]
    pub fn max_drawdown_percent(&self) -> f64 {
        self.max_drawdown_percent
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Period-over-period simple returns in percent, the unit VaR expects.
    pub fn returns_percent(&self) -> Vec<f64> {
        self.values
            .windows(2)
            .filter(|w| w[0] > 0.0)
            .map(|w| (w[1] / w[0] - 1.0) * 100.0)
            .collect()
    }
}

impl PortfolioView for EquityCurve {
    fn current_drawdown_percent(&self) -> f64 {
        match self.values.last() {
            Some(&last) if self.peak > 0.0 => ((self.peak - last) / self.peak * 100.0).max(0.0),
            _ => 0.0,
        }
    }

    fn total_value(&self) -> f64 {
        self.values.last().copied().unwrap_or(0.0)
    }
}
