/// Domain-specific error types for the quant core.
/// Bad arguments are rejected at the boundary. Numerical non-convergence is
/// reported as its own variant so callers can keep evaluating other contracts.
#[derive(Debug, thiserror::Error)]
pub enum QuantError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("implied volatility did not converge after {iterations} iterations (last error: {last_error:.6})")]
    NotConverged { iterations: u32, last_error: f64 },

    #[error("config error: {0}")]
    Config(String),
}

impl QuantError {
    #[inline]
    pub fn is_not_converged(&self) -> bool {
        matches!(self, QuantError::NotConverged { .. })
    }
}

impl From<serde_json::Error> for QuantError {
    fn from(e: serde_json::Error) -> Self {
        QuantError::InvalidArgument(e.to_string())
    }
}

pub type QuantResult<T> = Result<T, QuantError>;
