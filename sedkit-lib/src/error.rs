use thiserror::Error;

#[derive(Debug, Error)]
pub enum SedError {
    /// Rejected input at construction time: bad expression, bad table,
    /// unknown flux type or zeropoint tag, invalid redshift.
    #[error("construction error: {0}")]
    Construction(String),

    #[error("wavelength {x} outside of domain [{min}, {max}]")]
    Domain { x: f64, min: f64, max: f64 },

    #[error("incompatible operands: {0}")]
    IncompatibleOperand(String),

    #[error("cannot integrate: {0}")]
    NonIntegrable(String),

    #[error("magnitude undefined for non-positive flux {0}")]
    NonPositiveFlux(f64),

    #[error("data error: {0}")]
    Data(String),
}

pub type Result<T> = std::result::Result<T, SedError>;

impl SedError {
    pub(crate) fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }

    pub(crate) fn incompatible(msg: impl Into<String>) -> Self {
        Self::IncompatibleOperand(msg.into())
    }
}
