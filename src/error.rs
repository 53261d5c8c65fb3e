use std::error::Error;

use thiserror::Error;

/// Tool-level error alias used by the orchestration layer.
pub type DynError = Box<dyn Error + Send + Sync>;

/// Errors raised by the delay pipeline.
///
/// Core math never clamps, logs or substitutes defaults; an out-of-range
/// trigonometric argument surfaces here and the caller decides whether to
/// skip the epoch or abort the batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DelayError {
    /// Inverse-trig argument outside its valid range, or an azimuth
    /// denominator too close to zero (source at zenith / observer at a pole).
    #[error("{op} received out-of-domain value {value}")]
    Domain { op: &'static str, value: f64 },

    /// Malformed or missing session-level input, caught at the boundary
    /// before entering the core math.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Malformed MBR packet header.
    #[error("Invalid MBR packet: {0}")]
    Packet(String),
}
