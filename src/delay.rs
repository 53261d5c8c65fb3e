use rayon::prelude::*;

use crate::coord::{
    to_horizontal, CelestialTarget, GeodeticPosition, HourAngleMode, ObservationEpoch, WrapMode,
};
use crate::enu::{source_vector, Enu};
use crate::error::DelayError;

const C: f64 = 299792458.0; // Speed of light in m/s

/// Projection of the source direction onto the baseline, in the baseline's
/// length unit (metres). Bilinear in both arguments; NaN/Inf propagate per
/// IEEE semantics.
#[inline]
pub fn geometric_delay(src: Enu, baseline: Enu) -> f64 {
    src.dot(baseline)
}

/// Express a metre-valued delay as a light-travel-time delay in seconds.
#[inline]
pub fn delay_to_seconds(delay_m: f64) -> f64 {
    delay_m / C
}

/// One delay value per epoch, index-aligned with the input sequence.
///
/// Epochs are independent, so they are evaluated in parallel; the indexed
/// collect keeps output order identical to input order regardless of
/// completion order. Fails fast on the first domain error.
pub fn delay_series(
    target: CelestialTarget,
    observer: GeodeticPosition,
    epochs: &[ObservationEpoch],
    baseline: Enu,
    ha_mode: HourAngleMode,
    wrap: WrapMode,
) -> Result<Vec<f64>, DelayError> {
    epochs
        .par_iter()
        .map(|&epoch| {
            let horizontal = to_horizontal(target, epoch, observer, ha_mode, wrap)?;
            Ok(geometric_delay(source_vector(horizontal), baseline))
        })
        .collect()
}
