use crate::coord::{GeodeticPosition, HorizontalCoordinate};

// Metres per degree of latitude at the equator and at the tropics; the
// baseline model uses their mean. Longitude scale is the equatorial
// circumference spread over 360 degrees, shrunk by cos(latitude).
const EQUATOR_M_PER_DEG_LAT: f64 = 110_567.0;
const TROPIC_M_PER_DEG_LAT: f64 = 110_948.0;
const M_PER_DEG_LAT: f64 = (EQUATOR_M_PER_DEG_LAT + TROPIC_M_PER_DEG_LAT) / 2.0;
const M_PER_DEG_LON: f64 = 40_075.0 * 1000.0 / 360.0;

/// A vector in the local East-North-Up tangent frame. Used both for unit
/// source directions (unitless) and station baselines (metres).
///
/// The flat-tangent-plane approximation behind the baseline model is only
/// valid for baselines short relative to Earth's radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enu {
    pub e: f64,
    pub n: f64,
    pub u: f64,
}

impl Enu {
    pub const fn new(e: f64, n: f64, u: f64) -> Self {
        Self { e, n, u }
    }

    #[inline]
    pub fn dot(self, other: Enu) -> f64 {
        self.e * other.e + self.n * other.n + self.u * other.u
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn add(self, other: Enu) -> Enu {
        Enu::new(self.e + other.e, self.n + other.n, self.u + other.u)
    }

    pub fn scale(self, k: f64) -> Enu {
        Enu::new(self.e * k, self.n * k, self.u * k)
    }
}

/// Unit direction vector towards the source from its horizontal coordinates.
pub fn source_vector(h: HorizontalCoordinate) -> Enu {
    let (sin_alt, cos_alt) = h.altitude.radians().sin_cos();
    let (sin_az, cos_az) = h.azimuth.radians().sin_cos();
    Enu::new(cos_alt * cos_az, cos_alt * sin_az, sin_alt)
}

/// Baseline from telescope 1 to telescope 2 in the local tangent frame,
/// metres. Vertical separation is not modelled; the up component is always
/// zero. Computed once per telescope pair and constant for the session.
pub fn baseline_vector(p1: GeodeticPosition, p2: GeodeticPosition) -> Enu {
    let dlon = p2.longitude.value() - p1.longitude.value();
    let dlat = p2.latitude.value() - p1.latitude.value();
    let e = dlon * p1.latitude.radians().cos() * M_PER_DEG_LON;
    let n = dlat * M_PER_DEG_LAT;
    Enu::new(e, n, 0.0)
}

/// East-West component of a baseline: projection onto (1, 0, 0).
pub fn east_west(b: Enu) -> Enu {
    Enu::new(b.e, 0.0, 0.0)
}

/// North-South component of a baseline: projection onto (0, 1, 0).
pub fn north_south(b: Enu) -> Enu {
    Enu::new(0.0, b.n, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{Degrees, GeodeticPosition, HorizontalCoordinate};

    fn horizontal(alt: f64, az: f64) -> HorizontalCoordinate {
        HorizontalCoordinate {
            altitude: Degrees(alt),
            azimuth: Degrees(az),
        }
    }

    fn station(lat: f64, lon: f64) -> GeodeticPosition {
        GeodeticPosition::new(lat, lon).unwrap()
    }

    #[test]
    fn source_vector_has_unit_norm() {
        for alt in [-89.0, -45.0, 0.0, 30.0, 44.924274317423, 89.0] {
            for az in [0.0, 90.0, 180.0, 292.582010246402, 359.9] {
                let s = source_vector(horizontal(alt, az));
                assert!(
                    (s.norm() - 1.0).abs() < 1e-9,
                    "norm {} for alt {alt} az {az}",
                    s.norm()
                );
            }
        }
    }

    #[test]
    fn source_vector_axes() {
        // On the horizon at az 90 the vector lies along (cos az, sin az, 0).
        let east = source_vector(horizontal(0.0, 90.0));
        assert!(east.e.abs() < 1e-12);
        assert!((east.n - 1.0).abs() < 1e-12);
        // Zenith.
        let up = source_vector(horizontal(90.0, 0.0));
        assert!((up.u - 1.0).abs() < 1e-12);
        assert!(up.e.abs() < 1e-12 && up.n.abs() < 1e-12);
    }

    #[test]
    fn baseline_up_component_is_exactly_zero() {
        let b = baseline_vector(station(30.7046, 76.7179), station(11.9416, 79.8083));
        assert_eq!(b.u, 0.0);
        let reversed = baseline_vector(station(11.9416, 79.8083), station(30.7046, 76.7179));
        assert_eq!(reversed.u, 0.0);
    }

    #[test]
    fn golden_fixture_baseline() {
        let b = baseline_vector(station(30.7046, 76.7179), station(11.9416, 79.8083));
        assert!((b.e - 295_793.661733).abs() < 1e-6, "e = {}", b.e);
        assert!((b.n + 2_078_142.9725).abs() < 1e-6, "n = {}", b.n);
    }

    #[test]
    fn decomposition_is_complete() {
        for b in [
            Enu::new(295_793.66, -2_078_142.97, 0.0),
            Enu::new(-12.5, 7.25, 0.0),
            Enu::new(0.0, 0.0, 0.0),
        ] {
            let sum = east_west(b).add(north_south(b));
            assert_eq!(sum, Enu::new(b.e, b.n, 0.0));
        }
    }

    #[test]
    fn components_are_orthogonal() {
        let b = Enu::new(3.0, 4.0, 0.0);
        assert_eq!(east_west(b).dot(north_south(b)), 0.0);
    }
}
