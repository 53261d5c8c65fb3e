use crate::error::DelayError;

/// Legacy fixed hour angle in degrees. Historic reductions substituted this
/// constant for the computed sidereal hour angle, so every epoch produced the
/// same pointing; kept selectable for bit-for-bit regression parity.
pub const LEGACY_FIXED_HA_DEG: f64 = 54.382617;

/// Denominator floor for the azimuth computation. Below this the source is at
/// zenith or the observer at a pole and the azimuth is undefined.
const AZ_DENOM_EPS: f64 = 1e-12;

/// An angle whose unit is part of its type. All public contracts in the
/// pipeline carry angles as `Degrees` so a degree value can never be fed
/// into a trigonometric call unconverted.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Degrees(pub f64);

impl Degrees {
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn radians(self) -> f64 {
        self.0.to_radians()
    }
}

/// Observer location on the geoid, one per telescope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticPosition {
    pub latitude: Degrees,
    pub longitude: Degrees,
}

impl GeodeticPosition {
    /// Boundary validation; rejects values the core math would silently
    /// turn into NaN or a wrong hemisphere.
    pub fn new(lat_deg: f64, lon_deg: f64) -> Result<Self, DelayError> {
        if !lat_deg.is_finite() || !(-90.0..=90.0).contains(&lat_deg) {
            return Err(DelayError::Config(format!(
                "latitude {lat_deg} outside [-90, 90] degrees"
            )));
        }
        if !lon_deg.is_finite() || !(-180.0..360.0).contains(&lon_deg) {
            return Err(DelayError::Config(format!(
                "longitude {lon_deg} outside [-180, 360) degrees"
            )));
        }
        Ok(Self {
            latitude: Degrees(lat_deg),
            longitude: Degrees(lon_deg),
        })
    }
}

/// Celestial source position, fixed for the whole observation campaign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CelestialTarget {
    pub ra: Degrees,
    pub dec: Degrees,
}

impl CelestialTarget {
    pub fn new(ra_deg: f64, dec_deg: f64) -> Result<Self, DelayError> {
        if !ra_deg.is_finite() {
            return Err(DelayError::Config(format!("RA {ra_deg} is not finite")));
        }
        if !dec_deg.is_finite() || !(-90.0..=90.0).contains(&dec_deg) {
            return Err(DelayError::Config(format!(
                "declination {dec_deg} outside [-90, 90] degrees"
            )));
        }
        Ok(Self {
            ra: Degrees(ra_deg),
            dec: Degrees(dec_deg),
        })
    }
}

/// One observation timestamp, carried as a local-sidereal-time-equivalent
/// angle extracted from a packet header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationEpoch {
    pub lst: Degrees,
}

/// Observer-centric pointing derived per epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalCoordinate {
    /// Elevation above the horizon, [-90, 90].
    pub altitude: Degrees,
    /// Compass bearing, [0, 360).
    pub azimuth: Degrees,
}

/// How the hour angle is obtained for each epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HourAngleMode {
    /// Corrected path: ha = lst - ra per epoch.
    FromSiderealTime,
    /// Legacy parity path: ignore the epoch and use a fixed angle. Output is
    /// constant across the whole series.
    Fixed(Degrees),
}

/// Hour-angle wrap strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    /// One conditional +/-360 pass. Matches historic output exactly but is
    /// wrong for inputs more than one period outside [0, 360).
    SinglePass,
    /// ((ha % 360) + 360) % 360; correct for any magnitude.
    Modulo,
}

/// Normalize an hour angle into [0, 360) under the selected wrap strategy.
pub fn normalize_hour_angle(ha: Degrees, mode: WrapMode) -> Degrees {
    let v = ha.value();
    match mode {
        WrapMode::SinglePass => {
            if v > 360.0 {
                Degrees(v - 360.0)
            } else if v < 0.0 {
                Degrees(v + 360.0)
            } else {
                Degrees(v)
            }
        }
        WrapMode::Modulo => Degrees(((v % 360.0) + 360.0) % 360.0),
    }
}

fn checked_asin(value: f64, op: &'static str) -> Result<f64, DelayError> {
    if !(-1.0..=1.0).contains(&value) {
        return Err(DelayError::Domain { op, value });
    }
    Ok(value.asin())
}

fn checked_acos(value: f64, op: &'static str) -> Result<f64, DelayError> {
    if !(-1.0..=1.0).contains(&value) {
        return Err(DelayError::Domain { op, value });
    }
    Ok(value.acos())
}

/// Convert celestial coordinates to horizontal coordinates for one epoch.
///
/// sin(alt) = sin(dec) sin(lat) + cos(dec) cos(lat) cos(ha)
/// cos(A)   = (sin(dec) - sin(alt) sin(lat)) / (cos(alt) cos(lat))
///
/// The two-valued acos ambiguity in azimuth is resolved with the hour-angle
/// sign: sin(ha) > 0 puts the source west of the meridian, az = 360 - A.
pub fn to_horizontal(
    target: CelestialTarget,
    epoch: ObservationEpoch,
    observer: GeodeticPosition,
    ha_mode: HourAngleMode,
    wrap: WrapMode,
) -> Result<HorizontalCoordinate, DelayError> {
    let ha = match ha_mode {
        HourAngleMode::FromSiderealTime => Degrees(epoch.lst.value() - target.ra.value()),
        HourAngleMode::Fixed(fixed) => fixed,
    };
    let ha = normalize_hour_angle(ha, wrap);

    let (sin_dec, cos_dec) = target.dec.radians().sin_cos();
    let (sin_lat, cos_lat) = observer.latitude.radians().sin_cos();
    let (sin_ha, cos_ha) = ha.radians().sin_cos();

    let sin_alt = sin_dec * sin_lat + cos_dec * cos_lat * cos_ha;
    let alt_deg = checked_asin(sin_alt, "altitude asin")?.to_degrees();

    let cos_alt = alt_deg.to_radians().cos();
    let denom = cos_alt * cos_lat;
    if denom.abs() < AZ_DENOM_EPS {
        return Err(DelayError::Domain {
            op: "azimuth denominator",
            value: denom,
        });
    }
    let cos_a = (sin_dec - sin_alt * sin_lat) / denom;
    let a_deg = checked_acos(cos_a, "azimuth acos")?.to_degrees();

    let az_deg = if sin_ha > 0.0 { 360.0 - a_deg } else { a_deg };

    Ok(HorizontalCoordinate {
        altitude: Degrees(alt_deg),
        azimuth: Degrees(az_deg),
    })
}
