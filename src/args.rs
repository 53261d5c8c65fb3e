use std::path::PathBuf;

use clap::Parser;

use crate::coord::{
    CelestialTarget, Degrees, GeodeticPosition, HourAngleMode, WrapMode, LEGACY_FIXED_HA_DEG,
};
use crate::error::{DelayError, DynError};
use crate::obs::ObsFileData;

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Two-telescope VLBI geometric delay tracker for MBR captures",
    long_about = None,
    arg_required_else_help = true,
    after_help = "Examples:\n  vlbi_delay --ant1 cropped_CAS-A_ch03 --obs casa.obs --output delays.txt\n  vlbi_delay --ant1 ch03.mbr --ant2 ch05.mbr --ra 300 --dec 36.466667 --lat1 30.7046 --lon1 76.7179 --lat2 11.9416 --lon2 79.8083\n  vlbi_delay --ant1 ch03.mbr --obs casa.obs --track-sidereal --plot delays.png\n"
)]
pub struct Args {
    /// Path to telescope 1 MBR capture (supplies the epoch sequence)
    #[arg(long, visible_alias = "a1")]
    pub ant1: PathBuf,

    /// Path to telescope 2 MBR capture (optional; read for the banner only)
    #[arg(long, visible_alias = "a2")]
    pub ant2: Option<PathBuf>,

    /// Observation file with session parameters (CLI values take precedence)
    #[arg(long)]
    pub obs: Option<PathBuf>,

    /// Source RA (decimal degrees, or hms such as 16h42m58.8s / 16:42:58.8)
    #[arg(long)]
    pub ra: Option<String>,

    /// Source Dec (decimal degrees, or dms such as -20d31m31.57s)
    #[arg(long, allow_hyphen_values = true)]
    pub dec: Option<String>,

    /// Latitude of telescope 1 in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat1: Option<f64>,

    /// Longitude of telescope 1 in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon1: Option<f64>,

    /// Latitude of telescope 2 in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat2: Option<f64>,

    /// Longitude of telescope 2 in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon2: Option<f64>,

    /// Fixed hour angle in degrees (default: legacy 54.382617 when not tracking)
    #[arg(long = "fixed-ha", allow_hyphen_values = true)]
    pub fixed_ha: Option<f64>,

    /// Derive the hour angle from each epoch's sidereal timestamp instead of
    /// the fixed legacy angle
    #[arg(long = "track-sidereal", visible_alias = "track")]
    pub track_sidereal: bool,

    /// Use the legacy single-pass hour-angle wrap instead of modulo
    #[arg(long = "legacy-wrap")]
    pub legacy_wrap: bool,

    /// Write the delay series (metres, one per line) to this file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Write a PNG plot of the delay series to this file
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Number of parallel worker threads
    #[arg(long, default_value_t = 2)]
    pub cpu: usize,
}

/// Fully resolved session configuration after merging CLI and obs-file
/// values. The CLI always wins.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub source_label: String,
    pub target: CelestialTarget,
    pub station1: GeodeticPosition,
    pub station2: GeodeticPosition,
    pub ha_mode: HourAngleMode,
    pub wrap: WrapMode,
}

pub fn resolve_session(args: &Args, obs: Option<&ObsFileData>) -> Result<SessionConfig, DynError> {
    let ra_text = args
        .ra
        .clone()
        .or_else(|| obs.and_then(|d| d.ra.clone()))
        .ok_or(DelayError::Config("RA not provided (--ra or obs file)".into()))?;
    let dec_text = args
        .dec
        .clone()
        .or_else(|| obs.and_then(|d| d.dec.clone()))
        .ok_or(DelayError::Config("Dec not provided (--dec or obs file)".into()))?;

    let pick = |cli: Option<f64>, file: Option<f64>, name: &str| -> Result<f64, DelayError> {
        cli.or(file).ok_or_else(|| {
            DelayError::Config(format!("{name} not provided (--{name} or obs file)"))
        })
    };
    let lat1 = pick(args.lat1, obs.and_then(|d| d.lat1), "lat1")?;
    let lon1 = pick(args.lon1, obs.and_then(|d| d.lon1), "lon1")?;
    let lat2 = pick(args.lat2, obs.and_then(|d| d.lat2), "lat2")?;
    let lon2 = pick(args.lon2, obs.and_then(|d| d.lon2), "lon2")?;

    let target = CelestialTarget::new(parse_ra_degrees(&ra_text)?, parse_dec_degrees(&dec_text)?)?;
    let station1 = GeodeticPosition::new(lat1, lon1)?;
    let station2 = GeodeticPosition::new(lat2, lon2)?;

    let ha_mode = if args.track_sidereal {
        if args.fixed_ha.is_some() {
            return Err(
                DelayError::Config("--fixed-ha conflicts with --track-sidereal".into()).into(),
            );
        }
        HourAngleMode::FromSiderealTime
    } else {
        let fixed = args
            .fixed_ha
            .or_else(|| obs.and_then(|d| d.fixed_ha_deg))
            .unwrap_or(LEGACY_FIXED_HA_DEG);
        if !fixed.is_finite() {
            return Err(
                DelayError::Config(format!("fixed hour angle {fixed} is not finite")).into(),
            );
        }
        HourAngleMode::Fixed(Degrees(fixed))
    };
    let wrap = if args.legacy_wrap {
        WrapMode::SinglePass
    } else {
        WrapMode::Modulo
    };

    let source_label = obs
        .and_then(|d| d.source.clone())
        .unwrap_or_else(|| "unnamed".to_string());

    Ok(SessionConfig {
        source_label,
        target,
        station1,
        station2,
        ha_mode,
        wrap,
    })
}

fn sexagesimal(parts: &[&str], label: &'static str) -> Result<f64, DynError> {
    if parts.len() != 3 {
        return Err(format!("Invalid {label} format; expected three components").into());
    }
    let major = parts[0].parse::<f64>()?;
    let minutes = parts[1].parse::<f64>()?;
    let seconds = parts[2].parse::<f64>()?;
    if !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return Err(format!("Invalid {label} minutes/seconds value").into());
    }
    Ok(major + minutes / 60.0 + seconds / 3600.0)
}

/// Parse an RA string into decimal degrees.
/// Supports decimal degrees, `16h42m58.8s`, and `16:42:58.8` (hours).
pub fn parse_ra_degrees(text: &str) -> Result<f64, DynError> {
    let raw = text.trim().to_lowercase();
    if raw.is_empty() {
        return Err("Empty RA".into());
    }
    let marked = raw.contains(['h', 'm', 's', ':', ' ']);
    if !marked {
        return Ok(raw.parse::<f64>()?);
    }
    let cleaned = raw.replace(['h', 'm', 's', ':'], " ");
    let parts: Vec<&str> = cleaned.split_whitespace().collect();
    let hours = sexagesimal(&parts, "RA")?;
    Ok(hours * 15.0)
}

/// Parse a Dec string into decimal degrees.
/// Supports decimal degrees, `-20d31m31.57s`, and `-20:31:31.57`.
pub fn parse_dec_degrees(text: &str) -> Result<f64, DynError> {
    let raw = text.trim().to_lowercase();
    if raw.is_empty() {
        return Err("Empty Dec".into());
    }
    let sign = if raw.starts_with('-') { -1.0 } else { 1.0 };
    let stripped = raw.trim_start_matches(['+', '-']);
    let marked = stripped.contains(['d', 'm', 's', '\'', '"', ':', ' ']);
    if !marked {
        return Ok(sign * stripped.parse::<f64>()?);
    }
    let cleaned = stripped.replace(['d', 'm', 's', '\'', '"', ':'], " ");
    let parts: Vec<&str> = cleaned.split_whitespace().collect();
    Ok(sign * sexagesimal(&parts, "Dec")?)
}
