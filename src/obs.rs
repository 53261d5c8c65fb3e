use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::DynError;

/// Session-level parameters read from a `key = value` observation file.
/// Every field is optional here; mandatory values are enforced after CLI
/// overrides are applied.
#[derive(Debug, Clone, Default)]
pub struct ObsFileData {
    pub source: Option<String>,
    pub ra: Option<String>,
    pub dec: Option<String>,
    pub lat1: Option<f64>,
    pub lon1: Option<f64>,
    pub lat2: Option<f64>,
    pub lon2: Option<f64>,
    pub fixed_ha_deg: Option<f64>,
}

fn parse_optional_f64(
    params: &HashMap<String, String>,
    keys: &[&str],
) -> Result<Option<f64>, DynError> {
    for key in keys {
        if let Some(value) = params.get(*key) {
            return Ok(Some(value.trim().parse::<f64>()?));
        }
    }
    Ok(None)
}

fn get_string(params: &HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| params.get(*key).cloned())
}

/// Parse an observation file. Lines are `key = value`; `#` starts a comment,
/// lines starting with `;` are ignored, keys are case-insensitive with
/// underscores stripped.
pub fn parse_obs_file(path: &Path) -> Result<ObsFileData, DynError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut params = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.splitn(2, '#').next().unwrap_or("").trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(index) = line.find('=') {
            let (key, value) = line.split_at(index);
            let key = key.trim().to_ascii_lowercase().replace('_', "");
            let value = value
                .trim_start_matches('=')
                .trim()
                .trim_matches('"')
                .trim_matches('\'')
                .to_string();
            params.insert(key, value);
        }
    }

    Ok(ObsFileData {
        source: get_string(&params, &["source", "object"]),
        ra: get_string(&params, &["ra", "srcra"]),
        dec: get_string(&params, &["dec", "srcdec"]),
        lat1: parse_optional_f64(&params, &["lat1", "ant1lat", "station1lat"])?,
        lon1: parse_optional_f64(&params, &["lon1", "ant1lon", "station1lon"])?,
        lat2: parse_optional_f64(&params, &["lat2", "ant2lat", "station2lat"])?,
        lon2: parse_optional_f64(&params, &["lon2", "ant2lon", "station2lon"])?,
        fixed_ha_deg: parse_optional_f64(&params, &["fixedha", "hourangle", "ha"])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_keys_with_comments_and_aliases() {
        let path = write_temp(
            "vlbi_delay_obs_test.obs",
            "# campaign config\n\
             source = \"CAS-A\"\n\
             ra = 300.0\n\
             dec = 36.466667  # degrees\n\
             ant1_lat = 30.7046\n\
             ant1_lon = 76.7179\n\
             lat2 = 11.9416\n\
             lon2 = 79.8083\n\
             ; disabled = true\n\
             fixed_ha = 54.382617\n",
        );
        let data = parse_obs_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(data.source.as_deref(), Some("CAS-A"));
        assert_eq!(data.ra.as_deref(), Some("300.0"));
        assert_eq!(data.dec.as_deref(), Some("36.466667"));
        assert_eq!(data.lat1, Some(30.7046));
        assert_eq!(data.lon1, Some(76.7179));
        assert_eq!(data.lat2, Some(11.9416));
        assert_eq!(data.lon2, Some(79.8083));
        assert_eq!(data.fixed_ha_deg, Some(54.382617));
    }

    #[test]
    fn missing_keys_stay_none() {
        let path = write_temp("vlbi_delay_obs_empty.obs", "source = test\n");
        let data = parse_obs_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(data.ra.is_none());
        assert!(data.lat1.is_none());
        assert!(data.fixed_ha_deg.is_none());
    }

    #[test]
    fn bad_numeric_value_is_an_error() {
        let path = write_temp("vlbi_delay_obs_bad.obs", "lat1 = north\n");
        assert!(parse_obs_file(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
