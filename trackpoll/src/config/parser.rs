//! INI parsing: `Ini` → `TrackerConfig`.
//!
//! The single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::time::Duration;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::{PollingMode, TrackerConfig};
use crate::poller::AdaptiveConfigError;
use crate::provider::OptionsError;

/// Parse an `Ini` object into a `TrackerConfig`.
///
/// Starts from `TrackerConfig::default()` and overlays any values found.
pub(super) fn parse_ini(ini: &Ini) -> Result<TrackerConfig, ConfigFileError> {
    let mut config = TrackerConfig::default();

    // [polling]
    if let Some(section) = ini.section(Some("polling")) {
        if let Some(v) = section.get("mode") {
            config.polling.mode = v.parse::<PollingMode>().map_err(|_| {
                invalid("polling", "mode", v, "must be 'fixed' or 'adaptive'")
            })?;
        }
        if let Some(v) = seconds(section, "polling", "update_interval")? {
            config.polling.update_interval = v;
        }
        if let Some(v) = seconds(section, "polling", "update_timeout")? {
            config.polling.update_timeout = v;
        }
        if let Some(v) = section.get("accept_partial_updates") {
            config.polling.accept_partial_updates = parse_bool(v).ok_or_else(|| {
                invalid(
                    "polling",
                    "accept_partial_updates",
                    v,
                    "must be true or false",
                )
            })?;
        }
    }

    // [adaptive]
    if let Some(section) = ini.section(Some("adaptive")) {
        if let Some(v) = seconds(section, "adaptive", "min_interval")? {
            config.adaptive.min_interval = v;
        }
        if let Some(v) = seconds(section, "adaptive", "max_interval")? {
            config.adaptive.max_interval = v;
        }
        if let Some(v) = section.get("target_distance") {
            config.adaptive.target_distance_m = v.trim().parse().map_err(|_| {
                invalid(
                    "adaptive",
                    "target_distance",
                    v,
                    "must be a positive number (metres)",
                )
            })?;
        }
        if let Some(v) = seconds(section, "adaptive", "window_period")? {
            config.adaptive.window_period = v;
        }
        if let Some(v) = seconds(section, "adaptive", "timeout_margin")? {
            config.adaptive.timeout_margin = v;
        }
    }

    // [logging]
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
    }

    validate(&config)?;
    Ok(config)
}

/// Cross-field checks, reported against the key that has to change.
fn validate(config: &TrackerConfig) -> Result<(), ConfigFileError> {
    if config.polling.mode == PollingMode::Fixed {
        if let Err(e) = config.polling.update_options() {
            let (key, value) = match e {
                OptionsError::ZeroInterval => ("update_interval", config.polling.update_interval),
                OptionsError::TimeoutShorterThanInterval { .. } => {
                    ("update_timeout", config.polling.update_timeout)
                }
            };
            return Err(invalid(
                "polling",
                key,
                &format_seconds(value),
                &e.to_string(),
            ));
        }
    }

    if let Err(e) = config.adaptive.validate() {
        let adaptive = &config.adaptive;
        let (key, value) = match e {
            AdaptiveConfigError::ZeroMinInterval | AdaptiveConfigError::MinAboveMax { .. } => {
                ("min_interval", format_seconds(adaptive.min_interval))
            }
            AdaptiveConfigError::InvalidTargetDistance(d) => ("target_distance", d.to_string()),
            AdaptiveConfigError::ZeroWindow => {
                ("window_period", format_seconds(adaptive.window_period))
            }
        };
        return Err(invalid("adaptive", key, &value, &e.to_string()));
    }

    Ok(())
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Read a duration given in (possibly fractional) seconds.
fn seconds(
    section: &Properties,
    section_name: &str,
    key: &str,
) -> Result<Option<Duration>, ConfigFileError> {
    let Some(v) = section.get(key) else {
        return Ok(None);
    };
    v.trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .map(Some)
        .ok_or_else(|| {
            invalid(
                section_name,
                key,
                v,
                "must be a non-negative number of seconds",
            )
        })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Format a duration the way it is written in the file.
pub(super) fn format_seconds(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs.fract() == 0.0 {
        format!("{}", duration.as_secs())
    } else {
        format!("{}", secs)
    }
}

/// Expand a leading `~` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
