//! Serialization: `TrackerConfig` → INI text.

use super::parser::format_seconds;
use super::settings::TrackerConfig;

/// Render a configuration as a commented INI document.
///
/// The output parses back into the same configuration.
pub(super) fn to_config_string(config: &TrackerConfig) -> String {
    let polling = &config.polling;
    let adaptive = &config.adaptive;
    let logging = &config.logging;

    format!(
        r#"# trackpoll configuration

[polling]
# fixed: constant interval below; adaptive: distance-based interval from [adaptive]
mode = {mode}
# Seconds between fixes (fixed mode)
update_interval = {update_interval}
# Seconds before a request times out (fixed mode, >= update_interval)
update_timeout = {update_timeout}
accept_partial_updates = {accept_partial}

[adaptive]
min_interval = {min_interval}
max_interval = {max_interval}
# Desired distance between fixes in metres
target_distance = {target_distance}
# Seconds of history used for the speed estimate
window_period = {window_period}
# Added to the interval to form the timeout
timeout_margin = {timeout_margin}

[logging]
directory = {log_dir}
file = {log_file}
"#,
        mode = polling.mode,
        update_interval = format_seconds(polling.update_interval),
        update_timeout = format_seconds(polling.update_timeout),
        accept_partial = polling.accept_partial_updates,
        min_interval = format_seconds(adaptive.min_interval),
        max_interval = format_seconds(adaptive.max_interval),
        target_distance = adaptive.target_distance_m,
        window_period = format_seconds(adaptive.window_period),
        timeout_margin = format_seconds(adaptive.timeout_margin),
        log_dir = logging.directory.display(),
        log_file = logging.file,
    )
}
