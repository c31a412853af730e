//! Human-readable error descriptions and structured JSON error formatting.

use crate::host::HostError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use sct_core::error::BuildError;

    // Typed matches first
    if let Some(he) = err.downcast_ref::<HostError>() {
        return match he {
            HostError::ShortReply { .. } | HostError::ShortEcho { .. } => format!(
                "What happened: {he}.\nLikely causes: The device does not implement this request or the transfer was cut short.\nHow to fix: Check that the firmware matches this host tool, then retry."
            ),
            HostError::EchoMismatch { .. } => format!(
                "What happened: {he}.\nLikely causes: Bit errors on the bus or an oscillator running off its calibrated clock.\nHow to fix: Replug the device so it recalibrates, and try another cable or port."
            ),
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingBoard => {
                "What happened: No board was provided to the device core.\nLikely causes: The simulated board failed to initialize.\nHow to fix: Check the [oscillator] and [signal] sections of the config.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the [device] and [window] sections, then rerun."
            ),
        };
    }

    if let Some(hw) = err.downcast_ref::<sct_hardware::HwError>() {
        return format!(
            "What happened: {hw}.\nLikely causes: Out-of-range simulation parameters.\nHow to fix: Edit the [oscillator] and [signal] sections of the config."
        );
    }

    // String-based heuristics for errors coming from config loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read config") || lower.contains("parse config") {
        let mut cause = String::new();
        if let Some(src) = err.source() {
            cause = format!(" Cause: {src}");
        }
        return format!(
            "What happened: Could not load the config file.{cause}\nHow to fix: Check the --config path and the TOML syntax."
        );
    }

    if lower.contains("must be") {
        return format!(
            "What happened: Invalid configuration ({msg}).\nHow to fix: Edit the named field in the TOML config, then rerun."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug. Details: {msg}"
    )
}

/// Stable exit codes: 3 for short replies, 4 for data errors, 2 for
/// configuration problems, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(he) = err.downcast_ref::<HostError>() {
        return match he {
            HostError::ShortReply { .. } | HostError::ShortEcho { .. } => 3,
            HostError::EchoMismatch { .. } => 4,
        };
    }
    if err.downcast_ref::<sct_core::error::BuildError>().is_some()
        || err.downcast_ref::<sct_hardware::HwError>().is_some()
    {
        return 2;
    }
    let lower = err.to_string().to_ascii_lowercase();
    if lower.contains("config") || lower.contains("must be") {
        return 2;
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = match err.downcast_ref::<HostError>() {
        Some(HostError::ShortReply { .. } | HostError::ShortEcho { .. }) => "ShortReply",
        Some(HostError::EchoMismatch { .. }) => "DataError",
        None if exit_code_for_error(err) == 2 => "Config",
        None => "Error",
    };
    json!({ "reason": reason, "message": humanize(err) }).to_string()
}
