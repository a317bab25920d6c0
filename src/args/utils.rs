//! Shared utilities for argument processing.

/// What: Determine the log level based on command-line arguments and settings.
///
/// Inputs:
/// - `args`: Parsed command-line arguments.
/// - `configured`: Level from `settings.conf`.
///
/// Output:
/// - Log level string (trace, debug, info, warn, error).
///
/// Details:
/// - Verbose flag overrides `--log-level`, which overrides the settings file.
#[must_use]
pub fn determine_log_level(args: &crate::args::Args, configured: &str) -> String {
    if args.verbose {
        "debug".to_string()
    } else {
        args.log_level
            .clone()
            .unwrap_or_else(|| configured.to_string())
    }
}
