//! Settings and configuration paths.
//!
//! Settings live in `settings.conf` as `key = value` lines. Unknown keys and
//! unparsable values are ignored so an old or hand-edited file never prevents
//! startup.

use std::env;
use std::path::{Path, PathBuf};

use crate::refresh::DEFAULT_DEBOUNCE_MS;
use crate::state::DEFAULT_PER_PAGE;

/// Title shown for a list without a saved query.
pub const DEFAULT_TITLE: &str = "Work packages";

/// User-configurable settings parsed from `settings.conf`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Debounce window of the refresh coordinator, in milliseconds.
    pub refresh_debounce_ms: u64,
    /// Title shown while the default (unsaved) query is displayed.
    pub default_title: String,
    /// Page size used before the first load reports one.
    pub per_page: u32,
    /// Log level for the binary (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_debounce_ms: DEFAULT_DEBOUNCE_MS,
            default_title: DEFAULT_TITLE.to_string(),
            per_page: DEFAULT_PER_PAGE,
            log_level: "info".to_string(),
        }
    }
}

/// What: Check if a line should be skipped (empty or comment).
///
/// Details:
/// - Skips empty lines and lines starting with `#`, `//`, or `;`
fn skip_comment_or_empty(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("//")
        || trimmed.starts_with(';')
}

/// What: Split `key = value`, normalizing the key.
///
/// Output:
/// - `Some((key, value))` when the line contains `=`; the key is lowercased
///   with `.`, `-` and spaces mapped to `_`, the value has trailing ` # ...`
///   comments removed.
fn parse_key_value(line: &str) -> Option<(String, String)> {
    let (raw_key, raw_value) = line.trim().split_once('=')?;
    let key = raw_key.trim().to_lowercase().replace(['.', '-', ' '], "_");
    let value = strip_inline_comment(raw_value.trim());
    Some((key, value.to_string()))
}

/// Remove a trailing ` #` comment from a value.
fn strip_inline_comment(value: &str) -> &str {
    value
        .find(" #")
        .map_or(value, |idx| &value[..idx])
        .trim()
}

/// What: Apply settings from `settings.conf` content.
///
/// Inputs:
/// - `content`: File content.
/// - `settings`: Settings to update in place.
pub fn parse_settings(content: &str, settings: &mut Settings) {
    for line in content.lines() {
        if skip_comment_or_empty(line) {
            continue;
        }
        let Some((key, val)) = parse_key_value(line) else {
            continue;
        };
        match key.as_str() {
            "refresh_debounce_ms" | "debounce_ms" => {
                if let Ok(v) = val.parse::<u64>() {
                    settings.refresh_debounce_ms = v;
                }
            }
            "default_title" | "title" => {
                if !val.is_empty() {
                    settings.default_title = val;
                }
            }
            "per_page" | "page_size" => {
                if let Ok(v) = val.parse::<u32>()
                    && v > 0
                {
                    settings.per_page = v;
                }
            }
            "log_level" => {
                let lv = val.to_ascii_lowercase();
                if matches!(lv.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
                    settings.log_level = lv;
                }
            }
            other => {
                tracing::debug!(key = other, "[Config] ignoring unknown setting");
            }
        }
    }
}

/// Resolve an XDG base directory from environment or default to `$HOME` + segments.
fn xdg_base_dir(var: &str, home_default: &[&str]) -> PathBuf {
    if let Ok(p) = env::var(var)
        && !p.trim().is_empty()
    {
        return PathBuf::from(p);
    }
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let mut base = PathBuf::from(home);
    for seg in home_default {
        base = base.join(seg);
    }
    base
}

/// Config directory: `$HOME/.config/tablesync`, else under `XDG_CONFIG_HOME` (ensured to exist).
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Ok(home) = env::var("HOME") {
        let dir = Path::new(&home).join(".config").join("tablesync");
        if std::fs::create_dir_all(&dir).is_ok() {
            return dir;
        }
    }
    let dir = xdg_base_dir("XDG_CONFIG_HOME", &[".config"]).join("tablesync");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Logs directory under config: `<config>/logs` (ensured to exist).
#[must_use]
pub fn logs_dir() -> PathBuf {
    let dir = config_dir().join("logs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Locate `settings.conf`, preferring `$HOME/.config/tablesync` over `XDG_CONFIG_HOME`.
fn resolve_settings_path() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(home) = env::var("HOME") {
        candidates.push(
            Path::new(&home)
                .join(".config")
                .join("tablesync")
                .join("settings.conf"),
        );
    }
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        candidates.push(Path::new(&xdg).join("tablesync").join("settings.conf"));
    }
    candidates.into_iter().find(|p| p.is_file())
}

/// What: Load settings from an explicit file.
///
/// Output:
/// - Defaults overlaid with the file's values; defaults alone when the file
///   cannot be read.
#[must_use]
pub fn load_settings_from(path: &Path) -> Settings {
    let mut settings = Settings::default();
    match std::fs::read_to_string(path) {
        Ok(content) => parse_settings(&content, &mut settings),
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "[Config] cannot read settings; using defaults"
            );
        }
    }
    settings
}

/// What: Load settings from the standard location, or defaults.
#[must_use]
pub fn load_settings() -> Settings {
    resolve_settings_path().map_or_else(Settings::default, |path| load_settings_from(&path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Known keys are parsed, aliases and inline comments handled, junk ignored.
    ///
    /// Inputs:
    /// - Content mixing comments, aliases, an invalid number and an unknown key.
    ///
    /// Output:
    /// - Valid values applied, invalid ones leave defaults.
    fn parse_settings_applies_known_keys() {
        let content = "\
# list settings
refresh-debounce-ms = 35   # ms
Default.Title = Alle Arbeitspakete
per_page = 0
page_size = abc
log_level = DEBUG
; legacy
unknown_key = 1
";
        let mut settings = Settings::default();
        parse_settings(content, &mut settings);
        assert_eq!(settings.refresh_debounce_ms, 35);
        assert_eq!(settings.default_title, "Alle Arbeitspakete");
        assert_eq!(settings.per_page, DEFAULT_PER_PAGE);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    /// What: Loading from a file overlays defaults; a missing file yields defaults.
    fn load_settings_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.conf");
        std::fs::write(&path, "per_page = 50\n").expect("write settings");

        let settings = load_settings_from(&path);
        assert_eq!(settings.per_page, 50);
        assert_eq!(settings.refresh_debounce_ms, DEFAULT_DEBOUNCE_MS);

        let missing = load_settings_from(&dir.path().join("nope.conf"));
        assert_eq!(missing, Settings::default());
    }
}
