// ============================================================================
// SETTINGS — `key=value` configuration read at startup
// ============================================================================

use std::path::PathBuf;

use crate::log_warn;
use crate::pipeline::params::{DEFAULT_HIGH, DEFAULT_LOW, ThresholdParams};

/// Startup configuration.  Read-only at runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    /// Initial low threshold (clamped against `default_high`).
    pub default_low: i32,
    /// Initial high threshold.
    pub default_high: i32,
    /// Gaussian sigma applied before Canny (0 = off)
    pub pre_blur_sigma: f32,
    /// Open the log drawer at startup
    pub show_log: bool,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_low: DEFAULT_LOW as i32,
            default_high: DEFAULT_HIGH as i32,
            pre_blur_sigma: 0.0,
            show_log: false,
            window_width: 1100.0,
            window_height: 720.0,
        }
    }
}

impl AppSettings {
    /// Initial thresholds, repaired into a legal pair.
    pub fn initial_params(&self) -> ThresholdParams {
        ThresholdParams::clamped(self.default_low, self.default_high)
    }

    /// Get the platform-specific settings file path
    fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA").ok().map(|appdata| {
                PathBuf::from(appdata)
                    .join("CannyPlayground")
                    .join("settings.cfg")
            })
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME").ok().map(|home| {
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("CannyPlayground")
                    .join("settings.cfg")
            })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let base = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .ok()
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|home| PathBuf::from(home).join(".config"))
                })?;
            Some(base.join("CannyPlayground").join("settings.cfg"))
        }
    }

    /// Load settings from disk (returns default if file missing or unreadable)
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        let Ok(content) = std::fs::read_to_string(&path) else { return Self::default() };
        Self::parse(&content)
    }

    /// Parse `key=value` lines.  Unknown keys and bad values are skipped,
    /// leaving that key at its default.
    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let key = key.trim();
            let val = val.trim();
            let ok = match key {
                "default_low" => val.parse().map(|v| s.default_low = v).is_ok(),
                "default_high" => val.parse().map(|v| s.default_high = v).is_ok(),
                "pre_blur_sigma" => val
                    .parse::<f32>()
                    .map(|v| s.pre_blur_sigma = v.max(0.0))
                    .is_ok(),
                "show_log" => {
                    s.show_log = val == "true";
                    true
                }
                "window_width" => val.parse().map(|v| s.window_width = v).is_ok(),
                "window_height" => val.parse().map(|v| s.window_height = v).is_ok(),
                _ => true,
            };
            if !ok {
                log_warn!("settings: ignoring bad value for '{}': '{}'", key, val);
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_gives_defaults() {
        assert_eq!(AppSettings::parse(""), AppSettings::default());
    }

    #[test]
    fn known_keys_override_defaults() {
        let s = AppSettings::parse(
            "# thresholds\ndefault_low = 20\ndefault_high=90\npre_blur_sigma=1.5\nshow_log=true\n",
        );
        assert_eq!(s.default_low, 20);
        assert_eq!(s.default_high, 90);
        assert_eq!(s.pre_blur_sigma, 1.5);
        assert!(s.show_log);
    }

    #[test]
    fn bad_values_and_unknown_keys_are_skipped() {
        let s = AppSettings::parse("default_low=abc\ncolour=blue\nwindow_width=800\nnonsense");
        assert_eq!(s.default_low, DEFAULT_LOW as i32);
        assert_eq!(s.window_width, 800.0);
    }

    #[test]
    fn inverted_thresholds_are_repaired() {
        let s = AppSettings::parse("default_low=220\ndefault_high=40");
        let p = s.initial_params();
        assert!(p.low() < p.high());
        assert_eq!(p.high(), 40);
    }

    #[test]
    fn negative_blur_is_clamped_to_off() {
        assert_eq!(AppSettings::parse("pre_blur_sigma=-3").pre_blur_sigma, 0.0);
    }
}
