//! Configuration file – reads/writes `~/.tidewatch/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tidewatch_kernel::SafetyConfig;
use tidewatch_types::SystemId;

/// Persisted configuration stored in `~/.tidewatch/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Supervisor evaluation rate, in ticks per second.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,

    /// The `[supervisor]` table.
    #[serde(default)]
    pub supervisor: SafetyConfig,
}

fn default_tick_hz() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            supervisor: SafetyConfig::default(),
        }
    }
}

impl Config {
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_hz.max(1)))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tick_hz == 0 {
            return Err("tick_hz must be at least 1".to_string());
        }
        self.supervisor.validate().map_err(|e| e.to_string())
    }
}

/// Return the config path: `TIDEWATCH_CONFIG` when set, otherwise
/// `~/.tidewatch/config.toml`.
pub fn config_path() -> PathBuf {
    if let Ok(explicit) = std::env::var("TIDEWATCH_CONFIG") {
        return PathBuf::from(explicit);
    }
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".tidewatch").join("config.toml")
}

/// Resolve the effective config: the file at [`config_path`] (or defaults
/// when it does not exist) with env overrides applied, then validated.
pub fn load() -> Result<Config, String> {
    let mut cfg = read_from(&config_path())?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    cfg.validate()?;
    Ok(cfg)
}

/// Parse the config file at `path`.  Returns `None` if it does not exist.
pub(crate) fn read_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    toml::from_str(&raw)
        .map(Some)
        .map_err(|e| format!("Failed to parse config: {}", e))
}

/// Apply `TIDEWATCH_*` environment variable overrides to `cfg`.  Values that
/// fail to parse are ignored.
///
/// | Variable | Config field |
/// |---|---|
/// | `TIDEWATCH_LOST_COMMS_TIMEOUT` | `supervisor.lost_comms_timeout_secs` |
/// | `TIDEWATCH_SYSTEM_ID` | `supervisor.system_id` (decimal or `0x` hex) |
/// | `TIDEWATCH_TICK_HZ` | `tick_hz` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("TIDEWATCH_LOST_COMMS_TIMEOUT")
        && let Ok(secs) = v.trim().parse::<u64>()
    {
        cfg.supervisor.lost_comms_timeout_secs = secs;
    }
    if let Ok(v) = std::env::var("TIDEWATCH_SYSTEM_ID")
        && let Some(id) = parse_system_id(&v)
    {
        cfg.supervisor.system_id = id;
    }
    if let Ok(v) = std::env::var("TIDEWATCH_TICK_HZ")
        && let Ok(hz) = v.trim().parse::<u32>()
        && hz > 0
    {
        cfg.tick_hz = hz;
    }
}

pub(crate) fn parse_system_id(raw: &str) -> Option<SystemId> {
    let raw = raw.trim();
    let value = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).ok()?,
        None => raw.parse::<u16>().ok()?,
    };
    Some(SystemId(value))
}

/// Save the config to disk, creating `~/.tidewatch/` if necessary.
pub fn save(cfg: &Config) -> Result<PathBuf, String> {
    let path = config_path();
    save_to(cfg, &path)?;
    Ok(path)
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewatch_types::GeoPoint;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");
        let loaded = read_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.tick_hz, 1);
        assert_eq!(loaded.supervisor.lost_comms_timeout_secs, 600);
        assert!(loaded.supervisor.safety_location.is_none());
    }

    #[test]
    fn roundtrip_with_safety_location() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.supervisor.safety_location = Some(GeoPoint::new(41.18, -8.70));
        save_to(&cfg, &path).expect("save");

        let loaded = read_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.supervisor.safety_location, cfg.supervisor.safety_location);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "tick_hz = 4\n\n[supervisor]\nkeep_station_at_surface = false\n",
        )
        .expect("write");

        let loaded = read_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.tick_hz, 4);
        assert!(!loaded.supervisor.keep_station_at_surface);
        assert!(loaded.supervisor.ascend_with_actuation);
        assert_eq!(loaded.tick_period(), Duration::from_millis(250));
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[supervisor]\nlost_comms_timeout_secs = 10\n").expect("write");

        let cfg = read_from(&path).expect("parses").expect("some");
        let err = cfg.validate().expect_err("timeout below floor");
        assert!(err.contains("lost_comms_timeout_secs"));
    }

    #[test]
    fn zero_tick_rate_is_rejected() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "tick_hz = 0\n").expect("write");

        let cfg = read_from(&path).expect("parses").expect("some");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "tick_hz = \"fast\"\n").expect("write");

        let err = read_from(&path).expect_err("bad type");
        assert!(err.starts_with("Failed to parse config"));
    }

    #[test]
    fn config_path_points_to_tidewatch_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".tidewatch"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn read_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(read_from(&path).expect("no error").is_none());
    }

    #[test]
    fn system_id_parsing() {
        assert_eq!(parse_system_id("0x4001"), Some(SystemId(0x4001)));
        assert_eq!(parse_system_id("0X00ff"), Some(SystemId(0x00ff)));
        assert_eq!(parse_system_id(" 17 "), Some(SystemId(17)));
        assert_eq!(parse_system_id("0xzz"), None);
        assert_eq!(parse_system_id("70000"), None);
    }

    // Every env-var case lives in one test so no two tests race on the same
    // process environment.
    #[test]
    fn apply_env_overrides_reads_tidewatch_vars() {
        // SAFETY: no other test in this crate touches these variables.
        unsafe {
            std::env::set_var("TIDEWATCH_LOST_COMMS_TIMEOUT", "120");
            std::env::set_var("TIDEWATCH_SYSTEM_ID", "0x0010");
            std::env::set_var("TIDEWATCH_TICK_HZ", "5");
        }
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.supervisor.lost_comms_timeout_secs, 120);
        assert_eq!(cfg.supervisor.system_id, SystemId(0x0010));
        assert_eq!(cfg.tick_hz, 5);

        unsafe {
            std::env::set_var("TIDEWATCH_LOST_COMMS_TIMEOUT", "soon");
            std::env::set_var("TIDEWATCH_SYSTEM_ID", "console");
            std::env::set_var("TIDEWATCH_TICK_HZ", "0");
        }
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg, Config::default());

        unsafe {
            std::env::remove_var("TIDEWATCH_LOST_COMMS_TIMEOUT");
            std::env::remove_var("TIDEWATCH_SYSTEM_ID");
            std::env::remove_var("TIDEWATCH_TICK_HZ");
        }
    }
}
