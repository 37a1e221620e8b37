use super::load::{default_config_path, default_log_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_setwheel_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("SETWHEEL_CONFIG_PATH", "/tmp/setwheel-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/setwheel-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("setwheel")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("setwheel")
            .join("config.toml")
    );
}

#[test]
fn default_log_path_uses_xdg_state_home_then_local_state() {
    let _lock = env_lock();
    {
        let _g1 = EnvGuard::set("XDG_STATE_HOME", "/tmp/xdg-state");
        assert_eq!(
            default_log_path().unwrap(),
            std::path::PathBuf::from("/tmp/xdg-state/setwheel/setwheel.log")
        );
    }
    let _g1 = EnvGuard::remove("XDG_STATE_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");
    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/state/setwheel/setwheel.log")
    );
}

#[test]
fn defaults_match_the_documented_behavior() {
    let s = Settings::default();
    assert_eq!(s.library.extensions, vec!["mp3".to_string(), "wav".to_string()]);
    assert!(s.library.recursive);
    assert_eq!(s.suggestions.limit, 10);
    assert_eq!(s.suggestions.min_score, 50);
    assert_eq!(s.playback.tick_ms, 1000);
    assert_eq!(s.controls.drag_threshold, 10);
    assert!(s.analysis.detect_missing);
    assert_eq!(s.analysis.window_secs, 60);
    assert!(matches!(s.set.duplicates, DuplicateSetting::Reject));
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    s.suggestions.limit = 11;
    assert!(s.validate().is_err());
    s.suggestions.limit = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.suggestions.min_score = 101;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.tick_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.analysis.window_secs = 0;
    assert!(s.validate().is_err());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[library]
extensions = ["mp3", "flac"]
recursive = false
include_hidden = false
follow_links = false
max_depth = 3

[analysis]
measure_loudness = false
detect_missing = false
window_secs = 30

[set]
duplicates = "allow"

[suggestions]
limit = 5
min_score = 70

[playback]
tick_ms = 500

[controls]
scrub_seconds = 9
drag_threshold = 4

[ui]
header_text = "hello"

[export]
default_dir = "/tmp/sets"

[logging]
level = "debug"
file = "/tmp/setwheel.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SETWHEEL_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("SETWHEEL__SUGGESTIONS__LIMIT");

    let s = Settings::load().unwrap();
    assert_eq!(s.library.extensions, vec!["mp3".to_string(), "flac".to_string()]);
    assert!(!s.library.recursive);
    assert!(!s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.library.max_depth, Some(3));
    assert!(!s.analysis.measure_loudness);
    assert!(!s.analysis.detect_missing);
    assert_eq!(s.analysis.window_secs, 30);
    assert!(matches!(s.set.duplicates, DuplicateSetting::Allow));
    assert_eq!(s.suggestions.limit, 5);
    assert_eq!(s.suggestions.min_score, 70);
    assert_eq!(s.playback.tick_ms, 500);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.controls.drag_threshold, 4);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(
        s.export.default_dir,
        Some(std::path::PathBuf::from("/tmp/sets"))
    );
    assert_eq!(s.logging.level, "debug");
    assert_eq!(
        s.logging.file,
        Some(std::path::PathBuf::from("/tmp/setwheel.log"))
    );
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[suggestions]
limit = 8
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SETWHEEL_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("SETWHEEL__SUGGESTIONS__LIMIT", "3");

    let s = Settings::load().unwrap();
    assert_eq!(s.suggestions.limit, 3);
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let _g1 = EnvGuard::set(
        "SETWHEEL_CONFIG_PATH",
        dir.path().join("absent.toml").to_str().unwrap(),
    );

    let s = Settings::load().unwrap();
    assert_eq!(s.suggestions.limit, 10);
    assert!(s.library.recursive);
}
