/// External configuration loader.
///
/// Reads `config.toml` from an explicit path, or searches the executable's
/// directory, the CWD and `~/.config/2048`.
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::ui::theme::Scheme;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub scheme: Scheme,
    pub seed: Option<u64>,
    pub spawn_delay_ms: u64,
    pub frame_ms: u64,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub restart: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_scheme")]
    scheme: String,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_spawn_delay")]
    spawn_delay_ms: u64,
    #[serde(default = "default_frame")]
    frame_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
}

// ── Defaults ──

fn default_scheme() -> String { "original".into() }
fn default_spawn_delay() -> u64 { 150 }
fn default_frame() -> u64 { 10 }

fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_restart() -> Vec<String> { vec!["Y".into()] }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            scheme: default_scheme(),
            seed: None,
            spawn_delay_ms: default_spawn_delay(),
            frame_ms: default_frame(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
            restart: default_restart(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `explicit` if given, otherwise search the
    /// candidate directories for `config.toml`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Self {
        let toml_cfg = match explicit {
            Some(path) => read_toml(path).unwrap_or_default(),
            None => load_toml(&candidate_dirs()),
        };
        GameConfig::from_toml(toml_cfg)
    }

    /// Parse a config document. Unknown keys are ignored.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from_toml)
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        let scheme = Scheme::from_name(&cfg.general.scheme).unwrap_or_else(|| {
            warn!(scheme = %cfg.general.scheme, "unknown colour scheme, using original");
            Scheme::Original
        });

        GameConfig {
            scheme,
            seed: cfg.general.seed,
            spawn_delay_ms: cfg.general.spawn_delay_ms,
            frame_ms: cfg.general.frame_ms.max(1),
            gamepad: GamepadConfig {
                confirm: cfg.gamepad.confirm,
                cancel: cfg.gamepad.cancel,
                restart: cfg.gamepad.restart,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD + user config dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. ~/.config/2048
    if let Ok(home) = std::env::var("HOME") {
        let user = PathBuf::from(&home).join(".config/2048");
        if user.is_dir() && !dirs.iter().any(|d| d == &user) {
            dirs.push(user);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            if let Some(cfg) = read_toml(&path) {
                return cfg;
            }
        }
    }
    debug!("no config.toml found, using defaults");
    TomlConfig::default()
}

/// Read and parse one file. Parse errors fall back to defaults with a
/// warning; an unreadable file returns `None` so the search can continue.
fn read_toml(path: &Path) -> Option<TomlConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => match toml::from_str::<TomlConfig>(&text) {
            Ok(cfg) => {
                debug!(path = %path.display(), "loaded config");
                Some(cfg)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config parse error, using defaults");
                Some(TomlConfig::default())
            }
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read config");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::parse("").unwrap();
        assert_eq!(cfg.scheme, Scheme::Original);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.spawn_delay_ms, 150);
        assert_eq!(cfg.gamepad.cancel, vec!["Select".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse(
            "[general]\nscheme = \"bluered\"\nseed = 42\n\n[gamepad]\nrestart = [\"X\"]\n",
        )
        .unwrap();
        assert_eq!(cfg.scheme, Scheme::Bluered);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.frame_ms, 10);
        assert_eq!(cfg.gamepad.restart, vec!["X".to_string()]);
        assert_eq!(cfg.gamepad.confirm, vec!["Start".to_string(), "A".to_string()]);
    }

    #[test]
    fn unknown_scheme_falls_back() {
        let cfg = GameConfig::parse("[general]\nscheme = \"sepia\"\n").unwrap();
        assert_eq!(cfg.scheme, Scheme::Original);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(GameConfig::parse("[general\nscheme=").is_err());
    }

    #[test]
    fn zero_frame_is_clamped() {
        let cfg = GameConfig::parse("[general]\nframe_ms = 0\n").unwrap();
        assert_eq!(cfg.frame_ms, 1);
    }

    #[test]
    fn missing_explicit_file_uses_defaults() {
        let cfg = GameConfig::load(Some(Path::new("/nonexistent/2048/config.toml")));
        assert_eq!(cfg.spawn_delay_ms, 150);
    }
}
