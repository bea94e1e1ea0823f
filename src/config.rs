/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub link: LinkConfig,
    pub session: SessionConfig,
    pub general: GeneralConfig,
    /// Problems found while loading; shown in the log panel at startup.
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LinkConfig {
    pub peer_url: String,
    pub connect_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub duration_secs: u32,
    /// Resolved board descriptor path.
    pub board_file: PathBuf,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Theme {
    Dark,
    Light,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    pub frame_ms: u64,
    pub log_rows: usize,
    pub log_file: Option<PathBuf>,
    pub theme: Theme,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    link: TomlLink,
    #[serde(default)]
    session: TomlSession,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlLink {
    #[serde(default = "default_peer_url")]
    peer_url: String,
    #[serde(default = "default_connect_timeout")]
    connect_timeout_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlSession {
    #[serde(default = "default_duration")]
    duration_secs: u32,
    #[serde(default = "default_board_file")]
    board_file: String,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_log_rows")]
    log_rows: usize,
    #[serde(default)]
    log_file: String,
    #[serde(default = "default_theme")]
    theme: String,
}

// ── Defaults ──

fn default_peer_url() -> String { "ws://192.168.4.1/connect-websocket".into() }
fn default_connect_timeout() -> u64 { 3000 }
fn default_duration() -> u32 { 300 }      // 5 minute run
fn default_board_file() -> String { "website.json".into() }
fn default_frame_ms() -> u64 { 30 }
fn default_log_rows() -> usize { 5 }
fn default_theme() -> String { "dark".into() }

impl Default for TomlLink {
    fn default() -> Self {
        TomlLink {
            peer_url: default_peer_url(),
            connect_timeout_ms: default_connect_timeout(),
        }
    }
}

impl Default for TomlSession {
    fn default() -> Self {
        TomlSession {
            duration_secs: default_duration(),
            board_file: default_board_file(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            frame_ms: default_frame_ms(),
            log_rows: default_log_rows(),
            log_file: String::new(),
            theme: default_theme(),
        }
    }
}

// ── Loading ──

impl DashboardConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = Vec::new();
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        let mut cfg = Self::resolve(toml_cfg, &search_dirs);
        cfg.warnings = warnings;
        cfg
    }

    /// Parse a config document directly (no file search).
    #[cfg(test)]
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::resolve(toml_cfg, &[]))
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve board file: absolute as-is, else first candidate dir that has it
        let board_str = &toml_cfg.session.board_file;
        let board_file = if PathBuf::from(board_str).is_absolute() {
            PathBuf::from(board_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(board_str))
                .find(|p| p.is_file())
                .unwrap_or_else(|| PathBuf::from(board_str))
        };

        let log_file = match toml_cfg.general.log_file.trim() {
            "" => None,
            path => Some(PathBuf::from(path)),
        };

        let theme = match toml_cfg.general.theme.to_ascii_lowercase().as_str() {
            "light" => Theme::Light,
            _ => Theme::Dark,
        };

        DashboardConfig {
            link: LinkConfig {
                peer_url: toml_cfg.link.peer_url,
                connect_timeout: Duration::from_millis(toml_cfg.link.connect_timeout_ms),
            },
            session: SessionConfig {
                duration_secs: toml_cfg.session.duration_secs,
                board_file,
            },
            general: GeneralConfig {
                frame_ms: toml_cfg.general.frame_ms.max(1),
                log_rows: toml_cfg.general.log_rows,
                log_file,
                theme,
            },
            warnings: Vec::new(),
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
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

    // 3. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warnings.push(format!("config.toml parse error: {e}; using default settings"));
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warnings.push(format!("could not read {}: {e}", path.display()));
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.link.peer_url, "ws://192.168.4.1/connect-websocket");
        assert_eq!(cfg.link.connect_timeout, Duration::from_millis(3000));
        assert_eq!(cfg.session.duration_secs, 300);
        assert_eq!(cfg.session.board_file, PathBuf::from("website.json"));
        assert_eq!(cfg.general.log_rows, 5);
        assert_eq!(cfg.general.log_file, None);
        assert_eq!(cfg.general.theme, Theme::Dark);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = DashboardConfig::from_toml_str(
            r#"
            [link]
            peer_url = "ws://10.0.0.7:8080/connect-websocket"

            [general]
            theme = "Light"
            log_file = "gridbot.log"
            frame_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.link.peer_url, "ws://10.0.0.7:8080/connect-websocket");
        assert_eq!(cfg.link.connect_timeout, Duration::from_millis(3000));
        assert_eq!(cfg.general.theme, Theme::Light);
        assert_eq!(cfg.general.log_file, Some(PathBuf::from("gridbot.log")));
        assert_eq!(cfg.general.frame_ms, 1);
        assert_eq!(cfg.session.duration_secs, 300);
    }

    #[test]
    fn wrong_types_are_an_error() {
        assert!(DashboardConfig::from_toml_str("[session]\nduration_secs = \"long\"").is_err());
    }
}
