//! Optional config file loading. Search order: ./sekaiscrape.toml, then
//! $XDG_CONFIG_HOME/sekaiscrape/config.toml (or ~/.config/sekaiscrape/config.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const LOCAL_CONFIG_FILE: &str = "sekaiscrape.toml";

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Base directory for `save` when --out-dir is not set. Relative to CWD.
    pub output_dir: Option<PathBuf>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Origin of the service, e.g. a mirror.
    pub base_url: Option<String>,
    /// Chapter file format for `save`: json (default) or text.
    pub chapter_format: Option<String>,
}

/// Read and parse one config file.
pub fn load_config_file(path: &Path) -> Result<Config, String> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
    toml::from_str(&s).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
}

/// Search order: (1) ./sekaiscrape.toml, (2) $XDG_CONFIG_HOME/sekaiscrape/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join(LOCAL_CONFIG_FILE)];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("sekaiscrape").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            log::debug!("using config {}", path.display());
            return load_config_file(path).map(Some);
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let c: Config = toml::from_str("").unwrap();
        assert!(c.output_dir.is_none());
        assert!(c.user_agent.is_none());
        assert!(c.timeout_secs.is_none());
        assert!(c.base_url.is_none());
        assert!(c.chapter_format.is_none());
    }

    #[test]
    fn parse_full_config() {
        let s = r#"
            output_dir = "library"
            user_agent = "Custom/1.0"
            timeout_secs = 60
            base_url = "https://mirror.example.com"
            chapter_format = "text"
        "#;
        let c: Config = toml::from_str(s).unwrap();
        assert_eq!(c.output_dir.as_deref(), Some(Path::new("library")));
        assert_eq!(c.user_agent.as_deref(), Some("Custom/1.0"));
        assert_eq!(c.timeout_secs, Some(60));
        assert_eq!(c.base_url.as_deref(), Some("https://mirror.example.com"));
        assert_eq!(c.chapter_format.as_deref(), Some("text"));
    }

    #[test]
    fn parse_partial_config() {
        let c: Config = toml::from_str("timeout_secs = 5").unwrap();
        assert_eq!(c.timeout_secs, Some(5));
        assert!(c.output_dir.is_none());
    }

    #[test]
    fn invalid_toml_errors() {
        assert!(toml::from_str::<Config>("output_dir = [").is_err());
    }

    #[test]
    fn load_config_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCAL_CONFIG_FILE);
        std::fs::write(&path, "timeout_secs = \"soon\"").unwrap();
        let err = load_config_file(&path).unwrap_err();
        assert!(err.starts_with("Invalid config"));
        assert!(err.contains(LOCAL_CONFIG_FILE));
    }

    #[test]
    fn load_config_file_reads_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCAL_CONFIG_FILE);
        std::fs::write(&path, "output_dir = \"out\"").unwrap();
        let c = load_config_file(&path).unwrap();
        assert_eq!(c.output_dir.as_deref(), Some(Path::new("out")));
    }
}
