use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fingerprint::FingerprintParams;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fingerprint: FingerprintParams,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("malformed {}: {}", path.display(), e)))
}

/// Explicit path, else `./sonoprint.toml`, else the user config directories.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from("sonoprint.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("sonoprint").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("sonoprint").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

/// Load the config named by `--config`, or the first one discovered.
///
/// A config passed explicitly must load. A discovered one that fails to
/// load is skipped with a warning.
pub fn load_active_config(explicit: Option<&Path>) -> Result<Option<Config>> {
    if let Some(path) = explicit {
        let config = load_config(path)?;
        log::info!("Loaded config from {}", path.display());
        return Ok(Some(config));
    }

    let Some(path) = find_config(None) else {
        return Ok(None);
    };
    match load_config(&path) {
        Ok(config) => {
            log::info!("Loaded config from {}", path.display());
            Ok(Some(config))
        }
        Err(err) => {
            log::warn!("Ignoring config: {}", err);
            Ok(None)
        }
    }
}

/// Fingerprint parameters from config, with CLI values taking precedence
/// when given.
pub fn resolve_params(
    config: Option<&Config>,
    chunk_seconds: Option<f64>,
    frequency_count: Option<usize>,
) -> FingerprintParams {
    let base = config.map(|c| c.fingerprint).unwrap_or_default();
    FingerprintParams {
        chunk_seconds: chunk_seconds.unwrap_or(base.chunk_seconds),
        frequency_count: frequency_count.unwrap_or(base.frequency_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: Config = toml::from_str("[fingerprint]\nfrequency_count = 5\n").unwrap();
        assert_eq!(cfg.fingerprint.frequency_count, 5);
        assert_eq!(cfg.fingerprint.chunk_seconds, 0.3);

        let empty: Config = toml::from_str("").unwrap();
        assert_eq!(empty.fingerprint, FingerprintParams::default());
    }

    #[test]
    fn cli_overrides_config() {
        let cfg: Config = toml::from_str("[fingerprint]\nchunk_seconds = 0.5\nfrequency_count = 4\n").unwrap();
        let params = resolve_params(Some(&cfg), None, Some(2));
        assert_eq!(params.chunk_seconds, 0.5);
        assert_eq!(params.frequency_count, 2);

        assert_eq!(resolve_params(None, None, None), FingerprintParams::default());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fingerprint]\nchunk_seconds = 0.2").unwrap();
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.fingerprint.chunk_seconds, 0.2);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "[fingerprint\nchunk_seconds = ").unwrap();
        assert!(matches!(load_config(bad.path()), Err(Error::Config(_))));
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("sonoprint.toml");
        let err = load_active_config(Some(&missing)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("sonoprint.toml"), "{err}");
    }

    #[test]
    fn explicit_malformed_config_is_an_error() {
        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "[fingerprint]\nfrequency_count = \"three\"").unwrap();
        assert!(matches!(load_active_config(Some(bad.path())), Err(Error::Config(_))));
    }

    #[test]
    fn explicit_config_is_used() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fingerprint]\nfrequency_count = 4").unwrap();
        let cfg = load_active_config(Some(file.path())).unwrap().unwrap();
        assert_eq!(cfg.fingerprint.frequency_count, 4);
    }

    #[test]
    fn explicit_path_wins() {
        let path = Path::new("/tmp/custom.toml");
        assert_eq!(find_config(Some(path)), Some(path.to_path_buf()));
    }
}
