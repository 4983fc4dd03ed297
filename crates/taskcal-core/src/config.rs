use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tracing::{debug, info, trace};

const RC_ENV_VAR: &str = "TASKCALRC";
const RC_FILE: &str = ".taskcalrc";

/// Flat key=value configuration, loaded from `~/.taskcalrc` (or the
/// `TASKCALRC` / `--config` override) on top of built-in defaults.
#[derive(Debug, Clone)]
pub struct Config {
    map: HashMap<String, String>,
}

impl Config {
    #[tracing::instrument(skip(rc_override))]
    pub fn load(rc_override: Option<&Path>) -> anyhow::Result<Self> {
        let mut cfg = Config {
            map: HashMap::new(),
        };

        cfg.map
            .insert("data.location".to_string(), "~/.taskcal".to_string());
        cfg.map.insert("color".to_string(), "on".to_string());

        let rc_path = resolve_rc_path(rc_override)?;
        if let Some(path) = rc_path {
            info!(rc = %path.display(), "loading config file");
            cfg.load_file(&path)?;
        } else {
            debug!("no config file found; using defaults");
        }

        Ok(cfg)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    #[tracing::instrument(skip(self))]
    fn load_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let path = expand_tilde(path);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        for (line_num, raw_line) in text.lines().enumerate() {
            let mut line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((before, _)) = line.split_once('#') {
                line = before.trim();
            }
            if line.is_empty() {
                continue;
            }

            let (k, v) = line.split_once('=').ok_or_else(|| {
                anyhow!(
                    "invalid config line {}:{}: {}",
                    path.display(),
                    line_num + 1,
                    raw_line
                )
            })?;

            let key = k.trim().to_string();
            let value = v.trim().to_string();
            trace!(key = %key, value = %value, "loaded config key");
            self.map.insert(key, value);
        }

        Ok(())
    }
}

/// Data directory precedence: `--data` flag, then `data.location` from the
/// config, then `~/.taskcal`. The directory is created if needed.
#[tracing::instrument(skip(cfg, override_dir))]
pub fn resolve_data_dir(cfg: &Config, override_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let dir = if let Some(path) = override_dir {
        path.to_path_buf()
    } else if let Some(cfg_value) = cfg.get("data.location") {
        expand_tilde(Path::new(&cfg_value))
    } else {
        default_data_dir()?
    };

    if !dir.exists() {
        info!(dir = %dir.display(), "creating data directory");
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    Ok(dir)
}

#[tracing::instrument(skip(override_path))]
fn resolve_rc_path(override_path: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = override_path {
        return Ok(Some(path.to_path_buf()));
    }

    if let Ok(rc_env) = std::env::var(RC_ENV_VAR) {
        if rc_env == "/dev/null" {
            return Ok(None);
        }
        return Ok(Some(PathBuf::from(rc_env)));
    }

    let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    let candidate = home.join(RC_FILE);
    if candidate.exists() {
        return Ok(Some(candidate));
    }

    Ok(None)
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(home.join(".taskcal"))
}

fn expand_tilde(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    if let Some(rest) = text.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::Config;

    #[test]
    fn config_file_overrides_defaults_and_ignores_comments() {
        let mut file = tempfile::NamedTempFile::new().expect("temp rc");
        writeln!(file, "# taskcal config").expect("write");
        writeln!(file, "data.location = /tmp/taskcal-test  # inline comment").expect("write");
        writeln!(file).expect("write");
        writeln!(file, "color = off").expect("write");
        file.flush().expect("flush");

        let cfg = Config::load(Some(file.path())).expect("load config");
        assert_eq!(cfg.get("data.location").as_deref(), Some("/tmp/taskcal-test"));
        assert_eq!(cfg.get("color").as_deref(), Some("off"));
    }

    #[test]
    fn malformed_lines_are_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp rc");
        writeln!(file, "no equals sign here").expect("write");
        file.flush().expect("flush");

        assert!(Config::load(Some(file.path())).is_err());
    }
}
