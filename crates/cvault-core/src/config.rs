use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CvaultError, CvaultResult};

/// Top-level client configuration (loaded from cvault.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CvaultConfig {
    pub log: LogConfig,
    pub files: FilesConfig,
    pub passphrase: PassphraseConfig,
    /// Warn if the config file is world-readable (default: true)
    #[serde(default = "default_true")]
    pub config_file_mode_check: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: warn)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Suffix appended to encrypted files (default: .encrypted)
    pub encrypted_suffix: String,
    /// Replace existing output files without --force
    pub overwrite: bool,
    /// Directory for outputs when no explicit path is given (default: next to input)
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PassphraseConfig {
    /// Environment variable checked before prompting
    pub env_var: String,
    /// Ask twice when encrypting
    pub confirm_on_encrypt: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "text".into(),
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            encrypted_suffix: ".encrypted".into(),
            overwrite: false,
            output_dir: None,
        }
    }
}

impl Default for PassphraseConfig {
    fn default() -> Self {
        Self {
            env_var: "CVAULT_PASSPHRASE".into(),
            confirm_on_encrypt: true,
        }
    }
}

impl CvaultConfig {
    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml_str(content: &str) -> CvaultResult<Self> {
        let config: CvaultConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CvaultResult<()> {
        let suffix = &self.files.encrypted_suffix;
        if suffix.len() < 2 || !suffix.starts_with('.') {
            return Err(CvaultError::Config(format!(
                "files.encrypted_suffix must start with '.' and name an extension, got {suffix:?}"
            )));
        }
        if suffix.contains('/') || suffix.contains('\\') {
            return Err(CvaultError::Config(format!(
                "files.encrypted_suffix must not contain path separators, got {suffix:?}"
            )));
        }
        if !matches!(self.log.format.as_str(), "json" | "text") {
            return Err(CvaultError::Config(format!(
                "log.format must be \"json\" or \"text\", got {:?}",
                self.log.format
            )));
        }
        if self.passphrase.env_var.is_empty() {
            return Err(CvaultError::Config("passphrase.env_var must not be empty".into()));
        }
        Ok(())
    }
}

/// True if `path` is readable by users other than its owner.
#[cfg(unix)]
pub fn is_world_readable(path: &Path) -> CvaultResult<bool> {
    use std::os::unix::fs::PermissionsExt;
    let mode = std::fs::metadata(path)?.permissions().mode();
    Ok(mode & 0o004 != 0)
}

#[cfg(not(unix))]
pub fn is_world_readable(_path: &Path) -> CvaultResult<bool> {
    Ok(false)
}
