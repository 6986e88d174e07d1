mod tax;

pub use tax::{TaxRateEntry, TaxRateSet};

use crate::error::{CalcError, Result};
use crate::format::EURO;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub currency: CurrencySettings,
    #[serde(default)]
    pub tax: TaxRateSet,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CurrencySettings {
    pub symbol: String,
}

impl Default for CurrencySettings {
    fn default() -> Self {
        Self {
            symbol: EURO.to_string(),
        }
    }
}

/// Get the config directory path (XDG config dir, or ~/.invoice-calc/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "invoice-calc") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        CalcError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".invoice-calc"))
}

/// Load config.toml from `config_dir`
pub fn load_config(config_dir: &Path) -> Result<Config> {
    if !config_dir.exists() {
        return Err(CalcError::ConfigNotFound(config_dir.to_path_buf()));
    }
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(CalcError::ConfigNotFound(path));
    }

    let content = fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&content).map_err(|e| CalcError::ConfigParse {
        path: path.clone(),
        source: e,
    })?;

    if !config.tax.contains(config.tax.default) {
        warn!(
            default = config.tax.default.basis_points(),
            "default tax rate is not in the configured rates"
        );
    }
    info!(path = %path.display(), rates = config.tax.rates.len(), "loaded config");
    Ok(config)
}

/// Load config.toml, or the built-in defaults when none was initialized
pub fn load_config_or_default(config_dir: &Path) -> Result<Config> {
    match load_config(config_dir) {
        Err(CalcError::ConfigNotFound(path)) => {
            info!(path = %path.display(), "no config found, using defaults");
            Ok(Config::default())
        }
        other => other,
    }
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[currency]
symbol = "€"

[tax]
default = 2000  # basis points: 2000 = 20%

# Rates a line may use. `value` is in basis points (1960 = 19.6%).
rates = [
    { value = 0, name = "Exonéré" },
    { value = 500, name = "5 %" },
    { value = 550, name = "5,5 %" },
    { value = 700, name = "7 %" },
    { value = 1000, name = "10 %" },
    { value = 1960, name = "19,6 %" },
    { value = 2000, name = "20 %" },
]
"#;
