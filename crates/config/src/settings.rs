// Application settings
// Loaded from ~/.config/verger/config.toml

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use verger_recon::MergeMode;

pub const APP_DIR: &str = "verger";
pub const CONFIG_FILE: &str = "config.toml";
pub const DATABASE_FILE: &str = "verger.db";

/// Public Hydro-Québec tree registry API.
pub const HYDRO_QUEBEC_BASE_URL: &str =
    "https://arbres.hydroquebec.com/public/api/v1.0.0/arbres/fr/rechercher";

#[derive(Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    NotFound(PathBuf),
    Read(PathBuf, std::io::Error),
    Parse(PathBuf, String),
    Write(PathBuf, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(p) => write!(f, "config file not found: {}", p.display()),
            Self::Read(p, e) => write!(f, "cannot read {}: {e}", p.display()),
            Self::Parse(p, e) => write!(f, "invalid config {}: {e}", p.display()),
            Self::Write(p, e) => write!(f, "cannot write {}: {e}", p.display()),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(_, e) => Some(e),
            _ => None,
        }
    }
}

/// Row-loop diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Error messages kept in a report.
    pub error_sample_limit: usize,
    /// Rows without identity logged with their columns.
    pub empty_identity_sample_limit: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self { error_sample_limit: 5, empty_identity_sample_limit: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PfafSettings {
    /// Table read from SQLite exports.
    pub table: String,
    pub merge: MergeMode,
}

impl Default for PfafSettings {
    fn default() -> Self {
        Self { table: "plant_data".to_string(), merge: MergeMode::FillGaps }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydroQuebecSettings {
    pub base_url: String,
    /// Records per `partiel` page.
    pub page_size: usize,
    pub page_timeout_secs: u64,
    pub detail_timeout_secs: u64,
    pub merge: MergeMode,
    /// Rows fetched from the API when no file is given. 0 = all.
    pub limit: usize,
}

impl Default for HydroQuebecSettings {
    fn default() -> Self {
        Self {
            base_url: HYDRO_QUEBEC_BASE_URL.to_string(),
            page_size: 500,
            page_timeout_secs: 120,
            detail_timeout_secs: 15,
            merge: MergeMode::Overwrite,
            limit: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedSettings {
    pub merge: MergeMode,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self { merge: MergeMode::FillGaps }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite database path. `None` = platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    pub import: ImportSettings,
    pub pfaf: PfafSettings,
    pub hydroquebec: HydroQuebecSettings,
    pub seeds: SeedSettings,
}

impl Settings {
    /// Default settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }

    /// Default database path
    pub fn default_database_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(DATABASE_FILE)
    }

    /// Load from `explicit` (which must exist) or from the default path
    /// (which may not).
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) if !path.exists() => Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Self::load_file(path),
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::load_file(&path)
                } else {
                    log::debug!("no config at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Self::from_toml(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    pub fn from_toml(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    /// Write settings to `path`, creating its directory.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Write(path.to_path_buf(), e.to_string()))?;
        }
        let text = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Write(path.to_path_buf(), e.to_string()))?;
        fs::write(path, text).map_err(|e| ConfigError::Write(path.to_path_buf(), e.to_string()))
    }

    /// Configured database, else the platform default.
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(Self::default_database_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.pfaf.table, "plant_data");
        assert_eq!(settings.pfaf.merge, MergeMode::FillGaps);
        assert_eq!(settings.hydroquebec.merge, MergeMode::Overwrite);
        assert_eq!(settings.hydroquebec.page_size, 500);
        assert_eq!(settings.import.error_sample_limit, 5);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let settings = Settings::from_toml(
            r#"
database = "/srv/verger/jardin.db"

[pfaf]
table = "species"

[hydroquebec]
merge = "fill_gaps"
detail_timeout_secs = 30
"#,
        )
        .unwrap();
        assert_eq!(settings.database_path(), PathBuf::from("/srv/verger/jardin.db"));
        assert_eq!(settings.pfaf.table, "species");
        assert_eq!(settings.pfaf.merge, MergeMode::FillGaps);
        assert_eq!(settings.hydroquebec.merge, MergeMode::FillGaps);
        assert_eq!(settings.hydroquebec.detail_timeout_secs, 30);
        assert_eq!(settings.hydroquebec.page_timeout_secs, 120);
    }

    #[test]
    fn unknown_merge_mode_is_rejected() {
        assert!(Settings::from_toml("[seeds]\nmerge = \"replace\"\n").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join(CONFIG_FILE);
        let mut settings = Settings::default();
        settings.seeds.merge = MergeMode::Overwrite;
        settings.import.error_sample_limit = 10;
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(Some(&path)).unwrap(), settings);
    }
}
