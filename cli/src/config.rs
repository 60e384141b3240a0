use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub const DB_ENV: &str = "PERSONALFIT_DB";
pub const TEXTGEN_URL_ENV: &str = "PERSONALFIT_TEXTGEN_URL";
pub const TEXTGEN_KEY_ENV: &str = "PERSONALFIT_TEXTGEN_KEY";
pub const LOG_ENV: &str = "PERSONALFIT_LOG";

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    /// Meal-plan generator endpoint. Without one, `plan` uses the offline template.
    pub textgen_url: Option<String>,
    pub textgen_key: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("", "", "personalfit")
            .context("Could not determine home directory")?;

        Self::from_parts(
            proj_dirs.data_dir().to_path_buf(),
            env_value(DB_ENV).map(PathBuf::from),
            env_value(TEXTGEN_URL_ENV),
            env_value(TEXTGEN_KEY_ENV),
        )
    }

    pub fn from_parts(
        data_dir: PathBuf,
        db_override: Option<PathBuf>,
        textgen_url: Option<String>,
        textgen_key: Option<String>,
    ) -> Result<Self> {
        let db_path = db_override.unwrap_or_else(|| data_dir.join("personalfit.db"));
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
        }

        Ok(Config {
            db_path,
            data_dir,
            textgen_url: non_blank(textgen_url),
            textgen_key: non_blank(textgen_key),
        })
    }
}

fn env_value(name: &str) -> Option<String> {
    non_blank(std::env::var(name).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_path_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let config = Config::from_parts(data_dir.clone(), None, None, None).unwrap();
        assert_eq!(config.db_path, data_dir.join("personalfit.db"));
        assert!(data_dir.is_dir());
        assert!(config.textgen_url.is_none());
    }

    #[test]
    fn test_db_override() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("elsewhere").join("meals.db");
        let config =
            Config::from_parts(dir.path().join("data"), Some(custom.clone()), None, None).unwrap();
        assert_eq!(config.db_path, custom);
        assert!(dir.path().join("elsewhere").is_dir());
    }

    #[test]
    fn test_blank_textgen_settings_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_parts(
            dir.path().to_path_buf(),
            None,
            Some("  ".to_string()),
            Some(String::new()),
        )
        .unwrap();
        assert!(config.textgen_url.is_none());
        assert!(config.textgen_key.is_none());

        let config = Config::from_parts(
            dir.path().to_path_buf(),
            None,
            Some(" http://localhost:9000/generate ".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(
            config.textgen_url.as_deref(),
            Some("http://localhost:9000/generate")
        );
    }
}
