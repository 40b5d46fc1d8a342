//! Layered configuration for folio.
//!
//! Values are merged, lowest priority first, from built-in defaults, an
//! optional TOML, YAML or JSON file, and `FOLIO_`-prefixed environment
//! variables (nested keys separated by `__`, e.g. `FOLIO_HTTP__TIMEOUT_SECS`).

pub mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use folio_extract::models::ProviderId;
use folio_provider::client::HttpOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ErrorKind, Result};

const ENV_PREFIX: &str = "FOLIO_";
const DATABASE_FILE: &str = "folio.sqlite";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: PathBuf,
    pub http: HttpConfig,
    pub paging: PagingConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Records from the loaded tail at which the next page is requested.
    pub prefetch_distance: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub readmanga: ProviderConfig,
    pub senmanga: ProviderConfig,
    pub dm5: ProviderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub enabled: bool,
    pub base_url: String,
    /// Only honoured by providers whose listing endpoints take a page size.
    pub page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_data_dir().join(DATABASE_FILE),
            http: HttpConfig::default(),
            paging: PagingConfig::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("folio/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self { prefetch_distance: 10 }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            readmanga: ProviderConfig::new("https://www.readmng.com"),
            senmanga: ProviderConfig::new("https://raw.senmanga.com"),
            dm5: ProviderConfig::new("https://www.dm5.com"),
        }
    }
}

impl ProviderConfig {
    fn new(base_url: &str) -> Self {
        Self {
            enabled: true,
            base_url: base_url.to_string(),
            page_size: 30,
        }
    }
}

impl ProvidersConfig {
    pub fn get(&self, id: ProviderId) -> &ProviderConfig {
        match id {
            ProviderId::ReadManga => &self.readmanga,
            ProviderId::SenManga => &self.senmanga,
            ProviderId::Dm5 => &self.dm5,
        }
    }
}

impl Config {
    /// Load defaults, then `path` (or the default config file, if it
    /// exists), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Some(default_config_file()).filter(|path| path.is_file()),
        };
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = &file {
            debug!(path = %file.display(), "loading configuration file");
            figment = merge_file(figment, file)?;
        }
        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load defaults and a single file, ignoring the environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::extract(merge_file(Figment::from(Serialized::defaults(Config::default())), path)?)
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("http.timeout_secs must be greater than zero".to_string()));
        }
        for id in ProviderId::ALL {
            let provider = self.providers.get(id);
            if provider.page_size == 0 {
                exn::bail!(ErrorKind::Invalid(format!("providers.{}.page_size must be greater than zero", id.as_str())));
            }
            if !(provider.base_url.starts_with("http://") || provider.base_url.starts_with("https://")) {
                exn::bail!(ErrorKind::Invalid(format!(
                    "providers.{}.base_url is not an http(s) URL: {}",
                    id.as_str(),
                    provider.base_url
                )));
            }
        }
        Ok(())
    }

    /// Providers switched on, in a stable order.
    pub fn enabled_providers(&self) -> impl Iterator<Item = ProviderId> + '_ {
        ProviderId::ALL.into_iter().filter(|id| self.providers.get(*id).enabled)
    }

    /// Client options for one provider.
    pub fn http_options(&self, id: ProviderId) -> HttpOptions {
        let provider = self.providers.get(id);
        HttpOptions {
            base_url: provider.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(self.http.timeout_secs),
            user_agent: self.http.user_agent.clone(),
            page_size: provider.page_size,
        }
    }
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default().to_ascii_lowercase();
    Ok(match extension.as_str() {
        "toml" => figment.merge(Toml::file_exact(path)),
        "yaml" | "yml" => figment.merge(Yaml::file_exact(path)),
        "json" => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.display().to_string())),
    })
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "folio")
}

fn default_data_dir() -> PathBuf {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf()).unwrap_or_default()
}

/// Where [`Config::load`] looks when no file is given.
pub fn default_config_file() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.paging.prefetch_distance, 10);
        assert_eq!(config.enabled_providers().count(), 3);
        assert_eq!(config.http_options(ProviderId::Dm5).base_url, "https://www.dm5.com");
    }

    #[rstest]
    #[case(".toml", "[http]\ntimeout_secs = 5\n\n[providers.dm5]\nenabled = false\n")]
    #[case(".yaml", "http:\n  timeout_secs: 5\nproviders:\n  dm5:\n    enabled: false\n")]
    #[case(".json", r#"{"http": {"timeout_secs": 5}, "providers": {"dm5": {"enabled": false}}}"#)]
    fn test_file_overrides_defaults(#[case] suffix: &str, #[case] contents: &str) {
        let file = file(suffix, contents);
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http_options(ProviderId::ReadManga).timeout, Duration::from_secs(5));
        assert!(!config.providers.dm5.enabled);
        assert_eq!(config.providers.dm5.base_url, "https://www.dm5.com");
        assert_eq!(
            config.enabled_providers().collect::<Vec<_>>(),
            [ProviderId::ReadManga, ProviderId::SenManga]
        );
    }

    #[rstest]
    #[case("[http]\ntimeout_secs = 0\n")]
    #[case("[providers.senmanga]\npage_size = 0\n")]
    #[case("[providers.readmanga]\nbase_url = \"ftp://example.com\"\n")]
    fn test_invalid_values_rejected(#[case] contents: &str) {
        let file = file(".toml", contents);
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn test_unparseable_file() {
        let file = file(".toml", "[http]\ntimeout_secs = \"soon\"\n");
        let err = Config::from_file(file.path()).unwrap_err();
        assert_eq!(*err, ErrorKind::Load);
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::from_file(Path::new("/nonexistent/folio.toml")).unwrap_err();
        assert_eq!(*err, ErrorKind::Load);
    }

    #[test]
    fn test_unknown_format() {
        let file = file(".ini", "timeout=5");
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(*err, ErrorKind::UnsupportedFormat(_)));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let file = file(".toml", "[providers.readmanga]\nbase_url = \"http://localhost:8080/\"\n");
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.http_options(ProviderId::ReadManga).base_url, "http://localhost:8080");
    }
}
