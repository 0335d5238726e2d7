//! Configuration management for cfmd.
//!
//! Parses `confluence-md.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings are applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `confluence.base_url` and `confluence.api_token` support
//! `${VAR}` and `${VAR:-default}` references. When no token is configured
//! anywhere, [`TOKEN_ENV_VAR`] is consulted.

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "confluence-md.toml";

/// Environment variable holding the API token when none is configured.
pub const TOKEN_ENV_VAR: &str = "CFMD_API_TOKEN";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub api_token: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub image_folder: Option<String>,
    pub download_images: Option<bool>,
    pub include_metadata: Option<bool>,
    pub depth: Option<i32>,
    pub parallel: Option<usize>,
    /// Replaces the configured exclude patterns when non-empty.
    pub exclude: Vec<String>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub confluence: ConfluenceConfig,
    pub output: OutputConfig,
    pub tree: TreeConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Confluence connection settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfluenceConfig {
    /// Instance base URL. Page URLs carry their own base URL, so this is
    /// only needed to override it.
    pub base_url: Option<String>,
    /// Personal access token.
    pub api_token: Option<String>,
}

/// Output settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory, resolved against the config file directory.
    pub dir: PathBuf,
    /// Attachment folder name, relative to each Markdown file.
    pub image_folder: String,
    pub download_images: bool,
    /// Write YAML front matter.
    pub include_metadata: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./output"),
            image_folder: "assets".to_owned(),
            download_images: true,
            include_metadata: true,
        }
    }
}

/// Page tree traversal settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Maximum depth below the root page, `-1` for unlimited.
    pub depth: i32,
    /// Number of pages converted concurrently.
    pub parallel: usize,
    /// Glob patterns matched against page titles.
    pub exclude: Vec<String>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            depth: -1,
            parallel: 3,
            exclude: Vec::new(),
        }
    }
}

impl TreeConfig {
    /// Compile the exclude patterns.
    pub fn exclude_patterns(&self) -> Result<Vec<glob::Pattern>, ConfigError> {
        self.exclude
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|e| {
                    ConfigError::Validation(format!("tree.exclude pattern '{pattern}': {e}"))
                })
            })
            .collect()
    }

    /// Whether pages at `depth` (root is 0) are within the limit.
    pub fn allows_depth(&self, depth: usize) -> bool {
        match usize::try_from(self.depth) {
            Ok(max) => depth <= max,
            Err(_) => true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.api_token`").
        field: String,
        /// Error message (e.g., "${`CFMD_TOKEN`} not set").
        message: String,
    },
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with CLI settings applied on top.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `confluence-md.toml` in the current directory
    /// and its parents, and falls back to defaults.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: &CliSettings,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        config.apply_cli_settings(cli_settings);
        if config.confluence.api_token.is_none() {
            config.confluence.api_token = std::env::var(TOKEN_ENV_VAR)
                .ok()
                .filter(|token| !token.is_empty());
        }
        config.validate()?;

        Ok(config)
    }

    /// Get the API token.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if no token is configured.
    pub fn require_api_token(&self) -> Result<&str, ConfigError> {
        self.confluence
            .api_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "API token required: pass --api-token, set confluence.api_token or {TOKEN_ENV_VAR}"
                ))
            })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base_url) = &self.confluence.base_url {
            require_http_url(base_url, "confluence.base_url")?;
        }
        if self.output.image_folder.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.image_folder cannot be empty".to_owned(),
            ));
        }
        if self.tree.depth < -1 {
            return Err(ConfigError::Validation(
                "tree.depth must be -1 (unlimited) or greater".to_owned(),
            ));
        }
        if self.tree.parallel == 0 {
            return Err(ConfigError::Validation(
                "tree.parallel must be greater than 0".to_owned(),
            ));
        }
        self.tree.exclude_patterns()?;
        Ok(())
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(api_token) = &settings.api_token {
            self.confluence.api_token = Some(api_token.clone());
        }
        if let Some(dir) = &settings.output_dir {
            self.output.dir.clone_from(dir);
        }
        if let Some(image_folder) = &settings.image_folder {
            self.output.image_folder.clone_from(image_folder);
        }
        if let Some(download_images) = settings.download_images {
            self.output.download_images = download_images;
        }
        if let Some(include_metadata) = settings.include_metadata {
            self.output.include_metadata = include_metadata;
        }
        if let Some(depth) = settings.depth {
            self.tree.depth = depth;
        }
        if let Some(parallel) = settings.parallel {
            self.tree.parallel = parallel;
        }
        if !settings.exclude.is_empty() {
            self.tree.exclude.clone_from(&settings.exclude);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        if config.output.dir.is_relative() {
            config.output.dir = config_dir.join(&config.output.dir);
        }
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(base_url) = &self.confluence.base_url {
            self.confluence.base_url = Some(expand::expand_env(base_url, "confluence.base_url")?);
        }
        if let Some(api_token) = &self.confluence.api_token {
            self.confluence.api_token =
                Some(expand::expand_env(api_token, "confluence.api_token")?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.confluence.base_url, None);
        assert_eq!(config.output.dir, PathBuf::from("./output"));
        assert_eq!(config.output.image_folder, "assets");
        assert!(config.output.download_images);
        assert!(config.output.include_metadata);
        assert_eq!(config.tree.depth, -1);
        assert_eq!(config.tree.parallel, 3);
        assert!(config.tree.exclude.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[confluence]
base_url = "https://acme.atlassian.net/wiki"
api_token = "secret"

[output]
dir = "docs"
image_folder = "images"
download_images = false
include_metadata = false

[tree]
depth = 2
parallel = 8
exclude = ["Archive*", "*draft*"]
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(
            config.confluence.base_url.as_deref(),
            Some("https://acme.atlassian.net/wiki")
        );
        assert_eq!(config.confluence.api_token.as_deref(), Some("secret"));
        assert_eq!(config.output.dir, PathBuf::from("docs"));
        assert_eq!(config.output.image_folder, "images");
        assert!(!config.output.download_images);
        assert!(!config.output.include_metadata);
        assert_eq!(config.tree.depth, 2);
        assert_eq!(config.tree.parallel, 8);
        assert_eq!(config.tree.exclude, vec!["Archive*", "*draft*"]);
    }

    #[test]
    fn test_load_resolves_output_dir_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[output]\ndir = \"out\"\n");

        let config = Config::load(Some(&path), &CliSettings::default()).unwrap();

        assert_eq!(config.output.dir, dir.path().join("out"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_keeps_absolute_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("absolute");
        let path = write_config(
            dir.path(),
            &format!("[output]\ndir = {:?}\n", out.display().to_string()),
        );

        let config = Config::load(Some(&path), &CliSettings::default()).unwrap();

        assert_eq!(config.output.dir, out);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let err = Config::load(Some(&missing), &CliSettings::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(path) if path == missing));
    }

    #[test]
    fn test_cli_settings_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[confluence]
api_token = "from-file"

[tree]
depth = 1
exclude = ["Old*"]
"#,
        );
        let settings = CliSettings {
            api_token: Some("from-cli".to_owned()),
            output_dir: Some(PathBuf::from("/tmp/cfmd-out")),
            image_folder: Some("img".to_owned()),
            download_images: Some(false),
            include_metadata: Some(false),
            depth: Some(4),
            parallel: Some(1),
            exclude: vec!["Tmp*".to_owned()],
        };

        let config = Config::load(Some(&path), &settings).unwrap();

        assert_eq!(config.require_api_token().unwrap(), "from-cli");
        assert_eq!(config.output.dir, PathBuf::from("/tmp/cfmd-out"));
        assert_eq!(config.output.image_folder, "img");
        assert!(!config.output.download_images);
        assert!(!config.output.include_metadata);
        assert_eq!(config.tree.depth, 4);
        assert_eq!(config.tree.parallel, 1);
        assert_eq!(config.tree.exclude, vec!["Tmp*"]);
    }

    #[test]
    fn test_env_expansion_in_file() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("CFMD_TEST_CONFIG_TOKEN", "expanded-token");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[confluence]
base_url = "${CFMD_TEST_CONFIG_UNSET_URL:-https://wiki.example.com}"
api_token = "${CFMD_TEST_CONFIG_TOKEN}"
"#,
        );

        let config = Config::load(Some(&path), &CliSettings::default()).unwrap();

        assert_eq!(
            config.confluence.base_url.as_deref(),
            Some("https://wiki.example.com")
        );
        assert_eq!(config.require_api_token().unwrap(), "expanded-token");
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            ("[confluence]\nbase_url = \"wiki.example.com\"\n", "confluence.base_url"),
            ("[output]\nimage_folder = \" \"\n", "output.image_folder"),
            ("[tree]\ndepth = -2\n", "tree.depth"),
            ("[tree]\nparallel = 0\n", "tree.parallel"),
            ("[tree]\nexclude = [\"[unclosed\"]\n", "tree.exclude"),
        ];

        for (toml, field) in cases {
            let dir = tempfile::tempdir().unwrap();
            let path = write_config(dir.path(), toml);

            let err = Config::load(Some(&path), &CliSettings::default()).unwrap_err();
            assert!(
                matches!(&err, ConfigError::Validation(msg) if msg.contains(field)),
                "{field}: {err}"
            );
        }
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[tree\ndepth = 1");

        let err = Config::load(Some(&path), &CliSettings::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_allows_depth() {
        let unlimited = TreeConfig::default();
        assert!(unlimited.allows_depth(100));

        let bounded = TreeConfig {
            depth: 1,
            ..TreeConfig::default()
        };
        assert!(bounded.allows_depth(0));
        assert!(bounded.allows_depth(1));
        assert!(!bounded.allows_depth(2));
    }

    #[test]
    fn test_exclude_patterns_match_titles() {
        let tree = TreeConfig {
            exclude: vec!["Archive*".to_owned()],
            ..TreeConfig::default()
        };

        let patterns = tree.exclude_patterns().unwrap();
        assert!(patterns[0].matches("Archive 2020"));
        assert!(!patterns[0].matches("Current"));
    }

    #[test]
    fn test_require_api_token_missing() {
        let config = Config::default();

        let err = config.require_api_token().unwrap_err();
        assert!(err.to_string().contains(TOKEN_ENV_VAR));
    }
}
