//! CLI error types.

use cfmd_config::ConfigError;
use cfmd_confluence::ConfluenceError;
use cfmd_converter::ConvertError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Confluence(#[from] ConfluenceError),

    #[error("{0}")]
    Convert(#[from] ConvertError),

    #[error("front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error("{0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to load page: {0}")]
    PageLoad(String),

    #[error("{0} page(s) failed to convert")]
    PagesFailed(usize),
}
