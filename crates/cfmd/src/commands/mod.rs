//! CLI command implementations.

mod convert;
mod page;
mod tree;

use std::path::PathBuf;

use clap::Args;

use cfmd_config::{CliSettings, Config};
use cfmd_confluence::{ConfluenceClient, ConfluenceError, PageUrl};

use crate::error::CliError;

pub(crate) use convert::ConvertArgs;
pub(crate) use page::PageArgs;
pub(crate) use tree::TreeArgs;

/// Options shared by commands that talk to Confluence.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Confluence API token (falls back to confluence.api_token, then CFMD_API_TOKEN).
    #[arg(short = 't', long)]
    api_token: Option<String>,

    /// Output directory [default: ./output].
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Folder for downloaded images, relative to each Markdown file [default: assets].
    #[arg(long)]
    image_folder: Option<String>,

    /// Download attachment images [default: true].
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    download_images: Option<bool>,

    /// Write YAML front matter [default: true].
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    include_metadata: Option<bool>,

    /// Path to configuration file (default: auto-discover confluence-md.toml).
    #[arg(short, long, env = "CFMD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output (show INFO logs).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl CommonArgs {
    pub(crate) fn settings(&self) -> CliSettings {
        CliSettings {
            api_token: self.api_token.clone(),
            output_dir: self.output.clone(),
            image_folder: self.image_folder.clone(),
            download_images: self.download_images,
            include_metadata: self.include_metadata,
            ..CliSettings::default()
        }
    }
}

/// Loaded configuration and a client for the page's instance.
struct Session {
    config: Config,
    client: ConfluenceClient,
    /// Page the command starts from.
    page_id: String,
}

impl Session {
    /// Parse `url`, load the configuration and resolve the page ID.
    fn open(url: &str, common: &CommonArgs, settings: &CliSettings) -> Result<Self, CliError> {
        let page_url = PageUrl::parse(url)?;
        let config = Config::load(common.config.as_deref(), settings)?;
        let token = config.require_api_token()?;
        let base_url = config
            .confluence
            .base_url
            .as_deref()
            .unwrap_or(&page_url.base_url);
        let client = ConfluenceClient::new(base_url, token);

        let page_id = match page_url {
            PageUrl {
                page_id: Some(id), ..
            } => id,
            PageUrl {
                space_key: Some(space_key),
                title: Some(title),
                ..
            } => client.find_page_id(&space_key, &title)?,
            _ => return Err(ConfluenceError::InvalidUrl(url.to_owned()).into()),
        };

        Ok(Self {
            config,
            client,
            page_id,
        })
    }
}
