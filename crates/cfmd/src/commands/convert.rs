//! `cfmd convert` command implementation.

use std::path::PathBuf;

use clap::Args;

use cfmd_converter::{ConvertOptions, Converter, DEFAULT_IMAGE_FOLDER};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Storage format file to convert.
    file: PathBuf,

    /// Output Markdown file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Folder that image links point into.
    #[arg(long, default_value = DEFAULT_IMAGE_FOLDER)]
    image_folder: String,

    /// Enable verbose output (show INFO logs).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ConvertArgs {
    /// Execute the convert command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let markup = std::fs::read_to_string(&self.file)?;

        let converter = Converter::new(ConvertOptions {
            image_folder: self.image_folder,
        });
        let markdown = converter.convert_html(&markup);

        match &self.output {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, format!("{markdown}\n"))?;
                output.file_converted(&self.file, path);
            }
            None => output.markdown(&markdown)?,
        }
        Ok(())
    }
}
