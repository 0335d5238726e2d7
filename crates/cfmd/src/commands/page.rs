//! `cfmd page` command implementation.

use clap::Args;

use crate::commands::{CommonArgs, Session};
use crate::error::CliError;
use crate::output::Output;
use crate::writer::PageExporter;

/// Arguments for the page command.
#[derive(Args)]
pub(crate) struct PageArgs {
    /// Confluence page URL.
    url: String,

    #[command(flatten)]
    pub(crate) common: CommonArgs,
}

impl PageArgs {
    /// Execute the page command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let session = Session::open(&self.url, &self.common, &self.common.settings())?;

        let document = session.client.get_page(&session.page_id)?;
        let exporter = PageExporter::new(
            &session.client,
            session.client.base_url(),
            &session.config.output,
        );
        let result = exporter.export(&document, &session.config.output.dir);
        output.page_result(&document.title, &document.id, &result);

        result.map(|_| ()).map_err(|_| CliError::PagesFailed(1))
    }
}
