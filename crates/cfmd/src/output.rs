//! Console reporting for exports.
//!
//! Progress and results go to stderr. Only converted Markdown is written
//! to stdout, so `cfmd convert page.xml > page.md` stays clean.

use std::path::Path;

use console::{Style, Term};

use crate::error::CliError;
use crate::writer::ExportedPage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Plain,
    Good,
    Warn,
    Bad,
    Heading,
}

type Lines = Vec<(Tone, String)>;

/// Export reporter.
pub(crate) struct Output {
    term: Term,
    stdout: Term,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            stdout: Term::stdout(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    /// Report the outcome of exporting one page.
    pub(crate) fn page_result(
        &self,
        title: &str,
        page_id: &str,
        result: &Result<ExportedPage, CliError>,
    ) {
        self.emit(page_result_lines(title, page_id, result));
    }

    /// Announce a dry run before the tree is fetched.
    pub(crate) fn dry_run_started(&self) {
        self.emit(vec![(Tone::Heading, "🔍 Dry run mode - analyzing page tree...".to_owned())]);
    }

    /// Report that exclusion patterns matched the root page.
    pub(crate) fn root_excluded(&self) {
        self.emit(vec![(Tone::Warn, "Root page is excluded, nothing to do.".to_owned())]);
    }

    /// Print the dry-run tree listing and its statistics.
    pub(crate) fn tree_preview(&self, lines: &[String], total_pages: usize, max_depth: usize) {
        self.emit(tree_preview_lines(lines, total_pages, max_depth));
    }

    /// Print the closing summary of a tree export.
    pub(crate) fn tree_summary(&self, succeeded: usize, failed: usize, out_dir: &Path) {
        self.emit(tree_summary_lines(succeeded, failed, out_dir));
    }

    /// Report a local file conversion.
    pub(crate) fn file_converted(&self, from: &Path, to: &Path) {
        self.emit(vec![(
            Tone::Good,
            format!("✅ Converted {} -> {}", from.display(), to.display()),
        )]);
    }

    /// Report the error that ended the run.
    pub(crate) fn fatal(&self, err: &CliError) {
        self.emit(vec![(Tone::Bad, format!("Error: {err}"))]);
    }

    /// Write converted Markdown to stdout.
    pub(crate) fn markdown(&self, text: &str) -> std::io::Result<()> {
        self.stdout.write_line(text)
    }

    fn emit(&self, lines: Lines) {
        for (tone, line) in lines {
            let styled = match tone {
                Tone::Plain => line,
                Tone::Good => self.green.apply_to(line).to_string(),
                Tone::Warn => self.yellow.apply_to(line).to_string(),
                Tone::Bad => self.red.apply_to(line).to_string(),
                Tone::Heading => self.cyan_bold.apply_to(line).to_string(),
            };
            let _ = self.term.write_line(&styled);
        }
    }
}

fn page_result_lines(
    title: &str,
    page_id: &str,
    result: &Result<ExportedPage, CliError>,
) -> Lines {
    let mut lines = Vec::new();
    match result {
        Ok(page) => {
            lines.push((
                Tone::Good,
                format!("✅ Successfully converted page: {}", page.path.display()),
            ));
            lines.push((Tone::Plain, format!("   Page ID: {page_id}")));
            lines.push((Tone::Plain, format!("   Title: {title}")));
            let downloaded = page.images.iter().filter(|i| i.size.is_some()).count();
            if downloaded > 0 {
                lines.push((Tone::Plain, format!("   📥 Images downloaded: {downloaded}")));
            }
        }
        Err(err) => {
            lines.push((Tone::Bad, format!("❌ Failed to convert page: {title}")));
            lines.push((Tone::Plain, format!("   Error: {err}")));
        }
    }
    lines.push((Tone::Plain, String::new()));
    lines
}

fn tree_preview_lines(tree: &[String], total_pages: usize, max_depth: usize) -> Lines {
    let mut lines = vec![(Tone::Plain, "\n📊 Page tree structure:".to_owned())];
    lines.extend(tree.iter().map(|line| (Tone::Plain, line.clone())));
    lines.push((Tone::Plain, "\n📈 Statistics:".to_owned()));
    lines.push((Tone::Plain, format!("  Total pages: {total_pages}")));
    lines.push((Tone::Plain, format!("  Max depth: {max_depth}")));
    lines
}

fn tree_summary_lines(succeeded: usize, failed: usize, out_dir: &Path) -> Lines {
    let mut lines = vec![
        (Tone::Good, "✅ Conversion complete!".to_owned()),
        (Tone::Plain, format!("  Successful: {succeeded} pages")),
    ];
    if failed > 0 {
        lines.push((Tone::Warn, format!("  Failed: {failed} pages")));
    }
    lines.push((Tone::Plain, format!("  Output: {}", out_dir.display())));
    lines
}
