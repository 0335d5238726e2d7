//! `cfmd tree` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use rayon::prelude::*;
use tracing::{info, warn};

use cfmd_config::{CliSettings, TreeConfig};
use cfmd_confluence::{ConfluenceClient, ConfluenceError};
use cfmd_converter::Document;

use crate::commands::{CommonArgs, Session};
use crate::error::CliError;
use crate::output::Output;
use crate::writer::{PageExporter, dir_name};

/// Title shown for pages that could not be loaded.
const ERROR_TITLE: &str = "Error loading page";

/// Arguments for the tree command.
#[derive(Args)]
pub(crate) struct TreeArgs {
    /// Confluence URL of the root page.
    url: String,

    /// Maximum depth below the root page, -1 for unlimited [default: -1].
    #[arg(long, allow_negative_numbers = true)]
    depth: Option<i32>,

    /// Number of pages fetched and converted concurrently [default: 3].
    #[arg(long)]
    parallel: Option<usize>,

    /// Glob pattern for page titles to skip, with their children (repeatable).
    #[arg(long)]
    exclude: Vec<String>,

    /// Show the page tree without converting.
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    pub(crate) common: CommonArgs,
}

impl TreeArgs {
    /// Execute the tree command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let settings = CliSettings {
            depth: self.depth,
            parallel: self.parallel,
            exclude: self.exclude.clone(),
            ..self.common.settings()
        };
        let session = Session::open(&self.url, &self.common, &settings)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(session.config.tree.parallel)
            .build()?;
        let builder = TreeBuilder::new(&session.client, &session.config.tree)?;

        if self.dry_run {
            output.dry_run_started();
        }
        let Some(root) = pool.install(|| builder.build(&session.page_id, 0)) else {
            output.root_excluded();
            return Ok(());
        };

        if self.dry_run {
            let stats = root.stats();
            output.tree_preview(&root.display_lines(), stats.total_pages, stats.max_depth);
            return Ok(());
        }

        let out_dir = &session.config.output.dir;
        let exporter = PageExporter::new(
            &session.client,
            session.client.base_url(),
            &session.config.output,
        );
        let jobs = root.jobs(out_dir);
        let results: Vec<_> = pool.install(|| {
            jobs.par_iter()
                .map(|(node, dir)| {
                    node.page
                        .as_ref()
                        .map_err(|e| CliError::PageLoad(e.to_string()))
                        .and_then(|document| exporter.export(document, dir))
                })
                .collect()
        });

        let mut failed = 0;
        for ((node, _), result) in jobs.iter().zip(&results) {
            output.page_result(node.title(), &node.id, result);
            if result.is_err() {
                failed += 1;
            }
        }

        output.tree_summary(results.len() - failed, failed, out_dir);

        if failed > 0 {
            return Err(CliError::PagesFailed(failed));
        }
        Ok(())
    }
}

/// Page fetching used to build the tree.
pub(crate) trait PageSource: Sync {
    fn page(&self, page_id: &str) -> Result<Document, ConfluenceError>;
    fn children(&self, page_id: &str) -> Result<Vec<Document>, ConfluenceError>;
}

impl PageSource for ConfluenceClient {
    fn page(&self, page_id: &str) -> Result<Document, ConfluenceError> {
        self.get_page(page_id)
    }

    fn children(&self, page_id: &str) -> Result<Vec<Document>, ConfluenceError> {
        self.get_child_pages(page_id)
    }
}

/// A page in the fetched tree.
pub(crate) struct PageNode {
    id: String,
    /// Distance from the root page.
    depth: usize,
    page: Result<Document, ConfluenceError>,
    children: Vec<PageNode>,
}

impl PageNode {
    fn title(&self) -> &str {
        self.page.as_ref().map_or(ERROR_TITLE, |doc| doc.title.as_str())
    }

    /// Indented tree listing, one line per page.
    fn display_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.collect_lines(&mut lines);
        lines
    }

    fn collect_lines(&self, lines: &mut Vec<String>) {
        let prefix = if self.depth == 0 {
            String::new()
        } else {
            format!("{}├─ ", "  ".repeat(self.depth - 1))
        };
        match &self.page {
            Ok(doc) => lines.push(format!("{prefix}{}", doc.title)),
            Err(err) => lines.push(format!("{prefix}{ERROR_TITLE} (Error: {err})")),
        }
        for child in &self.children {
            child.collect_lines(lines);
        }
    }

    fn stats(&self) -> TreeStats {
        self.children.iter().map(Self::stats).fold(
            TreeStats {
                total_pages: 1,
                max_depth: self.depth,
            },
            |acc, child| TreeStats {
                total_pages: acc.total_pages + child.total_pages,
                max_depth: acc.max_depth.max(child.max_depth),
            },
        )
    }

    /// Pages in pre-order with the directory each is written to.
    ///
    /// Each page lives in one directory per ancestor title below `out_dir`.
    fn jobs<'a>(&'a self, out_dir: &Path) -> Vec<(&'a PageNode, PathBuf)> {
        let mut jobs = Vec::new();
        self.collect_jobs(out_dir.to_path_buf(), &mut jobs);
        jobs
    }

    fn collect_jobs<'a>(&'a self, dir: PathBuf, jobs: &mut Vec<(&'a PageNode, PathBuf)>) {
        let child_dir = dir.join(dir_name(self.title()));
        jobs.push((self, dir));
        for child in &self.children {
            child.collect_jobs(child_dir.clone(), jobs);
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct TreeStats {
    total_pages: usize,
    max_depth: usize,
}

/// Fetches a page tree honouring depth and exclusion settings.
struct TreeBuilder<'a, S> {
    source: &'a S,
    config: &'a TreeConfig,
    exclude: Vec<glob::Pattern>,
}

impl<'a, S: PageSource> TreeBuilder<'a, S> {
    fn new(source: &'a S, config: &'a TreeConfig) -> Result<Self, CliError> {
        Ok(Self {
            source,
            config,
            exclude: config.exclude_patterns()?,
        })
    }

    /// Fetch `page_id` and its descendants. Children are fetched in parallel
    /// on the current rayon pool.
    ///
    /// Returns `None` when the page is beyond the depth limit or excluded.
    fn build(&self, page_id: &str, depth: usize) -> Option<PageNode> {
        if !self.config.allows_depth(depth) {
            return None;
        }

        let page = match self.source.page(page_id) {
            Ok(page) => page,
            Err(err) => {
                warn!("Failed to load page {}: {}", page_id, err);
                return Some(PageNode {
                    id: page_id.to_owned(),
                    depth,
                    page: Err(err),
                    children: Vec::new(),
                });
            }
        };

        if self.exclude.iter().any(|p| p.matches(&page.title)) {
            info!("Excluding page '{}' and its children", page.title);
            return None;
        }

        let children = if self.config.allows_depth(depth + 1) {
            match self.source.children(page_id) {
                Ok(children) => children
                    .par_iter()
                    .filter_map(|child| self.build(&child.id, depth + 1))
                    .collect(),
                Err(err) => {
                    warn!("Failed to fetch children of '{}': {}", page.title, err);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Some(PageNode {
            id: page_id.to_owned(),
            depth,
            page: Ok(page),
            children,
        })
    }
}
