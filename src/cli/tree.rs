//! `tree` - display the import tree of entry stylesheets.
//!
//! Runs the same bundling as `bundle` but prints what was resolved instead
//! of writing output.
//!
//! # Output Formats
//!
//! ## Tree Format (default)
//! ```text
//! src/main.scss
//! ├── src/_variables.scss
//! ├── src/components/_button.scss
//! │   ├── src/_variables.scss
//! │   └── src/mixins/focus.scss (not found)
//! └── src/_variables.scss (deduped)
//! ```
//!
//! ## Text Format
//! Two-space indentation, no colours; handy for diffs.
//!
//! ## JSON Format
//! The node records (path, found, flags, imports) without bundled content.
//!
//! Paths under the run's root directory are shown relative to it.

use super::{CliContext, SourceArgs, run_batch};
use crate::bundler::{BundleNode, Bundler};
use crate::utils::fs::current_dir;
use crate::utils::progress::ProgressBar;
use anyhow::{Result, anyhow};
use clap::Args;
use colored::Colorize;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

#[derive(Args, Debug)]
pub struct TreeCommand {
    #[command(flatten)]
    source: SourceArgs,

    /// Output format (tree, json, text)
    #[arg(short = 'f', long, default_value = "tree")]
    format: String,

    /// Maximum import depth to display (unlimited if not specified)
    ///
    /// `--depth 1` shows only the direct imports of each entry.
    #[arg(short = 'd', long)]
    depth: Option<usize>,
}

impl TreeCommand {
    /// Bundles the entries in memory and prints their import trees.
    ///
    /// # Errors
    ///
    /// Fails on invalid arguments, configuration errors, dedupe-glob
    /// expansion failure or a timeout. Missing entries are shown, not fatal.
    pub async fn execute(self, context: &CliContext) -> Result<()> {
        self.validate_arguments()?;

        let cwd = current_dir()?;
        let config = context.load_config(self.source.to_config(&cwd), &cwd)?;
        let options = config.into_options(&cwd)?;
        let root = options.root.clone();
        let bundler = Bundler::new(options);

        let progress = ProgressBar::new(config.entries.len() as u64, context.no_progress);
        progress.set_message("Resolving");
        let nodes = run_batch(bundler, &config, &progress).await?;
        progress.finish_and_clear();
        debug!("Resolved {} node(s)", nodes.iter().map(BundleNode::node_count).sum::<usize>());

        let rendered = match self.format.as_str() {
            "json" => self.render_json(&nodes)?,
            "text" => self.render_text(&nodes, &root),
            _ => self.render_tree(&nodes, &root),
        };
        print!("{rendered}");
        Ok(())
    }

    fn validate_arguments(&self) -> Result<()> {
        match self.format.as_str() {
            "tree" | "json" | "text" => {}
            _ => {
                return Err(anyhow!(
                    "Invalid format '{}'. Valid formats are: tree, json, text",
                    self.format
                ));
            }
        }

        if self.depth == Some(0) {
            return Err(anyhow!("Depth must be at least 1"));
        }

        Ok(())
    }

    fn render_tree(&self, nodes: &[BundleNode], root: &Path) -> String {
        let mut out = String::new();

        for entry in nodes {
            let name = display_path(&entry.path, root);
            let header = if entry.found {
                name.cyan().bold().to_string()
            } else {
                format!("{} {}", name.red().bold(), "(not found)".red())
            };
            let _ = writeln!(out, "{header}");

            for (i, child) in entry.imports.iter().enumerate() {
                let is_last = i == entry.imports.len() - 1;
                self.write_tree_node(&mut out, child, root, "", is_last, 0);
            }
        }

        out
    }

    fn write_tree_node(
        &self,
        out: &mut String,
        node: &BundleNode,
        root: &Path,
        prefix: &str,
        is_last: bool,
        current_depth: usize,
    ) {
        if self.depth.is_some_and(|max| current_depth >= max) {
            return;
        }

        let connector = if is_last { "└── " } else { "├── " };
        let name = display_path(&node.path, root);
        let label = if node.cyclic {
            format!("{} {}", name.yellow(), "(circular)".yellow())
        } else if !node.found {
            format!("{} {}", name.red(), "(not found)".red())
        } else if node.deduped {
            format!("{} {}", name.bright_black(), "(deduped)".bright_black())
        } else {
            name.to_string()
        };
        let _ = writeln!(out, "{prefix}{connector}{label}");

        let child_prefix = if is_last { format!("{prefix}    ") } else { format!("{prefix}│   ") };
        for (i, child) in node.imports.iter().enumerate() {
            let is_last_child = i == node.imports.len() - 1;
            self.write_tree_node(out, child, root, &child_prefix, is_last_child, current_depth + 1);
        }
    }

    fn render_text(&self, nodes: &[BundleNode], root: &Path) -> String {
        let mut out = String::new();

        for entry in nodes {
            let _ = writeln!(out, "{}{}", display_path(&entry.path, root), status_suffix(entry));
            for child in &entry.imports {
                self.write_text_node(&mut out, child, root, 1);
            }
        }

        out
    }

    fn write_text_node(&self, out: &mut String, node: &BundleNode, root: &Path, indent: usize) {
        if self.depth.is_some_and(|max| indent > max) {
            return;
        }

        let _ = writeln!(
            out,
            "{}{}{}",
            "  ".repeat(indent),
            display_path(&node.path, root),
            status_suffix(node)
        );
        for child in &node.imports {
            self.write_text_node(out, child, root, indent + 1);
        }
    }

    fn render_json(&self, nodes: &[BundleNode]) -> Result<String> {
        // Entries sit at depth 0, so an import limit of N keeps N levels below them.
        let limited: Vec<BundleNode> =
            nodes.iter().map(|node| limit_depth(node, self.depth.map(|d| d + 1))).collect();
        let json = serde_json::json!({ "entries": limited });
        Ok(format!("{}\n", serde_json::to_string_pretty(&json)?))
    }
}

fn status_suffix(node: &BundleNode) -> &'static str {
    if node.cyclic {
        " (circular)"
    } else if !node.found {
        " (not found)"
    } else if node.deduped {
        " (deduped)"
    } else {
        ""
    }
}

fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

/// Copy of `node` without imports deeper than `levels` below it.
fn limit_depth(node: &BundleNode, levels: Option<usize>) -> BundleNode {
    let imports = match levels {
        Some(0) | Some(1) => Vec::new(),
        _ => node.imports.iter().map(|child| limit_depth(child, levels.map(|l| l - 1))).collect(),
    };
    BundleNode {
        imports,
        ..node.clone()
    }
}
