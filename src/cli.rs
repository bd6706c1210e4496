// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
//   check   - walk the docs starting from some seed files and check every link
//   extract - print what the extractor sees in a single file (for debugging)
//
// Every setting can also come from .mdx-link-guardian.toml (see config.rs) or
// from an MDX_LINK_GUARDIAN_* environment variable; the command line wins.
// =============================================================================

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::checker::ProbeMethod;

#[derive(Parser, Debug)]
#[command(
    name = "mdx-link-guardian",
    version,
    about = "Checks internal, anchor, external and Storybook links in Markdown/MDX docs",
    long_about = "mdx-link-guardian walks your Markdown and MDX docs starting from a set of files, \
                  follows internal links into the files they point at, and reports every broken \
                  file, anchor, external URL and Storybook link. Made for CI."
)]
pub struct Cli {
    /// Print every file and link as it is checked
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final report
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check links, starting from the given files
    ///
    /// Example: mdx-link-guardian check docs intro.mdx guides/setup.md
    Check {
        /// Base directory the files are relative to
        dir: PathBuf,

        /// Seed files, relative to DIR. Defaults to every .md/.mdx file under DIR
        files: Vec<PathBuf>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        settings: Settings,
    },

    /// Show the links and anchors found in one file
    ///
    /// Example: mdx-link-guardian extract docs/intro.mdx
    Extract {
        file: PathBuf,

        /// Directory to load .mdx-link-guardian.toml from
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        #[command(flatten)]
        settings: Settings,
    },
}

/// Settings shared by both subcommands. `None` means "use the config file".
#[derive(Args, Debug, Default, Clone)]
pub struct Settings {
    /// Glob for links to skip, e.g. "https://localhost*" or "{./drafts/*,*.pdf}"
    #[arg(long, env = "MDX_LINK_GUARDIAN_IGNORE")]
    pub ignore: Option<String>,

    /// Storybook base URL; turns on Storybook link checks
    #[arg(long, env = "MDX_LINK_GUARDIAN_CATALOG_URL")]
    pub catalog_url: Option<String>,

    /// Seconds to wait for each external request
    #[arg(long)]
    pub timeout: Option<u64>,

    /// HTTP method used to probe external links
    #[arg(long, value_enum)]
    pub method: Option<ProbeMethod>,

    /// File name appended to links that end in '/'
    #[arg(long)]
    pub index_file: Option<String>,

    /// Extra file extension to scan for links (repeatable). Parse errors in
    /// these files are tolerated
    #[arg(long = "ext")]
    pub extra_extensions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "mdx-link-guardian",
            "check",
            "docs",
            "a.md",
            "b.mdx",
            "--ignore",
            "./drafts/*",
            "--method",
            "get",
            "--ext",
            "txt",
        ])
        .unwrap();

        match cli.command {
            Commands::Check { dir, files, json, settings } => {
                assert_eq!(dir, PathBuf::from("docs"));
                assert_eq!(files, vec![PathBuf::from("a.md"), PathBuf::from("b.mdx")]);
                assert!(!json);
                assert_eq!(settings.ignore.as_deref(), Some("./drafts/*"));
                assert_eq!(settings.method, Some(ProbeMethod::Get));
                assert_eq!(settings.extra_extensions, vec!["txt"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
