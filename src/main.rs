// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Load settings (.mdx-link-guardian.toml + flags)
// 3. Parse the seed documents into the cache, then walk and check every link
// 4. Print the report
// 5. Exit with proper code (0 = success, 1 = broken links, 2 = error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker;  // src/checker/ - HTTP and Storybook checks
mod cli;      // src/cli.rs - command-line parsing
mod config;   // src/config.rs - config file + flag merging
mod crawl;    // src/crawl/ - document cache and the link walker
mod discover; // src/discover.rs - finding docs when no files are given
mod error;    // src/error.rs - typed errors
mod extract;  // src/extract/ - pulling links and anchors out of documents
mod logging;  // src/logging.rs - env_logger setup
mod report;   // src/report.rs - what a run produces

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::Parser;
use log::debug;

use checker::{HttpProbe, StorybookCatalog};
use cli::{Cli, Commands, Settings};
use config::Config;
use crawl::DocumentCache;
use report::Report;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no broken links
//   Ok(1) = broken links found
//   Err   = the run could not complete (unparseable doc, bad config, ...)
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Check { dir, files, json, settings } => handle_check(&dir, files, json, &settings).await,
        Commands::Extract { file, dir, settings } => handle_extract(&file, &dir, &settings),
    }
}

// Handles the 'check' subcommand
async fn handle_check(dir: &Path, files: Vec<PathBuf>, json: bool, settings: &Settings) -> Result<i32> {
    let config = Config::load(dir, settings)?;

    let seeds = if files.is_empty() {
        discover::find_documents(dir, &config.extract)
    } else {
        files
    };

    if seeds.is_empty() {
        if !json {
            println!("⚠️  No Markdown/MDX files found in {}", dir.display());
        }
        return Ok(0);
    }

    if !json {
        println!("🔍 Checking links from {} document(s) in {}", seeds.len(), dir.display());
    }

    let mut cache = DocumentCache::from_seeds(dir, &seeds, config.extract.clone())?;
    if cache.is_empty() {
        if !json {
            println!("⚠️  None of the given files is a Markdown/MDX document");
        }
        return Ok(0);
    }

    let ignore = config.ignore.as_deref().map(crawl::compile_ignore).transpose()?;
    let probe = HttpProbe::new(config.timeout, config.method)?;
    let catalog = config
        .catalog_url
        .as_deref()
        .map(|url| StorybookCatalog::new(url, config.timeout))
        .transpose()?;

    let report = crawl::validate(&mut cache, ignore.as_ref(), &probe, catalog.as_ref()).await?;
    debug!("cached {} document(s), {} parsed", cache.len(), cache.extractions());

    print_report(&report, json)?;

    Ok(if report.is_clean() { 0 } else { 1 })
}

// Handles the 'extract' subcommand: dump what one file contains as JSON
fn handle_extract(file: &Path, dir: &Path, settings: &Settings) -> Result<i32> {
    let config = Config::load(dir, settings)?;
    let absolute = extract::paths::absolutize(file);

    let kind = config
        .extract
        .kind_of(&absolute)
        .ok_or_else(|| anyhow!("{} is not a Markdown/MDX document", file.display()))?;

    let text = crawl::read_lossy(&absolute)?;

    let found = extract::extract(&text, &absolute, kind, &config.extract)?;
    println!("{}", serde_json::to_string_pretty(&found)?);

    Ok(0)
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_table(report);
    }
    Ok(())
}

// Prints the outcomes grouped per document, then a summary
fn print_table(report: &Report) {
    let mut current: Option<&Path> = None;

    for outcome in &report.outcomes {
        if current != Some(outcome.document.as_path()) {
            println!("\nFILE: {}", outcome.document.display());
            current = Some(outcome.document.as_path());
        }

        match (&outcome.failure, &outcome.message) {
            (None, _) => println!("   ✅ {}", outcome.link),
            (Some(_), Some(message)) => println!("   ❌ {}  ({})", outcome.link, message),
            (Some(kind), None) => println!("   ❌ {}  ({:?})", outcome.link, kind),
        }
    }

    println!();

    let broken_count = report.failures().count();
    let ok_count = report.outcomes.len() - broken_count;

    println!("📊 Summary:");
    println!("   📄 Documents: {}", report.documents);
    println!("   ✅ OK: {}", ok_count);
    println!("   ❌ Broken: {}", broken_count);

    if !report.is_clean() {
        let mut files: Vec<&Path> = Vec::new();
        for path in &report.errors {
            if !files.contains(&path.as_path()) {
                files.push(path.as_path());
            }
        }

        println!("\nFiles with broken links:");
        for file in files {
            println!("   {}", file.display());
        }
    }
}
