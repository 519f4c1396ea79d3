//! kb-mirror main entry point
//!
//! This is the command-line interface for the kb-mirror documentation sync tool.

use anyhow::Context;
use clap::Parser;
use kb_mirror::config::{load_config_with_hash, Config};
use kb_mirror::knowledge::{KnowledgeStore, MarkdownStore};
use kb_mirror::Synchronizer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// kb-mirror: keeps a local Markdown knowledge base in sync with a documentation site
///
/// Each run reads the site's sitemap, fetches new and changed pages, converts
/// them to Markdown, and files them by category under the knowledge base
/// directory.
#[derive(Parser, Debug)]
#[command(name = "kb-mirror")]
#[command(version)]
#[command(about = "Mirror a documentation site into a Markdown knowledge base", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be synced without fetching anything
    #[arg(long, conflicts_with_all = ["check", "list", "rebuild_index"])]
    dry_run: bool,

    /// Run change detection only and print the detected changes
    #[arg(long, conflicts_with_all = ["dry_run", "list", "rebuild_index"])]
    check: bool,

    /// List knowledge base entries and exit
    #[arg(long, conflicts_with_all = ["dry_run", "check", "rebuild_index"])]
    list: bool,

    /// Regenerate the knowledge base index and exit
    #[arg(long, conflicts_with_all = ["dry_run", "check", "list"])]
    rebuild_index: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.check {
        handle_check(config).await?;
    } else if cli.list {
        handle_list(&config)?;
    } else if cli.rebuild_index {
        handle_rebuild_index(&config)?;
    } else {
        handle_sync(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kb_mirror=info,warn"),
            1 => EnvFilter::new("kb_mirror=debug,info"),
            2 => EnvFilter::new("kb_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn knowledge_store(config: &Config) -> MarkdownStore {
    MarkdownStore::new(&config.output.knowledge_base_dir)
        .with_category_titles(config.category_titles.clone())
}

/// Handles the --dry-run mode: validates config and shows what would be synced
fn handle_dry_run(config: &Config) {
    println!("=== kb-mirror Dry Run ===\n");

    println!("Fetcher:");
    println!("  Concurrency: {}", config.fetcher.concurrency);
    println!("  Max retries: {}", config.fetcher.max_retries);
    println!("  Base delay: {}ms", config.fetcher.base_delay_ms);
    println!("  Timeout: {}s", config.fetcher.timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nSite:");
    println!("  Sitemap: {}", config.site.sitemap_url);
    if let Some(changelog) = &config.site.changelog_url {
        println!("  Changelog: {}", changelog);
    }
    println!("  Allowed hosts: {}", config.site.allowed_hosts.join(", "));
    println!("  Path prefix: {}", config.site.path_prefix);

    println!("\nSections ({}):", config.site.sections.len());
    for (section, category) in &config.site.sections {
        println!("  - {} -> {}", section, category);
    }

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        match &seed.category {
            Some(category) => println!("  - {} ({})", seed.url, category),
            None => println!("  - {}", seed.url),
        }
    }

    println!("\nOutput:");
    println!("  Knowledge base: {}", config.output.knowledge_base_dir);
    println!("  Registry: {}", config.output.registry_path);
    println!("  Detector state: {}", config.output.state_path);

    println!(
        "\nBoilerplate selectors: {}",
        config.transform_options().boilerplate_len()
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the --check mode: runs change detection and prints the result
async fn handle_check(config: Config) -> anyhow::Result<()> {
    let synchronizer = Synchronizer::new(config)?;
    let detection = synchronizer.detect().await;

    println!("{}", serde_json::to_string_pretty(&detection.result)?);
    if let Some(changelog) = &detection.changelog {
        println!("{}", serde_json::to_string_pretty(changelog)?);
    }

    Ok(())
}

/// Handles the --list mode: prints every stored entry by category
fn handle_list(config: &Config) -> anyhow::Result<()> {
    let store = knowledge_store(config);
    let categories = store.list()?;

    println!("Knowledge base: {}\n", config.output.knowledge_base_dir);
    if categories.is_empty() {
        println!("(empty)");
    }

    for (category, slugs) in &categories {
        println!("{} ({})", category, slugs.len());
        for slug in slugs {
            println!("  - {}", slug);
        }
    }

    Ok(())
}

/// Handles the --rebuild-index mode
fn handle_rebuild_index(config: &Config) -> anyhow::Result<()> {
    knowledge_store(config)
        .update_index()
        .context("Failed to rebuild knowledge base index")?;

    println!("✓ Index rebuilt in {}", config.output.knowledge_base_dir);
    Ok(())
}

/// Handles the main sync operation
async fn handle_sync(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Syncing {} into {}",
        config.site.sitemap_url,
        config.output.knowledge_base_dir
    );

    let synchronizer = Synchronizer::new(config)?;
    let report = synchronizer.run().await.context("Sync failed")?;

    println!("{}", report.to_markdown());

    if !report.is_clean() {
        tracing::warn!("{} URLs could not be synced", report.failed.len());
    }

    Ok(())
}
