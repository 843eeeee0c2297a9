//! CLI administration tool for link-rotator.
//!
//! Read-only inspection of the slug store without going through HTTP.
//!
//! # Usage
//!
//! ```bash
//! # List all slugs with counters
//! cargo run --bin admin -- slugs list
//!
//! # Show one slug with its destinations
//! cargo run --bin admin -- slugs show docs
//!
//! # Check KV connectivity
//! cargo run --bin admin -- kv ping
//! ```
//!
//! # Environment Variables
//!
//! Uses the same variables as the server (see `link_rotator::config`).
//! Without any KV settings the in-memory backend is selected, which is
//! always empty for a fresh process.

use link_rotator::config::{self, KvBackend};
use link_rotator::domain::entities::{SlugDetails, SlugSummary};
use link_rotator::domain::repositories::SlugRepository;
use link_rotator::server::build_repository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;

/// CLI tool for inspecting link-rotator storage.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect slugs
    Slugs {
        #[command(subcommand)]
        action: SlugAction,
    },

    /// KV backend operations
    Kv {
        #[command(subcommand)]
        action: KvAction,
    },
}

/// Slug inspection subcommands.
#[derive(Subcommand)]
enum SlugAction {
    /// List all slugs
    List,

    /// Show a slug with its destinations and counters
    Show {
        /// Slug to show (case-insensitive)
        slug: String,
    },
}

/// KV diagnostic subcommands.
#[derive(Subcommand)]
enum KvAction {
    /// Check KV connectivity
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    if config.kv_backend == KvBackend::Memory {
        println!(
            "{}",
            "⚠️  No KV backend configured, using an empty in-memory store".yellow()
        );
        println!();
    }

    let repo = build_repository(&config)
        .await
        .context("Failed to initialize KV backend")?;

    match cli.command {
        Commands::Slugs { action } => match action {
            SlugAction::List => list_slugs(repo.as_ref()).await?,
            SlugAction::Show { slug } => show_slug(repo.as_ref(), &slug).await?,
        },
        Commands::Kv { action } => match action {
            KvAction::Ping => ping(repo.as_ref(), config.kv_backend).await?,
        },
    }

    Ok(())
}

/// Lists all slugs with status and counters.
///
/// # Output Format
///
/// ```text
/// 📋 Slugs
///
///   Slug                 Status     Dest   Clicks     Hits       Created
///   ──────────────────────────────────────────────────────────────────────────
///   docs                 ENABLED    2/3    120        341        2024-01-15 10:30
///   promo                DISABLED   1/1    0          12         2024-01-16 14:20
/// ```
async fn list_slugs(repo: &dyn SlugRepository) -> Result<()> {
    println!("{}", "📋 Slugs".bright_blue().bold());
    println!();

    let slugs = repo.list_slugs().await.context("Failed to list slugs")?;

    if slugs.is_empty() {
        println!("{}", "  No slugs found".yellow());
        return Ok(());
    }

    println!(
        "  {:<20} {:<10} {:<6} {:<10} {:<10} {}",
        "Slug".bright_white().bold(),
        "Status".bright_white().bold(),
        "Dest".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Hits".bright_white().bold(),
        "Created".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for summary in &slugs {
        print_summary_row(summary);
    }

    println!();
    println!("  Total: {}", slugs.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

fn print_summary_row(summary: &SlugSummary) {
    let status = if summary.enabled {
        "ENABLED".green()
    } else {
        "DISABLED".red()
    };
    let destinations = format!(
        "{}/{}",
        summary.enabled_destination_count, summary.destination_count
    );

    println!(
        "  {:<20} {:<10} {:<6} {:<10} {:<10} {}",
        summary.slug.cyan(),
        status,
        destinations,
        summary.total_click_count,
        summary.raw_hit_count,
        summary
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
}

/// Shows one slug in detail.
async fn show_slug(repo: &dyn SlugRepository, slug: &str) -> Result<()> {
    let details = repo
        .get_slug_details(slug)
        .await
        .context("Failed to load slug")?
        .with_context(|| format!("Slug '{slug}' not found"))?;

    print_details(&details);
    Ok(())
}

fn print_details(details: &SlugDetails) {
    let status = if details.enabled {
        "ENABLED".green()
    } else {
        "DISABLED".red()
    };

    println!("{} {}", "🔗".bright_blue(), details.slug.cyan().bold());
    println!();
    println!("  Status:       {status}");
    println!(
        "  Created:      {}",
        details.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  Valid clicks: {}",
        details.total_click_count.to_string().bright_green().bold()
    );
    println!(
        "  Raw hits:     {}",
        details.raw_hit_count.to_string().bright_green()
    );
    println!("  Cursor:       {}", details.round_robin_cursor);
    println!();

    if details.destinations.is_empty() {
        println!("{}", "  No destinations".yellow());
        return;
    }

    println!("{}", "  Destinations:".bright_white().bold());
    for entry in &details.destinations {
        let d = &entry.destination;
        let marker = if d.enabled { "●".green() } else { "○".red() };
        println!(
            "  {} {} {} ({} clicks)",
            marker,
            d.name.bright_white(),
            d.id.bright_black(),
            entry.click_count
        );
        for url in &d.urls {
            println!("      {}", url.cyan());
        }
    }
    println!();
}

/// Pings the configured KV backend.
async fn ping(repo: &dyn SlugRepository, backend: KvBackend) -> Result<()> {
    println!(
        "{}",
        format!("🔍 Checking {backend} KV connection...").bright_blue()
    );

    if repo.ping().await {
        println!("{}", "✅ KV connection OK".green().bold());
        Ok(())
    } else {
        anyhow::bail!("KV ping failed")
    }
}
