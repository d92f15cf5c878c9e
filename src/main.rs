use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use block_probe::{search, SuspectRange};
use clap::Parser;
use colored::Colorize;

#[derive(Parser)]
#[command(name = "block-probe")]
#[command(about = "Localizes unclosed or mismatched block syntax in Ruby sources", long_about = None)]
#[command(version)]
struct Cli {
    /// Ruby source file to probe
    file: PathBuf,

    /// Emit machine-readable JSON instead of the annotated listing
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "block_probe=debug".into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let source = fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;

    let ranges = search(&source)
        .with_context(|| format!("search failed on {}", cli.file.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&ranges)?);
    } else {
        report(&cli.file, &source, &ranges);
    }

    if ranges.is_empty() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

/// Annotated listing: suspect lines highlighted, a little context
/// around each range dimmed.
fn report(file: &Path, source: &str, ranges: &[SuspectRange]) {
    if ranges.is_empty() {
        println!("{} {}: no block syntax problems found", "✓".green(), file.display());
        return;
    }

    println!(
        "{} {}: {} suspect {}",
        "✗".red(),
        file.display(),
        ranges.len(),
        if ranges.len() == 1 { "region" } else { "regions" }
    );
    println!();

    let lines: Vec<&str> = source.lines().collect();
    let width = lines.len().to_string().len();

    for range in ranges {
        let context_start = (range.start as usize).saturating_sub(3).max(1);
        let context_end = (range.end as usize + 2).min(lines.len());

        for number in context_start..=context_end {
            let text = lines.get(number - 1).copied().unwrap_or("");
            let suspect = range.start as usize <= number && number <= range.end as usize;
            if suspect {
                println!("{} {:>width$}  {}", "❯".red(), number, text.red().bold());
            } else {
                println!(
                    "{}",
                    format!("  {:>width$}  {}", number, text).dimmed()
                );
            }
        }
        println!();
    }

    println!(
        "Removing the highlighted {} makes the rest of the file parse.",
        if ranges.len() == 1 { "region" } else { "regions" }
    );
}
