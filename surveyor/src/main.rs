use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use commands::command_argument_builder;
use std::fs;
use std::path::PathBuf;
use surveyor_core::config::{load_credentials, load_link_rules};
use surveyor_core::crawl::{CrawlOptions, execute_crawl};
use surveyor_core::print_banner;
use surveyor_core::report::generate_scan_report;
use surveyor_scanner::config::CrawlLimits;
use tracing_subscriber::EnvFilter;
use url::Url;

mod commands;

#[tokio::main]
async fn main() {
    // Logs go to stderr so the report and any piped JSON stay clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = command_argument_builder().get_matches();
    let quiet = matches.get_flag("quiet");

    if !quiet {
        print_banner();
    }

    if let Err(e) = run(&matches, quiet).await {
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

async fn run(matches: &ArgMatches, quiet: bool) -> Result<()> {
    let url = matches
        .get_one::<Url>("URL")
        .expect("clap enforces the URL argument");

    let limits = CrawlLimits {
        max_pages: *matches.get_one::<usize>("max-pages").unwrap(),
        timeout_ms: *matches.get_one::<u64>("timeout-ms").unwrap(),
    };

    let credentials = load_credentials(&expanded_path(matches, "credentials"))?;
    let rules = load_link_rules(&expanded_path(matches, "rules"))?;
    let output = expanded_path(matches, "output");
    tracing::debug!(
        "Crawling {} (login configured: {}, rule filtering: {})",
        url,
        credentials.usable(),
        rules.is_active()
    );

    let model = execute_crawl(CrawlOptions {
        start_url: url.to_string(),
        limits,
        credentials,
        rules,
        show_progress: !quiet,
    })
    .await?;

    let json = serde_json::to_string_pretty(&model).context("Failed to serialize site model")?;
    fs::write(&output, json)
        .with_context(|| format!("Failed to write site model to {}", output.display()))?;

    if !quiet {
        println!("{}", generate_scan_report(&model));
    }
    println!(
        "{} {} pages, site model saved to {}",
        "Scan complete:".green().bold(),
        model.len(),
        output.display()
    );

    Ok(())
}

fn expanded_path(matches: &ArgMatches, name: &str) -> PathBuf {
    let raw = matches
        .get_one::<String>(name)
        .expect("argument has a default value");
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}
