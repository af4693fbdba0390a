use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use corpusstore::cli::{Cli, Command};
use corpusstore::config::CorpusConfig;
use corpusstore::{Corpus, Limit, SearchRequest, SearchResult, SiteSet, Strategy};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

fn print_result(result: &SearchResult) {
    for line in &result.matches {
        println!("{}", line);
    }
    let summary = format!("{} matches", result.match_count());
    if result.truncated {
        eprintln!("{} {}", summary.yellow(), "(limit reached)".dimmed());
    } else {
        eprintln!("{}", summary.green());
    }
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let mut config = CorpusConfig::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(path) = cli.corpus {
        config.path = path;
    }

    info!("corpusstore starting");

    let corpus = Corpus::load(&config.path);
    if !corpus.is_ready() {
        return Err(eyre::eyre!("Corpus unavailable: {}", config.path.display()));
    }

    let request = match cli.command {
        Command::Stats => {
            let stats = corpus.stats();
            println!("Corpus: {}", config.path.display().to_string().cyan());
            println!("  Lines: {}", stats.line_count);
            println!("  Total bytes: {}", stats.total_bytes);
            println!("  Sites configured: {}", config.sites.len());
            return Ok(());
        }
        Command::Filter { site, limit } => SearchRequest::new(Strategy::SiteName(site), Limit::at_most(limit)),
        Command::Common { site, limit } => {
            let sites = SiteSet::new(config.sites.iter().chain(site.iter())).context("No sites to filter for")?;
            SearchRequest::new(Strategy::CommonSites(Arc::new(sites)), Limit::at_most(limit))
        }
        Command::Search { term, limit } => SearchRequest::new(Strategy::FreeText(term), Limit::at_most(limit)),
    };

    let result = corpusstore::execute(&corpus, &request)?;
    print_result(&result);

    Ok(())
}
