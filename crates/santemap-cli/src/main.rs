use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod config;

use config::{load_config, AppConfig};
use santemap_assistant::{AssistantGateway, Transcript};
use santemap_directory::filter::{
    apply_filters, FilterState, LanguageFilters, ServiceFilters, SpecialtyFilters, TypeFilters,
};
use santemap_directory::geo::{self, FixedLocationProvider, LocationProvider};
use santemap_directory::FacilityCatalog;
use santemap_schema::Coordinate;
use santemap_records::RecordStore;
use santemap_server::state::AppState;

#[derive(Parser)]
#[command(name = "santemap", version, about = "Guinea health facility directory and patient portal")]
struct Cli {
    #[arg(long, default_value = "santemap.yaml", help = "Path to the config file")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Start the HTTP API server")]
    Serve {
        #[arg(long, help = "Override the configured listen address")]
        listen: Option<String>,
    },
    #[command(about = "Local chat REPL against the AI assistant")]
    Chat,
    #[command(about = "Search the facility catalog")]
    Search {
        #[arg(default_value = "", help = "Free-text search term")]
        term: String,
        #[arg(long, help = "Comma-separated type flags (hôpital, clinique, centre)")]
        types: Option<String>,
        #[arg(long, help = "Comma-separated specialty flags")]
        specialties: Option<String>,
        #[arg(long, help = "Comma-separated service flags")]
        services: Option<String>,
        #[arg(long, help = "Comma-separated language flags")]
        languages: Option<String>,
        #[arg(long, value_name = "LAT,LON", help = "Order results by distance from this point")]
        near: Option<String>,
    },
    #[command(about = "Validate config and the built-in catalog")]
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = load_config(&cli.config)?;

    match command {
        Commands::Serve { listen } => {
            let addr = listen.unwrap_or_else(|| config.server.listen_addr.clone());
            let state = build_state(&config)?;
            santemap_server::serve(state, &addr).await?;
        }
        Commands::Chat => {
            run_repl(&config).await?;
        }
        Commands::Search {
            term,
            types,
            specialties,
            services,
            languages,
            near,
        } => {
            let filters = build_filters(
                types.as_deref(),
                specialties.as_deref(),
                services.as_deref(),
                languages.as_deref(),
            );
            let origin = match near.as_deref() {
                Some(raw) => {
                    let provider = FixedLocationProvider(parse_coordinate(raw)?);
                    Some(provider.request_location().await?)
                }
                None => None,
            };
            run_search(&term, &filters, origin)?;
        }
        Commands::Validate => {
            let catalog = FacilityCatalog::builtin()?;
            println!(
                "Config valid. {} facilities in catalog, server on {}, assistant at {}.",
                catalog.len(),
                config.server.listen_addr,
                config.assistant.api_base
            );
        }
    }

    Ok(())
}

fn build_state(config: &AppConfig) -> Result<AppState> {
    Ok(AppState {
        catalog: Arc::new(FacilityCatalog::builtin()?),
        store: RecordStore::open(&config.database.path)?,
        assistant: Arc::new(AssistantGateway::new(
            config.assistant.api_base.clone(),
            config.assistant.api_key.clone(),
        )),
    })
}

/// CSV flag list per category. Absent means unconstrained.
fn category_from_csv<C, F>(raw: Option<&str>, all: C, none: C, mut set: F) -> C
where
    F: FnMut(&mut C, &str) -> bool,
{
    let Some(raw) = raw else {
        return all;
    };
    let mut flags = none;
    for token in raw.split(',') {
        let token = token.trim().to_lowercase();
        if token.is_empty() {
            continue;
        }
        if !set(&mut flags, &token) {
            eprintln!("warning: unknown filter flag '{token}'");
        }
    }
    flags
}

fn build_filters(
    types: Option<&str>,
    specialties: Option<&str>,
    services: Option<&str>,
    languages: Option<&str>,
) -> FilterState {
    FilterState {
        types: category_from_csv(types, TypeFilters::all(), TypeFilters::none(), |f, n| {
            f.set(n, true)
        }),
        specialties: category_from_csv(
            specialties,
            SpecialtyFilters::all(),
            SpecialtyFilters::none(),
            |f, n| f.set(n, true),
        ),
        services: category_from_csv(
            services,
            ServiceFilters::all(),
            ServiceFilters::none(),
            |f, n| f.set(n, true),
        ),
        languages: category_from_csv(
            languages,
            LanguageFilters::all(),
            LanguageFilters::none(),
            |f, n| f.set(n, true),
        ),
    }
}

fn parse_coordinate(raw: &str) -> Result<Coordinate> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("expected LAT,LON, got '{raw}'"))?;
    Ok(Coordinate {
        latitude: lat.trim().parse()?,
        longitude: lon.trim().parse()?,
    })
}

fn run_search(term: &str, filters: &FilterState, origin: Option<Coordinate>) -> Result<()> {
    let catalog = FacilityCatalog::builtin()?;
    let mut results = apply_filters(catalog.facilities(), term, filters);
    if let Some(origin) = origin {
        results = geo::nearest(&results, origin, results.len())
            .into_iter()
            .cloned()
            .collect();
    }

    if results.is_empty() {
        println!("No facility matches.");
        return Ok(());
    }

    println!("{:<4} {:<38} {:<22} {:<10}", "ID", "Name", "Type", "Urgences");
    for facility in &results {
        println!(
            "{:<4} {:<38} {:<22} {:<10}",
            facility.id,
            facility.name,
            facility.facility_type,
            if facility.has_emergency { "oui" } else { "non" }
        );
    }
    println!("---\n{} result(s)", results.len());
    Ok(())
}

async fn run_repl(config: &AppConfig) -> Result<()> {
    let gateway = AssistantGateway::new(
        config.assistant.api_base.clone(),
        config.assistant.api_key.clone(),
    );
    let mut transcript = Transcript::new();

    println!("santemap assistant. Type 'quit' to exit.");
    println!("---");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input == "quit" || input == "exit" {
            break;
        }
        if input.is_empty() {
            continue;
        }

        gateway.send_message(&mut transcript, input).await?;
        // A stream can finish without any delta; then there is nothing
        // to print, and the user's own line must not be echoed back.
        if let Some(reply) = transcript.last_assistant() {
            println!("{reply}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_flags_parse_from_csv() {
        let filters = build_filters(Some("clinique"), None, Some("urgences"), None);
        assert!(filters.types.clinique);
        assert!(!filters.types.hopital);
        assert!(filters.services.urgences);
        assert!(!filters.services.maternite);
        // Unconstrained categories stay fully enabled.
        assert!(filters.specialties.all_true());
        assert!(filters.languages.all_true());
    }

    #[test]
    fn coordinate_parses_lat_lon_pair() {
        let c = parse_coordinate("9.54, -13.68").unwrap();
        assert!((c.latitude - 9.54).abs() < 1e-9);
        assert!((c.longitude + 13.68).abs() < 1e-9);
        assert!(parse_coordinate("9.54").is_err());
        assert!(parse_coordinate("nord,sud").is_err());
    }

    #[test]
    fn empty_csv_turns_a_category_off() {
        let filters = build_filters(Some(""), None, None, None);
        assert!(filters.types.all_false());
    }
}
