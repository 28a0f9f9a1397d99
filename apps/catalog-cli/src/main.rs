mod render;

use std::path::PathBuf;

use animals_catalog::domain::list::{
    AgeRange, AnimalCountRange, AnimalFilter, PersonFilter, WeightRange,
};
use animals_catalog::domain::service::animals::today;
use animals_catalog::{AnimalsCatalog, CatalogConfig, ListController, LoadOutcome, PageSource};
use animals_catalog_sdk::{
    AnimalId, AnimalsCatalogClientV1 as _, AnimalsQuery, OrderBy, PersonId, PersonsQuery,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Browse the animals catalog from the terminal
#[derive(Parser)]
#[command(name = "animals-catalog")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML); CATALOG_* environment variables
    /// override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List animals
    Animals(AnimalsArgs),
    /// List persons
    Persons(PersonsArgs),
    /// Show one animal
    Animal {
        id: i64,
    },
    /// Show one person and their animals
    Person {
        id: i64,
    },
    /// Show the global statistics
    Stats,
    /// Show the home page summary
    Overview,
    /// Validate configuration and exit
    Check,
}

#[derive(Args)]
struct AnimalsArgs {
    /// Server-side search term
    #[arg(long)]
    search: Option<String>,
    /// Sort order, e.g. name_asc or weight_desc
    #[arg(long)]
    sort: Option<OrderBy>,
    /// Only show this species (applied to loaded pages)
    #[arg(long)]
    species: Option<String>,
    /// Age range in years, e.g. 3-5 or 12+
    #[arg(long)]
    age: Option<AgeRange>,
    /// Weight range in grams, e.g. 0-5000 or 30001+
    #[arg(long)]
    weight: Option<WeightRange>,
    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pages: u32,
    /// Print averages, the age distribution and per-species weights of
    /// the loaded animals
    #[arg(long)]
    summary: bool,
}

#[derive(Args)]
struct PersonsArgs {
    /// Server-side search term
    #[arg(long)]
    search: Option<String>,
    /// Number of animals owned: 1, 2-3, 4-5 or 6+ (applied to loaded pages)
    #[arg(long)]
    animal_count: Option<AnimalCountRange>,
    /// Only show owners of this species (applied to loaded pages)
    #[arg(long)]
    animal_species: Option<String>,
    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pages: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config =
        CatalogConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let catalog = AnimalsCatalog::from_config(&config).context("failed to initialize catalog")?;

    match cli.command {
        Commands::Animals(args) => list_animals(&catalog, args).await,
        Commands::Persons(args) => list_persons(&catalog, args).await,
        Commands::Animal { id } => {
            let animal = catalog.client().get_animal(AnimalId(id)).await?;
            print!("{}", render::animal_detail(&animal, today()));
            Ok(())
        }
        Commands::Person { id } => {
            let person = catalog.client().get_person(PersonId(id)).await?;
            print!("{}", render::person_detail(&person, today()));
            Ok(())
        }
        Commands::Stats => {
            let stats = catalog.statistics().load().await?;
            print!("{}", render::statistics(&stats.report(today()), stats.total_animals()));
            Ok(())
        }
        Commands::Overview => {
            let overview = catalog.statistics().load_overview(today()).await?;
            print!("{}", render::overview(&overview));
            Ok(())
        }
        Commands::Check => {
            info!("Checking configuration...");
            println!("Configuration is valid");
            println!("endpoint: {}", config.endpoint()?);
            println!(
                "timeout: {}, page size: {}",
                humantime::format_duration(config.request_timeout),
                config.page_size
            );
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Apply `query` and load up to `pages` pages. Failures of later pages are
/// logged and leave the earlier pages in place.
async fn load_pages<S: PageSource>(
    list: &ListController<S>,
    query: S::Query,
    pages: u32,
) -> Result<()> {
    if let LoadOutcome::Failed(err) = list.apply_query(query).await {
        return Err(err.into());
    }
    let mut loaded = 1;
    while loaded < pages && list.can_load_more() {
        match list.load_more().await {
            LoadOutcome::Appended => loaded += 1,
            LoadOutcome::Failed(err) => {
                warn!(error = %err, page = loaded + 1, "failed to load next page");
                break;
            }
            _ => break,
        }
    }
    Ok(())
}

async fn list_animals(catalog: &AnimalsCatalog, args: AnimalsArgs) -> Result<()> {
    let mut query = AnimalsQuery::default();
    if let Some(search) = args.search {
        query = query.with_search(search);
    }
    if let Some(order_by) = args.sort {
        query = query.with_order_by(order_by);
    }
    let as_of = today();
    let filter = AnimalFilter {
        species: args.species,
        age: args.age,
        weight: args.weight,
        as_of: Some(as_of),
    };

    let list = catalog.animal_list();
    load_pages(&list, query, args.pages).await?;

    let view = list.view(&filter);
    for animal in &view.items {
        println!("{}", render::animal_line(animal, as_of));
    }
    println!("{}", render::list_footer(&view, "animals"));
    if args.summary && !view.items.is_empty() {
        print!("{}", render::animal_summary(&view.items, as_of));
    }
    Ok(())
}

async fn list_persons(catalog: &AnimalsCatalog, args: PersonsArgs) -> Result<()> {
    let mut query = PersonsQuery::default();
    if let Some(search) = args.search {
        query = query.with_search(search);
    }
    let filter = PersonFilter {
        animal_count: args.animal_count,
        animal_species: args.animal_species,
    };

    let list = catalog.person_list();
    load_pages(&list, query, args.pages).await?;

    let view = list.view(&filter);
    for person in &view.items {
        println!("{}", render::person_line(person));
    }
    println!("{}", render::list_footer(&view, "persons"));
    Ok(())
}
