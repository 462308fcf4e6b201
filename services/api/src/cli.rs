use crate::infra::{parse_status, ConfiguredStore};
use crate::server;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use reciclativa::config::AppConfig;
use reciclativa::directory::{DirectoryStore, ListingStatus, ProfessionalListing};
use reciclativa::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Reciclativa",
    about = "Run the Reciclativa directory service and inspect listings from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print listings in a moderation state from the configured store
    Listings(ListingsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ListingsArgs {
    /// Moderation state to list: pending, approved or rejected
    #[arg(long, default_value = "pending", value_parser = parse_status)]
    pub(crate) status: ListingStatus,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Listings(args) => run_listings(args).await,
    }
}

async fn run_listings(args: ListingsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = ConfiguredStore::from_config(&config.storage)?;
    let listings = store.list_by_status(args.status).await?;

    println!(
        "{} {} listing(s) in the {} store",
        listings.len(),
        args.status,
        store.label()
    );
    for listing in &listings {
        println!("{}", render_listing(listing));
    }

    Ok(())
}

fn render_listing(listing: &ProfessionalListing) -> String {
    let mut line = format!(
        "- #{} {} | {}/{} | submitted {}",
        listing.id,
        listing.name,
        listing.city,
        listing.uf.to_ascii_uppercase(),
        listing
            .created_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
    );
    if let Some(category) = &listing.category {
        line.push_str(&format!(" | {}", category));
    }
    if let Some(email) = &listing.email {
        line.push_str(&format!(" | {}", email));
    }
    line
}
