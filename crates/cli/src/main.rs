use agenda_core::config::Config;
use agenda_core::crawl::Crawler;
use agenda_core::fetch::{HttpClient, LinkChecker};
use agenda_core::output::write_outputs;
use agenda_core::report::CrawlReport;
use agenda_core::urls::UrlFixer;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use schemars::schema_for;
use std::fs;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fec-agendas")]
#[command(about = "Scrape the FEC open-meeting archive into JSON", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for the crawl output (overrides the config file)
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export JSON Schemas for the output records
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Export JSON Schema files for Meeting and BrokenLink
    /// (into --out-dir, default: ./schemas)
    Export,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Schema { command }) => match command {
            SchemaCommands::Export => {
                schema_export(cli.out_dir.unwrap_or_else(|| PathBuf::from("schemas")))
            }
        },
        None => crawl(cli.config, cli.out_dir),
    }
}

fn init_logging() {
    // stdout is reserved for the summary
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn crawl(config_path: Option<PathBuf>, out_dir: Option<PathBuf>) -> Result<()> {
    init_logging();

    let mut config = match &config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = out_dir {
        config.crawl.output_dir = dir;
    }
    let settings = &config.crawl;

    // read the local offset while the process is still single-threaded
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let client = HttpClient::new(settings)?;
    let checker: Option<&dyn LinkChecker> = settings
        .check_links
        .then_some(&client as &dyn LinkChecker);
    let fixer = UrlFixer::new(&config.url_overrides, checker);

    info!(root = %settings.root_url, check_links = settings.check_links, "starting crawl");
    let outcome = Crawler::new(&client, &fixer)
        .fetch_meeting_pages(settings.fetch_meeting_pages)
        .run(&settings.root_url)?;

    let written = write_outputs(
        &settings.output_dir,
        &settings.output_prefix,
        &outcome.meetings,
        &outcome.broken_links,
        now,
    )?;

    print!("{}", CrawlReport::build(&outcome.meetings, &outcome.broken_links));
    println!("\nwrote {}", written.meetings.display());
    if let Some(path) = written.bad_urls {
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn schema_export(out_dir: PathBuf) -> Result<()> {
    fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let meeting_schema = schema_for!(agenda_core::schema::Meeting);
    let meeting_json = serde_json::to_string_pretty(&meeting_schema)?;
    fs::write(out_dir.join("Meeting.schema.json"), meeting_json)?;

    let broken_schema = schema_for!(agenda_core::schema::BrokenLink);
    let broken_json = serde_json::to_string_pretty(&broken_schema)?;
    fs::write(out_dir.join("BrokenLink.schema.json"), broken_json)?;

    println!("Exported schemas to {}", out_dir.display());
    Ok(())
}
