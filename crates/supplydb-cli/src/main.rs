mod crawl;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use supplydb_core::{AppConfig, ScoringConfig, SupplierIdentity};
use supplydb_db::{MemoryStore, PgStore, RecordStore};
use tracing_subscriber::EnvFilter;

use crate::crawl::{build_page_client, run_crawl, CrawlOptions, PageSource};

#[derive(Debug, Parser)]
#[command(name = "supplydb")]
#[command(about = "Supplier extraction, trust scoring, and deduplicated storage")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract, score, and store suppliers from listing pages
    Crawl {
        /// Local HTML files or http(s) URLs
        #[arg(required = true)]
        sources: Vec<String>,

        /// Source domain for every page (required for local files)
        #[arg(long)]
        domain: Option<String>,

        /// Write the export snapshot to this JSON file after the crawl
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Print the export snapshot as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print change-log entries after this revision instead of the snapshot
        #[arg(long)]
        since: Option<u64>,
    },
    /// Show the stored entry for one supplier
    Show {
        /// Supplier name as displayed (case and spacing are ignored)
        #[arg(long)]
        name: String,

        /// Source domain the supplier was crawled from
        #[arg(long)]
        domain: String,
    },
    /// Database management
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check database connectivity
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = supplydb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let scoring = supplydb_core::load_scoring_config(&config.scoring_path)?;

    let Some(command) = cli.command else {
        println!("supplydb ready; run with --help for commands");
        return Ok(());
    };

    if let Commands::Db { command } = command {
        return run_db_command(&config, &command).await;
    }

    if config.database_url.is_some() {
        let pool = supplydb_db::connect_pool_from_config(&config).await?;
        supplydb_db::run_migrations(&pool).await?;
        let store = PgStore::new(pool).with_retry_policy(&config);
        dispatch(&store, command, &config, &scoring).await
    } else {
        ensure_memory_store_usable(&command)?;
        tracing::info!("DATABASE_URL not set; using in-memory store");
        dispatch(&MemoryStore::new(), command, &config, &scoring).await
    }
}

/// The in-memory store starts empty on every run, so commands that only read
/// stored suppliers would silently report nothing.
fn ensure_memory_store_usable(command: &Commands) -> anyhow::Result<()> {
    let name = match command {
        Commands::Export { .. } => "export",
        Commands::Show { .. } => "show",
        Commands::Crawl { .. } | Commands::Db { .. } => return Ok(()),
    };
    anyhow::bail!(
        "`{name}` reads stored suppliers but DATABASE_URL is not set, and the \
         in-memory store does not persist between runs; set DATABASE_URL, or \
         write the snapshot during the crawl with `supplydb crawl <sources> --export <file>`"
    )
}

async fn run_db_command(config: &AppConfig, command: &DbCommands) -> anyhow::Result<()> {
    let pool = supplydb_db::connect_pool_from_config(config).await?;
    match command {
        DbCommands::Migrate => {
            let applied = supplydb_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Ping => {
            supplydb_db::ping(&pool).await?;
            println!("database reachable");
        }
    }
    Ok(())
}

async fn dispatch<S: RecordStore>(
    store: &S,
    command: Commands,
    config: &AppConfig,
    scoring: &ScoringConfig,
) -> anyhow::Result<()> {
    match command {
        Commands::Crawl {
            sources,
            domain,
            export,
        } => {
            let sources: Vec<PageSource> = sources.iter().map(|s| PageSource::parse(s)).collect();
            let client = if sources.iter().any(PageSource::is_url) {
                Some(build_page_client(config)?)
            } else {
                None
            };
            let options = CrawlOptions {
                domain: domain.as_deref(),
                max_concurrent_pages: config.max_concurrent_pages,
            };

            let totals = run_crawl(store, client.as_ref(), &sources, scoring, &options).await?;
            println!("{}", totals.summary());

            if let Some(path) = export {
                let snapshot = store.export_snapshot().await?;
                output::write_json(&snapshot, Some(path.as_path()))?;
                tracing::info!(path = %path.display(), suppliers = snapshot.len(), "export written");
            }
        }
        Commands::Export {
            output: out_path,
            since,
        } => match since {
            Some(revision) => {
                let changes: Vec<output::ChangeView> = store
                    .changes_since(revision)
                    .await?
                    .into_iter()
                    .map(output::ChangeView::from)
                    .collect();
                output::write_json(&changes, out_path.as_deref())?;
            }
            None => {
                let snapshot = store.export_snapshot().await?;
                output::write_json(&snapshot, out_path.as_deref())?;
            }
        },
        Commands::Show { name, domain } => {
            let identity = SupplierIdentity::new(&name, &domain)
                .ok_or_else(|| anyhow::anyhow!("supplier name and domain must not be blank"))?;
            let stored = store
                .query_by_identity(&identity)
                .await?
                .ok_or_else(|| anyhow::anyhow!("supplier '{identity}' not found"))?;
            output::write_json(&stored, None)?;
        }
        Commands::Db { .. } => anyhow::bail!("db commands do not use a record store"),
    }
    Ok(())
}
