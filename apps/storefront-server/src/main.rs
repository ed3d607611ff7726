use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use db::{ConnectOpts, DbHandle};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};

use commerce::api::rest::dto::ProductDto;
use commerce::domain::CatalogService;
use commerce::infra::storage::migrations::run_migrations;
use commerce::model::Product;
use commerce::CommerceConfig;

mod server;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if create_dirs {
        if let Some(dir) = p.parent() {
            std::fs::create_dir_all(dir)?;
        }
    }

    // Rebuild DSN with absolute path and normalized slashes
    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Storefront Server - product catalog, accounts and checkout
#[derive(Parser)]
#[command(name = "storefront-server")]
#[command(about = "Storefront Server - product catalog, accounts and checkout")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Load products from a JSON file into the catalog
    Seed {
        /// Path to a JSON array of products
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // An explicitly passed config file must exist; a silent fallback to
    // defaults would hide typos in deployment scripts.
    if let Some(path) = cli.config.as_deref() {
        if !path.is_file() {
            return Err(anyhow!("Config file not found: {}", path.display()));
        }
    }

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    // Initialize logging
    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));

    // Print config and exit if requested
    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(&config),
        Commands::Seed { file } => seed_catalog(&config, &args, &file).await,
    }
}

/// Connect to the configured database. `--mock` forces in-memory SQLite.
async fn connect_database(config: &AppConfig, args: &CliArgs) -> Result<DbHandle> {
    let db_config = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("Database is not configured"))?;

    let config_dsn = db_config.url.trim().to_owned();
    if config_dsn.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    let mut dsn = if args.mock {
        "sqlite::memory:".to_string()
    } else {
        config_dsn
    };

    // Absolutize sqlite DSNs to avoid cwd issues
    if dsn.starts_with("sqlite://") {
        dsn = absolutize_sqlite_dsn(&dsn, Path::new(&config.server.home_dir), true)?;
    }

    let connect_opts = ConnectOpts {
        max_conns: db_config.max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: db_config
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(ms as u64)),
        create_sqlite_dirs: true,
    };

    tracing::info!("Connecting to database: {}", dsn);
    let db = DbHandle::connect(&dsn, connect_opts).await?;
    tracing::info!("Connected DB backend: {:?}", db.engine());
    Ok(db)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Storefront server starting");

    let db = connect_database(&config, &args).await?;
    let conn = db.sea();

    run_migrations(&conn)
        .await
        .context("Failed to apply database migrations")?;

    let commerce_cfg: CommerceConfig = config.module_config("commerce");
    let router = server::build_router(&config.server, &db, &commerce_cfg);

    server::serve(&config.server, router).await?;

    db.close().await;
    Ok(())
}

fn check_config(config: &AppConfig) -> Result<()> {
    // AppConfig::load_* already normalized & created home_dir
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

/// Upsert the products of a JSON seed file into the catalog.
async fn seed_catalog(config: &AppConfig, args: &CliArgs, file: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read seed file {}", file.display()))?;
    let rows: Vec<ProductDto> =
        serde_json::from_str(&raw).context("Seed file must be a JSON array of products")?;
    let products: Vec<Product> = rows.into_iter().map(Product::from).collect();

    let db = connect_database(config, args).await?;
    let conn = db.sea();
    run_migrations(&conn)
        .await
        .context("Failed to apply database migrations")?;

    let report = CatalogService::new(conn)
        .seed_products(products)
        .await
        .context("Failed to seed catalog")?;

    println!(
        "Seeded catalog: {} inserted, {} updated",
        report.inserted, report.updated
    );

    db.close().await;
    Ok(())
}
