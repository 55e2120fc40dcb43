use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use rds_sdk::config::Config;
use rds_sdk::models::{CommonQueryParameters, Format, SelectParameters, TabulateParameters};
use rds_sdk::rds::http::format_rds_error;
use rds_sdk::rds::{global, query, Server};
use rds_sdk::resource::AsyncResource;
use rds_sdk::urls::{parse_url, strip_trailing_slashes};
use rds_sdk::RdsError;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Query Rich Data Services APIs
#[derive(Parser, Debug)]
#[command(name = "rds", version, about, long_about = None)]
struct Args {
    /// RDS API url, e.g. https://covid19.richdataservices.com/rds
    #[arg(short, long, global = true)]
    url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show server information
    Info,
    /// Show the server changelog
    Changelog,
    /// Show the root catalog
    Catalogs,
    /// Resolve and show a catalog
    Catalog { catalog_id: String },
    /// Show metadata for every data product in a catalog
    Metadata { catalog_id: String },
    /// Resolve and show a data product
    DataProduct {
        catalog_id: String,
        data_product_id: String,
    },
    /// Count the records of a data product
    Count {
        catalog_id: String,
        data_product_id: String,
    },
    /// Run a select query (record level microdata)
    Select {
        catalog_id: String,
        data_product_id: String,
        #[command(flatten)]
        common: CommonArgs,
        /// Columns to select; prefix with `~` to exclude
        #[arg(long)]
        cols: Option<String>,
        /// Limit on the number of columns returned
        #[arg(long)]
        collimit: Option<u64>,
        /// Column to start at
        #[arg(long)]
        coloffset: Option<u64>,
    },
    /// Run a tabulation (aggregate level data)
    Tabulate {
        catalog_id: String,
        data_product_id: String,
        #[command(flatten)]
        common: CommonArgs,
        /// Columns to use as dimensions
        #[arg(long)]
        dims: Option<String>,
        /// Columns to use as measures, e.g. avg:AVG(V1)
        #[arg(long)]
        measure: Option<String>,
        /// Return subtotals alongside the data
        #[arg(long)]
        totals: bool,
    },
    /// Remember an API url for future runs
    Use { url: String },
}

/// Parameters shared by select and tabulate
#[derive(ClapArgs, Debug)]
struct CommonArgs {
    #[arg(long)]
    limit: Option<u64>,
    #[arg(long)]
    offset: Option<u64>,
    /// Return the total row count alongside the data
    #[arg(long)]
    count: bool,
    /// Output format, e.g. mtna_simple, amcharts, gcharts, plotly_bar
    #[arg(long)]
    format: Option<Format>,
    #[arg(long, value_delimiter = ',')]
    groupby: Vec<String>,
    /// Inject codes into the returned records
    #[arg(long)]
    inject: bool,
    /// Return metadata alongside the data
    #[arg(long)]
    metadata: bool,
    /// e.g. "V1 DESC,V2 ASC"
    #[arg(long)]
    orderby: Option<String>,
    #[arg(long, value_delimiter = ',')]
    weights: Vec<String>,
    /// Filter, e.g. "V1=1 AND V2=2"
    #[arg(long = "where")]
    filter: Option<String>,
}

impl From<CommonArgs> for CommonQueryParameters {
    fn from(args: CommonArgs) -> Self {
        Self {
            count: args.count.then_some(true),
            format: args.format,
            groupby: (!args.groupby.is_empty()).then_some(args.groupby),
            inject: args.inject.then_some(true),
            limit: args.limit,
            metadata: args.metadata.then_some(true),
            offset: args.offset,
            orderby: args.orderby,
            weights: (!args.weights.is_empty()).then_some(args.weights),
            filter: args.filter,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("rds started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("rds").join("rds.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".rds").join("rds.log");
    }
    PathBuf::from("rds.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_guard = setup_logging(args.log_level)?;

    let mut config = Config::load();

    // handled before any server is built so a bad saved url can be replaced
    if let Command::Use { url } = &args.command {
        let result = normalize_api_url(url).and_then(|api_url| {
            config.set_api_url(&api_url)?;
            println!("Using {}", api_url);
            Ok(())
        });
        return finish(result, log_guard);
    }

    let api_url = config.effective_api_url(args.url.as_deref());

    let mut builder = Server::builder(&api_url).policy(config.resolution_policy());
    if let Some(timeout) = config.effective_timeout(args.timeout) {
        builder = builder.timeout(timeout);
    }
    let server = builder
        .build()
        .with_context(|| format!("Invalid RDS API url '{}'", api_url))?;
    let server = global::init(server)?;

    tracing::info!("Using RDS API at {}", server.api_url());

    finish(run(server, args.command).await, log_guard)
}

fn finish(result: Result<()>, log_guard: Option<WorkerGuard>) -> Result<()> {
    if let Err(err) = result {
        tracing::error!("Command failed: {:?}", err);
        match err.downcast_ref::<RdsError>() {
            Some(rds_err) => eprintln!("Error: {}", format_rds_error(rds_err)),
            None => eprintln!("Error: {err:?}"),
        }
        // exit skips destructors; flush the log writer first
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}

/// Validate `url` and return the API url a server built from it would use
fn normalize_api_url(url: &str) -> Result<String> {
    let parsed = parse_url(strip_trailing_slashes(url))
        .with_context(|| format!("Invalid RDS API url '{}'", url))?;
    Ok(parsed.base_url())
}

async fn run(server: &Server, command: Command) -> Result<()> {
    match command {
        Command::Info => print_json(&server.get_info().await?.into_body()),
        Command::Changelog => print_json(&server.get_changelog().await?.into_body()),
        Command::Catalogs => print_json(&server.get_root_catalog().await?.into_body()),
        Command::Catalog { catalog_id } => {
            let catalog = server.get_catalog(&catalog_id);
            catalog.resolve().await?;
            print_json(&catalog.details())
        }
        Command::Metadata { catalog_id } => {
            let metadata = server.get_catalog(&catalog_id).get_metadata().await?;
            print_json(&metadata.into_body())
        }
        Command::DataProduct {
            catalog_id,
            data_product_id,
        } => {
            let product = server
                .get_catalog(&catalog_id)
                .get_data_product(&data_product_id);
            product.resolve().await?;
            print_json(&product.details())
        }
        Command::Count {
            catalog_id,
            data_product_id,
        } => print_json(&query::count(&catalog_id, &data_product_id).await?.into_body()),
        Command::Select {
            catalog_id,
            data_product_id,
            common,
            cols,
            collimit,
            coloffset,
        } => {
            let parameters = SelectParameters {
                common: common.into(),
                collimit,
                coloffset,
                cols,
            };
            let rows: Value = query::select(&catalog_id, &data_product_id, Some(&parameters))
                .await?
                .into_body();
            print_json(&rows)
        }
        Command::Tabulate {
            catalog_id,
            data_product_id,
            common,
            dims,
            measure,
            totals,
        } => {
            let parameters = TabulateParameters {
                common: common.into(),
                dims,
                measure,
                totals: totals.then_some(true),
            };
            let table: Value = query::tabulate(&catalog_id, &data_product_id, Some(&parameters))
                .await?
                .into_body();
            print_json(&table)
        }
        Command::Use { .. } => bail!("`use` does not talk to a server"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
