//! starlayer CLI - query a star schema through its semantic model
//!
//! Usage:
//!   starlayer [--config <file>] [--database <db>] [--definition <model.toml>] <command>
//!
//! Examples:
//!   starlayer measures
//!   starlayer describe
//!   starlayer compile request.json --dialect tsql
//!   echo '{"measures": ["totalRevenue"], "dimensions": ["country"]}' | starlayer query -

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use starlayer::config::Settings;
use starlayer::engine::SqliteEngine;
use starlayer::query::QueryRequest;
use starlayer::sql::Dialect;
use starlayer::SemanticLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "STARLAYER_LOG";

#[derive(Parser)]
#[command(name = "starlayer")]
#[command(about = "starlayer - a semantic layer over star-schema datasets")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $STARLAYER_CONFIG, ./starlayer.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database holding the loaded tables (overrides source.path)
    #[arg(long, global = true)]
    database: Option<String>,

    /// TOML model definition (overrides model.definition)
    #[arg(long, global = true)]
    definition: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List dimension names
    Dimensions,

    /// List measure names
    Measures,

    /// Print the model description as JSON
    Describe,

    /// Assemble the model and report what was joined
    Validate,

    /// Compile a request to SQL without running it
    Compile {
        /// Request JSON file, inline JSON, or `-` for stdin
        request: String,

        /// SQL dialect to generate (defaults to query.dialect)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// Run a request and print the rows as JSON records
    Query {
        /// Request JSON file, inline JSON, or `-` for stdin
        request: String,
    },
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Duckdb,
    Postgres,
    Sqlite,
    Tsql,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Sqlite => Dialect::Sqlite,
            DialectArg::Tsql => Dialect::TSql,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// SQL text only
    Sql,
    /// The query plan as JSON
    Plan,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&settings);

    let layer = match SemanticLayer::from_settings(&settings) {
        Ok(layer) => layer,
        Err(e) => {
            eprintln!("Error assembling model: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Dimensions => print_lines(layer.model().list_dimensions()),
        Commands::Measures => print_lines(layer.model().list_measures()),
        Commands::Describe => print_json(&layer.model().describe()),
        Commands::Validate => cmd_validate(&layer),
        Commands::Compile {
            request,
            dialect,
            output,
        } => {
            let dialect = dialect.map(Dialect::from).unwrap_or(settings.query.dialect);
            cmd_compile(&layer, &request, dialect, output, settings.query.default_limit)
        }
        Commands::Query { request } => cmd_query(&layer, &request, settings.query.default_limit),
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, starlayer::config::SettingsError> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };
    if let Some(database) = &cli.database {
        settings.source.path = database.clone();
    }
    if let Some(definition) = &cli.definition {
        settings.model.definition = Some(definition.clone());
    }
    Ok(settings)
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&settings.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn cmd_validate(layer: &SemanticLayer<SqliteEngine>) -> ExitCode {
    let model = layer.model();
    println!(
        "OK: model rooted at '{}' ({} tables, {} dimensions, {} measures)",
        model.root,
        model.relation.tables.len(),
        model.dimensions.len(),
        model.measures.len()
    );
    for join in &model.relation.joins {
        let on: Vec<String> = join.on.iter().map(|(l, r)| format!("{} = {}", l, r)).collect();
        println!("  {} -> {} ON {}", join.referencing_table, join.table, on.join(" AND "));
    }
    println!("fingerprint: {}", model.fingerprint);
    ExitCode::SUCCESS
}

fn cmd_compile(
    layer: &SemanticLayer<SqliteEngine>,
    request: &str,
    dialect: Dialect,
    output: OutputFormat,
    default_limit: u64,
) -> ExitCode {
    let request = match read_request(request, default_limit) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error reading request: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match layer.compile(&request) {
        Ok(plan) => match output {
            OutputFormat::Sql => {
                println!("{}", plan.to_sql(dialect));
                ExitCode::SUCCESS
            }
            OutputFormat::Plan => print_json(&plan),
        },
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_query(layer: &SemanticLayer<SqliteEngine>, request: &str, default_limit: u64) -> ExitCode {
    let request = match read_request(request, default_limit) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error reading request: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match layer.query(&request) {
        Ok(rows) => {
            info!(rows = rows.len(), "query complete");
            print_json(&rows.to_records())
        }
        Err(e) => {
            eprintln!("Query error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Read a request from a file, stdin (`-`) or inline JSON.
///
/// A request without a `limit` key gets the configured default.
fn read_request(arg: &str, default_limit: u64) -> Result<QueryRequest, String> {
    let text = if arg == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("stdin: {}", e))?;
        buf
    } else if arg.trim_start().starts_with('{') {
        arg.to_string()
    } else {
        fs::read_to_string(arg).map_err(|e| format!("'{}': {}", arg, e))?
    };

    let mut request = QueryRequest::from_json(&text).map_err(|e| e.to_string())?;
    let fields: serde_json::Value = serde_json::from_str(&text).map_err(|e| e.to_string())?;
    if fields.get("limit").is_none() {
        request.limit = Some(default_limit);
    }
    Ok(request)
}

fn print_lines(lines: Vec<&str>) -> ExitCode {
    for line in lines {
        println!("{}", line);
    }
    ExitCode::SUCCESS
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            ExitCode::FAILURE
        }
    }
}
