use clap::{Args, Parser, Subcommand};
use comuni_istat::comune::load_comuni;
use comuni_istat::output::ErrorReport;
use comuni_istat::types::constants::{COMMENT_CHAR, DEFAULT_DOWNLOAD_OUTPUT, FIELD_DELIM};
use comuni_istat::{
    run_convert, Config, Dialect, Result, Schema, Source, TransportConfig, COMUNE_SCHEMA,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// ISTAT municipalities converter
#[derive(Parser, Debug)]
#[command(name = "comuni-istat")]
#[command(about = "Convert the ISTAT list of Italian municipalities from CSV into JSON")]
#[command(
    version,
    after_help = "Settings are taken from command line arguments, then from the COMUNI_SOURCE,\nCOMUNI_ALLOW_INSECURE and COMUNI_FETCH_TIMEOUT environment variables.\nOn failure a JSON error report is printed to stderr."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert the municipality table into a JSON array
    Convert(ConvertArgs),
    /// Save the raw bytes of the source to a file
    Download(DownloadArgs),
    /// Print one line per municipality from a converted JSON file
    List {
        /// JSON file written by `convert`
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Path or http(s) URL of the municipality table (default: ISTAT export)
    #[arg(short = 's', long = "source")]
    source: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long = "allow-insecure")]
    allow_insecure: bool,

    /// Fetch timeout in seconds (default: 60)
    #[arg(long = "timeout")]
    timeout: Option<u64>,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output JSON file (default: comuni.json)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// JSON schema file replacing the built-in municipality schema
    #[arg(long = "schema")]
    schema: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long = "pretty")]
    pretty: bool,

    /// Cell delimiter (default: ';')
    #[arg(long = "delimiter")]
    delimiter: Option<char>,

    /// Comment line prefix (default: '#')
    #[arg(long = "comment")]
    comment: Option<char>,
}

#[derive(Args, Debug)]
struct DownloadArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output file (default: comuni.csv)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        error!("{}", e);
        eprintln!("{}", ErrorReport::from_error(&e).to_json());
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Convert(args) => {
            let config = build_config(&args)?;
            let conversion = match config.schema {
                Some(ref path) => run_convert(&config, &Schema::from_path(path)?)?,
                None => run_convert(&config, &COMUNE_SCHEMA)?,
            };
            info!(
                records = conversion.records.len(),
                unbound = conversion.unbound_fields().len(),
                "conversion complete"
            );
        }
        Command::Download(args) => {
            let (source, transport) = resolve_source(&args.source)?;
            let output = args
                .output
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_OUTPUT));
            Source::parse(&source)?.download(&transport, &output)?;
        }
        Command::List { file } => {
            for comune in load_comuni(&file)? {
                println!("{}", comune.listing_line());
            }
        }
    }
    Ok(())
}

/// Priority: CLI arguments > environment variables > defaults
fn resolve_source(args: &SourceArgs) -> Result<(String, TransportConfig)> {
    let defaults = Config::default().with_env()?;

    let source = args.source.clone().unwrap_or(defaults.source);
    let mut transport = defaults.transport;
    if args.allow_insecure {
        transport.allow_insecure = true;
    }
    if let Some(secs) = args.timeout {
        transport.timeout = Duration::from_secs(secs);
    }

    Ok((source, transport))
}

fn build_config(args: &ConvertArgs) -> Result<Config> {
    let (source, transport) = resolve_source(&args.source)?;
    let dialect = Dialect::new(
        args.delimiter.unwrap_or(FIELD_DELIM),
        args.comment.unwrap_or(COMMENT_CHAR),
    )?;

    let mut config = Config::new(source, Config::default().output)
        .with_transport(transport)
        .with_dialect(dialect);
    if let Some(ref output) = args.output {
        config.output = output.clone();
    }
    config.schema = args.schema.clone();
    config.pretty = args.pretty;

    Ok(config)
}
