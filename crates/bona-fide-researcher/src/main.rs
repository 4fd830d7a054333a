//! Bona Fide Researcher - Entry Point
//!
//! Verifies a researcher identity from the command line, or runs the HTTP
//! verification service.

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bona_fide_researcher::{
    config::Config,
    formatters::{compact_report, format_report_text},
    models::Researcher,
    pipeline, server,
};

#[derive(Parser, Debug)]
#[command(name = "bona-fide-researcher")]
#[command(about = "Researcher identity verification against public scholarly records")]
#[command(version)]
struct Cli {
    /// Researcher given name
    #[arg(long)]
    given_name: Option<String>,

    /// Researcher surname
    #[arg(long)]
    surname: Option<String>,

    /// Researcher email
    #[arg(long)]
    email: Option<String>,

    /// Researcher ORCID iD
    #[arg(long)]
    orcid: Option<String>,

    /// Researcher affiliation (institution name, ROR or ISNI)
    #[arg(long)]
    affiliation: Option<String>,

    /// Also try the names in surname-first order
    #[arg(long)]
    uncertain_name_order: bool,

    /// Report only the top N candidate identities
    #[arg(long)]
    limit_results: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Run the HTTP verification service instead of a one-shot lookup
    #[arg(long)]
    serve: bool,

    /// HTTP service port (only used with --serve)
    #[arg(long, default_value = "8000", env = "PORT")]
    port: u16,

    /// Static bearer token required by the HTTP service (optional)
    #[arg(long, env = "BFR_AUTH_TOKEN")]
    auth_token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// Compact JSON report
    Json,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let config = Config::new(cli.auth_token.clone());

    if cli.serve {
        tracing::info!(port = cli.port, "Running in HTTP service mode");
        return server::serve(config, cli.port).await;
    }

    let researcher = Researcher {
        given_name: cli.given_name,
        surname: cli.surname,
        email: cli.email,
        orcid: cli.orcid,
        affiliation: cli.affiliation,
        uncertain_name_order: cli.uncertain_name_order,
    };

    if !researcher.has_full_name() {
        anyhow::bail!("both --given-name and --surname are required for a lookup");
    }

    let sources = pipeline::default_sources(&config)?;
    let results = pipeline::verify_researcher(researcher.clone(), &config, &sources).await;
    let summaries = results.summaries(cli.limit_results);

    match cli.format {
        OutputFormat::Text => println!("{}", format_report_text(&researcher, &summaries)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&compact_report(&researcher, &summaries))?);
        }
    }

    Ok(())
}
