use crate::config::{AppConfig, CliConfig, FileConfig};
use crate::db::{apply_sql, init_db, Database, FaasRepository, SqliteFaasRepository};
use crate::report::{write_artifact, Overrides, ReportPipeline};
use crate::router::handle;
use anyhow::{Context, Result};
use astra::Server;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod db;
mod domain;
mod errors;
mod report;
mod responses;
mod router;
mod templates;

#[cfg(test)]
mod tests;

#[derive(Parser, Debug)]
#[clap(about = "Building FAAS valuation and report service")]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long)]
    config: Option<PathBuf>,

    /// SQLite database file.
    #[clap(long)]
    db: Option<PathBuf>,

    /// SQL schema applied at startup.
    #[clap(long)]
    schema: Option<PathBuf>,

    /// Optional SQL file with demo data, applied after the schema.
    #[clap(long)]
    seed: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the report screens over HTTP.
    Serve {
        #[clap(short, long, default_value_t = 3000)]
        port: u16,

        #[clap(long, default_value_t = 8)]
        max_workers: usize,
    },
    /// Write one form's report document to disk.
    Export {
        #[clap(long)]
        form_id: String,

        /// Output file. Defaults to the generated file name in the current directory.
        #[clap(long)]
        output: Option<PathBuf>,
    },
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        let (port, max_workers) = match args.command {
            Command::Serve { port, max_workers } => (port, max_workers),
            Command::Export { .. } => (3000, 1),
        };
        CliConfig {
            db_path: args.db.clone(),
            schema_path: args.schema.clone(),
            port,
            max_workers,
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let app_config = AppConfig::resolve(&CliConfig::from(&cli_args), file_config)?;

    let db = Database::new(app_config.db_path.clone());
    init_db(&db, &app_config.schema_path)?;

    if let Some(seed) = &cli_args.seed {
        let sql = std::fs::read_to_string(seed)
            .with_context(|| format!("Failed to read seed file {}", seed.display()))?;
        apply_sql(&db, &sql)?;
        info!(seed = %seed.display(), "seed data applied");
    }

    let repo = SqliteFaasRepository::new(db);

    match cli_args.command {
        Command::Serve { .. } => serve(repo, app_config),
        Command::Export { form_id, output } => export(&repo, &app_config, &form_id, output),
    }
}

fn serve(repo: SqliteFaasRepository, app_config: AppConfig) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], app_config.port));
    info!("Starting server at http://{addr}");

    let settings = app_config.report;
    let server = Server::bind(&addr).max_workers(app_config.max_workers);

    server
        .serve(move |req, _info| match handle(req, &repo, &settings) {
            Ok(resp) => resp,
            Err(err) => templates::html_error_response(err),
        })
        .context("Server ended with error")?;

    info!("Server shut down cleanly.");
    Ok(())
}

fn export(
    repo: &SqliteFaasRepository,
    app_config: &AppConfig,
    form_id: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let inputs = repo
        .load_inputs(form_id)
        .with_context(|| format!("Failed to load form {form_id}"))?;

    let mut pipeline = ReportPipeline::new(&app_config.report);
    let model = pipeline.prepare(&inputs, Overrides::new());
    let artifact = pipeline.render_document(&model)?;

    let path = output.unwrap_or_else(|| PathBuf::from(&artifact.filename));
    write_artifact(&artifact, &path)?;
    info!(path = %path.display(), "report written");
    Ok(())
}
