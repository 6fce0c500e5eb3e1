use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use clap::{Parser, Subcommand};
use contact_enrich::config::{LoggingSettings, Settings};
use contact_enrich::routes::{self, enrich::AppState};
use contact_enrich::services::{ProfileEmailExtractor, ProxiedClient, UspsLookup};
use contact_enrich::{BatchRunner, RowProcessor};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "contact-enrich")]
#[command(about = "Enrich contact records with city and email data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every record of an input file
    Run {
        /// CSV or Excel file with FIRST_NAME, LAST_NAME, STREET, ZIP columns
        #[arg(long)]
        input: Option<PathBuf>,
        /// Result CSV, appended to if it exists
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Serve the enrichment HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_tracing(logging: &LoggingSettings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

fn build_processor(settings: &Settings) -> std::io::Result<RowProcessor> {
    let fetcher = ProxiedClient::new(&settings.http).map_err(std::io::Error::other)?;

    let resolver = UspsLookup::new(&settings.lookup, tracing::info_span!("usps"));
    let extractor = ProfileEmailExtractor::new(
        Arc::new(fetcher),
        &settings.profiles,
        tracing::info_span!("profiles"),
    );

    Ok(RowProcessor::new(
        Arc::new(resolver),
        Arc::new(extractor),
        tracing::info_span!("processor"),
    ))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let settings = Settings::load();

    match &settings {
        Ok(s) => init_tracing(&s.logging),
        Err(_) => init_tracing(&LoggingSettings::default()),
    }

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::other(e)
    })?;

    info!("Configuration loaded successfully");

    let processor = Arc::new(build_processor(&settings)?);

    match cli.command {
        Commands::Run { input, output } => {
            let input = input.unwrap_or_else(|| settings.output.input_path.clone());
            let output = output.unwrap_or_else(|| settings.output.output_path.clone());

            info!("Enriching {} into {}", input.display(), output.display());

            let runner = BatchRunner::new(processor, tracing::info_span!("batch"));
            let summary = runner.run_file(&input, &output).await.map_err(|e| {
                error!("Batch aborted: {}", e);
                std::io::Error::other(e.to_string())
            })?;

            info!(
                "Done: {} records, {} success rows, {} error rows",
                summary.records, summary.success_rows, summary.error_rows
            );
            Ok(())
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| settings.server.host.clone());
            let port = port.unwrap_or(settings.server.port);
            let workers = settings.server.workers.unwrap_or(1);

            let app_state = AppState::new(processor, settings.output.output_path.clone());

            info!("Starting HTTP server on {}:{}", host, port);

            HttpServer::new(move || {
                let cors = Cors::permissive();

                App::new()
                    .app_data(web::Data::new(app_state.clone()))
                    .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
                    .wrap(cors)
                    .wrap(middleware::Logger::default())
                    .configure(routes::configure_routes)
            })
            .workers(workers)
            .bind((host, port))?
            .run()
            .await
        }
    }
}
