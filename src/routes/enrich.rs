use actix_web::{web, HttpResponse, Responder};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use validator::Validate;

use crate::models::{EnrichRequest, EnrichResponse, ErrorResponse, HealthResponse, InputRecord};
use crate::processor::RowProcessor;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<RowProcessor>,
    pub output_path: PathBuf,
    /// Held for the whole enrich-and-persist step so records never interleave
    pub lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(processor: Arc<RowProcessor>, output_path: PathBuf) -> Self {
        Self {
            processor,
            output_path,
            lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Configure all enrichment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/enrich", web::post().to(enrich));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Enrich one contact
///
/// POST /api/v1/enrich
///
/// Request body:
/// ```json
/// {
///   "firstName": "string",
///   "lastName": "string",
///   "street": "string",
///   "zip": "string"
/// }
/// ```
async fn enrich(state: web::Data<AppState>, req: web::Json<EnrichRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for enrich request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let record: InputRecord = req.into_inner().into();

    let _guard = state.lock.lock().await;
    let rows = state.processor.build_rows(&record).await;

    match state.processor.persist(&rows, &state.output_path) {
        Ok(table) => HttpResponse::Ok().json(EnrichResponse {
            rows,
            total_rows: table.rows.len(),
        }),
        Err(e) => {
            tracing::error!("Failed to persist results to {}: {}", state.output_path.display(), e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to persist results".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
