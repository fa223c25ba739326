use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;

use crate::core::MatchError;
use crate::models::{ErrorResponse, HealthResponse, MatchFailureResponse, MatchRequest};
use crate::routes::AppState;

/// Configure health and supplier matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/suppliers/closest", web::post().to(find_closest_supplier));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let storage_healthy = match state.catalog.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Storage health check failed: {}", e);
            false
        }
    };

    let status = if storage_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find the closest supplier endpoint
///
/// POST /api/v1/suppliers/closest
///
/// Request body:
/// ```json
/// {
///   "materialType": "PLA",
///   "color": "Red",
///   "requiredQuantityKg": 5.0,
///   "buyerAddress": "string",
///   "buyerLatitude": 40.7903,
///   "buyerLongitude": -73.9477
/// }
/// ```
///
/// An unmatched request still answers 200 with a `message` explaining why.
async fn find_closest_supplier(
    state: web::Data<AppState>,
    req: web::Json<MatchRequest>,
) -> impl Responder {
    let request_id = Uuid::new_v4();

    tracing::info!(
        "[{}] Finding closest supplier for {} {} ({} kg)",
        request_id,
        req.material_type,
        req.color,
        req.required_quantity_kg
    );

    match state.matcher.find_closest_supplier(&req).await {
        Ok(result) => {
            tracing::info!(
                "[{}] Matched supplier {} at {} km",
                request_id,
                result.supplier.id,
                result.distance_km
            );
            HttpResponse::Ok().json(result)
        }
        Err(err) if err.is_unmatched() => {
            tracing::info!("[{}] No match: {}", request_id, err);
            HttpResponse::Ok().json(MatchFailureResponse::new(&err))
        }
        Err(MatchError::InvalidArgument { reason }) => {
            tracing::info!("[{}] Validation failed: {}", request_id, reason);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: "Validation failed".to_string(),
                message: reason,
                status_code: 400,
            })
        }
        Err(err @ MatchError::StockDataInconsistency { .. }) => {
            tracing::error!("[{}] {}", request_id, err);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Stock data inconsistency".to_string(),
                message: err.to_string(),
                status_code: 500,
            })
        }
        Err(err) => {
            tracing::error!("[{}] Supplier matching failed: {}", request_id, err);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to match supplier".to_string(),
                message: err.to_string(),
                status_code: 500,
            })
        }
    }
}
