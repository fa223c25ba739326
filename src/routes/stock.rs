use actix_web::{web, HttpResponse, Responder};

use crate::core::LedgerError;
use crate::models::{ErrorResponse, StockId, StockQuantityRequest};
use crate::routes::AppState;

/// Configure stock lookup and reservation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/stock/{id}", web::get().to(get_stock))
        .route("/stock/{id}/reserve", web::post().to(reserve_stock))
        .route("/stock/{id}/release", web::post().to(release_stock));
}

/// GET /api/v1/stock/{id}
async fn get_stock(state: web::Data<AppState>, path: web::Path<StockId>) -> impl Responder {
    let stock_id = path.into_inner();

    match state.ledger.stock_lot(stock_id).await {
        Ok(Some(lot)) => HttpResponse::Ok().json(lot),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Stock lot not found".to_string(),
            message: format!("No stock lot with id {}", stock_id),
            status_code: 404,
        }),
        Err(e) => ledger_error_response(e),
    }
}

/// POST /api/v1/stock/{id}/reserve
///
/// Request body: `{ "quantityKg": 5.0 }`
async fn reserve_stock(
    state: web::Data<AppState>,
    path: web::Path<StockId>,
    req: web::Json<StockQuantityRequest>,
) -> impl Responder {
    let stock_id = path.into_inner();

    match state.ledger.reserve(stock_id, req.quantity_kg).await {
        Ok(lot) => {
            tracing::info!("Reserved {} kg from stock lot {}", req.quantity_kg, stock_id);
            HttpResponse::Ok().json(lot)
        }
        Err(e) => ledger_error_response(e),
    }
}

/// POST /api/v1/stock/{id}/release
///
/// Request body: `{ "quantityKg": 5.0 }`
async fn release_stock(
    state: web::Data<AppState>,
    path: web::Path<StockId>,
    req: web::Json<StockQuantityRequest>,
) -> impl Responder {
    let stock_id = path.into_inner();

    match state.ledger.release(stock_id, req.quantity_kg).await {
        Ok(lot) => {
            tracing::info!("Released {} kg back to stock lot {}", req.quantity_kg, stock_id);
            HttpResponse::Ok().json(lot)
        }
        Err(e) => ledger_error_response(e),
    }
}

fn ledger_error_response(err: LedgerError) -> HttpResponse {
    match &err {
        LedgerError::InvalidArgument { .. } => {
            tracing::info!("Rejected stock operation: {}", err);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid argument".to_string(),
                message: err.to_string(),
                status_code: 400,
            })
        }
        LedgerError::InsufficientStock { .. } | LedgerError::InvalidRelease { .. } => {
            tracing::info!("Stock operation conflict: {}", err);
            HttpResponse::Conflict().json(ErrorResponse {
                error: "Stock conflict".to_string(),
                message: err.to_string(),
                status_code: 409,
            })
        }
        LedgerError::Storage(_) => {
            tracing::error!("Stock operation failed: {}", err);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Storage error".to_string(),
                message: err.to_string(),
                status_code: 500,
            })
        }
    }
}
