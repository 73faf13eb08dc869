use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::error;

use crate::{
    bills::{
        bills_service::{order_latest_first, BillsService},
        dto::bill_list_response::{AttachmentViewResponse, BillListResponse},
    },
    commons::{
        blob_storage::{receipt_key, BlobStorage},
        document_store::DocumentStore,
        session_store::SessionStore,
    },
    models::user::{ApiError, ApiResponse, SessionUser},
    services::metrics_service::MetricsService,
};

pub const SESSION_HEADER: &str = "x-session-id";

pub fn session_user(req: &HttpRequest, session_store: &dyn SessionStore) -> Option<SessionUser> {
    req.headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|session_id| session_store.get_user(session_id))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentViewQuery {
    pub file_name: String,
}

#[actix_web::get("/bills")]
async fn list_bills(
    document_store: web::Data<Option<Arc<dyn DocumentStore>>>,
    session_store: web::Data<Arc<dyn SessionStore>>,
    metrics: web::Data<MetricsService>,
    req: HttpRequest,
) -> HttpResponse {
    let start = std::time::Instant::now();
    let mut tags = HashMap::new();
    tags.insert("endpoint".to_string(), "bills".to_string());

    // An absent session reads as an empty email, which matches no bills
    let user_email = session_user(&req, session_store.get_ref().as_ref())
        .map(|user| user.email)
        .unwrap_or_default();

    let bills_service = BillsService::new(document_store.get_ref().clone());

    match bills_service.get_bills(&user_email).await {
        Ok(mut bills) => {
            order_latest_first(&mut bills);
            metrics.increment("bills.list.success", Some(tags.clone()));
            metrics.timing("bills.list.duration", start.elapsed(), Some(tags));
            HttpResponse::Ok().json(ApiResponse {
                success: true,
                data: Some(BillListResponse { bills }),
                errors: None,
            })
        }
        Err(e) => {
            error!("Failed to fetch bills: {}", e);
            metrics.increment("bills.list.failed", Some(tags.clone()));
            metrics.timing("bills.list.duration", start.elapsed(), Some(tags));
            HttpResponse::InternalServerError().json(ApiResponse::<()> {
                success: false,
                data: None,
                errors: Some(vec![ApiError::new("1002", e.to_string())]),
            })
        }
    }
}

#[actix_web::get("/bills/attachment")]
async fn view_attachment(
    blob_storage: web::Data<Arc<dyn BlobStorage>>,
    session_store: web::Data<Arc<dyn SessionStore>>,
    metrics: web::Data<MetricsService>,
    query: web::Query<AttachmentViewQuery>,
    req: HttpRequest,
) -> HttpResponse {
    let start = std::time::Instant::now();
    let mut tags = HashMap::new();
    tags.insert("endpoint".to_string(), "bills_attachment".to_string());

    let user = match session_user(&req, session_store.get_ref().as_ref()) {
        Some(user) => user,
        None => {
            metrics.increment("bills.attachment.failed", Some(tags.clone()));
            return HttpResponse::Unauthorized().json(ApiResponse::<()> {
                success: false,
                data: None,
                errors: Some(vec![ApiError::new("1004", "UNKNOWN_SESSION")]),
            });
        }
    };

    let object_key = receipt_key(&user.email, &query.file_name);

    match blob_storage.view_url(&object_key).await {
        Ok(url) => {
            metrics.increment("bills.attachment.success", Some(tags.clone()));
            metrics.timing("bills.attachment.duration", start.elapsed(), Some(tags));
            HttpResponse::Ok().json(ApiResponse {
                success: true,
                data: Some(AttachmentViewResponse { attachment_url: url }),
                errors: None,
            })
        }
        Err(e) => {
            error!("Failed to resolve attachment URL: {}", e);
            metrics.increment("bills.attachment.failed", Some(tags.clone()));
            metrics.timing("bills.attachment.duration", start.elapsed(), Some(tags));
            HttpResponse::InternalServerError().json(ApiResponse::<()> {
                success: false,
                data: None,
                errors: Some(vec![ApiError::new("1001", e.to_string())]),
            })
        }
    }
}
