use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::error;
use validator::Validate;

use crate::{
    bills::bills_controller::SESSION_HEADER,
    commons::{
        blob_storage::BlobStorage, document_store::DocumentStore, session_store::SessionStore,
    },
    models::{
        bill::NewBillForm,
        user::{ApiError, ApiResponse, SessionUser},
    },
    new_bill::new_bill_service::{NewBillError, NewBillService, UploadSessions},
    services::metrics_service::MetricsService,
};

pub const BILLS_ROUTE: &str = "/bills";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachFileBody {
    pub file_name: String,
    // Raw or data-URL-prefixed base64 content, as the form reader produces it
    pub file_data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachFileResponse {
    pub file_url: String,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBillResponse {
    pub navigate_to: String,
}

fn session_of(
    req: &HttpRequest,
    session_store: &dyn SessionStore,
) -> Option<(String, SessionUser)> {
    let session_id = req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())?
        .to_string();
    let user = session_store.get_user(&session_id)?;
    Some((session_id, user))
}

fn decode_file_data(file_data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    // Strip a "data:image/jpeg;base64," style prefix when present
    let encoded = match file_data.split_once("base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => file_data,
    };
    STANDARD.decode(encoded)
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::<()> {
        success: false,
        data: None,
        errors: Some(vec![ApiError::new("1004", "UNKNOWN_SESSION")]),
    })
}

fn bad_request(cause: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::<()> {
        success: false,
        data: None,
        errors: Some(vec![ApiError::new("1003", cause)]),
    })
}

#[actix_web::post("/bills/file")]
async fn attach_file(
    document_store: web::Data<Option<Arc<dyn DocumentStore>>>,
    blob_storage: web::Data<Arc<dyn BlobStorage>>,
    session_store: web::Data<Arc<dyn SessionStore>>,
    upload_sessions: web::Data<UploadSessions>,
    metrics: web::Data<MetricsService>,
    body: Result<web::Json<AttachFileBody>, actix_web::Error>,
    req: HttpRequest,
) -> HttpResponse {
    let start = std::time::Instant::now();
    let mut tags = HashMap::new();
    tags.insert("endpoint".to_string(), "new_bill_file".to_string());

    let body = match body {
        Ok(b) => b,
        Err(e) => {
            metrics.increment("new_bill.file.failed", Some(tags.clone()));
            return bad_request(format!("INVALID_REQUEST_BODY: {}", e));
        }
    };

    let (session_id, user) = match session_of(&req, session_store.get_ref().as_ref()) {
        Some(session) => session,
        None => {
            metrics.increment("new_bill.file.failed", Some(tags.clone()));
            return unauthorized();
        }
    };

    let content = match decode_file_data(&body.file_data) {
        Ok(content) => content,
        Err(e) => {
            metrics.increment("new_bill.file.failed", Some(tags.clone()));
            return bad_request(format!("INVALID_FILE_DATA: {}", e));
        }
    };

    let mut new_bill_service = NewBillService::with_session(
        document_store.get_ref().clone(),
        blob_storage.get_ref().clone(),
        user.email,
        upload_sessions.get(&session_id),
    );

    let result = new_bill_service
        .attach_file(&body.file_name, content)
        .await;

    // The selection overwrote whatever was attached before, even when it
    // was rejected or the upload failed
    let upload = new_bill_service.upload_session();
    upload_sessions.put(&session_id, upload.clone());

    match result {
        Ok(()) => {
            metrics.increment("new_bill.file.success", Some(tags.clone()));
            metrics.timing("new_bill.file.duration", start.elapsed(), Some(tags));
            HttpResponse::Ok().json(ApiResponse {
                success: true,
                data: Some(AttachFileResponse {
                    file_url: upload.file_url.unwrap_or_default(),
                    file_name: upload.file_name.unwrap_or_default(),
                }),
                errors: None,
            })
        }
        Err(NewBillError::UnsupportedFileType { file_name }) => {
            metrics.increment("new_bill.file.rejected", Some(tags.clone()));
            metrics.timing("new_bill.file.duration", start.elapsed(), Some(tags));
            HttpResponse::UnprocessableEntity().json(ApiResponse::<()> {
                success: false,
                data: None,
                errors: Some(vec![ApiError::new(
                    "1003",
                    format!("UNSUPPORTED_FILE_TYPE: {}", file_name),
                )]),
            })
        }
        Err(e) => {
            // The draft keeps null attachment fields; submission stays possible
            error!("Receipt upload failed: {}", e);
            metrics.increment("new_bill.file.failed", Some(tags.clone()));
            metrics.timing("new_bill.file.duration", start.elapsed(), Some(tags));
            HttpResponse::InternalServerError().json(ApiResponse::<()> {
                success: false,
                data: None,
                errors: Some(vec![ApiError::new("1001", e.to_string())]),
            })
        }
    }
}

#[actix_web::post("/bills")]
async fn submit_bill(
    document_store: web::Data<Option<Arc<dyn DocumentStore>>>,
    blob_storage: web::Data<Arc<dyn BlobStorage>>,
    session_store: web::Data<Arc<dyn SessionStore>>,
    upload_sessions: web::Data<UploadSessions>,
    metrics: web::Data<MetricsService>,
    body: Result<web::Json<NewBillForm>, actix_web::Error>,
    req: HttpRequest,
) -> HttpResponse {
    let start = std::time::Instant::now();
    let mut tags = HashMap::new();
    tags.insert("endpoint".to_string(), "new_bill_submit".to_string());

    let form = match body {
        Ok(b) => b.into_inner(),
        Err(e) => {
            metrics.increment("new_bill.submit.failed", Some(tags.clone()));
            return bad_request(format!("INVALID_REQUEST_BODY: {}", e));
        }
    };

    if let Err(e) = form.validate() {
        metrics.increment("new_bill.submit.failed", Some(tags.clone()));
        return HttpResponse::UnprocessableEntity().json(ApiResponse::<()> {
            success: false,
            data: None,
            errors: Some(vec![ApiError::new("1003", e.to_string())]),
        });
    }

    let (session_id, user) = match session_of(&req, session_store.get_ref().as_ref()) {
        Some(session) => session,
        None => {
            metrics.increment("new_bill.submit.failed", Some(tags.clone()));
            return unauthorized();
        }
    };

    let new_bill_service = NewBillService::with_session(
        document_store.get_ref().clone(),
        blob_storage.get_ref().clone(),
        user.email,
        upload_sessions.get(&session_id),
    );

    match new_bill_service.submit(form).await {
        Ok(_bill) => {
            // The draft is done; the client moves on to the bills list
            upload_sessions.remove(&session_id);
            metrics.increment("new_bill.submit.success", Some(tags.clone()));
            metrics.timing("new_bill.submit.duration", start.elapsed(), Some(tags));
            HttpResponse::Ok().json(ApiResponse {
                success: true,
                data: Some(NewBillResponse {
                    navigate_to: BILLS_ROUTE.to_string(),
                }),
                errors: None,
            })
        }
        Err(e @ NewBillError::InvalidNumber { .. }) => {
            metrics.increment("new_bill.submit.failed", Some(tags.clone()));
            metrics.timing("new_bill.submit.duration", start.elapsed(), Some(tags));
            HttpResponse::UnprocessableEntity().json(ApiResponse::<()> {
                success: false,
                data: None,
                errors: Some(vec![ApiError::new("1003", e.to_string())]),
            })
        }
        Err(e) => {
            error!("Failed to persist bill: {}", e);
            metrics.increment("new_bill.submit.failed", Some(tags.clone()));
            metrics.timing("new_bill.submit.duration", start.elapsed(), Some(tags));
            HttpResponse::InternalServerError().json(ApiResponse::<()> {
                success: false,
                data: None,
                errors: Some(vec![ApiError::new("1002", e.to_string())]),
            })
        }
    }
}
