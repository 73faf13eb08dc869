use std::sync::Arc;

use actix_web::{web, HttpResponse};
use tracing::info;
use validator::Validate;

use crate::{
    commons::session_store::SessionStore,
    models::user::{ApiError, ApiResponse, CreateSessionRequest, SessionResponse, SessionUser},
};

// Records an already-authenticated identity; credential checking happens
// upstream of this service
#[actix_web::post("/session")]
async fn create_session(
    session_store: web::Data<Arc<dyn SessionStore>>,
    request: web::Json<CreateSessionRequest>,
) -> HttpResponse {
    if let Err(e) = request.validate() {
        return HttpResponse::UnprocessableEntity().json(ApiResponse::<SessionResponse> {
            success: false,
            data: None,
            errors: Some(vec![ApiError::new("1003", e.to_string())]),
        });
    }

    let request = request.into_inner();
    let session_id = uuid::Uuid::new_v4().to_string();
    session_store.put_user(
        &session_id,
        SessionUser {
            email: request.email.clone(),
            user_type: request.user_type,
        },
    );

    info!("Opened session for {}", request.email);

    HttpResponse::Ok().json(ApiResponse {
        success: true,
        data: Some(SessionResponse { session_id }),
        errors: None,
    })
}
