use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub email: String,
    #[serde(rename = "type")]
    pub user_type: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "User type cannot be empty"))]
    pub user_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub errors: Option<Vec<ApiError>>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub entity: String,
    pub code: String,
    pub cause: String,
}

impl ApiError {
    pub fn new(code: &str, cause: impl Into<String>) -> Self {
        Self {
            entity: "BILLED_BE".to_string(),
            code: code.to_string(),
            cause: cause.into(),
        }
    }
}
