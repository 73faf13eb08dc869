use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub email: String,
    #[serde(rename = "type")]
    pub expense_type: String,
    pub name: String,
    pub amount: f64,
    pub date: String,
    #[serde(default)]
    pub vat: String,
    pub pct: u32,
    #[serde(default)]
    pub commentary: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    // Documents written before the status column existed come back without one
    #[serde(default = "pending_status")]
    pub status: String,
}

fn pending_status() -> String {
    "pending".to_string()
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBillForm {
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Expense type cannot be empty"))]
    pub expense_type: String,
    #[validate(length(min = 1, message = "Expense name cannot be empty"))]
    pub name: String,
    pub amount: String,
    #[validate(length(min = 1, message = "Date cannot be empty"))]
    pub date: String,
    #[serde(default)]
    pub vat: String,
    pub pct: String,
    #[serde(default)]
    pub commentary: String,
}
