use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::bill::Bill;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("document store returned status {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillDocument {
    pub id: String,
    #[serde(flatten)]
    pub record: Bill,
}

#[derive(Debug, Deserialize)]
struct BillsSnapshot {
    docs: Vec<BillDocument>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_bills(&self) -> Result<Vec<BillDocument>, StoreError>;
    async fn add_bill(&self, record: &Bill) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct RestDocumentStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestDocumentStore {
    pub fn new(base_url: String, timeout_millis: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_millis))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn bills_url(&self) -> String {
        format!("{}/bills", self.base_url)
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn get_bills(&self) -> Result<Vec<BillDocument>, StoreError> {
        let response = self.client.get(self.bills_url()).send().await?;

        if !response.status().is_success() {
            return Err(StoreError::Status(response.status()));
        }

        let snapshot: BillsSnapshot = response.json().await?;
        Ok(snapshot.docs)
    }

    async fn add_bill(&self, record: &Bill) -> Result<(), StoreError> {
        let response = self.client.post(self.bills_url()).json(record).send().await?;

        if !response.status().is_success() {
            return Err(StoreError::Status(response.status()));
        }

        Ok(())
    }
}
