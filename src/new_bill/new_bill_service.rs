use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use thiserror::Error;

use crate::{
    commons::{
        blob_storage::{receipt_key, BlobStorage},
        document_store::{DocumentStore, StoreError},
    },
    models::bill::{Bill, NewBillForm},
};

const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Error)]
pub enum NewBillError {
    #[error("unsupported file type for {file_name}")]
    UnsupportedFileType { file_name: String },
    #[error("receipt upload failed: {0}")]
    Upload(#[source] anyhow::Error),
    #[error("invalid {field} value {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("document store is not available")]
    StoreUnavailable,
    #[error(transparent)]
    Store(#[from] StoreError),
}

// Transient attachment state; both fields are set together on a successful
// upload and stay None otherwise
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadSession {
    pub file_url: Option<String>,
    pub file_name: Option<String>,
}

pub struct NewBillService {
    document_store: Option<Arc<dyn DocumentStore>>,
    blob_storage: Arc<dyn BlobStorage>,
    user_email: String,
    upload: UploadSession,
}

impl NewBillService {
    pub fn new(
        document_store: Option<Arc<dyn DocumentStore>>,
        blob_storage: Arc<dyn BlobStorage>,
        user_email: String,
    ) -> Self {
        Self::with_session(document_store, blob_storage, user_email, UploadSession::default())
    }

    pub fn with_session(
        document_store: Option<Arc<dyn DocumentStore>>,
        blob_storage: Arc<dyn BlobStorage>,
        user_email: String,
        upload: UploadSession,
    ) -> Self {
        Self {
            document_store,
            blob_storage,
            user_email,
            upload,
        }
    }

    pub fn upload_session(&self) -> UploadSession {
        self.upload.clone()
    }

    pub async fn attach_file(
        &mut self,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<(), NewBillError> {
        // Initiating a new selection discards whatever was attached before,
        // whatever the outcome of this one
        self.upload = UploadSession::default();

        let extension = match allowed_extension(file_name) {
            Some(extension) => extension,
            None => {
                return Err(NewBillError::UnsupportedFileType {
                    file_name: file_name.to_string(),
                })
            }
        };

        let object_key = receipt_key(&self.user_email, file_name);
        let file_url = self
            .blob_storage
            .upload(&object_key, content, Some(content_type_for(&extension)))
            .await
            .map_err(NewBillError::Upload)?;

        self.upload.file_url = Some(file_url);
        self.upload.file_name = Some(file_name.to_string());
        Ok(())
    }

    pub async fn submit(&self, form: NewBillForm) -> Result<Bill, NewBillError> {
        let amount = parse_number::<f64>("amount", &form.amount)?;
        let pct = parse_number::<u32>("pct", &form.pct)?;

        let bill = Bill {
            email: self.user_email.clone(),
            expense_type: form.expense_type,
            name: form.name,
            amount,
            date: form.date,
            vat: form.vat,
            pct,
            commentary: form.commentary,
            // Whatever the upload state is right now; an upload still in
            // flight elsewhere does not delay the submission
            file_url: self.upload.file_url.clone(),
            file_name: self.upload.file_name.clone(),
            status: "pending".to_string(),
        };

        self.create_bill(&bill).await?;
        Ok(bill)
    }

    pub async fn create_bill(&self, bill: &Bill) -> Result<(), NewBillError> {
        let store = self
            .document_store
            .as_ref()
            .ok_or(NewBillError::StoreUnavailable)?;

        // Single shot, no retry; a rejection belongs to the caller
        store.add_bill(bill).await?;
        Ok(())
    }
}

fn allowed_extension(file_name: &str) -> Option<String> {
    let (_, extension) = file_name.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();
    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Some(extension)
    } else {
        None
    }
}

fn content_type_for(extension: &str) -> String {
    match extension {
        "png" => "image/png",
        _ => "image/jpeg",
    }
    .to_string()
}

fn parse_number<T: std::str::FromStr>(
    field: &'static str,
    value: &str,
) -> Result<T, NewBillError> {
    value.trim().parse().map_err(|_| NewBillError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

// Keeps each session's attachment state between the file-selection request
// and the submit request
#[derive(Default, Clone)]
pub struct UploadSessions(Arc<RwLock<HashMap<String, UploadSession>>>);

impl UploadSessions {
    pub fn get(&self, session_id: &str) -> UploadSession {
        self.0
            .read()
            .expect("upload session lock poisoned")
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn put(&self, session_id: &str, upload: UploadSession) {
        self.0
            .write()
            .expect("upload session lock poisoned")
            .insert(session_id.to_string(), upload);
    }

    pub fn remove(&self, session_id: &str) {
        self.0
            .write()
            .expect("upload session lock poisoned")
            .remove(session_id);
    }
}
